//! Distance, time and speed conversions for running results.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

use crate::scoring::{format_pace, parse_duration};

static DIGIT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("digit pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaceError {
    #[error("distance, time and speed must all be positive")]
    InvalidInput,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaceFromTime {
    pub pace_sec_per_km: f64,
    pub speed_kmh: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaceFromSpeed {
    pub elapsed_seconds: f64,
    pub pace_sec_per_km: f64,
}

fn positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

pub fn from_distance_and_time(
    distance_km: f64,
    elapsed_seconds: f64,
) -> Result<PaceFromTime, PaceError> {
    if !positive(distance_km) || !positive(elapsed_seconds) {
        return Err(PaceError::InvalidInput);
    }
    Ok(PaceFromTime {
        pace_sec_per_km: elapsed_seconds / distance_km,
        speed_kmh: (distance_km / elapsed_seconds) * 3600.0,
    })
}

pub fn from_distance_and_speed(
    distance_km: f64,
    speed_kmh: f64,
) -> Result<PaceFromSpeed, PaceError> {
    if !positive(distance_km) || !positive(speed_kmh) {
        return Err(PaceError::InvalidInput);
    }
    Ok(PaceFromSpeed {
        elapsed_seconds: (distance_km / speed_kmh) * 3600.0,
        pace_sec_per_km: 3600.0 / speed_kmh,
    })
}

/// Race distance embedded in an exercise name.
///
/// The first digit run is kilometres when the name mentions "km", metres
/// otherwise: "5km run" is 5.0, "3000 m" is 3.0. Names without digits, or
/// with a zero distance, yield None.
pub fn infer_distance_from_exercise_name(name: &str) -> Option<f64> {
    let digits = DIGIT_RUN.find(name)?;
    let value: f64 = digits.as_str().parse().ok()?;
    let km = if name.to_lowercase().contains("km") {
        value
    } else {
        value / 1000.0
    };
    positive(km).then_some(km)
}

/// Pace annotation for a timed result, e.g. "4:00/km".
///
/// Empty when the exercise name carries no distance or the value does not
/// parse; never an error.
pub fn pace_label(raw_duration: &str, exercise_name: &str) -> String {
    let Some(distance_km) = infer_distance_from_exercise_name(exercise_name) else {
        return String::new();
    };
    let Ok(seconds) = parse_duration(raw_duration) else {
        return String::new();
    };
    match from_distance_and_time(distance_km, seconds as f64) {
        Ok(pace) => format!("{}/km", format_pace(pace.pace_sec_per_km)),
        Err(_) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_km_in_twelve_minutes() {
        let pace = from_distance_and_time(3.0, 720.0).unwrap();
        assert!((pace.pace_sec_per_km - 240.0).abs() < 1e-9);
        assert!((pace.speed_kmh - 15.0).abs() < 1e-9);
        assert_eq!(format_pace(pace.pace_sec_per_km), "4:00");
    }

    #[test]
    fn test_from_speed() {
        let pace = from_distance_and_speed(3.0, 15.0).unwrap();
        assert!((pace.elapsed_seconds - 720.0).abs() < 1e-9);
        assert!((pace.pace_sec_per_km - 240.0).abs() < 1e-9);
    }

    #[test]
    fn test_time_then_speed_roundtrip() {
        for (distance, value) in [(5.0, "27:13"), (10.0, "1:02:45"), (3.0, "11:59")] {
            let elapsed = parse_duration(value).unwrap() as f64;
            let forward = from_distance_and_time(distance, elapsed).unwrap();
            let back = from_distance_and_speed(distance, forward.speed_kmh).unwrap();
            assert!((back.elapsed_seconds - elapsed).abs() < 1e-6);
            assert!((back.pace_sec_per_km - forward.pace_sec_per_km).abs() < 1e-6);
        }
    }

    #[test]
    fn test_non_positive_inputs_rejected() {
        assert_eq!(from_distance_and_time(0.0, 600.0), Err(PaceError::InvalidInput));
        assert_eq!(from_distance_and_time(5.0, 0.0), Err(PaceError::InvalidInput));
        assert_eq!(from_distance_and_time(-1.0, 600.0), Err(PaceError::InvalidInput));
        assert_eq!(from_distance_and_speed(5.0, 0.0), Err(PaceError::InvalidInput));
        assert_eq!(from_distance_and_speed(f64::NAN, 10.0), Err(PaceError::InvalidInput));
    }

    #[test]
    fn test_infer_distance() {
        assert_eq!(infer_distance_from_exercise_name("5km run"), Some(5.0));
        assert_eq!(infer_distance_from_exercise_name("10 KM"), Some(10.0));
        assert_eq!(infer_distance_from_exercise_name("3000m"), Some(3.0));
        assert_eq!(infer_distance_from_exercise_name("Run 400 m then 2 km"), Some(400.0));
        assert_eq!(infer_distance_from_exercise_name("Bench press"), None);
        assert_eq!(infer_distance_from_exercise_name("0 m"), None);
    }

    #[test]
    fn test_pace_label() {
        assert_eq!(pace_label("12:00", "3km"), "4:00/km");
        assert_eq!(pace_label("1:00:00", "10 km"), "6:00/km");
        assert_eq!(pace_label("1:30", "400 m"), "3:45/km");
    }

    #[test]
    fn test_pace_label_blank_when_unknown() {
        assert_eq!(pace_label("12:00", "Cooper test"), "");
        assert_eq!(pace_label("fast", "3km"), "");
        assert_eq!(pace_label("0:00", "3km"), "");
    }
}
