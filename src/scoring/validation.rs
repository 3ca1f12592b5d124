use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use super::config::DEFAULT_POINTS;
use super::factors::ExerciseKind;
use crate::config::Config;

static TIME_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2}):([0-5][0-9]):([0-5][0-9])$|^([0-5]?[0-9]):([0-5][0-9])$")
        .expect("time pattern is valid")
});

static NUMBER_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)([.,]\d+)?$").expect("number pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("result value is empty")]
    Empty,
    #[error("invalid {kind} value '{value}': {hint}")]
    InvalidValue {
        value: String,
        kind: ExerciseKind,
        hint: &'static str,
    },
}

/// Strict check applied to new results before they are admitted.
///
/// Timed kinds take `H:MM:SS` (hours at most two digits) or `M:SS` with
/// minutes and seconds in 0..=59. Strength, repetition and distance kinds take
/// an unsigned decimal with `.` or `,`. Other kinds accept anything non-blank.
pub fn check_value(raw: &str, kind: ExerciseKind) -> Result<(), ValidationError> {
    if raw.trim().is_empty() {
        return Err(ValidationError::Empty);
    }

    let ok = if kind.is_time_based() {
        TIME_VALUE.is_match(raw)
    } else if kind.requires_number() {
        NUMBER_VALUE.is_match(raw)
    } else {
        true
    };

    if ok {
        Ok(())
    } else {
        Err(ValidationError::InvalidValue {
            value: raw.to_string(),
            kind,
            hint: kind.input_hint(),
        })
    }
}

pub fn validate_value(raw: &str, kind: ExerciseKind) -> bool {
    check_value(raw, kind).is_ok()
}

/// Validate configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    for (key, value) in [
        ("debounce", &config.debounce),
        ("poll_interval", &config.poll_interval),
    ] {
        if let Some(text) = value {
            match humantime::parse_duration(text) {
                Ok(d) if d.is_zero() && key == "poll_interval" => {
                    errors.push(format!("{}: must be greater than zero", key));
                }
                Ok(_) => {}
                Err(e) => {
                    errors.push(format!("{}: invalid duration '{}' - {}", key, text, e));
                }
            }
        }
    }

    if let Some(ref scoring) = config.scoring {
        if scoring.min_participants == Some(0) {
            errors.push("scoring.min_participants: must be at least 1".to_string());
        }

        if let Some(ref points) = scoring.points {
            if points.is_empty() {
                errors.push("scoring.points: must list at least one value".to_string());
            }
            for (i, pair) in points.windows(2).enumerate() {
                if pair[1] > pair[0] {
                    errors.push(format!(
                        "scoring.points[{}]: {} is greater than the previous position's {}",
                        i + 1,
                        pair[1],
                        pair[0]
                    ));
                }
            }
        }

        let table = scoring.schedule();
        let listed = scoring.points.as_ref().map_or(DEFAULT_POINTS.len(), Vec::len);
        if let Some(floor) = scoring.points_floor {
            let last = table.points_for(listed);
            if listed > 0 && floor > last {
                errors.push(format!(
                    "scoring.points_floor: {} is greater than the last listed points {}",
                    floor, last
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
