use serde::{Deserialize, Serialize};

use super::duration::{parse_decimal, parse_duration};
use crate::model::{Exercise, ExerciseResult};

/// Numerator for timed scores: score = SCORE_SCALE / seconds
pub const SCORE_SCALE: f64 = 10_000.0;

/// Duration assumed for timed results whose value cannot be parsed
pub const FALLBACK_DURATION_SECS: u64 = 9_999;

/// Comparison family of an exercise, derived from its free-text type label.
///
/// Only `Time` ranks lower raw values higher; every other kind is
/// "bigger is better".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExerciseKind {
    Time,
    Strength,
    Repetitions,
    Distance,
    Other,
}

const TIME_MARKERS: &[&str] = &["tid", "løping", "time", "running"];
const STRENGTH_MARKERS: &[&str] = &["styrke", "strength", "kg"];
const REPETITION_MARKERS: &[&str] = &["repetisjoner", "repetition", "reps"];
const DISTANCE_MARKERS: &[&str] = &["distanse", "distance"];

impl ExerciseKind {
    /// Classify a type label by case-insensitive marker substrings.
    /// Time markers win over every other family.
    pub fn from_label(label: &str) -> Self {
        let lower = label.to_lowercase();
        let has = |markers: &[&str]| markers.iter().any(|m| lower.contains(m));

        if has(TIME_MARKERS) {
            ExerciseKind::Time
        } else if has(STRENGTH_MARKERS) {
            ExerciseKind::Strength
        } else if has(REPETITION_MARKERS) {
            ExerciseKind::Repetitions
        } else if has(DISTANCE_MARKERS) {
            ExerciseKind::Distance
        } else {
            ExerciseKind::Other
        }
    }

    pub fn is_time_based(&self) -> bool {
        matches!(self, ExerciseKind::Time)
    }

    /// Kinds whose values must be plain decimals
    pub fn requires_number(&self) -> bool {
        matches!(
            self,
            ExerciseKind::Strength | ExerciseKind::Repetitions | ExerciseKind::Distance
        )
    }

    /// Prompt label for entering a result of this kind
    pub fn input_label(&self) -> &'static str {
        match self {
            ExerciseKind::Time => "Result (HH:MM:SS)",
            ExerciseKind::Strength => "Result (kg)",
            ExerciseKind::Repetitions => "Result (reps)",
            ExerciseKind::Distance => "Result (m)",
            ExerciseKind::Other => "Result",
        }
    }

    pub fn input_hint(&self) -> &'static str {
        match self {
            ExerciseKind::Time => "Format: HH:MM:SS or MM:SS",
            ExerciseKind::Strength => "Number with or without decimals",
            ExerciseKind::Repetitions => "Number of repetitions",
            ExerciseKind::Distance => "Distance in meters",
            ExerciseKind::Other => "",
        }
    }
}

impl std::fmt::Display for ExerciseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ExerciseKind::Time => "time",
            ExerciseKind::Strength => "strength",
            ExerciseKind::Repetitions => "repetitions",
            ExerciseKind::Distance => "distance",
            ExerciseKind::Other => "other",
        };
        f.write_str(name)
    }
}

/// Map a raw value onto a comparable number where higher is always better.
///
/// Never fails: unparsable timed values count as `FALLBACK_DURATION_SECS`,
/// unparsable magnitudes score 0.
pub fn score_value(value: &str, kind: ExerciseKind) -> f64 {
    if kind.is_time_based() {
        let seconds = parse_duration(value).unwrap_or(FALLBACK_DURATION_SECS);
        if seconds == 0 {
            0.0
        } else {
            SCORE_SCALE / seconds as f64
        }
    } else {
        parse_decimal(value).unwrap_or(0.0)
    }
}

pub fn score(result: &ExerciseResult, exercise: &Exercise) -> f64 {
    score_value(&result.value, exercise.kind())
}
