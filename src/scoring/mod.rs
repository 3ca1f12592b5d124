pub mod config;
pub mod duration;
pub mod engine;
pub mod factors;
pub mod validation;

pub use config::*;
pub use duration::{format_clock, format_pace, parse_decimal, parse_duration, FormatError};
pub use engine::{rank_all, rank_exercise, ExerciseRanking, PointsCorrection, RankedResult};
pub use factors::{score, score_value, ExerciseKind};
pub use validation::{check_value, validate_config, validate_value, ValidationError};
