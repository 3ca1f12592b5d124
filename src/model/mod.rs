pub mod types;

pub use types::{Employee, Exercise, ExerciseResult, ResultStatus};
