pub mod config;
pub mod leaderboard;
pub mod model;
pub mod output;
pub mod pace;
pub mod recompute;
pub mod scheduler;
pub mod scoring;
pub mod store;

pub use pace::pace_label as calculate_pace;
pub use recompute::{recompute, recompute_snapshot, RecomputeOutput, RecomputeSettings};
pub use scoring::validate_value as validate_result_value;
