use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::scoring::ScoringConfig;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);
pub const DEFAULT_WRITE_RETRIES: usize = 3;

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Path of the JSON data store (defaults to ~/.config/fitboard/data.json)
    #[serde(default)]
    pub data: Option<PathBuf>,

    /// Quiet period before a burst of changes triggers a recompute, e.g. "500ms"
    #[serde(default)]
    pub debounce: Option<String>,

    /// How often `watch` checks the data store for changes, e.g. "2s"
    #[serde(default)]
    pub poll_interval: Option<String>,

    /// Retries per points correction before a follow-up pass is scheduled
    #[serde(default)]
    pub write_retries: Option<usize>,

    #[serde(default)]
    pub scoring: Option<ScoringConfig>,
}

impl Config {
    pub fn data_path(&self) -> PathBuf {
        self.data
            .clone()
            .unwrap_or_else(crate::store::get_data_path)
    }

    pub fn debounce(&self) -> Duration {
        parse_or(self.debounce.as_deref(), DEFAULT_DEBOUNCE)
    }

    pub fn poll_interval(&self) -> Duration {
        parse_or(self.poll_interval.as_deref(), DEFAULT_POLL_INTERVAL)
    }

    pub fn write_retries(&self) -> usize {
        self.write_retries.unwrap_or(DEFAULT_WRITE_RETRIES)
    }

    pub fn scoring(&self) -> ScoringConfig {
        self.scoring.clone().unwrap_or_default()
    }

    /// A fully populated config, used when writing a starter file
    pub fn starter() -> Self {
        Self {
            data: None,
            debounce: Some(humantime::format_duration(DEFAULT_DEBOUNCE).to_string()),
            poll_interval: Some(humantime::format_duration(DEFAULT_POLL_INTERVAL).to_string()),
            write_retries: Some(DEFAULT_WRITE_RETRIES),
            scoring: Some(ScoringConfig::default()),
        }
    }
}

// Invalid strings are reported by validate_config before this is reached
fn parse_or(text: Option<&str>, default: Duration) -> Duration {
    text.and_then(|t| humantime::parse_duration(t).ok())
        .unwrap_or(default)
}
