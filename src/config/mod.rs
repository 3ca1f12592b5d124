mod init;
mod schema;

pub use init::write_starter_config;
pub use schema::{Config, DEFAULT_DEBOUNCE, DEFAULT_POLL_INTERVAL, DEFAULT_WRITE_RETRIES};

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// Get the config directory path (~/.config/fitboard/)
pub fn get_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("fitboard")
}

/// Get the default config file path (~/.config/fitboard/config.yaml)
pub fn get_config_path() -> PathBuf {
    get_config_dir().join("config.yaml")
}

/// Load configuration from a YAML file
///
/// # Arguments
///
/// * `path` - Optional path to config file. If None, uses default path (~/.config/fitboard/config.yaml)
///
/// # Errors
///
/// Returns an error if:
/// - An explicitly given config file does not exist
/// - The config file cannot be read
/// - The YAML cannot be parsed
///
/// A missing file at the default path is not an error: defaults are used.
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let explicit = path.is_some();
    let config_path = path.unwrap_or_else(get_config_path);

    if !config_path.exists() {
        if explicit {
            anyhow::bail!("Config file not found at {}", config_path.display());
        }
        return Ok(Config::default());
    }

    let config_content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

    let config: Config = serde_saphyr::from_str(&config_content).with_context(|| {
        format!(
            "Failed to parse config: invalid YAML in {}",
            config_path.display()
        )
    })?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_missing_explicit_path_is_error() {
        let path = env::temp_dir().join("fitboard_test_missing_config.yaml");
        let _ = fs::remove_file(&path);
        assert!(load_config(Some(path)).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let path = env::temp_dir().join("fitboard_test_config.yaml");
        fs::write(&path, "scoring:\n  min_participants: 4\n").unwrap();

        let config = load_config(Some(path.clone())).unwrap();
        assert_eq!(config.scoring().min_participants(), 4);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_invalid_yaml_is_error() {
        let path = env::temp_dir().join("fitboard_test_bad_config.yaml");
        fs::write(&path, "points_per_win: [").unwrap();

        assert!(load_config(Some(path.clone())).is_err());

        let _ = fs::remove_file(&path);
    }
}
