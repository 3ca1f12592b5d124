use super::types::{Snapshot, SNAPSHOT_VERSION};
use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Get the default data file path (~/.config/fitboard/data.json)
pub fn get_data_path() -> PathBuf {
    crate::config::get_config_dir().join("data.json")
}

/// Load a snapshot from a JSON file
///
/// If the file doesn't exist, returns a new empty snapshot.
/// If the file exists but has an unsupported version, returns an error.
/// Records without a unique storage key get one derived from their id.
pub fn load_snapshot(path: &Path) -> Result<Snapshot> {
    if !path.exists() {
        return Ok(Snapshot::new());
    }

    let file = File::open(path)
        .with_context(|| format!("Failed to open data file at {}", path.display()))?;

    let mut snapshot: Snapshot = serde_json::from_reader(file)
        .with_context(|| format!("Failed to load data from {}", path.display()))?;

    if snapshot.version != SNAPSHOT_VERSION {
        anyhow::bail!("Unsupported data file version: {}", snapshot.version);
    }

    let assigned = snapshot.assign_missing_keys();
    if assigned > 0 {
        debug!(assigned, path = %path.display(), "assigned missing storage keys");
    }

    Ok(snapshot)
}

/// Save a snapshot to a JSON file atomically
///
/// The file is never left half-written: readers see either the old or the
/// new document. Creates the parent directory if it doesn't exist.
pub fn save_snapshot(path: &Path, snapshot: &Snapshot) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    serde_json::to_writer_pretty(&mut file, snapshot).context("Failed to serialize data")?;

    file.commit().context("Failed to save data")?;

    Ok(())
}
