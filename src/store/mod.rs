pub mod storage;
pub mod types;

pub use storage::{get_data_path, load_snapshot, save_snapshot};
pub use types::{Snapshot, SnapshotError, SNAPSHOT_VERSION};

use anyhow::Result;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, warn};

/// Shortest period the file watcher polls at
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Notification that the stored data may have changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeEvent {
    /// The backing data changed
    Data,
    /// Recompute requested without a known data change
    Refresh,
}

/// Persistence collaborator the engine reads from and writes corrections to.
pub trait DataSource: Send + Sync + 'static {
    /// Read a consistent copy of employees, exercises and results
    fn fetch_all(&self) -> impl Future<Output = Result<Snapshot>> + Send;

    /// Store a recomputed points value for the result with this storage key
    fn update_result_points(
        &self,
        result_key: &str,
        points: u32,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// JSON file on disk. Every access goes through one lock, so a
/// read-modify-write never interleaves with another in the same process.
///
/// The lock is not shared between processes. A one-shot command run while
/// `fitboard watch` holds the same file can race it, and the later save wins.
/// Points lost that way are restored by the next pass, which the save itself
/// triggers; other edits lost that way are not.
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load, apply `f`, and save only if `f` succeeds
    pub async fn modify<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Snapshot) -> Result<T>,
    {
        let _guard = self.lock.lock().await;
        let mut snapshot = load_snapshot(&self.path)?;
        let value = f(&mut snapshot)?;
        save_snapshot(&self.path, &snapshot)?;
        Ok(value)
    }

    /// Poll the file's modification time and emit `ChangeEvent::Data` when it
    /// moves. The poller stops once the receiver is dropped. Intervals below
    /// `MIN_POLL_INTERVAL` are raised to it.
    pub fn watch(&self, interval: Duration) -> mpsc::UnboundedReceiver<ChangeEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        let path = self.path.clone();
        let interval = interval.max(MIN_POLL_INTERVAL);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            let mut last_seen = modified_at(&path);

            // The first tick fires immediately
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let current = modified_at(&path);
                        if current != last_seen {
                            debug!(path = %path.display(), "data file changed");
                            last_seen = current;
                            if tx.send(ChangeEvent::Data).is_err() {
                                break;
                            }
                        }
                    }
                    _ = tx.closed() => break,
                }
            }
        });

        rx
    }
}

fn modified_at(path: &Path) -> Option<SystemTime> {
    match std::fs::metadata(path).and_then(|m| m.modified()) {
        Ok(time) => Some(time),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot read data file metadata");
            None
        }
    }
}

impl DataSource for FileStore {
    async fn fetch_all(&self) -> Result<Snapshot> {
        let _guard = self.lock.lock().await;
        load_snapshot(&self.path)
    }

    async fn update_result_points(&self, result_key: &str, points: u32) -> Result<()> {
        self.modify(|snapshot| {
            if snapshot.set_points(result_key, points) {
                Ok(())
            } else {
                anyhow::bail!("No result with key '{}'", result_key)
            }
        })
        .await
    }
}
