pub mod writer;

pub use writer::{write_corrections, WriteReport};

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::{sleep_until, timeout, Instant};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::recompute::{recompute_snapshot, RecomputeOutput, RecomputeSettings};
use crate::store::{ChangeEvent, DataSource};

/// Wait before re-running a pass whose corrections could not be written
pub const REQUEUE_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerConfig {
    pub debounce: Duration,
    pub write_retries: usize,
    pub requeue_delay: Duration,
    pub settings: RecomputeSettings,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        (&Config::default()).into()
    }
}

impl From<&Config> for SchedulerConfig {
    fn from(config: &Config) -> Self {
        Self {
            debounce: config.debounce(),
            write_retries: config.write_retries(),
            requeue_delay: REQUEUE_DELAY,
            settings: RecomputeSettings::from(&config.scoring()),
        }
    }
}

/// Projections of one completed recompute
#[derive(Debug, Clone)]
pub struct Publication {
    pub generation: u64,
    pub output: Arc<RecomputeOutput>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    Completed(WriteReport),
    /// A newer change arrived before corrections were written; they were dropped
    Superseded,
    FetchFailed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    pub passes: usize,
    pub superseded: usize,
    pub corrections_written: usize,
    pub corrections_failed: usize,
}

/// Serializes recompute passes over one data source.
///
/// Only the task running [`Scheduler::run`] ever computes, so two passes can
/// never interleave. Change bursts are coalesced into one trailing pass, and
/// at most one further pass is ever pending.
pub struct Scheduler<S> {
    source: Arc<S>,
    config: SchedulerConfig,
    publisher: watch::Sender<Option<Publication>>,
    generation: u64,
    stats: SchedulerStats,
}

impl<S: DataSource> Scheduler<S> {
    pub fn new(source: Arc<S>, config: SchedulerConfig) -> Self {
        let (publisher, _) = watch::channel(None);
        Self {
            source,
            config,
            publisher,
            generation: 0,
            stats: SchedulerStats::default(),
        }
    }

    /// Receive every published projection. The value is `None` until the
    /// first pass completes.
    pub fn subscribe(&self) -> watch::Receiver<Option<Publication>> {
        self.publisher.subscribe()
    }

    /// Run one pass on startup, then one per settled burst of changes, until
    /// the change channel closes.
    pub async fn run(
        mut self,
        mut changes: mpsc::UnboundedReceiver<ChangeEvent>,
    ) -> SchedulerStats {
        let mut open = true;
        let mut pending = true;
        let mut retry_at: Option<Instant> = None;

        loop {
            if !pending {
                if !open {
                    break;
                }
                let requeue = async move {
                    match retry_at {
                        Some(at) => sleep_until(at).await,
                        None => std::future::pending().await,
                    }
                };
                tokio::select! {
                    event = changes.recv() => match event {
                        Some(event) => {
                            debug!(?event, "change received");
                            open = self.settle(&mut changes).await;
                        }
                        None => break,
                    },
                    _ = requeue => debug!("retrying failed corrections"),
                }
                retry_at = None;
            }

            pending = false;
            match self.run_pass(&mut changes).await {
                PassOutcome::Completed(report) => {
                    self.stats.corrections_written += report.written;
                    self.stats.corrections_failed += report.failed.len();
                    if !report.is_clean() {
                        if open {
                            retry_at = Some(Instant::now() + self.config.requeue_delay);
                        } else {
                            warn!(
                                count = report.failed.len(),
                                "shutting down with unwritten corrections"
                            );
                        }
                    }
                }
                PassOutcome::Superseded => {
                    self.stats.superseded += 1;
                    pending = true;
                    if open {
                        open = self.settle(&mut changes).await;
                    }
                }
                PassOutcome::FetchFailed => {
                    if open {
                        retry_at = Some(Instant::now() + self.config.requeue_delay);
                    }
                }
            }
        }

        info!(
            passes = self.stats.passes,
            superseded = self.stats.superseded,
            written = self.stats.corrections_written,
            "scheduler stopped"
        );
        self.stats
    }

    /// Swallow changes until none arrived for a full debounce window.
    /// Returns false once the channel is closed.
    async fn settle(&self, changes: &mut mpsc::UnboundedReceiver<ChangeEvent>) -> bool {
        let mut coalesced = 0usize;
        loop {
            match timeout(self.config.debounce, changes.recv()).await {
                Ok(Some(_)) => coalesced += 1,
                Ok(None) => return false,
                Err(_) => {
                    if coalesced > 0 {
                        debug!(coalesced, "coalesced change burst");
                    }
                    return true;
                }
            }
        }
    }

    /// Fetch, recompute, publish, then write corrections unless a newer change
    /// is already waiting.
    pub async fn run_pass(
        &mut self,
        changes: &mut mpsc::UnboundedReceiver<ChangeEvent>,
    ) -> PassOutcome {
        self.stats.passes += 1;

        let snapshot = match self.source.fetch_all().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = %e, "failed to fetch data for recompute");
                return PassOutcome::FetchFailed;
            }
        };

        let output = recompute_snapshot(&snapshot, &self.config.settings);
        let corrections = output.corrections.clone();

        self.generation += 1;
        self.publisher.send_replace(Some(Publication {
            generation: self.generation,
            output: Arc::new(output),
        }));

        if drain(changes) {
            info!(
                generation = self.generation,
                dropped = corrections.len(),
                "recompute superseded by newer change"
            );
            return PassOutcome::Superseded;
        }

        if corrections.is_empty() {
            debug!(generation = self.generation, "points already up to date");
            return PassOutcome::Completed(WriteReport::default());
        }

        info!(
            generation = self.generation,
            count = corrections.len(),
            "writing points corrections"
        );
        let report =
            write_corrections(self.source.as_ref(), corrections, self.config.write_retries).await;
        PassOutcome::Completed(report)
    }
}

/// Consume every queued change, reporting whether there was any
fn drain(changes: &mut mpsc::UnboundedReceiver<ChangeEvent>) -> bool {
    let mut newer = false;
    while changes.try_recv().is_ok() {
        newer = true;
    }
    newer
}
