use futures::stream::{FuturesUnordered, StreamExt};
use std::time::Duration;
use tokio_retry::{strategy::ExponentialBackoff, Retry};
use tracing::{debug, warn};

use crate::scoring::PointsCorrection;
use crate::store::DataSource;

const RETRY_BASE_MS: u64 = 10;
const MAX_RETRY_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteReport {
    pub written: usize,
    /// Corrections that still failed after every retry
    pub failed: Vec<PointsCorrection>,
}

impl WriteReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Write every correction concurrently. Each one gets `retries` extra
/// attempts with exponential backoff before it is reported as failed.
pub async fn write_corrections<S: DataSource>(
    source: &S,
    corrections: Vec<PointsCorrection>,
    retries: usize,
) -> WriteReport {
    let mut futures = FuturesUnordered::new();
    for correction in corrections {
        futures.push(async move {
            let strategy = ExponentialBackoff::from_millis(RETRY_BASE_MS)
                .max_delay(MAX_RETRY_DELAY)
                .take(retries);
            let outcome = Retry::spawn(strategy, || {
                source.update_result_points(&correction.result_key, correction.points)
            })
            .await;
            (correction, outcome)
        });
    }

    let mut report = WriteReport::default();
    while let Some((correction, outcome)) = futures.next().await {
        match outcome {
            Ok(()) => {
                debug!(
                    result = %correction.result_key,
                    from = correction.previous,
                    to = correction.points,
                    "points corrected"
                );
                report.written += 1;
            }
            Err(e) => {
                warn!(
                    result = %correction.result_key,
                    points = correction.points,
                    error = %e,
                    "points correction failed"
                );
                report.failed.push(correction);
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Snapshot;
    use anyhow::Result;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct FlakySource {
        failures_left: AtomicUsize,
        attempts: AtomicUsize,
        stored: Mutex<Vec<(String, u32)>>,
    }

    impl FlakySource {
        fn failing(times: usize) -> Self {
            Self {
                failures_left: AtomicUsize::new(times),
                attempts: AtomicUsize::new(0),
                stored: Mutex::new(Vec::new()),
            }
        }
    }

    impl DataSource for FlakySource {
        async fn fetch_all(&self) -> Result<Snapshot> {
            Ok(Snapshot::new())
        }

        async fn update_result_points(&self, result_key: &str, points: u32) -> Result<()> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            let left = self.failures_left.load(Ordering::SeqCst);
            if left > 0 {
                self.failures_left.store(left - 1, Ordering::SeqCst);
                anyhow::bail!("storage unavailable");
            }
            self.stored
                .lock()
                .unwrap()
                .push((result_key.to_string(), points));
            Ok(())
        }
    }

    fn correction(id: u32, points: u32) -> PointsCorrection {
        PointsCorrection {
            result_id: id,
            result_key: format!("res-{:06}", id),
            previous: 0,
            points,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_written() {
        let source = FlakySource::failing(0);
        let report =
            write_corrections(&source, vec![correction(1, 10), correction(2, 6)], 3).await;

        assert_eq!(report.written, 2);
        assert!(report.is_clean());
        let mut stored = source.stored.lock().unwrap().clone();
        stored.sort();
        assert_eq!(
            stored,
            vec![("res-000001".to_string(), 10), ("res-000002".to_string(), 6)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failure_retried() {
        let source = FlakySource::failing(2);
        let report = write_corrections(&source, vec![correction(1, 10)], 3).await;

        assert_eq!(report.written, 1);
        assert!(report.is_clean());
        assert_eq!(source.attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_retries_reported() {
        let source = FlakySource::failing(usize::MAX);
        let report = write_corrections(&source, vec![correction(4, 3)], 2).await;

        assert_eq!(report.written, 0);
        assert_eq!(report.failed, vec![correction(4, 3)]);
        // First attempt plus two retries
        assert_eq!(source.attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_no_corrections() {
        let source = FlakySource::failing(0);
        let report = write_corrections(&source, Vec::new(), 3).await;
        assert_eq!(report, WriteReport::default());
    }
}
