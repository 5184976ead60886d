//! Fixed-interval job runner with an in-flight guard.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;
use tracing::Instrument;
use uuid::Uuid;

use crate::observability::metrics;

pub type JobError = Box<dyn std::error::Error + Send + Sync>;

/// A unit of periodic work.
#[async_trait]
pub trait Job: Send + Sync {
    /// Stable name used in logs and metric labels.
    fn name(&self) -> &'static str;

    async fn run_once(&self) -> Result<(), JobError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Completed,
    Failed,
    /// A run was already in flight.
    Skipped,
}

impl TickOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            TickOutcome::Completed => "completed",
            TickOutcome::Failed => "failed",
            TickOutcome::Skipped => "skipped",
        }
    }
}

struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Drives one [`Job`].
///
/// Clones share the in-flight flag, so a manual [`JobRunner::tick`] racing
/// the scheduled loop is skipped instead of overlapping.
#[derive(Clone)]
pub struct JobRunner {
    job: Arc<dyn Job>,
    interval: Duration,
    in_flight: Arc<AtomicBool>,
}

impl JobRunner {
    pub fn new(job: Arc<dyn Job>, interval: Duration) -> Self {
        Self {
            job,
            interval,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn name(&self) -> &'static str {
        self.job.name()
    }

    pub fn is_running(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Run the job once unless a run is already active.
    pub async fn tick(&self) -> TickOutcome {
        let name = self.job.name();
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::warn!(job = name, "Previous run still in flight, skipping tick");
            metrics::record_job_run(name, TickOutcome::Skipped.as_str());
            return TickOutcome::Skipped;
        }
        let _in_flight = InFlight(&self.in_flight);

        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("job", job = name, run_id = %run_id);
        let started = Instant::now();

        let outcome = match self.job.run_once().instrument(span.clone()).await {
            Ok(()) => TickOutcome::Completed,
            Err(_) => TickOutcome::Failed,
        };

        span.in_scope(|| {
            tracing::info!(
                outcome = outcome.as_str(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Run finished"
            );
        });
        metrics::record_job_run(name, outcome.as_str());
        outcome
    }

    /// Tick on the interval until shutdown. The first tick fires immediately;
    /// ticks missed while a run is active are dropped, not replayed.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!(job = self.name(), interval_secs = self.interval.as_secs(), "Job scheduled");

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    tracing::info!(job = self.name(), "Job stopping");
                    break;
                }
                _ = ticker.tick() => {
                    self.tick().await;
                }
            }
        }
    }
}

impl std::fmt::Debug for JobRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobRunner")
            .field("job", &self.job.name())
            .field("interval", &self.interval)
            .field("in_flight", &self.is_running())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;

    struct CountingJob {
        runs: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl Job for CountingJob {
        fn name(&self) -> &'static str {
            "counting"
        }

        async fn run_once(&self) -> Result<(), JobError> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err("boom".into());
            }
            Ok(())
        }
    }

    struct GatedJob {
        started: Notify,
        release: Notify,
    }

    #[async_trait]
    impl Job for GatedJob {
        fn name(&self) -> &'static str {
            "gated"
        }

        async fn run_once(&self) -> Result<(), JobError> {
            self.started.notify_one();
            self.release.notified().await;
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_tick_reports_outcome() {
        let job = Arc::new(CountingJob { runs: AtomicUsize::new(0), fail: false });
        let runner = JobRunner::new(job.clone(), Duration::from_secs(60));
        assert_eq!(runner.tick().await, TickOutcome::Completed);
        assert!(!runner.is_running());

        let failing = Arc::new(CountingJob { runs: AtomicUsize::new(0), fail: true });
        let runner = JobRunner::new(failing.clone(), Duration::from_secs(60));
        assert_eq!(runner.tick().await, TickOutcome::Failed);
        assert_eq!(runner.tick().await, TickOutcome::Failed);
        assert_eq!(failing.runs.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_overlapping_tick_is_skipped() {
        let job = Arc::new(GatedJob { started: Notify::new(), release: Notify::new() });
        let runner = JobRunner::new(job.clone(), Duration::from_secs(60));

        let background = runner.clone();
        let first = tokio::spawn(async move { background.tick().await });
        job.started.notified().await;

        assert!(runner.is_running());
        assert_eq!(runner.tick().await, TickOutcome::Skipped);

        job.release.notify_one();
        assert_eq!(first.await.unwrap(), TickOutcome::Completed);
        assert!(!runner.is_running());
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let job = Arc::new(CountingJob { runs: AtomicUsize::new(0), fail: false });
        let runner = JobRunner::new(job.clone(), Duration::from_secs(3600));
        let (tx, rx) = broadcast::channel(1);

        let handle = tokio::spawn(runner.run(rx));
        tokio::time::sleep(Duration::from_millis(50)).await;
        tx.send(()).unwrap();
        handle.await.unwrap();

        assert_eq!(job.runs.load(Ordering::SeqCst), 1);
    }
}
