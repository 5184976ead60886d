//! Shutdown coordination for scheduled jobs.

use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Broadcasts a stop signal to every job loop, then waits for them.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// Number of job loops still listening.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Trigger, then wait up to `grace` for each task. A run in progress is
    /// allowed to finish; tasks still running after the deadline are aborted.
    pub async fn drain(&self, tasks: Vec<JoinHandle<()>>, grace: Duration) {
        self.trigger();
        let deadline = tokio::time::Instant::now() + grace;

        for mut task in tasks {
            match tokio::time::timeout_at(deadline, &mut task).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::error!(error = %e, "Job task ended abnormally"),
                Err(_) => {
                    tracing::warn!(grace_secs = grace.as_secs(), "Job did not stop in time, aborting");
                    task.abort();
                }
            }
        }
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
