//! Metrics collection and exposition.
//!
//! # Metrics
//! - `keeper_job_runs_total` (counter): runs by job, outcome
//! - `keeper_transactions_total` (counter): transactions by kind, status
//! - `keeper_credential_refresh_total` (counter): refreshes by outcome
//! - `keeper_uploads_total` (counter): station uploads by outcome
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter.

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_job_run(job: &'static str, outcome: &'static str) {
    metrics::counter!("keeper_job_runs_total", "job" => job, "outcome" => outcome).increment(1);
}

pub fn record_transaction(kind: &'static str, status: &'static str) {
    metrics::counter!("keeper_transactions_total", "kind" => kind, "status" => status).increment(1);
}

pub fn record_credential_refresh(outcome: &'static str) {
    metrics::counter!("keeper_credential_refresh_total", "outcome" => outcome).increment(1);
}

pub fn record_upload(outcome: &'static str) {
    metrics::counter!("keeper_uploads_total", "outcome" => outcome).increment(1);
}
