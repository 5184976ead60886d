//! Weather station relay.
//!
//! # Data Flow
//! ```text
//! StationPoller::poll_once
//!     → CredentialStore::current (bearer token)
//!     → TelemetrySource::fetch_device
//!         401 → backoff → CredentialStore::refresh → fetch once more
//!     → current_weather? ── none ──▶ log, done
//!     → ImperialObservation::from_metric
//!     → WeatherSink::upload (failure logged, not retried)
//! ```

pub mod client;
pub mod credential;
pub mod poller;
pub mod publish;
pub mod types;

use reqwest::StatusCode;
use thiserror::Error;

pub use client::{TelemetrySource, WeatherXmClient};
pub use credential::{CredentialStore, StationCredential};
pub use poller::{PollOutcome, StationPoller};
pub use publish::{ImperialObservation, WeatherSink, WundergroundUploader};
pub use types::{CurrentWeather, DeviceResponse};

fn status_suffix(status: &Option<StatusCode>) -> String {
    status.map(|s| format!(" ({})", s)).unwrap_or_default()
}

/// Station relay failures.
#[derive(Debug, Error)]
pub enum StationError {
    /// The telemetry service rejected the bearer token.
    #[error("station credential expired")]
    AuthExpired,

    #[error("device fetch failed{}: {message}", status_suffix(.status))]
    Fetch {
        status: Option<StatusCode>,
        message: String,
    },

    #[error("credential refresh failed{}: {message}", status_suffix(.status))]
    Refresh {
        status: Option<StatusCode>,
        message: String,
    },

    #[error("invalid observation timestamp {0:?}")]
    Timestamp(String),

    /// A required measurement was null or absent.
    #[error("observation missing {}", .missing.join(", "))]
    Incomplete { missing: Vec<&'static str> },

    #[error("upload failed{}: {message}", status_suffix(.status))]
    Upload {
        status: Option<StatusCode>,
        message: String,
    },
}
