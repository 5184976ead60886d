//! One fetch-convert-upload cycle per tick.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::lifecycle::scheduler::{Job, JobError};
use crate::observability::metrics;
use crate::station::client::TelemetrySource;
use crate::station::credential::CredentialStore;
use crate::station::publish::{ImperialObservation, WeatherSink};
use crate::station::types::DeviceResponse;
use crate::station::StationError;

/// Result of a poll that did not fail outright.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    Uploaded(ImperialObservation),
    /// Device had no `current_weather` block.
    NoCurrentWeather,
    /// Required measurements were null; nothing uploaded.
    Incomplete(Vec<&'static str>),
    /// Upload was rejected; logged, not retried.
    UploadFailed(String),
}

pub struct StationPoller {
    source: Arc<dyn TelemetrySource>,
    sink: Arc<dyn WeatherSink>,
    credentials: Arc<CredentialStore>,
    refresh_backoff: Duration,
}

impl StationPoller {
    pub fn new(
        source: Arc<dyn TelemetrySource>,
        sink: Arc<dyn WeatherSink>,
        credentials: Arc<CredentialStore>,
        refresh_backoff: Duration,
    ) -> Self {
        Self {
            source,
            sink,
            credentials,
            refresh_backoff,
        }
    }

    pub fn credentials(&self) -> &Arc<CredentialStore> {
        &self.credentials
    }

    pub async fn poll_once(&self) -> Result<PollOutcome, StationError> {
        let device = self.fetch_telemetry().await?;

        let Some(weather) = device.current_weather else {
            tracing::warn!(device_id = %device.id, "Device has no current weather, nothing to upload");
            return Ok(PollOutcome::NoCurrentWeather);
        };

        let observation = match ImperialObservation::from_metric(&weather) {
            Ok(observation) => observation,
            Err(StationError::Incomplete { missing }) => {
                tracing::warn!(
                    device_id = %device.id,
                    timestamp = %weather.timestamp,
                    missing = ?missing,
                    "Observation incomplete, skipping upload"
                );
                return Ok(PollOutcome::Incomplete(missing));
            }
            Err(e) => return Err(e),
        };
        match self.sink.upload(&observation).await {
            Ok(()) => {
                metrics::record_upload("success");
                tracing::info!(
                    dateutc = %observation.dateutc,
                    tempf = observation.tempf,
                    humidity = observation.humidity,
                    baromin = observation.baromin,
                    "Observation uploaded"
                );
                Ok(PollOutcome::Uploaded(observation))
            }
            Err(e) => {
                metrics::record_upload("failed");
                tracing::warn!(error = %e, dateutc = %observation.dateutc, "Observation upload failed");
                Ok(PollOutcome::UploadFailed(e.to_string()))
            }
        }
    }

    /// Fetch the device, refreshing the credential at most once.
    pub async fn fetch_telemetry(&self) -> Result<DeviceResponse, StationError> {
        let mut refreshed = false;
        loop {
            let credential = self.credentials.current();
            match self.source.fetch_device(&credential.access_token).await {
                Err(StationError::AuthExpired) if !refreshed => {
                    tracing::warn!(
                        backoff_secs = self.refresh_backoff.as_secs(),
                        "Station token rejected, refreshing"
                    );
                    tokio::time::sleep(self.refresh_backoff).await;
                    self.credentials
                        .refresh(&credential, self.source.as_ref())
                        .await?;
                    refreshed = true;
                }
                result => return result,
            }
        }
    }
}

#[async_trait]
impl Job for StationPoller {
    fn name(&self) -> &'static str {
        "station_poll"
    }

    async fn run_once(&self) -> Result<(), JobError> {
        match self.poll_once().await {
            Ok(_) => Ok(()),
            Err(e) => {
                tracing::error!(error = %e, "Station poll failed");
                Err(Box::new(e))
            }
        }
    }
}
