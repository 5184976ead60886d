//! Telemetry service client.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::json;
use std::time::Duration;

use crate::config::StationConfig;
use crate::station::credential::StationCredential;
use crate::station::types::{DeviceResponse, RefreshResponse};
use crate::station::StationError;

/// Source of device telemetry.
#[async_trait]
pub trait TelemetrySource: Send + Sync {
    /// Fetch the device. A rejected token maps to [`StationError::AuthExpired`].
    async fn fetch_device(&self, access_token: &str) -> Result<DeviceResponse, StationError>;

    /// Exchange a refresh token for a new credential pair.
    async fn refresh(&self, refresh_token: &str) -> Result<StationCredential, StationError>;
}

/// WeatherXM REST client.
#[derive(Debug, Clone)]
pub struct WeatherXmClient {
    client: Client,
    base_url: String,
    device_id: String,
}

impl WeatherXmClient {
    pub fn new(config: &StationConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self::with_client(client, &config.base_url, &config.device_id))
    }

    pub fn with_client(client: Client, base_url: &str, device_id: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            device_id: device_id.to_string(),
        }
    }
}

#[async_trait]
impl TelemetrySource for WeatherXmClient {
    async fn fetch_device(&self, access_token: &str) -> Result<DeviceResponse, StationError> {
        let url = format!("{}/me/devices/{}", self.base_url, self.device_id);
        let response = self
            .client
            .get(&url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| StationError::Fetch {
                status: None,
                message: e.to_string(),
            })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(StationError::AuthExpired);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StationError::Fetch {
                status: Some(status),
                message: body,
            });
        }

        let device = response
            .json::<DeviceResponse>()
            .await
            .map_err(|e| StationError::Fetch {
                status: Some(status),
                message: format!("invalid device body: {e}"),
            })?;

        tracing::debug!(device_id = %self.device_id, has_weather = device.current_weather.is_some(), "Fetched device");
        Ok(device)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<StationCredential, StationError> {
        let url = format!("{}/auth/refresh", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&json!({ "refreshToken": refresh_token }))
            .send()
            .await
            .map_err(|e| StationError::Refresh {
                status: None,
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StationError::Refresh {
                status: Some(status),
                message: body,
            });
        }

        let body = response
            .json::<RefreshResponse>()
            .await
            .map_err(|e| StationError::Refresh {
                status: Some(status),
                message: format!("invalid refresh body: {e}"),
            })?;

        Ok(StationCredential::new(body.token, body.refresh_token))
    }
}
