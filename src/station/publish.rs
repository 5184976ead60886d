//! Imperial conversion and upload to the third-party weather network.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use std::time::Duration;

use crate::config::UploadConfig;
use crate::station::types::CurrentWeather;
use crate::station::StationError;

const HPA_TO_INHG: f64 = 0.02953;
const MM_TO_IN: f64 = 0.0393701;
const KMH_TO_MPH: f64 = 0.621371;

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

pub fn hpa_to_inhg(hpa: f64) -> f64 {
    hpa * HPA_TO_INHG
}

pub fn mm_to_in(mm: f64) -> f64 {
    mm * MM_TO_IN
}

pub fn kmh_to_mph(kmh: f64) -> f64 {
    kmh * KMH_TO_MPH
}

/// `yyyy-MM-dd HH:mm:ss` in UTC.
pub fn format_dateutc(timestamp: &str) -> Result<String, StationError> {
    let parsed = DateTime::parse_from_rfc3339(timestamp)
        .map_err(|_| StationError::Timestamp(timestamp.to_string()))?;
    Ok(parsed.with_timezone(&Utc).format("%Y-%m-%d %H:%M:%S").to_string())
}

/// One observation in upload units. Absent metric fields stay absent.
#[derive(Debug, Clone, PartialEq)]
pub struct ImperialObservation {
    pub dateutc: String,
    pub tempf: f64,
    pub humidity: f64,
    pub baromin: f64,
    pub dewptf: Option<f64>,
    pub rainin: Option<f64>,
    pub dailyrainin: Option<f64>,
    pub windspeedmph: Option<f64>,
    pub windgustmph: Option<f64>,
    pub winddir: Option<f64>,
    pub uv: Option<f64>,
    pub solarradiation: Option<f64>,
}

impl ImperialObservation {
    /// Fails with `Incomplete` when temperature, humidity or pressure is absent.
    pub fn from_metric(weather: &CurrentWeather) -> Result<Self, StationError> {
        let (Some(temperature), Some(humidity), Some(pressure)) =
            (weather.temperature, weather.humidity, weather.pressure)
        else {
            let missing = [
                ("temperature", weather.temperature),
                ("humidity", weather.humidity),
                ("pressure", weather.pressure),
            ]
            .into_iter()
            .filter(|(_, value)| value.is_none())
            .map(|(name, _)| name)
            .collect();
            return Err(StationError::Incomplete { missing });
        };

        Ok(Self {
            dateutc: format_dateutc(&weather.timestamp)?,
            tempf: celsius_to_fahrenheit(temperature),
            humidity,
            baromin: hpa_to_inhg(pressure),
            dewptf: weather.dew_point.map(celsius_to_fahrenheit),
            rainin: weather.precipitation.map(mm_to_in),
            dailyrainin: weather.precipitation_accumulated.map(mm_to_in),
            windspeedmph: weather.wind_speed.map(kmh_to_mph),
            windgustmph: weather.wind_gust.map(kmh_to_mph),
            winddir: weather.wind_direction,
            uv: weather.uv_index,
            solarradiation: weather.solar_irradiance,
        })
    }

    /// Measurement query parameters, without station credentials.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("dateutc", self.dateutc.clone()),
            ("tempf", self.tempf.to_string()),
            ("humidity", self.humidity.to_string()),
            ("baromin", self.baromin.to_string()),
        ];
        let optional = [
            ("dewptf", self.dewptf),
            ("rainin", self.rainin),
            ("dailyrainin", self.dailyrainin),
            ("windspeedmph", self.windspeedmph),
            ("windgustmph", self.windgustmph),
            ("winddir", self.winddir),
            ("UV", self.uv),
            ("solarradiation", self.solarradiation),
        ];
        pairs.extend(
            optional
                .into_iter()
                .filter_map(|(key, value)| value.map(|v| (key, v.to_string()))),
        );
        pairs
    }
}

/// Destination for converted observations.
#[async_trait]
pub trait WeatherSink: Send + Sync {
    async fn upload(&self, observation: &ImperialObservation) -> Result<(), StationError>;
}

/// Weather Underground `updateweatherstation.php` uploader.
#[derive(Clone)]
pub struct WundergroundUploader {
    client: Client,
    url: String,
    station_id: String,
    station_password: String,
}

impl WundergroundUploader {
    pub fn new(config: &UploadConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self::with_client(
            client,
            &config.url,
            &config.station_id,
            &config.station_password,
        ))
    }

    pub fn with_client(client: Client, url: &str, station_id: &str, station_password: &str) -> Self {
        Self {
            client,
            url: url.to_string(),
            station_id: station_id.to_string(),
            station_password: station_password.to_string(),
        }
    }
}

impl std::fmt::Debug for WundergroundUploader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WundergroundUploader")
            .field("url", &self.url)
            .field("station_id", &self.station_id)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl WeatherSink for WundergroundUploader {
    async fn upload(&self, observation: &ImperialObservation) -> Result<(), StationError> {
        let mut query = vec![
            ("ID", self.station_id.clone()),
            ("PASSWORD", self.station_password.clone()),
        ];
        query.extend(observation.query_pairs());
        query.push(("action", "updateraw".to_string()));

        let response = self
            .client
            .get(&self.url)
            .query(&query)
            .send()
            .await
            .map_err(|e| StationError::Upload {
                status: None,
                message: e.to_string(),
            })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(StationError::Upload {
                status: Some(status),
                message: body,
            });
        }

        tracing::debug!(station_id = %self.station_id, response = %body.trim(), "Observation uploaded");
        Ok(())
    }
}
