//! Telemetry service payloads.

use serde::{Deserialize, Serialize};

/// A device as returned by `GET /me/devices/{id}`.
///
/// Only the fields the relay reads are modelled; the rest are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceResponse {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub current_weather: Option<CurrentWeather>,
}

/// Latest observation in metric units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    /// RFC 3339 timestamp.
    pub timestamp: String,
    /// °C
    #[serde(default)]
    pub temperature: Option<f64>,
    /// %
    #[serde(default)]
    pub humidity: Option<f64>,
    /// hPa
    #[serde(default)]
    pub pressure: Option<f64>,
    /// km/h
    #[serde(default)]
    pub wind_speed: Option<f64>,
    /// km/h
    #[serde(default)]
    pub wind_gust: Option<f64>,
    /// degrees
    #[serde(default)]
    pub wind_direction: Option<f64>,
    /// W/m²
    #[serde(default)]
    pub solar_irradiance: Option<f64>,
    #[serde(default)]
    pub uv_index: Option<f64>,
    /// mm/h
    #[serde(default)]
    pub precipitation: Option<f64>,
    /// °C
    #[serde(default)]
    pub dew_point: Option<f64>,
    /// mm since local midnight
    #[serde(default)]
    pub precipitation_accumulated: Option<f64>,
    #[serde(default)]
    pub feels_like: Option<f64>,
    #[serde(default)]
    pub icon: Option<String>,
}

/// Body of a successful `POST /auth/refresh`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RefreshResponse {
    pub token: String,
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
}
