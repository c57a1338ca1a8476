//! Open-Meteo forecast client. One method per weather kind; each
//! selects the metrics the kiosk actually renders.

use reqwest::Client;
use std::time::Duration;

use crate::types::{Coordinates, CurrentForecast, DailyForecast, FetchError, HourlyForecast};

const OPEN_METEO_BASE: &str = "https://api.open-meteo.com";
const REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct ForecastClient {
    client: Client,
    base_url: String,
}

impl ForecastClient {
    pub fn new() -> Result<Self, FetchError> {
        Self::with_base_url(OPEN_METEO_BASE)
    }

    /// Client against a non-default origin (mock servers in tests).
    pub fn with_base_url(base_url: &str) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Current conditions for the given coordinates.
    pub async fn fetch_current(&self, coords: Coordinates) -> Result<CurrentForecast, FetchError> {
        let url = format!(
            "{}/v1/forecast?latitude={}&longitude={}&current=temperature_2m,relative_humidity_2m,precipitation,wind_speed_10m,weather_code,cloud_cover&timezone=auto",
            self.base_url, coords.latitude, coords.longitude
        );
        self.get_json(&url).await
    }

    /// One day of hourly series for the given coordinates.
    pub async fn fetch_hourly(&self, coords: Coordinates) -> Result<HourlyForecast, FetchError> {
        let url = format!(
            "{}/v1/forecast?latitude={}&longitude={}&hourly=temperature_2m,precipitation_probability,precipitation,wind_speed_10m&timezone=auto&forecast_days=1",
            self.base_url, coords.latitude, coords.longitude
        );
        self.get_json(&url).await
    }

    /// Five days of daily series for the given coordinates.
    pub async fn fetch_daily(&self, coords: Coordinates) -> Result<DailyForecast, FetchError> {
        let url = format!(
            "{}/v1/forecast?latitude={}&longitude={}&daily=temperature_2m_max,temperature_2m_min,precipitation_probability_max,precipitation_sum,wind_speed_10m_max,weather_code&timezone=auto&forecast_days=5",
            self.base_url, coords.latitude, coords.longitude
        );
        self.get_json(&url).await
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        tracing::debug!("Forecast request: {}", url);
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        response
            .json()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))
    }
}
