//! Sunrise/sunset client (sunrise-sunset.org).
//!
//! A response without a usable `results` object is not an error: the
//! caller gets the unknown pair and treats the day as always-daylight.

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::types::{Coordinates, FetchError, SunTimes};

const SUNRISE_SUNSET_BASE: &str = "https://api.sunrise-sunset.org";
const REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Deserialize)]
struct SunApiResponse {
    results: Option<SunApiResults>,
}

#[derive(Debug, Deserialize)]
struct SunApiResults {
    sunrise: Option<String>,
    sunset: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SunClient {
    client: Client,
    base_url: String,
}

impl SunClient {
    pub fn new() -> Result<Self, FetchError> {
        Self::with_base_url(SUNRISE_SUNSET_BASE)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch sun times for the given coordinates. `formatted=0`
    /// requests ISO-8601 timestamps.
    pub async fn fetch(&self, coords: Coordinates) -> Result<SunTimes, FetchError> {
        let url = format!(
            "{}/json?lat={}&lng={}&formatted=0",
            self.base_url, coords.latitude, coords.longitude
        );

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body: SunApiResponse = response
            .json()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))?;

        let Some(results) = body.results else {
            tracing::debug!("Sun times response had no results");
            return Ok(SunTimes::default());
        };

        Ok(SunTimes {
            sunrise: parse_timestamp(results.sunrise.as_deref()),
            sunset: parse_timestamp(results.sunset.as_deref()),
        })
    }
}

fn parse_timestamp(value: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = value?;
    match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => Some(ts.with_timezone(&Utc)),
        Err(e) => {
            tracing::debug!("Unparseable sun timestamp {:?}: {}", raw, e);
            None
        }
    }
}
