//! IP-based geolocation, the fallback when settings carry no starting
//! position.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::types::{Coordinates, FetchError};

const GEOIP_BASE: &str = "http://ip-api.com";
const REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Deserialize)]
struct GeoIpResponse {
    status: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct GeoIpClient {
    client: Client,
    base_url: String,
}

impl GeoIpClient {
    pub fn new() -> Result<Self, FetchError> {
        Self::with_base_url(GEOIP_BASE)
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

    /// Resolve approximate coordinates for the machine's public IP.
    pub async fn lookup(&self) -> Result<Coordinates, FetchError> {
        let url = format!("{}/json", self.base_url);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body: GeoIpResponse = response
            .json()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))?;

        if body.status.as_deref() == Some("fail") {
            return Err(FetchError::MissingData("geolocation lookup failed"));
        }

        match (body.lat, body.lon) {
            (Some(latitude), Some(longitude)) => {
                tracing::info!("Geolocated to {}, {}", latitude, longitude);
                Ok(Coordinates {
                    latitude,
                    longitude,
                })
            }
            _ => Err(FetchError::MissingData("geolocation response had no coordinates")),
        }
    }
}
