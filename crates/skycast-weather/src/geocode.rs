//! Reverse geocoding: coordinates to a human-readable place name.
//! Requires the (optional) reverse-geocoding API key; any failure
//! returns `None` and the caller falls back to raw coordinates.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::types::Coordinates;

pub const REVERSE_GEO_BASE: &str = "https://us1.locationiq.com";
const REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Deserialize)]
struct ReverseGeoResponse {
    address: Option<ReverseGeoAddress>,
}

#[derive(Debug, Deserialize)]
struct ReverseGeoAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    county: Option<String>,
    state: Option<String>,
    country: Option<String>,
}

/// Reverse geocode coordinates to a place name (e.g. "Seattle, Washington").
pub async fn reverse_geocode(api_key: &str, coords: Coordinates) -> Option<String> {
    reverse_geocode_at(REVERSE_GEO_BASE, api_key, coords).await
}

/// Same as [`reverse_geocode`] against a non-default origin.
pub async fn reverse_geocode_at(
    base_url: &str,
    api_key: &str,
    coords: Coordinates,
) -> Option<String> {
    let client = match Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
    {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("Failed to create geocoding client: {}", e);
            return None;
        }
    };

    let url = format!(
        "{}/v1/reverse?key={}&lat={}&lon={}&format=json",
        base_url.trim_end_matches('/'),
        api_key,
        coords.latitude,
        coords.longitude
    );

    let response = match client.get(&url).send().await {
        Ok(r) => r,
        Err(e) => {
            tracing::debug!("Reverse geocode request failed: {}", e);
            return None;
        }
    };

    if !response.status().is_success() {
        tracing::debug!("Reverse geocode returned status {}", response.status());
        return None;
    }

    let body: ReverseGeoResponse = match response.json().await {
        Ok(b) => b,
        Err(e) => {
            tracing::debug!("Reverse geocode parse error: {}", e);
            return None;
        }
    };

    let addr = body.address?;

    // Capture state/country before the place chain consumes them
    let state = addr.state.clone();
    let country = addr.country.clone();

    // Prefer city > town > village for the primary place name
    let place = addr
        .city
        .or(addr.town)
        .or(addr.village)
        .or(addr.county)
        .or(addr.state)
        .or(addr.country)?;

    // Add state/country for disambiguation when different from place
    let suffix = state
        .filter(|s| !s.is_empty() && *s != place)
        .or_else(|| country.filter(|c| !c.is_empty() && *c != place));

    let result = match suffix {
        Some(s) => format!("{}, {}", place, s),
        None => place,
    };

    tracing::info!("Reverse geocoded to: {}", result);
    Some(result)
}
