//! RainViewer radar frame metadata, with a two-tier fallback: the
//! current index endpoint first, then the legacy flat timestamp list
//! reshaped into the same frame-descriptor form.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::types::{FetchError, RadarFrame, RadarSweep};

const RAINVIEWER_BASE: &str = "https://api.rainviewer.com";
const DEFAULT_TILE_HOST: &str = "https://tilecache.rainviewer.com";
const REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Deserialize)]
struct IndexResponse {
    host: Option<String>,
    radar: Option<IndexRadar>,
}

#[derive(Debug, Deserialize)]
struct IndexRadar {
    past: Option<Vec<IndexFrame>>,
}

#[derive(Debug, Deserialize)]
struct IndexFrame {
    time: i64,
    path: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RadarClient {
    client: Client,
    base_url: String,
}

impl RadarClient {
    pub fn new() -> Result<Self, FetchError> {
        Self::with_base_url(RAINVIEWER_BASE)
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

    /// Fetch the available radar frames. Falls back to the legacy
    /// endpoint when the current index yields no frames; if both
    /// endpoints fail, the legacy error is propagated.
    pub async fn fetch_frames(&self) -> Result<RadarSweep, FetchError> {
        match self.fetch_index().await {
            Ok(sweep) if !sweep.frames.is_empty() => return Ok(sweep),
            Ok(_) => {
                tracing::debug!("Radar index returned no frames, trying legacy endpoint");
            }
            Err(e) => {
                tracing::debug!("Radar index failed ({}), trying legacy endpoint", e);
            }
        }

        self.fetch_legacy().await
    }

    async fn fetch_index(&self) -> Result<RadarSweep, FetchError> {
        let url = format!("{}/public/weather-maps.json", self.base_url);
        let body: IndexResponse = self.get_json(&url).await?;

        let host = body.host.unwrap_or_else(|| DEFAULT_TILE_HOST.to_string());
        let frames = body
            .radar
            .and_then(|r| r.past)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|frame| {
                frame.path.map(|path| RadarFrame {
                    time: frame.time,
                    path,
                })
            })
            .collect();

        Ok(RadarSweep { host, frames })
    }

    async fn fetch_legacy(&self) -> Result<RadarSweep, FetchError> {
        let url = format!("{}/public/maps.json", self.base_url);
        let timestamps: Vec<i64> = self.get_json(&url).await?;

        Ok(RadarSweep {
            host: DEFAULT_TILE_HOST.to_string(),
            frames: reshape_legacy(&timestamps),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
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

/// Reshape the legacy flat timestamp list into frame descriptors.
pub fn reshape_legacy(timestamps: &[i64]) -> Vec<RadarFrame> {
    timestamps
        .iter()
        .map(|ts| RadarFrame {
            time: *ts,
            path: format!("/v2/radar/{ts}"),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_timestamps_reshape_into_frames() {
        let frames = reshape_legacy(&[1724900000, 1724900600]);
        assert_eq!(
            frames,
            vec![
                RadarFrame {
                    time: 1724900000,
                    path: "/v2/radar/1724900000".into()
                },
                RadarFrame {
                    time: 1724900600,
                    path: "/v2/radar/1724900600".into()
                },
            ]
        );
    }

    #[test]
    fn empty_legacy_list_yields_no_frames() {
        assert!(reshape_legacy(&[]).is_empty());
    }
}
