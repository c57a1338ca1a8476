//! Background polling: one supervised task per data kind, keyed to the
//! active coordinates. A coordinate change cancels the whole task set
//! and spawns a fresh one, so at most one set is ever live.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, Utc};
use tokio_util::sync::CancellationToken;

use skycast_weather::types::Coordinates;

use crate::state::AppState;

/// Poll cadences. [`Default`] is the production schedule; tests shrink
/// the intervals.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub current_interval: Duration,
    pub hourly_interval: Duration,
    pub daily_interval: Duration,
    pub sun_interval: Duration,
    pub radar_interval: Duration,
    pub dark_interval: Duration,
    pub saver_interval: Duration,
    pub night_clock_interval: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            current_interval: Duration::from_secs(3 * 60),
            hourly_interval: Duration::from_secs(60 * 60),
            daily_interval: Duration::from_secs(24 * 60 * 60),
            sun_interval: Duration::from_secs(60 * 60),
            radar_interval: Duration::from_secs(3 * 60),
            dark_interval: Duration::from_secs(60),
            saver_interval: Duration::from_secs(60),
            night_clock_interval: Duration::from_secs(30),
        }
    }
}

/// Owns the polling task sets and the display-mode tickers.
pub struct PollEngine {
    state: Arc<AppState>,
    config: EngineConfig,
    shutdown: CancellationToken,
    active_pollers: Arc<AtomicUsize>,
}

impl PollEngine {
    pub fn new(state: Arc<AppState>, config: EngineConfig) -> Self {
        Self {
            state,
            config,
            shutdown: CancellationToken::new(),
            active_pollers: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Token that stops the engine (and every task it spawned) when
    /// cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Number of live coordinate-keyed poller tasks.
    pub fn active_pollers(&self) -> usize {
        self.active_pollers.load(Ordering::SeqCst)
    }

    /// Drive the engine until shutdown. Restarts the poller set on
    /// every coordinate change.
    pub async fn run(&self) {
        self.spawn_mode_tickers();

        let mut rx = self.state.subscribe_coordinates();
        let mut pollers: Option<CancellationToken> = None;

        loop {
            let coords = *rx.borrow_and_update();
            if let Some(coords) = coords {
                if let Some(previous) = pollers.take() {
                    previous.cancel();
                }
                let token = self.shutdown.child_token();
                self.spawn_pollers(coords, token.clone());
                pollers = Some(token);
            }

            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                changed = rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        if let Some(token) = pollers {
            token.cancel();
        }
        tracing::info!("Poll engine stopped");
    }

    fn spawn_pollers(&self, coords: Coordinates, token: CancellationToken) {
        tracing::info!(
            "Starting pollers for {}, {}",
            coords.latitude,
            coords.longitude
        );

        let state = self.state.clone();
        self.spawn_poller("current", token.clone(), self.config.current_interval, move || {
            let state = state.clone();
            async move {
                if let Err(e) = state.update_current_weather(Some(coords)).await {
                    tracing::warn!("Current weather poll failed: {}", e);
                }
            }
        });

        let state = self.state.clone();
        self.spawn_poller("hourly", token.clone(), self.config.hourly_interval, move || {
            let state = state.clone();
            async move {
                if let Err(e) = state.update_hourly_weather(Some(coords)).await {
                    tracing::warn!("Hourly forecast poll failed: {}", e);
                }
            }
        });

        let state = self.state.clone();
        self.spawn_poller("daily", token.clone(), self.config.daily_interval, move || {
            let state = state.clone();
            async move {
                if let Err(e) = state.update_daily_weather(Some(coords)).await {
                    tracing::warn!("Daily forecast poll failed: {}", e);
                }
            }
        });

        let state = self.state.clone();
        self.spawn_poller("sun", token.clone(), self.config.sun_interval, move || {
            let state = state.clone();
            async move {
                if let Err(e) = state.update_sun_times(Some(coords)).await {
                    tracing::warn!("Sun times poll failed: {}", e);
                }
            }
        });

        let state = self.state.clone();
        self.spawn_poller("radar", token, self.config.radar_interval, move || {
            let state = state.clone();
            async move {
                if let Err(e) = state.update_radar_frames().await {
                    tracing::warn!("Radar poll failed: {}", e);
                }
            }
        });

        // One-shot place-name lookup for the new position.
        let state = self.state.clone();
        tokio::spawn(async move {
            state.update_location_name(coords).await;
        });
    }

    fn spawn_poller<F, Fut>(
        &self,
        kind: &'static str,
        token: CancellationToken,
        period: Duration,
        mut work: F,
    ) where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send,
    {
        let counter = self.active_pollers.clone();
        counter.fetch_add(1, Ordering::SeqCst);
        tokio::spawn(async move {
            // First tick fires immediately, so a new position is
            // fetched without waiting out the period.
            let mut ticker = tokio::time::interval(period);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => work().await,
                }
            }
            tracing::debug!("Stopped {} poller", kind);
            counter.fetch_sub(1, Ordering::SeqCst);
        });
    }

    fn spawn_mode_tickers(&self) {
        let state = self.state.clone();
        let token = self.shutdown.clone();
        let period = self.config.dark_interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => state.tick_dark_mode(Utc::now()),
                }
            }
        });

        let state = self.state.clone();
        let token = self.shutdown.clone();
        let period = self.config.saver_interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => state.tick_screensaver(Utc::now()),
                }
            }
        });

        let state = self.state.clone();
        let token = self.shutdown.clone();
        let period = self.config.night_clock_interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => state.tick_night_clock(&Local::now()),
                }
            }
        });
    }
}
