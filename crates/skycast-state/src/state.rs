//! The shared application state container: single source of truth for
//! every mutable value the kiosk renders, plus the named mutators that
//! update it. Fetch operations write through per-kind [`FetchState`]
//! values; preference mutators write through to the preference store.

use chrono::{DateTime, Timelike, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use tokio::sync::watch;

use skycast_core::settings::{Settings, SettingsStore};
use skycast_core::units::{ClockFormat, LengthUnit, SpeedUnit, TemperatureUnit};
use skycast_weather::types::{
    Coordinates, CurrentForecast, DailyForecast, FetchError, HourlyForecast, RadarSweep, SunTimes,
};
use skycast_weather::{geocode, ForecastClient, GeoIpClient, RadarClient, SunClient};

use crate::modes::{night_clock_active, DarkMode, RenderMode, Screensaver};
use crate::prefs::{
    PrefStore, Preferences, ScreensaverKind, CLOCK_FORMAT_KEY, LENGTH_UNIT_KEY, MOUSE_HIDE_KEY,
    SCREENSAVER_DURATION_KEY, SCREENSAVER_ENABLED_KEY, SCREENSAVER_TIMEOUT_KEY,
    SCREENSAVER_TYPE_KEY, SPEED_UNIT_KEY, TEMP_UNIT_KEY,
};
use crate::snapshot::{FetchState, FetchView};

/// Errors surfaced by state operations.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("No coordinates available")]
    MissingCoordinates,

    #[error("{0} API key missing")]
    MissingApiKey(&'static str),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Invalid preference {0}")]
    InvalidPreference(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl StateError {
    /// User-friendly message suitable for the kiosk error panel.
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingCoordinates => "No location available yet.".to_string(),
            Self::MissingApiKey(which) => {
                format!("The {which} API key is missing. Check your settings.")
            }
            Self::Settings(_) => "Could not read settings. Check your settings file.".to_string(),
            Self::InvalidPreference(_) => {
                "That preference value is not recognized.".to_string()
            }
            Self::Fetch(_) => "Could not retrieve data. Please check your connection.".to_string(),
        }
    }
}

#[derive(Debug)]
struct StateInner {
    browser_geo: Option<Coordinates>,
    map_geo: Option<Coordinates>,
    pan_to: Option<Coordinates>,
    marker_visible: bool,
    animate_map: bool,
    settings_panel_open: bool,

    current: FetchState<CurrentForecast>,
    hourly: FetchState<HourlyForecast>,
    daily: FetchState<DailyForecast>,
    radar: FetchState<RadarSweep>,
    sun_times: SunTimes,
    location_name: Option<String>,

    prefs: Preferences,
    dark: DarkMode,
    saver: Screensaver,
    night_clock: bool,
}

/// Process-wide state container. `Arc`-share one instance between the
/// poll engine, the HTTP API, and the binary.
pub struct AppState {
    forecast: ForecastClient,
    sun: SunClient,
    radar: RadarClient,
    geoip: GeoIpClient,
    geocode_base: String,
    settings: SettingsStore,
    pref_store: PrefStore,
    coords_tx: watch::Sender<Option<Coordinates>>,
    inner: RwLock<StateInner>,
}

impl AppState {
    /// Container with the default (production) API clients.
    pub fn new(settings: SettingsStore, pref_store: PrefStore) -> Result<Self, FetchError> {
        Ok(Self::with_clients(
            settings,
            pref_store,
            ForecastClient::new()?,
            SunClient::new()?,
            RadarClient::new()?,
            GeoIpClient::new()?,
            geocode::REVERSE_GEO_BASE,
        ))
    }

    /// Container with injected clients (mock servers in tests).
    pub fn with_clients(
        settings: SettingsStore,
        pref_store: PrefStore,
        forecast: ForecastClient,
        sun: SunClient,
        radar: RadarClient,
        geoip: GeoIpClient,
        geocode_base: &str,
    ) -> Self {
        let (coords_tx, _) = watch::channel(None);
        Self {
            forecast,
            sun,
            radar,
            geoip,
            geocode_base: geocode_base.to_string(),
            settings,
            pref_store,
            coords_tx,
            inner: RwLock::new(StateInner {
                browser_geo: None,
                map_geo: None,
                pan_to: None,
                marker_visible: true,
                animate_map: false,
                settings_panel_open: false,
                current: FetchState::default(),
                hourly: FetchState::default(),
                daily: FetchState::default(),
                radar: FetchState::default(),
                sun_times: SunTimes::default(),
                location_name: None,
                prefs: Preferences::default(),
                dark: DarkMode::default(),
                saver: Screensaver::new(Utc::now()),
                night_clock: false,
            }),
        }
    }

    /// Subscribe to coordinate changes; the poll engine restarts its
    /// task set on every new value.
    pub fn subscribe_coordinates(&self) -> watch::Receiver<Option<Coordinates>> {
        self.coords_tx.subscribe()
    }

    pub fn settings_store(&self) -> &SettingsStore {
        &self.settings
    }

    // ----- coordinates -----

    /// Resolve the starting coordinates: configured starting position
    /// first, IP geolocation as the fallback. Seeds both the "home"
    /// and map positions and starts polling.
    pub async fn resolve_start_coordinates(&self) -> Result<Coordinates, StateError> {
        let configured = self
            .settings
            .load_or_create()
            .map_err(|e| StateError::Settings(e.to_string()))?
            .starting_position();

        let coords = match configured {
            Some((latitude, longitude)) => {
                tracing::info!("Using configured starting position {latitude}, {longitude}");
                Coordinates::new(latitude, longitude)
            }
            None => self.geoip.lookup().await?,
        };

        {
            let mut inner = self.inner.write();
            inner.browser_geo = Some(coords);
            inner.map_geo = Some(coords);
        }
        self.coords_tx.send_replace(Some(coords));
        Ok(coords)
    }

    /// IP geolocation lookup, proxied for the local HTTP API.
    pub async fn geolocate(&self) -> Result<Coordinates, StateError> {
        Ok(self.geoip.lookup().await?)
    }

    pub fn browser_geo(&self) -> Option<Coordinates> {
        self.inner.read().browser_geo
    }

    pub fn map_geo(&self) -> Option<Coordinates> {
        self.inner.read().map_geo
    }

    /// Move the map (and all polling) to new coordinates, e.g. after a
    /// map click.
    pub fn set_map_position(&self, coords: Coordinates) {
        {
            let mut inner = self.inner.write();
            inner.map_geo = Some(coords);
            inner.pan_to = Some(coords);
        }
        self.coords_tx.send_replace(Some(coords));
    }

    /// Return the map to the resolved home position.
    pub fn reset_map_position(&self) {
        if let Some(home) = self.browser_geo() {
            self.set_map_position(home);
        }
    }

    /// One-shot pan target for the map; reading consumes it.
    pub fn take_pan_to(&self) -> Option<Coordinates> {
        self.inner.write().pan_to.take()
    }

    // ----- settings keys -----

    /// Weather API key; missing opens the settings panel.
    pub fn weather_api_key(&self) -> Result<String, StateError> {
        self.required_key("weather", |s| s.weather_api_key.clone())
    }

    /// Map API key; missing opens the settings panel.
    pub fn map_api_key(&self) -> Result<String, StateError> {
        self.required_key("map", |s| s.map_api_key.clone())
    }

    /// Reverse-geocoding API key. Optional: missing does not open the
    /// settings panel.
    pub fn reverse_geo_api_key(&self) -> Result<String, StateError> {
        let settings = self
            .settings
            .load_or_create()
            .map_err(|e| StateError::Settings(e.to_string()))?;
        settings
            .reverse_geo_api_key
            .filter(|k| !k.is_empty())
            .ok_or(StateError::MissingApiKey("reverse geolocation"))
    }

    fn required_key(
        &self,
        which: &'static str,
        get: impl Fn(&Settings) -> Option<String>,
    ) -> Result<String, StateError> {
        let settings = self
            .settings
            .load_or_create()
            .map_err(|e| StateError::Settings(e.to_string()))?;
        match get(&settings).filter(|k| !k.is_empty()) {
            Some(key) => Ok(key),
            None => {
                self.inner.write().settings_panel_open = true;
                Err(StateError::MissingApiKey(which))
            }
        }
    }

    /// Replace the settings document, persisting to disk.
    pub fn save_settings(&self, settings: &Settings) -> Result<(), StateError> {
        self.settings
            .replace(settings)
            .map_err(|e| StateError::Settings(e.to_string()))
    }

    // ----- weather fetches -----

    /// Refresh current conditions for the given coordinates.
    pub async fn update_current_weather(
        &self,
        coords: Option<Coordinates>,
    ) -> Result<(), StateError> {
        let generation = self.inner.write().current.begin();
        let Some(coords) = coords else {
            self.inner.write().current.complete(generation, Err(None));
            return Err(StateError::MissingCoordinates);
        };

        match self.forecast.fetch_current(coords).await {
            Ok(data) => {
                self.inner.write().current.complete(generation, Ok(data));
                Ok(())
            }
            Err(e) => {
                self.inner
                    .write()
                    .current
                    .complete(generation, Err(Some(e.to_string())));
                Err(e.into())
            }
        }
    }

    /// Refresh the hourly series for the given coordinates.
    pub async fn update_hourly_weather(
        &self,
        coords: Option<Coordinates>,
    ) -> Result<(), StateError> {
        let generation = self.inner.write().hourly.begin();
        let Some(coords) = coords else {
            self.inner.write().hourly.complete(generation, Err(None));
            return Err(StateError::MissingCoordinates);
        };

        match self.forecast.fetch_hourly(coords).await {
            Ok(data) => {
                self.inner.write().hourly.complete(generation, Ok(data));
                Ok(())
            }
            Err(e) => {
                self.inner
                    .write()
                    .hourly
                    .complete(generation, Err(Some(e.to_string())));
                Err(e.into())
            }
        }
    }

    /// Refresh the daily series for the given coordinates.
    pub async fn update_daily_weather(
        &self,
        coords: Option<Coordinates>,
    ) -> Result<(), StateError> {
        let generation = self.inner.write().daily.begin();
        let Some(coords) = coords else {
            self.inner.write().daily.complete(generation, Err(None));
            return Err(StateError::MissingCoordinates);
        };

        match self.forecast.fetch_daily(coords).await {
            Ok(data) => {
                self.inner.write().daily.complete(generation, Ok(data));
                Ok(())
            }
            Err(e) => {
                self.inner
                    .write()
                    .daily
                    .complete(generation, Err(Some(e.to_string())));
                Err(e.into())
            }
        }
    }

    /// Refresh sun times. Any failure (or absent coordinates) resets
    /// the pair to unknown, which downstream treats as daylight. Dark
    /// mode is recomputed on every update.
    pub async fn update_sun_times(&self, coords: Option<Coordinates>) -> Result<(), StateError> {
        let Some(coords) = coords else {
            self.store_sun_times(SunTimes::default());
            return Err(StateError::MissingCoordinates);
        };

        match self.sun.fetch(coords).await {
            Ok(sun) => {
                self.store_sun_times(sun);
                Ok(())
            }
            Err(e) => {
                self.store_sun_times(SunTimes::default());
                Err(e.into())
            }
        }
    }

    fn store_sun_times(&self, sun: SunTimes) {
        let mut inner = self.inner.write();
        inner.sun_times = sun;
        let sun = inner.sun_times;
        inner.dark.refresh(&sun, Utc::now());
    }

    /// Refresh the radar frame metadata.
    pub async fn update_radar_frames(&self) -> Result<(), StateError> {
        let generation = self.inner.write().radar.begin();
        match self.radar.fetch_frames().await {
            Ok(sweep) => {
                self.inner.write().radar.complete(generation, Ok(sweep));
                Ok(())
            }
            Err(e) => {
                self.inner
                    .write()
                    .radar
                    .complete(generation, Err(Some(e.to_string())));
                Err(e.into())
            }
        }
    }

    /// Resolve a place name for the given coordinates, when the
    /// optional reverse-geocoding key is configured.
    pub async fn update_location_name(&self, coords: Coordinates) {
        let key = match self.reverse_geo_api_key() {
            Ok(key) => key,
            Err(e) => {
                tracing::debug!("Skipping reverse geocode: {}", e);
                return;
            }
        };

        let name = geocode::reverse_geocode_at(&self.geocode_base, &key, coords).await;
        self.inner.write().location_name = name;
    }

    pub fn location_name(&self) -> Option<String> {
        self.inner.read().location_name.clone()
    }

    // ----- fetch-state views -----

    pub fn current_view(&self) -> FetchView<CurrentForecast> {
        self.inner.read().current.view()
    }

    pub fn hourly_view(&self) -> FetchView<HourlyForecast> {
        self.inner.read().hourly.view()
    }

    pub fn daily_view(&self) -> FetchView<DailyForecast> {
        self.inner.read().daily.view()
    }

    pub fn radar_view(&self) -> FetchView<RadarSweep> {
        self.inner.read().radar.view()
    }

    pub fn sun_times(&self) -> SunTimes {
        self.inner.read().sun_times
    }

    /// Everything the weather panels render, in one snapshot.
    pub fn weather(&self) -> WeatherView {
        let inner = self.inner.read();
        WeatherView {
            current: inner.current.view(),
            hourly: inner.hourly.view(),
            daily: inner.daily.view(),
            radar: inner.radar.view(),
            sun_times: inner.sun_times,
            location_name: inner.location_name.clone(),
        }
    }

    // ----- map/panel toggles -----

    pub fn marker_visible(&self) -> bool {
        self.inner.read().marker_visible
    }

    pub fn toggle_marker(&self) {
        let mut inner = self.inner.write();
        inner.marker_visible = !inner.marker_visible;
    }

    pub fn animate_map(&self) -> bool {
        self.inner.read().animate_map
    }

    pub fn toggle_animate_map(&self) {
        let mut inner = self.inner.write();
        inner.animate_map = !inner.animate_map;
    }

    pub fn settings_panel_open(&self) -> bool {
        self.inner.read().settings_panel_open
    }

    pub fn toggle_settings_panel(&self) {
        let mut inner = self.inner.write();
        inner.settings_panel_open = !inner.settings_panel_open;
    }

    // ----- preferences -----

    /// Seed in-memory preferences from storage. Called once at
    /// startup.
    pub fn load_preferences(&self) {
        let prefs = self.pref_store.load();
        self.inner.write().prefs = prefs;
    }

    pub fn preferences(&self) -> Preferences {
        self.inner.read().prefs
    }

    pub fn save_temp_unit(&self, unit: TemperatureUnit) {
        self.inner.write().prefs.temp_unit = unit;
        self.persist(TEMP_UNIT_KEY, unit.as_str());
    }

    pub fn save_speed_unit(&self, unit: SpeedUnit) {
        self.inner.write().prefs.speed_unit = unit;
        self.persist(SPEED_UNIT_KEY, unit.as_str());
    }

    pub fn save_length_unit(&self, unit: LengthUnit) {
        self.inner.write().prefs.length_unit = unit;
        self.persist(LENGTH_UNIT_KEY, unit.as_str());
    }

    pub fn save_clock_format(&self, format: ClockFormat) {
        self.inner.write().prefs.clock_format = format;
        self.persist(CLOCK_FORMAT_KEY, format.as_str());
    }

    pub fn save_mouse_hide(&self, hide: bool) {
        self.inner.write().prefs.mouse_hide = hide;
        self.persist(MOUSE_HIDE_KEY, if hide { "true" } else { "false" });
    }

    pub fn save_screensaver_enabled(&self, enabled: bool) {
        self.inner.write().prefs.screensaver.enabled = enabled;
        self.persist(
            SCREENSAVER_ENABLED_KEY,
            if enabled { "true" } else { "false" },
        );
    }

    pub fn save_screensaver_timeout(&self, minutes: u32) {
        self.inner.write().prefs.screensaver.timeout_minutes = minutes;
        self.persist(SCREENSAVER_TIMEOUT_KEY, &minutes.to_string());
    }

    pub fn save_screensaver_duration(&self, minutes: u32) {
        self.inner.write().prefs.screensaver.duration_minutes = minutes;
        self.persist(SCREENSAVER_DURATION_KEY, &minutes.to_string());
    }

    pub fn save_screensaver_kind(&self, kind: ScreensaverKind) {
        self.inner.write().prefs.screensaver.kind = kind;
        self.persist(SCREENSAVER_TYPE_KEY, kind.as_str());
    }

    /// Apply one preference by its storage key and string value, the
    /// form the preference route receives. Unknown keys and
    /// unparseable values are rejected; a successful update returns
    /// the full preference set.
    pub fn apply_preference(&self, name: &str, value: &str) -> Result<Preferences, StateError> {
        let invalid = || StateError::InvalidPreference(name.to_string());
        match name {
            TEMP_UNIT_KEY => {
                self.save_temp_unit(TemperatureUnit::parse(value).ok_or_else(invalid)?);
            }
            SPEED_UNIT_KEY => {
                self.save_speed_unit(SpeedUnit::parse(value).ok_or_else(invalid)?);
            }
            LENGTH_UNIT_KEY => {
                self.save_length_unit(LengthUnit::parse(value).ok_or_else(invalid)?);
            }
            CLOCK_FORMAT_KEY => {
                self.save_clock_format(ClockFormat::parse(value).ok_or_else(invalid)?);
            }
            MOUSE_HIDE_KEY => {
                self.save_mouse_hide(value.parse().map_err(|_| invalid())?);
            }
            SCREENSAVER_ENABLED_KEY => {
                self.save_screensaver_enabled(value.parse().map_err(|_| invalid())?);
            }
            SCREENSAVER_TIMEOUT_KEY => {
                self.save_screensaver_timeout(value.parse().map_err(|_| invalid())?);
            }
            SCREENSAVER_DURATION_KEY => {
                self.save_screensaver_duration(value.parse().map_err(|_| invalid())?);
            }
            SCREENSAVER_TYPE_KEY => {
                self.save_screensaver_kind(ScreensaverKind::parse(value).ok_or_else(invalid)?);
            }
            _ => return Err(invalid()),
        }
        Ok(self.preferences())
    }

    fn persist(&self, key: &str, value: &str) {
        if let Err(e) = self.pref_store.set(key, value) {
            tracing::warn!("Failed to persist preference {}: {}", key, e);
        }
    }

    // ----- display modes -----

    /// Record an input event (pointer, key, touch, wheel).
    pub fn record_activity(&self, now: DateTime<Utc>) {
        self.inner.write().saver.record_activity(now);
    }

    /// Periodic screensaver check.
    pub fn tick_screensaver(&self, now: DateTime<Utc>) {
        let mut inner = self.inner.write();
        let prefs = inner.prefs.screensaver;
        inner.saver.tick(&prefs, now);
    }

    /// Periodic dark-mode recomputation.
    pub fn tick_dark_mode(&self, now: DateTime<Utc>) {
        let mut inner = self.inner.write();
        let sun = inner.sun_times;
        inner.dark.refresh(&sun, now);
    }

    /// Periodic night-clock check against the local wall clock.
    pub fn tick_night_clock<T: Timelike>(&self, local_now: &T) {
        self.inner.write().night_clock = night_clock_active(local_now);
    }

    pub fn dark_mode(&self) -> bool {
        self.inner.read().dark.is_dark()
    }

    pub fn auto_dark_mode(&self) -> bool {
        self.inner.read().dark.is_auto()
    }

    /// Flip dark mode directly (manual mode only).
    pub fn toggle_dark_mode(&self) {
        self.inner.write().dark.toggle();
    }

    /// Switch between automatic and manual dark mode.
    pub fn toggle_dark_mode_source(&self) {
        let mut inner = self.inner.write();
        let sun = inner.sun_times;
        inner.dark.toggle_source(&sun, Utc::now());
    }

    pub fn screensaver_active(&self) -> bool {
        self.inner.read().saver.is_active()
    }

    pub fn night_clock(&self) -> bool {
        self.inner.read().night_clock
    }

    pub fn seconds_until_screensaver(&self, now: DateTime<Utc>) -> i64 {
        let inner = self.inner.read();
        inner.saver.seconds_until_activation(&inner.prefs.screensaver, now)
    }

    /// What the kiosk should render right now.
    pub fn render_mode(&self) -> RenderMode {
        let inner = self.inner.read();
        RenderMode::resolve(inner.night_clock, inner.saver.is_active())
    }

    /// Composite snapshot for the status API.
    pub fn status(&self, now: DateTime<Utc>) -> StatusView {
        let inner = self.inner.read();
        StatusView {
            render_mode: RenderMode::resolve(inner.night_clock, inner.saver.is_active()),
            dark_mode: inner.dark.is_dark(),
            auto_dark_mode: inner.dark.is_auto(),
            screensaver_active: inner.saver.is_active(),
            night_clock_active: inner.night_clock,
            seconds_until_screensaver: inner
                .saver
                .seconds_until_activation(&inner.prefs.screensaver, now),
            settings_panel_open: inner.settings_panel_open,
            marker_visible: inner.marker_visible,
            map_geo: inner.map_geo,
            location_name: inner.location_name.clone(),
            sun_times: inner.sun_times,
            preferences: inner.prefs,
        }
    }
}

/// Per-kind weather snapshots plus sun times and the resolved place
/// name, served by the weather route.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherView {
    pub current: FetchView<CurrentForecast>,
    pub hourly: FetchView<HourlyForecast>,
    pub daily: FetchView<DailyForecast>,
    pub radar: FetchView<RadarSweep>,
    pub sun_times: SunTimes,
    pub location_name: Option<String>,
}

/// Snapshot of the display-facing state, served by the status route.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusView {
    pub render_mode: RenderMode,
    pub dark_mode: bool,
    pub auto_dark_mode: bool,
    pub screensaver_active: bool,
    pub night_clock_active: bool,
    pub seconds_until_screensaver: i64,
    pub settings_panel_open: bool,
    pub marker_visible: bool,
    pub map_geo: Option<Coordinates>,
    pub location_name: Option<String>,
    pub sun_times: SunTimes,
    pub preferences: Preferences,
}
