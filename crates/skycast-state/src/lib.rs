//! Runtime state for the kiosk: fetch snapshots, display preferences,
//! the dark/screensaver/night-clock mode machines, the shared state
//! container, and the background poll engine.

pub mod engine;
pub mod modes;
pub mod prefs;
pub mod snapshot;
pub mod state;

pub use engine::{EngineConfig, PollEngine};
pub use modes::{DarkMode, RenderMode, Screensaver};
pub use prefs::{PrefStore, Preferences, ScreensaverKind, ScreensaverPrefs};
pub use snapshot::{FetchPhase, FetchState, FetchView};
pub use state::{AppState, StateError, StatusView, WeatherView};

pub use skycast_weather::types::Coordinates;
