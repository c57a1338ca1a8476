//! Weather data clients for Skycast
//!
//! Thin async wrappers around the third-party HTTP APIs: Open-Meteo
//! forecasts, sunrise-sunset.org sun times, RainViewer radar frame
//! metadata (with legacy fallback), IP geolocation, and reverse
//! geocoding. Each normalizes the response shape into typed values.

pub mod forecast;
pub mod geocode;
pub mod locate;
pub mod radar;
pub mod sun;
pub mod types;

pub use forecast::ForecastClient;
pub use geocode::reverse_geocode;
pub use locate::GeoIpClient;
pub use radar::RadarClient;
pub use sun::SunClient;
pub use types::*;
