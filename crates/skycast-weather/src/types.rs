use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in floating point degrees.
///
/// This is the value that parameterizes every location-dependent
/// fetch; changing it restarts all weather polling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Weather condition categories mapped from WMO codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    #[default]
    Clear,
    PartlyCloudy,
    Cloudy,
    Fog,
    Drizzle,
    Rain,
    HeavyRain,
    Snow,
    Sleet,
    Thunderstorm,
}

impl Condition {
    /// Convert a WMO weather code to a condition category.
    /// See: https://open-meteo.com/en/docs#weathervariables
    pub fn from_wmo_code(code: i32) -> Self {
        match code {
            0 => Self::Clear,
            1..=2 => Self::PartlyCloudy,
            3 => Self::Cloudy,
            45 | 48 => Self::Fog,
            51 | 53 | 55 => Self::Drizzle,
            56 | 57 | 66 | 67 => Self::Sleet, // Freezing drizzle/rain
            61 | 63 | 80 => Self::Rain,
            65 | 81 | 82 => Self::HeavyRain,
            71 | 73 | 75 | 77 | 85 | 86 => Self::Snow,
            95 | 96 | 99 => Self::Thunderstorm,
            _ => Self::Clear, // Unknown codes default to clear
        }
    }

    /// Human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::Clear => "Clear",
            Self::PartlyCloudy => "Partly Cloudy",
            Self::Cloudy => "Cloudy",
            Self::Fog => "Fog",
            Self::Drizzle => "Drizzle",
            Self::Rain => "Rain",
            Self::HeavyRain => "Heavy Rain",
            Self::Snow => "Snow",
            Self::Sleet => "Sleet",
            Self::Thunderstorm => "Thunderstorm",
        }
    }

    /// Icon name for the kiosk front end
    pub fn icon_name(&self) -> &'static str {
        match self {
            Self::Clear => "sun",
            Self::PartlyCloudy => "cloud_sun",
            Self::Cloudy => "cloud",
            Self::Fog => "cloud_fog",
            Self::Drizzle | Self::Rain | Self::HeavyRain => "cloud_rain",
            Self::Snow | Self::Sleet => "cloud_snow",
            Self::Thunderstorm => "cloud_lightning",
        }
    }
}

/// Current conditions payload from the forecast endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentForecast {
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: Option<String>,
    pub current: CurrentConditions,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub time: String,
    pub temperature_2m: f64,
    pub relative_humidity_2m: f64,
    pub precipitation: f64,
    pub wind_speed_10m: f64,
    pub weather_code: i32,
    pub cloud_cover: f64,
}

impl CurrentConditions {
    pub fn condition(&self) -> Condition {
        Condition::from_wmo_code(self.weather_code)
    }
}

/// One-day hourly series from the forecast endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HourlyForecast {
    pub latitude: f64,
    pub longitude: f64,
    pub hourly: HourlySeries,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HourlySeries {
    pub time: Vec<String>,
    pub temperature_2m: Vec<f64>,
    pub precipitation_probability: Vec<f64>,
    pub precipitation: Vec<f64>,
    pub wind_speed_10m: Vec<f64>,
}

/// Five-day daily series from the forecast endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyForecast {
    pub latitude: f64,
    pub longitude: f64,
    pub daily: DailySeries,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailySeries {
    pub time: Vec<String>,
    pub temperature_2m_max: Vec<f64>,
    pub temperature_2m_min: Vec<f64>,
    pub precipitation_probability_max: Vec<f64>,
    pub precipitation_sum: Vec<f64>,
    pub wind_speed_10m_max: Vec<f64>,
    pub weather_code: Vec<i32>,
}

/// Sunrise/sunset pair; both-`None` means "treat as always daylight".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SunTimes {
    pub sunrise: Option<DateTime<Utc>>,
    pub sunset: Option<DateTime<Utc>>,
}

impl SunTimes {
    pub fn is_known(&self) -> bool {
        self.sunrise.is_some() && self.sunset.is_some()
    }

    /// Whether `now` falls between sunrise and sunset. Unknown sun
    /// times count as daylight.
    pub fn is_daylight(&self, now: DateTime<Utc>) -> bool {
        match (self.sunrise, self.sunset) {
            (Some(sunrise), Some(sunset)) => now > sunrise && now < sunset,
            _ => true,
        }
    }
}

/// A timestamped tile-path descriptor for the precipitation overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RadarFrame {
    pub time: i64,
    pub path: String,
}

/// Radar frame metadata plus the tile host serving the frames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RadarSweep {
    pub host: String,
    pub frames: Vec<RadarFrame>,
}

impl RadarSweep {
    /// The most recent frame, used for the overlay layer.
    pub fn latest(&self) -> Option<&RadarFrame> {
        self.frames.last()
    }
}

/// Errors surfaced by the API clients.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Unexpected status: {0}")]
    Status(u16),
    #[error("Decode error: {0}")]
    Decode(String),
    #[error("Missing data: {0}")]
    MissingData(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn wmo_code_categories() {
        assert_eq!(Condition::from_wmo_code(0), Condition::Clear);
        assert_eq!(Condition::from_wmo_code(1), Condition::PartlyCloudy);
        assert_eq!(Condition::from_wmo_code(3), Condition::Cloudy);
        assert_eq!(Condition::from_wmo_code(45), Condition::Fog);
        assert_eq!(Condition::from_wmo_code(53), Condition::Drizzle);
        assert_eq!(Condition::from_wmo_code(57), Condition::Sleet);
        assert_eq!(Condition::from_wmo_code(63), Condition::Rain);
        assert_eq!(Condition::from_wmo_code(82), Condition::HeavyRain);
        assert_eq!(Condition::from_wmo_code(77), Condition::Snow);
        assert_eq!(Condition::from_wmo_code(99), Condition::Thunderstorm);
    }

    #[test]
    fn unknown_wmo_codes_default_to_clear() {
        assert_eq!(Condition::from_wmo_code(999), Condition::Clear);
        assert_eq!(Condition::from_wmo_code(-1), Condition::Clear);
    }

    #[test]
    fn condition_metadata() {
        assert_eq!(Condition::HeavyRain.description(), "Heavy Rain");
        assert_eq!(Condition::Drizzle.icon_name(), "cloud_rain");
        assert_eq!(Condition::Thunderstorm.icon_name(), "cloud_lightning");
    }

    #[test]
    fn unknown_sun_times_count_as_daylight() {
        let sun = SunTimes::default();
        assert!(!sun.is_known());
        assert!(sun.is_daylight(Utc::now()));
    }

    #[test]
    fn daylight_window_is_exclusive() {
        let sunrise = Utc.with_ymd_and_hms(2026, 6, 1, 5, 30, 0).unwrap();
        let sunset = Utc.with_ymd_and_hms(2026, 6, 1, 20, 15, 0).unwrap();
        let sun = SunTimes {
            sunrise: Some(sunrise),
            sunset: Some(sunset),
        };

        let noon = Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap();
        let night = Utc.with_ymd_and_hms(2026, 6, 1, 23, 0, 0).unwrap();
        assert!(sun.is_daylight(noon));
        assert!(!sun.is_daylight(night));
        assert!(!sun.is_daylight(sunrise));
        assert!(!sun.is_daylight(sunset));
    }

    #[test]
    fn latest_radar_frame_is_the_last_entry() {
        let sweep = RadarSweep {
            host: "https://tilecache.rainviewer.com".into(),
            frames: vec![
                RadarFrame {
                    time: 1,
                    path: "/a".into(),
                },
                RadarFrame {
                    time: 2,
                    path: "/b".into(),
                },
            ],
        };
        assert_eq!(sweep.latest().map(|f| f.time), Some(2));
    }
}
