//! Display-unit preferences and the conversions from the raw metric
//! values the forecast API returns (°C, m/s, mm).

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// Temperature display unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TemperatureUnit {
    #[default]
    #[serde(rename = "f")]
    Fahrenheit,
    #[serde(rename = "c")]
    Celsius,
}

impl TemperatureUnit {
    /// Stored string form (`f` / `c`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fahrenheit => "f",
            Self::Celsius => "c",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "f" => Some(Self::Fahrenheit),
            "c" => Some(Self::Celsius),
            _ => None,
        }
    }
}

/// Wind-speed display unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SpeedUnit {
    #[default]
    Mph,
    /// Meters per second
    Ms,
}

impl SpeedUnit {
    /// Stored string form (`mph` / `ms`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mph => "mph",
            Self::Ms => "ms",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "mph" => Some(Self::Mph),
            "ms" => Some(Self::Ms),
            _ => None,
        }
    }
}

/// Precipitation-length display unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum LengthUnit {
    #[default]
    #[serde(rename = "in")]
    Inches,
    #[serde(rename = "mm")]
    Millimeters,
}

impl LengthUnit {
    /// Stored string form (`in` / `mm`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inches => "in",
            Self::Millimeters => "mm",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "in" => Some(Self::Inches),
            "mm" => Some(Self::Millimeters),
            _ => None,
        }
    }
}

/// Clock display format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ClockFormat {
    #[default]
    #[serde(rename = "12")]
    TwelveHour,
    #[serde(rename = "24")]
    TwentyFourHour,
}

impl ClockFormat {
    /// Stored string form (`12` / `24`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TwelveHour => "12",
            Self::TwentyFourHour => "24",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "12" => Some(Self::TwelveHour),
            "24" => Some(Self::TwentyFourHour),
            _ => None,
        }
    }
}

/// Convert a temperature in °C to the display unit.
pub fn convert_temperature(celsius: f64, unit: TemperatureUnit) -> f64 {
    match unit {
        TemperatureUnit::Fahrenheit => celsius * 9.0 / 5.0 + 32.0,
        TemperatureUnit::Celsius => celsius,
    }
}

/// Convert a speed in m/s to the display unit.
pub fn convert_speed(meters_per_second: f64, unit: SpeedUnit) -> f64 {
    match unit {
        SpeedUnit::Mph => meters_per_second * 2.236_936,
        SpeedUnit::Ms => meters_per_second,
    }
}

/// Convert a length in mm to the display unit.
pub fn convert_length(millimeters: f64, unit: LengthUnit) -> f64 {
    match unit {
        LengthUnit::Inches => millimeters / 25.4,
        LengthUnit::Millimeters => millimeters,
    }
}

/// Format a time of day for the clock display.
pub fn format_clock(time: NaiveTime, format: ClockFormat) -> String {
    match format {
        ClockFormat::TwelveHour => {
            let (pm, hour12) = time.hour12();
            format!(
                "{}:{:02} {}",
                hour12,
                time.minute(),
                if pm { "PM" } else { "AM" }
            )
        }
        ClockFormat::TwentyFourHour => format!("{:02}:{:02}", time.hour(), time.minute()),
    }
}
