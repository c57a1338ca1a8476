//! Best-effort hardware probes for the kiosk host. Every probe
//! resolves to `None` on failure; the route never errors.

use std::path::Path;

use serde::Serialize;
use tokio::process::Command;

const THERMAL_ZONE: &str = "/sys/class/thermal/thermal_zone0/temp";
const HWMON_DIR: &str = "/sys/class/hwmon";
const COOLING_DIR: &str = "/sys/class/thermal";
const COOLING_STATES: f64 = 4.0;

/// Hardware snapshot served by the system-info route.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemInfo {
    pub cpu_temp: Option<f64>,
    pub fan_speed: Option<f64>,
    pub disk_space: Option<String>,
}

/// Probe CPU temperature, fan speed, and free disk space.
pub async fn probe() -> SystemInfo {
    SystemInfo {
        cpu_temp: cpu_temp().await,
        fan_speed: fan_speed().await,
        disk_space: disk_space().await,
    }
}

/// CPU temperature in degrees Celsius, from the first thermal zone
/// (reported in millidegrees).
async fn cpu_temp() -> Option<f64> {
    let raw = tokio::fs::read_to_string(THERMAL_ZONE).await.ok()?;
    let millidegrees: f64 = raw.trim().parse().ok()?;
    Some(millidegrees / 1000.0)
}

/// Fan speed: RPM from the first hwmon fan input, with a fallback to
/// the cooling-device state expressed as a percentage.
async fn fan_speed() -> Option<f64> {
    if let Some(rpm) = read_numeric_glob(HWMON_DIR, "hwmon", "fan1_input").await {
        return Some(rpm);
    }
    let state = read_numeric_glob(COOLING_DIR, "cooling_device", "cur_state").await?;
    Some((state / COOLING_STATES) * 100.0)
}

/// First parseable numeric value under `{dir}/{prefix}*/{leaf}`.
async fn read_numeric_glob(dir: &str, prefix: &str, leaf: &str) -> Option<f64> {
    let mut entries = tokio::fs::read_dir(Path::new(dir)).await.ok()?;
    while let Ok(Some(entry)) = entries.next_entry().await {
        let name = entry.file_name();
        if !name.to_string_lossy().starts_with(prefix) {
            continue;
        }
        let path = entry.path().join(leaf);
        if let Ok(raw) = tokio::fs::read_to_string(&path).await {
            if let Ok(value) = raw.trim().parse::<f64>() {
                return Some(value);
            }
        }
    }
    None
}

/// Available space on the root filesystem, as `df -h` prints it.
async fn disk_space() -> Option<String> {
    let output = Command::new("df").args(["-h", "/"]).output().await.ok()?;
    if !output.status.success() {
        return None;
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    // Header line, then the mount line: take the "Avail" column.
    let line = stdout.lines().nth(1)?;
    line.split_whitespace().nth(3).map(str::to_string)
}
