//! Display-mode state machines: dark mode (auto/manual), the
//! idle-timeout screensaver, and the wall-clock night clock. The three
//! run independently; their precedence is encoded in one place,
//! [`RenderMode::resolve`].
//!
//! None of these machines can fail; they only have fallback values
//! (unknown sun times count as daylight). All transitions take the
//! current time as an argument so tests can drive a simulated clock.

use chrono::{DateTime, Duration, Timelike, Utc};
use serde::Serialize;

use crate::prefs::ScreensaverPrefs;
use skycast_weather::SunTimes;

/// Local hour at which the night clock switches on.
pub const NIGHT_CLOCK_START_HOUR: u32 = 22;
/// Local hour at which the night clock switches off.
pub const NIGHT_CLOCK_END_HOUR: u32 = 6;

/// Dark-mode derivation: either automatic from sunrise/sunset or a
/// manual override.
#[derive(Debug, Clone, Copy)]
pub struct DarkMode {
    auto: bool,
    dark: bool,
}

impl Default for DarkMode {
    fn default() -> Self {
        // Start dark until the first sun-time refresh says otherwise.
        Self {
            auto: true,
            dark: true,
        }
    }
}

impl DarkMode {
    pub fn is_dark(&self) -> bool {
        self.dark
    }

    pub fn is_auto(&self) -> bool {
        self.auto
    }

    /// Recompute from sun times. No-op in manual mode.
    pub fn refresh(&mut self, sun: &SunTimes, now: DateTime<Utc>) {
        if self.auto {
            self.dark = !sun.is_daylight(now);
        }
    }

    /// Switch auto <-> manual. Entering manual keeps the current
    /// value; entering auto recomputes immediately.
    pub fn toggle_source(&mut self, sun: &SunTimes, now: DateTime<Utc>) {
        self.auto = !self.auto;
        if self.auto {
            self.refresh(sun, now);
        }
    }

    /// Flip dark mode directly. Only honored in manual mode.
    pub fn toggle(&mut self) {
        if !self.auto {
            self.dark = !self.dark;
        }
    }
}

/// Idle-timeout screensaver machine.
#[derive(Debug, Clone, Copy)]
pub struct Screensaver {
    active: bool,
    last_activity: DateTime<Utc>,
    deactivate_at: Option<DateTime<Utc>>,
}

impl Screensaver {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            active: false,
            last_activity: now,
            deactivate_at: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn last_activity(&self) -> DateTime<Utc> {
        self.last_activity
    }

    /// Any input event: reset the activity clock and, if active,
    /// dismiss the screensaver.
    pub fn record_activity(&mut self, now: DateTime<Utc>) {
        self.last_activity = now;
        if self.active {
            self.deactivate(now);
        }
    }

    /// Periodic check. Activates after the configured idle timeout and
    /// automatically deactivates once the configured duration elapses
    /// (which also resets the activity clock). Bypassed entirely when
    /// disabled.
    pub fn tick(&mut self, prefs: &ScreensaverPrefs, now: DateTime<Utc>) {
        if !prefs.enabled {
            if self.active {
                self.deactivate(now);
            }
            return;
        }

        if self.active {
            if let Some(deadline) = self.deactivate_at {
                if now >= deadline {
                    self.deactivate(now);
                }
            }
            return;
        }

        let idle = now - self.last_activity;
        if idle >= Duration::minutes(i64::from(prefs.timeout_minutes)) {
            self.active = true;
            self.deactivate_at = Some(now + Duration::minutes(i64::from(prefs.duration_minutes)));
            tracing::debug!("Screensaver activated after {}s idle", idle.num_seconds());
        }
    }

    /// Seconds until the screensaver would activate; 0 when disabled
    /// or already active.
    pub fn seconds_until_activation(&self, prefs: &ScreensaverPrefs, now: DateTime<Utc>) -> i64 {
        if !prefs.enabled || self.active {
            return 0;
        }
        let deadline =
            self.last_activity + Duration::minutes(i64::from(prefs.timeout_minutes));
        (deadline - now).num_seconds().max(0)
    }

    fn deactivate(&mut self, now: DateTime<Utc>) {
        self.active = false;
        self.deactivate_at = None;
        self.last_activity = now;
    }
}

/// Whether the night clock is showing: a pure function of the local
/// hour-of-day, independent of the other machines.
pub fn night_clock_active<T: Timelike>(now: &T) -> bool {
    let hour = now.hour();
    hour >= NIGHT_CLOCK_START_HOUR || hour < NIGHT_CLOCK_END_HOUR
}

/// What the kiosk should be rendering right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    NightClock,
    Screensaver,
    Normal,
}

impl RenderMode {
    /// Precedence: night clock > screensaver > normal UI.
    pub fn resolve(night_clock: bool, screensaver: bool) -> Self {
        if night_clock {
            Self::NightClock
        } else if screensaver {
            Self::Screensaver
        } else {
            Self::Normal
        }
    }
}
