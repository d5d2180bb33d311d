//! Clock selection and refresh configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

fn default_use_native_clock() -> bool {
    true
}

fn default_refresh_interval_ms() -> u64 {
    1000
}

/// Controls which clock backs timestamp generation and how often the
/// calibrated clock resynchronizes with its source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClockConfig {
    /// Use the calibrated native clock when a high-resolution source is
    /// available. When false, timestamps come from the coarse system clock.
    #[serde(default = "default_use_native_clock")]
    pub use_native_clock: bool,

    /// How often the calibrated clock re-samples its source, in
    /// milliseconds. The clock rounds zero up to one millisecond.
    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            use_native_clock: default_use_native_clock(),
            refresh_interval_ms: default_refresh_interval_ms(),
        }
    }
}

impl ClockConfig {
    pub fn with_native_clock(mut self, enabled: bool) -> Self {
        self.use_native_clock = enabled;
        self
    }

    pub fn with_refresh_interval_ms(mut self, millis: u64) -> Self {
        self.refresh_interval_ms = millis;
        self
    }

    /// Refresh interval as a [`Duration`].
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }
}
