//! Microsecond epoch clocks.
//!
//! A [`Clock`] answers "what time is it" in microseconds since the Unix
//! epoch and promises nothing about ordering. Monotonicity is layered on
//! top by the generators in [`crate::generator`].

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::calibrated::CalibratedClock;
use crate::config::ClockConfig;
use crate::source::NativeTimeSource;

/// A source of microsecond-precision Unix timestamps.
///
/// Shared across threads and cheap to read; every generated timestamp
/// costs one `now_micros` call.
pub trait Clock: Send + Sync + 'static {
    /// Current time in microseconds since the Unix epoch.
    fn now_micros(&self) -> i64;
}

/// Coarse clock backed by the operating system wall clock: millisecond
/// precision scaled to microseconds. Always available; the fallback when
/// no high-resolution source can be used.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_micros(&self) -> i64 {
        coarse_epoch_micros()
    }
}

/// Wall-clock milliseconds scaled to microseconds.
pub(crate) fn coarse_epoch_micros() -> i64 {
    let since_epoch = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    since_epoch.as_millis() as i64 * 1000
}

/// True when configuration and platform support both allow the calibrated
/// native clock.
pub fn calibration_enabled(config: &ClockConfig) -> bool {
    config.use_native_clock && NativeTimeSource::available()
}

/// Select the best clock for this process.
///
/// Prefers the calibrated native clock, falling back to [`SystemClock`]
/// when the switch is off or no high-resolution source is available. Must
/// run inside a Tokio runtime when calibration is enabled, since the
/// calibrated clock owns a background refresh task.
pub fn clock_for(config: &ClockConfig) -> Arc<dyn Clock> {
    if calibration_enabled(config) {
        tracing::info!("using calibrated native clock for timestamp generation");
        Arc::new(CalibratedClock::spawn(
            NativeTimeSource::new(),
            config.refresh_interval(),
        ))
    } else {
        tracing::info!("using coarse system clock for timestamp generation");
        Arc::new(SystemClock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2020-01-01T00:00:00Z; any sane wall clock reads later than this.
    const SANE_EPOCH_MICROS: i64 = 1_577_836_800_000_000;

    #[test]
    fn test_system_clock_has_millisecond_granularity() {
        let micros = SystemClock.now_micros();
        assert_eq!(micros % 1000, 0);
        assert!(micros > SANE_EPOCH_MICROS);
    }

    #[test]
    fn test_system_clock_does_not_run_backwards_across_reads() {
        let first = SystemClock.now_micros();
        let second = SystemClock.now_micros();
        assert!(second >= first);
    }

    #[test]
    fn test_calibration_disabled_by_config() {
        let config = ClockConfig::default().with_native_clock(false);
        assert!(!calibration_enabled(&config));
    }

    #[cfg(unix)]
    #[test]
    fn test_calibration_enabled_by_default_on_unix() {
        assert!(calibration_enabled(&ClockConfig::default()));
    }

    #[tokio::test]
    async fn test_clock_for_honors_the_switch() {
        let config = ClockConfig::default().with_native_clock(false);
        let clock = clock_for(&config);
        // Coarse clock output is always whole milliseconds.
        assert_eq!(clock.now_micros() % 1000, 0);
    }
}
