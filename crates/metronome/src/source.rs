//! High-resolution time sources.
//!
//! A [`TimeSource`] is the expensive, precise end of the clock pipeline. It
//! is queried once per refresh interval by the calibrated clock, never on
//! the timestamp hot path, and queries may fail: the calibrated clock
//! treats a failure as "keep the previous calibration".

use crate::error::ClockError;

/// A queryable wall clock with microsecond resolution.
pub trait TimeSource: Send + Sync + 'static {
    /// Sample the current time in microseconds since the Unix epoch.
    fn now_micros(&self) -> Result<i64, ClockError>;
}

/// Microsecond wall clock backed by `clock_gettime(CLOCK_REALTIME)`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeTimeSource;

impl NativeTimeSource {
    pub fn new() -> Self {
        Self
    }

    /// Whether this platform has a usable high-resolution source:
    /// compile-time support plus one trial sample, so callers can fall
    /// back before committing to calibration.
    pub fn available() -> bool {
        NativeTimeSource.now_micros().is_ok()
    }
}

#[cfg(unix)]
impl TimeSource for NativeTimeSource {
    fn now_micros(&self) -> Result<i64, ClockError> {
        let mut ts = libc::timespec {
            tv_sec: 0,
            tv_nsec: 0,
        };
        // SAFETY: the pointer is valid for the duration of the call and
        // timespec is plain data.
        let rc = unsafe { libc::clock_gettime(libc::CLOCK_REALTIME, &mut ts) };
        if rc != 0 {
            return Err(ClockError::Sample {
                errno: std::io::Error::last_os_error().raw_os_error().unwrap_or(0),
            });
        }
        Ok(ts.tv_sec as i64 * 1_000_000 + ts.tv_nsec as i64 / 1000)
    }
}

#[cfg(not(unix))]
impl TimeSource for NativeTimeSource {
    fn now_micros(&self) -> Result<i64, ClockError> {
        Err(ClockError::Unavailable)
    }
}
