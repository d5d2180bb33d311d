//! Clock error types.

/// Errors from high-resolution time sources.
///
/// Foreground timestamp reads never fail; these only surface while sampling
/// a [`TimeSource`](crate::source::TimeSource) during calibration.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// No high-resolution source exists on this platform.
    #[error("no high-resolution clock available on this platform")]
    Unavailable,

    /// The platform clock call failed.
    #[error("clock sample failed (errno {errno})")]
    Sample { errno: i32 },
}
