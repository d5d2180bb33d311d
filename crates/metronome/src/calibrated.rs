//! Calibrated high-resolution clock.
//!
//! Querying a precise wall-clock source is too expensive for the
//! per-timestamp hot path, so the work is split: a background task
//! periodically captures a [`CalibrationSnapshot`] pairing a source
//! timestamp with a monotonic anchor, and foreground reads extrapolate
//! from the latest snapshot with one atomic load plus an `Instant` delta.
//!
//! Refresh failures are never fatal. A failed sample keeps the previous
//! snapshot; a sample that took too long to capture falls back to the
//! coarse system clock until the next cycle.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::clock::{coarse_epoch_micros, Clock};
use crate::error::ClockError;
use crate::source::TimeSource;

/// Samples slower than this are discarded: once the capture window grows
/// past the precision we are trying to gain, the coarse clock is no worse.
const MAX_SAMPLE_DURATION: Duration = Duration::from_millis(1);

/// Floor for the refresh period: `tokio::time::interval` panics on a zero
/// period, so zero and sub-millisecond intervals are rounded up.
const MIN_REFRESH_INTERVAL: Duration = Duration::from_millis(1);

/// One calibration: a source timestamp and the monotonic instant it was
/// (approximately) taken at.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CalibrationSnapshot {
    pub(crate) micros: i64,
    pub(crate) anchor: Instant,
}

impl CalibrationSnapshot {
    /// Extrapolate the current time from this calibration.
    fn now_micros(&self) -> i64 {
        self.micros + self.anchor.elapsed().as_micros() as i64
    }
}

/// Capture one snapshot from `source`.
///
/// The anchor is the midpoint of the capture window, which halves the
/// worst-case offset error. A window longer than [`MAX_SAMPLE_DURATION`]
/// produces a coarse-clock snapshot instead.
pub(crate) fn take_snapshot(source: &dyn TimeSource) -> Result<CalibrationSnapshot, ClockError> {
    let start = Instant::now();
    let micros = source.now_micros()?;
    let window = start.elapsed();
    if window > MAX_SAMPLE_DURATION {
        tracing::debug!(
            window_us = window.as_micros() as u64,
            "slow clock sample, using coarse time for this cycle"
        );
        return Ok(CalibrationSnapshot {
            micros: coarse_epoch_micros(),
            anchor: Instant::now(),
        });
    }
    Ok(CalibrationSnapshot {
        micros,
        anchor: start + window / 2,
    })
}

/// High-resolution clock that amortizes source queries across a refresh
/// interval.
///
/// Owns its refresh task: [`shutdown`](CalibratedClock::shutdown) stops it
/// deterministically and `Drop` cancels it as a backstop. Reads are
/// lock-free.
pub struct CalibratedClock {
    snapshot: Arc<ArcSwap<CalibrationSnapshot>>,
    cancel: CancellationToken,
    refresher: Option<tokio::task::JoinHandle<()>>,
}

impl fmt::Debug for CalibratedClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CalibratedClock")
            .field("snapshot", &**self.snapshot.load())
            .finish_non_exhaustive()
    }
}

impl CalibratedClock {
    /// Calibrate against `source` now and keep recalibrating every
    /// `refresh_interval`, floored at [`MIN_REFRESH_INTERVAL`]. Must run
    /// inside a Tokio runtime.
    pub fn spawn(source: impl TimeSource, refresh_interval: Duration) -> Self {
        let initial = take_snapshot(&source).unwrap_or_else(|err| {
            tracing::error!(error = %err, "initial clock calibration failed, starting from coarse time");
            CalibrationSnapshot {
                micros: coarse_epoch_micros(),
                anchor: Instant::now(),
            }
        });
        let snapshot = Arc::new(ArcSwap::from_pointee(initial));
        let cancel = CancellationToken::new();
        let refresher = spawn_refresh_task(
            Arc::clone(&snapshot),
            source,
            refresh_interval,
            cancel.clone(),
        );
        Self {
            snapshot,
            cancel,
            refresher: Some(refresher),
        }
    }

    /// Stop the refresh task and wait for it to exit. Reads keep working
    /// from the last snapshot.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.refresher.take() {
            let _ = task.await;
        }
    }
}

impl Clock for CalibratedClock {
    fn now_micros(&self) -> i64 {
        self.snapshot.load().now_micros()
    }
}

impl Drop for CalibratedClock {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

fn spawn_refresh_task(
    snapshot: Arc<ArcSwap<CalibrationSnapshot>>,
    source: impl TimeSource,
    refresh_interval: Duration,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    let refresh_interval = refresh_interval.max(MIN_REFRESH_INTERVAL);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(refresh_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately; the initial calibration
        // already covers it.
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!("clock refresh task stopping");
                    break;
                }
                _ = ticker.tick() => {
                    match take_snapshot(&source) {
                        Ok(next) => snapshot.store(Arc::new(next)),
                        Err(err) => {
                            tracing::error!(error = %err, "clock refresh failed, keeping previous calibration");
                        }
                    }
                }
            }
        }
    })
}
