//! metronome - Microsecond clocks and monotonic timestamp generation
//!
//! Statement write timestamps need two properties that pull in opposite
//! directions: accuracy (microseconds close to real time) and strict
//! ordering (no two writes from one producer with the same timestamp, even
//! when the underlying clock only ticks once a millisecond). This crate
//! splits the problem in two:
//!
//! - [`Clock`] implementations handle accuracy. [`SystemClock`] scales the
//!   coarse OS clock to microseconds; [`CalibratedClock`] pairs a
//!   high-resolution [`TimeSource`] sample with a monotonic anchor and
//!   extrapolates between periodic recalibrations, so precise reads cost
//!   one atomic load instead of a syscall.
//! - [`TimestampGenerator`] implementations handle ordering on top of any
//!   clock. [`AtomicTimestampGenerator`] is strictly increasing across all
//!   threads sharing it; [`ContextTimestampGenerator`] hands out isolated
//!   per-context counters for workloads where per-worker ordering is
//!   enough.
//!
//! Clock selection is config-driven: see [`ClockConfig`] and [`clock_for`].

pub mod calibrated;
pub mod clock;
pub mod config;
pub mod error;
pub mod generator;
pub mod source;

pub use calibrated::CalibratedClock;
pub use clock::{calibration_enabled, clock_for, Clock, SystemClock};
pub use config::ClockConfig;
pub use error::ClockError;
pub use generator::{
    AtomicTimestampGenerator, ContextTimestampGenerator, TimestampContext, TimestampGenerator,
};
pub use source::{NativeTimeSource, TimeSource};
