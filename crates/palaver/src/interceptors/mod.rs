//! Ready-made interceptors.

mod logging;

pub use logging::LoggingInterceptor;
