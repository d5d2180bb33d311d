//! palaver - Interceptable session pipeline with monotonic write timestamps
//!
//! Wraps an executing session behind a decorator chain so cross-cutting
//! behavior (logging, fallbacks, caching) attaches without touching the
//! session implementation itself.
//!
//! ## Pipeline
//!
//! Four small seams compose every operation:
//! - [`SessionAction`]: how one request category starts its backend future
//! - [`SessionCall`]: one invocation, at most one `call`, best-effort
//!   cancel, exactly-once callback delivery
//! - [`SessionChannel`]: produces calls; chains are immutable `Arc` lists
//!   ending in the [`TerminalChannel`]
//! - [`SessionInterceptor`]: wraps the next channel's calls; plain closures
//!   qualify, and [`ForwardingCall`] covers the common wrap-and-forward
//!   shape
//!
//! [`InterceptableSession::intercept`] is pure: it derives a new session
//! sharing the old chain as its tail, so handing out differently-
//! intercepted views of one session is cheap and race-free.
//!
//! ## Write timestamps
//!
//! Executed statements without an explicit timestamp get the next value
//! from a `metronome` [`TimestampGenerator`](metronome::TimestampGenerator)
//! when one is configured, client-side and strictly monotonic.
//!
//! ## Blocking use
//!
//! [`BlockingSession`] is the synchronous surface: the same operations,
//! defined as block-on-async, chain included.

pub mod action;
pub mod backend;
pub mod call;
pub mod channel;
pub mod error;
pub mod interceptor;
pub mod interceptors;
pub mod session;
pub mod statement;
pub mod sync;

pub use action::{
    ActionFuture, ExecuteAction, PrepareAction, SessionAction, SessionRequest, SessionResponse,
};
pub use backend::SessionBackend;
pub use call::{
    CallFuture, FromResponse, PreparedStatementFuture, ResultSetFuture, SessionCall,
    SessionCallback,
};
pub use channel::{InterceptedChannel, SessionChannel, TerminalChannel};
pub use error::DriverError;
pub use interceptor::{CallHook, CallbackWrapper, ForwardingCall, SessionInterceptor};
pub use interceptors::LoggingInterceptor;
pub use session::InterceptableSession;
pub use statement::{PreparedStatement, ResultSet, Statement};
pub use sync::BlockingSession;
