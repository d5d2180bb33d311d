//! Session calls: one-shot invocations with best-effort cancellation.

use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use tokio::sync::oneshot;
use tokio::task::AbortHandle;

use crate::action::{SessionAction, SessionRequest, SessionResponse};
use crate::backend::SessionBackend;
use crate::error::DriverError;
use crate::statement::{PreparedStatement, ResultSet};

/// Receives the call result. Invoked exactly once. Normal completion is
/// delivered from the task driving the underlying future; synchronous
/// failures and cancellation are delivered inline on the calling thread.
pub type SessionCallback = Box<dyn FnOnce(Result<SessionResponse, DriverError>) + Send>;

/// A single invocation of a session operation.
///
/// `call` may be invoked at most once per instance. `cancel` is
/// best-effort: a no-op before `call` and after completion; in flight it
/// resolves the call as [`DriverError::Cancelled`] and, with
/// `may_interrupt`, also aborts the underlying task.
pub trait SessionCall: Send {
    fn call(
        &mut self,
        callback: SessionCallback,
        backend: Arc<dyn SessionBackend>,
        request: SessionRequest,
    );

    fn cancel(&self, may_interrupt: bool);
}

/// Completion state shared with the spawned task. The callback slot is
/// taken exactly once, by whichever of task completion or cancellation
/// gets there first.
#[derive(Default)]
struct CallState {
    callback: Mutex<Option<SessionCallback>>,
    abort: Mutex<Option<AbortHandle>>,
}

impl CallState {
    fn deliver(&self, result: Result<SessionResponse, DriverError>) {
        let callback = self
            .callback
            .lock()
            .expect("call state mutex poisoned")
            .take();
        if let Some(callback) = callback {
            callback(result);
        }
    }
}

/// The call at the end of every chain: hands the request to its action and
/// runs the resulting future as a spawned task.
pub(crate) struct TerminalCall {
    action: Arc<dyn SessionAction>,
    state: Arc<CallState>,
    started: bool,
}

impl TerminalCall {
    pub(crate) fn new(action: Arc<dyn SessionAction>) -> Self {
        Self {
            action,
            state: Arc::new(CallState::default()),
            started: false,
        }
    }
}

impl SessionCall for TerminalCall {
    fn call(
        &mut self,
        callback: SessionCallback,
        backend: Arc<dyn SessionBackend>,
        request: SessionRequest,
    ) {
        if self.started {
            callback(Err(DriverError::AlreadyCalled));
            return;
        }
        self.started = true;

        match self.action.send(backend, request) {
            Ok(future) => {
                // Park the callback before spawning so a fast completion
                // cannot miss it.
                *self
                    .state
                    .callback
                    .lock()
                    .expect("call state mutex poisoned") = Some(callback);
                let state = Arc::clone(&self.state);
                let task = tokio::spawn(async move {
                    let result = future.await;
                    state.deliver(result);
                });
                *self.state.abort.lock().expect("call state mutex poisoned") =
                    Some(task.abort_handle());
            }
            // Synchronous construction failure takes the same path as an
            // execution failure.
            Err(err) => callback(Err(err)),
        }
    }

    fn cancel(&self, may_interrupt: bool) {
        let callback = self
            .state
            .callback
            .lock()
            .expect("call state mutex poisoned")
            .take();
        // Nothing waiting: not yet called, or already completed.
        let Some(callback) = callback else { return };
        callback(Err(DriverError::Cancelled));
        if may_interrupt {
            if let Some(abort) = self
                .state
                .abort
                .lock()
                .expect("call state mutex poisoned")
                .take()
            {
                abort.abort();
            }
        }
    }
}

/// Decodes one response category for a typed future.
pub trait FromResponse: Sized {
    fn from_response(response: SessionResponse) -> Result<Self, DriverError>;
}

impl FromResponse for ResultSet {
    fn from_response(response: SessionResponse) -> Result<Self, DriverError> {
        match response {
            SessionResponse::Rows(rows) => Ok(rows),
            SessionResponse::Prepared(_) => {
                Err(DriverError::UnexpectedResponse { expected: "rows" })
            }
        }
    }
}

impl FromResponse for PreparedStatement {
    fn from_response(response: SessionResponse) -> Result<Self, DriverError> {
        match response {
            SessionResponse::Prepared(prepared) => Ok(prepared),
            SessionResponse::Rows(_) => Err(DriverError::UnexpectedResponse {
                expected: "prepared statement",
            }),
        }
    }
}

/// Typed future over a call's result.
///
/// Dropping the future does not stop the operation; it is already in
/// flight. Use [`cancel`](CallFuture::cancel) for that.
pub struct CallFuture<T> {
    receiver: oneshot::Receiver<Result<SessionResponse, DriverError>>,
    call: Box<dyn SessionCall>,
    _marker: PhantomData<fn() -> T>,
}

/// Future resolving to the rows of an executed statement.
pub type ResultSetFuture = CallFuture<ResultSet>;

/// Future resolving to a prepared statement handle.
pub type PreparedStatementFuture = CallFuture<PreparedStatement>;

impl<T> CallFuture<T> {
    pub(crate) fn new(
        receiver: oneshot::Receiver<Result<SessionResponse, DriverError>>,
        call: Box<dyn SessionCall>,
    ) -> Self {
        Self {
            receiver,
            call,
            _marker: PhantomData,
        }
    }

    /// Best-effort cancellation; see [`SessionCall::cancel`].
    pub fn cancel(&self, may_interrupt: bool) {
        self.call.cancel(may_interrupt);
    }
}

impl<T: FromResponse> Future for CallFuture<T> {
    type Output = Result<T, DriverError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match Pin::new(&mut this.receiver).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result.and_then(T::from_response)),
            Poll::Ready(Err(_)) => Poll::Ready(Err(DriverError::CallDropped)),
            Poll::Pending => Poll::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_decoder_rejects_prepared_responses() {
        let response = SessionResponse::Prepared(PreparedStatement::new("select ?"));
        assert!(matches!(
            ResultSet::from_response(response),
            Err(DriverError::UnexpectedResponse { expected: "rows" })
        ));
    }

    #[test]
    fn test_prepared_decoder_accepts_prepared_responses() {
        let response = SessionResponse::Prepared(PreparedStatement::new("select ?"));
        let prepared = PreparedStatement::from_response(response).expect("decode");
        assert_eq!(prepared.query, "select ?");
    }
}
