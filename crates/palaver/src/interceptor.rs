//! Interception seam for session calls.
//!
//! An interceptor sees every execute and prepare crossing its session and
//! decides what call to hand back: usually the next channel's call wrapped
//! with extra behavior, occasionally a substitute (a cache hit, a
//! fallback). Interceptors never observe lifecycle operations.

use std::sync::Arc;

use crate::action::{SessionAction, SessionRequest};
use crate::backend::SessionBackend;
use crate::call::{SessionCall, SessionCallback};
use crate::channel::SessionChannel;

/// Wraps calls created below it in the chain. The last interceptor added
/// to a session is the first to run.
pub trait SessionInterceptor: Send + Sync + 'static {
    /// Produce the call for `action`. `next` is the rest of the chain;
    /// delegating to `next.new_call(action)` continues normal processing.
    fn intercept(
        &self,
        action: Arc<dyn SessionAction>,
        next: &dyn SessionChannel,
    ) -> Box<dyn SessionCall>;
}

/// Plain closures with the right shape are interceptors.
impl<F> SessionInterceptor for F
where
    F: Fn(Arc<dyn SessionAction>, &dyn SessionChannel) -> Box<dyn SessionCall>
        + Send
        + Sync
        + 'static,
{
    fn intercept(
        &self,
        action: Arc<dyn SessionAction>,
        next: &dyn SessionChannel,
    ) -> Box<dyn SessionCall> {
        self(action, next)
    }
}

/// Before-hook: observes the request just before the delegate runs.
pub type CallHook = Box<dyn FnOnce(&SessionRequest) + Send>;

/// Callback wrapper: builds the callback handed to the delegate out of the
/// caller's callback, with the request in view.
pub type CallbackWrapper =
    Box<dyn FnOnce(&SessionRequest, SessionCallback) -> SessionCallback + Send>;

/// A call that forwards to a delegate, optionally running a hook before it
/// and wrapping the callback around it.
///
/// Cancellation and the exactly-once contract stay with the delegate; a
/// wrapper that swallows the inner callback would break delivery, so
/// wrappers must always end by invoking the callback they were given.
pub struct ForwardingCall {
    delegate: Box<dyn SessionCall>,
    before: Option<CallHook>,
    wrapper: Option<CallbackWrapper>,
}

impl ForwardingCall {
    pub fn new(delegate: Box<dyn SessionCall>) -> Self {
        Self {
            delegate,
            before: None,
            wrapper: None,
        }
    }

    /// Run `hook` with the request before delegating.
    pub fn on_call(mut self, hook: impl FnOnce(&SessionRequest) + Send + 'static) -> Self {
        self.before = Some(Box::new(hook));
        self
    }

    /// Wrap the callback the delegate will eventually invoke.
    pub fn map_callback(
        mut self,
        wrapper: impl FnOnce(&SessionRequest, SessionCallback) -> SessionCallback + Send + 'static,
    ) -> Self {
        self.wrapper = Some(Box::new(wrapper));
        self
    }
}

impl SessionCall for ForwardingCall {
    fn call(
        &mut self,
        callback: SessionCallback,
        backend: Arc<dyn SessionBackend>,
        request: SessionRequest,
    ) {
        if let Some(before) = self.before.take() {
            before(&request);
        }
        let callback = match self.wrapper.take() {
            Some(wrapper) => wrapper(&request, callback),
            None => callback,
        };
        self.delegate.call(callback, backend, request);
    }

    fn cancel(&self, may_interrupt: bool) {
        self.delegate.cancel(may_interrupt);
    }
}
