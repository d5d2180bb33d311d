//! Channel chain: where calls come from.
//!
//! A channel produces a fresh [`SessionCall`] per operation. Chains are
//! singly linked: zero or more [`InterceptedChannel`] nodes ending in the
//! [`TerminalChannel`]. Nodes are immutable once built and shared through
//! `Arc`, so deriving a new chain never disturbs sessions holding the old
//! one.

use std::sync::Arc;

use crate::action::SessionAction;
use crate::call::{SessionCall, TerminalCall};
use crate::interceptor::SessionInterceptor;

/// Produces a fresh call per operation.
pub trait SessionChannel: Send + Sync + 'static {
    fn new_call(&self, action: Arc<dyn SessionAction>) -> Box<dyn SessionCall>;
}

/// The end of every chain: produces calls that actually hit the backend.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalChannel;

impl SessionChannel for TerminalChannel {
    fn new_call(&self, action: Arc<dyn SessionAction>) -> Box<dyn SessionCall> {
        Box::new(TerminalCall::new(action))
    }
}

/// A decorator node: asks its interceptor for the call, handing it the
/// rest of the chain.
pub struct InterceptedChannel {
    interceptor: Arc<dyn SessionInterceptor>,
    next: Arc<dyn SessionChannel>,
}

impl InterceptedChannel {
    pub fn new(interceptor: Arc<dyn SessionInterceptor>, next: Arc<dyn SessionChannel>) -> Self {
        Self { interceptor, next }
    }
}

impl SessionChannel for InterceptedChannel {
    fn new_call(&self, action: Arc<dyn SessionAction>) -> Box<dyn SessionCall> {
        self.interceptor.intercept(action, self.next.as_ref())
    }
}
