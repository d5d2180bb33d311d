//! Blocking facade over the async session.
//!
//! Every method here is defined as the async operation plus a block-on:
//! nothing bypasses the interceptor chain, and failures keep their
//! identity (a cancelled call still surfaces as
//! [`DriverError::Cancelled`]).

use std::collections::BTreeMap;
use std::future::Future;

use tokio::runtime::Handle;

use crate::error::DriverError;
use crate::session::InterceptableSession;
use crate::statement::{PreparedStatement, ResultSet, Statement};

/// Synchronous wrapper around [`InterceptableSession`].
///
/// Callable from ordinary threads, and from inside a multi-threaded
/// runtime thanks to `block_in_place`.
#[derive(Clone)]
pub struct BlockingSession {
    inner: InterceptableSession,
    rt: Handle,
}

impl BlockingSession {
    /// Wrap `session`, driving its futures on `rt`.
    pub fn new(session: InterceptableSession, rt: Handle) -> Self {
        Self { inner: session, rt }
    }

    /// The wrapped async session.
    pub fn inner(&self) -> &InterceptableSession {
        &self.inner
    }

    fn block_on<F: Future>(&self, future: F) -> F::Output {
        if Handle::try_current().is_ok() {
            // Already on a runtime worker: mark it blocking so the pool
            // can compensate.
            tokio::task::block_in_place(|| self.rt.block_on(future))
        } else {
            self.rt.block_on(future)
        }
    }

    pub fn execute(&self, statement: impl Into<Statement>) -> Result<ResultSet, DriverError> {
        // Calls spawn their backend task as they start, which needs the
        // runtime context; the guard provides it on foreign threads.
        let future = {
            let _guard = self.rt.enter();
            self.inner.execute(statement)
        };
        self.block_on(future)
    }

    pub fn execute_with_values(
        &self,
        query: impl Into<String>,
        values: Vec<serde_json::Value>,
    ) -> Result<ResultSet, DriverError> {
        let future = {
            let _guard = self.rt.enter();
            self.inner.execute_with_values(query, values)
        };
        self.block_on(future)
    }

    pub fn execute_with_named_values(
        &self,
        query: impl Into<String>,
        values: BTreeMap<String, serde_json::Value>,
    ) -> Result<ResultSet, DriverError> {
        let future = {
            let _guard = self.rt.enter();
            self.inner.execute_with_named_values(query, values)
        };
        self.block_on(future)
    }

    pub fn prepare(
        &self,
        statement: impl Into<Statement>,
    ) -> Result<PreparedStatement, DriverError> {
        let future = {
            let _guard = self.rt.enter();
            self.inner.prepare(statement)
        };
        self.block_on(future)
    }

    pub fn init(&self) -> Result<(), DriverError> {
        self.block_on(self.inner.init())
    }

    pub fn close(&self) -> Result<(), DriverError> {
        self.block_on(self.inner.close())
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }

    pub fn keyspace(&self) -> Option<String> {
        self.inner.keyspace()
    }
}
