//! The interceptable session facade.

use std::collections::BTreeMap;
use std::sync::Arc;

use metronome::TimestampGenerator;
use tokio::sync::oneshot;

use crate::action::{ExecuteAction, PrepareAction, SessionAction, SessionRequest};
use crate::backend::SessionBackend;
use crate::call::{CallFuture, PreparedStatementFuture, ResultSetFuture};
use crate::channel::{InterceptedChannel, SessionChannel, TerminalChannel};
use crate::error::DriverError;
use crate::interceptor::SessionInterceptor;
use crate::statement::Statement;

/// An immutable session value: backend, channel chain and optional write
/// timestamp generator.
///
/// Cloning shares all three. [`intercept`](Self::intercept) derives a new
/// value with one more interceptor; existing values are untouched, so
/// differently-intercepted views of one session coexist freely.
#[derive(Clone)]
pub struct InterceptableSession {
    backend: Arc<dyn SessionBackend>,
    channel: Arc<dyn SessionChannel>,
    timestamps: Option<Arc<dyn TimestampGenerator>>,
    execute_action: Arc<dyn SessionAction>,
    prepare_action: Arc<dyn SessionAction>,
}

impl InterceptableSession {
    /// Wrap `backend` with an empty chain: calls go straight to it.
    pub fn new(backend: Arc<dyn SessionBackend>) -> Self {
        Self {
            backend,
            channel: Arc::new(TerminalChannel),
            timestamps: None,
            execute_action: Arc::new(ExecuteAction),
            prepare_action: Arc::new(PrepareAction),
        }
    }

    /// Assign generator timestamps to executed statements that do not
    /// carry their own.
    #[must_use]
    pub fn with_timestamp_generator(mut self, generator: Arc<dyn TimestampGenerator>) -> Self {
        self.timestamps = Some(generator);
        self
    }

    /// Derive a session whose calls pass through `interceptor` first.
    ///
    /// Pure: `self` keeps its current chain. The most recently added
    /// interceptor is the first to see each call.
    #[must_use]
    pub fn intercept(&self, interceptor: Arc<dyn SessionInterceptor>) -> Self {
        let mut derived = self.clone();
        derived.channel = Arc::new(InterceptedChannel::new(
            interceptor,
            Arc::clone(&self.channel),
        ));
        derived
    }

    /// Fold a whole stack of interceptors onto this session in order: the
    /// last one ends up outermost.
    #[must_use]
    pub fn intercept_all<I>(&self, interceptors: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn SessionInterceptor>>,
    {
        interceptors
            .into_iter()
            .fold(self.clone(), |session, interceptor| {
                session.intercept(interceptor)
            })
    }

    /// Execute a statement. The returned future is already in flight;
    /// dropping it does not stop the operation.
    pub fn execute(&self, statement: impl Into<Statement>) -> ResultSetFuture {
        let statement = self.stamp(statement.into());
        self.start(
            Arc::clone(&self.execute_action),
            SessionRequest::Execute(statement),
        )
    }

    /// Execute with positional bind values.
    pub fn execute_with_values(
        &self,
        query: impl Into<String>,
        values: Vec<serde_json::Value>,
    ) -> ResultSetFuture {
        self.execute(Statement::new(query).with_values(values))
    }

    /// Execute with named bind values.
    pub fn execute_with_named_values(
        &self,
        query: impl Into<String>,
        values: BTreeMap<String, serde_json::Value>,
    ) -> ResultSetFuture {
        self.execute(Statement::new(query).with_named_values(values))
    }

    /// Prepare a statement. The returned future is already in flight.
    pub fn prepare(&self, statement: impl Into<Statement>) -> PreparedStatementFuture {
        self.start(
            Arc::clone(&self.prepare_action),
            SessionRequest::Prepare(statement.into()),
        )
    }

    /// Only executes are stamped, and an explicit timestamp always wins.
    fn stamp(&self, statement: Statement) -> Statement {
        match (&self.timestamps, statement.timestamp) {
            (Some(generator), None) => {
                let micros = generator.next();
                statement.with_timestamp(micros)
            }
            _ => statement,
        }
    }

    fn start<T>(&self, action: Arc<dyn SessionAction>, request: SessionRequest) -> CallFuture<T> {
        let (tx, rx) = oneshot::channel();
        let mut call = self.channel.new_call(action);
        call.call(
            Box::new(move |result| {
                // A dropped receiver means the caller walked away from the
                // future; the result is discarded.
                let _ = tx.send(result);
            }),
            Arc::clone(&self.backend),
            request,
        );
        CallFuture::new(rx, call)
    }

    // Lifecycle passthroughs. The chain never sees these.

    pub async fn init(&self) -> Result<(), DriverError> {
        self.backend.init().await
    }

    pub async fn close(&self) -> Result<(), DriverError> {
        self.backend.close().await
    }

    pub fn is_closed(&self) -> bool {
        self.backend.is_closed()
    }

    pub fn keyspace(&self) -> Option<String> {
        self.backend.keyspace()
    }
}
