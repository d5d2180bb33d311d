//! Common test doubles for pipeline and facade tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use palaver::{
    DriverError, ForwardingCall, PreparedStatement, ResultSet, SessionAction, SessionBackend,
    SessionCall, SessionChannel, SessionInterceptor, Statement,
};

/// Scriptable backend: records statements and optionally delays or fails.
pub struct StubBackend {
    pub executed: Mutex<Vec<Statement>>,
    pub prepared: Mutex<Vec<Statement>>,
    pub fail_with: Option<String>,
    pub delay: Option<Duration>,
    pub closed: AtomicBool,
}

impl StubBackend {
    fn base() -> Self {
        Self {
            executed: Mutex::new(Vec::new()),
            prepared: Mutex::new(Vec::new()),
            fail_with: None,
            delay: None,
            closed: AtomicBool::new(false),
        }
    }

    pub fn ok() -> Arc<Self> {
        Arc::new(Self::base())
    }

    pub fn failing(message: &str) -> Arc<Self> {
        let mut backend = Self::base();
        backend.fail_with = Some(message.to_string());
        Arc::new(backend)
    }

    pub fn slow(delay: Duration) -> Arc<Self> {
        let mut backend = Self::base();
        backend.delay = Some(delay);
        Arc::new(backend)
    }

    pub fn executed_statements(&self) -> Vec<Statement> {
        self.executed.lock().unwrap().clone()
    }

    pub fn prepared_statements(&self) -> Vec<Statement> {
        self.prepared.lock().unwrap().clone()
    }
}

#[async_trait]
impl SessionBackend for StubBackend {
    async fn execute(&self, statement: Statement) -> Result<ResultSet, DriverError> {
        if self.is_closed() {
            return Err(DriverError::SessionClosed);
        }
        self.executed.lock().unwrap().push(statement.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(message) = &self.fail_with {
            return Err(DriverError::backend(message.as_str()));
        }
        Ok(ResultSet::new(vec![serde_json::json!({
            "query": statement.query
        })]))
    }

    async fn prepare(&self, statement: Statement) -> Result<PreparedStatement, DriverError> {
        if self.is_closed() {
            return Err(DriverError::SessionClosed);
        }
        self.prepared.lock().unwrap().push(statement.clone());
        if let Some(message) = &self.fail_with {
            return Err(DriverError::backend(message.as_str()));
        }
        Ok(PreparedStatement::new(statement.query))
    }

    async fn init(&self) -> Result<(), DriverError> {
        Ok(())
    }

    async fn close(&self) -> Result<(), DriverError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn keyspace(&self) -> Option<String> {
        Some("test_keyspace".to_string())
    }
}

/// Interceptor that records the order its hooks run in.
pub struct RecordingInterceptor {
    pub label: &'static str,
    pub events: Arc<Mutex<Vec<String>>>,
}

impl RecordingInterceptor {
    pub fn new(label: &'static str, events: Arc<Mutex<Vec<String>>>) -> Arc<Self> {
        Arc::new(Self { label, events })
    }
}

impl SessionInterceptor for RecordingInterceptor {
    fn intercept(
        &self,
        action: Arc<dyn SessionAction>,
        next: &dyn SessionChannel,
    ) -> Box<dyn SessionCall> {
        let label = self.label;
        let before_events = Arc::clone(&self.events);
        let after_events = Arc::clone(&self.events);
        Box::new(
            ForwardingCall::new(next.new_call(action))
                .on_call(move |_request| {
                    before_events.lock().unwrap().push(format!("{label}:before"));
                })
                .map_callback(move |_request, callback| {
                    Box::new(move |result| {
                        let outcome = match &result {
                            Ok(_) => "ok",
                            Err(DriverError::Cancelled) => "cancelled",
                            Err(_) => "err",
                        };
                        after_events
                            .lock()
                            .unwrap()
                            .push(format!("{label}:after:{outcome}"));
                        callback(result);
                    })
                }),
        )
    }
}

/// Snapshot of the events recorded so far.
pub fn drain(events: &Arc<Mutex<Vec<String>>>) -> Vec<String> {
    events.lock().unwrap().clone()
}

/// Clock pinned to a settable instant.
pub struct FrozenClock(pub AtomicI64);

impl FrozenClock {
    pub fn at(micros: i64) -> Arc<Self> {
        Arc::new(Self(AtomicI64::new(micros)))
    }
}

impl metronome::Clock for FrozenClock {
    fn now_micros(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}
