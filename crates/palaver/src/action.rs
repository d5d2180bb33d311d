//! Request descriptors: the bridge from a request category to its backend
//! future.

use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::backend::SessionBackend;
use crate::error::DriverError;
use crate::statement::{PreparedStatement, ResultSet, Statement};

/// A request traveling down the channel chain.
#[derive(Debug, Clone)]
pub enum SessionRequest {
    Execute(Statement),
    Prepare(Statement),
}

impl SessionRequest {
    pub fn statement(&self) -> &Statement {
        match self {
            SessionRequest::Execute(statement) | SessionRequest::Prepare(statement) => statement,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SessionRequest::Execute(_) => "execute",
            SessionRequest::Prepare(_) => "prepare",
        }
    }
}

impl fmt::Display for SessionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.statement())
    }
}

/// A response traveling back up.
#[derive(Debug, Clone)]
pub enum SessionResponse {
    Rows(ResultSet),
    Prepared(PreparedStatement),
}

/// The in-flight future for one call.
///
/// Returning `Err` from [`SessionAction::send`] instead is the synchronous
/// escape hatch: the terminal call routes it into the callback failure
/// path, so construction problems surface exactly like execution problems.
pub type ActionFuture = BoxFuture<'static, Result<SessionResponse, DriverError>>;

/// Describes one request category. Stateless and shared by every call for
/// that category.
pub trait SessionAction: Send + Sync + 'static {
    /// Start the operation against `backend`.
    fn send(
        &self,
        backend: Arc<dyn SessionBackend>,
        request: SessionRequest,
    ) -> Result<ActionFuture, DriverError>;
}

/// Statement execution.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExecuteAction;

impl SessionAction for ExecuteAction {
    fn send(
        &self,
        backend: Arc<dyn SessionBackend>,
        request: SessionRequest,
    ) -> Result<ActionFuture, DriverError> {
        let statement = match request {
            SessionRequest::Execute(statement) => statement,
            SessionRequest::Prepare(_) => {
                return Err(DriverError::RequestMismatch {
                    expected: "execute",
                })
            }
        };
        Ok(Box::pin(async move {
            backend.execute(statement).await.map(SessionResponse::Rows)
        }))
    }
}

/// Statement preparation.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrepareAction;

impl SessionAction for PrepareAction {
    fn send(
        &self,
        backend: Arc<dyn SessionBackend>,
        request: SessionRequest,
    ) -> Result<ActionFuture, DriverError> {
        let statement = match request {
            SessionRequest::Prepare(statement) => statement,
            SessionRequest::Execute(_) => {
                return Err(DriverError::RequestMismatch {
                    expected: "prepare",
                })
            }
        };
        Ok(Box::pin(async move {
            backend
                .prepare(statement)
                .await
                .map(SessionResponse::Prepared)
        }))
    }
}
