//! The boundary to whatever actually executes statements.

use async_trait::async_trait;

use crate::error::DriverError;
use crate::statement::{PreparedStatement, ResultSet, Statement};

/// The underlying session. Connection management and statement execution
/// live behind this trait, out of the pipeline's sight.
///
/// `execute` and `prepare` are the interceptable operations; the rest is
/// lifecycle that the facade forwards untouched.
#[async_trait]
pub trait SessionBackend: Send + Sync + 'static {
    /// Run a statement, producing rows.
    async fn execute(&self, statement: Statement) -> Result<ResultSet, DriverError>;

    /// Prepare a statement for later execution.
    async fn prepare(&self, statement: Statement) -> Result<PreparedStatement, DriverError>;

    /// Establish connectivity. Idempotent.
    async fn init(&self) -> Result<(), DriverError>;

    /// Release resources; later operations fail with
    /// [`DriverError::SessionClosed`].
    async fn close(&self) -> Result<(), DriverError>;

    /// Whether `close` has completed.
    fn is_closed(&self) -> bool;

    /// Keyspace this session is logged into, when any.
    fn keyspace(&self) -> Option<String>;
}
