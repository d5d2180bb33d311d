//! Statement and result payloads.
//!
//! The pipeline treats these as opaque cargo: nothing below the session
//! facade inspects a statement beyond its `Display` summary. Bind values
//! and rows are loosely typed as [`serde_json::Value`].

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An executable statement: query text, bind values and an optional
/// explicit write timestamp in microseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub query: String,
    #[serde(default)]
    pub values: Vec<serde_json::Value>,
    #[serde(default)]
    pub named_values: BTreeMap<String, serde_json::Value>,
    pub timestamp: Option<i64>,
}

impl Statement {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            values: Vec::new(),
            named_values: BTreeMap::new(),
            timestamp: None,
        }
    }

    /// Positional bind values.
    pub fn with_values(mut self, values: Vec<serde_json::Value>) -> Self {
        self.values = values;
        self
    }

    /// Named bind values.
    pub fn with_named_values(mut self, values: BTreeMap<String, serde_json::Value>) -> Self {
        self.named_values = values;
        self
    }

    /// Explicit write timestamp; suppresses generator-assigned timestamps.
    pub fn with_timestamp(mut self, micros: i64) -> Self {
        self.timestamp = Some(micros);
        self
    }
}

impl From<&str> for Statement {
    fn from(query: &str) -> Self {
        Statement::new(query)
    }
}

impl From<String> for Statement {
    fn from(query: String) -> Self {
        Statement::new(query)
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // This is a log line, not a wire format; long queries get cut.
        const MAX_CHARS: usize = 96;
        match self.query.char_indices().nth(MAX_CHARS) {
            Some((idx, _)) => write!(f, "{}...", &self.query[..idx]),
            None => f.write_str(&self.query),
        }
    }
}

/// Rows returned by an execute operation. Opaque to the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    pub rows: Vec<serde_json::Value>,
}

impl ResultSet {
    pub fn new(rows: Vec<serde_json::Value>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Server-side prepared statement handle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreparedStatement {
    pub id: Uuid,
    pub query: String,
}

impl PreparedStatement {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            query: query.into(),
        }
    }

    /// Bind positional values, producing an executable statement.
    pub fn bind(&self, values: Vec<serde_json::Value>) -> Statement {
        Statement::new(self.query.clone()).with_values(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_statement_from_query_text() {
        let statement: Statement = "select * from users".into();
        assert_eq!(statement.query, "select * from users");
        assert!(statement.values.is_empty());
        assert_eq!(statement.timestamp, None);
    }

    #[test]
    fn test_builders_compose() {
        let statement = Statement::new("insert into t (a, b) values (?, ?)")
            .with_values(vec![serde_json::json!(1), serde_json::json!("x")])
            .with_timestamp(42);
        assert_eq!(statement.values.len(), 2);
        assert_eq!(statement.timestamp, Some(42));
    }

    #[test]
    fn test_bind_carries_the_prepared_query() {
        let prepared = PreparedStatement::new("select * from t where id = ?");
        let statement = prepared.bind(vec![serde_json::json!(7)]);
        assert_eq!(statement.query, prepared.query);
        assert_eq!(statement.values, vec![serde_json::json!(7)]);
        assert_eq!(statement.timestamp, None);
    }

    #[test]
    fn test_display_truncates_long_queries() {
        let long = "x".repeat(300);
        let statement = Statement::new(long);
        let shown = statement.to_string();
        assert!(shown.len() < 110);
        assert!(shown.ends_with("..."));
    }

    #[test]
    fn test_display_keeps_short_queries_whole() {
        let statement = Statement::new("select 1");
        assert_eq!(statement.to_string(), "select 1");
    }
}
