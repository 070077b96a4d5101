//! Connection abstraction over the master-data database
//!
//! Handlers never talk to a pool directly. They receive an
//! `Arc<dyn Connection>` through the application state, which is either a
//! [`PooledConnection`](crate::storage::PooledConnection) backed by
//! PostgreSQL or a [`MockConnection`](crate::storage::MockConnection)
//! replaying scripted expectations in tests.

use anyhow::Result;
use async_trait::async_trait;
use indexmap::IndexMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;

/// A single result row, column name to JSON value, in column order
pub type Row = IndexMap<String, Value>;

/// Positional argument bound to a `$n` placeholder
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SqlParam {
    /// 32-bit integer (`INT4`)
    Int(i32),
    /// Text (`TEXT` / `VARCHAR`)
    Text(String),
}

impl fmt::Display for SqlParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlParam::Int(v) => write!(f, "{}", v),
            SqlParam::Text(s) => write!(f, "{:?}", s),
        }
    }
}

impl From<i32> for SqlParam {
    fn from(value: i32) -> Self {
        SqlParam::Int(value)
    }
}

impl From<String> for SqlParam {
    fn from(value: String) -> Self {
        SqlParam::Text(value)
    }
}

impl From<&str> for SqlParam {
    fn from(value: &str) -> Self {
        SqlParam::Text(value.to_string())
    }
}

impl From<&String> for SqlParam {
    fn from(value: &String) -> Self {
        SqlParam::Text(value.clone())
    }
}

/// Build a `Vec<SqlParam>` from heterogeneous literals
///
/// ```rust
/// use master_api::params;
/// use master_api::core::SqlParam;
///
/// let args = params!["Violation A", "High", 1];
/// assert_eq!(args[2], SqlParam::Int(1));
/// ```
#[macro_export]
macro_rules! params {
    () => {
        ::std::vec::Vec::<$crate::core::SqlParam>::new()
    };
    ($($arg:expr),+ $(,)?) => {
        ::std::vec![$($crate::core::SqlParam::from($arg)),+]
    };
}

/// Metadata returned by a data-modifying statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandTag {
    /// Leading SQL keyword, e.g. `CALL` or `INSERT`
    pub command: String,
    /// Rows affected as reported by the server
    pub rows_affected: u64,
}

impl CommandTag {
    pub fn new(command: impl Into<String>, rows_affected: u64) -> Self {
        Self {
            command: command.into(),
            rows_affected,
        }
    }

    /// Derive the command keyword from the statement text
    pub fn for_statement(sql: &str, rows_affected: u64) -> Self {
        let command = sql
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_ascii_uppercase();
        Self::new(command, rows_affected)
    }
}

impl fmt::Display for CommandTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.command, self.rows_affected)
    }
}

/// Capability set every database backend exposes to the handlers
#[async_trait]
pub trait Connection: Send + Sync {
    /// Run a row-returning statement
    async fn query(&self, sql: &str, args: &[SqlParam]) -> Result<Vec<Row>>;

    /// Run a data-modifying statement or procedure call
    async fn execute(&self, sql: &str, args: &[SqlParam]) -> Result<CommandTag>;

    /// Round-trip to the database
    async fn health_check(&self) -> Result<()>;

    /// Release every pooled resource
    async fn close(&self);
}

/// Decode rows into typed records through their JSON representation
pub fn decode_rows<T: DeserializeOwned>(rows: Vec<Row>) -> Result<Vec<T>> {
    rows.into_iter()
        .map(|row| {
            let object: serde_json::Map<String, Value> = row.into_iter().collect();
            serde_json::from_value(Value::Object(object))
                .map_err(|e| anyhow::anyhow!("Failed to decode row: {}", e))
        })
        .collect()
}
