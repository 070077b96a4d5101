//! PostgreSQL backend using sqlx.
//!
//! Provides [`PooledConnection`], the production implementation of
//! [`Connection`] backed by a `sqlx::PgPool`.
//!
//! # Feature flag
//!
//! This module is gated behind the `postgres` feature flag, enabled by
//! default:
//! ```toml
//! [dependencies]
//! retailer-master-api = { version = "0.1", features = ["postgres"] }
//! ```
//!
//! # Column mapping
//!
//! Result rows are converted column by column into JSON so that handlers
//! and the mock share one row representation:
//!
//! - `INT2`, `INT4`, `INT8`, `FLOAT4`, `FLOAT8` → number
//! - `BOOL` → boolean
//! - `TEXT`, `VARCHAR`, `CHAR(n)`, `NAME` → string
//! - `JSON`, `JSONB` → embedded value
//! - SQL `NULL` → `null`

use crate::config::DatabaseConfig;
use crate::core::{CommandTag, Connection, Row, SqlParam, StartupError};
use anyhow::{Result, bail};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgArguments, PgConnectOptions, PgPoolOptions, PgRow};
use sqlx::query::Query;
use sqlx::{Column, Connection as _, PgPool, Postgres, Row as _, TypeInfo};
use std::str::FromStr;
use std::time::Duration;

/// Production [`Connection`] backed by a PostgreSQL pool
///
/// # Example
///
/// ```rust,ignore
/// use master_api::config::DatabaseConfig;
/// use master_api::storage::PooledConnection;
///
/// let connection = PooledConnection::connect(&DatabaseConfig::new(url)).await?;
/// ```
#[derive(Clone, Debug)]
pub struct PooledConnection {
    pool: PgPool,
}

impl PooledConnection {
    /// Wrap an existing pool without checking it
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Parse the URL, open the pool and run the initial health check
    ///
    /// Every failure here is fatal for the process; the caller is expected
    /// to abort startup rather than serve traffic against a broken pool.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StartupError> {
        let options = PgConnectOptions::from_str(&config.url)
            .map_err(|e| StartupError::InvalidDatabaseUrl(e.to_string()))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect_with(options)
            .await
            .map_err(|e| StartupError::Pool(e.to_string()))?;

        let connection = Self::new(pool);
        connection
            .health_check()
            .await
            .map_err(|e| StartupError::HealthCheck(e.to_string()))?;

        tracing::info!(
            max_connections = config.max_connections,
            "Database connection established"
        );
        Ok(connection)
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Connection for PooledConnection {
    async fn query(&self, sql: &str, args: &[SqlParam]) -> Result<Vec<Row>> {
        let rows = bind_args(sqlx::query(sql), args)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_json).collect()
    }

    async fn execute(&self, sql: &str, args: &[SqlParam]) -> Result<CommandTag> {
        let result = bind_args(sqlx::query(sql), args)
            .execute(&self.pool)
            .await?;

        Ok(CommandTag::for_statement(sql, result.rows_affected()))
    }

    async fn health_check(&self) -> Result<()> {
        let mut conn = self.pool.acquire().await?;
        conn.ping().await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Database connection closed");
    }
}

fn bind_args<'q>(
    mut query: Query<'q, Postgres, PgArguments>,
    args: &'q [SqlParam],
) -> Query<'q, Postgres, PgArguments> {
    for arg in args {
        query = match arg {
            SqlParam::Int(value) => query.bind(*value),
            SqlParam::Text(value) => query.bind(value.as_str()),
        };
    }
    query
}

fn row_to_json(row: &PgRow) -> Result<Row> {
    let mut out = Row::with_capacity(row.len());

    for column in row.columns() {
        let value = decode_column(row, column.ordinal(), column.type_info().name())
            .map_err(|e| anyhow::anyhow!("column '{}': {}", column.name(), e))?;
        out.insert(column.name().to_string(), value);
    }

    Ok(out)
}

fn decode_column(row: &PgRow, index: usize, type_name: &str) -> Result<Value> {
    let value = match type_name {
        "INT2" => row.try_get::<Option<i16>, _>(index)?.map(Value::from),
        "INT4" => row.try_get::<Option<i32>, _>(index)?.map(Value::from),
        "INT8" => row.try_get::<Option<i64>, _>(index)?.map(Value::from),
        "FLOAT4" => row
            .try_get::<Option<f32>, _>(index)?
            .map(|v| Value::from(f64::from(v))),
        "FLOAT8" => row.try_get::<Option<f64>, _>(index)?.map(Value::from),
        "BOOL" => row.try_get::<Option<bool>, _>(index)?.map(Value::from),
        "TEXT" | "VARCHAR" | "BPCHAR" | "CHAR" | "NAME" => {
            row.try_get::<Option<String>, _>(index)?.map(Value::from)
        }
        "JSON" | "JSONB" => row.try_get::<Option<Value>, _>(index)?,
        other => bail!("unsupported column type {}", other),
    };

    Ok(value.unwrap_or(Value::Null))
}
