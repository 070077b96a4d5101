//! # Retailer Master API
//!
//! A REST service over the retailer master-data stored procedures in
//! PostgreSQL: products, violations and order statuses.
//!
//! ## Features
//!
//! - **Procedure Catalog**: Every stored procedure is a typed descriptor with a fixed argument order
//! - **Pluggable Connection**: Handlers talk to [`Connection`](core::Connection), backed by a sqlx pool or a scripted mock
//! - **Validation**: Request bodies are checked before any database call
//! - **Layered Configuration**: YAML file, `.env` and environment overrides
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use master_api::prelude::*;
//!
//! let config = AppConfig::load()?;
//! let conn = PooledConnection::connect(&config.database).await?;
//!
//! ServerBuilder::new()
//!     .with_connection(conn)
//!     .serve(&config.server.bind_addr)
//!     .await?;
//! ```
//!
//! ## Testing against the mock
//!
//! ```rust,ignore
//! let mock = MockConnection::new();
//! mock.expect_execute("CALL delete_master_product($1)")
//!     .with_args(params![7])
//!     .will_return_result(CommandTag::new("CALL", 1));
//!
//! let app = ServerBuilder::new().with_connection(mock.clone()).build()?;
//! ```

pub mod catalog;
pub mod config;
pub mod core;
pub mod entities;
pub mod handlers;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        ApiError, BoundCall, CommandTag, Connection, Procedure, ProcedureArgs, Row, SqlParam,
        StartupError, decode_rows,
    };

    // === Macros ===
    pub use crate::params;

    // === Records ===
    pub use crate::entities::{
        NewProduct, NewViolation, OrderStatus, ProductId, ProductUpdate, Violation, ViolationId,
        ViolationUpdate,
    };

    // === Storage ===
    pub use crate::storage::{MockConnection, MockRows};
    #[cfg(feature = "postgres")]
    pub use crate::storage::PooledConnection;

    // === Config ===
    pub use crate::config::{AppConfig, DatabaseConfig, ServerConfig};

    // === Server ===
    pub use crate::handlers::AppState;
    pub use crate::server::ServerBuilder;

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use serde::{Deserialize, Serialize};
}
