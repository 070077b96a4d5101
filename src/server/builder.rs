//! ServerBuilder for fluent API to build the HTTP server

use super::router::build_routes;
use super::shutdown::shutdown_signal;
use crate::catalog;
use crate::core::{Connection, StartupError};
use crate::handlers::AppState;
use anyhow::Result;
use axum::Router;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Builder for the master-data HTTP server
///
/// # Example
///
/// ```ignore
/// let conn = PooledConnection::connect(&config.database).await?;
///
/// ServerBuilder::new()
///     .with_connection(conn)
///     .serve("0.0.0.0:3000")
///     .await?;
/// ```
pub struct ServerBuilder {
    connection: Option<Arc<dyn Connection>>,
    custom_routes: Vec<Router>,
}

impl ServerBuilder {
    /// Create a new ServerBuilder
    pub fn new() -> Self {
        Self {
            connection: None,
            custom_routes: Vec::new(),
        }
    }

    /// Set the database connection (required)
    pub fn with_connection(mut self, connection: impl Connection + 'static) -> Self {
        self.connection = Some(Arc::new(connection));
        self
    }

    /// Add routes outside the master-data API
    ///
    /// Custom routers must already carry their own state.
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Build the final router
    ///
    /// Fails when the procedure catalog is malformed or no connection was set.
    pub fn build(self) -> Result<Router> {
        let (app, _) = self.assemble()?;
        Ok(app)
    }

    /// Serve the application with graceful shutdown on SIGTERM or Ctrl+C
    ///
    /// The database is pinged before the listener is bound; a failed ping
    /// aborts startup with [`StartupError::HealthCheck`].
    pub async fn serve(self, addr: &str) -> Result<()> {
        self.serve_with_shutdown(addr, shutdown_signal()).await
    }

    /// Serve until `signal` resolves, then close the connection
    pub async fn serve_with_shutdown<F>(self, addr: &str, signal: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let (app, connection) = self.assemble()?;

        connection
            .health_check()
            .await
            .map_err(|e| StartupError::HealthCheck(format!("{:#}", e)))?;

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| StartupError::Bind {
                addr: addr.to_string(),
                source,
            })?;

        tracing::info!("Server listening on {}", addr);

        let served = axum::serve(listener, app)
            .with_graceful_shutdown(signal)
            .await
            .map_err(StartupError::Serve);

        connection.close().await;
        tracing::info!("Server shutdown complete");

        Ok(served?)
    }

    fn assemble(mut self) -> Result<(Router, Arc<dyn Connection>)> {
        catalog::verify()?;

        let connection = self
            .connection
            .take()
            .ok_or_else(|| anyhow::anyhow!("Connection is required. Call .with_connection()"))?;

        let mut app = build_routes(AppState::new(connection.clone()));
        for custom_router in self.custom_routes {
            app = app.merge(custom_router);
        }

        let middleware = ServiceBuilder::new().layer(TraceLayer::new_for_http());

        Ok((app.layer(middleware), connection))
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
