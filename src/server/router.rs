//! Route table for the master-data API

use crate::handlers::AppState;
use crate::handlers::health::health_check;
use crate::handlers::order_status::list_order_statuses;
use crate::handlers::product::{delete_product, insert_product, update_product};
use crate::handlers::violation::{
    delete_violation, insert_violation, list_violations, update_violation,
};
use axum::Router;
use axum::routing::{delete, get, post};

/// Build every API route bound to `state`
///
/// - POST /product, PUT /product - Create or update a product
/// - DELETE /product/{id} - Delete a product
/// - POST /violation, PUT /violation, GET /violation - Violation writes and listing
/// - DELETE /violation/{id} - Delete a violation
/// - GET /order-statuses - List order statuses
/// - GET /health, GET /healthz - Liveness with a database ping
pub fn build_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/healthz", get(health_check))
        .route("/product", post(insert_product).put(update_product))
        .route("/product/{id}", delete(delete_product))
        .route(
            "/violation",
            post(insert_violation)
                .put(update_violation)
                .get(list_violations),
        )
        .route("/violation/{id}", delete(delete_violation))
        .route("/order-statuses", get(list_order_statuses))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CommandTag;
    use crate::params;
    use crate::storage::MockConnection;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn router(mock: &MockConnection) -> Router {
        build_routes(AppState::new(Arc::new(mock.clone())))
    }

    async fn status_of(app: Router, method: Method, uri: &str) -> StatusCode {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        app.oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn test_health_routes_are_mounted() {
        let mock = MockConnection::new();
        assert_eq!(
            status_of(router(&mock), Method::GET, "/health").await,
            StatusCode::OK
        );
        assert_eq!(
            status_of(router(&mock), Method::GET, "/healthz").await,
            StatusCode::OK
        );
    }

    #[tokio::test]
    async fn test_delete_routes_take_path_id() {
        let mock = MockConnection::new();
        mock.expect_execute("CALL delete_master_violation($1)")
            .with_args(params![5])
            .will_return_result(CommandTag::new("CALL", 1));

        let status = status_of(router(&mock), Method::DELETE, "/violation/5").await;

        assert_eq!(status, StatusCode::OK);
        mock.assert_expectations_met();
    }

    #[tokio::test]
    async fn test_unsupported_method_is_rejected() {
        let mock = MockConnection::new();

        let status = status_of(router(&mock), Method::GET, "/product").await;

        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found() {
        let mock = MockConnection::new();
        assert_eq!(
            status_of(router(&mock), Method::GET, "/products").await,
            StatusCode::NOT_FOUND
        );
    }
}
