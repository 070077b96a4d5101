//! Order status listing
//!
//! Rows are decoded into [`OrderStatus`]. Extra columns are dropped and a
//! NULL `order_id` or `order_status` fails the whole listing with a 500.

use super::{AppState, query_bound};
use crate::catalog;
use crate::core::{ApiError, decode_rows};
use crate::entities::OrderStatus;
use crate::params;
use axum::Json;
use axum::extract::State;

const FAILURE: &str = "Failed to fetch order statuses";

/// List order statuses exactly as the database returns them
///
/// GET /order-statuses
pub async fn list_order_statuses(
    State(state): State<AppState>,
) -> Result<Json<Vec<OrderStatus>>, ApiError> {
    let rows = query_bound(
        state.db.as_ref(),
        catalog::GET_ORDER_STATUSES.bind(params![]),
        FAILURE,
    )
    .await?;

    let statuses = decode_rows(rows).map_err(|e| {
        tracing::error!(error = %e, "Unexpected order status row shape");
        ApiError::database(FAILURE)
    })?;

    Ok(Json(statuses))
}
