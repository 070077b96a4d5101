//! Violation catalog handlers
//!
//! The listing decodes every row into a [`Violation`]. Columns beyond the
//! four declared fields are dropped, and a NULL in any declared column
//! fails the whole listing with a 500 rather than returning a partial
//! array.

use super::{AppState, MessageResponse, execute_bound, parse_id, query_bound, validated};
use crate::catalog;
use crate::core::{ApiError, decode_rows};
use crate::entities::{NewViolation, Violation, ViolationId, ViolationUpdate};
use crate::params;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;

const LIST_FAILURE: &str = "Failed to fetch violations";

/// Create a violation
///
/// POST /violation
pub async fn insert_violation(
    State(state): State<AppState>,
    payload: Result<Json<NewViolation>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let violation = validated(payload)?;

    execute_bound(state.db.as_ref(), &violation, "Failed to insert violation").await?;

    Ok((
        StatusCode::CREATED,
        MessageResponse::new("Violation added successfully"),
    ))
}

/// Update a violation
///
/// PUT /violation
pub async fn update_violation(
    State(state): State<AppState>,
    payload: Result<Json<ViolationUpdate>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let violation = validated(payload)?;

    execute_bound(state.db.as_ref(), &violation, "Failed to update violation").await?;

    Ok(MessageResponse::new("Violation updated successfully"))
}

/// Delete a violation
///
/// DELETE /violation/{id}
pub async fn delete_violation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = ViolationId(parse_id(&id)?);

    execute_bound(state.db.as_ref(), &id, "Failed to delete violation").await?;

    Ok(MessageResponse::new("Violation deleted successfully"))
}

/// List every violation in database order
///
/// GET /violation
pub async fn list_violations(
    State(state): State<AppState>,
) -> Result<Json<Vec<Violation>>, ApiError> {
    let rows = query_bound(
        state.db.as_ref(),
        catalog::GET_MASTER_VIOLATIONS.bind(params![]),
        LIST_FAILURE,
    )
    .await?;

    let violations = decode_rows(rows).map_err(|e| {
        tracing::error!(error = %e, "Unexpected violation row shape");
        ApiError::database(LIST_FAILURE)
    })?;

    Ok(Json(violations))
}
