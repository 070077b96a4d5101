//! Product catalog handlers

use super::{AppState, MessageResponse, execute_bound, parse_id, validated};
use crate::core::ApiError;
use crate::entities::{NewProduct, ProductId, ProductUpdate};
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;

/// Create a product
///
/// POST /product
pub async fn insert_product(
    State(state): State<AppState>,
    payload: Result<Json<NewProduct>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let product = validated(payload)?;

    execute_bound(state.db.as_ref(), &product, "Failed to insert product").await?;

    Ok((
        StatusCode::CREATED,
        MessageResponse::new("Product added successfully"),
    ))
}

/// Update a product
///
/// PUT /product
pub async fn update_product(
    State(state): State<AppState>,
    payload: Result<Json<ProductUpdate>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let product = validated(payload)?;

    execute_bound(state.db.as_ref(), &product, "Failed to update product").await?;

    Ok(MessageResponse::new("Product updated successfully"))
}

/// Delete a product
///
/// DELETE /product/{id}
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = ProductId(parse_id(&id)?);

    execute_bound(state.db.as_ref(), &id, "Failed to delete product").await?;

    Ok(MessageResponse::new("Product deleted successfully"))
}
