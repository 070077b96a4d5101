//! HTTP handlers for the master-data resources
//!
//! Every handler runs the same steps: parse the body or path id, validate
//! the record, invoke its stored procedure through the shared
//! [`Connection`], and answer with a JSON message or row array.

pub mod health;
pub mod order_status;
pub mod product;
pub mod violation;

use crate::core::{ApiError, BoundCall, CommandTag, Connection, ProcedureArgs, Row};
use axum::Json;
use axum::extract::rejection::JsonRejection;
use serde::Serialize;
use std::sync::Arc;
use validator::{Validate, ValidationErrors};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn Connection>,
}

impl AppState {
    pub fn new(db: Arc<dyn Connection>) -> Self {
        Self { db }
    }
}

/// Body of a successful write
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

impl MessageResponse {
    pub fn new(message: &'static str) -> Json<Self> {
        Json(Self { message })
    }
}

/// Unwrap the JSON body and run its field validators
pub(crate) fn validated<T: Validate>(
    payload: Result<Json<T>, JsonRejection>,
) -> Result<T, ApiError> {
    let Json(record) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection, "Rejected request body");
        ApiError::InvalidPayload(rejection.body_text())
    })?;

    record.validate().map_err(|errors| {
        let message = validation_message(&errors);
        tracing::debug!(%message, "Validation failed");
        ApiError::Validation(message)
    })?;

    Ok(record)
}

/// Parse a numeric path id; ids follow the same `>= 1` rule as request bodies
pub(crate) fn parse_id(raw: &str) -> Result<i32, ApiError> {
    let id: i32 = raw.trim().parse().map_err(|_| ApiError::InvalidId)?;
    if id < 1 {
        tracing::debug!(id, "Rejected non-positive path id");
        return Err(ApiError::Validation(
            "id must be a positive integer".to_string(),
        ));
    }
    Ok(id)
}

/// Flatten validator output into one message, ordered by field name
pub fn validation_message(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |e| match &e.message {
                Some(message) => message.to_string(),
                None => format!("{} failed the '{}' check", field, e.code),
            })
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Bind a record and run its `CALL`, logging failures
pub(crate) async fn execute_bound(
    db: &dyn Connection,
    record: &impl ProcedureArgs,
    failure: &'static str,
) -> Result<CommandTag, ApiError> {
    let call = bind_or_fail(record.bind(), failure)?;
    call.execute(db).await.map_err(|e| log_db_error(&call, e, failure))
}

/// Run a `SELECT * FROM` call, logging failures
pub(crate) async fn query_bound(
    db: &dyn Connection,
    call: Result<BoundCall, crate::core::ProcedureError>,
    failure: &'static str,
) -> Result<Vec<Row>, ApiError> {
    let call = bind_or_fail(call, failure)?;
    call.query(db).await.map_err(|e| log_db_error(&call, e, failure))
}

fn bind_or_fail(
    call: Result<BoundCall, crate::core::ProcedureError>,
    failure: &'static str,
) -> Result<BoundCall, ApiError> {
    call.map_err(|e| {
        tracing::error!(error = %e, "{}", failure);
        ApiError::database(failure)
    })
}

fn log_db_error(call: &BoundCall, error: anyhow::Error, failure: &'static str) -> ApiError {
    tracing::error!(
        procedure = call.procedure().name(),
        error = %error,
        "{}",
        failure
    );
    ApiError::database(failure)
}
