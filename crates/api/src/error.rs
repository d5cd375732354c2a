//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use inventory::InventoryError;
use stock_gateway::GatewayError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Inventory engine error.
    Inventory(InventoryError),
    /// Stock gateway error outside of an adjustment batch.
    Gateway(GatewayError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Inventory(err) => inventory_error_to_response(err),
            ApiError::Gateway(err) => gateway_error_to_response(err),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn inventory_error_to_response(err: InventoryError) -> (StatusCode, String) {
    match &err {
        InventoryError::InvalidBatch(_) => (StatusCode::BAD_REQUEST, err.to_string()),
        InventoryError::InvalidTransition { .. } => {
            tracing::error!(error = %err, "adjustment state machine violated");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

fn gateway_error_to_response(err: GatewayError) -> (StatusCode, String) {
    match &err {
        GatewayError::ProductNotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        GatewayError::InvalidQuantity { .. } => (StatusCode::BAD_REQUEST, err.to_string()),
        GatewayError::InsufficientStock { .. } => (StatusCode::CONFLICT, err.to_string()),
        _ => {
            tracing::error!(error = %err, "stock gateway error");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

impl From<InventoryError> for ApiError {
    fn from(err: InventoryError) -> Self {
        ApiError::Inventory(err)
    }
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        ApiError::Gateway(err)
    }
}
