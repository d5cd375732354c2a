//! Order inventory adjustment endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::OrderId;
use inventory::{BatchResult, InventoryEngine, ItemOutcome, LineItem, OrderBatch, OverallStatus};
use serde::{Deserialize, Serialize};
use stock_gateway::StockGateway;

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<G: StockGateway> {
    pub engine: InventoryEngine<G>,
}

// -- Request types --

#[derive(Deserialize)]
pub struct AdjustmentRequest {
    pub items: Vec<LineItemRequest>,
}

#[derive(Deserialize)]
pub struct LineItemRequest {
    pub product_id: String,
    pub quantity: i64,
}

// -- Response types --

#[derive(Serialize)]
pub struct AdjustmentResponse {
    pub order_id: String,
    pub status: String,
    pub message: String,
    pub outcomes: Vec<OutcomeResponse>,
    pub compensation: Vec<OutcomeResponse>,
    pub inconsistent_products: Vec<String>,
}

#[derive(Serialize)]
pub struct OutcomeResponse {
    pub product_id: String,
    pub quantity: u32,
    pub direction: String,
    pub success: bool,
    pub error: Option<String>,
    pub settled_at: String,
}

impl From<&ItemOutcome> for OutcomeResponse {
    fn from(outcome: &ItemOutcome) -> Self {
        Self {
            product_id: outcome.product_id().to_string(),
            quantity: outcome.item().quantity,
            direction: outcome.direction().to_string(),
            success: outcome.is_success(),
            error: outcome.error_detail().map(String::from),
            settled_at: outcome.settled_at().to_rfc3339(),
        }
    }
}

// -- Handlers --

/// POST /orders/:id/apply: decrement stock for a placed order.
#[tracing::instrument(skip(state, req))]
pub async fn apply<G: StockGateway + 'static>(
    State(state): State<Arc<AppState<G>>>,
    Path(id): Path<String>,
    Json(req): Json<AdjustmentRequest>,
) -> Result<(StatusCode, Json<AdjustmentResponse>), ApiError> {
    let order_id = parse_order_id(&id)?;
    let batch = to_batch(req)?;

    let result = state.engine.apply_order(&batch).await?;
    Ok(respond(order_id, &result))
}

/// POST /orders/:id/reverse: restore stock for a cancelled order.
#[tracing::instrument(skip(state, req))]
pub async fn reverse<G: StockGateway + 'static>(
    State(state): State<Arc<AppState<G>>>,
    Path(id): Path<String>,
    Json(req): Json<AdjustmentRequest>,
) -> Result<(StatusCode, Json<AdjustmentResponse>), ApiError> {
    let order_id = parse_order_id(&id)?;
    let batch = to_batch(req)?;

    let result = state.engine.reverse_order(&batch).await?;
    Ok(respond(order_id, &result))
}

/// Builds a batch from request lines, merging repeated products.
fn to_batch(req: AdjustmentRequest) -> Result<OrderBatch, ApiError> {
    let items = req
        .items
        .into_iter()
        .map(|line| {
            let quantity = u32::try_from(line.quantity).map_err(|_| {
                ApiError::BadRequest(format!(
                    "Invalid quantity for product {}: {}",
                    line.product_id, line.quantity
                ))
            })?;
            Ok(LineItem::new(line.product_id, quantity))
        })
        .collect::<Result<Vec<_>, ApiError>>()?;

    Ok(OrderBatch::merged(items)?)
}

fn respond(order_id: OrderId, result: &BatchResult) -> (StatusCode, Json<AdjustmentResponse>) {
    let status = result.overall_status();
    let (code, message) = match status {
        OverallStatus::FullSuccess => (StatusCode::OK, "Inventory adjusted"),
        OverallStatus::CompensatedFailure => (
            StatusCode::CONFLICT,
            "Order could not be fulfilled: one or more items are unavailable",
        ),
        OverallStatus::UncompensatedFailure => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Inventory adjustment failed and requires manual reconciliation",
        ),
    };

    let response = AdjustmentResponse {
        order_id: order_id.to_string(),
        status: status.to_string(),
        message: message.to_string(),
        outcomes: result.outcomes().iter().map(OutcomeResponse::from).collect(),
        compensation: result
            .compensation()
            .iter()
            .map(OutcomeResponse::from)
            .collect(),
        inconsistent_products: result
            .inconsistent_products()
            .into_iter()
            .map(|p| p.to_string())
            .collect(),
    };

    (code, Json(response))
}

fn parse_order_id(id: &str) -> Result<OrderId, ApiError> {
    let uuid = uuid::Uuid::parse_str(id)
        .map_err(|e| ApiError::BadRequest(format!("Invalid order ID format: {e}")))?;
    Ok(OrderId::from(uuid))
}
