//! Stock level endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use common::ProductId;
use serde::{Deserialize, Serialize};
use stock_gateway::StockGateway;

use crate::error::ApiError;
use crate::routes::orders::AppState;

#[derive(Deserialize)]
pub struct SetStockRequest {
    pub quantity: i64,
}

#[derive(Serialize)]
pub struct StockResponse {
    pub product_id: String,
    pub quantity: i64,
}

/// GET /stock/:product_id: current stock level of a product.
#[tracing::instrument(skip(state))]
pub async fn get<G: StockGateway + 'static>(
    State(state): State<Arc<AppState<G>>>,
    Path(product_id): Path<String>,
) -> Result<Json<StockResponse>, ApiError> {
    let product = ProductId::new(product_id);
    let quantity = state
        .engine
        .gateway()
        .stock_level(&product)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Product {product} not found")))?;

    Ok(Json(StockResponse {
        product_id: product.to_string(),
        quantity,
    }))
}

/// PUT /stock/:product_id: set a product's stock level.
#[tracing::instrument(skip(state, req))]
pub async fn set<G: StockGateway + 'static>(
    State(state): State<Arc<AppState<G>>>,
    Path(product_id): Path<String>,
    Json(req): Json<SetStockRequest>,
) -> Result<Json<StockResponse>, ApiError> {
    let product = ProductId::new(product_id);
    state
        .engine
        .gateway()
        .set_stock_level(&product, req.quantity)
        .await?;

    tracing::info!(%product, quantity = req.quantity, "stock level set");

    Ok(Json(StockResponse {
        product_id: product.to_string(),
        quantity: req.quantity,
    }))
}
