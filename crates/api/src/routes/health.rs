//! Health check endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use common::ProductId;
use serde::Serialize;
use stock_gateway::StockGateway;

use crate::routes::orders::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub gateway: &'static str,
}

/// GET /health: reports whether the stock gateway answers reads.
pub async fn check<G: StockGateway + 'static>(
    State(state): State<Arc<AppState<G>>>,
) -> (StatusCode, Json<HealthResponse>) {
    let probe = ProductId::new("__health__");

    match state.engine.gateway().stock_level(&probe).await {
        Ok(_) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok",
                gateway: "ok",
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "stock gateway health probe failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "degraded",
                    gateway: "unavailable",
                }),
            )
        }
    }
}
