//! HTTP API server for the inventory adjustment engine.
//!
//! Exposes order application and reversal, stock level reads and writes,
//! with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use inventory::InventoryEngine;
use metrics_exporter_prometheus::PrometheusHandle;
use stock_gateway::StockGateway;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::orders::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<G: StockGateway + 'static>(
    state: Arc<AppState<G>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check::<G>))
        .route(
            "/stock/{product_id}",
            get(routes::stock::get::<G>).put(routes::stock::set::<G>),
        )
        .route("/orders/{id}/apply", post(routes::orders::apply::<G>))
        .route("/orders/{id}/reverse", post(routes::orders::reverse::<G>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state around the given stock gateway.
pub fn create_state<G: StockGateway + 'static>(gateway: G) -> Arc<AppState<G>> {
    Arc::new(AppState {
        engine: InventoryEngine::new(gateway),
    })
}
