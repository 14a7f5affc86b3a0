// src/server/mod.rs
pub mod handlers;

use crate::config::AppConfig;
use crate::core::orchestrator::Orchestrator;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub config: Arc<AppConfig>,
}

/// Each route maps 1:1 onto one orchestrator operation.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/account", get(handlers::account))
        .route("/api/balance", get(handlers::balance))
        .route("/api/positions", get(handlers::positions))
        .route("/api/price/:symbol", get(handlers::price))
        .route("/api/klines/:symbol", get(handlers::klines))
        .route("/api/signal/:symbol", post(handlers::signal))
        .route("/api/order", post(handlers::create_order))
        .route("/api/orders", get(handlers::open_orders))
        .route("/api/orders/cancel", post(handlers::cancel_order))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
