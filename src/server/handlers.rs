// src/server/handlers.rs
use super::AppState;
use crate::error::GatewayError;
use crate::types::OrderRequest;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info};

/// Boundary translation of the core's error taxonomy. The exchange's
/// original message text is what the client sees for exchange rejections;
/// anything unexpected stays a generic 500, distinct from those.
pub struct ApiError(GatewayError);

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self.0 {
            GatewayError::Exchange { code, message } => {
                error!(code, %message, "exchange rejected the call");
                (
                    StatusCode::BAD_REQUEST,
                    json!({ "detail": message, "code": code }),
                )
            }
            GatewayError::NotFound(what) => (StatusCode::NOT_FOUND, json!({ "detail": what })),
            GatewayError::Validation(reason) => {
                (StatusCode::UNPROCESSABLE_ENTITY, json!({ "detail": reason }))
            }
            GatewayError::Transport(detail) => {
                error!(%detail, "exchange unreachable");
                (StatusCode::BAD_GATEWAY, json!({ "detail": detail }))
            }
            // Legitimately-empty states that a handler did not shape itself.
            GatewayError::EmptyResult(kind) => {
                (StatusCode::OK, json!({ "list": [], "note": kind.to_string() }))
            }
        };
        (status, Json(body)).into_response()
    }
}

#[derive(Deserialize)]
pub struct SymbolQuery {
    pub symbol: Option<String>,
}

#[derive(Deserialize)]
pub struct KlineQuery {
    #[serde(default = "default_interval")]
    pub interval: String,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_interval() -> String {
    "60".to_string()
}

fn default_limit() -> u32 {
    100
}

#[derive(Deserialize)]
pub struct CancelRequest {
    pub symbol: String,
    pub order_id: String,
}

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "testnet": state.config.use_testnet,
        "symbols": state.config.symbol_list(),
    }))
}

pub async fn account(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let account = state.orchestrator.account().await?;
    Ok(Json(account))
}

pub async fn balance(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    match state.orchestrator.balance().await {
        Ok(balances) => Ok(Json(json!({ "balances": balances }))),
        Err(GatewayError::EmptyResult(kind)) => {
            info!(%kind, "balance query returned no data");
            Ok(Json(json!({ "balances": [], "note": kind.to_string() })))
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn positions(
    State(state): State<AppState>,
    Query(query): Query<SymbolQuery>,
) -> Result<Json<Value>, ApiError> {
    match state.orchestrator.positions(query.symbol.as_deref()).await {
        Ok(positions) => Ok(Json(json!({ "positions": positions }))),
        Err(GatewayError::EmptyResult(kind)) => {
            Ok(Json(json!({ "positions": [], "note": kind.to_string() })))
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn price(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let price = state.orchestrator.price(&symbol).await?;
    Ok(Json(json!(price)))
}

pub async fn klines(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(query): Query<KlineQuery>,
) -> Result<Json<Value>, ApiError> {
    let series = state
        .orchestrator
        .klines(&symbol, &query.interval, query.limit)
        .await?;
    Ok(Json(json!({ "klines": series.bars })))
}

pub async fn signal(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(query): Query<KlineQuery>,
) -> Result<Json<Value>, ApiError> {
    let report = state
        .orchestrator
        .signal(&symbol, &query.interval, query.limit)
        .await?;
    Ok(Json(json!(report)))
}

pub async fn create_order(
    State(state): State<AppState>,
    Json(request): Json<OrderRequest>,
) -> Result<Json<Value>, ApiError> {
    info!(symbol = %request.symbol, side = request.side.as_str(), "order request");
    let receipt = state.orchestrator.submit_order(&request).await?;
    Ok(Json(json!(receipt)))
}

pub async fn open_orders(
    State(state): State<AppState>,
    Query(query): Query<SymbolQuery>,
) -> Result<Json<Value>, ApiError> {
    let orders = state
        .orchestrator
        .open_orders(query.symbol.as_deref())
        .await?;
    Ok(Json(json!({ "orders": orders })))
}

pub async fn cancel_order(
    State(state): State<AppState>,
    Json(request): Json<CancelRequest>,
) -> Result<Json<Value>, ApiError> {
    let order_id = state
        .orchestrator
        .cancel_order(&request.symbol, &request.order_id)
        .await?;
    Ok(Json(json!({ "order_id": order_id, "status": "cancelled" })))
}
