// src/core/orchestrator.rs
use crate::connectors::traits::ExchangeGateway;
use crate::error::GatewayError;
use crate::strategies::sma_cross::SmaCrossover;
use crate::types::{
    Balance, BarSeries, OpenOrder, OrderRequest, OrderTicket, OrderType, Position,
    PositionFilter, PriceData, SignalKind,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

const CATEGORY: &str = "linear";
const ACCOUNT_TYPE: &str = "UNIFIED";
const TIME_IN_FORCE: &str = "GTC";

/// Signal plus the display-rounded values the boundary hands out. The
/// detector itself never rounds; two-decimal presentation happens here.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalReport {
    pub symbol: String,
    pub signal: SignalKind,
    pub sma_fast: f64,
    pub sma_slow: f64,
    pub current_price: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderReceipt {
    pub order_id: String,
    pub symbol: String,
    pub side: String,
    pub order_type: String,
    pub qty: Decimal,
    pub price: Option<Decimal>,
    pub status: String,
    pub created_time: DateTime<Utc>,
}

/// Sequences fetch-bars → detect → report, and validate → forward for
/// orders. Owns the injected gateway; every operation is request-scoped and
/// nothing is retried here.
pub struct Orchestrator {
    gateway: Arc<dyn ExchangeGateway>,
    detector: SmaCrossover,
}

impl Orchestrator {
    pub fn new(gateway: Arc<dyn ExchangeGateway>) -> Self {
        Self {
            gateway,
            detector: SmaCrossover::default(),
        }
    }

    pub fn with_detector(gateway: Arc<dyn ExchangeGateway>, detector: SmaCrossover) -> Self {
        Self { gateway, detector }
    }

    fn round2(value: f64) -> f64 {
        (value * 100.0).round() / 100.0
    }

    /// Fetch a series and run the detector over it.
    pub async fn signal(
        &self,
        symbol: &str,
        interval: &str,
        limit: u32,
    ) -> Result<SignalReport, GatewayError> {
        let series = self.gateway.klines(CATEGORY, symbol, interval, limit).await?;
        let signal = self.detector.detect(&series);
        let current_price = series.last_close().unwrap_or(0.0);

        info!(
            symbol,
            signal = ?signal.kind,
            bars = series.len(),
            "signal computed"
        );

        Ok(SignalReport {
            symbol: symbol.to_string(),
            signal: signal.kind,
            sma_fast: Self::round2(signal.sma_fast),
            sma_slow: Self::round2(signal.sma_slow),
            current_price: Self::round2(current_price),
            timestamp: Utc::now(),
        })
    }

    /// Validate a caller's order and forward it as a wire-shaped ticket.
    pub async fn submit_order(&self, request: &OrderRequest) -> Result<OrderReceipt, GatewayError> {
        Self::validate(request)?;

        let ticket = OrderTicket {
            category: CATEGORY.to_string(),
            symbol: request.symbol.clone(),
            side: request.side,
            order_type: request.order_type,
            qty: request.qty,
            price: request.price,
            time_in_force: TIME_IN_FORCE.to_string(),
            position_idx: 0,
        };
        let order_id = self.gateway.place_order(&ticket).await?;

        Ok(OrderReceipt {
            order_id,
            symbol: request.symbol.clone(),
            side: request.side.as_str().to_string(),
            order_type: request.order_type.as_str().to_string(),
            qty: request.qty,
            price: request.price,
            status: "created".to_string(),
            created_time: Utc::now(),
        })
    }

    fn validate(request: &OrderRequest) -> Result<(), GatewayError> {
        if request.qty <= Decimal::ZERO {
            return Err(GatewayError::Validation(
                "order quantity must be positive".to_string(),
            ));
        }
        match request.order_type {
            OrderType::Limit => match request.price {
                None => Err(GatewayError::Validation(
                    "limit order requires a price".to_string(),
                )),
                Some(price) if price <= Decimal::ZERO => Err(GatewayError::Validation(
                    "limit price must be positive".to_string(),
                )),
                Some(_) => Ok(()),
            },
            OrderType::Market => {
                if request.price.is_some() {
                    // Caller-side contract violation, not silently corrected.
                    Err(GatewayError::Validation(
                        "market order must not carry a price".to_string(),
                    ))
                } else {
                    Ok(())
                }
            }
        }
    }

    pub async fn account(&self) -> Result<serde_json::Value, GatewayError> {
        self.gateway.account_info().await
    }

    pub async fn balance(&self) -> Result<Vec<Balance>, GatewayError> {
        self.gateway.wallet_balance(ACCOUNT_TYPE, None).await
    }

    pub async fn positions(&self, symbol: Option<&str>) -> Result<Vec<Position>, GatewayError> {
        let filter = match symbol {
            Some(symbol) => PositionFilter::Symbol(symbol.to_string()),
            None => PositionFilter::default(),
        };
        self.gateway.positions(CATEGORY, &filter).await
    }

    pub async fn price(&self, symbol: &str) -> Result<PriceData, GatewayError> {
        self.gateway.ticker(CATEGORY, symbol).await
    }

    pub async fn klines(
        &self,
        symbol: &str,
        interval: &str,
        limit: u32,
    ) -> Result<BarSeries, GatewayError> {
        self.gateway.klines(CATEGORY, symbol, interval, limit).await
    }

    pub async fn open_orders(&self, symbol: Option<&str>) -> Result<Vec<OpenOrder>, GatewayError> {
        self.gateway.open_orders(CATEGORY, symbol).await
    }

    pub async fn cancel_order(
        &self,
        symbol: &str,
        order_id: &str,
    ) -> Result<String, GatewayError> {
        self.gateway.cancel_order(CATEGORY, symbol, order_id).await
    }

    pub async fn server_time(&self) -> Result<i64, GatewayError> {
        self.gateway.server_time().await
    }
}
