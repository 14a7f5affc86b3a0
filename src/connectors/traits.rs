// src/connectors/traits.rs
use crate::error::GatewayError;
use crate::types::{
    Balance, BarSeries, OpenOrder, OrderTicket, Position, PositionFilter, PriceData,
};
use async_trait::async_trait;

/// Normalized surface over the exchange's five operation families. Every
/// method resolves to a typed payload or a classified [`GatewayError`];
/// implementations never retry and never rewrite exchange messages.
#[async_trait]
pub trait ExchangeGateway: Send + Sync {
    /// Exchange clock in epoch milliseconds. Doubles as a connectivity probe.
    async fn server_time(&self) -> Result<i64, GatewayError>;

    /// Raw account summary, passed through untyped.
    async fn account_info(&self) -> Result<serde_json::Value, GatewayError>;

    /// Per-coin balances across the account's coin lists. Zero accounts and
    /// zero coins are distinct `EmptyResult` states, not failures.
    async fn wallet_balance(
        &self,
        account_type: &str,
        coin: Option<&str>,
    ) -> Result<Vec<Balance>, GatewayError>;

    /// Open positions matching the filter, restricted to size > 0.
    async fn positions(
        &self,
        category: &str,
        filter: &PositionFilter,
    ) -> Result<Vec<Position>, GatewayError>;

    /// Latest price for one symbol. An empty ticker list on a success
    /// envelope is `NotFound`, not an exchange error.
    async fn ticker(&self, category: &str, symbol: &str) -> Result<PriceData, GatewayError>;

    /// Candles for symbol+interval, reversed into chronological ascending
    /// order before handoff.
    async fn klines(
        &self,
        category: &str,
        symbol: &str,
        interval: &str,
        limit: u32,
    ) -> Result<BarSeries, GatewayError>;

    /// Submit an order, returning the exchange-assigned id.
    async fn place_order(&self, ticket: &OrderTicket) -> Result<String, GatewayError>;

    async fn open_orders(
        &self,
        category: &str,
        symbol: Option<&str>,
    ) -> Result<Vec<OpenOrder>, GatewayError>;

    /// Cancel by id, returning the id the exchange echoes back.
    async fn cancel_order(
        &self,
        category: &str,
        symbol: &str,
        order_id: &str,
    ) -> Result<String, GatewayError>;
}
