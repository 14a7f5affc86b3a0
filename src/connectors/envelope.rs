// src/connectors/envelope.rs
//! Raw wire types for the Bybit v5 response envelope. Decoded exactly once,
//! in the gateway; nothing downstream ever sees a `retCode`.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};

/// Outer wrapper every v5 endpoint returns.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ApiEnvelope<T> {
    #[serde(rename = "retCode")]
    pub ret_code: i64,
    #[serde(rename = "retMsg", default)]
    pub ret_msg: String,
    #[serde(default)]
    pub result: Option<T>,
    /// Server timestamp in milliseconds, present on every response.
    #[serde(default)]
    pub time: Option<i64>,
}

/// `result` shape shared by balance/position/ticker/order queries.
#[derive(Debug, Deserialize)]
pub struct ListResult<T> {
    #[serde(default = "Vec::new")]
    pub list: Vec<T>,
}

/// Bybit encodes numbers as strings and uses `""` for absent values.
fn lenient_decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    if s.is_empty() {
        return Ok(Decimal::ZERO);
    }
    s.parse().map_err(serde::de::Error::custom)
}

#[derive(Debug, Deserialize)]
pub struct RawAccount {
    #[serde(rename = "accountType", default)]
    pub account_type: String,
    #[serde(default)]
    pub coin: Vec<RawCoin>,
}

#[derive(Debug, Deserialize)]
pub struct RawCoin {
    pub coin: String,
    #[serde(rename = "walletBalance", deserialize_with = "lenient_decimal", default)]
    pub wallet_balance: Decimal,
    #[serde(
        rename = "availableToWithdraw",
        deserialize_with = "lenient_decimal",
        default
    )]
    pub available_to_withdraw: Decimal,
    #[serde(deserialize_with = "lenient_decimal", default)]
    pub equity: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct RawPosition {
    pub symbol: String,
    #[serde(default)]
    pub side: String,
    #[serde(deserialize_with = "lenient_decimal", default)]
    pub size: Decimal,
    #[serde(rename = "avgPrice", deserialize_with = "lenient_decimal", default)]
    pub avg_price: Decimal,
    #[serde(rename = "markPrice", deserialize_with = "lenient_decimal", default)]
    pub mark_price: Decimal,
    #[serde(rename = "unrealisedPnl", deserialize_with = "lenient_decimal", default)]
    pub unrealised_pnl: Decimal,
    #[serde(deserialize_with = "lenient_decimal", default)]
    pub leverage: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct RawTicker {
    pub symbol: String,
    #[serde(rename = "lastPrice", deserialize_with = "lenient_decimal", default)]
    pub last_price: Decimal,
}

/// Kline rows arrive as positional string arrays:
/// `[startTime, open, high, low, close, volume, turnover]`, newest first.
#[derive(Debug, Deserialize)]
pub struct RawKlineResult {
    #[serde(default)]
    pub symbol: String,
    #[serde(default = "Vec::new")]
    pub list: Vec<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct RawOrder {
    #[serde(rename = "orderId")]
    pub order_id: String,
    pub symbol: String,
    #[serde(default)]
    pub side: String,
    #[serde(rename = "orderType", default)]
    pub order_type: String,
    #[serde(deserialize_with = "lenient_decimal", default)]
    pub qty: Decimal,
    #[serde(deserialize_with = "lenient_decimal", default)]
    pub price: Decimal,
    #[serde(rename = "orderStatus", default)]
    pub order_status: String,
    #[serde(rename = "createdTime", default)]
    pub created_time: String,
}

/// `result` of order create/cancel: just the assigned id.
#[derive(Debug, Deserialize)]
pub struct RawOrderId {
    #[serde(rename = "orderId")]
    pub order_id: String,
}

#[derive(Debug, Deserialize)]
pub struct RawServerTime {
    #[serde(rename = "timeSecond")]
    pub time_second: String,
}
