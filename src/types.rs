// src/types.rs
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order direction, serialized with the exchange's exact casing ("Buy"/"Sell").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "Buy",
            Side::Sell => "Sell",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderType {
    Market,
    Limit,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Market => "Market",
            OrderType::Limit => "Limit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalKind {
    Buy,
    Sell,
    Hold,
}

/// Output of the crossover detector: the decision plus the two SMA values it
/// was derived from, unrounded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Signal {
    pub kind: SignalKind,
    pub sma_fast: f64,
    pub sma_slow: f64,
}

impl Signal {
    pub fn hold() -> Self {
        Self {
            kind: SignalKind::Hold,
            sma_fast: 0.0,
            sma_slow: 0.0,
        }
    }
}

/// One OHLCV candle. Timestamp is the bar start in exchange epoch millis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bar {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Bars for one symbol+interval, chronologically ascending. The gateway is
/// responsible for reversing the exchange's newest-first ordering before a
/// series is handed to anyone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSeries {
    pub symbol: String,
    pub interval: String,
    pub bars: Vec<Bar>,
}

impl BarSeries {
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last_close(&self) -> Option<f64> {
        self.bars.last().map(|b| b.close)
    }
}

/// An open position as reported by the exchange. Zero-size entries are
/// filtered out at the gateway and never constructed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Position {
    pub symbol: String,
    pub side: String,
    pub size: Decimal,
    pub entry_price: Decimal,
    pub mark_price: Decimal,
    pub unrealised_pnl: Decimal,
    pub leverage: Decimal,
}

/// Per-coin wallet snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Balance {
    pub coin: String,
    pub wallet_balance: Decimal,
    pub available_balance: Decimal,
    pub equity: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceData {
    pub symbol: String,
    pub price: Decimal,
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpenOrder {
    pub order_id: String,
    pub symbol: String,
    pub side: String,
    pub order_type: String,
    pub qty: Decimal,
    pub price: Decimal,
    pub status: String,
    pub created_time: String,
}

/// A caller's intent to trade, as accepted over HTTP. Validation (positive
/// quantity, the Limit/Market price rules) happens in the orchestrator before
/// this is translated into an [`OrderTicket`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OrderRequest {
    pub symbol: String,
    pub side: Side,
    pub order_type: OrderType,
    pub qty: Decimal,
    #[serde(default)]
    pub price: Option<Decimal>,
}

/// Fully-shaped order call as the gateway sends it. The price field is only
/// serialized onto the wire when `order_type` is Limit.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderTicket {
    pub category: String,
    pub symbol: String,
    pub side: Side,
    pub order_type: OrderType,
    pub qty: Decimal,
    pub price: Option<Decimal>,
    pub time_in_force: String,
    pub position_idx: u8,
}

/// Position query selector. The exchange is never asked to enumerate its
/// whole position book: either an exact symbol or a settlement-coin filter
/// is always sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PositionFilter {
    Symbol(String),
    SettleCoin(String),
}

impl Default for PositionFilter {
    fn default() -> Self {
        PositionFilter::SettleCoin("USDT".to_string())
    }
}
