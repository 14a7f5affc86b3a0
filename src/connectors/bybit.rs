// src/connectors/bybit.rs
use crate::connectors::envelope::{
    ApiEnvelope, ListResult, RawAccount, RawKlineResult, RawOrder, RawOrderId, RawPosition,
    RawServerTime, RawTicker,
};
use crate::connectors::traits::ExchangeGateway;
use crate::error::{EmptyKind, GatewayError};
use crate::types::{
    Balance, Bar, BarSeries, OpenOrder, OrderTicket, OrderType, Position, PositionFilter,
    PriceData,
};
use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::de::DeserializeOwned;
use sha2::Sha256;
use tracing::{debug, info};

type HmacSha256 = Hmac<Sha256>;

const RECV_WINDOW: &str = "5000";

/// Authenticated Bybit v5 client. Read-only after construction, so one
/// instance is shared by all in-flight requests without synchronization.
pub struct BybitClient {
    api_key: String,
    api_secret: String,
    http: Client,
    base_url: String,
}

impl BybitClient {
    pub fn new(api_key: String, api_secret: String, base_url: String) -> Result<Self> {
        if api_key.is_empty() || api_secret.is_empty() {
            bail!("API credentials not configured. Please check your .env file.");
        }
        Ok(Self {
            api_key,
            api_secret,
            http: Client::new(),
            base_url,
        })
    }

    /// Bybit v5 signature: HMAC-SHA256 over timestamp + key + recvWindow +
    /// payload (query string for GET, JSON body for POST), hex encoded.
    fn sign(&self, timestamp: &str, payload: &str) -> Result<String, GatewayError> {
        let mut mac = HmacSha256::new_from_slice(self.api_secret.as_bytes())
            .map_err(|_| GatewayError::Validation("invalid API secret length".to_string()))?;
        mac.update(timestamp.as_bytes());
        mac.update(self.api_key.as_bytes());
        mac.update(RECV_WINDOW.as_bytes());
        mac.update(payload.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    fn encode_query(params: &[(&str, String)]) -> Result<String, GatewayError> {
        serde_urlencoded::to_string(params)
            .map_err(|e| GatewayError::Transport(format!("query encoding failed: {e}")))
    }

    /// Public (unauthenticated) GET against a market endpoint.
    async fn get_public<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<ApiEnvelope<T>, GatewayError> {
        let query = Self::encode_query(params)?;
        let url = format!("{}{}?{}", self.base_url, path, query);
        let envelope = self.http.get(&url).send().await?.json().await?;
        Ok(envelope)
    }

    /// Signed GET against a private endpoint.
    async fn get_signed<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<ApiEnvelope<T>, GatewayError> {
        let query = Self::encode_query(params)?;
        let timestamp = Utc::now().timestamp_millis().to_string();
        let signature = self.sign(&timestamp, &query)?;
        let url = format!("{}{}?{}", self.base_url, path, query);

        let envelope = self
            .http
            .get(&url)
            .header("X-BAPI-API-KEY", &self.api_key)
            .header("X-BAPI-TIMESTAMP", &timestamp)
            .header("X-BAPI-RECV-WINDOW", RECV_WINDOW)
            .header("X-BAPI-SIGN", signature)
            .send()
            .await?
            .json()
            .await?;
        Ok(envelope)
    }

    /// Signed POST with a JSON body. The body is serialized once so the
    /// signature covers the exact bytes sent.
    async fn post_signed<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<ApiEnvelope<T>, GatewayError> {
        let payload = body.to_string();
        let timestamp = Utc::now().timestamp_millis().to_string();
        let signature = self.sign(&timestamp, &payload)?;
        let url = format!("{}{}", self.base_url, path);

        let envelope = self
            .http
            .post(&url)
            .header("X-BAPI-API-KEY", &self.api_key)
            .header("X-BAPI-TIMESTAMP", &timestamp)
            .header("X-BAPI-RECV-WINDOW", RECV_WINDOW)
            .header("X-BAPI-SIGN", signature)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await?
            .json()
            .await?;
        Ok(envelope)
    }

    /// Collapse the envelope: retCode 0 yields the payload, anything else
    /// becomes an `Exchange` error carrying code and message verbatim.
    fn unwrap_envelope<T>(envelope: ApiEnvelope<T>) -> Result<T, GatewayError> {
        if envelope.ret_code != 0 {
            return Err(GatewayError::Exchange {
                code: envelope.ret_code,
                message: envelope.ret_msg,
            });
        }
        envelope
            .result
            .ok_or_else(|| GatewayError::Transport("response missing result payload".to_string()))
    }

    fn parse_kline_row(row: &[String]) -> Result<Bar, GatewayError> {
        if row.len() < 6 {
            return Err(GatewayError::Transport(format!(
                "kline row has {} fields, expected at least 6",
                row.len()
            )));
        }
        let field = |i: usize| -> Result<f64, GatewayError> {
            row[i]
                .parse::<f64>()
                .map_err(|e| GatewayError::Transport(format!("unparsable kline field: {e}")))
        };
        Ok(Bar {
            timestamp: row[0]
                .parse::<i64>()
                .map_err(|e| GatewayError::Transport(format!("unparsable kline timestamp: {e}")))?,
            open: field(1)?,
            high: field(2)?,
            low: field(3)?,
            close: field(4)?,
            volume: field(5)?,
        })
    }

    /// Wire shape of an order create call. Price goes on the wire only for
    /// Limit orders; a Market ticket never carries one regardless of what
    /// the caller put in the price slot.
    fn order_payload(ticket: &OrderTicket) -> serde_json::Value {
        let mut body = serde_json::json!({
            "category": ticket.category,
            "symbol": ticket.symbol,
            "side": ticket.side.as_str(),
            "orderType": ticket.order_type.as_str(),
            "qty": ticket.qty.to_string(),
            "timeInForce": ticket.time_in_force,
            "positionIdx": ticket.position_idx,
        });
        if ticket.order_type == OrderType::Limit {
            if let Some(price) = ticket.price {
                body["price"] = serde_json::Value::String(price.to_string());
            }
        }
        body
    }
}

#[async_trait]
impl ExchangeGateway for BybitClient {
    async fn server_time(&self) -> Result<i64, GatewayError> {
        let envelope: ApiEnvelope<RawServerTime> =
            self.get_public("/v5/market/time", &[]).await?;
        let result = Self::unwrap_envelope(envelope)?;
        let seconds = result
            .time_second
            .parse::<i64>()
            .map_err(|e| GatewayError::Transport(format!("unparsable server time: {e}")))?;
        Ok(seconds * 1000)
    }

    async fn account_info(&self) -> Result<serde_json::Value, GatewayError> {
        let envelope: ApiEnvelope<serde_json::Value> =
            self.get_signed("/v5/account/info", &[]).await?;
        Self::unwrap_envelope(envelope)
    }

    async fn wallet_balance(
        &self,
        account_type: &str,
        coin: Option<&str>,
    ) -> Result<Vec<Balance>, GatewayError> {
        let mut params = vec![("accountType", account_type.to_string())];
        if let Some(coin) = coin {
            params.push(("coin", coin.to_string()));
        }
        let envelope: ApiEnvelope<ListResult<RawAccount>> = self
            .get_signed("/v5/account/wallet-balance", &params)
            .await?;
        let result = Self::unwrap_envelope(envelope)?;

        if result.list.is_empty() {
            return Err(GatewayError::EmptyResult(EmptyKind::NoAccounts));
        }

        let mut balances = Vec::new();
        for account in &result.list {
            debug!(account_type = %account.account_type, coins = account.coin.len(), "wallet account");
            for coin in &account.coin {
                balances.push(Balance {
                    coin: coin.coin.clone(),
                    wallet_balance: coin.wallet_balance,
                    available_balance: coin.available_to_withdraw,
                    equity: coin.equity,
                });
            }
        }
        if balances.is_empty() {
            return Err(GatewayError::EmptyResult(EmptyKind::NoCoins));
        }
        Ok(balances)
    }

    async fn positions(
        &self,
        category: &str,
        filter: &PositionFilter,
    ) -> Result<Vec<Position>, GatewayError> {
        let mut params = vec![("category", category.to_string())];
        match filter {
            PositionFilter::Symbol(symbol) => params.push(("symbol", symbol.clone())),
            PositionFilter::SettleCoin(coin) => params.push(("settleCoin", coin.clone())),
        }
        let envelope: ApiEnvelope<ListResult<RawPosition>> =
            self.get_signed("/v5/position/list", &params).await?;
        let result = Self::unwrap_envelope(envelope)?;

        let positions: Vec<Position> = result
            .list
            .into_iter()
            .filter(|p| p.size > rust_decimal::Decimal::ZERO)
            .map(|p| Position {
                symbol: p.symbol,
                side: p.side,
                size: p.size,
                entry_price: p.avg_price,
                mark_price: p.mark_price,
                unrealised_pnl: p.unrealised_pnl,
                leverage: p.leverage,
            })
            .collect();

        if positions.is_empty() {
            return Err(GatewayError::EmptyResult(EmptyKind::NoPositions));
        }
        Ok(positions)
    }

    async fn ticker(&self, category: &str, symbol: &str) -> Result<PriceData, GatewayError> {
        let params = vec![
            ("category", category.to_string()),
            ("symbol", symbol.to_string()),
        ];
        let envelope: ApiEnvelope<ListResult<RawTicker>> =
            self.get_public("/v5/market/tickers", &params).await?;
        let timestamp = envelope.time.unwrap_or_default();
        let result = Self::unwrap_envelope(envelope)?;

        let ticker = result
            .list
            .into_iter()
            .next()
            .ok_or_else(|| GatewayError::NotFound(format!("symbol {symbol} not found")))?;
        Ok(PriceData {
            symbol: ticker.symbol,
            price: ticker.last_price,
            timestamp,
        })
    }

    async fn klines(
        &self,
        category: &str,
        symbol: &str,
        interval: &str,
        limit: u32,
    ) -> Result<BarSeries, GatewayError> {
        let params = vec![
            ("category", category.to_string()),
            ("symbol", symbol.to_string()),
            ("interval", interval.to_string()),
            ("limit", limit.to_string()),
        ];
        let envelope: ApiEnvelope<RawKlineResult> =
            self.get_public("/v5/market/kline", &params).await?;
        let result = Self::unwrap_envelope(envelope)?;

        let mut bars = result
            .list
            .iter()
            .map(|row| Self::parse_kline_row(row))
            .collect::<Result<Vec<_>, _>>()?;
        // The exchange sends newest-first; every caller gets ascending time.
        bars.reverse();

        Ok(BarSeries {
            symbol: symbol.to_string(),
            interval: interval.to_string(),
            bars,
        })
    }

    async fn place_order(&self, ticket: &OrderTicket) -> Result<String, GatewayError> {
        let body = Self::order_payload(ticket);
        info!(
            symbol = %ticket.symbol,
            side = ticket.side.as_str(),
            order_type = ticket.order_type.as_str(),
            qty = %ticket.qty,
            "🚀 sending order"
        );
        let envelope: ApiEnvelope<RawOrderId> = self.post_signed("/v5/order/create", &body).await?;
        let result = Self::unwrap_envelope(envelope)?;
        Ok(result.order_id)
    }

    async fn open_orders(
        &self,
        category: &str,
        symbol: Option<&str>,
    ) -> Result<Vec<OpenOrder>, GatewayError> {
        let mut params = vec![("category", category.to_string())];
        match symbol {
            Some(symbol) => params.push(("symbol", symbol.to_string())),
            // v5 requires some scope; fall back to the default settle coin.
            None => params.push(("settleCoin", "USDT".to_string())),
        }
        let envelope: ApiEnvelope<ListResult<RawOrder>> =
            self.get_signed("/v5/order/realtime", &params).await?;
        let result = Self::unwrap_envelope(envelope)?;

        Ok(result
            .list
            .into_iter()
            .map(|o| OpenOrder {
                order_id: o.order_id,
                symbol: o.symbol,
                side: o.side,
                order_type: o.order_type,
                qty: o.qty,
                price: o.price,
                status: o.order_status,
                created_time: o.created_time,
            })
            .collect())
    }

    async fn cancel_order(
        &self,
        category: &str,
        symbol: &str,
        order_id: &str,
    ) -> Result<String, GatewayError> {
        let body = serde_json::json!({
            "category": category,
            "symbol": symbol,
            "orderId": order_id,
        });
        let envelope: ApiEnvelope<RawOrderId> = self.post_signed("/v5/order/cancel", &body).await?;
        let result = Self::unwrap_envelope(envelope)?;
        Ok(result.order_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn ticket(order_type: OrderType, price: Option<&str>) -> OrderTicket {
        OrderTicket {
            category: "linear".to_string(),
            symbol: "BTCUSDT".to_string(),
            side: crate::types::Side::Buy,
            order_type,
            qty: Decimal::from_str("0.01").unwrap(),
            price: price.map(|p| Decimal::from_str(p).unwrap()),
            time_in_force: "GTC".to_string(),
            position_idx: 0,
        }
    }

    #[test]
    fn market_order_payload_never_carries_price() {
        // Even if a price slipped into the ticket, Market must not send it.
        let body = BybitClient::order_payload(&ticket(OrderType::Market, Some("150.0")));
        assert!(body.get("price").is_none());
        assert_eq!(body["orderType"], "Market");
        assert_eq!(body["qty"], "0.01");
    }

    #[test]
    fn limit_order_payload_carries_string_price() {
        let body = BybitClient::order_payload(&ticket(OrderType::Limit, Some("42000.5")));
        assert_eq!(body["price"], "42000.5");
        assert_eq!(body["timeInForce"], "GTC");
    }

    #[test]
    fn limit_order_without_price_omits_the_field() {
        // The orchestrator rejects this shape before it gets here, but the
        // gateway still must not invent a price.
        let body = BybitClient::order_payload(&ticket(OrderType::Limit, None));
        assert!(body.get("price").is_none());
    }

    #[test]
    fn envelope_failure_is_surfaced_verbatim() {
        let envelope = ApiEnvelope::<ListResult<RawTicker>> {
            ret_code: 10001,
            ret_msg: "symbol invalid".to_string(),
            result: None,
            time: None,
        };
        match BybitClient::unwrap_envelope(envelope) {
            Err(GatewayError::Exchange { code, message }) => {
                assert_eq!(code, 10001);
                assert_eq!(message, "symbol invalid");
            }
            other => panic!("expected Exchange error, got {other:?}"),
        }
    }

    #[test]
    fn missing_credentials_are_rejected_at_construction() {
        assert!(BybitClient::new(String::new(), "s".into(), "http://x".into()).is_err());
        assert!(BybitClient::new("k".into(), String::new(), "http://x".into()).is_err());
    }

    #[test]
    fn kline_row_parses_positionally() {
        let row: Vec<String> = ["1700000000000", "98", "99", "97", "98.5", "11", "0"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let bar = BybitClient::parse_kline_row(&row).unwrap();
        assert_eq!(bar.timestamp, 1_700_000_000_000);
        assert_eq!(bar.close, 98.5);
        assert_eq!(bar.volume, 11.0);
    }

    #[test]
    fn short_kline_row_is_a_transport_error() {
        let row: Vec<String> = ["1700000000000", "98"].iter().map(|s| s.to_string()).collect();
        assert!(matches!(
            BybitClient::parse_kline_row(&row),
            Err(GatewayError::Transport(_))
        ));
    }
}
