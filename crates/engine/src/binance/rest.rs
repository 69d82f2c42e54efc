use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use hmac::{Hmac, Mac};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use sha2::Sha256;
use tracing::debug;

use common::{
    Candle, Error, ExecutionVenue, Fill, MarketData, MarketSeries, Order, Result,
    SymbolConstraints,
};

const BASE_URL: &str = "https://api.binance.com";

/// REST API client for Binance: market data, order placement, account
/// queries. Public endpoints are unsigned, so a paper-mode instance works
/// with empty credentials.
pub struct BinanceClient {
    api_key: String,
    secret: String,
    http: Client,
}

impl BinanceClient {
    pub fn new(api_key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            secret: secret.into(),
            http: Client::builder()
                .use_rustls_tls()
                .build()
                .expect("Failed to build HTTP client"),
        }
    }

    fn timestamp_ms() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock before epoch")
            .as_millis() as u64
    }

    fn sign(&self, query: &str) -> String {
        type HmacSha256 = Hmac<Sha256>;
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(query.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Map an HTTP status to the retry classification the core acts on.
    fn classify_status(status: StatusCode, body: &str) -> Error {
        let message = format!("HTTP {status}: {body}");
        if status.is_server_error()
            || status == StatusCode::TOO_MANY_REQUESTS
            || status == StatusCode::IM_A_TEAPOT
        {
            // 418 is Binance's auto-ban response to hammering after a 429
            Error::transient(message)
        } else {
            Error::permanent(message)
        }
    }

    fn transport_error(e: reqwest::Error) -> Error {
        // Connectivity and timeouts are worth retrying next tick
        Error::transient(e.to_string())
    }

    async fn public_get(&self, path: &str, query: &str) -> Result<String> {
        let url = if query.is_empty() {
            format!("{BASE_URL}{path}")
        } else {
            format!("{BASE_URL}{path}?{query}")
        };
        let resp = self.http.get(&url).send().await.map_err(Self::transport_error)?;

        let status = resp.status();
        let body = resp.text().await.map_err(Self::transport_error)?;
        if !status.is_success() {
            return Err(Self::classify_status(status, &body));
        }
        Ok(body)
    }

    async fn signed_get(&self, path: &str, params: &str) -> Result<String> {
        let ts = Self::timestamp_ms();
        let query = if params.is_empty() {
            format!("timestamp={ts}")
        } else {
            format!("{params}&timestamp={ts}")
        };
        let signature = self.sign(&query);
        let url = format!("{BASE_URL}{path}?{query}&signature={signature}");

        let resp = self
            .http
            .get(&url)
            .header("X-MBX-APIKEY", &self.api_key)
            .send()
            .await
            .map_err(Self::transport_error)?;

        let status = resp.status();
        let body = resp.text().await.map_err(Self::transport_error)?;
        if !status.is_success() {
            return Err(Self::classify_status(status, &body));
        }
        Ok(body)
    }

    async fn signed_post(&self, path: &str, params: &str) -> Result<String> {
        let ts = Self::timestamp_ms();
        let query = format!("{params}&timestamp={ts}");
        let signature = self.sign(&query);
        let body = format!("{query}&signature={signature}");
        let url = format!("{BASE_URL}{path}");

        let resp = self
            .http
            .post(&url)
            .header("X-MBX-APIKEY", &self.api_key)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await
            .map_err(Self::transport_error)?;

        let status = resp.status();
        let text = resp.text().await.map_err(Self::transport_error)?;
        if !status.is_success() {
            return Err(Self::classify_status(status, &text));
        }
        Ok(text)
    }
}

#[async_trait]
impl MarketData for BinanceClient {
    async fn fetch_series(
        &self,
        symbol: &str,
        interval: &str,
        lookback: usize,
    ) -> Result<MarketSeries> {
        let query = format!("symbol={symbol}&interval={interval}&limit={lookback}");
        let body = self.public_get("/api/v3/klines", &query).await?;

        // Klines arrive as arrays: [open_time, open, high, low, close,
        // volume, close_time, ...] with numbers encoded as strings.
        let raw: Vec<serde_json::Value> = serde_json::from_str(&body)?;
        let candles: Vec<Candle> = raw
            .iter()
            .filter_map(|row| {
                let row = row.as_array()?;
                if row.len() < 6 {
                    return None;
                }
                let open_time = ts_ms_to_utc(row[0].as_i64()?);
                Some(Candle {
                    open_time,
                    open: row[1].as_str()?.parse().ok()?,
                    high: row[2].as_str()?.parse().ok()?,
                    low: row[3].as_str()?.parse().ok()?,
                    close: row[4].as_str()?.parse().ok()?,
                    volume: row[5].as_str()?.parse().ok()?,
                })
            })
            .collect();

        debug!(symbol, bars = candles.len(), "Fetched kline series");
        Ok(MarketSeries::new(symbol, candles))
    }
}

#[async_trait]
impl ExecutionVenue for BinanceClient {
    async fn current_price(&self, symbol: &str) -> Result<f64> {
        let body = self
            .public_get("/api/v3/ticker/price", &format!("symbol={symbol}"))
            .await?;
        let ticker: PriceTicker = serde_json::from_str(&body)?;
        ticker
            .price
            .parse::<f64>()
            .map_err(|e| Error::permanent(format!("unparseable price: {e}")))
    }

    async fn submit_order(&self, order: &Order) -> Result<Fill> {
        let side = order.side.to_string();
        let order_type = if order.price.is_some() { "LIMIT" } else { "MARKET" };

        let mut params = format!(
            "symbol={}&side={}&type={}&quantity={}&newClientOrderId={}",
            order.symbol, side, order_type, order.quantity, order.id
        );
        if let Some(price) = order.price {
            params.push_str(&format!("&price={price}&timeInForce=GTC"));
        }

        debug!(symbol = %order.symbol, side = %side, "Submitting order to Binance");
        let body = self.signed_post("/api/v3/order", &params).await?;

        let resp: OrderResponse = serde_json::from_str(&body)?;

        let fill_price = resp
            .fills
            .first()
            .and_then(|f| f.price.parse::<f64>().ok())
            .unwrap_or_else(|| order.price.unwrap_or(0.0));

        Ok(Fill {
            order_id: resp.client_order_id,
            symbol: order.symbol.clone(),
            side: order.side,
            fill_price,
            quantity: order.quantity,
            timestamp: Utc::now(),
        })
    }

    async fn free_balance(&self, asset: &str) -> Result<f64> {
        let body = self.signed_get("/api/v3/account", "").await?;
        let account: AccountResponse = serde_json::from_str(&body)?;

        Ok(account
            .balances
            .iter()
            .find(|b| b.asset == asset)
            .and_then(|b| b.free.parse::<f64>().ok())
            .unwrap_or(0.0))
    }

    async fn symbol_constraints(&self, symbol: &str) -> Result<SymbolConstraints> {
        let body = self
            .public_get("/api/v3/exchangeInfo", &format!("symbol={symbol}"))
            .await?;
        let info: ExchangeInfoResponse = serde_json::from_str(&body)?;

        let filters = info
            .symbols
            .first()
            .map(|s| s.filters.as_slice())
            .unwrap_or_default();

        let mut min_notional = None;
        let mut quantity_step = 0.0;
        for filter in filters {
            let kind = filter.get("filterType").and_then(|v| v.as_str());
            match kind {
                // Spot moved from MIN_NOTIONAL to NOTIONAL; accept both
                Some("MIN_NOTIONAL") | Some("NOTIONAL") => {
                    min_notional = filter
                        .get("minNotional")
                        .and_then(|v| v.as_str())
                        .and_then(|v| v.parse::<f64>().ok());
                }
                Some("LOT_SIZE") => {
                    quantity_step = filter
                        .get("stepSize")
                        .and_then(|v| v.as_str())
                        .and_then(|v| v.parse::<f64>().ok())
                        .unwrap_or(0.0);
                }
                _ => {}
            }
        }

        let min_notional = min_notional.ok_or_else(|| {
            Error::permanent(format!("no notional filter reported for {symbol}"))
        })?;

        Ok(SymbolConstraints {
            min_notional,
            quantity_step,
        })
    }
}

fn ts_ms_to_utc(ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms).single().unwrap_or_else(Utc::now)
}

// ─── Response types ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderResponse {
    client_order_id: String,
    #[serde(default)]
    fills: Vec<FillDetail>,
}

#[derive(Deserialize)]
struct FillDetail {
    price: String,
}

#[derive(Deserialize)]
struct AccountResponse {
    balances: Vec<Balance>,
}

#[derive(Deserialize)]
struct Balance {
    asset: String,
    free: String,
}

#[derive(Deserialize)]
struct PriceTicker {
    price: String,
}

#[derive(Deserialize)]
struct ExchangeInfoResponse {
    symbols: Vec<SymbolInfo>,
}

#[derive(Deserialize)]
struct SymbolInfo {
    #[serde(default)]
    filters: Vec<serde_json::Value>,
}
