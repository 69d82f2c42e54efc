use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single OHLCV bar fetched from the exchange.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Candle {
    pub open_time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Fixed-lookback window of bars for one symbol, oldest first.
/// Refreshed wholesale on every signal tick; evaluators treat it as
/// read-only input.
#[derive(Debug, Clone)]
pub struct MarketSeries {
    pub symbol: String,
    pub candles: Vec<Candle>,
}

impl MarketSeries {
    pub fn new(symbol: impl Into<String>, candles: Vec<Candle>) -> Self {
        Self {
            symbol: symbol.into(),
            candles,
        }
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.volume).collect()
    }

    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }
}

/// Side of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// The side that closes a position opened on `self`.
    pub fn opposite(self) -> Self {
        match self {
            OrderSide::Buy => OrderSide::Sell,
            OrderSide::Sell => OrderSide::Buy,
        }
    }
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "BUY"),
            OrderSide::Sell => write!(f, "SELL"),
        }
    }
}

/// An order to be submitted to the execution venue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub symbol: String,
    pub side: OrderSide,
    pub quantity: f64,
    /// `None` = market order; `Some(price)` = limit order.
    pub price: Option<f64>,
}

impl Order {
    pub fn market(symbol: impl Into<String>, side: OrderSide, quantity: f64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            symbol: symbol.into(),
            side,
            quantity,
            price: None,
        }
    }
}

/// Confirmation of a filled order returned by the venue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fill {
    pub order_id: String,
    pub symbol: String,
    pub side: OrderSide,
    pub fill_price: f64,
    pub quantity: f64,
    pub timestamp: DateTime<Utc>,
}

/// Aggregated outcome of one evaluator round for one symbol.
/// Created fresh each tick from the vote tally; never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub symbol: String,
    pub direction: Option<OrderSide>,
    pub buy_votes: usize,
    pub sell_votes: usize,
    /// Scales position size and hold timeout. 1.0 for the minimum
    /// two-vote quorum, higher for broader agreement.
    pub confidence: f64,
}

/// An open position, keyed by symbol. At most one per symbol at any time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub side: OrderSide,
    pub entry_price: f64,
    pub quantity: f64,
    pub opened_at: DateTime<Utc>,
    /// Maximum hold time, fixed at open from recent volatility.
    pub timeout_minutes: i64,
}

/// Resolution state of a trade record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeResult {
    Pending,
    Win,
    Loss,
}

/// One trade, created pending at open time and resolved exactly once when
/// the matching position closes. Append-only after resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub symbol: String,
    #[serde(rename = "direction")]
    pub side: OrderSide,
    #[serde(rename = "amount")]
    pub notional: f64,
    pub entry_price: f64,
    #[serde(rename = "timestamp")]
    pub opened_at: DateTime<Utc>,
    pub result: TradeResult,
    pub profit: f64,
}

impl TradeRecord {
    pub fn pending(
        symbol: impl Into<String>,
        side: OrderSide,
        notional: f64,
        entry_price: f64,
        opened_at: DateTime<Utc>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            notional,
            entry_price,
            opened_at,
            result: TradeResult::Pending,
            profit: 0.0,
        }
    }
}

/// Order-placement filters reported by the venue for one symbol.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SymbolConstraints {
    /// Minimum quote-currency value of an order.
    pub min_notional: f64,
    /// Quantity granularity; 0.0 means unconstrained.
    pub quantity_step: f64,
}

/// Whether the bot trades against the real exchange or a simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradingMode {
    Live,
    Paper,
}

impl std::fmt::Display for TradingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradingMode::Live => write!(f, "live"),
            TradingMode::Paper => write!(f, "paper"),
        }
    }
}

/// Base asset of a symbol quoted in `quote`, e.g. ("BTCUSDT", "USDT") -> "BTC".
/// `None` when the symbol is not quoted in `quote`.
pub fn base_asset<'a>(symbol: &'a str, quote: &str) -> Option<&'a str> {
    symbol.strip_suffix(quote).filter(|base| !base.is_empty())
}
