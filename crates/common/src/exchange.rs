use async_trait::async_trait;

use crate::{Fill, MarketSeries, Order, Result, SymbolConstraints};

/// Source of historical bars for signal evaluation.
///
/// Must return strictly time-ordered bars, oldest first. A short or empty
/// result is a valid "skip this symbol this tick" outcome — the caller
/// decides, the source never pads.
#[async_trait]
pub trait MarketData: Send + Sync {
    async fn fetch_series(&self, symbol: &str, interval: &str, lookback: usize)
        -> Result<MarketSeries>;
}

/// Abstraction over order execution and account state.
///
/// `BinanceClient` implements this for live trading, `PaperVenue` for
/// simulation. Only the position lifecycle manager submits orders; all
/// order flow passes the sizer and the loss-streak breaker first.
#[async_trait]
pub trait ExecutionVenue: Send + Sync {
    /// Latest traded price for a symbol.
    async fn current_price(&self, symbol: &str) -> Result<f64>;

    /// Submit an order and return the fill confirmation.
    async fn submit_order(&self, order: &Order) -> Result<Fill>;

    /// Free (unlocked) balance of one asset.
    async fn free_balance(&self, asset: &str) -> Result<f64>;

    /// Order-placement filters for a symbol. A failure here must make the
    /// caller decline the trade, never assume a default.
    async fn symbol_constraints(&self, symbol: &str) -> Result<SymbolConstraints>;
}
