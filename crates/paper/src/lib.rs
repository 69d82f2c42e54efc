use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use common::{
    Error, ExecutionVenue, Fill, Order, OrderSide, Result, SymbolConstraints,
};

/// Simulated execution venue for paper trading and tests.
///
/// Fills happen at the latest known price with configurable slippage and
/// move a simulated asset ledger; no real orders are ever sent. Prices
/// come from an optional upstream venue (live market data in paper mode)
/// or from `set_price` (tests).
pub struct PaperVenue {
    /// Free balance per asset. Seeded with the quote asset at start.
    balances: Arc<RwLock<HashMap<String, f64>>>,
    /// Latest known price per symbol, used when there is no upstream.
    prices: Arc<RwLock<HashMap<String, f64>>>,
    /// Live venue consulted for prices only.
    upstream: Option<Arc<dyn ExecutionVenue>>,
    /// Slippage in basis points applied to all fills.
    slippage_bps: f64,
    quote_asset: String,
}

impl PaperVenue {
    pub fn new(quote_asset: impl Into<String>, initial_balance: f64, slippage_bps: f64) -> Self {
        let quote_asset = quote_asset.into();
        info!(
            balance = initial_balance,
            slippage_bps, quote = %quote_asset,
            "PaperVenue initialized"
        );
        let mut balances = HashMap::new();
        balances.insert(quote_asset.clone(), initial_balance);
        Self {
            balances: Arc::new(RwLock::new(balances)),
            prices: Arc::new(RwLock::new(HashMap::new())),
            upstream: None,
            slippage_bps,
            quote_asset,
        }
    }

    /// Delegate price lookups to a live venue (public endpoints).
    pub fn with_price_source(mut self, upstream: Arc<dyn ExecutionVenue>) -> Self {
        self.upstream = Some(upstream);
        self
    }

    /// Set the simulated price for a symbol.
    pub async fn set_price(&self, symbol: &str, price: f64) {
        self.prices.write().await.insert(symbol.to_string(), price);
    }

    /// Credit an asset in the simulated ledger.
    pub async fn seed_balance(&self, asset: &str, amount: f64) {
        *self.balances.write().await.entry(asset.to_string()).or_insert(0.0) += amount;
    }

    fn base_asset<'a>(&self, symbol: &'a str) -> &'a str {
        common::base_asset(symbol, &self.quote_asset).unwrap_or(symbol)
    }
}

#[async_trait]
impl ExecutionVenue for PaperVenue {
    async fn current_price(&self, symbol: &str) -> Result<f64> {
        if let Some(upstream) = &self.upstream {
            return upstream.current_price(symbol).await;
        }
        self.prices
            .read()
            .await
            .get(symbol)
            .copied()
            .ok_or_else(|| Error::permanent(format!("no simulated price for {symbol}")))
    }

    async fn submit_order(&self, order: &Order) -> Result<Fill> {
        let mid_price = self.current_price(&order.symbol).await?;

        // Buys pay more, sells receive less
        let fill_price = match order.side {
            OrderSide::Buy => mid_price * (1.0 + self.slippage_bps / 10_000.0),
            OrderSide::Sell => mid_price * (1.0 - self.slippage_bps / 10_000.0),
        };

        debug!(
            symbol = %order.symbol,
            side = ?order.side,
            mid = mid_price,
            fill = fill_price,
            qty = order.quantity,
            "Paper fill simulated"
        );

        let notional = fill_price * order.quantity;
        let base = self.base_asset(&order.symbol).to_string();
        {
            let mut balances = self.balances.write().await;
            match order.side {
                OrderSide::Buy => {
                    *balances.entry(self.quote_asset.clone()).or_insert(0.0) -= notional;
                    *balances.entry(base).or_insert(0.0) += order.quantity;
                }
                OrderSide::Sell => {
                    *balances.entry(base).or_insert(0.0) -= order.quantity;
                    *balances.entry(self.quote_asset.clone()).or_insert(0.0) += notional;
                }
            }
        }

        Ok(Fill {
            order_id: order.id.clone(),
            symbol: order.symbol.clone(),
            side: order.side,
            fill_price,
            quantity: order.quantity,
            timestamp: Utc::now(),
        })
    }

    async fn free_balance(&self, asset: &str) -> Result<f64> {
        Ok(self.balances.read().await.get(asset).copied().unwrap_or(0.0))
    }

    async fn symbol_constraints(&self, _symbol: &str) -> Result<SymbolConstraints> {
        // Permissive simulation defaults
        Ok(SymbolConstraints {
            min_notional: 5.0,
            quantity_step: 0.0,
        })
    }
}
