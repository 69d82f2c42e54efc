use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

use common::{
    Decision, Error, ExecutionVenue, MarketData, MarketSeries, Notifier, Order, OrderSide,
    Position, Result, TradeRecord, TradeResult,
};
use journal::TradeJournal;
use risk::{LossStreakBreaker, ParameterAdapter, PositionSizer};
use strategy::StrategyParams;

/// Mean (high−low)/close above which a market counts as fast.
const VOL_FAST_MARKET: f64 = 0.03;
/// Above this it counts as active; below, as quiet.
const VOL_ACTIVE_MARKET: f64 = 0.015;

const HOLD_SHORT_MINUTES: i64 = 30;
const HOLD_MEDIUM_MINUTES: i64 = 60;
const HOLD_LONG_MINUTES: i64 = 120;

/// User-configurable engine parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Kline interval fetched each signal tick.
    pub interval: String,
    /// Bars per fetched series.
    pub lookback: usize,
    /// Seconds between signal ticks.
    pub signal_period_secs: u64,
    /// Seconds between exit-evaluation ticks.
    pub monitor_period_secs: u64,
    /// Seconds between statistics reports.
    pub report_period_secs: u64,
    /// Close at or above this profit-direction change percent.
    pub profit_target_pct: f64,
    /// Close at or below minus this change percent.
    pub stop_loss_pct: f64,
    /// Ceiling on any position's hold timeout.
    pub max_timeout_minutes: i64,
    /// Trailing bars used for the volatility estimate at open.
    pub volatility_window: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            interval: "5m".to_string(),
            lookback: 100,
            signal_period_secs: 300,
            monitor_period_secs: 60,
            report_period_secs: 3 * 60 * 60,
            profit_target_pct: 1.5,
            stop_loss_pct: 1.0,
            max_timeout_minutes: 240,
            volatility_window: 20,
        }
    }
}

/// Open positions plus the symbol-keyed index of their pending trade
/// records. One lock guards both so enumeration, open and close stay
/// consistent with the one-pending-record-per-open-position invariant.
#[derive(Default)]
pub struct PositionBook {
    positions: HashMap<String, Position>,
    pending: HashMap<String, TradeRecord>,
}

impl PositionBook {
    pub fn contains(&self, symbol: &str) -> bool {
        self.positions.contains_key(symbol)
    }

    pub fn get(&self, symbol: &str) -> Option<&Position> {
        self.positions.get(symbol)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn has_pending(&self, symbol: &str) -> bool {
        self.pending.contains_key(symbol)
    }

    pub fn snapshot(&self) -> Vec<Position> {
        self.positions.values().cloned().collect()
    }

    /// Insert a position with its pending record. Rejects a second
    /// position for the same symbol.
    pub fn open(&mut self, position: Position, record: TradeRecord) -> Result<()> {
        if self.positions.contains_key(&position.symbol) {
            return Err(Error::Invariant(format!(
                "position already open for {}",
                position.symbol
            )));
        }
        self.pending.insert(position.symbol.clone(), record);
        self.positions.insert(position.symbol.clone(), position);
        Ok(())
    }

    /// Remove a position together with its pending record.
    ///
    /// A position without a pending record is a broken invariant: the
    /// position is left in place (capital must not be orphaned) and the
    /// error surfaced to the caller.
    pub fn close(&mut self, symbol: &str) -> Result<(Position, TradeRecord)> {
        let position = self
            .positions
            .remove(symbol)
            .ok_or_else(|| Error::Invariant(format!("no open position for {symbol}")))?;
        match self.pending.remove(symbol) {
            Some(record) => Ok((position, record)),
            None => {
                self.positions.insert(symbol.to_string(), position);
                Err(Error::Invariant(format!(
                    "no pending trade record for {symbol}"
                )))
            }
        }
    }
}

/// Everything the engine talks to, injected at startup.
pub struct EngineDeps {
    pub market: Arc<dyn MarketData>,
    pub venue: Arc<dyn ExecutionVenue>,
    pub notifier: Arc<dyn Notifier>,
    pub sizer: PositionSizer,
    pub breaker: LossStreakBreaker,
    pub adapter: ParameterAdapter,
    pub params: StrategyParams,
    pub journal: TradeJournal,
}

/// The decision-and-position-lifecycle core.
///
/// Two periodic activities drive it concurrently: the signal tick
/// (evaluate → aggregate → maybe open) and the monitor tick (exit
/// evaluation over every open position). All shared state lives behind
/// its own lock; no lock is ever held across a venue call.
pub struct TradeEngine {
    config: EngineConfig,
    symbols: Vec<String>,
    quote_asset: String,
    market: Arc<dyn MarketData>,
    venue: Arc<dyn ExecutionVenue>,
    notifier: Arc<dyn Notifier>,
    sizer: PositionSizer,
    adapter: ParameterAdapter,
    breaker: Mutex<LossStreakBreaker>,
    params: RwLock<StrategyParams>,
    journal: Mutex<TradeJournal>,
    book: Mutex<PositionBook>,
    equity: RwLock<f64>,
}

impl TradeEngine {
    pub fn new(
        config: EngineConfig,
        symbols: Vec<String>,
        quote_asset: impl Into<String>,
        initial_equity: f64,
        deps: EngineDeps,
    ) -> Self {
        Self {
            config,
            symbols,
            quote_asset: quote_asset.into(),
            market: deps.market,
            venue: deps.venue,
            notifier: deps.notifier,
            sizer: deps.sizer,
            adapter: deps.adapter,
            breaker: Mutex::new(deps.breaker),
            params: RwLock::new(deps.params),
            journal: Mutex::new(deps.journal),
            book: Mutex::new(PositionBook::default()),
            equity: RwLock::new(initial_equity),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub async fn equity(&self) -> f64 {
        *self.equity.read().await
    }

    pub async fn open_positions(&self) -> Vec<Position> {
        self.book.lock().await.snapshot()
    }

    /// One signal tick: fetch a fresh series per symbol, evaluate, and
    /// open where an unopposed quorum emerges. A failure on one symbol
    /// never poisons the rest of the tick.
    pub async fn signal_tick(&self) {
        for symbol in &self.symbols {
            let series = match self
                .market
                .fetch_series(symbol, &self.config.interval, self.config.lookback)
                .await
            {
                Ok(series) => series,
                Err(e) => {
                    warn!(symbol = %symbol, error = %e, "Market data fetch failed — skipping symbol this tick");
                    continue;
                }
            };
            if series.is_empty() {
                debug!(symbol = %symbol, "Empty series — skipping symbol this tick");
                continue;
            }

            let params = self.params.read().await.clone();
            let votes = strategy::evaluate_all(&series, &params);
            let decision = strategy::aggregate(symbol, &votes);
            debug!(
                symbol = %symbol,
                buy_votes = decision.buy_votes,
                sell_votes = decision.sell_votes,
                direction = ?decision.direction,
                "Evaluator round complete"
            );

            if decision.direction.is_none() {
                continue;
            }
            match self.open_from_decision(&decision, &series).await {
                Ok(_) => {}
                Err(e) if e.is_transient() => {
                    warn!(symbol = %symbol, error = %e, "Open deferred by venue — retrying next tick");
                }
                Err(e) => {
                    error!(symbol = %symbol, error = %e, "Failed to open position");
                    self.notifier
                        .send(&format!("🚨 Failed to open {symbol}: {e}"))
                        .await;
                }
            }
        }
    }

    /// Try to open a position from an adopted decision. `Ok(false)` is a
    /// decline (pause, duplicate, constraint, balance); `Err` is a venue
    /// failure worth reporting or retrying.
    pub async fn open_from_decision(
        &self,
        decision: &Decision,
        series: &MarketSeries,
    ) -> Result<bool> {
        let symbol = &decision.symbol;
        let side = match decision.direction {
            Some(side) => side,
            None => return Ok(false),
        };

        {
            let breaker = self.breaker.lock().await;
            if breaker.is_paused(Utc::now()) {
                debug!(symbol = %symbol, "Loss-streak pause active — not opening");
                return Ok(false);
            }
        }
        {
            let book = self.book.lock().await;
            if book.contains(symbol) {
                debug!(symbol = %symbol, "Position already open — not stacking");
                return Ok(false);
            }
        }

        let win_rate = {
            let journal = self.journal.lock().await;
            journal.win_rate(symbol, self.sizer.config().min_win_rate_samples)
        };
        let equity = *self.equity.read().await;
        let notional = self.sizer.notional(equity, win_rate, decision.confidence);
        if notional <= 0.0 {
            return Ok(false);
        }

        // Minimum-notional gate. A constraints lookup failure fails
        // closed: no default, no trade.
        let constraints = match self.venue.symbol_constraints(symbol).await {
            Ok(constraints) => constraints,
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "Constraints unavailable — declining trade");
                return Ok(false);
            }
        };
        if notional < constraints.min_notional {
            debug!(
                symbol = %symbol,
                notional,
                min_notional = constraints.min_notional,
                "Below minimum notional — declining trade"
            );
            return Ok(false);
        }

        let price = self.venue.current_price(symbol).await?;
        if price <= 0.0 {
            return Err(Error::permanent(format!("non-positive price for {symbol}")));
        }
        let mut quantity = notional / price;
        if constraints.quantity_step > 0.0 {
            quantity = (quantity / constraints.quantity_step).floor() * constraints.quantity_step;
        }
        if quantity <= 0.0 {
            return Ok(false);
        }

        // Balance gate: quote asset funds a buy, base asset funds a sell
        let (asset, required) = match side {
            OrderSide::Buy => (self.quote_asset.clone(), notional),
            OrderSide::Sell => match common::base_asset(symbol, &self.quote_asset) {
                Some(base) => (base.to_string(), quantity),
                None => {
                    debug!(symbol = %symbol, "Symbol not quoted in {} — declining", self.quote_asset);
                    return Ok(false);
                }
            },
        };
        let free = self.venue.free_balance(&asset).await?;
        if free < required {
            debug!(symbol = %symbol, asset = %asset, free, required, "Insufficient balance — declining trade");
            return Ok(false);
        }

        let order = Order::market(symbol.clone(), side, quantity);
        let fill = self.venue.submit_order(&order).await?;
        let entry_price = if fill.fill_price > 0.0 { fill.fill_price } else { price };

        let timeout_minutes = hold_timeout_minutes(
            series,
            self.config.volatility_window,
            decision.confidence,
            self.config.max_timeout_minutes,
        );
        let opened_at = Utc::now();
        let position = Position {
            symbol: symbol.clone(),
            side,
            entry_price,
            quantity: fill.quantity,
            opened_at,
            timeout_minutes,
        };
        let record = TradeRecord::pending(symbol.clone(), side, notional, entry_price, opened_at);

        {
            let mut book = self.book.lock().await;
            book.open(position, record)?;
        }

        info!(
            symbol = %symbol,
            side = %side,
            entry_price,
            quantity,
            notional,
            timeout_minutes,
            confidence = decision.confidence,
            "Position opened"
        );
        self.notifier
            .send(&format!(
                "📈 Opened {side} {symbol} @ {entry_price:.4} — notional {notional:.2}, timeout {timeout_minutes}m"
            ))
            .await;
        Ok(true)
    }

    /// One monitor tick: evaluate exit conditions for every open
    /// position. Transient venue trouble skips just that symbol; the
    /// pause window never blocks exits.
    pub async fn monitor_tick(&self) {
        let open_positions = { self.book.lock().await.snapshot() };
        for position in open_positions {
            match self.evaluate_exit(&position).await {
                Ok(()) => {}
                Err(e) if e.is_transient() => {
                    warn!(symbol = %position.symbol, error = %e, "Exit deferred by venue — retrying next tick");
                }
                Err(e @ Error::Invariant(_)) => {
                    error!(symbol = %position.symbol, error = %e, "Close aborted — position left open");
                    self.notifier
                        .send(&format!("🚨 {} close aborted: {e}", position.symbol))
                        .await;
                }
                Err(e) => {
                    warn!(symbol = %position.symbol, error = %e, "Exit evaluation failed");
                }
            }
        }
    }

    async fn evaluate_exit(&self, position: &Position) -> Result<()> {
        let current_price = self.venue.current_price(&position.symbol).await?;
        if position.entry_price <= 0.0 {
            return Err(Error::Invariant(format!(
                "position {} has a non-positive entry price",
                position.symbol
            )));
        }

        let change_pct = profit_change_pct(position.side, position.entry_price, current_price);
        let now = Utc::now();
        let elapsed_minutes = now.signed_duration_since(position.opened_at).num_minutes();

        let reason = if change_pct >= self.config.profit_target_pct {
            "target"
        } else if change_pct <= -self.config.stop_loss_pct {
            "stop"
        } else if elapsed_minutes >= position.timeout_minutes {
            "timeout"
        } else {
            return Ok(());
        };

        // Skip if the position changed under us since the snapshot, and
        // surface a broken invariant before touching the venue
        {
            let book = self.book.lock().await;
            match book.get(&position.symbol) {
                Some(open) if open == position => {}
                _ => return Ok(()),
            }
            if !book.has_pending(&position.symbol) {
                return Err(Error::Invariant(format!(
                    "no pending trade record for {}",
                    position.symbol
                )));
            }
        }

        // Offsetting order before any state change: a failure here must
        // leave position and record byte-for-byte intact so the next
        // tick retries cleanly.
        let close_order = Order::market(
            position.symbol.clone(),
            position.side.opposite(),
            position.quantity,
        );
        self.venue.submit_order(&close_order).await?;

        let (_, mut record) = {
            let mut book = self.book.lock().await;
            book.close(&position.symbol)?
        };

        let profit = (record.notional * change_pct).round() / 100.0;
        record.profit = profit;
        record.result = if profit > 0.0 { TradeResult::Win } else { TradeResult::Loss };
        let result = record.result;

        {
            let mut equity = self.equity.write().await;
            *equity += profit;
        }

        info!(
            symbol = %position.symbol,
            reason,
            change_pct,
            profit,
            result = ?result,
            exit_price = current_price,
            "Position closed"
        );

        {
            let mut journal = self.journal.lock().await;
            if let Err(e) = journal.append(record).await {
                error!(error = %e, "Failed to persist trade history");
                self.notifier.send(&format!("🚨 History save failed: {e}")).await;
            }
            let mut params = self.params.write().await;
            self.adapter.adapt(journal.closed(), &mut params);
        }

        let pause_msg = {
            let mut breaker = self.breaker.lock().await;
            if breaker.record(result, now) {
                breaker.pause_until().map(|until| {
                    format!(
                        "🛑 {} consecutive losses — pausing new entries until {}",
                        breaker.consecutive_losses(),
                        until.format("%H:%M UTC")
                    )
                })
            } else {
                None
            }
        };
        if let Some(msg) = pause_msg {
            self.notifier.send(&msg).await;
        }

        let outcome = if result == TradeResult::Win { "WIN" } else { "LOSS" };
        self.notifier
            .send(&format!(
                "📤 Closed {} {} @ {:.4} ({}) — {} {:+.2} ({:+.2}%)",
                position.side, position.symbol, current_price, reason, outcome, profit, change_pct
            ))
            .await;
        Ok(())
    }

    /// Send the periodic statistics summary through the notifier.
    pub async fn report(&self) {
        let stats = { self.journal.lock().await.stats() };
        let open = { self.book.lock().await.len() };
        let equity = *self.equity.read().await;

        self.notifier
            .send(&format!(
                "📊 Trading report\n\
                 Total trades: {}\n\
                 ✅ Wins: {}\n\
                 ❌ Losses: {}\n\
                 🟡 Open: {}\n\
                 💸 Staked: ${:.2}\n\
                 💰 Profit: ${:.2}\n\
                 Equity: ${:.2}",
                stats.closed + open,
                stats.wins,
                stats.losses,
                open,
                stats.total_staked,
                stats.total_profit,
                equity
            ))
            .await;
    }
}

/// Percent change of current vs entry, sign-flipped for short positions
/// so a positive value is always profit-direction.
fn profit_change_pct(side: OrderSide, entry: f64, current: f64) -> f64 {
    let change = (current - entry) / entry * 100.0;
    match side {
        OrderSide::Buy => change,
        OrderSide::Sell => -change,
    }
}

/// Mean (high−low)/close over the trailing `window` bars.
fn mean_range_pct(series: &MarketSeries, window: usize) -> f64 {
    let candles = &series.candles;
    let start = candles.len().saturating_sub(window);
    let ratios: Vec<f64> = candles[start..]
        .iter()
        .filter(|c| c.close > 0.0)
        .map(|c| (c.high - c.low) / c.close)
        .collect();
    if ratios.is_empty() {
        return 0.0;
    }
    ratios.iter().sum::<f64>() / ratios.len() as f64
}

/// Hold timeout fixed at open: a volatility step function, stretched by
/// the volatility itself and the decision confidence, capped.
fn hold_timeout_minutes(
    series: &MarketSeries,
    window: usize,
    confidence: f64,
    cap_minutes: i64,
) -> i64 {
    let volatility = mean_range_pct(series, window);
    let base = if volatility > VOL_FAST_MARKET {
        HOLD_SHORT_MINUTES
    } else if volatility > VOL_ACTIVE_MARKET {
        HOLD_MEDIUM_MINUTES
    } else {
        HOLD_LONG_MINUTES
    };
    let scaled = base as f64 * (1.0 + volatility) * confidence;
    (scaled.round() as i64).clamp(1, cap_minutes)
}

// ─── Tests ────────────────────────────────────────────────────────────────────
