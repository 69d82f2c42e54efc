use serde::{Deserialize, Serialize};
use tracing::info;

use common::{TradeRecord, TradeResult};
use strategy::StrategyParams;

/// User-configurable adaptation parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    /// Closed trades per evaluation window.
    pub window: usize,
    /// Window win rate below which periods are perturbed.
    pub min_win_rate: f64,
    /// Step added to trend (EMA-like) periods.
    pub trend_step: usize,
    /// Trend period wraps to `trend_base` on reaching this value.
    pub trend_ceiling: usize,
    pub trend_base: usize,
    /// Step subtracted from oscillator periods.
    pub oscillator_step: usize,
    /// Oscillator periods never drop below this.
    pub oscillator_floor: usize,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            window: 50,
            min_win_rate: 0.5,
            trend_step: 2,
            trend_ceiling: 50,
            trend_base: 20,
            oscillator_step: 2,
            oscillator_floor: 8,
        }
    }
}

/// Online parameter perturbation driven by trailing win rate.
///
/// Deliberately crude: when the most recent full window of closed trades
/// wins less than the floor, every trend period is bumped (wrapping at the
/// ceiling) and every oscillator period shortened (down to the floor).
/// It never tracks whether the previous perturbation helped; each call
/// reacts only to the latest window.
pub struct ParameterAdapter {
    config: AdapterConfig,
}

impl ParameterAdapter {
    pub fn new(config: AdapterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    /// Examine the most recent window of `history` and perturb `params`
    /// in place when the win rate is below the floor. Returns `true` when
    /// a perturbation was applied.
    pub fn adapt(&self, history: &[TradeRecord], params: &mut StrategyParams) -> bool {
        let resolved: Vec<&TradeRecord> = history
            .iter()
            .filter(|t| t.result != TradeResult::Pending)
            .collect();
        if resolved.len() < self.config.window {
            return false;
        }

        let recent = &resolved[resolved.len() - self.config.window..];
        let wins = recent.iter().filter(|t| t.result == TradeResult::Win).count();
        let win_rate = wins as f64 / self.config.window as f64;
        if win_rate >= self.config.min_win_rate {
            return false;
        }

        for period in params.trend_periods_mut() {
            *period += self.config.trend_step;
            if *period >= self.config.trend_ceiling {
                *period = self.config.trend_base;
            }
        }
        for period in params.oscillator_periods_mut() {
            *period = period
                .saturating_sub(self.config.oscillator_step)
                .max(self.config.oscillator_floor);
        }

        info!(
            win_rate,
            window = self.config.window,
            "Trailing win rate below floor — perturbed evaluator periods"
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use common::OrderSide;

    fn record(result: TradeResult) -> TradeRecord {
        TradeRecord {
            symbol: "BTCUSDT".into(),
            side: OrderSide::Buy,
            notional: 50.0,
            entry_price: 100.0,
            opened_at: Utc::now(),
            result,
            profit: if result == TradeResult::Win { 1.0 } else { -1.0 },
        }
    }

    /// `wins` winners then losers up to `total`.
    fn history(total: usize, wins: usize) -> Vec<TradeRecord> {
        (0..total)
            .map(|i| record(if i < wins { TradeResult::Win } else { TradeResult::Loss }))
            .collect()
    }

    #[test]
    fn partial_window_is_a_no_op() {
        let adapter = ParameterAdapter::new(AdapterConfig::default());
        let mut params = StrategyParams::default();
        let before = params.clone();
        assert!(!adapter.adapt(&history(49, 10), &mut params));
        assert_eq!(params, before);
    }

    #[test]
    fn healthy_win_rate_is_a_no_op() {
        let adapter = ParameterAdapter::new(AdapterConfig::default());
        let mut params = StrategyParams::default();
        let before = params.clone();
        assert!(!adapter.adapt(&history(50, 30), &mut params));
        assert_eq!(params, before);
    }

    #[test]
    fn losing_window_bumps_trend_and_shortens_oscillators() {
        let adapter = ParameterAdapter::new(AdapterConfig::default());
        let mut params = StrategyParams::default();
        assert!(adapter.adapt(&history(50, 20), &mut params));

        assert_eq!(params.ema_rsi.ema_period, 22);
        assert_eq!(params.bollinger_rsi.window, 22);
        assert_eq!(params.macd.slow, 28);
        assert_eq!(params.bollinger_volume.window, 22);
        assert_eq!(params.ema_crossover.slow, 23);

        assert_eq!(params.ema_rsi.rsi_period, 12);
        assert_eq!(params.bollinger_rsi.rsi_period, 12);
        assert_eq!(params.vwap_rsi.rsi_period, 12);
        assert_eq!(params.macd_stoch.stoch_period, 12);

        // Untouched companions
        assert_eq!(params.macd.fast, 12);
        assert_eq!(params.ema_crossover.fast, 9);
    }

    #[test]
    fn trend_period_wraps_on_reaching_the_ceiling() {
        let adapter = ParameterAdapter::new(AdapterConfig::default());
        let mut params = StrategyParams::default();
        params.ema_rsi.ema_period = 48;
        assert!(adapter.adapt(&history(50, 20), &mut params));
        // 48 + 2 = 50 hits the ceiling and wraps to the base, not 50
        assert_eq!(params.ema_rsi.ema_period, 20);
    }

    #[test]
    fn oscillator_period_floors_at_the_minimum() {
        let adapter = ParameterAdapter::new(AdapterConfig::default());
        let mut params = StrategyParams::default();
        params.ema_rsi.rsi_period = 9;
        assert!(adapter.adapt(&history(50, 20), &mut params));
        assert_eq!(params.ema_rsi.rsi_period, 8);

        // Already at the floor — stays there
        assert!(adapter.adapt(&history(50, 20), &mut params));
        assert_eq!(params.ema_rsi.rsi_period, 8);
    }

    #[test]
    fn only_the_most_recent_window_counts() {
        let adapter = ParameterAdapter::new(AdapterConfig::default());
        let mut params = StrategyParams::default();
        // 50 old winners followed by 50 recent losers: window win rate 0
        let mut trades = history(50, 50);
        trades.extend(history(50, 0));
        assert!(adapter.adapt(&trades, &mut params));
    }
}
