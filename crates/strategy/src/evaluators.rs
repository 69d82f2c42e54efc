//! The seven signal evaluators.
//!
//! Each consumes a read-only market series plus its own parameter set and
//! produces at most one directional vote. Short series and degenerate
//! indicator math yield `None`; an evaluator never panics and never keeps
//! state between ticks.

use common::{MarketSeries, OrderSide};

use crate::indicators::{
    bands, crossover, ema, ema_last_two, macd_last_two, rsi, sma, stoch_rsi_last_two, vwap,
    Crossover,
};
use crate::params::{
    BollingerRsiParams, BollingerVolumeParams, EmaCrossoverParams, EmaRsiParams, MacdParams,
    MacdStochParams, VwapRsiParams,
};

const RSI_OVERBOUGHT: f64 = 70.0;
const RSI_OVERSOLD: f64 = 30.0;
const BOLLINGER_K: f64 = 2.0;

/// Price above its EMA with RSI short of overbought → Buy; below with RSI
/// above oversold → Sell. A trend filter, not a crossover — it votes on
/// most bars once warmed up.
pub fn ema_rsi(series: &MarketSeries, p: &EmaRsiParams) -> Option<OrderSide> {
    let closes = series.closes();
    if closes.len() < p.ema_period {
        return None;
    }
    let last = *closes.last()?;
    let ema_value = ema(&closes, p.ema_period);
    let rsi_value = rsi(&closes, p.rsi_period)?;

    if last > ema_value && rsi_value < RSI_OVERBOUGHT {
        Some(OrderSide::Buy)
    } else if last < ema_value && rsi_value > RSI_OVERSOLD {
        Some(OrderSide::Sell)
    } else {
        None
    }
}

/// Mean reversion at the Bollinger extremes, confirmed by RSI.
pub fn bollinger_rsi(series: &MarketSeries, p: &BollingerRsiParams) -> Option<OrderSide> {
    let closes = series.closes();
    let last = *closes.last()?;
    let bands = bands(&closes, p.window, BOLLINGER_K)?;
    let rsi_value = rsi(&closes, p.rsi_period)?;

    if last < bands.lower && rsi_value < RSI_OVERSOLD {
        Some(OrderSide::Buy)
    } else if last > bands.upper && rsi_value > RSI_OVERBOUGHT {
        Some(OrderSide::Sell)
    } else {
        None
    }
}

/// MACD line crossing its signal line on the latest bar.
pub fn macd_cross(series: &MarketSeries, p: &MacdParams) -> Option<OrderSide> {
    let closes = series.closes();
    let ((macd_prev, macd_curr), (sig_prev, sig_curr)) =
        macd_last_two(&closes, p.fast, p.slow, p.signal)?;

    match crossover(macd_prev, macd_curr, sig_prev, sig_curr) {
        Crossover::Bullish => Some(OrderSide::Buy),
        Crossover::Bearish => Some(OrderSide::Sell),
        Crossover::None => None,
    }
}

/// Price relative to the session VWAP, confirmed by RSI.
pub fn vwap_rsi(series: &MarketSeries, p: &VwapRsiParams) -> Option<OrderSide> {
    let closes = series.closes();
    let volumes = series.volumes();
    let last = *closes.last()?;
    let vwap_value = vwap(&closes, &volumes)?;
    let rsi_value = rsi(&closes, p.rsi_period)?;

    if last > vwap_value && rsi_value < RSI_OVERBOUGHT {
        Some(OrderSide::Buy)
    } else if last < vwap_value && rsi_value > RSI_OVERSOLD {
        Some(OrderSide::Sell)
    } else {
        None
    }
}

/// Dual confirmation: MACD crossover and stochastic-RSI %K/%D crossover
/// in the same direction on the same bar.
pub fn macd_stoch(series: &MarketSeries, p: &MacdStochParams) -> Option<OrderSide> {
    let closes = series.closes();
    let ((macd_prev, macd_curr), (sig_prev, sig_curr)) =
        macd_last_two(&closes, p.fast, p.slow, p.signal)?;
    let ((k_prev, k_curr), (d_prev, d_curr)) =
        stoch_rsi_last_two(&closes, p.stoch_period, p.smooth_k, p.smooth_d)?;

    let macd_x = crossover(macd_prev, macd_curr, sig_prev, sig_curr);
    let stoch_x = crossover(k_prev, k_curr, d_prev, d_curr);

    match (macd_x, stoch_x) {
        (Crossover::Bullish, Crossover::Bullish) => Some(OrderSide::Buy),
        (Crossover::Bearish, Crossover::Bearish) => Some(OrderSide::Sell),
        _ => None,
    }
}

/// Bollinger breakout faded on a volume spike: a close outside the bands
/// only counts when volume runs hot against its own average.
pub fn bollinger_volume(series: &MarketSeries, p: &BollingerVolumeParams) -> Option<OrderSide> {
    let closes = series.closes();
    let volumes = series.volumes();
    let last = *closes.last()?;
    let last_volume = *volumes.last()?;
    let bands = bands(&closes, p.window, BOLLINGER_K)?;
    let volume_ma = *sma(&volumes, p.volume_window).last()?;

    let spike = last_volume > p.volume_threshold * volume_ma;
    if last > bands.upper && spike {
        Some(OrderSide::Sell)
    } else if last < bands.lower && spike {
        Some(OrderSide::Buy)
    } else {
        None
    }
}

/// Fast EMA crossing the slow EMA on the latest bar.
pub fn ema_crossover(series: &MarketSeries, p: &EmaCrossoverParams) -> Option<OrderSide> {
    if p.fast >= p.slow {
        return None;
    }
    let closes = series.closes();
    let (fast_prev, fast_curr) = ema_last_two(&closes, p.fast)?;
    let (slow_prev, slow_curr) = ema_last_two(&closes, p.slow)?;

    match crossover(fast_prev, fast_curr, slow_prev, slow_curr) {
        Crossover::Bullish => Some(OrderSide::Buy),
        Crossover::Bearish => Some(OrderSide::Sell),
        Crossover::None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::StrategyParams;
    use chrono::{Duration, TimeZone, Utc};
    use common::Candle;

    fn series(closes: &[f64], volumes: &[f64]) -> MarketSeries {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let candles = closes
            .iter()
            .zip(volumes)
            .enumerate()
            .map(|(i, (&close, &volume))| Candle {
                open_time: t0 + Duration::minutes(5 * i as i64),
                open: close,
                high: close * 1.001,
                low: close * 0.999,
                close,
                volume,
            })
            .collect();
        MarketSeries::new("BTCUSDT", candles)
    }

    fn flat_volume(closes: &[f64]) -> MarketSeries {
        series(closes, &vec![10.0; closes.len()])
    }

    /// Alternating ±1 around 100 keeps RSI mid-range; the tail nudges the
    /// last close relative to the trailing averages.
    fn choppy_with_tail(tail: f64) -> Vec<f64> {
        let mut closes: Vec<f64> = (0..30)
            .map(|i| if i % 2 == 0 { 100.0 } else { 101.0 })
            .collect();
        closes.push(tail);
        closes
    }

    #[test]
    fn ema_rsi_buys_above_ema_when_not_overbought() {
        let s = flat_volume(&choppy_with_tail(103.0));
        let p = StrategyParams::default();
        assert_eq!(ema_rsi(&s, &p.ema_rsi), Some(OrderSide::Buy));
    }

    #[test]
    fn ema_rsi_sells_below_ema_when_not_oversold() {
        let s = flat_volume(&choppy_with_tail(97.5));
        let p = StrategyParams::default();
        assert_eq!(ema_rsi(&s, &p.ema_rsi), Some(OrderSide::Sell));
    }

    #[test]
    fn ema_rsi_abstains_on_short_series() {
        let s = flat_volume(&[100.0; 10]);
        let p = StrategyParams::default();
        assert_eq!(ema_rsi(&s, &p.ema_rsi), None);
    }

    #[test]
    fn bollinger_rsi_buys_a_hard_dump_below_the_band() {
        let mut closes = vec![100.0; 25];
        closes.extend([99.0, 98.0, 96.0, 94.0, 90.0]);
        let s = flat_volume(&closes);
        let p = StrategyParams::default();
        assert_eq!(bollinger_rsi(&s, &p.bollinger_rsi), Some(OrderSide::Buy));
    }

    #[test]
    fn bollinger_rsi_sells_a_vertical_pump_above_the_band() {
        let mut closes = vec![100.0; 25];
        closes.extend([101.0, 102.0, 104.0, 106.0, 110.0]);
        let s = flat_volume(&closes);
        let p = StrategyParams::default();
        assert_eq!(bollinger_rsi(&s, &p.bollinger_rsi), Some(OrderSide::Sell));
    }

    #[test]
    fn bollinger_rsi_abstains_mid_band() {
        let s = flat_volume(&choppy_with_tail(100.5));
        let p = StrategyParams::default();
        assert_eq!(bollinger_rsi(&s, &p.bollinger_rsi), None);
    }

    #[test]
    fn macd_cross_abstains_on_short_series() {
        let s = flat_volume(&vec![100.0; 20]);
        let p = StrategyParams::default();
        assert_eq!(macd_cross(&s, &p.macd), None);
    }

    #[test]
    fn macd_cross_buys_somewhere_on_a_v_reversal() {
        let mut closes: Vec<f64> = (0..30).map(|i| 100.0 - i as f64 * 0.5).collect();
        closes.extend((0..30).map(|i| 85.0 + i as f64 * 2.0));
        let p = MacdParams { fast: 3, slow: 6, signal: 3 };

        let mut saw_buy = false;
        for end in 12..=closes.len() {
            let s = flat_volume(&closes[..end]);
            if macd_cross(&s, &p) == Some(OrderSide::Buy) {
                saw_buy = true;
                break;
            }
        }
        assert!(saw_buy, "no buy vote anywhere on the reversal");
    }

    #[test]
    fn vwap_rsi_buys_above_vwap_when_not_overbought() {
        let s = flat_volume(&choppy_with_tail(103.0));
        let p = StrategyParams::default();
        assert_eq!(vwap_rsi(&s, &p.vwap_rsi), Some(OrderSide::Buy));
    }

    #[test]
    fn vwap_rsi_abstains_when_volume_is_dead() {
        let closes = choppy_with_tail(103.0);
        let s = series(&closes, &vec![0.0; closes.len()]);
        let p = StrategyParams::default();
        assert_eq!(vwap_rsi(&s, &p.vwap_rsi), None);
    }

    #[test]
    fn macd_stoch_abstains_on_flat_series() {
        // Flat prices leave the stochastic-RSI range degenerate
        let s = flat_volume(&vec![100.0; 80]);
        let p = StrategyParams::default();
        assert_eq!(macd_stoch(&s, &p.macd_stoch), None);
    }

    #[test]
    fn macd_stoch_never_sells_into_a_sustained_rise() {
        let mut closes: Vec<f64> = (0..40).map(|i| 100.0 - i as f64 * 0.3).collect();
        closes.extend((0..40).map(|i| 88.0 + i as f64 * 1.5));
        let p = MacdStochParams {
            fast: 3,
            slow: 6,
            signal: 3,
            stoch_period: 5,
            smooth_k: 2,
            smooth_d: 2,
        };
        for end in 45..=closes.len() {
            let s = flat_volume(&closes[..end]);
            assert_ne!(macd_stoch(&s, &p), Some(OrderSide::Sell));
        }
    }

    #[test]
    fn bollinger_volume_buys_a_dump_on_hot_volume() {
        let mut closes = vec![100.0; 29];
        closes.push(90.0);
        let mut volumes = vec![10.0; 29];
        volumes.push(30.0);
        let s = series(&closes, &volumes);
        let p = StrategyParams::default();
        assert_eq!(bollinger_volume(&s, &p.bollinger_volume), Some(OrderSide::Buy));
    }

    #[test]
    fn bollinger_volume_ignores_a_dump_on_quiet_volume() {
        let mut closes = vec![100.0; 29];
        closes.push(90.0);
        let s = flat_volume(&closes);
        let p = StrategyParams::default();
        assert_eq!(bollinger_volume(&s, &p.bollinger_volume), None);
    }

    #[test]
    fn ema_crossover_buys_somewhere_on_a_v_reversal() {
        let mut closes: Vec<f64> = (0..30).map(|i| 100.0 - i as f64 * 0.5).collect();
        closes.extend((0..30).map(|i| 85.0 + i as f64 * 2.0));
        let p = EmaCrossoverParams { fast: 3, slow: 8 };

        let mut saw_buy = false;
        for end in 10..=closes.len() {
            let s = flat_volume(&closes[..end]);
            if ema_crossover(&s, &p) == Some(OrderSide::Buy) {
                saw_buy = true;
                break;
            }
        }
        assert!(saw_buy, "no buy vote anywhere on the reversal");
    }

    #[test]
    fn ema_crossover_rejects_inverted_periods() {
        let s = flat_volume(&vec![100.0; 40]);
        let p = EmaCrossoverParams { fast: 21, slow: 9 };
        assert_eq!(ema_crossover(&s, &p), None);
    }
}
