pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod stoch_rsi;
pub mod vwap;

pub use bollinger::{bands, Bands};
pub use ema::{ema, ema_last_two};
pub use macd::macd_last_two;
pub use rsi::{rsi, rsi_series};
pub use stoch_rsi::stoch_rsi_last_two;
pub use vwap::vwap;

/// Direction of a line crossing another on the latest bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crossover {
    Bullish,
    Bearish,
    None,
}

/// Classify how line `a` crossed line `b` between the previous and
/// current bar.
pub fn crossover(prev_a: f64, curr_a: f64, prev_b: f64, curr_b: f64) -> Crossover {
    if prev_a <= prev_b && curr_a > curr_b {
        Crossover::Bullish
    } else if prev_a >= prev_b && curr_a < curr_b {
        Crossover::Bearish
    } else {
        Crossover::None
    }
}

/// Rolling simple moving average. Returns one value per full window,
/// empty when the input is shorter than `window`.
pub fn sma(data: &[f64], window: usize) -> Vec<f64> {
    if window == 0 || data.len() < window {
        return Vec::new();
    }
    data.windows(window)
        .map(|w| w.iter().sum::<f64>() / window as f64)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sma_needs_full_window() {
        assert!(sma(&[1.0, 2.0], 3).is_empty());
        let out = sma(&[1.0, 2.0, 3.0, 4.0], 2);
        assert_eq!(out, vec![1.5, 2.5, 3.5]);
    }

    #[test]
    fn crossover_detects_both_directions() {
        assert_eq!(crossover(1.0, 3.0, 2.0, 2.0), Crossover::Bullish);
        assert_eq!(crossover(3.0, 1.0, 2.0, 2.0), Crossover::Bearish);
        assert_eq!(crossover(3.0, 4.0, 2.0, 2.0), Crossover::None);
    }
}
