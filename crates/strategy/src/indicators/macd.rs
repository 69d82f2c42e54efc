use super::ema::ema;

/// MACD line and signal line on the previous and current bar.
///
/// MACD line = EMA(fast) − EMA(slow); signal = EMA(macd_line, signal).
/// Returns `((macd_prev, macd_curr), (sig_prev, sig_curr))`, or `None`
/// when there are fewer than `slow + signal` closes or `fast >= slow`.
pub fn macd_last_two(
    closes: &[f64],
    fast: usize,
    slow: usize,
    signal: usize,
) -> Option<((f64, f64), (f64, f64))> {
    if fast == 0 || fast >= slow || signal == 0 {
        return None;
    }
    let min_len = slow + signal;
    if closes.len() < min_len {
        return None;
    }

    // MACD line for the last `signal + 1` bars (need prev + current)
    let macd_points = signal + 1;
    let start = closes.len().saturating_sub(slow + macd_points - 1);
    let window = &closes[start..];

    let macd_line: Vec<f64> = (slow - 1..window.len())
        .map(|i| {
            let slice = &window[..=i];
            ema(slice, fast) - ema(slice, slow)
        })
        .collect();

    if macd_line.len() < signal + 1 {
        return None;
    }

    let signal_line: Vec<f64> = (signal - 1..macd_line.len())
        .map(|i| ema(&macd_line[..=i], signal))
        .collect();

    if signal_line.len() < 2 {
        return None;
    }

    let m = (macd_line[macd_line.len() - 2], macd_line[macd_line.len() - 1]);
    let s = (
        signal_line[signal_line.len() - 2],
        signal_line[signal_line.len() - 1],
    );
    Some((m, s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{crossover, Crossover};

    #[test]
    fn macd_returns_none_with_insufficient_data() {
        let prices = vec![100.0; 30]; // need >= 35
        assert!(macd_last_two(&prices, 12, 26, 9).is_none());
    }

    #[test]
    fn macd_returns_some_with_sufficient_data() {
        let prices: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        assert!(macd_last_two(&prices, 12, 26, 9).is_some());
    }

    #[test]
    fn macd_rejects_inverted_periods() {
        let prices: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        assert!(macd_last_two(&prices, 26, 12, 9).is_none());
    }

    #[test]
    fn macd_sees_bullish_crossover_after_reversal() {
        // Down then sharply up: the MACD line must cross above its signal
        // somewhere on the way up. Walk the series and look for it.
        let mut prices: Vec<f64> = (0..30).map(|i| 100.0 - i as f64 * 0.5).collect();
        prices.extend((0..30).map(|i| 85.0 + i as f64 * 2.0));

        let mut saw_bullish = false;
        for end in 20..=prices.len() {
            if let Some(((mp, mc), (sp, sc))) = macd_last_two(&prices[..end], 3, 6, 3) {
                if crossover(mp, mc, sp, sc) == Crossover::Bullish {
                    saw_bullish = true;
                    break;
                }
            }
        }
        assert!(saw_bullish, "no bullish crossover found on reversal");
    }
}
