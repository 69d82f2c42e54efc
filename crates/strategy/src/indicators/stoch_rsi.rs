use super::rsi::rsi_series;
use super::sma;

/// Stochastic RSI %K and %D on the previous and current bar.
///
/// RSI is normalized against its rolling min/max over `period`, then %K is
/// an SMA(`smooth_k`) of that and %D an SMA(`smooth_d`) of %K. Returns
/// `((k_prev, k_curr), (d_prev, d_curr))`, or `None` when the series is
/// too short or the RSI range is degenerate (flat RSI window).
pub fn stoch_rsi_last_two(
    closes: &[f64],
    period: usize,
    smooth_k: usize,
    smooth_d: usize,
) -> Option<((f64, f64), (f64, f64))> {
    if period == 0 || smooth_k == 0 || smooth_d == 0 {
        return None;
    }
    let rsi = rsi_series(closes, period);
    if rsi.len() < period {
        return None;
    }

    let stoch: Vec<f64> = rsi
        .windows(period)
        .map(|w| {
            let min = w.iter().copied().fold(f64::INFINITY, f64::min);
            let max = w.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            if max - min == 0.0 {
                f64::NAN
            } else {
                (w[period - 1] - min) / (max - min)
            }
        })
        .collect();

    let k = sma(&stoch, smooth_k);
    let d = sma(&k, smooth_d);
    if k.len() < 2 || d.len() < 2 {
        return None;
    }

    let kk = (k[k.len() - 2], k[k.len() - 1]);
    let dd = (d[d.len() - 2], d[d.len() - 1]);
    if !(kk.0.is_finite() && kk.1.is_finite() && dd.0.is_finite() && dd.1.is_finite()) {
        return None;
    }
    Some((kk, dd))
}
