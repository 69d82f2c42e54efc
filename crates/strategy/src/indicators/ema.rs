/// Exponential Moving Average of the last `period` values in `data`.
///
/// Seeded with an SMA of the first `period` values of the trailing slice,
/// then smoothed forward. Returns 0.0 on empty input or zero period.
pub fn ema(data: &[f64], period: usize) -> f64 {
    if data.is_empty() || period == 0 {
        return 0.0;
    }
    let k = 2.0 / (period as f64 + 1.0);
    let start = data.len().saturating_sub(period * 3); // enough history
    let slice = &data[start..];

    let seed_len = period.min(slice.len());
    let mut value: f64 = slice[..seed_len].iter().sum::<f64>() / seed_len as f64;

    for &price in &slice[seed_len..] {
        value = price * k + value * (1.0 - k);
    }
    value
}

/// EMA on the previous bar and on the current bar, for crossover checks.
/// Returns `None` when there aren't at least `period + 1` values.
pub fn ema_last_two(data: &[f64], period: usize) -> Option<(f64, f64)> {
    if period == 0 || data.len() < period + 1 {
        return None;
    }
    let prev = ema(&data[..data.len() - 1], period);
    let curr = ema(data, period);
    Some((prev, curr))
}
