/// Volume-weighted average price over the whole series.
///
/// `None` on empty input, mismatched lengths, or zero cumulative volume
/// (an all-dead market must read as "no signal", not a NaN).
pub fn vwap(closes: &[f64], volumes: &[f64]) -> Option<f64> {
    if closes.is_empty() || closes.len() != volumes.len() {
        return None;
    }
    let turnover: f64 = closes.iter().zip(volumes).map(|(p, q)| p * q).sum();
    let total_volume: f64 = volumes.iter().sum();
    if total_volume <= 0.0 {
        return None;
    }
    Some(turnover / total_volume)
}
