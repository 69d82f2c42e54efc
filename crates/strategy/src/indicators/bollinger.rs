/// Bollinger bands over the trailing `window` closes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bands {
    pub middle: f64,
    pub upper: f64,
    pub lower: f64,
}

/// Middle = SMA(window), upper/lower = middle ± k × sample std-dev.
/// Returns `None` when there are fewer than `window` closes or the window
/// is too small for a standard deviation.
pub fn bands(closes: &[f64], window: usize, k: f64) -> Option<Bands> {
    if window < 2 || closes.len() < window {
        return None;
    }
    let tail = &closes[closes.len() - window..];
    let middle = tail.iter().sum::<f64>() / window as f64;
    let variance =
        tail.iter().map(|c| (c - middle).powi(2)).sum::<f64>() / (window - 1) as f64;
    let std = variance.sqrt();
    Some(Bands {
        middle,
        upper: middle + k * std,
        lower: middle - k * std,
    })
}
