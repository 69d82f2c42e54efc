use serde::{Deserialize, Serialize};
use tracing::debug;

/// Win rate at or above which the stake is bumped up.
const WIN_RATE_HOT: f64 = 0.7;
/// Win rate at or below which the stake is trimmed.
const WIN_RATE_COLD: f64 = 0.5;
/// Percentage points added/removed at the win-rate thresholds.
const WIN_RATE_ADJUST_PP: f64 = 2.0;
/// Percentage points per unit of confidence above/below 1.0.
const CONFIDENCE_PP_SCALE: f64 = 10.0;

/// User-configurable sizing parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SizerConfig {
    /// Base percent of equity staked per trade.
    pub base_percent: f64,
    /// Hard ceiling on the percent of equity staked per trade.
    pub max_percent: f64,
    /// Resolved trades required before a symbol's win rate is trusted;
    /// below this the win rate is "unknown" and applies no adjustment.
    pub min_win_rate_samples: usize,
}

impl Default for SizerConfig {
    fn default() -> Self {
        Self {
            base_percent: 5.0,
            max_percent: 30.0,
            min_win_rate_samples: 5,
        }
    }
}

/// Converts equity, per-symbol win-rate history and decision confidence
/// into a trade notional.
///
/// Pure calculation — no side effects, no venue access. The venue's
/// minimum-notional gate is applied by the caller, which must decline the
/// trade outright when the constraints cannot be fetched.
pub struct PositionSizer {
    config: SizerConfig,
}

impl PositionSizer {
    pub fn new(config: SizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SizerConfig {
        &self.config
    }

    /// Quote-currency notional for one trade.
    ///
    /// `win_rate` of `None` means "unknown" (too few resolved trades) and
    /// applies no adjustment either way.
    pub fn notional(&self, equity: f64, win_rate: Option<f64>, confidence: f64) -> f64 {
        let mut percent = self.config.base_percent;

        if let Some(rate) = win_rate {
            if rate >= WIN_RATE_HOT {
                percent += WIN_RATE_ADJUST_PP;
            } else if rate <= WIN_RATE_COLD {
                percent -= WIN_RATE_ADJUST_PP;
            }
        }

        percent += (confidence - 1.0) * CONFIDENCE_PP_SCALE;
        percent = percent.clamp(0.0, self.config.max_percent);

        let notional = equity * percent / 100.0;
        debug!(equity, ?win_rate, confidence, percent, notional, "Sized trade");
        notional
    }
}
