use serde::{Deserialize, Serialize};

/// Tunable periods for every evaluator, loaded from the optional tuning
/// file and nudged at runtime by the parameter adapter. Process-wide:
/// evaluators read a snapshot on every tick, last write wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyParams {
    pub ema_rsi: EmaRsiParams,
    pub bollinger_rsi: BollingerRsiParams,
    pub macd: MacdParams,
    pub vwap_rsi: VwapRsiParams,
    pub macd_stoch: MacdStochParams,
    pub bollinger_volume: BollingerVolumeParams,
    pub ema_crossover: EmaCrossoverParams,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmaRsiParams {
    pub ema_period: usize,
    pub rsi_period: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BollingerRsiParams {
    pub window: usize,
    pub rsi_period: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MacdParams {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VwapRsiParams {
    pub rsi_period: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MacdStochParams {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
    pub stoch_period: usize,
    pub smooth_k: usize,
    pub smooth_d: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BollingerVolumeParams {
    pub window: usize,
    pub volume_window: usize,
    pub volume_threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmaCrossoverParams {
    pub fast: usize,
    pub slow: usize,
}

impl Default for EmaRsiParams {
    fn default() -> Self {
        Self { ema_period: 20, rsi_period: 14 }
    }
}

impl Default for BollingerRsiParams {
    fn default() -> Self {
        Self { window: 20, rsi_period: 14 }
    }
}

impl Default for MacdParams {
    fn default() -> Self {
        Self { fast: 12, slow: 26, signal: 9 }
    }
}

impl Default for VwapRsiParams {
    fn default() -> Self {
        Self { rsi_period: 14 }
    }
}

impl Default for MacdStochParams {
    fn default() -> Self {
        Self { fast: 12, slow: 26, signal: 9, stoch_period: 14, smooth_k: 3, smooth_d: 3 }
    }
}

impl Default for BollingerVolumeParams {
    fn default() -> Self {
        Self { window: 20, volume_window: 20, volume_threshold: 1.5 }
    }
}

impl Default for EmaCrossoverParams {
    fn default() -> Self {
        Self { fast: 9, slow: 21 }
    }
}

impl Default for StrategyParams {
    fn default() -> Self {
        Self {
            ema_rsi: EmaRsiParams::default(),
            bollinger_rsi: BollingerRsiParams::default(),
            macd: MacdParams::default(),
            vwap_rsi: VwapRsiParams::default(),
            macd_stoch: MacdStochParams::default(),
            bollinger_volume: BollingerVolumeParams::default(),
            ema_crossover: EmaCrossoverParams::default(),
        }
    }
}

impl StrategyParams {
    /// One trend-following (EMA-like) period per parameter set that
    /// declares one. The parameter adapter bumps these together.
    pub fn trend_periods_mut(&mut self) -> Vec<&mut usize> {
        vec![
            &mut self.ema_rsi.ema_period,
            &mut self.bollinger_rsi.window,
            &mut self.macd.slow,
            &mut self.bollinger_volume.window,
            &mut self.ema_crossover.slow,
        ]
    }

    /// One oscillator period per parameter set that declares one.
    pub fn oscillator_periods_mut(&mut self) -> Vec<&mut usize> {
        vec![
            &mut self.ema_rsi.rsi_period,
            &mut self.bollinger_rsi.rsi_period,
            &mut self.vwap_rsi.rsi_period,
            &mut self.macd_stoch.stoch_period,
        ]
    }
}
