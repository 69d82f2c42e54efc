pub mod aggregator;
pub mod evaluators;
pub mod indicators;
pub mod params;

pub use aggregator::{aggregate, MIN_VOTES};
pub use params::StrategyParams;

use common::{MarketSeries, OrderSide};

/// The closed set of signal evaluators.
///
/// Every variant satisfies the same capability — consume a market series
/// and the shared parameter set, produce an optional directional vote —
/// and is dispatched exhaustively, so adding an evaluator is a compile
/// error until every match arm handles it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluator {
    EmaRsi,
    BollingerRsi,
    MacdCross,
    VwapRsi,
    MacdStoch,
    BollingerVolume,
    EmaCrossover,
}

impl Evaluator {
    pub const ALL: [Evaluator; 7] = [
        Evaluator::EmaRsi,
        Evaluator::BollingerRsi,
        Evaluator::MacdCross,
        Evaluator::VwapRsi,
        Evaluator::MacdStoch,
        Evaluator::BollingerVolume,
        Evaluator::EmaCrossover,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Evaluator::EmaRsi => "ema_rsi",
            Evaluator::BollingerRsi => "bollinger_rsi",
            Evaluator::MacdCross => "macd",
            Evaluator::VwapRsi => "vwap_rsi",
            Evaluator::MacdStoch => "macd_stoch",
            Evaluator::BollingerVolume => "bollinger_volume",
            Evaluator::EmaCrossover => "ema_crossover",
        }
    }

    /// Run this evaluator. Data insufficiency and degenerate indicator
    /// math come back as `None`, never as an error or a panic.
    pub fn evaluate(self, series: &MarketSeries, params: &StrategyParams) -> Option<OrderSide> {
        match self {
            Evaluator::EmaRsi => evaluators::ema_rsi(series, &params.ema_rsi),
            Evaluator::BollingerRsi => evaluators::bollinger_rsi(series, &params.bollinger_rsi),
            Evaluator::MacdCross => evaluators::macd_cross(series, &params.macd),
            Evaluator::VwapRsi => evaluators::vwap_rsi(series, &params.vwap_rsi),
            Evaluator::MacdStoch => evaluators::macd_stoch(series, &params.macd_stoch),
            Evaluator::BollingerVolume => {
                evaluators::bollinger_volume(series, &params.bollinger_volume)
            }
            Evaluator::EmaCrossover => evaluators::ema_crossover(series, &params.ema_crossover),
        }
    }
}

/// One vote per evaluator, in [`Evaluator::ALL`] order.
pub fn evaluate_all(series: &MarketSeries, params: &StrategyParams) -> Vec<Option<OrderSide>> {
    Evaluator::ALL
        .iter()
        .map(|e| e.evaluate(series, params))
        .collect()
}
