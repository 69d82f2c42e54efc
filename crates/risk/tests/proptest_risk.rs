use chrono::Utc;
use proptest::prelude::*;

use common::TradeResult;
use risk::{AdapterConfig, BreakerConfig, LossStreakBreaker, ParameterAdapter, PositionSizer, SizerConfig};
use strategy::StrategyParams;

proptest! {
    /// The sized notional is always within [0, equity × ceiling] no matter
    /// how extreme the inputs are.
    #[test]
    fn notional_respects_the_ceiling(
        equity in 0.0f64..10_000_000.0f64,
        win_rate in prop::option::of(0.0f64..=1.0f64),
        confidence in 0.0f64..5.0f64,
    ) {
        let config = SizerConfig::default();
        let ceiling = equity * config.max_percent / 100.0;
        let sizer = PositionSizer::new(config);

        let notional = sizer.notional(equity, win_rate, confidence);
        prop_assert!(notional >= 0.0);
        prop_assert!(notional <= ceiling + 1e-9);
    }

    /// After any resolution sequence the streak equals the number of
    /// losses since the last win.
    #[test]
    fn streak_counts_losses_since_last_win(outcomes in prop::collection::vec(prop::bool::ANY, 0..40)) {
        let mut breaker = LossStreakBreaker::new(BreakerConfig::default());
        let now = Utc::now();
        for &is_win in &outcomes {
            let result = if is_win { TradeResult::Win } else { TradeResult::Loss };
            breaker.record(result, now);
        }
        let expected = outcomes.iter().rev().take_while(|&&w| !w).count() as u32;
        prop_assert_eq!(breaker.consecutive_losses(), expected);
    }

    /// Repeated losing-window adaptations keep every period inside its
    /// configured bounds: trend below the ceiling, oscillators at or above
    /// the floor.
    #[test]
    fn adapted_periods_stay_in_bounds(rounds in 1usize..40) {
        let config = AdapterConfig::default();
        let (ceiling, floor) = (config.trend_ceiling, config.oscillator_floor);
        let adapter = ParameterAdapter::new(config);
        let losing: Vec<_> = (0..50)
            .map(|_| common::TradeRecord {
                symbol: "BTCUSDT".into(),
                side: common::OrderSide::Buy,
                notional: 50.0,
                entry_price: 100.0,
                opened_at: Utc::now(),
                result: TradeResult::Loss,
                profit: -1.0,
            })
            .collect();

        let mut params = StrategyParams::default();
        for _ in 0..rounds {
            adapter.adapt(&losing, &mut params);
            for period in params.trend_periods_mut() {
                prop_assert!(*period < ceiling);
            }
            for period in params.oscillator_periods_mut() {
                prop_assert!(*period >= floor);
            }
        }
    }
}
