use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;

use common::{Candle, MarketSeries, OrderSide};
use strategy::{aggregate, evaluate_all, StrategyParams, MIN_VOTES};

fn series_from(closes: Vec<f64>, volumes: Vec<f64>) -> MarketSeries {
    let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let candles = closes
        .iter()
        .zip(&volumes)
        .enumerate()
        .map(|(i, (&close, &volume))| Candle {
            open_time: t0 + Duration::minutes(5 * i as i64),
            open: close,
            high: close * 1.01,
            low: close * 0.99,
            close,
            volume,
        })
        .collect();
    MarketSeries::new("PROPUSDT", candles)
}

proptest! {
    /// Evaluators must absorb any series — short, flat, extreme — without
    /// panicking; bad data is an absent vote, never a crash.
    #[test]
    fn evaluators_never_panic_on_arbitrary_series(
        closes in prop::collection::vec(0.0001f64..1_000_000.0f64, 0..120),
        volume in 0.0f64..1_000.0f64,
    ) {
        let volumes = vec![volume; closes.len()];
        let series = series_from(closes, volumes);
        let params = StrategyParams::default();
        let votes = evaluate_all(&series, &params);
        prop_assert_eq!(votes.len(), 7);
    }

    /// An adopted direction always has a quorum and zero opposition.
    #[test]
    fn adopted_direction_implies_unopposed_quorum(
        votes in prop::collection::vec(
            prop::option::of(prop::bool::ANY.prop_map(|b| {
                if b { OrderSide::Buy } else { OrderSide::Sell }
            })),
            0..12,
        ),
    ) {
        let decision = aggregate("PROPUSDT", &votes);
        match decision.direction {
            Some(OrderSide::Buy) => {
                prop_assert!(decision.buy_votes >= MIN_VOTES);
                prop_assert_eq!(decision.sell_votes, 0);
            }
            Some(OrderSide::Sell) => {
                prop_assert!(decision.sell_votes >= MIN_VOTES);
                prop_assert_eq!(decision.buy_votes, 0);
            }
            None => {}
        }
    }

    /// Mixed votes never move money, regardless of the tally.
    #[test]
    fn mixed_votes_never_adopt(
        buys in 1usize..6,
        sells in 1usize..6,
    ) {
        let mut votes: Vec<Option<OrderSide>> = vec![Some(OrderSide::Buy); buys];
        votes.extend(vec![Some(OrderSide::Sell); sells]);
        prop_assert_eq!(aggregate("PROPUSDT", &votes).direction, None);
    }
}
