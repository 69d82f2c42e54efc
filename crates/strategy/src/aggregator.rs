use common::{Decision, OrderSide};

/// Minimum agreeing votes before a direction is adopted.
pub const MIN_VOTES: usize = 2;

/// Combine one tick's evaluator votes for a symbol into a single decision.
///
/// A direction is adopted only when it collects at least [`MIN_VOTES`] and
/// the opposing direction collects none. Ties, mixed votes and lone voters
/// all yield no direction — precision over recall, one noisy evaluator
/// must not move money.
pub fn aggregate(symbol: &str, votes: &[Option<OrderSide>]) -> Decision {
    let buy_votes = votes.iter().flatten().filter(|s| **s == OrderSide::Buy).count();
    let sell_votes = votes.iter().flatten().filter(|s| **s == OrderSide::Sell).count();

    let direction = if buy_votes >= MIN_VOTES && sell_votes == 0 {
        Some(OrderSide::Buy)
    } else if sell_votes >= MIN_VOTES && buy_votes == 0 {
        Some(OrderSide::Sell)
    } else {
        None
    };

    Decision {
        symbol: symbol.to_string(),
        direction,
        buy_votes,
        sell_votes,
        confidence: confidence_for(buy_votes.max(sell_votes)),
    }
}

/// Size/timeout multiplier from the winning vote count. The sub-quorum
/// branch is defensive; it cannot be reached through [`aggregate`].
fn confidence_for(votes: usize) -> f64 {
    match votes {
        v if v >= 4 => 1.2,
        3 => 1.1,
        2 => 1.0,
        _ => 0.9,
    }
}
