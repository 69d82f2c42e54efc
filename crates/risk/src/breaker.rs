use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use common::TradeResult;

/// User-configurable breaker parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakerConfig {
    /// Consecutive losses that trigger a trading pause.
    pub loss_threshold: u32,
    /// Length of the pause window.
    pub pause_minutes: i64,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            loss_threshold: 3,
            pause_minutes: 60,
        }
    }
}

/// Process-wide loss-streak circuit breaker.
///
/// Counts consecutive losing closes; at the threshold it opens a timed
/// pause during which no new position may open (exits are never blocked).
/// The streak counter is NOT reset by entering a pause — only a win
/// resets it — so losses continuing straight through a pause re-trigger
/// a fresh pause immediately.
#[derive(Debug)]
pub struct LossStreakBreaker {
    config: BreakerConfig,
    consecutive_losses: u32,
    pause_until: Option<DateTime<Utc>>,
}

impl LossStreakBreaker {
    pub fn new(config: BreakerConfig) -> Self {
        Self {
            config,
            consecutive_losses: 0,
            pause_until: None,
        }
    }

    pub fn consecutive_losses(&self) -> u32 {
        self.consecutive_losses
    }

    pub fn pause_until(&self) -> Option<DateTime<Utc>> {
        self.pause_until
    }

    /// Whether opens are currently blocked.
    pub fn is_paused(&self, now: DateTime<Utc>) -> bool {
        self.pause_until.is_some_and(|until| now < until)
    }

    /// Feed one trade resolution into the breaker. Returns `true` when
    /// this resolution started (or refreshed) a pause window.
    pub fn record(&mut self, result: TradeResult, now: DateTime<Utc>) -> bool {
        match result {
            TradeResult::Win => {
                self.consecutive_losses = 0;
                false
            }
            TradeResult::Loss => {
                self.consecutive_losses += 1;
                if self.consecutive_losses >= self.config.loss_threshold {
                    let until = now + Duration::minutes(self.config.pause_minutes);
                    self.pause_until = Some(until);
                    info!(
                        streak = self.consecutive_losses,
                        pause_until = %until,
                        "Loss streak hit threshold — pausing new entries"
                    );
                    true
                } else {
                    false
                }
            }
            TradeResult::Pending => {
                warn!("Breaker fed an unresolved trade result — ignoring");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn breaker() -> LossStreakBreaker {
        LossStreakBreaker::new(BreakerConfig::default())
    }

    #[test]
    fn three_losses_open_a_pause_window() {
        let mut b = breaker();
        let now = Utc::now();
        assert!(!b.record(TradeResult::Loss, now));
        assert!(!b.record(TradeResult::Loss, now));
        assert!(b.record(TradeResult::Loss, now));
        assert_eq!(b.pause_until(), Some(now + Duration::minutes(60)));
        assert!(b.is_paused(now));
        assert!(b.is_paused(now + Duration::minutes(59)));
        assert!(!b.is_paused(now + Duration::minutes(60)));
    }

    #[test]
    fn a_win_resets_the_streak() {
        let mut b = breaker();
        let now = Utc::now();
        b.record(TradeResult::Loss, now);
        b.record(TradeResult::Loss, now);
        b.record(TradeResult::Win, now);
        assert_eq!(b.consecutive_losses(), 0);

        // Only two losses in the new streak — no pause
        b.record(TradeResult::Loss, now);
        b.record(TradeResult::Loss, now);
        assert!(!b.is_paused(now));
        assert_eq!(b.pause_until(), None);
    }

    #[test]
    fn the_streak_survives_the_pause_and_retriggers() {
        let mut b = breaker();
        let now = Utc::now();
        for _ in 0..3 {
            b.record(TradeResult::Loss, now);
        }
        assert_eq!(b.consecutive_losses(), 3);

        // Pause expires; the very next loss re-triggers immediately
        let later = now + Duration::minutes(61);
        assert!(!b.is_paused(later));
        assert!(b.record(TradeResult::Loss, later));
        assert!(b.is_paused(later));
        assert_eq!(b.pause_until(), Some(later + Duration::minutes(60)));
    }

    #[test]
    fn a_win_during_the_pause_clears_the_streak_but_not_the_pause() {
        let mut b = breaker();
        let now = Utc::now();
        for _ in 0..3 {
            b.record(TradeResult::Loss, now);
        }
        b.record(TradeResult::Win, now + Duration::minutes(1));
        assert_eq!(b.consecutive_losses(), 0);
        assert!(b.is_paused(now + Duration::minutes(2)));
    }

    #[test]
    fn pending_results_are_ignored() {
        let mut b = breaker();
        let now = Utc::now();
        assert!(!b.record(TradeResult::Pending, now));
        assert_eq!(b.consecutive_losses(), 0);
    }
}
