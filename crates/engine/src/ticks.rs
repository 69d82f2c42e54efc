use std::sync::Arc;
use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};
use tracing::info;

use crate::lifecycle::TradeEngine;

/// Primary tick: fetch fresh series, evaluate signals, maybe open.
/// Fires immediately on startup, then every `signal_period_secs`.
pub async fn run_signal_loop(engine: Arc<TradeEngine>) {
    let period = Duration::from_secs(engine.config().signal_period_secs);
    info!(period_secs = period.as_secs(), "Signal loop running");
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        engine.signal_tick().await;
    }
}

/// Monitoring tick: exit evaluation over every open position, on its own
/// faster schedule.
pub async fn run_monitor_loop(engine: Arc<TradeEngine>) {
    let period = Duration::from_secs(engine.config().monitor_period_secs);
    info!(period_secs = period.as_secs(), "Monitor loop running");
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        engine.monitor_tick().await;
    }
}

/// Statistics report on a slow schedule. The immediate first tick is
/// consumed so the first report goes out one full period after startup.
pub async fn run_report_loop(engine: Arc<TradeEngine>) {
    let period = Duration::from_secs(engine.config().report_period_secs);
    info!(period_secs = period.as_secs(), "Report loop running");
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker.tick().await;
    loop {
        ticker.tick().await;
        engine.report().await;
    }
}
