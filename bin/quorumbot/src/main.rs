use std::sync::Arc;

use serde::Deserialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use common::{Config, ExecutionVenue, MarketData, Notifier, TradingMode};
use engine::{EngineConfig, EngineDeps, BinanceClient, TradeEngine};
use journal::{JsonFileStore, TradeJournal};
use paper::PaperVenue;
use risk::{
    AdapterConfig, BreakerConfig, LossStreakBreaker, ParameterAdapter, PositionSizer, SizerConfig,
};
use strategy::StrategyParams;
use telegram_notify::TelegramNotifier;

/// Optional TOML tuning file overlaying the compiled-in defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TuningFile {
    engine: EngineConfig,
    sizer: SizerConfig,
    breaker: BreakerConfig,
    adapter: AdapterConfig,
    params: StrategyParams,
}

fn load_tuning(path: &str) -> TuningFile {
    match std::fs::read_to_string(path) {
        Ok(content) => toml::from_str(&content)
            .unwrap_or_else(|e| panic!("Failed to parse tuning file '{path}': {e}")),
        Err(_) => {
            info!(path, "No tuning file — using built-in defaults");
            TuningFile::default()
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── Logging ──────────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    // ── Config ────────────────────────────────────────────────────────────────
    let cfg = Config::from_env();
    info!(mode = %cfg.trading_mode, symbols = ?cfg.symbols, "QuorumBot starting");
    let tuning = load_tuning(&cfg.tuning_path);

    // ── Trade history ─────────────────────────────────────────────────────────
    let journal = TradeJournal::load(Box::new(JsonFileStore::new(&cfg.history_path)))
        .await
        .map_err(|e| anyhow::anyhow!("failed to load trade history: {e}"))?;
    info!(
        closed = journal.closed().len(),
        path = %cfg.history_path,
        "Trade history loaded"
    );

    // ── Market data + execution venue (injected based on TRADING_MODE) ────────
    let binance = Arc::new(BinanceClient::new(&cfg.binance_api_key, &cfg.binance_secret));
    let market: Arc<dyn MarketData> = binance.clone();
    let venue: Arc<dyn ExecutionVenue> = match cfg.trading_mode {
        TradingMode::Live => {
            info!("Live trading mode — orders go to Binance");
            binance.clone()
        }
        TradingMode::Paper => {
            info!(
                slippage_bps = cfg.paper_slippage_bps,
                balance = cfg.paper_balance,
                "Paper trading mode — fills are simulated"
            );
            Arc::new(
                PaperVenue::new(&cfg.quote_asset, cfg.paper_balance, cfg.paper_slippage_bps)
                    .with_price_source(binance.clone()),
            )
        }
    };

    // ── Startup equity probe — venue unreachable here is fatal ────────────────
    let initial_equity = venue
        .free_balance(&cfg.quote_asset)
        .await
        .map_err(|e| anyhow::anyhow!("cannot reach the execution venue at startup: {e}"))?;
    info!(equity = initial_equity, quote = %cfg.quote_asset, "Initial equity");

    // ── Notifications ─────────────────────────────────────────────────────────
    let notifier: Arc<dyn Notifier> =
        Arc::new(TelegramNotifier::new(&cfg.telegram_token, &cfg.telegram_chat_ids));
    notifier
        .send(&format!(
            "🤖 QuorumBot started in {} mode — equity ${:.2}",
            cfg.trading_mode, initial_equity
        ))
        .await;

    // ── Engine ────────────────────────────────────────────────────────────────
    let engine = Arc::new(TradeEngine::new(
        tuning.engine,
        cfg.symbols.clone(),
        cfg.quote_asset.clone(),
        initial_equity,
        EngineDeps {
            market,
            venue,
            notifier,
            sizer: PositionSizer::new(tuning.sizer),
            breaker: LossStreakBreaker::new(tuning.breaker),
            adapter: ParameterAdapter::new(tuning.adapter),
            params: tuning.params,
            journal,
        },
    ));

    // ── Spawn the periodic activities ─────────────────────────────────────────
    tokio::spawn(engine::run_signal_loop(engine.clone()));
    tokio::spawn(engine::run_monitor_loop(engine.clone()));
    tokio::spawn(engine::run_report_loop(engine.clone()));

    info!("All subsystems started. Waiting for shutdown signal.");
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received. Exiting.");
    Ok(())
}
