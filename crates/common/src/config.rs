use crate::TradingMode;

/// All configuration loaded from environment variables at startup.
/// Missing required variables cause an immediate panic with a clear message.
#[derive(Debug, Clone)]
pub struct Config {
    // Exchange credentials (unused in paper mode)
    pub binance_api_key: String,
    pub binance_secret: String,

    // Telegram
    pub telegram_token: String,
    pub telegram_chat_ids: Vec<i64>,

    // Trading
    pub trading_mode: TradingMode,
    pub symbols: Vec<String>,
    pub quote_asset: String,
    pub paper_slippage_bps: f64,
    pub paper_balance: f64,

    // Persistence
    pub history_path: String,

    // Tuning file (strategy params + risk knobs), optional
    pub tuning_path: String,
}

impl Config {
    /// Load all configuration from environment variables.
    /// Loads `.env` if present. Panics on any missing required variable.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // ignore error if .env not present

        let trading_mode = match required_env("TRADING_MODE").to_lowercase().as_str() {
            "paper" => TradingMode::Paper,
            "live" => TradingMode::Live,
            other => panic!("ERROR: TRADING_MODE must be 'paper' or 'live', got: '{other}'"),
        };

        // Credentials are only required when real orders will be placed.
        let (binance_api_key, binance_secret) = match trading_mode {
            TradingMode::Live => (required_env("BINANCE_API_KEY"), required_env("BINANCE_SECRET")),
            TradingMode::Paper => (
                optional_env("BINANCE_API_KEY").unwrap_or_default(),
                optional_env("BINANCE_SECRET").unwrap_or_default(),
            ),
        };

        let telegram_chat_ids = required_env("TELEGRAM_CHAT_IDS")
            .split(',')
            .map(|s| {
                s.trim().parse::<i64>().unwrap_or_else(|_| {
                    panic!("TELEGRAM_CHAT_IDS contains non-numeric ID: '{}'", s.trim())
                })
            })
            .collect();

        let symbols = optional_env("SYMBOLS")
            .unwrap_or_else(|| "BTCUSDT,ETHUSDT,SOLUSDT,AVAXUSDT,PEPEUSDT".to_string())
            .split(',')
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect();

        Config {
            binance_api_key,
            binance_secret,
            telegram_token: required_env("TELEGRAM_TOKEN"),
            telegram_chat_ids,
            trading_mode,
            symbols,
            quote_asset: optional_env("QUOTE_ASSET").unwrap_or_else(|| "USDT".to_string()),
            paper_slippage_bps: optional_env("PAPER_SLIPPAGE_BPS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(10.0),
            paper_balance: optional_env("PAPER_BALANCE")
                .and_then(|v| v.parse().ok())
                .unwrap_or(10_000.0),
            history_path: optional_env("HISTORY_PATH")
                .unwrap_or_else(|| "data/trade_history.json".to_string()),
            tuning_path: optional_env("TUNING_PATH")
                .unwrap_or_else(|| "config/quorum.toml".to_string()),
        }
    }
}

fn required_env(key: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| {
        panic!("Required environment variable '{key}' is not set. Check your .env file.")
    })
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}
