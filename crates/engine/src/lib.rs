pub mod binance;
pub mod lifecycle;
pub mod ticks;

pub use binance::BinanceClient;
pub use lifecycle::{EngineConfig, EngineDeps, PositionBook, TradeEngine};
pub use ticks::{run_monitor_loop, run_report_loop, run_signal_loop};
