pub mod config;
pub mod error;
pub mod exchange;
pub mod notify;
pub mod types;

pub use config::Config;
pub use error::{Error, Result, VenueErrorKind};
pub use exchange::{ExecutionVenue, MarketData};
pub use notify::{Notifier, NullNotifier};
pub use types::*;
