pub mod adapter;
pub mod breaker;
pub mod sizer;

pub use adapter::{AdapterConfig, ParameterAdapter};
pub use breaker::{BreakerConfig, LossStreakBreaker};
pub use sizer::{PositionSizer, SizerConfig};
