pub mod analysis;
pub mod calendar;
pub mod deal;
pub mod error;
pub mod metrics;
pub mod normalize;
pub mod schedule;
pub mod time_value;
pub mod types;

#[cfg(feature = "scenarios")]
pub mod scenarios;

pub use error::LeaseEconError;
pub use types::*;

/// Standard result type for all lease-economics operations
pub type LeaseEconResult<T> = Result<T, LeaseEconError>;
