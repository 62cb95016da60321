//! Deal definition: the immutable input describing a lease transaction.

pub mod config;
pub mod definition;

pub use config::*;
pub use definition::*;
