pub mod amortize;
pub mod analyze;
pub mod scenarios;
pub mod schedule;
