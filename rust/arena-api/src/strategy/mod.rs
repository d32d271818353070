//! Rebuttal strategies: the immutable catalog and the per-round selector.

pub mod catalog;
pub mod selector;

pub use catalog::{Strategy, StrategyCatalog};
pub use selector::{StrategyScore, StrategySelector};
