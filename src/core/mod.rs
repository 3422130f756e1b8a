//! Core business logic abstractions

pub mod cache;
pub mod category;
pub mod config;
pub mod error;
pub mod fund;
pub mod log;
pub mod matcher;
pub mod orchestrator;
pub mod pipeline;
pub mod ranker;
pub mod scorer;

// Re-export main types for cleaner imports
pub use category::{CategoryResult, CategorySpec, FundFamily};
pub use error::RankError;
pub use fund::{Direction, FundDataProvider, MergedFund, Metric, RawFund, WeightSpec};
pub use ranker::{RankTable, TieMode};
