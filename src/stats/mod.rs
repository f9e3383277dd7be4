//! Per-key statistics aggregation and leaderboards

mod aggregator;
mod stat;

pub use aggregator::StatsAggregator;
pub use stat::{Stat, SortMode, SortOrder, hash_key, rank};
