//! Configuration type definitions

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::defaults;
use super::validation::ConfigError;
use crate::stats::{SortMode, SortOrder};

/// Read-only runtime configuration consumed by the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Packet source device name (e.g. "eth0"); required
    pub interface: String,

    /// TCP port carrying memcache traffic
    #[serde(default = "defaults::port")]
    pub port: u16,

    /// Requests/sec below which the reaper evicts an entry; 0 disables
    /// pruning
    #[serde(default)]
    pub discard_threshold: f64,

    /// Seconds between leaderboard refreshes
    #[serde(default = "defaults::refresh_interval")]
    pub refresh_interval: u64,

    /// Initial leaderboard metric
    #[serde(default)]
    pub sort_mode: SortMode,

    /// Initial leaderboard direction
    #[serde(default)]
    pub sort_order: SortOrder,

    /// Also count `GET` requests (with size 0) rather than only `VALUE`
    /// responses
    #[serde(default)]
    pub count_requests: bool,

    /// Packet capture snap length in bytes
    #[serde(default = "defaults::snaplen")]
    pub snaplen: i32,

    /// Open the interface in promiscuous mode
    #[serde(default = "defaults::promiscuous")]
    pub promiscuous: bool,

    /// Bounded capacity of the capture -> collector event queue
    #[serde(default = "defaults::queue_capacity")]
    pub queue_capacity: usize,
}

impl Config {
    /// Refresh interval as a `Duration`.
    #[must_use]
    pub const fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval)
    }

    /// Check the configuration for values the core cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        super::validation::validate(self)
    }
}
