//! Per-key statistics and leaderboard ordering

use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Stable 64-bit hash of a key; the primary index of the collection.
#[must_use]
pub fn hash_key(key: &str) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    key.hash(&mut hasher);
    hasher.finish()
}

/// Aggregate for a single cache key.
///
/// Timestamps are monotonic milliseconds from [`crate::clock`]. Derived
/// quantities (elapsed, request rate, bandwidth) take `now_ms` explicitly
/// so a whole snapshot is ranked against one consistent instant.
#[derive(Debug, Clone, PartialEq)]
pub struct Stat {
    key: String,
    key_hash: u64,
    count: u64,
    size: u32,
    first_seen: u64,
    last_seen: u64,
}

impl Stat {
    /// First observation of a key.
    #[must_use]
    pub fn new(key: impl Into<String>, size: u32, now_ms: u64) -> Self {
        let key = key.into();
        let key_hash = hash_key(&key);
        Self {
            key,
            key_hash,
            count: 1,
            size,
            first_seen: now_ms,
            last_seen: now_ms,
        }
    }

    /// Record another observation: bump the counter, remember the most
    /// recent size and key spelling.
    pub fn observe(&mut self, key: &str, size: u32, now_ms: u64) {
        if self.key != key {
            // hash collision: most recent spelling wins
            self.key = key.to_string();
        }
        self.size = size;
        self.count += 1;
        self.last_seen = self.last_seen.max(now_ms);
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn key_hash(&self) -> u64 {
        self.key_hash
    }

    #[must_use]
    pub fn count(&self) -> u64 {
        self.count
    }

    #[must_use]
    pub fn size(&self) -> u32 {
        self.size
    }

    #[must_use]
    pub fn first_seen(&self) -> u64 {
        self.first_seen
    }

    #[must_use]
    pub fn last_seen(&self) -> u64 {
        self.last_seen
    }

    /// Seconds since first observation, never less than one so the rates
    /// below stay finite and a brand-new key is not infinitely hot.
    #[must_use]
    pub fn elapsed_secs(&self, now_ms: u64) -> f64 {
        (now_ms.saturating_sub(self.first_seen) as f64 / 1000.0).max(1.0)
    }

    /// Requests per second since first observation.
    #[must_use]
    pub fn request_rate(&self, now_ms: u64) -> f64 {
        self.count as f64 / self.elapsed_secs(now_ms)
    }

    /// Bytes per second: count x last-observed size over elapsed time.
    #[must_use]
    pub fn bandwidth(&self, now_ms: u64) -> f64 {
        (self.count as f64 * f64::from(self.size)) / self.elapsed_secs(now_ms)
    }

    /// Test-only constructor with hand-chosen counters and timestamps.
    #[doc(hidden)]
    #[must_use]
    pub fn synthetic(key: &str, count: u64, size: u32, first_seen: u64, last_seen: u64) -> Self {
        Self {
            key: key.to_string(),
            key_hash: hash_key(key),
            count,
            size,
            first_seen,
            last_seen,
        }
    }
}

/// Leaderboard metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// Total request count
    #[default]
    Calls,
    /// Last observed value size
    Size,
    /// Requests per second since first seen
    #[value(name = "reqrate")]
    #[serde(rename = "reqrate")]
    ReqRate,
    /// Bytes per second since first seen
    #[value(name = "bw")]
    #[serde(rename = "bw")]
    Bandwidth,
}

impl SortMode {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Calls => "calls",
            Self::Size => "size",
            Self::ReqRate => "reqrate",
            Self::Bandwidth => "bw",
        }
    }
}

impl std::fmt::Display for SortMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Leaderboard direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    /// Flip the direction (UI hotkey).
    #[must_use]
    pub const fn toggled(&self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order a snapshot: descending by the chosen metric, ties broken by key
/// hash ascending so the result is deterministic, then reversed exactly
/// for ascending order.
pub fn rank(stats: &mut [Stat], mode: SortMode, order: SortOrder, now_ms: u64) {
    stats.sort_by(|a, b| {
        let by_metric = match mode {
            SortMode::Calls => b.count.cmp(&a.count),
            SortMode::Size => b.size.cmp(&a.size),
            SortMode::ReqRate => b.request_rate(now_ms).total_cmp(&a.request_rate(now_ms)),
            SortMode::Bandwidth => b.bandwidth(now_ms).total_cmp(&a.bandwidth(now_ms)),
        };
        by_metric.then_with(|| a.key_hash.cmp(&b.key_hash))
    });
    if order == SortOrder::Asc {
        stats.reverse();
    }
}
