//! # mctop
//!
//! A passive observer for memcache traffic: sniffs a network interface,
//! reconstructs `GET`/`VALUE` operations from the ASCII protocol, and
//! aggregates per-key statistics into a continuously refreshed "top keys"
//! leaderboard.
//!
//! ## Architecture
//!
//! The pipeline runs on three OS threads coordinated through a small
//! atomic lifecycle state machine:
//!
//! - **capture**: pulls frames from the packet source, walks the
//!   link/IP/TCP headers, runs the protocol decoder, and publishes
//!   `(key, size)` events to a bounded queue
//! - **collector**: drains the queue into the hash-indexed stat table,
//!   backing off exponentially while it is empty
//! - **reaper**: periodically evicts keys whose request rate fell below
//!   the discard threshold, bounding memory on busy servers
//!
//! The reporter (TUI or CSV dump) only ever takes ranked snapshots; it
//! never holds the collection lock across a render.
//!
//! Observation is passive and sampled: the queue drops events under
//! pressure rather than exerting backpressure on capture.

// Module declarations
pub mod args;
pub mod backoff;
pub mod capture;
pub mod clock;
pub mod config;
pub mod constants;
pub mod formatting;
pub mod lifecycle;
pub mod logging;
pub mod protocol;
pub mod queue;
pub mod report;
pub mod stats;
pub mod tui;

// Public exports
pub use args::Args;
pub use backoff::Backoff;
pub use capture::{CaptureEngine, CaptureError, FrameSource, LiveSource};
pub use config::{Config, create_default_config, load_config};
pub use lifecycle::{LifecycleState, State};
pub use protocol::Decoder;
pub use queue::{Event, EventQueue};
pub use stats::{SortMode, SortOrder, Stat, StatsAggregator};
