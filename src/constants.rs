//! Constants used throughout mctop
//!
//! Centralizes magic numbers so tuning lives in one place.

use std::time::Duration;

/// Memcache protocol constants
pub mod protocol {
    /// Default memcache TCP port
    pub const DEFAULT_PORT: u16 = 11211;

    /// Line ending: "\r\n"
    pub const CRLF: &[u8] = b"\r\n";
}

/// Packet capture constants
pub mod capture {
    /// Read timeout on the packet source; bounds how long the capture
    /// thread can block without re-checking the lifecycle state
    pub const READ_TIMEOUT_MS: i32 = 250;

    /// Default snap length; large enough for any VALUE header line plus
    /// typical value payloads
    pub const DEFAULT_SNAPLEN: i32 = 65_535;

    /// Consecutive source read failures tolerated before the capture
    /// engine escalates to a fatal self-stop
    pub const MAX_CONSECUTIVE_READ_FAILURES: u32 = 8;
}

/// Statistics engine constants
pub mod stats {
    use super::Duration;

    /// Ceiling for the collector's idle backoff
    pub const BACKOFF_CEILING_MS: u64 = 1000;

    /// How often the reaper scans for low-rate entries
    pub const REAP_INTERVAL: Duration = Duration::from_secs(5);

    /// Sleep slice used by worker threads while idling between scans, so
    /// a shutdown request is observed promptly
    pub const SLEEP_SLICE: Duration = Duration::from_millis(250);
}

/// Event queue constants
pub mod queue {
    /// Default bounded capacity of the capture -> collector queue
    pub const DEFAULT_CAPACITY: usize = 16_384;
}
