//! Configuration validation
//!
//! All of these are fatal before any thread starts: the controller turns
//! them into a non-zero exit.

use thiserror::Error;

use super::types::Config;

/// A configuration value the core cannot run with
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("interface must not be empty")]
    EmptyInterface,

    #[error("port must not be 0")]
    ZeroPort,

    #[error("discard threshold must not be negative (got {0})")]
    NegativeDiscardThreshold(f64),

    #[error("refresh interval must be at least 1 second")]
    ZeroRefreshInterval,

    #[error("snap length {0} is too small to hold a VALUE header line")]
    SnaplenTooSmall(i32),

    #[error("event queue capacity must not be 0")]
    ZeroQueueCapacity,
}

/// Smallest snaplen that still covers the link/IP/TCP headers plus a
/// usable slice of the first line.
const MIN_SNAPLEN: i32 = 128;

pub(super) fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.interface.is_empty() {
        return Err(ConfigError::EmptyInterface);
    }
    if config.port == 0 {
        return Err(ConfigError::ZeroPort);
    }
    if config.discard_threshold < 0.0 {
        return Err(ConfigError::NegativeDiscardThreshold(
            config.discard_threshold,
        ));
    }
    if config.refresh_interval == 0 {
        return Err(ConfigError::ZeroRefreshInterval);
    }
    if config.snaplen < MIN_SNAPLEN {
        return Err(ConfigError::SnaplenTooSmall(config.snaplen));
    }
    if config.queue_capacity == 0 {
        return Err(ConfigError::ZeroQueueCapacity);
    }
    Ok(())
}
