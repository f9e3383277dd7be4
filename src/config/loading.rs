//! Configuration loading from files and environment variables
//!
//! Environment variables take precedence over the config file so
//! containerized deployments can override values without editing it.

use anyhow::Result;
use tracing::debug;

use super::defaults;
use super::types::Config;
use crate::stats::{SortMode, SortOrder};

/// Load configuration from a TOML file, apply `MCTOP_*` environment
/// overrides, and validate.
///
/// Every config field has a matching variable: `MCTOP_INTERFACE`,
/// `MCTOP_PORT`, `MCTOP_DISCARD_THRESHOLD`, `MCTOP_REFRESH_INTERVAL`,
/// `MCTOP_SORT_MODE`, `MCTOP_SORT_ORDER`, `MCTOP_COUNT_REQUESTS`,
/// `MCTOP_SNAPLEN`, `MCTOP_PROMISCUOUS`, `MCTOP_QUEUE_CAPACITY`.
pub fn load_config(config_path: &str) -> Result<Config> {
    let content = std::fs::read_to_string(config_path)
        .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", config_path, e))?;

    let mut config: Config = toml::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Failed to parse config file '{}': {}", config_path, e))?;

    apply_env_overrides(&mut config);
    config.validate()?;
    Ok(config)
}

/// Default configuration for the named interface.
#[must_use]
pub fn create_default_config(interface: &str) -> Config {
    Config {
        interface: interface.to_string(),
        port: defaults::port(),
        discard_threshold: 0.0,
        refresh_interval: defaults::refresh_interval(),
        sort_mode: SortMode::default(),
        sort_order: SortOrder::default(),
        count_requests: false,
        snaplen: defaults::snaplen(),
        promiscuous: defaults::promiscuous(),
        queue_capacity: defaults::queue_capacity(),
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn apply_env_overrides(config: &mut Config) {
    if let Some(interface) = env_var("MCTOP_INTERFACE") {
        debug!("overriding interface from environment: {}", interface);
        config.interface = interface;
    }
    if let Some(port) = env_var("MCTOP_PORT").and_then(|v| v.parse().ok()) {
        config.port = port;
    }
    if let Some(threshold) = env_var("MCTOP_DISCARD_THRESHOLD").and_then(|v| v.parse().ok()) {
        config.discard_threshold = threshold;
    }
    if let Some(interval) = env_var("MCTOP_REFRESH_INTERVAL").and_then(|v| v.parse().ok()) {
        config.refresh_interval = interval;
    }
    if let Some(mode) = env_var("MCTOP_SORT_MODE").and_then(|v| parse_sort_mode(&v)) {
        config.sort_mode = mode;
    }
    if let Some(order) = env_var("MCTOP_SORT_ORDER").and_then(|v| parse_sort_order(&v)) {
        config.sort_order = order;
    }
    if let Some(count) = env_var("MCTOP_COUNT_REQUESTS").and_then(|v| parse_bool(&v)) {
        config.count_requests = count;
    }
    if let Some(snaplen) = env_var("MCTOP_SNAPLEN").and_then(|v| v.parse().ok()) {
        config.snaplen = snaplen;
    }
    if let Some(promiscuous) = env_var("MCTOP_PROMISCUOUS").and_then(|v| parse_bool(&v)) {
        config.promiscuous = promiscuous;
    }
    if let Some(capacity) = env_var("MCTOP_QUEUE_CAPACITY").and_then(|v| v.parse().ok()) {
        config.queue_capacity = capacity;
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

fn parse_sort_mode(value: &str) -> Option<SortMode> {
    match value.to_ascii_lowercase().as_str() {
        "calls" => Some(SortMode::Calls),
        "size" => Some(SortMode::Size),
        "reqrate" => Some(SortMode::ReqRate),
        "bw" => Some(SortMode::Bandwidth),
        _ => None,
    }
}

fn parse_sort_order(value: &str) -> Option<SortOrder> {
    match value.to_ascii_lowercase().as_str() {
        "asc" => Some(SortOrder::Asc),
        "desc" => Some(SortOrder::Desc),
        _ => None,
    }
}
