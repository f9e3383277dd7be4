//! Command-line argument parsing
//!
//! CLI flags override the config file, which the `MCTOP_*` environment
//! variables already override; precedence is CLI > env > file > defaults.

use anyhow::Result;
use clap::Parser;

use crate::config::{Config, create_default_config, load_config};
use crate::stats::{SortMode, SortOrder};

fn parse_port(s: &str) -> Result<u16, String> {
    let port: u16 = s
        .parse()
        .map_err(|e| format!("Invalid port number: {}", e))?;
    if port == 0 {
        return Err("Port must not be 0".to_string());
    }
    Ok(port)
}

/// Command-line arguments for the observer
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Passive memcache traffic observer", long_about = None)]
pub struct Args {
    /// Interface to sniff (required here or in the config file)
    #[arg(short, long, env = "MCTOP_INTERFACE")]
    pub interface: Option<String>,

    /// TCP port carrying memcache traffic
    #[arg(short, long, value_parser = parse_port)]
    pub port: Option<u16>,

    /// Evict keys below this requests/sec rate (0 disables pruning)
    #[arg(short, long)]
    pub discard_threshold: Option<f64>,

    /// Seconds between display refreshes
    #[arg(short, long)]
    pub refresh_interval: Option<u64>,

    /// Initial leaderboard metric
    #[arg(long, value_enum)]
    pub sort_mode: Option<SortMode>,

    /// Initial leaderboard direction
    #[arg(long, value_enum)]
    pub sort_order: Option<SortOrder>,

    /// Count GET requests too, not just VALUE responses
    #[arg(long)]
    pub count_requests: bool,

    /// Print the leaderboard as CSV to stdout instead of the TUI
    #[arg(long)]
    pub dump: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<String>,

    /// Packet capture snap length in bytes
    #[arg(long)]
    pub snaplen: Option<i32>,

    /// Do not put the interface into promiscuous mode
    #[arg(long)]
    pub no_promiscuous: bool,
}

impl Args {
    /// Resolve the final configuration: file (if given), env overrides,
    /// then these flags on top. Validates before returning.
    pub fn resolve(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => {
                let interface = self.interface.clone().ok_or_else(|| {
                    anyhow::anyhow!("No interface given (use --interface or a config file)")
                })?;
                create_default_config(&interface)
            }
        };

        if let Some(interface) = &self.interface {
            config.interface = interface.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(threshold) = self.discard_threshold {
            config.discard_threshold = threshold;
        }
        if let Some(interval) = self.refresh_interval {
            config.refresh_interval = interval;
        }
        if let Some(mode) = self.sort_mode {
            config.sort_mode = mode;
        }
        if let Some(order) = self.sort_order {
            config.sort_order = order;
        }
        if self.count_requests {
            config.count_requests = true;
        }
        if let Some(snaplen) = self.snaplen {
            config.snaplen = snaplen;
        }
        if self.no_promiscuous {
            config.promiscuous = false;
        }

        config.validate()?;
        Ok(config)
    }
}
