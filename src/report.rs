//! CSV dump reporter (headless mode)
//!
//! Prints the full leaderboard as CSV to stdout on every refresh
//! interval. Log output goes to stderr so the CSV stream stays clean.
//! SIGINT/SIGTERM end the loop; a capture engine that stopped on its own
//! is reported as an error so the process exits non-zero.

use anyhow::Result;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

use crate::capture::CaptureEngine;
use crate::clock;
use crate::config::Config;
use crate::constants::stats::SLEEP_SLICE;
use crate::stats::StatsAggregator;

/// Run the CSV reporter until interrupted.
pub fn run_dump(
    stats: &StatsAggregator,
    capture: &CaptureEngine,
    config: &Config,
) -> Result<()> {
    let running = Arc::new(AtomicBool::new(true));
    let handler_flag = Arc::clone(&running);
    ctrlc::set_handler(move || handler_flag.store(false, Ordering::SeqCst))?;

    info!(
        "dumping CSV every {}s, sorted by {} {}",
        config.refresh_interval, config.sort_mode, config.sort_order
    );
    println!("key,calls,elapsed,rate,size,bandwidth");

    while running.load(Ordering::SeqCst) && capture.is_running() {
        // sleep the interval in slices so an interrupt lands promptly
        let mut slept = std::time::Duration::ZERO;
        let interval = config.refresh_interval();
        while slept < interval && running.load(Ordering::SeqCst) && capture.is_running() {
            let slice = SLEEP_SLICE.min(interval - slept);
            std::thread::sleep(slice);
            slept += slice;
        }
        if !running.load(Ordering::SeqCst) {
            break;
        }

        let now_ms = clock::now_ms();
        for stat in stats.get_leaders(config.sort_mode, config.sort_order) {
            println!(
                "{},{},{:.0},{:.2},{},{:.2}",
                csv_field(stat.key()),
                stat.count(),
                stat.elapsed_secs(now_ms),
                stat.request_rate(now_ms),
                stat.size(),
                stat.bandwidth(now_ms),
            );
        }
    }

    if !capture.is_running() && running.load(Ordering::SeqCst) {
        anyhow::bail!("capture engine stopped unexpectedly");
    }
    info!("dump reporter interrupted, shutting down");
    Ok(())
}

/// Quote a key if it would break the CSV framing.
fn csv_field(key: &str) -> String {
    if key.contains(',') || key.contains('"') || key.contains('\n') {
        format!("\"{}\"", key.replace('"', "\"\""))
    } else {
        key.to_string()
    }
}
