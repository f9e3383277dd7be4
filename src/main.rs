use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};

use mctop::capture::{CaptureEngine, LiveSource};
use mctop::queue::EventQueue;
use mctop::stats::StatsAggregator;
use mctop::tui::TuiApp;
use mctop::{Args, Decoder, logging, report, tui};

fn main() -> Result<()> {
    let args = Args::parse();

    // invalid configuration is fatal before anything starts
    let config = args.resolve()?;

    let log_buffer = logging::init(args.dump);

    info!(
        "observing memcache traffic on {}:{} (discard threshold {:.2} req/s)",
        config.interface, config.port, config.discard_threshold
    );

    let queue = Arc::new(EventQueue::with_capacity(config.queue_capacity));
    let decoder = Decoder::new(config.port, config.count_requests);

    // source-open failures (permissions, unknown device) surface here,
    // before any thread exists
    let source = LiveSource::open(
        &config.interface,
        config.port,
        config.snaplen,
        config.promiscuous,
    )?;

    let mut aggregator = StatsAggregator::new(Arc::clone(&queue), config.discard_threshold);
    let mut capture = CaptureEngine::new(Box::new(source), Arc::clone(&queue), decoder);

    aggregator.start();
    capture.start()?;

    let reporter_result = if args.dump {
        report::run_dump(&aggregator, &capture, &config)
    } else {
        let log_buffer = log_buffer.unwrap_or_default();
        let app = TuiApp::new(&aggregator, &capture, log_buffer, &config);
        tui::run(app)
    };

    // distinguish a user-requested exit (engine still running) from a
    // fatal self-stop before tearing the threads down
    let capture_failed = !capture.is_running() && reporter_result.is_ok();

    capture.shutdown();
    aggregator.shutdown();
    info!("shutdown complete");

    reporter_result?;
    if capture_failed {
        warn!("exiting after capture failure");
        anyhow::bail!("capture stopped unexpectedly; see debug.log");
    }
    Ok(())
}
