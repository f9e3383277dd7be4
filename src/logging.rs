//! Centralized logging setup with dual output (stdout or TUI buffer +
//! debug.log)

use tracing_subscriber::Layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::tui::LogBuffer;

fn env_filter() -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
}

/// Initialize logging for the selected mode.
///
/// Headless (CSV dump) mode logs to stderr; TUI mode logs into an
/// in-memory buffer rendered in the log pane, so log lines never corrupt
/// the alternate screen. Both modes also write to `debug.log`. The level
/// comes from `RUST_LOG` and defaults to "info".
///
/// The appender guard is forgotten to keep the file writer alive for the
/// program lifetime.
pub fn init(headless: bool) -> Option<LogBuffer> {
    let file_appender = tracing_appender::rolling::never(".", "debug.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    if headless {
        let file_layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_filter(env_filter());

        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_filter(env_filter()),
            )
            .with(file_layer)
            .init();
        std::mem::forget(_guard);
        return None;
    }

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_filter(env_filter());

    let log_buffer = LogBuffer::new();
    let log_writer = crate::tui::LogMakeWriter::new(log_buffer.clone());

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(log_writer)
                .with_ansi(false)
                .with_target(false)
                .compact()
                .with_filter(env_filter()),
        )
        .with(file_layer)
        .init();

    std::mem::forget(_guard);
    Some(log_buffer)
}
