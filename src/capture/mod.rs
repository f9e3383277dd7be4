//! Packet capture engine
//!
//! Owns the packet source and the capture thread: pull a frame, strip the
//! link/IP/TCP headers, run the protocol decoder, publish events to the
//! queue. Startup and shutdown are coordinated through the shared
//! lifecycle state; the pcap read timeout keeps the loop responsive to a
//! stop request even when no packets arrive.

mod error;
mod frame;
mod source;

pub use error::CaptureError;
pub use frame::{TcpSegment, tcp_segment};
pub use source::{FramePoll, FrameSource, LinkType, LiveSource};

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::JoinHandle;
use tracing::{error, info, trace, warn};

use crate::constants::capture::MAX_CONSECUTIVE_READ_FAILURES;
use crate::lifecycle::{LifecycleState, State};
use crate::protocol::Decoder;
use crate::queue::EventQueue;

/// Counter snapshot for the UI and logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaptureStats {
    /// Frames pulled from the source
    pub packets: u64,
    /// Frames we could not walk down to a TCP payload
    pub decode_skips: u64,
    /// Source read failures (transient and fatal)
    pub read_failures: u64,
    /// Events lost to a full queue
    pub events_dropped: u64,
}

struct EngineShared {
    state: LifecycleState,
    queue: Arc<EventQueue>,
    decoder: Decoder,
    packets: AtomicU64,
    decode_skips: AtomicU64,
    read_failures: AtomicU64,
}

/// The capture engine: one source, one thread, one queue.
pub struct CaptureEngine {
    shared: Arc<EngineShared>,
    source: Option<Box<dyn FrameSource>>,
    handle: Option<JoinHandle<()>>,
}

impl CaptureEngine {
    /// Build an engine around an already-opened source.
    #[must_use]
    pub fn new(source: Box<dyn FrameSource>, queue: Arc<EventQueue>, decoder: Decoder) -> Self {
        Self {
            shared: Arc::new(EngineShared {
                state: LifecycleState::new(),
                queue,
                decoder,
                packets: AtomicU64::new(0),
                decode_skips: AtomicU64::new(0),
                read_failures: AtomicU64::new(0),
            }),
            source: Some(source),
            handle: None,
        }
    }

    /// Transition `New -> Running` and spawn the capture thread.
    ///
    /// Unsupported link types and thread-spawn failures are fatal and
    /// reported here, before the engine ever runs. A double start is a
    /// warning, not an error.
    pub fn start(&mut self) -> Result<(), CaptureError> {
        let Some(source) = self.source.take() else {
            warn!("capture engine already started");
            return Ok(());
        };

        if let LinkType::Other(link_type) = source.link_type() {
            return Err(CaptureError::UnsupportedLinkType {
                interface: source.describe(),
                link_type,
            });
        }

        if !self.shared.state.check_and_set(State::New, State::Running) {
            warn!(
                "capture engine in state '{}', not starting",
                self.shared.state.current()
            );
            return Ok(());
        }

        info!("starting capture on '{}'", source.describe());
        let shared = Arc::clone(&self.shared);
        let handle = std::thread::Builder::new()
            .name("mctop-capture".to_string())
            .spawn(move || capture_loop(source, &shared))
            .map_err(|e| {
                // roll back so the engine is not stuck in Running with no thread
                self.shared.state.check_and_set(State::Running, State::Stopping);
                CaptureError::Spawn(e)
            })?;
        self.handle = Some(handle);
        Ok(())
    }

    /// Transition `Running -> Stopping` and join the capture thread.
    ///
    /// Bounded: the thread re-checks the lifecycle at least once per
    /// source read timeout.
    pub fn shutdown(&mut self) {
        if self.shared.state.check_and_set(State::Running, State::Stopping) {
            info!("stopping capture engine");
        } else {
            warn!(
                "capture engine not running (state '{}')",
                self.shared.state.current()
            );
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("capture thread panicked");
            }
        }
    }

    /// Whether the capture thread should be (or is about to be) running.
    ///
    /// The controller watches this leave `true` to detect a fatal
    /// self-stop that happened without an external `shutdown()`.
    pub fn is_running(&self) -> bool {
        self.shared.state.is_running()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> State {
        self.shared.state.current()
    }

    /// Snapshot of the capture counters.
    pub fn stats(&self) -> CaptureStats {
        CaptureStats {
            packets: self.shared.packets.load(Ordering::Relaxed),
            decode_skips: self.shared.decode_skips.load(Ordering::Relaxed),
            read_failures: self.shared.read_failures.load(Ordering::Relaxed),
            events_dropped: self.shared.queue.dropped(),
        }
    }
}

impl Drop for CaptureEngine {
    fn drop(&mut self) {
        // make sure the thread is gone before the engine is
        self.shared.state.check_and_set(State::Running, State::Stopping);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("capture thread panicked during drop");
            }
        }
        self.shared.state.check_and_set(State::Stopping, State::Terminated);
    }
}

fn capture_loop(mut source: Box<dyn FrameSource>, shared: &EngineShared) {
    info!("capture thread started");
    let mut consecutive_failures = 0u32;

    while shared.state.is_running() {
        match source.poll() {
            Ok(FramePoll::Frame(raw)) => {
                consecutive_failures = 0;
                shared.packets.fetch_add(1, Ordering::Relaxed);
                match frame::tcp_segment(&raw) {
                    Some(segment) => {
                        for event in shared.decoder.decode(
                            segment.src_port,
                            segment.dst_port,
                            segment.payload,
                        ) {
                            if !shared.queue.produce(event) {
                                trace!("event queue full, event dropped");
                            }
                        }
                    }
                    None => {
                        shared.decode_skips.fetch_add(1, Ordering::Relaxed);
                        trace!("skipped undecodable frame ({} bytes)", raw.len());
                    }
                }
            }
            Ok(FramePoll::TimedOut) => {
                // idle tick; loop re-checks the lifecycle state
            }
            Err(e) => {
                consecutive_failures += 1;
                shared.read_failures.fetch_add(1, Ordering::Relaxed);
                warn!("transient capture failure ({}): {}", consecutive_failures, e);
                if consecutive_failures >= MAX_CONSECUTIVE_READ_FAILURES {
                    error!(
                        "{} consecutive read failures, capture stopping",
                        consecutive_failures
                    );
                    // fatal-error channel: leave Running without an external shutdown()
                    shared.state.check_and_set(State::Running, State::Stopping);
                }
            }
        }
    }

    info!("capture thread stopped");
    // the source (and with it the pcap handle) is released here on every
    // exit path
    drop(source);
}
