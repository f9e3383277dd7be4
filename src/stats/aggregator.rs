//! The stats aggregator: keyed table, collector thread, reaper thread
//!
//! The collection is guarded by one writer-exclusive mutex. The collector
//! drains the event queue into it; the reaper periodically evicts entries
//! whose request rate fell below the configured threshold, which bounds
//! memory on busy servers. Leaderboard queries snapshot under the lock and
//! sort outside it.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, error, info, trace, warn};

use crate::backoff::Backoff;
use crate::clock;
use crate::constants::stats::{REAP_INTERVAL, SLEEP_SLICE};
use crate::lifecycle::{LifecycleState, State};
use crate::queue::EventQueue;
use crate::stats::stat::{Stat, SortMode, SortOrder, hash_key, rank};

/// Hash-indexed stat table. Keying is by hash alone: two distinct keys
/// that collide share an entry and the most recent spelling wins.
type StatCollection = HashMap<u64, Stat>;

struct AggregatorShared {
    collection: Mutex<StatCollection>,
    // approximate mirror of the collection size, readable without the lock
    stat_count: AtomicUsize,
    state: LifecycleState,
    queue: Arc<EventQueue>,
    discard_threshold: f64,
    reap_interval: Duration,
}

/// Owns the stat collection and its two worker threads.
pub struct StatsAggregator {
    shared: Arc<AggregatorShared>,
    collector: Option<JoinHandle<()>>,
    reaper: Option<JoinHandle<()>>,
}

impl StatsAggregator {
    /// Create an aggregator draining `queue`. Entries whose request rate
    /// falls below `discard_threshold` (requests/sec) are reaped;
    /// 0 disables reaping.
    #[must_use]
    pub fn new(queue: Arc<EventQueue>, discard_threshold: f64) -> Self {
        Self::with_reap_interval(queue, discard_threshold, REAP_INTERVAL)
    }

    /// As [`StatsAggregator::new`] with a custom reap cadence (tests).
    #[must_use]
    pub fn with_reap_interval(
        queue: Arc<EventQueue>,
        discard_threshold: f64,
        reap_interval: Duration,
    ) -> Self {
        Self {
            shared: Arc::new(AggregatorShared {
                collection: Mutex::new(StatCollection::new()),
                stat_count: AtomicUsize::new(0),
                state: LifecycleState::new(),
                queue,
                discard_threshold,
                reap_interval,
            }),
            collector: None,
            reaper: None,
        }
    }

    /// Transition `New -> Running` and spawn the collector and reaper.
    pub fn start(&mut self) {
        if !self.shared.state.check_and_set(State::New, State::Running) {
            warn!("stats engine already started");
            return;
        }
        info!("starting stats engine");

        let shared = Arc::clone(&self.shared);
        self.reaper = std::thread::Builder::new()
            .name("mctop-reaper".to_string())
            .spawn(move || reap_loop(&shared))
            .map_err(|e| error!("failed to spawn reaper thread: {}", e))
            .ok();

        let shared = Arc::clone(&self.shared);
        self.collector = std::thread::Builder::new()
            .name("mctop-collector".to_string())
            .spawn(move || collect_loop(&shared))
            .map_err(|e| error!("failed to spawn collector thread: {}", e))
            .ok();
    }

    /// Transition `Running -> Stopping` and join reaper then collector.
    ///
    /// Bounded: the collector sleeps at most the backoff ceiling and the
    /// reaper re-checks the lifecycle every sleep slice.
    pub fn shutdown(&mut self) {
        if !self.shared.state.check_and_set(State::Running, State::Stopping) {
            warn!(
                "stats engine not running (state '{}')",
                self.shared.state.current()
            );
            return;
        }
        info!("stopping stats engine");
        if let Some(handle) = self.reaper.take() {
            if handle.join().is_err() {
                error!("reaper thread panicked");
            } else {
                debug!("reaper thread joined");
            }
        }
        if let Some(handle) = self.collector.take() {
            if handle.join().is_err() {
                error!("collector thread panicked");
            } else {
                debug!("collector thread joined");
            }
        }
    }

    /// Record one observation of `key` with value size `size`.
    pub fn increment(&self, key: &str, size: u32) {
        increment(&self.shared, key, size);
    }

    /// Ranked snapshot of all stats.
    ///
    /// The snapshot is copied under the lock and sorted outside it, so it
    /// reflects one consistent instant and is independent of later
    /// mutation.
    #[must_use]
    pub fn get_leaders(&self, mode: SortMode, order: SortOrder) -> Vec<Stat> {
        let mut snapshot: Vec<Stat> = {
            let collection = self.shared.collection.lock();
            collection.values().cloned().collect()
        };
        rank(&mut snapshot, mode, order, clock::now_ms());
        snapshot
    }

    /// Approximate number of tracked keys, read without the lock.
    #[must_use]
    pub fn stat_count(&self) -> usize {
        self.shared.stat_count.load(Ordering::Relaxed)
    }

    /// Whether the worker threads should be running.
    pub fn is_running(&self) -> bool {
        self.shared.state.is_running()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> State {
        self.shared.state.current()
    }
}

impl Drop for StatsAggregator {
    fn drop(&mut self) {
        if self.shared.state.check_and_set(State::Stopping, State::Terminated) {
            info!("stats engine shut down");
        } else {
            error!(
                "stats engine dropped in state '{}', expected '{}'",
                self.shared.state.current(),
                State::Stopping
            );
        }
    }
}

fn increment(shared: &AggregatorShared, key: &str, size: u32) {
    let key_hash = hash_key(key);
    let now_ms = clock::now_ms();
    let mut collection = shared.collection.lock();
    match collection.get_mut(&key_hash) {
        Some(stat) => stat.observe(key, size, now_ms),
        None => {
            collection.insert(key_hash, Stat::new(key, size, now_ms));
            shared
                .stat_count
                .store(collection.len(), Ordering::Relaxed);
        }
    }
}

/// Collector: drain the queue into the collection, backing off
/// exponentially while it is empty.
fn collect_loop(shared: &AggregatorShared) {
    info!("stats collection started");
    let mut backoff = Backoff::new();

    while shared.state.is_running() {
        match shared.queue.consume() {
            Some(event) => {
                trace!("consumed event: {} ({} bytes)", event.key, event.size);
                backoff.reset();
                increment(shared, &event.key, event.size);
            }
            None => {
                let backoff_ms = backoff.next_ms();
                std::thread::sleep(Duration::from_millis(backoff_ms));
            }
        }
    }
    info!("stats collection stopped");
}

/// Reaper: every reap interval, evict entries below the discard
/// threshold. With the threshold at zero this thread only waits for
/// shutdown.
fn reap_loop(shared: &AggregatorShared) {
    let threshold = shared.discard_threshold;
    info!("starting reaper with threshold {:.2} req/s", threshold);

    if threshold == 0.0 {
        while shared.state.is_running() {
            std::thread::sleep(SLEEP_SLICE);
        }
        info!("reaper stopped (pruning disabled)");
        return;
    }

    while shared.state.is_running() {
        // sleep the interval in slices so a stop request is seen promptly
        let mut slept = Duration::ZERO;
        while slept < shared.reap_interval && shared.state.is_running() {
            let slice = SLEEP_SLICE.min(shared.reap_interval - slept);
            std::thread::sleep(slice);
            slept += slice;
        }
        if !shared.state.is_running() {
            break;
        }

        let now_ms = clock::now_ms();
        let mut collection = shared.collection.lock();
        let size_pre = collection.len();
        collection.retain(|_, stat| stat.request_rate(now_ms) >= threshold);
        collection.shrink_to_fit();
        let size_post = collection.len();
        shared.stat_count.store(size_post, Ordering::Relaxed);
        drop(collection);
        debug!("reaped stats collection: {} -> {}", size_pre, size_post);
    }
    info!("reaper stopped");
}
