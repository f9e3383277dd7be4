//! Reaper eviction behavior

use std::sync::Arc;
use std::time::Duration;

use mctop::queue::EventQueue;
use mctop::stats::{SortMode, SortOrder, StatsAggregator};

fn queue() -> Arc<EventQueue> {
    Arc::new(EventQueue::with_capacity(64))
}

fn wait_for(predicate: impl Fn() -> bool) -> bool {
    let deadline = std::time::Instant::now() + Duration::from_secs(2);
    while std::time::Instant::now() < deadline {
        if predicate() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    predicate()
}

#[test]
fn test_cold_key_evicted_within_two_cycles() {
    let mut aggregator =
        StatsAggregator::with_reap_interval(queue(), 1000.0, Duration::from_millis(100));
    aggregator.start();

    aggregator.increment("cold", 10);
    assert_eq!(aggregator.stat_count(), 1);

    // two reap cycles are ample for a key that can never reach 1000 req/s
    assert!(wait_for(|| aggregator.stat_count() == 0));
    assert!(
        aggregator
            .get_leaders(SortMode::Calls, SortOrder::Desc)
            .is_empty()
    );
    aggregator.shutdown();
}

#[test]
fn test_zero_threshold_disables_pruning() {
    let mut aggregator =
        StatsAggregator::with_reap_interval(queue(), 0.0, Duration::from_millis(50));
    aggregator.start();

    aggregator.increment("idle", 1);
    std::thread::sleep(Duration::from_millis(250));
    assert_eq!(aggregator.stat_count(), 1);
    aggregator.shutdown();
}

#[test]
fn test_survivors_meet_threshold() {
    let mut aggregator =
        StatsAggregator::with_reap_interval(queue(), 0.5, Duration::from_millis(100));
    aggregator.start();

    for _ in 0..200 {
        aggregator.increment("hot", 64);
    }
    aggregator.increment("cold", 64);

    std::thread::sleep(Duration::from_millis(350));
    let now_ms = mctop::clock::now_ms();
    let survivors = aggregator.get_leaders(SortMode::Calls, SortOrder::Desc);
    for stat in &survivors {
        assert!(
            stat.request_rate(now_ms) >= 0.5,
            "{} survived below threshold",
            stat.key()
        );
    }
    aggregator.shutdown();
}
