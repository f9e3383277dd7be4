//! Leaderboard ordering and snapshot semantics

use std::sync::Arc;

use mctop::queue::EventQueue;
use mctop::stats::{SortMode, SortOrder, Stat, StatsAggregator, rank};

fn aggregator() -> StatsAggregator {
    StatsAggregator::new(Arc::new(EventQueue::with_capacity(64)), 0.0)
}

/// Metric value for a stat under a given mode, for ordering checks.
fn metric(stat: &Stat, mode: SortMode, now_ms: u64) -> f64 {
    match mode {
        SortMode::Calls => stat.count() as f64,
        SortMode::Size => f64::from(stat.size()),
        SortMode::ReqRate => stat.request_rate(now_ms),
        SortMode::Bandwidth => stat.bandwidth(now_ms),
    }
}

#[test]
fn test_each_mode_orders_distinctly() {
    // count, size and age chosen so all four modes disagree
    let now = 20_000;
    let stats = vec![
        Stat::synthetic("a", 9, 10, 0, now),
        Stat::synthetic("b", 6, 30, 0, now),
        Stat::synthetic("c", 2, 20, 19_000, now),
    ];

    let order_for = |mode: SortMode| {
        let mut snapshot = stats.clone();
        rank(&mut snapshot, mode, SortOrder::Desc, now);
        snapshot
            .iter()
            .map(|s| s.key().to_string())
            .collect::<Vec<_>>()
    };

    assert_eq!(order_for(SortMode::Calls), ["a", "b", "c"]);
    assert_eq!(order_for(SortMode::Size), ["b", "c", "a"]);
    assert_eq!(order_for(SortMode::ReqRate), ["c", "a", "b"]);
    assert_eq!(order_for(SortMode::Bandwidth), ["c", "b", "a"]);
}

#[test]
fn test_desc_is_non_increasing_under_every_mode() {
    let mut aggregator = aggregator();
    aggregator.start();
    for i in 0..50u32 {
        let key = format!("key:{}", i);
        for _ in 0..(i % 7 + 1) {
            aggregator.increment(&key, i * 13 % 251);
        }
    }

    let now_ms = mctop::clock::now_ms();
    for mode in [
        SortMode::Calls,
        SortMode::Size,
        SortMode::ReqRate,
        SortMode::Bandwidth,
    ] {
        let leaders = aggregator.get_leaders(mode, SortOrder::Desc);
        for pair in leaders.windows(2) {
            assert!(
                metric(&pair[0], mode, now_ms) >= metric(&pair[1], mode, now_ms),
                "sequence not non-increasing under {:?}",
                mode
            );
        }
    }
    aggregator.shutdown();
}

#[test]
fn test_asc_exactly_reverses_desc() {
    let mut aggregator = aggregator();
    aggregator.start();
    for i in 0..20u32 {
        aggregator.increment(&format!("k{}", i), i);
    }

    let desc = aggregator.get_leaders(SortMode::Size, SortOrder::Desc);
    let asc = aggregator.get_leaders(SortMode::Size, SortOrder::Asc);

    let mut reversed = desc.clone();
    reversed.reverse();
    assert_eq!(
        reversed.iter().map(Stat::key).collect::<Vec<_>>(),
        asc.iter().map(Stat::key).collect::<Vec<_>>()
    );
    aggregator.shutdown();
}

#[test]
fn test_snapshot_survives_later_mutation() {
    let mut aggregator = aggregator();
    aggregator.start();
    aggregator.increment("stable", 7);

    let snapshot = aggregator.get_leaders(SortMode::Calls, SortOrder::Desc);
    for _ in 0..10 {
        aggregator.increment("stable", 99);
    }
    aggregator.increment("newcomer", 1);

    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].count(), 1);
    assert_eq!(snapshot[0].size(), 7);
    aggregator.shutdown();
}

#[test]
fn test_stat_count_tracks_distinct_keys() {
    let mut aggregator = aggregator();
    aggregator.start();
    assert_eq!(aggregator.stat_count(), 0);

    aggregator.increment("a", 1);
    aggregator.increment("b", 1);
    aggregator.increment("a", 1);
    assert_eq!(aggregator.stat_count(), 2);
    aggregator.shutdown();
}
