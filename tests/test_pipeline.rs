//! End-to-end pipeline: scripted frames -> capture -> queue -> aggregator

mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};

use common::{ScriptedSource, request_frame, response_frame, wait_for};
use mctop::capture::CaptureEngine;
use mctop::lifecycle::State;
use mctop::protocol::Decoder;
use mctop::queue::EventQueue;
use mctop::stats::{SortMode, SortOrder, StatsAggregator};

fn pipeline(
    frames: Vec<Vec<u8>>,
    count_requests: bool,
) -> (CaptureEngine, StatsAggregator, Arc<EventQueue>) {
    let queue = Arc::new(EventQueue::with_capacity(4096));
    let decoder = Decoder::new(common::PORT, count_requests);
    let mut capture = CaptureEngine::new(
        Box::new(ScriptedSource::new(frames)),
        Arc::clone(&queue),
        decoder,
    );
    let mut aggregator = StatsAggregator::new(Arc::clone(&queue), 0.0);
    aggregator.start();
    capture.start().expect("capture start");
    (capture, aggregator, queue)
}

fn teardown(mut capture: CaptureEngine, mut aggregator: StatsAggregator) {
    capture.shutdown();
    aggregator.shutdown();
}

#[test]
fn test_single_get_value_pair() {
    let (capture, aggregator, _queue) = pipeline(
        vec![
            request_frame(b"GET foo\r\n"),
            response_frame(b"VALUE foo 0 3\r\nbar\r\nEND\r\n"),
        ],
        false,
    );

    assert!(wait_for(|| aggregator.stat_count() == 1));
    let leaders = aggregator.get_leaders(SortMode::Calls, SortOrder::Desc);
    assert_eq!(leaders.len(), 1);
    assert_eq!(leaders[0].key(), "foo");
    assert_eq!(leaders[0].count(), 1);
    assert_eq!(leaders[0].size(), 3);

    teardown(capture, aggregator);
}

#[test]
fn test_multi_key_response_ranks_by_size() {
    let (capture, aggregator, _queue) = pipeline(
        vec![response_frame(
            b"VALUE a 0 1\r\nx\r\nVALUE b 0 2\r\nyy\r\nEND\r\n",
        )],
        false,
    );

    assert!(wait_for(|| aggregator.stat_count() == 2));
    let leaders = aggregator.get_leaders(SortMode::Size, SortOrder::Desc);
    assert_eq!(leaders[0].key(), "b");
    assert_eq!(leaders[1].key(), "a");

    teardown(capture, aggregator);
}

#[test]
fn test_malformed_payload_keeps_capture_healthy() {
    let (capture, aggregator, _queue) = pipeline(
        vec![
            response_frame(b"VALUE incomplete"),
            response_frame(b"VALUE ok 0 5\r\n"),
        ],
        false,
    );

    assert!(wait_for(|| aggregator.stat_count() == 1));
    assert!(capture.is_running());
    let leaders = aggregator.get_leaders(SortMode::Calls, SortOrder::Desc);
    assert_eq!(leaders[0].key(), "ok");

    teardown(capture, aggregator);
}

#[test]
fn test_request_counting_toggle_flows_through() {
    let (capture, aggregator, _queue) =
        pipeline(vec![request_frame(b"GET one two\r\n")], true);

    assert!(wait_for(|| aggregator.stat_count() == 2));
    let leaders = aggregator.get_leaders(SortMode::Calls, SortOrder::Desc);
    assert!(leaders.iter().all(|s| s.size() == 0 && s.count() == 1));

    teardown(capture, aggregator);
}

#[test]
fn test_start_then_immediate_shutdown_within_bound() {
    let started = Instant::now();
    let (mut capture, mut aggregator, _queue) = pipeline(Vec::new(), false);
    capture.shutdown();
    aggregator.shutdown();
    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(capture.state(), State::Stopping);
    assert_eq!(aggregator.state(), State::Stopping);
}

#[test]
fn test_repeated_key_accumulates() {
    let frames = (0..100)
        .map(|i| {
            let size = if i % 2 == 0 { 10 } else { 20 };
            response_frame(format!("VALUE hot 0 {}\r\n", size).as_bytes())
        })
        .collect();
    let (capture, aggregator, _queue) = pipeline(frames, false);

    assert!(wait_for(|| {
        aggregator
            .get_leaders(SortMode::Calls, SortOrder::Desc)
            .first()
            .is_some_and(|s| s.count() == 100)
    }));
    let leaders = aggregator.get_leaders(SortMode::Calls, SortOrder::Desc);
    assert_eq!(leaders[0].count(), 100);
    // most recent size wins: the 100th frame carried 20
    assert_eq!(leaders[0].size(), 20);

    teardown(capture, aggregator);
}

#[test]
fn test_frames_appended_mid_run_are_observed() {
    let source = ScriptedSource::new(Vec::new());
    let feeder = source.feeder();

    let queue = Arc::new(EventQueue::with_capacity(4096));
    let mut capture = CaptureEngine::new(
        Box::new(source),
        Arc::clone(&queue),
        Decoder::new(common::PORT, false),
    );
    let mut aggregator = StatsAggregator::new(Arc::clone(&queue), 0.0);
    aggregator.start();
    capture.start().expect("capture start");

    assert_eq!(aggregator.stat_count(), 0);
    feeder
        .lock()
        .unwrap()
        .push_back(response_frame(b"VALUE late 0 4\r\n"));

    assert!(wait_for(|| aggregator.stat_count() == 1));
    teardown(capture, aggregator);
}
