//! Bounded event queue between the capture and collector threads
//!
//! Single producer (capture), single consumer (collector). When the queue
//! is full, events are dropped silently: the statistics are sampled by
//! nature, so losing events under pressure is acceptable. Drops are counted
//! so the UI can surface them.

use crossbeam::queue::ArrayQueue;
use std::sync::atomic::{AtomicU64, Ordering};

/// A single observed cache operation: the key and the value size in bytes
/// (0 for request-side events, the `VALUE` byte count for responses).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub key: String,
    pub size: u32,
}

impl Event {
    #[must_use]
    pub fn new(key: impl Into<String>, size: u32) -> Self {
        Self {
            key: key.into(),
            size,
        }
    }
}

/// Thread-safe bounded FIFO carrying events from capture to aggregation.
#[derive(Debug)]
pub struct EventQueue {
    inner: ArrayQueue<Event>,
    dropped: AtomicU64,
}

impl EventQueue {
    /// Create a queue holding at most `capacity` events.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: ArrayQueue::new(capacity),
            dropped: AtomicU64::new(0),
        }
    }

    /// Enqueue an event. Returns false (and counts a drop) if the queue
    /// is full.
    pub fn produce(&self, event: Event) -> bool {
        match self.inner.push(event) {
            Ok(()) => true,
            Err(_) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    /// Non-blocking dequeue. Returns `None` if the queue is empty.
    pub fn consume(&self) -> Option<Event> {
        self.inner.pop()
    }

    /// Events dropped so far because the queue was full.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Current number of queued events.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
