//! Monotonic clock anchored at process start
//!
//! Stats store millisecond offsets from this anchor rather than `Instant`s,
//! which keeps them `Copy`-cheap and lets tests fabricate timestamps.

use std::sync::LazyLock;
use std::time::Instant;

static START: LazyLock<Instant> = LazyLock::new(Instant::now);

/// Milliseconds elapsed since the process-wide clock anchor.
///
/// Monotonic: successive calls never go backwards.
#[inline]
#[must_use]
pub fn now_ms() -> u64 {
    START.elapsed().as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_ms_is_monotonic() {
        let a = now_ms();
        let b = now_ms();
        assert!(b >= a);
    }

    #[test]
    fn test_now_ms_advances() {
        let a = now_ms();
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(now_ms() > a);
    }
}
