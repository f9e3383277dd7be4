//! Lifecycle state machine shared by the long-running components
//!
//! Every worker-owning component (capture engine, stats aggregator) carries
//! one of these as its sole coordination handshake: the controller advances
//! the state, workers poll `is_running()` at their own cadence.

use std::sync::atomic::{AtomicU8, Ordering};

/// Component lifecycle states. Transitions are only valid along the chain
/// `New -> Running -> Stopping -> Terminated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum State {
    New = 0,
    Running = 1,
    Stopping = 2,
    Terminated = 3,
}

impl State {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::New,
            1 => Self::Running,
            2 => Self::Stopping,
            _ => Self::Terminated,
        }
    }

    /// Human-readable name for logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Running => "running",
            Self::Stopping => "stopping",
            Self::Terminated => "terminated",
        }
    }
}

impl std::fmt::Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Atomic lifecycle state with compare-and-swap transitions.
///
/// Release/acquire ordering guarantees that a thread observing `Running`
/// sees every write the starter performed before the transition.
#[derive(Debug)]
pub struct LifecycleState {
    state: AtomicU8,
}

impl LifecycleState {
    /// Create in the `New` state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(State::New as u8),
        }
    }

    /// Atomically transition `expected -> next`.
    ///
    /// Returns true iff the current state equalled `expected`; on failure
    /// the state is left unchanged.
    pub fn check_and_set(&self, expected: State, next: State) -> bool {
        self.state
            .compare_exchange(
                expected as u8,
                next as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// Whether the component is in the `Running` state.
    #[inline]
    pub fn is_running(&self) -> bool {
        self.state.load(Ordering::Acquire) == State::Running as u8
    }

    /// Current state.
    pub fn current(&self) -> State {
        State::from_u8(self.state.load(Ordering::Acquire))
    }
}

impl Default for LifecycleState {
    fn default() -> Self {
        Self::new()
    }
}
