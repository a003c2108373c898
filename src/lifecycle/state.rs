//! Server lifecycle state machine.
//!
//! # State Transitions
//! ```text
//! Uninitialized → Initialized → Running → ShuttingDown → Terminated
//! ```
//!
//! # Design Decisions
//! - Strictly linear: no state may be skipped or revisited
//! - Current state is published on a watch channel for observers

use std::fmt;

use thiserror::Error;
use tokio::sync::watch;

/// Lifecycle phase of an `ApiServer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LifecycleState {
    Uninitialized,
    Initialized,
    Running,
    ShuttingDown,
    Terminated,
}

impl LifecycleState {
    /// The only state reachable from `self`.
    pub fn next(self) -> Option<LifecycleState> {
        match self {
            LifecycleState::Uninitialized => Some(LifecycleState::Initialized),
            LifecycleState::Initialized => Some(LifecycleState::Running),
            LifecycleState::Running => Some(LifecycleState::ShuttingDown),
            LifecycleState::ShuttingDown => Some(LifecycleState::Terminated),
            LifecycleState::Terminated => None,
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleState::Uninitialized => "uninitialized",
            LifecycleState::Initialized => "initialized",
            LifecycleState::Running => "running",
            LifecycleState::ShuttingDown => "shutting_down",
            LifecycleState::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

/// Rejected state change.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid lifecycle transition: {from} -> {to}")]
pub struct LifecycleError {
    pub from: LifecycleState,
    pub to: LifecycleState,
}

/// Tracks the current state and enforces the transition order.
#[derive(Debug)]
pub struct Lifecycle {
    tx: watch::Sender<LifecycleState>,
}

impl Lifecycle {
    /// Start in `Uninitialized`.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(LifecycleState::Uninitialized);
        Self { tx }
    }

    /// Current state.
    pub fn state(&self) -> LifecycleState {
        *self.tx.borrow()
    }

    /// Observe state changes.
    pub fn subscribe(&self) -> watch::Receiver<LifecycleState> {
        self.tx.subscribe()
    }

    /// Move to `to` if it directly follows the current state.
    pub fn advance(&self, to: LifecycleState) -> Result<(), LifecycleError> {
        let mut result = Ok(());
        self.tx.send_if_modified(|current| {
            if current.next() == Some(to) {
                tracing::debug!(from = %current, to = %to, "Lifecycle transition");
                *current = to;
                true
            } else {
                result = Err(LifecycleError { from: *current, to });
                false
            }
        });
        result
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_sequence() {
        let lifecycle = Lifecycle::new();
        assert_eq!(lifecycle.state(), LifecycleState::Uninitialized);

        for to in [
            LifecycleState::Initialized,
            LifecycleState::Running,
            LifecycleState::ShuttingDown,
            LifecycleState::Terminated,
        ] {
            lifecycle.advance(to).unwrap();
            assert_eq!(lifecycle.state(), to);
        }
        assert_eq!(lifecycle.state().next(), None);
    }

    #[test]
    fn test_cannot_skip_states() {
        let lifecycle = Lifecycle::new();
        let err = lifecycle.advance(LifecycleState::Running).unwrap_err();
        assert_eq!(
            err,
            LifecycleError {
                from: LifecycleState::Uninitialized,
                to: LifecycleState::Running
            }
        );
        assert_eq!(lifecycle.state(), LifecycleState::Uninitialized);

        lifecycle.advance(LifecycleState::Initialized).unwrap();
        assert!(lifecycle.advance(LifecycleState::Initialized).is_err());
        assert!(lifecycle.advance(LifecycleState::Terminated).is_err());
    }

    #[test]
    fn test_subscribers_observe_changes() {
        let lifecycle = Lifecycle::new();
        let mut rx = lifecycle.subscribe();
        lifecycle.advance(LifecycleState::Initialized).unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), LifecycleState::Initialized);
    }
}
