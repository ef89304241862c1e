//! Cooperative cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared cancellation token.
///
/// Constructed once per run by the lifecycle coordinator, cloned into the
/// [`ExecutionRequest`](crate::ExecutionRequest) and the signal handlers.
/// It is set at most once per run and never reset; readers must tolerate it
/// flipping at any point (a signal handler may trip it asynchronously).
/// Cancellation is cooperative: setting the token only stops loops at their
/// next check, it does not abort in-flight handler work.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a new, untripped token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Trips the token.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Returns `true` once the token has been tripped.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let token = CancelToken::new();
        let other = token.clone();
        assert!(!other.is_cancelled());

        token.cancel();
        assert!(token.is_cancelled());
        assert!(other.is_cancelled());
    }

    #[test]
    fn cancel_is_sticky() {
        let token = CancelToken::new();
        token.cancel();
        token.cancel();
        assert!(token.is_cancelled());
    }
}
