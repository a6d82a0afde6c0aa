//! The user-interrupt flag the Agent Loop's safety check reads first
//! (§4.11 step 1, §5). Installing the actual SIGINT/SIGTERM handler, and
//! the second-signal hard exit, is a CLI-level concern; this crate only
//! owns the flag and the read side.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A cheaply cloneable "should stop" signal shared between a signal
/// handler and the running Agent Loop.
#[derive(Debug, Clone, Default)]
pub struct InterruptFlag(Arc<AtomicBool>);

impl InterruptFlag {
    #[must_use]
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    /// Request that the next safety check stop the loop.
    pub fn trigger(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_clear_and_latches_once_triggered() {
        let flag = InterruptFlag::new();
        assert!(!flag.is_set());
        flag.trigger();
        assert!(flag.is_set());
    }

    #[test]
    fn clones_share_the_same_underlying_state() {
        let flag = InterruptFlag::new();
        let clone = flag.clone();
        clone.trigger();
        assert!(flag.is_set());
    }
}
