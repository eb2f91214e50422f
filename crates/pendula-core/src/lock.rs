use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Single-flight guard shared by every simulator that draws to the same host.
///
/// At most one animation loop may be in flight among the simulators holding
/// clones of the same lock. It is a reentrancy guard, not a mutex: nothing
/// blocks, a failed acquire just means "someone else is animating".
#[derive(Debug, Clone, Default)]
pub struct AnimationLock {
    locked: Arc<AtomicBool>,
}

impl AnimationLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the lock. Returns `false` if it is already held.
    pub fn try_acquire(&self) -> bool {
        self.locked
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn release(&self) {
        self.locked.store(false, Ordering::Release);
    }

    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_flight() {
        let lock = AnimationLock::new();
        let other = lock.clone();
        assert!(lock.try_acquire());
        assert!(!other.try_acquire());
        assert!(other.is_locked());
        lock.release();
        assert!(other.try_acquire());
    }

    #[test]
    fn test_independent_locks_do_not_interfere() {
        let a = AnimationLock::new();
        let b = AnimationLock::new();
        assert!(a.try_acquire());
        assert!(b.try_acquire());
    }
}
