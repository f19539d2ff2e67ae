use std::sync::atomic::{AtomicUsize, Ordering};

/// A counter shared between the threads that pin into a lifetime and the restrainers that
/// release from it.
#[derive(Default)]
pub struct SynchronizedCounter {
    count: AtomicUsize,
}

impl SynchronizedCounter {
    pub const fn new() -> Self {
        Self {
            count: AtomicUsize::new(0),
        }
    }

    pub fn increment(&self) -> usize {
        let old = self.count.fetch_add(1, Ordering::AcqRel);
        debug_assert!(old != usize::MAX);
        old + 1
    }

    pub fn decrement(&self) -> usize {
        let old = self.count.fetch_sub(1, Ordering::AcqRel);
        assert!(old > 0, "SynchronizedCounter underflow");
        old - 1
    }

    pub fn peek(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }
}
