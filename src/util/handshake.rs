//! The two-phase handshake between a pinning caller and the restrainer that holds its object.
//!
//! -   Phase 1 (*pinned-confirmed*) uses a [`Latch`]: the restrainer releases it once the object
//!     is held and the restraint is parked, and the caller waits on it before using the pinned
//!     address.
//! -   Phase 2 (*release-confirmed*) uses a [`ReleaseGate`] and a `crossbeam` `WaitGroup`: the
//!     caller opens the gate, which hands every parked restraint back to be woken in one shot,
//!     and then waits on the wait group until every woken restraint has dropped its hold.
//!
//! Both phases are strict handshakes.  Neither side proceeds on a signal that has only been
//! sent; each waits for the other side's confirmation.

use std::sync::{Condvar, Mutex};

/// A one-shot latch.  Once released it stays released.
#[derive(Default)]
pub(crate) struct Latch {
    released: Mutex<bool>,
    cond: Condvar,
}

impl Latch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Release the latch and wake every waiter.
    pub fn release(&self) {
        let mut released = self.released.lock().unwrap();
        debug_assert!(!*released, "Latch released twice");
        *released = true;
        self.cond.notify_all();
    }

    /// Block until the latch is released.
    pub fn wait(&self) {
        let mut released = self.released.lock().unwrap();
        while !*released {
            released = self.cond.wait(released).unwrap();
        }
    }

    #[cfg(test)]
    pub fn is_released(&self) -> bool {
        *self.released.lock().unwrap()
    }
}

/// A broadcast gate that parked restraints wait behind.
///
/// While the gate is closed, [`ReleaseGate::park`] keeps the given value.  [`ReleaseGate::open`]
/// closes the gate to newcomers and returns every parked value at once.  The gate only opens
/// once.
pub(crate) struct ReleaseGate<T> {
    sync: Mutex<GateSync<T>>,
}

struct GateSync<T> {
    open: bool,
    parked: Vec<T>,
}

impl<T> Default for ReleaseGate<T> {
    fn default() -> Self {
        Self {
            sync: Mutex::new(GateSync {
                open: false,
                parked: Vec::new(),
            }),
        }
    }
}

impl<T> ReleaseGate<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Park `value` behind the gate.  If the gate is already open, the value is handed back so
    /// the caller can wake it immediately.
    pub fn park(&self, value: T) -> Result<(), T> {
        let mut sync = self.sync.lock().unwrap();
        if sync.open {
            return Err(value);
        }
        sync.parked.push(value);
        Ok(())
    }

    /// Run `f` while holding the gate lock, but only if the gate is still closed.  This lets the
    /// caller make a decision (such as accepting a new pin) atomically with respect to `open`.
    pub fn if_closed<R>(&self, f: impl FnOnce() -> R) -> Option<R> {
        let sync = self.sync.lock().unwrap();
        if sync.open {
            None
        } else {
            Some(f())
        }
    }

    /// Open the gate and take every parked value.  Returns `None` if the gate was already open.
    pub fn open(&self) -> Option<Vec<T>> {
        let mut sync = self.sync.lock().unwrap();
        if sync.open {
            return None;
        }
        sync.open = true;
        Some(std::mem::take(&mut sync.parked))
    }

    pub fn is_open(&self) -> bool {
        self.sync.lock().unwrap().open
    }

    #[cfg(test)]
    pub fn parked(&self) -> usize {
        self.sync.lock().unwrap().parked.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::test_util::panic_after;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn latch_unblocks_waiter() {
        panic_after(5000, || {
            let latch = Arc::new(Latch::new());
            let observed = Arc::new(AtomicBool::new(false));
            let waiter = {
                let latch = latch.clone();
                let observed = observed.clone();
                thread::spawn(move || {
                    latch.wait();
                    assert!(observed.load(Ordering::SeqCst));
                })
            };
            observed.store(true, Ordering::SeqCst);
            latch.release();
            waiter.join().unwrap();
            assert!(latch.is_released());
            // A released latch never blocks again.
            latch.wait();
        })
    }

    #[test]
    fn gate_hands_back_everything_once() {
        let gate = ReleaseGate::new();
        assert!(gate.park(1).is_ok());
        assert!(gate.park(2).is_ok());
        assert_eq!(gate.parked(), 2);
        assert_eq!(gate.if_closed(|| "accepted"), Some("accepted"));

        let mut woken = gate.open().unwrap();
        woken.sort();
        assert_eq!(woken, vec![1, 2]);
        assert!(gate.is_open());
        assert!(gate.open().is_none());
    }

    #[test]
    fn open_gate_rejects_newcomers() {
        let gate = ReleaseGate::new();
        assert_eq!(gate.open(), Some(vec![]));
        assert_eq!(gate.park(3), Err(3));
        assert_eq!(gate.if_closed(|| ()), None);
        assert_eq!(gate.parked(), 0);
    }
}
