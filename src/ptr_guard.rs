//! Standalone pins.
//!
//! A [`PtrGuard`] pins exactly one object and releases it on its own, independent of any other
//! pin.  It is a pin group with a single member: it owns a private [`Pinner`].

use crate::error::PinError;
use crate::pinner::{Pinned, Pinner};
use crate::util::escape::EscapeSlot;
use crate::util::pin_state::PinState;
use crate::util::ObjectReference;
use crate::vm::Pinnable;

/// One pinned object.  See the [module documentation](self).
///
/// A `PtrGuard` must be released with [`PtrGuard::release`] before it is dropped.  Dropping an
/// unreleased guard is reported as a leak.
pub struct PtrGuard {
    pinner: Pinner,
    pinned: Pinned,
    released: bool,
}

impl PtrGuard {
    /// Pin the object `pointer` refers to until [`PtrGuard::release`] is called.
    ///
    /// Panics if `pointer` does not denote managed memory.
    pub fn pin<P: Pinnable>(pointer: P) -> PtrGuard {
        Self::try_pin(pointer).unwrap_or_else(|e| panic!("{}", e))
    }

    /// Like [`PtrGuard::pin`], but returns an error instead of panicking.
    pub fn try_pin<P: Pinnable>(pointer: P) -> Result<PtrGuard, PinError> {
        let pinner = Pinner::with_owner("PtrGuard");
        let pinned = pinner.try_pin(pointer)?;
        Ok(PtrGuard {
            pinner,
            pinned,
            released: false,
        })
    }

    /// Store the pinned address into `slot`.  The slot is set to null when the guard is
    /// released.
    ///
    /// Panics if the guard has been released.
    pub fn poke(&self, slot: EscapeSlot) {
        self.try_poke(slot).unwrap_or_else(|e| panic!("{}", e))
    }

    /// Like [`PtrGuard::poke`], but returns an error instead of panicking.
    pub fn try_poke(&self, slot: EscapeSlot) -> Result<(), PinError> {
        if self.released {
            return Err(PinError::Released);
        }
        self.pinned.try_store(slot)
    }

    /// Zero every slot the pinned address was poked into, and unpin the object.  Blocks until the
    /// object is no longer held.  Releasing a released guard does nothing.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.pinner.unpin();
        self.released = true;
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// The pinned object.
    pub fn object(&self) -> ObjectReference {
        self.pinned.object()
    }

    /// The pinned address as a raw pointer.
    pub fn as_ptr<T>(&self) -> *const T {
        self.pinned.as_ptr()
    }

    pub fn state(&self) -> PinState {
        self.pinned.state()
    }

    /// The number of slots the pinned address has been poked into.
    pub fn escape_slots(&self) -> usize {
        self.pinner.escape_slots()
    }
}

impl std::fmt::Debug for PtrGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("PtrGuard")
            .field("pinned", &self.pinned)
            .field("released", &self.released)
            .finish()
    }
}
