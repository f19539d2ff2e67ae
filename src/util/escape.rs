//! Escape slots and the tracker that remembers them.
//!
//! An escape slot is a word-sized cell in foreign (non-managed) memory that holds a copy of a
//! pinned address.  The service never allocates or frees the cell; it only writes the pinned
//! address into it and, when the pin is released, writes null back.  The tracker
//! ([`EscapeSlots`]) is the only thing standing between a released pin and a dangling foreign
//! pointer.

use std::fmt::Debug;

use atomic::Atomic;

use crate::util::{Address, ObjectReference};

/// A foreign memory cell that can hold one pinned address, or null.
///
/// An `EscapeSlot` value *points to* a cell, and is not the cell itself.  Copies of an
/// `EscapeSlot` point to the same cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct EscapeSlot {
    slot_addr: *mut Atomic<Address>,
}

static_assertions::assert_eq_size!(EscapeSlot, *mut u8);
static_assertions::assert_eq_size!(Atomic<Address>, *mut u8);

// The cell is owned by foreign code and only accessed through atomic operations.
unsafe impl Send for EscapeSlot {}
unsafe impl Sync for EscapeSlot {}

impl EscapeSlot {
    /// Create an escape slot from the address of a foreign cell.
    ///
    /// # Safety
    ///
    /// `address` must point to a word-sized, word-aligned cell that is not managed memory, and the
    /// cell must stay valid until every pin that stores into it has been released.
    pub unsafe fn from_address(address: Address) -> Self {
        debug_assert!(
            address.is_aligned_to(std::mem::align_of::<Address>()),
            "Escape slot {} is not word aligned",
            address
        );
        Self {
            slot_addr: address.to_mut_ptr(),
        }
    }

    /// Create an escape slot from a pointer to a foreign pointer-typed cell, such as a field of a
    /// C struct declared as `void *`.
    ///
    /// # Safety
    ///
    /// The same as [`EscapeSlot::from_address`].
    pub unsafe fn from_ptr<T>(cell: *mut *mut T) -> Self {
        Self::from_address(Address::from_mut_ptr(cell))
    }

    /// Get the address of the cell.
    pub fn as_address(&self) -> Address {
        Address::from_mut_ptr(self.slot_addr)
    }

    /// Load the object reference held in the cell, or `None` if the cell holds null.
    pub fn load(&self) -> Option<ObjectReference> {
        let addr = unsafe { (*self.slot_addr).load(atomic::Ordering::Acquire) };
        ObjectReference::from_raw_address(addr)
    }

    pub(crate) fn store(&self, object: ObjectReference) {
        unsafe { (*self.slot_addr).store(object.to_raw_address(), atomic::Ordering::Release) }
    }

    pub(crate) fn clear(&self) {
        unsafe { (*self.slot_addr).store(Address::ZERO, atomic::Ordering::Release) }
    }
}

/// An append-only list of escape slots, scoped to the pin or pin lifetime that owns it.
#[derive(Default, Debug)]
pub(crate) struct EscapeSlots {
    slots: Vec<(EscapeSlot, ObjectReference)>,
}

impl EscapeSlots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `object` into `slot` and remember the slot.  Registering the same slot twice is
    /// allowed; it will simply be cleared twice.
    pub fn add(&mut self, slot: EscapeSlot, object: ObjectReference) {
        slot.store(object);
        self.slots.push((slot, object));
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Write null to every remembered slot and forget all of them.
    pub fn clear_all(&mut self) {
        for (slot, _object) in self.slots.drain(..) {
            #[cfg(feature = "extreme_assertions")]
            assert!(
                slot.load().is_none() || slot.load() == Some(_object),
                "Escape slot {} was overwritten with {:?} while {} was pinned",
                slot.as_address(),
                slot.load(),
                _object
            );
            slot.clear();
        }
        self.slots.shrink_to_fit();
    }
}
