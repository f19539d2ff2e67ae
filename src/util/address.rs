use bytemuck::NoUninit;

use std::fmt;
use std::num::NonZeroUsize;

/// Address represents an arbitrary address. It is used for the foreign cells that escaped
/// references are written into, and as the raw value behind an [`ObjectReference`]. This type
/// needs to be zero overhead (memory wise and time wise).
#[repr(transparent)]
#[derive(Copy, Clone, Eq, Hash, PartialOrd, Ord, PartialEq, NoUninit)]
pub struct Address(usize);

impl Address {
    /// The lowest possible address.
    pub const ZERO: Self = Address(0);

    /// creates Address from a pointer
    pub fn from_ptr<T>(ptr: *const T) -> Address {
        Address(ptr as usize)
    }

    /// creates Address from a Rust reference
    pub fn from_ref<T>(r: &T) -> Address {
        Address(r as *const T as usize)
    }

    /// creates Address from a mutable pointer
    pub fn from_mut_ptr<T>(ptr: *mut T) -> Address {
        Address(ptr as usize)
    }

    /// is this address aligned to the given alignment
    pub const fn is_aligned_to(self, align: usize) -> bool {
        self.0 & (align - 1) == 0
    }

    /// converts the Address to a pointer
    pub fn to_ptr<T>(self) -> *const T {
        self.0 as *const T
    }

    /// converts the Address to a mutable pointer
    pub fn to_mut_ptr<T>(self) -> *mut T {
        self.0 as *mut T
    }
}

/// allows Display format the Address (as lower-case hex value with 0x prefix)
impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// allows Debug format the Address (as lower-case hex value with 0x prefix)
impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// `ObjectReference` represents the address of an object in the managed heap.
///
/// It is opaque to this crate: an `ObjectReference` is only held, compared and written into
/// escape slots.  It is never dereferenced, and no address arithmetic is done on it.
///
/// An `ObjectReference` cannot be null.  Use `Option<ObjectReference>` for a slot that may hold
/// either an object reference or null.
#[repr(transparent)]
#[derive(Copy, Clone, Eq, Hash, PartialOrd, Ord, PartialEq)]
pub struct ObjectReference(NonZeroUsize);

impl ObjectReference {
    /// Cast the object reference to its raw address.
    pub fn to_raw_address(self) -> Address {
        Address(self.0.get())
    }

    /// Cast a raw address to an object reference.  Return `None` if the address is zero.
    pub fn from_raw_address(addr: Address) -> Option<ObjectReference> {
        NonZeroUsize::new(addr.0).map(ObjectReference)
    }

    /// Cast a raw pointer to an object reference.  Return `None` if the pointer is null.
    pub fn from_ptr<T>(ptr: *const T) -> Option<ObjectReference> {
        Self::from_raw_address(Address::from_ptr(ptr))
    }

    /// Get the object reference as a raw pointer.  The pointer is only meant to be handed to
    /// foreign code or compared; this crate never reads through it.
    pub fn to_ptr<T>(self) -> *const T {
        self.to_raw_address().to_ptr()
    }
}

impl fmt::Display for ObjectReference {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:#x}", self.0.get())
    }
}

impl fmt::Debug for ObjectReference {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:#x}", self.0.get())
    }
}
