//! What can be pinned.
//!
//! Only a thin pointer to a single flat region of managed memory can be pinned.  Fat pointers
//! (slices, trait objects) do not implement [`Pinnable`], so they are rejected at compile time.
//! A null pointer is rejected at run time: it does not denote managed memory, and pinning it is a
//! programming error.

use std::ptr::NonNull;

use crate::util::{Address, ObjectReference};

/// A value that denotes an object in managed memory.
pub trait Pinnable {
    /// The object this value refers to, or `None` if it does not refer to any object.
    fn object_reference(&self) -> Option<ObjectReference>;
}

impl<T> Pinnable for *const T {
    fn object_reference(&self) -> Option<ObjectReference> {
        ObjectReference::from_ptr(*self)
    }
}

impl<T> Pinnable for *mut T {
    fn object_reference(&self) -> Option<ObjectReference> {
        ObjectReference::from_ptr(*self as *const T)
    }
}

impl<T> Pinnable for NonNull<T> {
    fn object_reference(&self) -> Option<ObjectReference> {
        ObjectReference::from_ptr(self.as_ptr() as *const T)
    }
}

impl<T> Pinnable for &T {
    fn object_reference(&self) -> Option<ObjectReference> {
        ObjectReference::from_ptr(*self as *const T)
    }
}

impl<T> Pinnable for &mut T {
    fn object_reference(&self) -> Option<ObjectReference> {
        ObjectReference::from_ptr(&**self as *const T)
    }
}

impl Pinnable for Address {
    fn object_reference(&self) -> Option<ObjectReference> {
        ObjectReference::from_raw_address(*self)
    }
}

impl Pinnable for ObjectReference {
    fn object_reference(&self) -> Option<ObjectReference> {
        Some(*self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thin_pointers_are_pinnable() {
        let mut value = [0u8; 16];
        let expected = ObjectReference::from_ptr(value.as_ptr() as *const [u8; 16]);
        assert!(expected.is_some());

        assert_eq!((&value as *const [u8; 16]).object_reference(), expected);
        assert_eq!((&mut value as *mut [u8; 16]).object_reference(), expected);
        assert_eq!(NonNull::from(&value).object_reference(), expected);
        assert_eq!((&value).object_reference(), expected);
        assert_eq!((&mut value).object_reference(), expected);
        assert_eq!(Address::from_ref(&value).object_reference(), expected);
        assert_eq!(expected.unwrap().object_reference(), expected);
    }

    #[test]
    fn null_is_not_pinnable() {
        assert_eq!(std::ptr::null::<u32>().object_reference(), None);
        assert_eq!(std::ptr::null_mut::<u32>().object_reference(), None);
        assert_eq!(Address::ZERO.object_reference(), None);
    }
}
