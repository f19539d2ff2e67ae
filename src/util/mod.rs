//! Utilities used by the rest of the crate.

/// Address and object reference types.
pub mod address;
/// Escape slots and the tracker that zeroes them.
pub mod escape;
/// The blocking handshakes between pinning callers and restrainers.
pub(crate) mod handshake;
/// Leak detection.
pub mod leak;
/// Logging wrappers.
pub(crate) mod log;
/// Logger initialization.
pub mod logger;
/// The foreign pointer checker toggle.
pub mod no_check;
/// Options of the pinning service.
pub mod options;
/// States of pins and pin lifetimes.
pub mod pin_state;
/// The table of objects the collector must keep in place.
pub mod pinned_roots;
mod synchronized_counter;
/// Test utilities.  They are also available to bindings with the `test_private` feature.
#[cfg(any(test, feature = "test_private"))]
pub mod test_util;

pub use self::address::Address;
pub use self::address::ObjectReference;
pub(crate) use self::synchronized_counter::SynchronizedCounter;
