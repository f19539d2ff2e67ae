//! The interface between the pinning service and the managed runtime.
//!
//! The runtime's collector is a black box to this crate.  A binding connects the two through:
//!
//! -   [`Pinnable`], which turns the runtime's pointers into [`crate::util::ObjectReference`]s,
//! -   [`crate::util::pinned_roots::PinnedRoots`], which the collector must consult before moving
//!     or reclaiming an object (see [`crate::memory_manager::pinned_roots`]), and
//! -   [`debug_vars`], where the runtime's foreign pointer checker setting lives.

pub mod debug_vars;
mod pinnable;

pub use self::pinnable::Pinnable;
