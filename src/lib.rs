//! gcpin pins managed objects so that their addresses can be handed to foreign code.
//!
//! A moving collector may relocate or reclaim any object it cannot see a reference to.  Foreign
//! (non-managed) memory is invisible to it, so an address written there must be protected for as
//! long as the foreign code may use it.  gcpin protects such objects by keeping a live reference
//! to each of them in a process-wide table, the [pinned roots](util::pinned_roots::PinnedRoots),
//! which the collector treats as roots.  The references are taken and dropped by a small pool of
//! restrainer threads, and the caller blocks until the restrainer has confirmed each step.
//!
//! The API is made of:
//!
//! * [`PtrGuard`]: pins one object, records the foreign cells its address is poked into, and on
//!   release zeroes those cells and unpins the object.
//! * [`Pinner`]: pins any number of objects and unpins them all at once.  A pinner can be reused
//!   after it is unpinned.
//! * [`no_check`] and [`NoCheckGuard`]: disable the runtime's foreign pointer checker around a
//!   foreign call.
//! * [`memory_manager`]: the functions a runtime binding uses to configure the service and to
//!   consult the pinned roots.
//!
//! A pin that is never released is a leak.  Leaks are detected when the owning [`PtrGuard`] or
//! [`Pinner`] is dropped, and reported to the [leak handler](util::leak), which panics by
//! default.

#[macro_use]
extern crate lazy_static;
extern crate log;
#[cfg(feature = "builtin_env_logger")]
extern crate env_logger;
extern crate num_cpus;

pub mod error;
pub mod memory_manager;
pub mod pinner;
pub mod ptr_guard;
pub(crate) mod scheduler;
pub mod service;
pub mod util;
pub mod vm;

pub use crate::error::PinError;
pub use crate::pinner::{Pinned, Pinner};
pub use crate::ptr_guard::PtrGuard;
pub use crate::util::escape::EscapeSlot;
pub use crate::util::no_check::{no_check, NoCheckGuard};
pub use crate::util::pin_state::{LifetimeState, PinState};
pub use crate::util::{Address, ObjectReference};
pub use crate::vm::Pinnable;
