//! Runtime-to-gcpin interface.
//!
//! This module is the API for the managed runtime that hosts gcpin, or for the binding that glues
//! the two together.  A binding is expected to:
//!
//! 1. optionally fix the options with [`init_options`] (otherwise they are read from `GCPIN_*`
//!    environment variables on first use),
//! 2. register the runtime's foreign pointer checker with [`register_debug_var`], if the runtime
//!    has one,
//! 3. optionally start the service eagerly with [`start`] (otherwise it starts on the first pin),
//! 4. treat every object reported by [`scan_pinned_roots`] as a root that must be neither moved
//!    nor reclaimed, or query single objects with [`is_restrained`].
//!
//! Programs that pin objects use [`crate::PtrGuard`], [`crate::Pinner`] and [`crate::no_check`]
//! directly.

use std::sync::atomic::AtomicI32;

use crate::error::PinError;
use crate::ptr_guard::PtrGuard;
use crate::service::{self, PinningService};
use crate::util::leak::LeakHandler;
use crate::util::options::Options;
use crate::util::pinned_roots::PinnedRoots;
use crate::util::ObjectReference;
use crate::vm::{debug_vars, Pinnable};

/// Fix the options of the service.  Return false, and ignore `options`, if the options are
/// already in use.
///
/// Note that the options are in use as soon as anything pins or calls [`crate::no_check`], so a
/// binding should call this before handing control to the program.
pub fn init_options(options: Options) -> bool {
    service::init_options(options)
}

/// Set options by name, e.g. from command line arguments, and fix them.  Return false if any
/// option could not be set, or if the options are already in use.
///
/// Panics on an unknown option name.
pub fn init_options_from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> bool {
    let mut options = Options::default();
    let mut all_set = true;
    for (name, value) in pairs {
        all_set &= options.set_from_str(name, value);
    }
    init_options(options) && all_set
}

/// The options the service uses.
pub fn options() -> &'static Options {
    service::options()
}

/// Start the service and its restrainer threads, if they are not started yet.
pub fn start() -> &'static PinningService {
    service::service()
}

/// Register a debug variable of the runtime, such as its foreign pointer checker.  Return true if
/// the name was not registered before.  See [`crate::vm::debug_vars`].
pub fn register_debug_var(name: &'static str, value: &'static AtomicI32) -> bool {
    debug_vars::register(name, value)
}

/// Pin one object.  This is the same as [`PtrGuard::pin`].
pub fn pin<P: Pinnable>(pointer: P) -> PtrGuard {
    PtrGuard::pin(pointer)
}

/// Like [`pin`], but returns an error instead of panicking.
pub fn try_pin<P: Pinnable>(pointer: P) -> Result<PtrGuard, PinError> {
    PtrGuard::try_pin(pointer)
}

/// The pinned roots table of the service.
pub fn pinned_roots() -> &'static PinnedRoots {
    &service::service().pinned_roots
}

/// Is `object` held by at least one restraint?  A collector must neither move nor reclaim such an
/// object.
pub fn is_restrained(object: ObjectReference) -> bool {
    // Nothing can be restrained before the service starts.  Do not start it just to answer.
    service::is_started() && pinned_roots().is_restrained(object)
}

/// Call `f` for every object held by at least one restraint.  The table is locked while `f` runs,
/// so `f` must not pin or unpin.
pub fn scan_pinned_roots(f: impl FnMut(ObjectReference)) {
    if service::is_started() {
        pinned_roots().for_each(f)
    }
}

/// Replace the handler that is called when a pin is leaked.  See [`crate::util::leak`].
pub fn set_leak_handler(handler: LeakHandler) -> Option<LeakHandler> {
    crate::util::leak::set_leak_handler(handler)
}

/// Restore the default leak handler, which panics.
pub fn reset_leak_handler() -> Option<LeakHandler> {
    crate::util::leak::reset_leak_handler()
}

/// The number of restrainer threads.
pub fn restrainer_threads() -> usize {
    service::service().scheduler.worker_count()
}

/// The number of restraint work packets executed so far.
pub fn executed_work_packets() -> usize {
    service::service().scheduler.executed_work_packets()
}

/// The number of restrainer threads that are parked waiting for work.
pub fn parked_restrainers() -> usize {
    service::service().scheduler.parked_workers()
}
