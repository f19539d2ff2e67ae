//! Detection of leaked pins.
//!
//! A pin whose owner is dropped without releasing it keeps its restraint parked forever.  From
//! the outside this is indistinguishable from a stuck restrainer, so it is treated as fatal: the
//! destructor of the owner reports a [`Leak`] to the leak handler, which panics by default.
//! Embedders and tests may install a different handler with [`set_leak_handler`].

use std::fmt;

use spin::RwLock;

use crate::util::log::error;

/// What was leaked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Leak {
    /// The kind of owner that was dropped, e.g. `"Pinner"`.
    pub owner: &'static str,
    /// The number of restraints that will now never be released.
    pub restraints: usize,
}

impl fmt::Display for Leak {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Found leaking pinned pointer: {} dropped with {} restraint(s) still held. Forgot to call unpin()?",
            self.owner, self.restraints
        )
    }
}

/// The signature of a leak handler.
pub type LeakHandler = Box<dyn Fn(&Leak) + Send + Sync>;

lazy_static! {
    static ref LEAK_HANDLER: RwLock<Option<LeakHandler>> = RwLock::new(None);
}

fn default_leak_handler(leak: &Leak) {
    panic!("{}", leak);
}

/// Replace the leak handler.  Return the previous handler, or `None` if the default (panicking)
/// handler was in use.
pub fn set_leak_handler(handler: LeakHandler) -> Option<LeakHandler> {
    LEAK_HANDLER.write().replace(handler)
}

/// Restore the default, panicking leak handler.  Return the handler that was in use.
pub fn reset_leak_handler() -> Option<LeakHandler> {
    LEAK_HANDLER.write().take()
}

/// Report a leak.  Called from destructors.
pub(crate) fn report_leak(leak: Leak) {
    error!("{}", leak);
    if std::thread::panicking() {
        // Panicking again in a destructor during unwinding would abort the process and hide the
        // original panic.
        return;
    }
    let handler = LEAK_HANDLER.read();
    match handler.as_ref() {
        Some(handler) => handler(&leak),
        None => {
            drop(handler);
            default_leak_handler(&leak)
        }
    }
}
