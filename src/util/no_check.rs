//! Temporarily disable the runtime's foreign pointer checker.
//!
//! Passing managed memory that contains pinned managed pointers to a foreign function is legal
//! once those pointers are pinned, but the runtime's checker cannot know that and rejects the
//! call.  [`no_check`] (or a [`NoCheckGuard`]) switches the checker off around such calls.
//!
//! The checker setting is global.  The first caller to enter saves the current setting and
//! writes 0.  Nested and concurrent callers only count themselves in.  The last caller to leave
//! writes the saved setting back, so the setting is restored exactly once, no matter in which
//! order the callers leave.  Because the setting is global, foreign calls made by unrelated
//! threads while any guard is alive are not checked either.

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Mutex;

use crate::util::log::trace;
use crate::vm::debug_vars::{self, FOREIGN_PTR_CHECK};

struct ToggleState {
    /// Number of live guards.
    count: usize,
    /// The checker setting saved by the first guard.
    saved: i32,
}

lazy_static! {
    static ref TOGGLE: Mutex<ToggleState> = Mutex::new(ToggleState { count: 0, saved: 0 });
}

/// The checker cell, looked up on first use.
static CHECKER_CELL: spin::Once<&'static AtomicI32> = spin::Once::new();

// Must not be called with `TOGGLE` held: a missing variable panics here.
fn checker_cell() -> &'static AtomicI32 {
    if let Some(cell) = CHECKER_CELL.get() {
        return cell;
    }
    let name = &crate::service::options().check_var;
    let cell = debug_vars::lookup(name)
        .unwrap_or_else(|| panic!("Couldn't find {} debug variable", name));
    CHECKER_CELL.call_once(|| cell)
}

/// Write the configured setting into the built-in checker variable.  If guards are alive and the
/// built-in variable is the checker, the setting is what the last guard restores instead, and
/// the checker stays disabled until then.
pub(crate) fn seed_builtin_checker(value: i32) {
    let mut state = TOGGLE.lock().unwrap();
    let builtin_is_checker = CHECKER_CELL
        .get()
        .is_some_and(|cell| std::ptr::eq(*cell, &FOREIGN_PTR_CHECK));
    if state.count > 0 && builtin_is_checker {
        state.saved = value;
    } else {
        FOREIGN_PTR_CHECK.store(value, Ordering::SeqCst);
    }
}

/// While a `NoCheckGuard` is alive, the foreign pointer checker is disabled.
#[must_use = "the checker is enabled again as soon as the guard is dropped"]
pub struct NoCheckGuard {
    // Guards are counted, not identified.  The field keeps the type from being built outside
    // this module.
    _private: (),
}

impl NoCheckGuard {
    pub fn new() -> Self {
        let cell = checker_cell();
        let mut state = TOGGLE.lock().unwrap();
        if state.count == 0 {
            state.saved = cell.swap(0, Ordering::SeqCst);
            trace!("Foreign pointer checker disabled (was {})", state.saved);
        }
        state.count += 1;
        NoCheckGuard { _private: () }
    }
}

impl Default for NoCheckGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for NoCheckGuard {
    fn drop(&mut self) {
        let cell = checker_cell();
        let mut state = TOGGLE.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        assert!(state.count > 0, "NoCheckGuard released more often than acquired");
        state.count -= 1;
        if state.count == 0 {
            let saved = state.saved;
            cell.store(saved, Ordering::SeqCst);
            trace!("Foreign pointer checker restored to {}", saved);
        }
    }
}

/// Run `f` with the foreign pointer checker disabled.  The checker setting is restored even if
/// `f` panics.
pub fn no_check<R>(f: impl FnOnce() -> R) -> R {
    let _guard = NoCheckGuard::new();
    f()
}

/// The number of live [`NoCheckGuard`]s.
pub fn active_guards() -> usize {
    TOGGLE.lock().unwrap().count
}
