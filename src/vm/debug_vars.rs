//! The managed runtime's debug variables.
//!
//! A runtime exposes its debug toggles as a table that maps a name to an integer cell, much like
//! `GODEBUG` variables.  The pinning service only needs one of them: the foreign pointer checker,
//! which rejects foreign calls whose arguments reference managed memory that itself contains
//! managed pointers.  Pinned references legitimately violate that check, so
//! [`crate::util::no_check`] switches it off around such calls.
//!
//! A binding registers its real cell with [`register`].  Until it does, the built-in
//! [`FOREIGN_PTR_CHECK`] cell is used under the name [`DEFAULT_CHECK_VAR`].

use std::sync::atomic::{AtomicI32, Ordering};

use spin::RwLock;

use crate::util::log::{debug, warn};
pub use crate::util::options::DEFAULT_CHECK_VAR;

/// The built-in foreign pointer checker setting.  0 means the check is disabled.
pub static FOREIGN_PTR_CHECK: AtomicI32 = AtomicI32::new(1);

/// One named debug variable.
#[derive(Clone, Copy, Debug)]
pub struct DebugVar {
    pub name: &'static str,
    pub value: &'static AtomicI32,
}

lazy_static! {
    static ref DEBUG_VARS: RwLock<Vec<DebugVar>> = RwLock::new(vec![DebugVar {
        name: DEFAULT_CHECK_VAR,
        value: &FOREIGN_PTR_CHECK,
    }]);
}

/// Register a debug variable of the runtime.  A variable registered under an existing name
/// replaces the old one.  Return true if the name was not registered before.
///
/// Variables should be registered before the first [`crate::util::no_check`] call, which looks
/// up the checker variable once and keeps using it.
pub fn register(name: &'static str, value: &'static AtomicI32) -> bool {
    let mut vars = DEBUG_VARS.write();
    if let Some(var) = vars.iter_mut().find(|v| v.name == name) {
        warn!("Debug variable {} is registered again. The new cell replaces the old one.", name);
        var.value = value;
        false
    } else {
        debug!("Registered debug variable {}", name);
        vars.push(DebugVar { name, value });
        true
    }
}

/// Find the cell of a debug variable by name.
pub fn lookup(name: &str) -> Option<&'static AtomicI32> {
    DEBUG_VARS
        .read()
        .iter()
        .find(|v| v.name == name)
        .map(|v| v.value)
}

/// Read the current value of a debug variable.
pub fn get(name: &str) -> Option<i32> {
    lookup(name).map(|cell| cell.load(Ordering::SeqCst))
}

/// All registered debug variables and their current values.
pub fn snapshot() -> Vec<(&'static str, i32)> {
    DEBUG_VARS
        .read()
        .iter()
        .map(|v| (v.name, v.value.load(Ordering::SeqCst)))
        .collect()
}
