//! The table of objects currently held by restrainers.
//!
//! This is the "live reference" a restraint holds: as long as an object has a positive hold
//! count here, a collector binding must treat it as a root that can neither be moved nor
//! reclaimed.  The same object may be held by several independent restraints at once, so holds
//! are counted.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::util::ObjectReference;

#[derive(Default)]
pub struct PinnedRoots {
    holds: Mutex<HashMap<ObjectReference, usize>>,
}

impl PinnedRoots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one hold on `object`.
    pub(crate) fn hold(&self, object: ObjectReference) {
        let mut holds = self.holds.lock().unwrap();
        *holds.entry(object).or_insert(0) += 1;
    }

    /// Drop one hold on `object`.
    pub(crate) fn unhold(&self, object: ObjectReference) {
        let mut holds = self.holds.lock().unwrap();
        let count = holds
            .get_mut(&object)
            .unwrap_or_else(|| panic!("{} is not held by any restraint", object));
        debug_assert!(*count > 0);
        *count -= 1;
        if *count == 0 {
            holds.remove(&object);
        }
    }

    /// Is `object` held by at least one restraint?  A collector must neither move nor reclaim
    /// such an object.
    pub fn is_restrained(&self, object: ObjectReference) -> bool {
        self.holds.lock().unwrap().contains_key(&object)
    }

    /// The number of restraints holding `object`.
    pub fn holds_of(&self, object: ObjectReference) -> usize {
        self.holds.lock().unwrap().get(&object).copied().unwrap_or(0)
    }

    /// The number of distinct objects currently restrained.
    pub fn len(&self) -> usize {
        self.holds.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Visit every restrained object.  The table is locked during the visit, so `f` must not pin
    /// or unpin anything.
    pub fn for_each(&self, mut f: impl FnMut(ObjectReference)) {
        let holds = self.holds.lock().unwrap();
        for object in holds.keys() {
            f(*object);
        }
    }
}
