//! A mock moving heap for tests.
//!
//! `MockHeap::collect` behaves like a moving collector that respects the pinned roots table:
//! restrained objects stay where they are, unrooted objects are reclaimed, and every other object
//! is moved to a new address.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::util::pinned_roots::PinnedRoots;
use crate::util::ObjectReference;

struct MockObject {
    storage: Box<[u64]>,
    rooted: bool,
}

#[derive(Default, Debug, PartialEq, Eq)]
pub struct CollectionStats {
    pub kept: usize,
    pub moved: usize,
    pub reclaimed: usize,
}

#[derive(Default)]
pub struct MockHeap {
    objects: Mutex<HashMap<ObjectReference, MockObject>>,
    forwarding: Mutex<HashMap<ObjectReference, ObjectReference>>,
}

impl MockHeap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a rooted object of `words` words, each initialized to `fill`.
    pub fn alloc(&self, words: usize, fill: u64) -> ObjectReference {
        let storage = vec![fill; words.max(1)].into_boxed_slice();
        let object = ObjectReference::from_ptr(storage.as_ptr()).unwrap();
        self.objects.lock().unwrap().insert(
            object,
            MockObject {
                storage,
                rooted: true,
            },
        );
        object
    }

    /// Drop the heap's own root to `object`.  It is reclaimed by the next collection unless it
    /// is restrained.
    pub fn unroot(&self, object: ObjectReference) {
        if let Some(o) = self.objects.lock().unwrap().get_mut(&object) {
            o.rooted = false;
        }
    }

    pub fn is_live(&self, object: ObjectReference) -> bool {
        self.objects.lock().unwrap().contains_key(&object)
    }

    /// Read the first word of a live object.
    pub fn first_word(&self, object: ObjectReference) -> Option<u64> {
        self.objects
            .lock()
            .unwrap()
            .get(&object)
            .map(|o| o.storage[0])
    }

    /// Where a moved object went.
    pub fn forwarded(&self, object: ObjectReference) -> Option<ObjectReference> {
        self.forwarding.lock().unwrap().get(&object).copied()
    }

    pub fn collect(&self, roots: &PinnedRoots) -> CollectionStats {
        let mut stats = CollectionStats::default();
        let mut objects = self.objects.lock().unwrap();
        let mut forwarding = self.forwarding.lock().unwrap();
        let old: Vec<ObjectReference> = objects.keys().copied().collect();
        // Freed storage is kept until the end of the collection so that moved objects never land
        // on an address that was in use before.
        let mut dead = Vec::new();
        for object in old {
            if roots.is_restrained(object) {
                stats.kept += 1;
                continue;
            }
            let mock = objects.remove(&object).unwrap();
            if !mock.rooted {
                stats.reclaimed += 1;
                dead.push(mock.storage);
                continue;
            }
            let storage = mock.storage.clone();
            let new_object = ObjectReference::from_ptr(storage.as_ptr()).unwrap();
            objects.insert(
                new_object,
                MockObject {
                    storage,
                    rooted: true,
                },
            );
            forwarding.insert(object, new_object);
            stats.moved += 1;
            dead.push(mock.storage);
        }
        drop(dead);
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrestrained_objects_move_or_die() {
        let heap = MockHeap::new();
        let roots = PinnedRoots::new();
        let survivor = heap.alloc(4, 7);
        let garbage = heap.alloc(4, 8);
        heap.unroot(garbage);

        let stats = heap.collect(&roots);
        assert_eq!(stats.moved, 1);
        assert_eq!(stats.reclaimed, 1);
        assert!(!heap.is_live(garbage));
        assert!(!heap.is_live(survivor));
        let moved = heap.forwarded(survivor).unwrap();
        assert_eq!(heap.first_word(moved), Some(7));
    }

    #[test]
    fn restrained_objects_stay() {
        let heap = MockHeap::new();
        let roots = PinnedRoots::new();
        let object = heap.alloc(4, 9);
        heap.unroot(object);
        roots.hold(object);

        let stats = heap.collect(&roots);
        assert_eq!(stats.kept, 1);
        assert!(heap.is_live(object));

        roots.unhold(object);
        heap.collect(&roots);
        assert!(!heap.is_live(object));
    }
}
