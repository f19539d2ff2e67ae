use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use gcpin::memory_manager;
use gcpin::util::leak::Leak;
use gcpin::{Pinner, PtrGuard};

// The leak handler is global.
static HANDLER_LOCK: Mutex<()> = Mutex::new(());

fn with_recorded_leaks(f: impl FnOnce()) -> Vec<Leak> {
    let _lock = HANDLER_LOCK.lock().unwrap_or_else(|p| p.into_inner());
    let leaks = Arc::new(Mutex::new(Vec::new()));
    let recorded = leaks.clone();
    memory_manager::set_leak_handler(Box::new(move |leak: &Leak| {
        recorded.lock().unwrap().push(*leak);
    }));
    let result = catch_unwind(AssertUnwindSafe(f));
    memory_manager::reset_leak_handler();
    if let Err(e) = result {
        std::panic::resume_unwind(e);
    }
    let leaks = leaks.lock().unwrap().clone();
    leaks
}

// A leaked object stays pinned forever, so it must outlive the test.
fn leaked_object() -> &'static u64 {
    Box::leak(Box::new(17))
}

#[test]
fn unreleased_guard_is_reported_once() {
    let object = leaked_object();
    let leaks = with_recorded_leaks(|| {
        let guard = PtrGuard::pin(object);
        drop(guard);
    });
    assert_eq!(
        leaks,
        vec![Leak {
            owner: "PtrGuard",
            restraints: 1
        }]
    );
    let object = gcpin::ObjectReference::from_ptr(object as *const u64).unwrap();
    assert!(memory_manager::is_restrained(object));
}

#[test]
fn unpinned_group_dropped_with_pins_is_reported() {
    let objects = [leaked_object(), leaked_object(), leaked_object()];
    let leaks = with_recorded_leaks(|| {
        let pinner = Pinner::new();
        for object in objects {
            pinner.pin(object);
        }
    });
    assert_eq!(
        leaks,
        vec![Leak {
            owner: "Pinner",
            restraints: 3
        }]
    );
}

#[test]
fn released_pins_are_not_leaks() {
    let value = Box::new(1u64);
    let leaks = with_recorded_leaks(|| {
        let mut guard = PtrGuard::pin(&*value);
        guard.release();
        drop(guard);

        let pinner = Pinner::new();
        pinner.pin(&*value);
        pinner.unpin();
        drop(pinner);

        // Nothing was ever pinned.
        drop(Pinner::new());
    });
    assert!(leaks.is_empty());
}

#[test]
fn default_handler_panics() {
    let _lock = HANDLER_LOCK.lock().unwrap_or_else(|p| p.into_inner());
    memory_manager::reset_leak_handler();
    let calls = AtomicUsize::new(0);
    let result = catch_unwind(AssertUnwindSafe(|| {
        let guard = PtrGuard::pin(leaked_object());
        calls.fetch_add(1, Ordering::SeqCst);
        drop(guard);
    }));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let payload = result.unwrap_err();
    let message = payload
        .downcast_ref::<String>()
        .cloned()
        .unwrap_or_default();
    assert!(message.contains("Forgot to call unpin()"), "{}", message);
}
