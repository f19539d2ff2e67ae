mod common;

use common::ForeignCells;
use gcpin::util::test_util::panic_after;
use gcpin::memory_manager;
use gcpin::{PinError, PinState, PtrGuard};

#[test]
fn poke_three_slots_then_release() {
    panic_after(10000, || {
        let buffer = Box::new([7u8; 64]);
        let x = buffer.as_ptr() as *mut u8;
        let cells = ForeignCells::new(3);

        let mut guard = PtrGuard::pin(&*buffer);
        assert_eq!(guard.state(), PinState::Pinned);
        for i in 0..3 {
            guard.poke(cells.slot(i));
        }
        for i in 0..3 {
            assert_eq!(cells.read(i), x);
        }
        assert_eq!(guard.escape_slots(), 3);
        assert!(memory_manager::is_restrained(guard.object()));

        guard.release();
        assert!(cells.all_null());
        assert_eq!(guard.state(), PinState::Released);
        assert!(!memory_manager::is_restrained(guard.object()));
    })
}

#[test]
fn pinned_address_is_the_object_address() {
    let value = Box::new(42u64);
    let mut guard = PtrGuard::pin(&*value);
    assert_eq!(guard.as_ptr::<u64>(), &*value as *const u64);
    assert_eq!(unsafe { *guard.as_ptr::<u64>() }, 42);
    guard.release();
}

#[test]
fn release_is_idempotent() {
    panic_after(10000, || {
        let value = Box::new(1u32);
        let cells = ForeignCells::new(1);
        let mut guard = PtrGuard::pin(&*value);
        guard.poke(cells.slot(0));

        guard.release();
        guard.release();
        guard.release();
        assert!(guard.is_released());
        assert!(cells.all_null());
        assert_eq!(memory_manager::pinned_roots().holds_of(guard.object()), 0);
    })
}

#[test]
fn release_without_poke() {
    let value = Box::new(1u32);
    let mut guard = PtrGuard::pin(&*value);
    assert_eq!(guard.escape_slots(), 0);
    guard.release();
    assert!(!memory_manager::is_restrained(guard.object()));
}

#[test]
fn fan_out_to_many_slots() {
    panic_after(30000, || {
        const SLOTS: usize = 1024;
        let value = Box::new([0u64; 4]);
        let x = value.as_ptr() as *mut u8;
        let cells = ForeignCells::new(SLOTS);

        let mut guard = PtrGuard::pin(&*value);
        for i in 0..SLOTS {
            guard.poke(cells.slot(i));
        }
        // The same slot twice is harmless.
        guard.poke(cells.slot(0));
        assert!((0..SLOTS).all(|i| cells.read(i) == x));

        guard.release();
        assert!(cells.all_null());
    })
}

#[test]
fn independent_guards_release_independently() {
    panic_after(10000, || {
        let a = Box::new(1u64);
        let b = Box::new(2u64);
        let cells = ForeignCells::new(2);
        let mut guard_a = PtrGuard::pin(&*a);
        let mut guard_b = PtrGuard::pin(&*b);
        guard_a.poke(cells.slot(0));
        guard_b.poke(cells.slot(1));

        guard_a.release();
        assert!(cells.read(0).is_null());
        assert_eq!(cells.read(1), &*b as *const u64 as *mut u8);
        assert!(memory_manager::is_restrained(guard_b.object()));

        guard_b.release();
        assert!(cells.all_null());
    })
}

#[test]
fn guards_from_many_threads() {
    panic_after(30000, || {
        let handles: Vec<_> = (0..8)
            .map(|t| {
                std::thread::spawn(move || {
                    let cells = ForeignCells::new(16);
                    for round in 0..50 {
                        let value = Box::new(t * 1000 + round);
                        let mut guard = PtrGuard::pin(&*value);
                        for i in 0..cells.len() {
                            guard.poke(cells.slot(i));
                        }
                        guard.release();
                        assert!(cells.all_null());
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
    })
}

#[test]
#[should_panic(expected = "has already been released")]
fn poke_after_release() {
    let value = Box::new(1u8);
    let cells = ForeignCells::new(1);
    let mut guard = PtrGuard::pin(&*value);
    guard.release();
    guard.poke(cells.slot(0));
}

#[test]
fn try_poke_after_release() {
    let value = Box::new(1u8);
    let cells = ForeignCells::new(1);
    let mut guard = PtrGuard::pin(&*value);
    guard.release();
    assert_eq!(guard.try_poke(cells.slot(0)), Err(PinError::Released));
    assert!(cells.all_null());
}

#[test]
#[should_panic(expected = "is not a pointer to managed memory")]
fn pin_null() {
    PtrGuard::pin(std::ptr::null::<u64>());
}

#[test]
fn try_pin_null() {
    let err = PtrGuard::try_pin(std::ptr::null_mut::<u64>()).unwrap_err();
    assert!(matches!(err, PinError::NotAPointer { .. }));
}
