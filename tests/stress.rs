mod common;

use common::ForeignCells;
use gcpin::util::test_util::panic_after;
use gcpin::memory_manager;
use gcpin::PtrGuard;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

// Many guards alive at once, pinned and released in a random order.  Every slot must hold the
// pinned address while its guard is pinned, and null as soon as the guard is released.
#[test]
fn random_toggles_leave_no_stale_slot() {
    panic_after(300000, || {
        const GUARDS: usize = 20000;
        const TOGGLES: usize = 60000;
        let objects: Vec<Box<u64>> = (0..GUARDS as u64).map(Box::new).collect();
        let cells = ForeignCells::new(GUARDS);
        let mut guards: Vec<Option<PtrGuard>> = (0..GUARDS).map(|_| None).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(0x9c_1a_57);

        for _ in 0..TOGGLES {
            let i = rng.random_range(0..GUARDS);
            match guards[i].take() {
                None => {
                    let guard = PtrGuard::pin(&*objects[i]);
                    guard.poke(cells.slot(i));
                    assert_eq!(cells.read(i), &*objects[i] as *const u64 as *mut u8);
                    guards[i] = Some(guard);
                }
                Some(mut guard) => {
                    guard.release();
                    assert!(cells.read(i).is_null());
                }
            }
        }

        let live = guards.iter().filter(|g| g.is_some()).count();
        assert_eq!(memory_manager::pinned_roots().len(), live);
        for (i, guard) in guards.iter_mut().enumerate() {
            if let Some(guard) = guard.as_mut() {
                assert!(!cells.read(i).is_null());
                guard.release();
            }
        }
        assert!(cells.all_null());
        assert!(memory_manager::pinned_roots().is_empty());
    })
}
