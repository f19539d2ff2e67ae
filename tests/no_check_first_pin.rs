use gcpin::vm::debug_vars::{self, DEFAULT_CHECK_VAR};
use gcpin::{memory_manager, no_check, PtrGuard};

// The service must not have started before this test, so this binary holds a single test.
#[test]
fn first_pin_inside_no_check_keeps_the_checker_disabled() {
    let value = Box::new(11u64);
    no_check(|| {
        assert_eq!(debug_vars::get(DEFAULT_CHECK_VAR), Some(0));
        // Starts the service.
        let mut guard = PtrGuard::pin(&*value);
        assert_eq!(debug_vars::get(DEFAULT_CHECK_VAR), Some(0));
        guard.release();
        assert_eq!(debug_vars::get(DEFAULT_CHECK_VAR), Some(0));
    });
    assert_eq!(
        debug_vars::get(DEFAULT_CHECK_VAR),
        Some(memory_manager::options().foreign_ptr_check)
    );
}
