use std::panic::catch_unwind;

use gcpin::memory_manager;
use gcpin::util::no_check::active_guards;
use gcpin::NoCheckGuard;

fn panic_message(result: std::thread::Result<NoCheckGuard>) -> String {
    let payload = result.err().expect("NoCheckGuard::new should panic");
    payload
        .downcast_ref::<String>()
        .cloned()
        .unwrap_or_default()
}

// Options are fixed once per process, so this binary holds a single test.
#[test]
fn unknown_checker_variable() {
    assert!(memory_manager::init_options_from_pairs([(
        "check_var",
        "no_such_var"
    )]));
    // Every attempt reports the missing variable, not a poisoned lock.
    for _ in 0..2 {
        let message = panic_message(catch_unwind(NoCheckGuard::new));
        assert!(
            message.contains("Couldn't find no_such_var debug variable"),
            "{}",
            message
        );
    }
    assert_eq!(active_guards(), 0);
}
