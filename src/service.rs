//! The process-wide pinning service.

use crate::scheduler::RestraintScheduler;
use crate::util::log::{debug, info};
use crate::util::options::Options;
use crate::util::pinned_roots::PinnedRoots;
use crate::vm::debug_vars::DEFAULT_CHECK_VAR;

// There is one pinning service per process: pinned roots are global, like the heap the
// collector manages.
static OPTIONS: spin::Once<Options> = spin::Once::new();
static SERVICE: spin::Once<PinningService> = spin::Once::new();

/// The pinned roots table, the restrainer pool and the options they were started with.
pub struct PinningService {
    pub options: &'static Options,
    pub pinned_roots: PinnedRoots,
    pub(crate) scheduler: RestraintScheduler,
}

impl PinningService {
    fn new(options: &'static Options) -> Self {
        match crate::util::logger::try_init() {
            Ok(_) => debug!("gcpin initialized the logger."),
            Err(_) => debug!(
                "gcpin failed to initialize the logger. Possibly a logger has been initialized by user."
            ),
        }
        if options.check_var == DEFAULT_CHECK_VAR {
            // The service may be started by a pin inside `no_check`.
            crate::util::no_check::seed_builtin_checker(options.foreign_ptr_check);
        }
        info!(
            "gcpin {} starting with {} restrainer thread(s)",
            env!("CARGO_PKG_VERSION"),
            options.restrainer_threads
        );
        PinningService {
            options,
            pinned_roots: PinnedRoots::new(),
            scheduler: RestraintScheduler::new(options.restrainer_threads),
        }
    }
}

/// Fix the options of the service.  This must be called before the first pin or `no_check`.
/// Return false, and ignore `options`, if the options have already been fixed.
pub fn init_options(options: Options) -> bool {
    let mut accepted = false;
    OPTIONS.call_once(|| {
        accepted = true;
        options
    });
    accepted
}

/// The options of the service.  Read from `GCPIN_*` environment variables on first use unless
/// [`init_options`] was called before.
pub fn options() -> &'static Options {
    OPTIONS.call_once(Options::default)
}

/// The service, started on first use.
pub fn service() -> &'static PinningService {
    let service = SERVICE.call_once(|| PinningService::new(options()));
    service.scheduler.spawn_workers(service);
    service
}

/// Has the service been started?
pub fn is_started() -> bool {
    SERVICE.is_completed()
}
