use super::scheduler::RestraintScheduler;
use crate::service::PinningService;
use crate::util::log::trace;

/// A restrainer.  This part is privately owned by a restrainer thread.
pub(crate) struct Restrainer {
    pub ordinal: usize,
    scheduler: &'static RestraintScheduler,
}

impl Restrainer {
    pub fn new(ordinal: usize, scheduler: &'static RestraintScheduler) -> Self {
        Self { ordinal, scheduler }
    }

    pub fn run(&mut self, service: &'static PinningService) {
        loop {
            let work = self.scheduler.poll(self);
            trace!("Restrainer {} executing {}", self.ordinal, work.name());
            work.do_work(self, service);
            self.scheduler.on_work_executed();
        }
    }
}
