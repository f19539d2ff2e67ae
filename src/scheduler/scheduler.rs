use super::work::RestraintWork;
use super::worker::Restrainer;
use super::worker_monitor::WorkerMonitor;
use crate::service::PinningService;
use crate::util::log::{debug, info};
use crossbeam::deque::{Injector, Steal};
use std::sync::atomic::{AtomicUsize, Ordering};

/// The queue of restraint work packets and the threads that run them.
pub(crate) struct RestraintScheduler {
    queue: Injector<Box<dyn RestraintWork>>,
    monitor: WorkerMonitor,
    worker_count: usize,
    spawned: spin::Once<()>,
    /// Work packets executed so far, by all restrainers.
    executed: AtomicUsize,
}

impl RestraintScheduler {
    pub fn new(worker_count: usize) -> Self {
        assert!(worker_count > 0, "The restrainer pool needs at least one thread");
        Self {
            queue: Injector::new(),
            monitor: WorkerMonitor::new(worker_count),
            worker_count,
            spawned: spin::Once::new(),
            executed: AtomicUsize::new(0),
        }
    }

    /// Start the restrainer threads.  Only the first call has any effect.
    pub fn spawn_workers(&'static self, service: &'static PinningService) {
        self.spawned.call_once(|| {
            info!("Starting {} restrainer thread(s)", self.worker_count);
            for ordinal in 0..self.worker_count {
                let mut worker = Restrainer::new(ordinal, self);
                let spawned = std::thread::Builder::new()
                    .name(format!("gcpin-restrainer-{}", ordinal))
                    .spawn(move || worker.run(service));
                if let Err(e) = spawned {
                    panic!("Failed to spawn restrainer thread {}: {}", ordinal, e);
                }
            }
        });
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Add one work packet and wake one restrainer.
    pub fn add_work(&self, work: impl RestraintWork) {
        self.queue.push(Box::new(work));
        self.monitor.notify_work_available(false);
    }

    /// Add many work packets at once and wake every restrainer.
    pub fn bulk_add(&self, works: Vec<Box<dyn RestraintWork>>) {
        if works.is_empty() {
            return;
        }
        debug!("Scheduling {} work packets", works.len());
        for work in works {
            self.queue.push(work);
        }
        self.monitor.notify_work_available(true);
    }

    fn pop(&self) -> Option<Box<dyn RestraintWork>> {
        loop {
            match self.queue.steal() {
                Steal::Success(work) => return Some(work),
                Steal::Empty => return None,
                Steal::Retry => continue,
            }
        }
    }

    /// Get a work packet for `worker`, parking it until one is available.
    pub fn poll(&self, worker: &Restrainer) -> Box<dyn RestraintWork> {
        loop {
            if let Some(work) = self.pop() {
                return work;
            }
            self.monitor
                .park_and_wait(worker.ordinal, || !self.queue.is_empty());
        }
    }

    pub(super) fn on_work_executed(&self) {
        self.executed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn executed_work_packets(&self) -> usize {
        self.executed.load(Ordering::Relaxed)
    }

    pub fn parked_workers(&self) -> usize {
        self.monitor.parked_workers()
    }
}
