//! This module contains `WorkerMonitor`, which allows restrainer threads to park when there is
//! nothing to do, and lets pinning callers wake them when they add work packets.

use std::sync::{Condvar, Mutex};

use crate::util::log::trace;

/// This struct counts the number of parked restrainers.
struct WorkerParker {
    /// The total number of workers.
    worker_count: usize,
    /// Number of parked workers.
    parked_workers: usize,
}

impl WorkerParker {
    fn inc_parked_workers(&mut self) {
        debug_assert!(self.parked_workers < self.worker_count);
        self.parked_workers += 1;
    }

    fn dec_parked_workers(&mut self) {
        debug_assert!(self.parked_workers > 0);
        self.parked_workers -= 1;
    }
}

pub(crate) struct WorkerMonitor {
    /// The synchronized part.
    sync: Mutex<WorkerParker>,
    /// Workers wait on this when idle.  Notified when work packets are added.
    workers_have_anything_to_do: Condvar,
}

impl WorkerMonitor {
    pub fn new(worker_count: usize) -> Self {
        Self {
            sync: Mutex::new(WorkerParker {
                worker_count,
                parked_workers: 0,
            }),
            workers_have_anything_to_do: Default::default(),
        }
    }

    /// Wake up workers when more work packets are made available.
    ///
    /// Work packets are pushed to the queue before this is called, without holding the monitor
    /// lock.  Taking the lock here orders the notification after any worker that has already
    /// checked the queue under the lock, so a worker cannot miss a packet and sleep forever.
    pub fn notify_work_available(&self, all: bool) {
        let _sync = self.sync.lock().unwrap();
        if all {
            self.workers_have_anything_to_do.notify_all();
        } else {
            self.workers_have_anything_to_do.notify_one();
        }
    }

    /// Park a worker until it is notified, unless `has_work` (checked under the monitor lock)
    /// says there is work to do.  Spurious wake-ups are possible.  The worker polls the queue
    /// again and parks again if it is still empty.
    pub fn park_and_wait(&self, ordinal: usize, has_work: impl Fn() -> bool) {
        let mut sync = self.sync.lock().unwrap();
        if has_work() {
            return;
        }
        sync.inc_parked_workers();
        trace!(
            "Restrainer {} parked.  parked/total: {}/{}.",
            ordinal,
            sync.parked_workers,
            sync.worker_count
        );
        sync = self.workers_have_anything_to_do.wait(sync).unwrap();
        sync.dec_parked_workers();
        trace!("Restrainer {} unparked.", ordinal);
    }

    pub fn parked_workers(&self) -> usize {
        self.sync.lock().unwrap().parked_workers
    }
}
