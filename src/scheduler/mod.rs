//! The restrainer pool.
//!
//! Restraints are not threads.  A restraint is a work packet run by one of a few restrainer
//! threads: it takes a hold on its object in the pinned roots table, parks itself behind its
//! lifetime's release gate and lets the pinning caller continue.  A parked restraint is just a
//! heap record, so tens of thousands of them can be outstanding at once.  When the gate opens,
//! every parked restraint is scheduled again as an [`restraint::Unrestrain`] packet, which drops
//! the hold and confirms the release.

mod scheduler;
mod work;
mod worker;
mod worker_monitor;

pub(crate) mod restraint;

pub(crate) use scheduler::RestraintScheduler;
pub(crate) use work::RestraintWork;
pub(crate) use worker::Restrainer;
