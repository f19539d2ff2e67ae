//! One lifetime of a pin group.
//!
//! A lifetime owns every restraint started in it, every escape slot written for those
//! restraints, and the release gate the restraints park behind.  It begins with the first pin of
//! a [`crate::Pinner`] and ends when the pinner is unpinned.

use std::sync::{Arc, Mutex};

use crossbeam::sync::WaitGroup;

use crate::error::PinError;
use crate::scheduler::restraint::{ParkedRestraint, PinnedRegion, Restrain, Unrestrain};
use crate::scheduler::RestraintWork;
use crate::service::PinningService;
use crate::util::escape::{EscapeSlot, EscapeSlots};
use crate::util::handshake::ReleaseGate;
use crate::util::log::{debug, trace};
use crate::util::SynchronizedCounter;
use crate::util::ObjectReference;

pub(crate) struct PinLifetime {
    generation: usize,
    gate: ReleaseGate<ParkedRestraint>,
    /// Restraints started but not yet released.
    pending: SynchronizedCounter,
    /// The lifetime's end of the wait group.  Every restraint holds a clone until it is released.
    /// Taken by `end_restraints`.
    drained: Mutex<Option<WaitGroup>>,
    slots: Mutex<EscapeSlots>,
}

impl PinLifetime {
    pub fn new(generation: usize) -> Self {
        Self {
            generation,
            gate: ReleaseGate::new(),
            pending: SynchronizedCounter::new(),
            drained: Mutex::new(Some(WaitGroup::new())),
            slots: Mutex::new(EscapeSlots::new()),
        }
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    pub(crate) fn gate(&self) -> &ReleaseGate<ParkedRestraint> {
        &self.gate
    }

    pub fn pending(&self) -> usize {
        self.pending.peek()
    }

    pub fn escape_slots(&self) -> usize {
        self.slots.lock().unwrap().len()
    }

    /// Start a restraint of `object` in this lifetime and block until the restrainer confirms
    /// that the object is held.
    pub fn begin_restraint(
        self: &Arc<Self>,
        object: ObjectReference,
        service: &'static PinningService,
    ) -> Result<Arc<PinnedRegion>, PinError> {
        // Accepting the pin is atomic with respect to the release broadcast.
        let token = self
            .gate
            .if_closed(|| {
                let token = self.drained.lock().unwrap().as_ref().map(WaitGroup::clone);
                if token.is_some() {
                    self.pending.increment();
                }
                token
            })
            .flatten()
            .ok_or(PinError::FinishedLifetime {
                generation: self.generation,
            })?;

        let region = Arc::new(PinnedRegion::new(object));
        service.scheduler.add_work(Restrain {
            region: region.clone(),
            lifetime: self.clone(),
            token,
        });
        // Pinned-confirmed.
        region.wait_pinned();
        Ok(region)
    }

    /// Write `object` into `slot` and remember the slot, unless the lifetime is finishing.
    pub fn store(&self, object: ObjectReference, slot: EscapeSlot) -> Result<(), PinError> {
        // The slot lock is held across the check so that `end_restraints` clears every slot that
        // was accepted.
        let mut slots = self.slots.lock().unwrap();
        if self.gate.is_open() {
            return Err(PinError::FinishedLifetime {
                generation: self.generation,
            });
        }
        trace!("Storing {} at {}", object, slot.as_address());
        slots.add(slot, object);
        Ok(())
    }

    /// Clear every escape slot, broadcast the release to every parked restraint, and block until
    /// all restraints of this lifetime have confirmed.  Called once per lifetime, by the unpin
    /// that took the lifetime out of its pinner.
    pub fn end_restraints(&self, service: &'static PinningService) {
        // Opening the gate flips the lifetime to finishing.
        let parked = self.gate.open();
        debug_assert!(
            parked.is_some(),
            "Lifetime {} was ended twice",
            self.generation
        );
        let parked = parked.unwrap_or_default();

        let cleared = {
            let mut slots = self.slots.lock().unwrap();
            let n = slots.len();
            slots.clear_all();
            n
        };
        debug!(
            "Lifetime {}: cleared {} escape slot(s), waking {} of {} restraint(s)",
            self.generation,
            cleared,
            parked.len(),
            self.pending.peek()
        );

        service.scheduler.bulk_add(
            parked
                .into_iter()
                .map(|parked| Box::new(Unrestrain { parked }) as Box<dyn RestraintWork>)
                .collect(),
        );

        // Release-confirmed, for every restraint of this lifetime.
        let drained = self.drained.lock().unwrap().take();
        if let Some(drained) = drained {
            drained.wait();
        }
        debug_assert_eq!(self.pending.peek(), 0);
    }

    pub(crate) fn on_restraint_released(&self) {
        self.pending.decrement();
    }
}
