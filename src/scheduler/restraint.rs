//! Restraint work packets.

use std::sync::Arc;

use atomic::{Atomic, Ordering};
use crossbeam::sync::WaitGroup;

use super::{RestraintWork, Restrainer};
use crate::pinner::lifetime::PinLifetime;
use crate::service::PinningService;
use crate::util::handshake::Latch;
use crate::util::log::trace;
use crate::util::pin_state::PinState;
use crate::util::ObjectReference;

/// One managed object being restrained.
pub(crate) struct PinnedRegion {
    pub object: ObjectReference,
    state: Atomic<PinState>,
    /// Released by the restrainer once the object is held and the restraint is parked.
    pinned: Latch,
}

impl PinnedRegion {
    pub fn new(object: ObjectReference) -> Self {
        Self {
            object,
            state: Atomic::new(PinState::Pinning),
            pinned: Latch::new(),
        }
    }

    pub fn state(&self) -> PinState {
        self.state.load(Ordering::Acquire)
    }

    fn set_state(&self, state: PinState) {
        let old = self.state.swap(state, Ordering::AcqRel);
        debug_assert!(
            (old as u8) < (state as u8),
            "Pinned region {} went from {} to {}",
            self.object,
            old,
            state
        );
    }

    /// Block until the restrainer confirms the object is held.
    pub fn wait_pinned(&self) {
        self.pinned.wait();
    }
}

/// Take a hold on the region's object, park behind the lifetime's release gate, and confirm the
/// pin.
pub(crate) struct Restrain {
    pub region: Arc<PinnedRegion>,
    pub lifetime: Arc<PinLifetime>,
    /// Dropped when the restraint is released.  The lifetime waits on the other end.
    pub token: WaitGroup,
}

impl RestraintWork for Restrain {
    fn do_work(self: Box<Self>, worker: &mut Restrainer, service: &'static PinningService) {
        let Restrain {
            region,
            lifetime,
            token,
        } = *self;
        service.pinned_roots.hold(region.object);
        region.set_state(PinState::Pinned);
        trace!(
            "Restrainer {} holds {} in lifetime {}",
            worker.ordinal,
            region.object,
            lifetime.generation()
        );

        let parked = ParkedRestraint {
            region: region.clone(),
            lifetime: lifetime.clone(),
            token,
        };
        // Park first so the caller only proceeds once the restraint is waiting for release.  The
        // pinner lock is held until the pin is confirmed, so the gate cannot be open yet.
        let parked = lifetime.gate().park(parked);
        debug_assert!(
            parked.is_ok(),
            "Lifetime {} finished before {} was parked",
            lifetime.generation(),
            region.object
        );
        region.pinned.release();
        if let Err(parked) = parked {
            parked.unrestrain(worker, service);
        }
    }
}

/// A restraint waiting behind its lifetime's release gate.  It owns the hold on its object until
/// it is woken.
pub(crate) struct ParkedRestraint {
    region: Arc<PinnedRegion>,
    lifetime: Arc<PinLifetime>,
    token: WaitGroup,
}

impl ParkedRestraint {
    fn unrestrain(self, worker: &mut Restrainer, service: &'static PinningService) {
        service.pinned_roots.unhold(self.region.object);
        self.region.set_state(PinState::Released);
        self.lifetime.on_restraint_released();
        trace!(
            "Restrainer {} released {} from lifetime {}",
            worker.ordinal,
            self.region.object,
            self.lifetime.generation()
        );
        // Release-confirmed.
        drop(self.token);
    }
}

/// Wake one parked restraint: drop its hold and confirm the release.
pub(crate) struct Unrestrain {
    pub parked: ParkedRestraint,
}

impl RestraintWork for Unrestrain {
    fn do_work(self: Box<Self>, worker: &mut Restrainer, service: &'static PinningService) {
        self.parked.unrestrain(worker, service);
    }
}
