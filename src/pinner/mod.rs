//! Pin groups.
//!
//! A [`Pinner`] pins any number of managed objects with [`Pinner::pin`].  The pinned address of
//! each object can then be written into foreign memory with [`Pinned::store`].  All objects of a
//! pinner are unpinned together with [`Pinner::unpin`], which also zeroes every foreign slot the
//! pinned addresses were stored into.  After `unpin` the same pinner can be used again.
//!
//! ```ignore
//! let pinner = Pinner::new();
//! let pinned = pinner.pin(&buffer);
//! unsafe { pinned.store(EscapeSlot::from_ptr(&mut (*iovec).iov_base)) };
//! foreign_call(iovec);
//! pinner.unpin(); // iovec.iov_base is null again
//! ```
//!
//! A pinner that is dropped while it still has pinned objects is a leak and is reported to the
//! leak handler (see [`crate::util::leak`]), which panics by default.

pub(crate) mod lifetime;

use std::sync::{Arc, Mutex};

use atomic::{Atomic, Ordering};

use self::lifetime::PinLifetime;
use crate::error::PinError;
use crate::scheduler::restraint::PinnedRegion;
use crate::service;
use crate::util::escape::EscapeSlot;
use crate::util::leak::{report_leak, Leak};
use crate::util::log::{info, trace};
use crate::util::pin_state::{LifetimeState, PinState};
use crate::util::ObjectReference;
use crate::vm::Pinnable;

/// A pin group.  See the [module documentation](self).
pub struct Pinner {
    sync: Mutex<PinnerSync>,
    state: Atomic<LifetimeState>,
    /// Reported as the owner of a leak.
    owner: &'static str,
}

struct PinnerSync {
    /// The current lifetime.  Created by the first pin, taken by `unpin`.
    lifetime: Option<Arc<PinLifetime>>,
    /// The number of lifetimes started so far.
    generations: usize,
}

impl Pinner {
    pub fn new() -> Self {
        Self::with_owner("Pinner")
    }

    pub(crate) fn with_owner(owner: &'static str) -> Self {
        Self {
            sync: Mutex::new(PinnerSync {
                lifetime: None,
                generations: 0,
            }),
            state: Atomic::new(LifetimeState::Idle),
            owner,
        }
    }

    /// Run `f` with a fresh pinner, and unpin it when `f` returns or panics.
    pub fn scope<R>(f: impl FnOnce(&Pinner) -> R) -> R {
        struct UnpinOnExit(Pinner);
        impl Drop for UnpinOnExit {
            fn drop(&mut self) {
                self.0.unpin();
            }
        }
        let pinner = UnpinOnExit(Pinner::new());
        f(&pinner.0)
    }

    /// Pin the object `pointer` refers to.  The object will be neither moved nor reclaimed until
    /// [`Pinner::unpin`] is called.  Blocks until the object is held by a restrainer.
    ///
    /// Panics if `pointer` does not denote managed memory.
    pub fn pin<P: Pinnable>(&self, pointer: P) -> Pinned {
        self.try_pin(pointer).unwrap_or_else(|e| panic!("{}", e))
    }

    /// Like [`Pinner::pin`], but returns an error instead of panicking.
    pub fn try_pin<P: Pinnable>(&self, pointer: P) -> Result<Pinned, PinError> {
        let object = pointer.object_reference().ok_or(PinError::NotAPointer {
            type_name: std::any::type_name::<P>(),
        })?;
        let service = service::service();

        let mut sync = self.sync.lock().unwrap();
        let lifetime = match sync.lifetime.as_ref() {
            Some(lifetime) => lifetime.clone(),
            None => {
                sync.generations += 1;
                let lifetime = Arc::new(PinLifetime::new(sync.generations));
                sync.lifetime = Some(lifetime.clone());
                self.state.store(LifetimeState::Active, Ordering::Release);
                lifetime
            }
        };
        // The pinner stays locked until the pin is confirmed, so `unpin` cannot start the
        // release of this lifetime while the pin is still being accepted.
        let region = lifetime.begin_restraint(object, service)?;
        drop(sync);

        if service.options.verbose {
            info!("Pinned {} in lifetime {}", object, lifetime.generation());
        } else {
            trace!("Pinned {} in lifetime {}", object, lifetime.generation());
        }
        Ok(Pinned { region, lifetime })
    }

    /// Unpin every object pinned by this pinner, zero every foreign slot their addresses were
    /// stored into, and block until all restraints have released their objects.  Calling `unpin`
    /// on a pinner with nothing pinned does nothing.
    pub fn unpin(&self) {
        let mut sync = self.sync.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let Some(lifetime) = sync.lifetime.take() else {
            return;
        };
        self.state.store(LifetimeState::Finishing, Ordering::Release);
        let pending = lifetime.pending();
        lifetime.end_restraints(service::service());
        self.state.store(LifetimeState::Idle, Ordering::Release);
        drop(sync);

        if service::options().verbose {
            info!("Unpinned {} object(s) of lifetime {}", pending, lifetime.generation());
        } else {
            trace!("Unpinned {} object(s) of lifetime {}", pending, lifetime.generation());
        }
    }

    /// The state of the current lifetime.
    pub fn state(&self) -> LifetimeState {
        self.state.load(Ordering::Acquire)
    }

    /// Does this pinner have pinned objects that have not been unpinned?
    pub fn is_pinning(&self) -> bool {
        self.state() != LifetimeState::Idle
    }

    /// The number of restraints of the current lifetime that have not been released.
    pub fn pending(&self) -> usize {
        self.current_lifetime().map_or(0, |l| l.pending())
    }

    /// The number of escape slots recorded in the current lifetime.
    pub fn escape_slots(&self) -> usize {
        self.current_lifetime().map_or(0, |l| l.escape_slots())
    }

    /// The number of lifetimes this pinner has started.
    pub fn generations(&self) -> usize {
        self.sync.lock().unwrap().generations
    }

    fn current_lifetime(&self) -> Option<Arc<PinLifetime>> {
        self.sync.lock().unwrap().lifetime.clone()
    }
}

impl Default for Pinner {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Pinner {
    fn drop(&mut self) {
        let sync = self.sync.get_mut().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(lifetime) = sync.lifetime.take() {
            let restraints = lifetime.pending();
            // The restraints of a leaked lifetime stay parked, and keep their objects held,
            // forever.
            std::mem::forget(lifetime);
            report_leak(Leak {
                owner: self.owner,
                restraints,
            });
        }
    }
}

/// An object pinned by a [`Pinner`].
///
/// Dropping a `Pinned` does not unpin the object.  The object stays pinned until its pinner is
/// unpinned.
pub struct Pinned {
    region: Arc<PinnedRegion>,
    lifetime: Arc<PinLifetime>,
}

impl Pinned {
    /// The pinned object.
    pub fn object(&self) -> ObjectReference {
        self.region.object
    }

    /// The pinned address as a raw pointer, e.g. to pass it to a foreign function.
    pub fn as_ptr<T>(&self) -> *const T {
        self.region.object.to_ptr()
    }

    pub fn state(&self) -> PinState {
        self.region.state()
    }

    /// Store the pinned address into `slot`.  The slot will be set to null when the pinner is
    /// unpinned.  The same address may be stored into any number of slots.
    ///
    /// Panics if the pinner has been unpinned since this object was pinned.
    pub fn store(&self, slot: EscapeSlot) {
        self.try_store(slot).unwrap_or_else(|e| panic!("{}", e))
    }

    /// Like [`Pinned::store`], but returns an error instead of panicking.
    pub fn try_store(&self, slot: EscapeSlot) -> Result<(), PinError> {
        self.lifetime.store(self.region.object, slot)
    }

    /// Which lifetime of its pinner this object was pinned in.
    pub fn generation(&self) -> usize {
        self.lifetime.generation()
    }
}

impl std::fmt::Debug for Pinned {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Pinned")
            .field("object", &self.region.object)
            .field("state", &self.region.state())
            .field("generation", &self.lifetime.generation())
            .finish()
    }
}
