//! States of pinned regions and of pin lifetimes.

use bytemuck::NoUninit;
use strum_macros::{Display, IntoStaticStr};

/// The state of one pinned region.
///
/// A region is `Pinning` from the pin request until its restraint holds the object and has
/// parked.  It becomes `Released` once every escape slot written for it has been cleared and its
/// restraint has dropped the hold.  The state never goes backwards.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Display, IntoStaticStr, NoUninit)]
#[cfg_attr(test, derive(strum_macros::EnumIter))]
pub enum PinState {
    Pinning,
    Pinned,
    Released,
}

/// The state of the current lifetime of a [`crate::Pinner`].
///
/// `Idle → Active → Finishing → Idle`.  A pinner is `Active` from its first pin until `unpin` is
/// called, `Finishing` while `unpin` waits for the restraints to drain, and `Idle` again after
/// that, ready for a new lifetime.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Display, IntoStaticStr, NoUninit)]
#[cfg_attr(test, derive(strum_macros::EnumIter))]
pub enum LifetimeState {
    Idle,
    Active,
    Finishing,
}
