//! Errors reported by the pinning API.
//!
//! Every one of them is a programming error on the caller's side.  The primary API panics with
//! the `Display` text of the error; the `try_` variants hand the error back instead.

use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PinError {
    /// The value given to `pin` does not denote managed memory.
    NotAPointer {
        /// The type of the rejected value.
        type_name: &'static str,
    },
    /// The handle has already been released.
    Released,
    /// The lifetime the handle was pinned in has already finished.
    FinishedLifetime {
        /// Which lifetime of the pinner the handle belongs to.
        generation: usize,
    },
}

impl fmt::Display for PinError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PinError::NotAPointer { type_name } => {
                write!(f, "{} is not a pointer to managed memory", type_name)
            }
            PinError::Released => write!(f, "Pinned pointer has already been released"),
            PinError::FinishedLifetime { generation } => write!(
                f,
                "Pinned pointer belongs to lifetime {} which has already been unpinned",
                generation
            ),
        }
    }
}

impl std::error::Error for PinError {}
