//! Type-safe identifier wrappers around [`Uuid`].
//!
//! Every entity the coordination core tracks has a strongly-typed ID to
//! prevent accidental mixing of identifiers at compile time. IDs are the
//! sole cross-reference key between the actor registry, the listener maps,
//! and messages -- no structure ever holds a pointer to an actor it does
//! not own. All IDs use UUID v7 (time-ordered) so map iteration roughly
//! follows creation order.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for an actor tracked by the registry.
    ///
    /// Immutable once assigned; deleting the actor invalidates the id for
    /// all future lookups.
    ActorId
}

define_id! {
    /// Identity of a machine (process) participating in the simulation.
    ///
    /// Stamped on every message as source, and optionally as destination.
    MachineId
}
