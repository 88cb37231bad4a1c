//! Error types for the coordination core.
//!
//! All fallible operations return typed errors rather than panicking. The
//! single exception is [`internal_invariant`], the sanctioned abort path for
//! conditions that indicate a core-logic bug and are never recoverable.

use stagehand_types::ActorId;

/// Errors surfaced by actor lifecycle operations.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The actor-type factory could not resolve the requested type.
    #[error("unknown actor type: {actor_type}")]
    UnknownActorType {
        /// The type name the caller asked for.
        actor_type: String,
    },

    /// Attempted to publish an actor whose authoritative state lives on
    /// another machine.
    #[error("actor {id} is remote and cannot be published")]
    ActorIsRemote {
        /// The remote actor.
        id: ActorId,
    },

    /// The operation requires an actor state the registry does not hold.
    #[error("invalid actor state for {id}: {reason}")]
    InvalidActorState {
        /// The actor the operation referred to.
        id: ActorId,
        /// What was wrong (e.g. not registered).
        reason: String,
    },
}

/// Abort on an internal invariant violation.
///
/// Reserved for "impossible" conditions such as a registry insert claiming
/// success while the subsequent lookup fails. These indicate a core-logic
/// bug and are never recoverable, so this path is fatal rather than a
/// returned error.
#[allow(clippy::panic)]
pub(crate) fn internal_invariant(context: &str) -> ! {
    panic!("internal invariant violation: {context}");
}
