//! Shared type definitions for the Stagehand coordination core.
//!
//! This crate is the single source of truth for the value types that flow
//! between the actor registry, the component bus, the timer service, and
//! the message router.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for actor and machine identifiers
//! - [`enums`] -- Message kinds, component priorities, actor kinds
//! - [`message`] -- The message envelope and its typed payloads

pub mod enums;
pub mod ids;
pub mod message;

// Re-export all public types at crate root for convenience.
pub use enums::{ActorKind, ComponentPriority, MessageKind};
pub use ids::{ActorId, MachineId};
pub use message::{ActorTypeDesc, Message, MessagePayload, TickPayload, TimerPayload};
