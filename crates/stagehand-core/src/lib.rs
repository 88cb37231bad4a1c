//! The Stagehand simulation coordination core.
//!
//! A single-threaded, frame-stepped hub that tracks the live actor set,
//! routes messages between actors and components, runs timers in two time
//! domains, and drives the per-frame sequence. Hosting loops, rendering,
//! and networking live outside; this crate exposes the seams they plug
//! into ([`ActorFactory`], [`SceneGraph`], [`Component`]).
//!
//! # Modules
//!
//! - [`actor`] -- [`ActorProxy`]: the runtime representation of one actor,
//!   its named invokables, and its message-kind handler table.
//! - [`clock`] -- [`FrameClock`]: simulated and real time counters in
//!   microseconds, with scaling and pause.
//! - [`component`] -- The [`Component`] trait and the priority-ordered
//!   [`ComponentRegistry`].
//! - [`config`] -- YAML-backed [`CoreConfig`] with per-field defaults.
//! - [`error`] -- [`CoreError`], the crate's actor-operation error type.
//! - [`frame`] -- [`Director`]: the frame driver that owns everything
//!   above and runs the fixed pre-frame sequence.
//! - [`registry`] -- [`ActorRegistry`]: id-ordered actor storage with the
//!   deferred-deletion list.
//! - [`router`] -- [`MessageRouter`]: the two message queues plus global
//!   and targeted listener tables, and the [`Outbox`] handlers queue into.
//! - [`stats`] -- [`FrameStats`]: cumulative and windowed frame counters.
//! - [`timers`] -- [`TimerService`]: one-shot and repeating timers keyed
//!   by fire time with insertion-order tie-breaking.

pub mod actor;
pub mod clock;
pub mod component;
pub mod config;
pub mod error;
pub mod frame;
pub mod registry;
pub mod router;
pub mod stats;
pub mod timers;

// Re-export primary types at crate root.
pub use actor::{ActorProxy, InvokableBuilder, InvokableFn};
pub use clock::{ClockError, FrameClock, MICROS_PER_SECOND, seconds_to_us, us_to_seconds};
pub use component::{Component, ComponentRegistry};
pub use config::{ConfigError, CoreConfig};
pub use error::CoreError;
pub use frame::{ActorFactory, Director, FramePhase, MapEntry, SceneGraph};
pub use registry::ActorRegistry;
pub use router::{ListenerEntry, MessageRouter, Outbox};
pub use stats::FrameStats;
pub use timers::{TimeDomain, TimerService};
