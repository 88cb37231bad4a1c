//! Enumeration types for the Stagehand coordination core.
//!
//! Message kinds, component dispatch priorities, and the actor kind tag
//! that replaces runtime downcasting.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Message kinds
// ---------------------------------------------------------------------------

/// The type tag of a [`Message`](crate::Message).
///
/// Built-in kinds cover the core's own announcements (tick, timer, actor
/// lifecycle, pause state, map changes). Everything else travels as
/// [`MessageKind::Custom`] with a caller-chosen tag string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MessageKind {
    /// Per-frame tick delivered to locally-owned actors and components.
    TickLocal,
    /// Per-frame tick delivered on behalf of remotely-owned actors.
    /// Same payload as [`MessageKind::TickLocal`], different tag.
    TickRemote,
    /// A named timer reached its fire time.
    TimerElapsed,
    /// A local actor was added to the registry.
    ActorCreated,
    /// An actor was published (made externally visible).
    ActorPublished,
    /// An actor was marked for deletion.
    ActorDeleted,
    /// The frame driver entered the paused state.
    Paused,
    /// The frame driver left the paused state.
    Resumed,
    /// The loaded actor set was torn down and replaced.
    MapChanged,
    /// A user-defined message kind, keyed by tag string.
    Custom(String),
}

impl MessageKind {
    /// Construct a custom kind from a tag string.
    pub fn custom(tag: impl Into<String>) -> Self {
        Self::Custom(tag.into())
    }
}

impl core::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::TickLocal => write!(f, "tick-local"),
            Self::TickRemote => write!(f, "tick-remote"),
            Self::TimerElapsed => write!(f, "timer-elapsed"),
            Self::ActorCreated => write!(f, "actor-created"),
            Self::ActorPublished => write!(f, "actor-published"),
            Self::ActorDeleted => write!(f, "actor-deleted"),
            Self::Paused => write!(f, "paused"),
            Self::Resumed => write!(f, "resumed"),
            Self::MapChanged => write!(f, "map-changed"),
            Self::Custom(tag) => write!(f, "custom:{tag}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Component priority
// ---------------------------------------------------------------------------

/// Dispatch priority of a registered component.
///
/// Lower order value means earlier dispatch. Components with equal priority
/// are dispatched in registration order (stable insertion).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ComponentPriority {
    /// Dispatched before everything else.
    Highest,
    /// Dispatched after [`ComponentPriority::Highest`].
    Higher,
    /// The default priority.
    Normal,
    /// Dispatched after [`ComponentPriority::Normal`].
    Lower,
    /// Dispatched after everything else.
    Lowest,
}

impl ComponentPriority {
    /// Numeric order id; lower dispatches earlier.
    pub const fn order(self) -> u8 {
        match self {
            Self::Highest => 0,
            Self::Higher => 1,
            Self::Normal => 2,
            Self::Lower => 3,
            Self::Lowest => 4,
        }
    }
}

impl Default for ComponentPriority {
    fn default() -> Self {
        Self::Normal
    }
}

// ---------------------------------------------------------------------------
// Actor kind
// ---------------------------------------------------------------------------

/// The flavor of an actor, checked once at creation and cached on the entry.
///
/// Replaces runtime downcasting: the registry asks this tag, never the
/// concrete type, to decide whether an actor participates in messaging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ActorKind {
    /// A passive entity: tracked, but owns no invokables and never
    /// participates in message dispatch.
    Passive,
    /// A game actor: owns invokables and participates in dispatch.
    Game,
}

impl ActorKind {
    /// Whether this kind participates in message dispatch.
    pub const fn is_game(self) -> bool {
        matches!(self, Self::Game)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_order_is_ascending() {
        assert!(ComponentPriority::Highest.order() < ComponentPriority::Higher.order());
        assert!(ComponentPriority::Higher.order() < ComponentPriority::Normal.order());
        assert!(ComponentPriority::Normal.order() < ComponentPriority::Lower.order());
        assert!(ComponentPriority::Lower.order() < ComponentPriority::Lowest.order());
    }

    #[test]
    fn default_priority_is_normal() {
        assert_eq!(ComponentPriority::default(), ComponentPriority::Normal);
    }

    #[test]
    fn custom_kinds_compare_by_tag() {
        assert_eq!(MessageKind::custom("Ping"), MessageKind::custom("Ping"));
        assert_ne!(MessageKind::custom("Ping"), MessageKind::custom("Pong"));
        assert_ne!(MessageKind::custom("Ping"), MessageKind::TickLocal);
    }

    #[test]
    fn kind_display_is_stable() {
        assert_eq!(MessageKind::TickLocal.to_string(), "tick-local");
        assert_eq!(MessageKind::custom("Ping").to_string(), "custom:Ping");
    }

    #[test]
    fn passive_actors_are_not_game_actors() {
        assert!(ActorKind::Game.is_game());
        assert!(!ActorKind::Passive.is_game());
    }
}
