//! Message value types exchanged through the coordination core.
//!
//! A [`Message`] is an immutable value once constructed: the router and all
//! dispatch targets receive it by shared reference and never mutate it after
//! it has been queued. The type-specific payload travels in
//! [`MessagePayload`]; user-defined payloads are carried as JSON values so
//! producers outside this workspace can attach arbitrary well-formed data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::MessageKind;
use crate::ids::{ActorId, MachineId};

/// Descriptor of an actor type, the factory lookup key.
///
/// Mirrors what an actor library registers: a unique name within a
/// category, plus a human-readable description.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActorTypeDesc {
    /// Unique type name, e.g. `"Sentry"`.
    pub name: String,
    /// Grouping category, e.g. `"demo"`.
    pub category: String,
    /// Human-readable description.
    pub description: String,
}

impl ActorTypeDesc {
    /// Construct a descriptor from its parts.
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            description: description.into(),
        }
    }

    /// The fully-qualified `category.name` form used in logs.
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.category, self.name)
    }
}

/// Payload of a tick message.
///
/// Both the local and the remote tick of a frame carry an identical payload;
/// only the message kind differs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickPayload {
    /// Simulated time elapsed this frame, in microseconds.
    pub sim_delta_us: i64,
    /// Real time elapsed this frame, in microseconds.
    pub real_delta_us: i64,
    /// Current ratio of simulated to real time.
    pub time_scale: f32,
    /// Simulation time at the start of this frame, in microseconds.
    pub sim_time_us: i64,
}

/// Payload of a timer-elapsed message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerPayload {
    /// The name the timer was registered under.
    pub timer_name: String,
    /// Seconds between the scheduled fire time and the clock value at which
    /// the timer was actually processed. Zero when processed exactly on time.
    pub late_seconds: f64,
}

/// Type-specific message payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MessagePayload {
    /// No payload beyond the envelope fields.
    Empty,
    /// Per-frame tick data.
    Tick(TickPayload),
    /// Timer firing data.
    Timer(TimerPayload),
    /// User-defined payload carried as JSON.
    Custom(serde_json::Value),
}

impl Default for MessagePayload {
    fn default() -> Self {
        Self::Empty
    }
}

/// A routed message.
///
/// Constructed through the core's message factory (which stamps the local
/// machine identity as source) or directly in tests. Immutable once queued:
/// the `with_*` builders consume `self` and are only used before the message
/// is handed to the router.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// The message type tag driving listener lookup.
    pub kind: MessageKind,
    /// Machine that produced the message.
    pub source: MachineId,
    /// Machine the message is addressed to, if any.
    pub destination: Option<MachineId>,
    /// The actor this message is about, if any. Drives targeted-listener
    /// dispatch and the actor's own handler lookup.
    pub about_actor: Option<ActorId>,
    /// The actor that sent the message, if any.
    pub sending_actor: Option<ActorId>,
    /// Type-specific payload.
    pub payload: MessagePayload,
    /// Wall-clock creation time, for diagnostics only.
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Construct a message with an empty payload.
    pub fn new(kind: MessageKind, source: MachineId) -> Self {
        Self {
            kind,
            source,
            destination: None,
            about_actor: None,
            sending_actor: None,
            payload: MessagePayload::Empty,
            created_at: Utc::now(),
        }
    }

    /// Set the destination machine.
    #[must_use]
    pub const fn with_destination(mut self, destination: MachineId) -> Self {
        self.destination = Some(destination);
        self
    }

    /// Set the about-actor id.
    #[must_use]
    pub const fn with_about_actor(mut self, actor: ActorId) -> Self {
        self.about_actor = Some(actor);
        self
    }

    /// Set the sending-actor id.
    #[must_use]
    pub const fn with_sending_actor(mut self, actor: ActorId) -> Self {
        self.sending_actor = Some(actor);
        self
    }

    /// Set the payload.
    #[must_use]
    pub fn with_payload(mut self, payload: MessagePayload) -> Self {
        self.payload = payload;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_fields_land_where_expected() {
        let source = MachineId::new();
        let dest = MachineId::new();
        let about = ActorId::new();
        let sender = ActorId::new();

        let msg = Message::new(MessageKind::custom("Ping"), source)
            .with_destination(dest)
            .with_about_actor(about)
            .with_sending_actor(sender);

        assert_eq!(msg.kind, MessageKind::custom("Ping"));
        assert_eq!(msg.source, source);
        assert_eq!(msg.destination, Some(dest));
        assert_eq!(msg.about_actor, Some(about));
        assert_eq!(msg.sending_actor, Some(sender));
        assert_eq!(msg.payload, MessagePayload::Empty);
    }

    #[test]
    fn tick_payload_roundtrips_through_json() {
        let payload = MessagePayload::Tick(TickPayload {
            sim_delta_us: 16_667,
            real_delta_us: 16_667,
            time_scale: 1.0,
            sim_time_us: 1_000_000,
        });
        let json = serde_json::to_string(&payload).ok();
        assert!(json.is_some());
        let restored: Result<MessagePayload, _> =
            serde_json::from_str(json.as_deref().unwrap_or(""));
        assert_eq!(restored.ok(), Some(payload));
    }

    #[test]
    fn full_name_joins_category_and_name() {
        let desc = ActorTypeDesc::new("Sentry", "demo", "A demo sentry actor");
        assert_eq!(desc.full_name(), "demo.Sentry");
    }
}
