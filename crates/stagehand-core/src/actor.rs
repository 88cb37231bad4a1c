//! Actor proxies: the simulated entities the registry owns.
//!
//! An [`ActorProxy`] is exclusively owned by the
//! [`ActorRegistry`](crate::registry::ActorRegistry); every other structure
//! refers to it by [`ActorId`] only. Game actors expose *invokables*,
//! named callbacks looked up by string at dispatch time, and may declare
//! which message kinds their own invokables handle when a message is about
//! them.

use std::collections::BTreeMap;

use tracing::debug;

use stagehand_types::{ActorId, ActorKind, ActorTypeDesc, Message, MessageKind};

use crate::router::Outbox;

/// A named callback exposed by an actor.
///
/// Invokables receive the message being dispatched and an [`Outbox`] for
/// queueing follow-up messages into the current frame.
pub type InvokableFn = Box<dyn FnMut(&Message, &mut Outbox)>;

/// One-shot hook that installs an actor's invokables.
///
/// Installed by the actor-type factory and triggered by the core for game
/// actors at creation time.
pub type InvokableBuilder = Box<dyn FnOnce(&mut ActorProxy)>;

/// A simulated entity tracked by the registry.
pub struct ActorProxy {
    /// Globally unique, immutable once assigned.
    id: ActorId,
    /// Display name, not required to be unique.
    name: String,
    /// The descriptor the factory resolved this actor from.
    actor_type: ActorTypeDesc,
    /// Passive or game actor, decided once at creation.
    kind: ActorKind,
    /// Whether the authoritative state lives on another machine.
    remote: bool,
    /// Whether the actor has been announced as externally visible.
    published: bool,
    /// Whether the actor has entered the world (been registered).
    in_world: bool,
    /// Named callbacks, looked up by string at dispatch time.
    invokables: BTreeMap<String, InvokableFn>,
    /// Message kinds this actor's own invokables handle when a message is
    /// about this actor, in registration order.
    handlers: BTreeMap<MessageKind, Vec<String>>,
    /// Deferred invokable installation, run once for game actors.
    invokable_builder: Option<InvokableBuilder>,
}

impl ActorProxy {
    /// Create a proxy with a fresh id and no invokables.
    pub fn new(name: impl Into<String>, actor_type: ActorTypeDesc, kind: ActorKind) -> Self {
        Self {
            id: ActorId::new(),
            name: name.into(),
            actor_type,
            kind,
            remote: false,
            published: false,
            in_world: false,
            invokables: BTreeMap::new(),
            handlers: BTreeMap::new(),
            invokable_builder: None,
        }
    }

    /// Attach a one-shot invokable builder (factory-side).
    #[must_use]
    pub fn with_invokable_builder(mut self, builder: InvokableBuilder) -> Self {
        self.invokable_builder = Some(builder);
        self
    }

    /// Run the attached invokable builder, if any. Idempotent: the builder
    /// is consumed on first call.
    pub fn build_invokables(&mut self) {
        if let Some(builder) = self.invokable_builder.take() {
            builder(self);
            debug!(actor = %self.id, count = self.invokables.len(), "Invokables built");
        }
    }

    /// The actor's unique id.
    pub const fn id(&self) -> ActorId {
        self.id
    }

    /// The actor's display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The descriptor this actor was created from.
    pub const fn actor_type(&self) -> &ActorTypeDesc {
        &self.actor_type
    }

    /// Whether this is a passive or a game actor.
    pub const fn kind(&self) -> ActorKind {
        self.kind
    }

    /// Whether the authoritative state lives on another machine.
    pub const fn is_remote(&self) -> bool {
        self.remote
    }

    pub(crate) const fn set_remote(&mut self, remote: bool) {
        self.remote = remote;
    }

    /// Whether the actor has been published.
    pub const fn is_published(&self) -> bool {
        self.published
    }

    pub(crate) const fn set_published(&mut self, published: bool) {
        self.published = published;
    }

    /// Whether the actor is currently registered with the core.
    pub const fn is_in_world(&self) -> bool {
        self.in_world
    }

    /// Entered-world hook, invoked when the actor is added to the registry.
    pub(crate) fn entered_world(&mut self) {
        self.in_world = true;
        debug!(actor = %self.id, name = %self.name, "Actor entered world");
    }

    /// Left-world hook, invoked on physical removal.
    pub(crate) fn left_world(&mut self) {
        self.in_world = false;
        debug!(actor = %self.id, name = %self.name, "Actor left world");
    }

    /// Register a named invokable. Replaces any previous callback with the
    /// same name.
    pub fn register_invokable(&mut self, name: impl Into<String>, callback: InvokableFn) {
        self.invokables.insert(name.into(), callback);
    }

    /// Remove a named invokable. Returns whether it existed.
    pub fn remove_invokable(&mut self, name: &str) -> bool {
        self.invokables.remove(name).is_some()
    }

    /// Whether the actor exposes an invokable with this name.
    pub fn has_invokable(&self, name: &str) -> bool {
        self.invokables.contains_key(name)
    }

    /// Invoke a named callback with the given message.
    ///
    /// Returns `false` if no invokable with this name exists; the caller
    /// logs the miss and continues -- a missing invokable is never fatal.
    pub fn invoke(&mut self, name: &str, message: &Message, outbox: &mut Outbox) -> bool {
        match self.invokables.get_mut(name) {
            Some(callback) => {
                callback(message, outbox);
                true
            }
            None => false,
        }
    }

    /// Declare that the named invokable handles the given message kind
    /// when a dispatched message is about this actor.
    pub fn register_handler(&mut self, kind: MessageKind, invokable_name: impl Into<String>) {
        self.handlers.entry(kind).or_default().push(invokable_name.into());
    }

    /// Remove a handler declaration. Removes the first exact match only.
    pub fn unregister_handler(&mut self, kind: &MessageKind, invokable_name: &str) -> bool {
        let Some(names) = self.handlers.get_mut(kind) else {
            return false;
        };
        let Some(pos) = names.iter().position(|n| n == invokable_name) else {
            return false;
        };
        names.remove(pos);
        if names.is_empty() {
            self.handlers.remove(kind);
        }
        true
    }

    /// The invokable names declared for a message kind, in registration
    /// order. Cloned so dispatch can run without holding a borrow.
    pub fn handlers_for(&self, kind: &MessageKind) -> Vec<String> {
        self.handlers.get(kind).cloned().unwrap_or_default()
    }
}

impl core::fmt::Debug for ActorProxy {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ActorProxy")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("actor_type", &self.actor_type.full_name())
            .field("kind", &self.kind)
            .field("remote", &self.remote)
            .field("published", &self.published)
            .field("in_world", &self.in_world)
            .field("invokables", &self.invokables.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use stagehand_types::MachineId;

    use super::*;

    fn demo_type() -> ActorTypeDesc {
        ActorTypeDesc::new("Sentry", "test", "test actor")
    }

    fn ping(source: MachineId) -> Message {
        Message::new(MessageKind::custom("Ping"), source)
    }

    #[test]
    fn invoke_runs_registered_callback() {
        let mut proxy = ActorProxy::new("alpha", demo_type(), ActorKind::Game);
        let hits = Rc::new(Cell::new(0_u32));
        let hits_in = Rc::clone(&hits);
        proxy.register_invokable(
            "OnPing",
            Box::new(move |_msg, _outbox| hits_in.set(hits_in.get().saturating_add(1))),
        );

        let mut outbox = Outbox::new();
        let msg = ping(MachineId::new());
        assert!(proxy.invoke("OnPing", &msg, &mut outbox));
        assert!(proxy.invoke("OnPing", &msg, &mut outbox));
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn invoke_missing_returns_false() {
        let mut proxy = ActorProxy::new("alpha", demo_type(), ActorKind::Game);
        let mut outbox = Outbox::new();
        let msg = ping(MachineId::new());
        assert!(!proxy.invoke("Nope", &msg, &mut outbox));
    }

    #[test]
    fn builder_runs_once() {
        let runs = Rc::new(Cell::new(0_u32));
        let runs_in = Rc::clone(&runs);
        let mut proxy = ActorProxy::new("alpha", demo_type(), ActorKind::Game)
            .with_invokable_builder(Box::new(move |p| {
                runs_in.set(runs_in.get().saturating_add(1));
                p.register_invokable("OnPing", Box::new(|_msg, _outbox| {}));
            }));

        proxy.build_invokables();
        proxy.build_invokables();
        assert_eq!(runs.get(), 1);
        assert!(proxy.has_invokable("OnPing"));
    }

    #[test]
    fn handler_declarations_keep_registration_order() {
        let mut proxy = ActorProxy::new("alpha", demo_type(), ActorKind::Game);
        let kind = MessageKind::custom("Ping");
        proxy.register_handler(kind.clone(), "First");
        proxy.register_handler(kind.clone(), "Second");
        assert_eq!(proxy.handlers_for(&kind), vec!["First", "Second"]);

        assert!(proxy.unregister_handler(&kind, "First"));
        assert_eq!(proxy.handlers_for(&kind), vec!["Second"]);
        assert!(!proxy.unregister_handler(&kind, "First"));
    }

    #[test]
    fn world_flags_track_lifecycle() {
        let mut proxy = ActorProxy::new("alpha", demo_type(), ActorKind::Passive);
        assert!(!proxy.is_in_world());
        proxy.entered_world();
        assert!(proxy.is_in_world());
        proxy.left_world();
        assert!(!proxy.is_in_world());
    }
}
