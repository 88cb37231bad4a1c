//! Message queues and listener registrations.
//!
//! The router owns two queues with different delivery contracts:
//!
//! - the **send** queue holds outbound messages delivered to components
//!   only (the seam a network transport would sit behind);
//! - the **process** queue holds local messages delivered to components
//!   *and* actor listeners.
//!
//! It also owns the two subscription mechanisms: global listeners keyed by
//! message kind alone, and targeted listeners keyed by message kind plus
//! the about-actor id. Both are multimaps -- duplicate registrations are
//! distinct entries removed independently, first exact match first.
//!
//! The router is a data owner. The dispatch algorithm that consumes these
//! queues lives on the [`Director`](crate::frame::Director), which can
//! split its borrows across the router, the component registry and the
//! actor registry.

use std::collections::{BTreeMap, VecDeque};

use tracing::debug;

use stagehand_types::{ActorId, Message, MessageKind};

/// One listener registration: invoke `invokable` on `actor`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerEntry {
    /// The actor whose invokable is called.
    pub actor: ActorId,
    /// The invokable name looked up at dispatch time.
    pub invokable: String,
}

/// Staging area for messages queued while a handler is running.
///
/// Handlers never touch the router directly; they queue into an outbox,
/// which the dispatch loop drains into the real queues after the handler
/// returns. A message queued during dispatch of message M therefore lands
/// at the tail of the current frame's queue and is never visible to M's
/// own remaining listeners.
#[derive(Debug, Default)]
pub struct Outbox {
    send: Vec<Message>,
    process: Vec<Message>,
}

impl Outbox {
    /// Create an empty outbox.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a message for the outbound (components-only) queue.
    pub fn send_message(&mut self, message: Message) {
        self.send.push(message);
    }

    /// Queue a message for the local (full dispatch) queue.
    pub fn process_message(&mut self, message: Message) {
        self.process.push(message);
    }

    /// Whether nothing was queued.
    pub fn is_empty(&self) -> bool {
        self.send.is_empty() && self.process.is_empty()
    }

    /// Append the staged messages to the router's queues, in order.
    pub(crate) fn drain_into(self, router: &mut MessageRouter) {
        for message in self.send {
            router.send_message(message);
        }
        for message in self.process {
            router.process_message(message);
        }
    }
}

/// Queues and listener maps for message routing.
#[derive(Debug, Default)]
pub struct MessageRouter {
    /// Outbound queue: delivered to components only.
    send_queue: VecDeque<Message>,
    /// Local queue: delivered to components and actor listeners.
    process_queue: VecDeque<Message>,
    /// Listeners keyed by message kind alone.
    global: BTreeMap<MessageKind, Vec<ListenerEntry>>,
    /// Listeners keyed by message kind and about-actor id.
    targeted: BTreeMap<MessageKind, BTreeMap<ActorId, Vec<ListenerEntry>>>,
}

impl MessageRouter {
    /// Create a router with empty queues and no registrations.
    pub fn new() -> Self {
        Self::default()
    }

    // -- queues -------------------------------------------------------------

    /// Enqueue for outbound delivery (components only).
    pub fn send_message(&mut self, message: Message) {
        self.send_queue.push_back(message);
    }

    /// Enqueue for local delivery (components and actor listeners).
    pub fn process_message(&mut self, message: Message) {
        self.process_queue.push_back(message);
    }

    /// Pop the next outbound message.
    pub fn pop_send(&mut self) -> Option<Message> {
        self.send_queue.pop_front()
    }

    /// Pop the next local message.
    pub fn pop_process(&mut self) -> Option<Message> {
        self.process_queue.pop_front()
    }

    /// Number of messages waiting in the outbound queue.
    pub fn send_queue_len(&self) -> usize {
        self.send_queue.len()
    }

    /// Number of messages waiting in the local queue.
    pub fn process_queue_len(&self) -> usize {
        self.process_queue.len()
    }

    // -- global listeners ---------------------------------------------------

    /// Register a global (kind-only) listener. Duplicates are distinct
    /// entries.
    pub fn register_global_listener(
        &mut self,
        kind: MessageKind,
        actor: ActorId,
        invokable: impl Into<String>,
    ) {
        self.global.entry(kind).or_default().push(ListenerEntry {
            actor,
            invokable: invokable.into(),
        });
    }

    /// Remove the first exact match from the global multimap. Returns
    /// whether an entry was removed.
    pub fn unregister_global_listener(
        &mut self,
        kind: &MessageKind,
        actor: ActorId,
        invokable: &str,
    ) -> bool {
        let Some(entries) = self.global.get_mut(kind) else {
            return false;
        };
        let Some(position) = entries
            .iter()
            .position(|entry| entry.actor == actor && entry.invokable == invokable)
        else {
            return false;
        };
        entries.remove(position);
        if entries.is_empty() {
            self.global.remove(kind);
        }
        true
    }

    /// Snapshot of global listeners for a kind, in registration order.
    pub fn global_listeners(&self, kind: &MessageKind) -> Vec<ListenerEntry> {
        self.global.get(kind).cloned().unwrap_or_default()
    }

    // -- targeted listeners -------------------------------------------------

    /// Register a targeted (kind + about-actor) listener. Duplicates are
    /// distinct entries.
    pub fn register_actor_listener(
        &mut self,
        kind: MessageKind,
        target: ActorId,
        actor: ActorId,
        invokable: impl Into<String>,
    ) {
        self.targeted
            .entry(kind)
            .or_default()
            .entry(target)
            .or_default()
            .push(ListenerEntry {
                actor,
                invokable: invokable.into(),
            });
    }

    /// Remove the first exact match from the targeted map. Returns whether
    /// an entry was removed.
    pub fn unregister_actor_listener(
        &mut self,
        kind: &MessageKind,
        target: ActorId,
        actor: ActorId,
        invokable: &str,
    ) -> bool {
        let Some(by_target) = self.targeted.get_mut(kind) else {
            return false;
        };
        let Some(entries) = by_target.get_mut(&target) else {
            return false;
        };
        let Some(position) = entries
            .iter()
            .position(|entry| entry.actor == actor && entry.invokable == invokable)
        else {
            return false;
        };
        entries.remove(position);
        if entries.is_empty() {
            by_target.remove(&target);
        }
        if by_target.is_empty() {
            self.targeted.remove(kind);
        }
        true
    }

    /// Snapshot of targeted listeners for `(kind, target)`, in
    /// registration order.
    pub fn actor_listeners(&self, kind: &MessageKind, target: ActorId) -> Vec<ListenerEntry> {
        self.targeted
            .get(kind)
            .and_then(|by_target| by_target.get(&target))
            .cloned()
            .unwrap_or_default()
    }

    /// Purge every registration where the listener *or* the target is the
    /// given actor. Called when an actor is physically removed.
    pub fn unregister_all_for_actor(&mut self, actor: ActorId) {
        let mut removed: usize = 0;

        self.global.retain(|_, entries| {
            let before = entries.len();
            entries.retain(|entry| entry.actor != actor);
            removed = removed.saturating_add(before.saturating_sub(entries.len()));
            !entries.is_empty()
        });

        self.targeted.retain(|_, by_target| {
            by_target.retain(|target, entries| {
                if *target == actor {
                    removed = removed.saturating_add(entries.len());
                    return false;
                }
                let before = entries.len();
                entries.retain(|entry| entry.actor != actor);
                removed = removed.saturating_add(before.saturating_sub(entries.len()));
                !entries.is_empty()
            });
            !by_target.is_empty()
        });

        if removed > 0 {
            debug!(%actor, removed, "Purged listener registrations");
        }
    }

    /// Drop every listener registration in both maps, including entries
    /// whose listener or target actor is no longer registered. Full scene
    /// teardown; the queues are untouched.
    pub fn clear_listeners(&mut self) {
        let removed = self.listener_count();
        self.global.clear();
        self.targeted.clear();
        if removed > 0 {
            debug!(removed, "Cleared all listener registrations");
        }
    }

    /// Total number of listener registrations, global plus targeted.
    pub fn listener_count(&self) -> usize {
        let global: usize = self.global.values().map(Vec::len).sum();
        let targeted: usize = self
            .targeted
            .values()
            .flat_map(BTreeMap::values)
            .map(Vec::len)
            .sum();
        global.saturating_add(targeted)
    }
}
