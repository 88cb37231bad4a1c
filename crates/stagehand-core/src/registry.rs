//! The actor registry: sole owner of all live actor proxies.
//!
//! The registry is an arena keyed by [`ActorId`]. Everything else in the
//! core -- listener maps, timers, messages -- stores ids only, so there
//! are no ownership cycles and no dangling references: a deleted id simply
//! stops resolving.
//!
//! The registry is a pure data owner. It never emits messages; the
//! announcement semantics around adding, publishing and deleting actors
//! live on the [`Director`](crate::frame::Director).

use std::collections::BTreeMap;

use stagehand_types::ActorId;

use crate::actor::ActorProxy;
use crate::error::internal_invariant;

/// Id-indexed arena of actor proxies plus the frame's pending-delete list.
#[derive(Debug, Default)]
pub struct ActorRegistry {
    /// All live actors, keyed by id.
    actors: BTreeMap<ActorId, ActorProxy>,
    /// Game actors marked for deletion, physically removed at the end of
    /// the current frame. Insertion order is preserved.
    pending_delete: Vec<ActorId>,
}

impl ActorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a proxy. A duplicate id is an internal invariant violation:
    /// ids are uuid-v7 and never reused, so a collision means a core bug.
    pub fn insert(&mut self, proxy: ActorProxy) -> ActorId {
        let id = proxy.id();
        if self.actors.insert(id, proxy).is_some() {
            internal_invariant("actor id already present in registry");
        }
        id
    }

    /// Remove a proxy, returning it. The id stops resolving immediately.
    pub fn remove(&mut self, id: ActorId) -> Option<ActorProxy> {
        self.pending_delete.retain(|pending| *pending != id);
        self.actors.remove(&id)
    }

    /// Whether an actor with this id is registered.
    pub fn contains(&self, id: ActorId) -> bool {
        self.actors.contains_key(&id)
    }

    /// Look up an actor by id.
    pub fn get(&self, id: ActorId) -> Option<&ActorProxy> {
        self.actors.get(&id)
    }

    /// Look up an actor by id, mutably.
    pub fn get_mut(&mut self, id: ActorId) -> Option<&mut ActorProxy> {
        self.actors.get_mut(&id)
    }

    /// All actors whose display name matches, in id order.
    pub fn find_by_name<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a ActorProxy> {
        self.actors.values().filter(move |proxy| proxy.name() == name)
    }

    /// All actors of the given type name, in id order.
    pub fn find_by_type<'a>(&'a self, type_name: &'a str) -> impl Iterator<Item = &'a ActorProxy> {
        self.actors
            .values()
            .filter(move |proxy| proxy.actor_type().name == type_name)
    }

    /// Iterate all actors in id order.
    pub fn iter(&self) -> impl Iterator<Item = &ActorProxy> {
        self.actors.values()
    }

    /// All registered ids, in order.
    pub fn ids(&self) -> Vec<ActorId> {
        self.actors.keys().copied().collect()
    }

    /// Number of registered actors.
    pub fn len(&self) -> usize {
        self.actors.len()
    }

    /// Whether the registry holds no actors.
    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    /// Mark a registered actor for deferred deletion. A second mark for
    /// the same id is a no-op.
    pub fn mark_for_delete(&mut self, id: ActorId) {
        if self.actors.contains_key(&id) && !self.pending_delete.contains(&id) {
            self.pending_delete.push(id);
        }
    }

    /// Whether an actor is awaiting physical removal.
    pub fn is_pending_delete(&self, id: ActorId) -> bool {
        self.pending_delete.contains(&id)
    }

    /// Take the pending-delete list, leaving it empty.
    pub fn take_pending(&mut self) -> Vec<ActorId> {
        core::mem::take(&mut self.pending_delete)
    }

    /// Drop every actor and pending mark at once (full scene teardown).
    pub fn clear(&mut self) {
        self.actors.clear();
        self.pending_delete.clear();
    }
}
