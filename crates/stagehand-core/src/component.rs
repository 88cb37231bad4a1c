//! Pluggable components and the priority-ordered component registry.
//!
//! A component is a subsystem that receives *every* dispatched message
//! through its generic handler, before any actor listener sees it.
//! Dispatch order is ascending by [`ComponentPriority`] order id; equal
//! priorities keep registration order (stable insertion).

use tracing::debug;

use stagehand_types::{ComponentPriority, Message};

use crate::router::Outbox;

/// A priority-ordered dispatch target.
///
/// Implementations receive every message the core dispatches and may queue
/// follow-up messages through the [`Outbox`].
pub trait Component {
    /// The component's name, used for removal and logging.
    fn name(&self) -> &str;

    /// Generic message handler, called once per dispatched message.
    fn on_message(&mut self, message: &Message, outbox: &mut Outbox);
}

/// One registered component with its priority.
struct ComponentEntry {
    priority: ComponentPriority,
    component: Box<dyn Component>,
}

/// Priority-ordered list of registered components.
///
/// Components are exclusively owned by the registry for their registered
/// lifetime; removal drops the component.
#[derive(Default)]
pub struct ComponentRegistry {
    /// Always sorted ascending by priority order id, ties in insertion
    /// order.
    entries: Vec<ComponentEntry>,
}

impl ComponentRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component at the given priority.
    ///
    /// The component is inserted before the first entry whose priority
    /// order id is strictly greater, so equal priorities dispatch in
    /// registration order.
    pub fn add_component(&mut self, component: Box<dyn Component>, priority: ComponentPriority) {
        let position = self
            .entries
            .iter()
            .position(|entry| entry.priority.order() > priority.order())
            .unwrap_or(self.entries.len());
        debug!(
            name = component.name(),
            ?priority,
            position,
            "Component registered"
        );
        self.entries.insert(position, ComponentEntry { priority, component });
    }

    /// Remove the first component with this name. Returns whether one was
    /// removed; a no-op if absent.
    pub fn remove_component(&mut self, name: &str) -> bool {
        let Some(position) = self
            .entries
            .iter()
            .position(|entry| entry.component.name() == name)
        else {
            return false;
        };
        let entry = self.entries.remove(position);
        debug!(name = entry.component.name(), "Component removed");
        true
    }

    /// Iterate components mutably in dispatch order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn Component>> {
        self.entries.iter_mut().map(|entry| &mut entry.component)
    }

    /// Snapshot of `(name, priority)` pairs in dispatch order.
    pub fn names(&self) -> Vec<(String, ComponentPriority)> {
        self.entries
            .iter()
            .map(|entry| (entry.component.name().to_owned(), entry.priority))
            .collect()
    }

    /// Number of registered components.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no components are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl core::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("components", &self.names())
            .finish()
    }
}
