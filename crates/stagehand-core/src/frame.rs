//! The frame driver: per-frame orchestration over the whole core.
//!
//! [`Director`] owns the clock, the actor and component registries, the
//! router and the timer service, and runs the fixed frame sequence:
//!
//! 1. Drain the outbound queue to components only.
//! 2. Advance the clock and process one local-tick and one remote-tick
//!    message (identical payloads, different kind).
//! 3. Fire due timers in both time domains.
//! 4. Drain the local queue with full dispatch
//!    (components -> global listeners -> about-actor self -> targeted).
//! 5. Physically remove every actor marked for deletion this frame.
//! 6. Sample frame statistics if enabled.
//!
//! Everything is single-threaded and frame-stepped: the host loop calls
//! [`Director::pre_frame`] / [`Director::post_frame`] and nothing here
//! blocks or spawns. Actor deletion never happens inside dispatch; it is
//! deferred to step 5, so in-flight messages always see a consistent
//! registry.

use tracing::{debug, info, warn};

use stagehand_types::{
    ActorId, ComponentPriority, MachineId, Message, MessageKind, MessagePayload, TickPayload,
};

use crate::actor::ActorProxy;
use crate::clock::{ClockError, FrameClock};
use crate::component::{Component, ComponentRegistry};
use crate::config::CoreConfig;
use crate::error::{CoreError, internal_invariant};
use crate::registry::ActorRegistry;
use crate::router::{ListenerEntry, MessageRouter, Outbox};
use crate::stats::FrameStats;
use crate::timers::{TimeDomain, TimerService};

/// The actor-type factory collaborator.
///
/// Resolves a type name to a freshly constructed proxy. Game-actor
/// proxies come back with their invokable builder attached; the core
/// triggers the build step.
pub trait ActorFactory {
    /// Instantiate a proxy for the named actor type.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownActorType`] if the type is not known.
    fn create_proxy(&self, actor_type: &str) -> Result<ActorProxy, CoreError>;
}

/// The scene-graph collaborator.
///
/// Notified when actors are added to or removed from the world. Drawable
/// ownership stays outside the core, so the calls carry ids only.
pub trait SceneGraph {
    /// An actor was added to the world.
    fn insert(&mut self, id: ActorId);
    /// An actor was removed from the world.
    fn remove(&mut self, id: ActorId);
}

/// Where the driver is within the frame cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramePhase {
    /// Between frames.
    Idle,
    /// Inside [`Director::pre_frame`].
    PreFrame,
    /// Inside [`Director::post_frame`].
    PostFrame,
}

/// One actor supplied by a map/serialization loader.
pub struct MapEntry {
    /// The already-constructed proxy to register.
    pub proxy: ActorProxy,
    /// Whether to publish the actor once registered.
    pub publish: bool,
}

/// The simulation coordination core.
pub struct Director {
    machine_id: MachineId,
    clock: FrameClock,
    actors: ActorRegistry,
    components: ComponentRegistry,
    router: MessageRouter,
    timers: TimerService,
    stats: FrameStats,
    stats_interval: Option<u64>,
    factory: Box<dyn ActorFactory>,
    scene: Option<Box<dyn SceneGraph>>,
    phase: FramePhase,
    paused: bool,
}

impl Director {
    /// Create a core around an injected clock and actor-type factory.
    pub fn new(clock: FrameClock, factory: Box<dyn ActorFactory>) -> Self {
        let machine_id = MachineId::new();
        info!(machine = %machine_id, "Director initialized");
        Self {
            machine_id,
            clock,
            actors: ActorRegistry::new(),
            components: ComponentRegistry::new(),
            router: MessageRouter::new(),
            timers: TimerService::new(),
            stats: FrameStats::new(),
            stats_interval: None,
            factory,
            scene: None,
            phase: FramePhase::Idle,
            paused: false,
        }
    }

    /// Create a core from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidConfig`] if the configured time scale
    /// is invalid.
    pub fn from_config(
        config: &CoreConfig,
        factory: Box<dyn ActorFactory>,
    ) -> Result<Self, ClockError> {
        let clock = FrameClock::new(config.frame.time_scale)?;
        let mut director = Self::new(clock, factory);
        director.stats_interval = config.statistics.sample_interval();
        Ok(director)
    }

    /// Attach the scene-graph collaborator.
    pub fn set_scene_graph(&mut self, scene: Box<dyn SceneGraph>) {
        self.scene = Some(scene);
    }

    // -- identity and time --------------------------------------------------

    /// The local machine identity stamped on produced messages.
    pub const fn machine_id(&self) -> MachineId {
        self.machine_id
    }

    /// Read access to the frame clock.
    pub const fn clock(&self) -> &FrameClock {
        &self.clock
    }

    /// Set the simulated-to-real time ratio.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidConfig`] for a negative or non-finite
    /// scale.
    pub fn set_time_scale(&mut self, time_scale: f32) -> Result<(), ClockError> {
        self.clock.set_time_scale(time_scale)
    }

    /// Current frame phase.
    pub const fn phase(&self) -> FramePhase {
        self.phase
    }

    /// Whether the simulated time domain is paused.
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Pause or resume the simulated time domain.
    ///
    /// Idempotent: setting the current value emits nothing. A change
    /// queues a paused/resumed announcement through the local queue.
    pub fn set_paused(&mut self, paused: bool) {
        if self.paused == paused {
            return;
        }
        self.paused = paused;
        self.clock.set_paused(paused);
        info!(paused, "Pause state changed");
        let kind = if paused {
            MessageKind::Paused
        } else {
            MessageKind::Resumed
        };
        let message = self.create_message(kind);
        self.router.process_message(message);
    }

    // -- message surface ----------------------------------------------------

    /// Message factory: a well-formed message of the given kind with the
    /// local machine stamped as source.
    pub fn create_message(&self, kind: MessageKind) -> Message {
        Message::new(kind, self.machine_id)
    }

    /// Enqueue a message for outbound delivery. Delivered to components
    /// only, never to actor listeners.
    pub fn send_message(&mut self, message: Message) {
        self.router.send_message(message);
    }

    /// Enqueue a message for local delivery. Delivered to components and
    /// to actor listeners.
    pub fn process_message(&mut self, message: Message) {
        self.router.process_message(message);
    }

    /// Register a global (kind-only) listener.
    pub fn register_global_listener(
        &mut self,
        kind: MessageKind,
        actor: ActorId,
        invokable: impl Into<String>,
    ) {
        self.router.register_global_listener(kind, actor, invokable);
    }

    /// Remove the first exactly-matching global listener registration.
    pub fn unregister_global_listener(
        &mut self,
        kind: &MessageKind,
        actor: ActorId,
        invokable: &str,
    ) -> bool {
        self.router.unregister_global_listener(kind, actor, invokable)
    }

    /// Register a targeted (kind + about-actor) listener.
    pub fn register_actor_listener(
        &mut self,
        kind: MessageKind,
        target: ActorId,
        actor: ActorId,
        invokable: impl Into<String>,
    ) {
        self.router.register_actor_listener(kind, target, actor, invokable);
    }

    /// Remove the first exactly-matching targeted listener registration.
    pub fn unregister_actor_listener(
        &mut self,
        kind: &MessageKind,
        target: ActorId,
        actor: ActorId,
        invokable: &str,
    ) -> bool {
        self.router
            .unregister_actor_listener(kind, target, actor, invokable)
    }

    /// Messages waiting in the outbound queue.
    pub fn send_queue_len(&self) -> usize {
        self.router.send_queue_len()
    }

    /// Messages waiting in the local queue.
    pub fn process_queue_len(&self) -> usize {
        self.router.process_queue_len()
    }

    /// Total listener registrations across both mechanisms.
    pub fn listener_count(&self) -> usize {
        self.router.listener_count()
    }

    // -- components ---------------------------------------------------------

    /// Register a component at the given priority.
    pub fn add_component(&mut self, component: Box<dyn Component>, priority: ComponentPriority) {
        self.components.add_component(component, priority);
    }

    /// Remove a component by name. No-op if absent.
    pub fn remove_component(&mut self, name: &str) -> bool {
        self.components.remove_component(name)
    }

    /// Snapshot of registered components in dispatch order.
    pub fn component_names(&self) -> Vec<(String, ComponentPriority)> {
        self.components.names()
    }

    // -- timers -------------------------------------------------------------

    /// Schedule a timer against the chosen time domain, firing
    /// `duration_seconds` from the domain's current clock value.
    pub fn set_timer(
        &mut self,
        name: impl Into<String>,
        about_actor: Option<ActorId>,
        duration_seconds: f64,
        repeat: bool,
        use_real_time: bool,
    ) {
        let (domain, now_us) = if use_real_time {
            (TimeDomain::Real, self.clock.real_time_us())
        } else {
            (TimeDomain::Simulation, self.clock.simulation_time_us())
        };
        self.timers
            .set_timer(name, about_actor, duration_seconds, repeat, domain, now_us);
    }

    /// Remove timers by name, optionally restricted to one target actor.
    /// Returns the number of entries removed.
    pub fn clear_timer(&mut self, name: &str, about_actor: Option<ActorId>) -> usize {
        self.timers.clear_timer(name, about_actor)
    }

    /// Whether any timer with this name is scheduled.
    pub fn has_timer(&self, name: &str) -> bool {
        self.timers.has_timer(name)
    }

    // -- actor lifecycle ----------------------------------------------------

    /// Ask the factory for a proxy of the named type. Game actors get
    /// their invokable-building step triggered before the proxy is
    /// returned. The proxy is *not* registered; pass it to
    /// [`Director::add_actor`].
    ///
    /// # Errors
    ///
    /// Propagates [`CoreError::UnknownActorType`] from the factory; no
    /// state changes on failure.
    pub fn create_actor(&self, actor_type: &str) -> Result<ActorProxy, CoreError> {
        let mut proxy = self.factory.create_proxy(actor_type).inspect_err(|err| {
            warn!(actor_type, %err, "Actor creation failed");
        })?;
        if proxy.kind().is_game() {
            proxy.build_invokables();
        }
        Ok(proxy)
    }

    /// Register a proxy with the core.
    ///
    /// Flags the proxy remote or local, inserts it, runs its entered-world
    /// hook, notifies the scene graph, announces creation for local actors
    /// only, and optionally publishes.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ActorIsRemote`] when asked to publish a remote
    /// actor; checked before any state change, so a failed call leaves no
    /// trace of the actor.
    pub fn add_actor(
        &mut self,
        mut proxy: ActorProxy,
        is_remote: bool,
        publish: bool,
    ) -> Result<ActorId, CoreError> {
        if is_remote && publish {
            return Err(CoreError::ActorIsRemote { id: proxy.id() });
        }
        proxy.set_remote(is_remote);
        let id = self.actors.insert(proxy);
        match self.actors.get_mut(id) {
            Some(inserted) => inserted.entered_world(),
            None => internal_invariant("actor vanished immediately after insert"),
        }
        if let Some(scene) = self.scene.as_mut() {
            scene.insert(id);
        }
        debug!(actor = %id, is_remote, publish, "Actor added");
        if !is_remote {
            let message = self
                .create_message(MessageKind::ActorCreated)
                .with_about_actor(id);
            self.router.process_message(message);
        }
        if publish {
            self.publish_actor(id)?;
        }
        Ok(id)
    }

    /// Mark a registered local actor as externally visible and announce it.
    ///
    /// Publishing an already-published actor is a no-op (no second
    /// announcement).
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidActorState`] if the actor is not
    /// registered, or [`CoreError::ActorIsRemote`] if it is remote. No
    /// state changes and no announcement on failure.
    pub fn publish_actor(&mut self, id: ActorId) -> Result<(), CoreError> {
        let Some(proxy) = self.actors.get_mut(id) else {
            return Err(CoreError::InvalidActorState {
                id,
                reason: "not registered".to_owned(),
            });
        };
        if proxy.is_remote() {
            return Err(CoreError::ActorIsRemote { id });
        }
        if proxy.is_published() {
            return Ok(());
        }
        proxy.set_published(true);
        debug!(actor = %id, "Actor published");
        let message = self
            .create_message(MessageKind::ActorPublished)
            .with_about_actor(id);
        self.router.process_message(message);
        Ok(())
    }

    /// Delete an actor.
    ///
    /// Passive actors are removed immediately. Game actors enter the
    /// pending-delete list -- their ids keep resolving until the end of
    /// the current frame -- and local game actors get a deletion
    /// announcement. Deleting an actor already pending is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidActorState`] if the id does not
    /// resolve.
    pub fn delete_actor(&mut self, id: ActorId) -> Result<(), CoreError> {
        let (is_game, is_remote) = match self.actors.get(id) {
            Some(proxy) => (proxy.kind().is_game(), proxy.is_remote()),
            None => {
                return Err(CoreError::InvalidActorState {
                    id,
                    reason: "not registered".to_owned(),
                });
            }
        };

        if !is_game {
            self.remove_actor_now(id);
            return Ok(());
        }
        if self.actors.is_pending_delete(id) {
            return Ok(());
        }
        self.actors.mark_for_delete(id);
        debug!(actor = %id, "Actor marked for deferred deletion");
        if !is_remote {
            let message = self
                .create_message(MessageKind::ActorDeleted)
                .with_about_actor(id);
            self.router.process_message(message);
        }
        Ok(())
    }

    /// Delete every actor.
    ///
    /// With `immediate = true` all maps and listener registrations are
    /// cleared synchronously (full scene teardown, no per-actor
    /// announcements). Otherwise each actor goes through
    /// [`Director::delete_actor`] to preserve announcement semantics.
    pub fn delete_all(&mut self, immediate: bool) {
        let ids = self.actors.ids();
        if immediate {
            self.router.clear_listeners();
            for id in &ids {
                if let Some(scene) = self.scene.as_mut() {
                    scene.remove(*id);
                }
            }
            self.actors.clear();
            info!(count = ids.len(), "All actors removed immediately");
            return;
        }
        for id in ids {
            // Cannot fail: the id came from the registry a moment ago and
            // nothing in between removes actors.
            let _ = self.delete_actor(id);
        }
    }

    /// Replace the loaded actor set with a batch from a map loader.
    ///
    /// Tears down the previous set first (deferred, preserving per-actor
    /// announcements), registers each supplied proxy as a local actor with
    /// entered-world and publish-on-load logic, then announces the map
    /// change.
    ///
    /// # Errors
    ///
    /// Propagates the first registration failure; already-registered batch
    /// entries stay registered.
    pub fn change_map(&mut self, batch: Vec<MapEntry>) -> Result<(), CoreError> {
        self.delete_all(false);
        let count = batch.len();
        for entry in batch {
            self.add_actor(entry.proxy, false, entry.publish)?;
        }
        info!(count, "Map changed");
        let message = self.create_message(MessageKind::MapChanged);
        self.router.process_message(message);
        Ok(())
    }

    // -- queries ------------------------------------------------------------

    /// Look up an actor by id.
    pub fn actor(&self, id: ActorId) -> Option<&ActorProxy> {
        self.actors.get(id)
    }

    /// Look up an actor by id, mutably (e.g. to register invokables after
    /// adding it). The registry itself is never handed out mutably.
    pub fn actor_mut(&mut self, id: ActorId) -> Option<&mut ActorProxy> {
        self.actors.get_mut(id)
    }

    /// Ids of all actors with the given display name.
    pub fn find_actors_by_name(&self, name: &str) -> Vec<ActorId> {
        self.actors.find_by_name(name).map(ActorProxy::id).collect()
    }

    /// Ids of all actors of the given type name.
    pub fn find_actors_by_type(&self, type_name: &str) -> Vec<ActorId> {
        self.actors.find_by_type(type_name).map(ActorProxy::id).collect()
    }

    /// Iterate every registered actor, in id order.
    pub fn iter_actors(&self) -> impl Iterator<Item = &ActorProxy> {
        self.actors.iter()
    }

    /// Ids of all registered actors, in order.
    pub fn actor_ids(&self) -> Vec<ActorId> {
        self.actors.ids()
    }

    /// Number of registered actors.
    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }

    /// Frame statistics accumulated so far.
    pub const fn stats(&self) -> &FrameStats {
        &self.stats
    }

    // -- frame cycle --------------------------------------------------------

    /// Run one frame's pre-frame sequence.
    ///
    /// While paused the simulated delta is forced to zero but the real
    /// delta still advances, keeping real-time timers and messages
    /// flowing.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::TimeOverflow`] if a time counter would
    /// overflow; the frame is aborted with queues left as they were.
    pub fn pre_frame(&mut self, delta_sim_us: i64, delta_real_us: i64) -> Result<(), ClockError> {
        if self.phase != FramePhase::Idle {
            warn!(phase = ?self.phase, "pre_frame entered out of phase");
        }
        self.phase = FramePhase::PreFrame;

        // 1. Outbound queue: components only. Pop-while-non-empty so
        //    entries appended during delivery are drained this frame too.
        let mut sent: u64 = 0;
        while let Some(message) = self.router.pop_send() {
            let mut outbox = Outbox::new();
            for component in self.components.iter_mut() {
                component.on_message(&message, &mut outbox);
            }
            outbox.drain_into(&mut self.router);
            sent = sent.saturating_add(1);
        }
        self.stats.record_sent(sent);

        // 2. Advance time and process the frame's tick pair.
        let sim_delta_us = if self.paused { 0 } else { delta_sim_us };
        let advanced = self.clock.advance(sim_delta_us, delta_real_us);
        if let Err(err) = advanced {
            self.phase = FramePhase::Idle;
            return Err(err);
        }
        let payload = TickPayload {
            sim_delta_us,
            real_delta_us: delta_real_us,
            time_scale: self.clock.time_scale(),
            sim_time_us: self.clock.simulation_time_us(),
        };
        let tick_local = self
            .create_message(MessageKind::TickLocal)
            .with_payload(MessagePayload::Tick(payload));
        self.router.process_message(tick_local);
        let tick_remote = self
            .create_message(MessageKind::TickRemote)
            .with_payload(MessagePayload::Tick(payload));
        self.router.process_message(tick_remote);

        // 3. Fire due timers in both domains.
        let real_now_us = self.clock.real_time_us();
        let sim_now_us = self.clock.simulation_time_us();
        let mut fired: u64 = 0;
        for message in self.timers.process_due(TimeDomain::Real, real_now_us, self.machine_id) {
            self.router.process_message(message);
            fired = fired.saturating_add(1);
        }
        for message in self
            .timers
            .process_due(TimeDomain::Simulation, sim_now_us, self.machine_id)
        {
            self.router.process_message(message);
            fired = fired.saturating_add(1);
        }
        self.stats.record_timers(fired);

        // 4. Local queue: full dispatch. Same append-tolerant loop shape.
        let mut processed: u64 = 0;
        while let Some(message) = self.router.pop_process() {
            self.dispatch_message(&message);
            processed = processed.saturating_add(1);
        }
        self.stats.record_processed(processed);

        // 5. Physically remove actors marked during this frame. The only
        //    moment actors are actually destroyed.
        for id in self.actors.take_pending() {
            self.remove_actor_now(id);
        }

        // 6. Statistics.
        self.stats.end_frame(self.stats_interval);
        Ok(())
    }

    /// End-of-frame hook for collaborators; performs no core bookkeeping.
    pub const fn post_frame(&mut self) {
        self.phase = FramePhase::PostFrame;
        self.phase = FramePhase::Idle;
    }

    // -- internals ----------------------------------------------------------

    /// Full dispatch of one local message, in the fixed order.
    fn dispatch_message(&mut self, message: &Message) {
        let mut outbox = Outbox::new();

        // 1. Components, ascending by priority.
        for component in self.components.iter_mut() {
            component.on_message(message, &mut outbox);
        }

        // 2. Global (kind-only) listeners.
        for listener in self.router.global_listeners(&message.kind) {
            Self::invoke_listener(&mut self.actors, &listener, message, &mut outbox);
        }

        if let Some(about) = message.about_actor {
            // 3. The about-actor's own matching invokables, if it is still
            //    registered.
            let handler_names = self
                .actors
                .get(about)
                .map(|proxy| proxy.handlers_for(&message.kind))
                .unwrap_or_default();
            for name in handler_names {
                if let Some(proxy) = self.actors.get_mut(about) {
                    if !proxy.invoke(&name, message, &mut outbox) {
                        warn!(
                            actor = %about,
                            invokable = %name,
                            kind = %message.kind,
                            "Declared invokable missing, skipping"
                        );
                    }
                }
            }

            // 4. Targeted (kind + about-actor) listeners.
            for listener in self.router.actor_listeners(&message.kind, about) {
                Self::invoke_listener(&mut self.actors, &listener, message, &mut outbox);
            }
        }

        // Messages queued by handlers land at the tail of the current
        // frame's queues, never mid-dispatch of this message.
        outbox.drain_into(&mut self.router);
    }

    /// Invoke one listener registration, tolerating missing actors and
    /// missing invokables.
    fn invoke_listener(
        actors: &mut ActorRegistry,
        listener: &ListenerEntry,
        message: &Message,
        outbox: &mut Outbox,
    ) {
        match actors.get_mut(listener.actor) {
            Some(proxy) => {
                if !proxy.invoke(&listener.invokable, message, outbox) {
                    warn!(
                        actor = %listener.actor,
                        invokable = %listener.invokable,
                        kind = %message.kind,
                        "Listener invokable missing, skipping"
                    );
                }
            }
            None => {
                warn!(
                    actor = %listener.actor,
                    kind = %message.kind,
                    "Listener actor not registered, skipping"
                );
            }
        }
    }

    /// Physically remove an actor: purge its listener registrations, drop
    /// it from the registry, and notify the scene graph.
    fn remove_actor_now(&mut self, id: ActorId) {
        self.router.unregister_all_for_actor(id);
        if let Some(mut proxy) = self.actors.remove(id) {
            proxy.left_world();
        }
        if let Some(scene) = self.scene.as_mut() {
            scene.remove(id);
        }
        self.stats.record_deleted(1);
        debug!(actor = %id, "Actor physically removed");
    }
}

impl core::fmt::Debug for Director {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Director")
            .field("machine_id", &self.machine_id)
            .field("phase", &self.phase)
            .field("paused", &self.paused)
            .field("actors", &self.actors.len())
            .field("components", &self.components.len())
            .field("listeners", &self.router.listener_count())
            .finish_non_exhaustive()
    }
}
