//! Demo actor types and spawning.
//!
//! The demo registers two actor types with the core: `Sentry`, a game
//! actor whose invokables react to its own pulse timer, and `Prop`,
//! inert passive scenery. The spawner creates a configurable number of
//! each, names sentries from a built-in pool, and wires up their timers.

use rand::Rng;
use serde::Deserialize;
use tracing::{debug, info};

use stagehand_core::{ActorFactory, ActorProxy, CoreError, Director};
use stagehand_types::{ActorId, ActorKind, ActorTypeDesc, MessageKind};

use crate::error::EngineError;

/// Configuration for the demo spawner, from the `demo` section of
/// `stagehand-config.yaml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DemoConfig {
    /// Number of sentry (game) actors to spawn at startup.
    #[serde(default = "default_sentry_count")]
    pub sentry_count: u32,

    /// Number of prop (passive) actors to spawn at startup.
    #[serde(default = "default_prop_count")]
    pub prop_count: u32,

    /// Whether spawned sentries are published.
    #[serde(default = "default_publish_sentries")]
    pub publish_sentries: bool,

    /// Period of each sentry's repeating pulse timer, in simulated
    /// seconds.
    #[serde(default = "default_pulse_seconds")]
    pub pulse_seconds: f64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            sentry_count: default_sentry_count(),
            prop_count: default_prop_count(),
            publish_sentries: default_publish_sentries(),
            pulse_seconds: default_pulse_seconds(),
        }
    }
}

const fn default_sentry_count() -> u32 {
    3
}

const fn default_prop_count() -> u32 {
    2
}

const fn default_publish_sentries() -> bool {
    true
}

const fn default_pulse_seconds() -> f64 {
    1.0
}

/// Built-in pool of sentry names. The factory picks randomly; collisions
/// are fine, ids stay unique.
const NAME_POOL: &[&str] = &[
    "Alder", "Birch", "Cedar", "Dusk", "Ember", "Fern", "Grove", "Haze",
    "Iris", "Juniper", "Kestrel", "Lark", "Moss", "Nettle", "Oak", "Pine",
    "Quill", "Reed", "Sage", "Thorn", "Umber", "Vale", "Wren", "Yarrow",
];

/// The demo's actor-type factory: knows `Sentry` and `Prop`.
#[derive(Debug, Default)]
pub struct DemoFactory;

impl ActorFactory for DemoFactory {
    fn create_proxy(&self, actor_type: &str) -> Result<ActorProxy, CoreError> {
        match actor_type {
            "Sentry" => Ok(sentry_proxy()),
            "Prop" => {
                let desc = ActorTypeDesc::new("Prop", "demo", "Inert passive scenery");
                Ok(ActorProxy::new("prop", desc, ActorKind::Passive))
            }
            other => Err(CoreError::UnknownActorType {
                actor_type: other.to_owned(),
            }),
        }
    }
}

/// Build a sentry proxy with a pooled name and its invokable builder.
fn sentry_proxy() -> ActorProxy {
    let mut rng = rand::rng();
    let idx = rng.random_range(0..NAME_POOL.len());
    let name = NAME_POOL.get(idx).copied().unwrap_or("Sentry");
    let desc = ActorTypeDesc::new("Sentry", "demo", "A game actor with a pulse timer");

    ActorProxy::new(name, desc, ActorKind::Game).with_invokable_builder(Box::new(|proxy| {
        let name = proxy.name().to_owned();
        proxy.register_invokable(
            "OnPulse",
            Box::new(move |message, _outbox| {
                if let stagehand_types::MessagePayload::Timer(payload) = &message.payload {
                    debug!(
                        sentry = %name,
                        timer = %payload.timer_name,
                        late_seconds = payload.late_seconds,
                        "Pulse"
                    );
                }
            }),
        );
        proxy.register_handler(MessageKind::TimerElapsed, "OnPulse");
    }))
}

/// Spawn the configured demo actors and wire their timers.
///
/// # Errors
///
/// Propagates actor creation or registration failures.
pub fn spawn_demo_actors(
    director: &mut Director,
    config: &DemoConfig,
) -> Result<Vec<ActorId>, EngineError> {
    let mut ids = Vec::new();

    for _ in 0..config.sentry_count {
        let proxy = director.create_actor("Sentry")?;
        let id = director.add_actor(proxy, false, config.publish_sentries)?;
        director.set_timer("pulse", Some(id), config.pulse_seconds, true, false);
        ids.push(id);
    }
    for _ in 0..config.prop_count {
        let proxy = director.create_actor("Prop")?;
        let id = director.add_actor(proxy, false, false)?;
        ids.push(id);
    }

    info!(
        sentries = config.sentry_count,
        props = config.prop_count,
        published = config.publish_sentries,
        "Demo actors spawned"
    );
    Ok(ids)
}
