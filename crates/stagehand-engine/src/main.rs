//! Demo host binary for the Stagehand simulation core.
//!
//! Wires a [`Director`] to a demo actor factory, two components, and a
//! bounded fixed-timestep frame loop. It loads configuration, spawns a
//! handful of demo actors with pulse timers, and runs until the frame
//! bound is reached.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `stagehand-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Create the director from frame configuration
//! 4. Register the logbook and heartbeat components
//! 5. Spawn demo actors and their pulse timers
//! 6. Run the bounded frame loop
//! 7. Log the result

mod components;
mod error;
mod factory;
mod runner;

use std::path::Path;

use serde::Deserialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use stagehand_core::{CoreConfig, Director};
use stagehand_types::ComponentPriority;

use crate::components::{Heartbeat, Logbook};
use crate::error::EngineError;
use crate::factory::{DemoConfig, DemoFactory, spawn_demo_actors};

/// Path of the YAML configuration file, relative to the working
/// directory.
const CONFIG_PATH: &str = "stagehand-config.yaml";

/// Application entry point.
///
/// Initializes all subsystems and runs the frame loop.
///
/// # Errors
///
/// Returns an error if any initialization step or the frame loop fails.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration. Logging is not up yet, so a missing file is
    //    reported after initialization.
    let config_path = Path::new(CONFIG_PATH);
    let config_found = config_path.exists();
    let config = if config_found {
        CoreConfig::from_file(config_path)?
    } else {
        CoreConfig::default()
    };

    // 2. Initialize structured logging. RUST_LOG wins over the configured
    //    level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!("stagehand-engine starting");
    if !config_found {
        info!("Config file not found, using defaults");
    }
    info!(
        world_name = config.world.name,
        seed = config.world.seed,
        frame_interval_ms = config.frame.frame_interval_ms,
        time_scale = config.frame.time_scale,
        max_frames = config.bounds.max_frames,
        "Configuration loaded"
    );

    // 3. Create the director.
    let mut director = Director::from_config(&config, Box::new(DemoFactory)).map_err(
        EngineError::from,
    )?;
    info!(machine = %director.machine_id(), "Director created");

    // 4. Register components.
    director.add_component(Box::new(Logbook), ComponentPriority::Higher);
    director.add_component(
        Box::new(Heartbeat::new(
            director.machine_id(),
            config.statistics.interval_frames,
        )),
        ComponentPriority::Normal,
    );
    info!(components = director.component_names().len(), "Components registered");

    // 5. Spawn demo actors.
    let demo_config = load_demo_config(config_path)?;
    let ids = spawn_demo_actors(&mut director, &demo_config)?;
    info!(actors = ids.len(), "Demo actors ready");

    // 6. Run the frame loop.
    let summary = runner::run(&mut director, &config)?;

    // 7. Final report.
    info!(
        frames = summary.frames,
        actors = director.actor_count(),
        messages_processed = director.stats().messages_processed(),
        timers_fired = director.stats().timers_fired(),
        "stagehand-engine done"
    );
    Ok(())
}

/// Wrapper for the `demo` section of the config file.
#[derive(Debug, Default, Deserialize)]
struct DemoSection {
    /// The demo spawner settings.
    #[serde(default)]
    demo: DemoConfig,
}

/// Load the demo spawner configuration from the config file.
///
/// A missing file or a missing `demo` key yields defaults.
fn load_demo_config(path: &Path) -> Result<DemoConfig, EngineError> {
    if !path.exists() {
        return Ok(DemoConfig::default());
    }
    let contents = std::fs::read_to_string(path).map_err(|e| EngineError::Spawn {
        message: format!("failed to read config file: {e}"),
    })?;
    let section: DemoSection = serde_yml::from_str(&contents).map_err(|e| EngineError::Spawn {
        message: format!("failed to parse demo config: {e}"),
    })?;
    Ok(section.demo)
}
