//! The host frame loop.
//!
//! Drives the core at a fixed real-time cadence: measure the elapsed real
//! time, derive the scaled simulated delta, run the frame pair, then
//! sleep out the remainder of the interval. The run is bounded by a
//! maximum frame count from configuration.

use std::thread;
use std::time::{Duration, Instant};

use tracing::info;

use stagehand_core::{CoreConfig, Director};

use crate::error::EngineError;

/// Why the frame loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// The configured frame bound was reached.
    FrameBound,
}

/// Result of a bounded run.
#[derive(Debug)]
pub struct RunSummary {
    /// Why the loop stopped.
    pub end_reason: EndReason,
    /// Total frames executed.
    pub frames: u64,
    /// Simulated time accumulated, in microseconds.
    pub sim_time_us: i64,
    /// Real time accumulated, in microseconds.
    pub real_time_us: i64,
}

/// Run the frame loop until the configured frame bound is reached.
///
/// # Errors
///
/// Returns [`EngineError::Clock`] if a frame's time advancement fails.
pub fn run(director: &mut Director, config: &CoreConfig) -> Result<RunSummary, EngineError> {
    let interval = Duration::from_millis(config.frame.frame_interval_ms);
    let max_frames = config.bounds.max_frames;

    info!(
        frame_interval_ms = config.frame.frame_interval_ms,
        max_frames,
        time_scale = config.frame.time_scale,
        "Frame loop starting"
    );

    let mut frames: u64 = 0;
    let mut last = Instant::now();
    while frames < max_frames {
        let now = Instant::now();
        let real_delta_us = duration_to_us(now.duration_since(last));
        last = now;
        let sim_delta_us = director.clock().scaled_delta_us(real_delta_us);

        director.pre_frame(sim_delta_us, real_delta_us)?;
        director.post_frame();
        frames = frames.saturating_add(1);

        if let Some(remaining) = interval.checked_sub(now.elapsed()) {
            thread::sleep(remaining);
        }
    }

    let summary = RunSummary {
        end_reason: EndReason::FrameBound,
        frames,
        sim_time_us: director.clock().simulation_time_us(),
        real_time_us: director.clock().real_time_us(),
    };
    log_run_end(&summary);
    Ok(summary)
}

/// Log the final run summary.
fn log_run_end(summary: &RunSummary) {
    info!(
        end_reason = ?summary.end_reason,
        frames = summary.frames,
        sim_seconds = stagehand_core::us_to_seconds(summary.sim_time_us),
        real_seconds = stagehand_core::us_to_seconds(summary.real_time_us),
        "Frame loop ended"
    );
}

/// Convert a [`Duration`] to whole microseconds, clamping at `i64::MAX`.
fn duration_to_us(duration: Duration) -> i64 {
    i64::try_from(duration.as_micros()).unwrap_or(i64::MAX)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use stagehand_core::{ActorProxy, CoreError, FrameClock};
    use stagehand_types::{ActorKind, ActorTypeDesc};

    use super::*;

    struct OneType;

    impl stagehand_core::ActorFactory for OneType {
        fn create_proxy(&self, actor_type: &str) -> Result<ActorProxy, CoreError> {
            if actor_type == "Prop" {
                let desc = ActorTypeDesc::new("Prop", "test", "test");
                Ok(ActorProxy::new("prop", desc, ActorKind::Passive))
            } else {
                Err(CoreError::UnknownActorType {
                    actor_type: actor_type.to_owned(),
                })
            }
        }
    }

    #[test]
    fn run_stops_at_the_frame_bound() {
        let clock = FrameClock::with_epoch(1.0, 0).unwrap();
        let mut director = Director::new(clock, Box::new(OneType));
        let mut config = CoreConfig::default();
        config.frame.frame_interval_ms = 0;
        config.bounds.max_frames = 5;

        let summary = run(&mut director, &config).unwrap();
        assert_eq!(summary.end_reason, EndReason::FrameBound);
        assert_eq!(summary.frames, 5);
        assert_eq!(director.stats().frames(), 5);
    }

    #[test]
    fn duration_conversion_clamps() {
        assert_eq!(duration_to_us(Duration::from_micros(1_500)), 1_500);
        assert_eq!(duration_to_us(Duration::MAX), i64::MAX);
    }
}
