//! Frame clock and time tracking for the coordination core.
//!
//! The clock is the single source of truth for the two time domains the
//! core schedules against:
//!
//! - **Simulation time**: elapsed simulated microseconds since the clock
//!   was created. Advances by the (possibly scaled, possibly zero while
//!   paused) per-frame delta the host supplies.
//! - **Real time**: elapsed wall-clock microseconds since the clock was
//!   created. Advances by the unscaled per-frame delta and keeps moving
//!   while the simulation is paused.
//!
//! Both domains also have an epoch-anchored "clock time" form for
//! collaborators that want wall-clock correlation. All temporal arithmetic
//! is checked -- the clock never overflows silently.

use chrono::Utc;

/// Microseconds per second, the core's base time unit conversion.
pub const MICROS_PER_SECOND: i64 = 1_000_000;

/// Convert a duration in seconds to microseconds, rounding to nearest.
///
/// Negative and non-finite inputs clamp to zero; durations are never
/// negative in this core.
#[allow(clippy::cast_possible_truncation)]
pub fn seconds_to_us(seconds: f64) -> i64 {
    if !seconds.is_finite() || seconds <= 0.0 {
        return 0;
    }
    #[allow(clippy::cast_precision_loss)]
    let scaled = seconds * MICROS_PER_SECOND as f64;
    scaled.round() as i64
}

/// Convert a duration in microseconds to seconds.
#[allow(clippy::cast_precision_loss)]
pub fn us_to_seconds(us: i64) -> f64 {
    us as f64 / MICROS_PER_SECOND as f64
}

/// Errors that can occur during clock operations.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// A time counter would overflow.
    #[error("time counter overflow while {context}")]
    TimeOverflow {
        /// What was being advanced when the overflow occurred.
        context: String,
    },

    /// Invalid clock configuration (e.g. negative time scale).
    #[error("invalid clock configuration: {reason}")]
    InvalidConfig {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

/// The core's frame-stepped clock.
///
/// Owned by the frame driver and advanced exactly once per `pre_frame`
/// call. The host loop supplies the deltas; the clock only accumulates
/// and converts, it never reads the system clock after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameClock {
    /// Elapsed simulated time in microseconds.
    sim_time_us: i64,
    /// Elapsed real time in microseconds.
    real_time_us: i64,
    /// Wall-clock microseconds at construction, anchoring both clock-time
    /// accessors.
    epoch_us: i64,
    /// Ratio of simulated to real time the host is expected to apply.
    time_scale: f32,
    /// Whether the simulation is paused. While paused the simulated domain
    /// must not advance; the real domain keeps moving.
    paused: bool,
}

impl FrameClock {
    /// Create a clock at time zero in both domains, anchored to the
    /// current wall clock.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidConfig`] if `time_scale` is negative
    /// or not finite.
    pub fn new(time_scale: f32) -> Result<Self, ClockError> {
        Self::with_epoch(time_scale, Utc::now().timestamp_micros())
    }

    /// Create a clock with an explicit epoch (useful for testing and
    /// state restoration).
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidConfig`] if `time_scale` is negative
    /// or not finite.
    pub fn with_epoch(time_scale: f32, epoch_us: i64) -> Result<Self, ClockError> {
        if !time_scale.is_finite() || time_scale < 0.0 {
            return Err(ClockError::InvalidConfig {
                reason: format!("time scale must be finite and non-negative, got {time_scale}"),
            });
        }
        Ok(Self {
            sim_time_us: 0,
            real_time_us: 0,
            epoch_us,
            time_scale,
            paused: false,
        })
    }

    /// Advance both domains by the given per-frame deltas.
    ///
    /// The caller is responsible for passing a zero simulated delta while
    /// paused; the frame driver enforces that before calling here.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::TimeOverflow`] if either counter would exceed
    /// `i64::MAX`.
    pub fn advance(&mut self, sim_delta_us: i64, real_delta_us: i64) -> Result<(), ClockError> {
        let sim = self
            .sim_time_us
            .checked_add(sim_delta_us.max(0))
            .ok_or_else(|| ClockError::TimeOverflow {
                context: "advancing simulation time".to_owned(),
            })?;
        let real = self
            .real_time_us
            .checked_add(real_delta_us.max(0))
            .ok_or_else(|| ClockError::TimeOverflow {
                context: "advancing real time".to_owned(),
            })?;
        self.sim_time_us = sim;
        self.real_time_us = real;
        Ok(())
    }

    /// Scale a real-time delta into a simulated delta using the current
    /// time scale. Hosts that do not run their own scaling call this to
    /// derive the `sim_delta_us` argument for `pre_frame`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn scaled_delta_us(&self, real_delta_us: i64) -> i64 {
        let scaled = real_delta_us.max(0) as f64 * f64::from(self.time_scale);
        scaled.round() as i64
    }

    /// Elapsed simulated time in microseconds.
    pub const fn simulation_time_us(&self) -> i64 {
        self.sim_time_us
    }

    /// Elapsed real time in microseconds.
    pub const fn real_time_us(&self) -> i64 {
        self.real_time_us
    }

    /// Epoch-anchored simulated clock time in microseconds.
    pub const fn simulation_clock_time_us(&self) -> i64 {
        self.epoch_us.saturating_add(self.sim_time_us)
    }

    /// Epoch-anchored real clock time in microseconds.
    pub const fn real_clock_time_us(&self) -> i64 {
        self.epoch_us.saturating_add(self.real_time_us)
    }

    /// Current ratio of simulated to real time.
    pub const fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Set the time scale.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidConfig`] if `time_scale` is negative
    /// or not finite.
    pub fn set_time_scale(&mut self, time_scale: f32) -> Result<(), ClockError> {
        if !time_scale.is_finite() || time_scale < 0.0 {
            return Err(ClockError::InvalidConfig {
                reason: format!("time scale must be finite and non-negative, got {time_scale}"),
            });
        }
        self.time_scale = time_scale;
        Ok(())
    }

    /// Whether the simulated domain is paused.
    pub const fn paused(&self) -> bool {
        self.paused
    }

    /// Set the paused flag. The frame driver owns the announcement
    /// semantics; the clock only records the state.
    pub const fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }
}
