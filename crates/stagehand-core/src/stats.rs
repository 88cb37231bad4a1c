//! Frame statistics sampling.
//!
//! The frame driver accumulates per-frame counters (messages drained,
//! timers fired, actors physically removed) and, when sampling is enabled,
//! logs a summary line every N frames. Counters use saturating arithmetic;
//! statistics must never be the thing that overflows.

use tracing::info;

/// Cumulative and windowed frame counters.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FrameStats {
    /// Frames completed since the core was created.
    frames: u64,
    /// Outbound messages drained to components, total.
    messages_sent: u64,
    /// Local messages fully dispatched, total.
    messages_processed: u64,
    /// Timer-elapsed messages emitted, total.
    timers_fired: u64,
    /// Actors physically removed, total.
    actors_deleted: u64,
    /// Same counters since the last sample.
    window_sent: u64,
    window_processed: u64,
    window_timers: u64,
    window_deleted: u64,
}

impl FrameStats {
    /// Create zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record outbound messages drained this frame.
    pub const fn record_sent(&mut self, count: u64) {
        self.messages_sent = self.messages_sent.saturating_add(count);
        self.window_sent = self.window_sent.saturating_add(count);
    }

    /// Record local messages dispatched this frame.
    pub const fn record_processed(&mut self, count: u64) {
        self.messages_processed = self.messages_processed.saturating_add(count);
        self.window_processed = self.window_processed.saturating_add(count);
    }

    /// Record timer firings this frame.
    pub const fn record_timers(&mut self, count: u64) {
        self.timers_fired = self.timers_fired.saturating_add(count);
        self.window_timers = self.window_timers.saturating_add(count);
    }

    /// Record actors physically removed this frame.
    pub const fn record_deleted(&mut self, count: u64) {
        self.actors_deleted = self.actors_deleted.saturating_add(count);
        self.window_deleted = self.window_deleted.saturating_add(count);
    }

    /// Close out a frame. With `sample_interval = Some(n)`, every n-th
    /// frame logs a summary and resets the window counters. Returns
    /// whether a sample was emitted.
    pub fn end_frame(&mut self, sample_interval: Option<u64>) -> bool {
        self.frames = self.frames.saturating_add(1);
        let Some(interval) = sample_interval else {
            return false;
        };
        if interval == 0 || self.frames.checked_rem(interval) != Some(0) {
            return false;
        }
        info!(
            frames = self.frames,
            window_processed = self.window_processed,
            window_sent = self.window_sent,
            window_timers = self.window_timers,
            window_deleted = self.window_deleted,
            total_processed = self.messages_processed,
            total_timers = self.timers_fired,
            "Frame statistics sample"
        );
        self.window_sent = 0;
        self.window_processed = 0;
        self.window_timers = 0;
        self.window_deleted = 0;
        true
    }

    /// Frames completed so far.
    pub const fn frames(&self) -> u64 {
        self.frames
    }

    /// Total local messages dispatched.
    pub const fn messages_processed(&self) -> u64 {
        self.messages_processed
    }

    /// Total outbound messages drained.
    pub const fn messages_sent(&self) -> u64 {
        self.messages_sent
    }

    /// Total timer firings.
    pub const fn timers_fired(&self) -> u64 {
        self.timers_fired
    }

    /// Total actors physically removed.
    pub const fn actors_deleted(&self) -> u64 {
        self.actors_deleted
    }
}
