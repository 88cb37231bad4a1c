//! Error types for the engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps all failure
//! modes during engine startup and the frame loop.

/// Top-level error for the engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: stagehand_core::ConfigError,
    },

    /// Frame clock initialization or advancement failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: stagehand_core::ClockError,
    },

    /// An actor operation on the core failed.
    #[error("core error: {source}")]
    Core {
        /// The underlying core error.
        #[from]
        source: stagehand_core::CoreError,
    },

    /// Demo actor spawning failed.
    #[error("spawn error: {message}")]
    Spawn {
        /// Description of the spawn failure.
        message: String,
    },
}
