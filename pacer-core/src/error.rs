//! Error types for the PACER core library.

use thiserror::Error;

use crate::phase::Phase;
use crate::types::BotId;

/// Top-level error type for all PACER operations.
#[derive(Error, Debug)]
pub enum PacerError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The host could not produce the bot's durable fields.
    ///
    /// The save controller treats this as "state unknown" and fails open.
    #[error("Missing durable data for bot {0}")]
    MissingBotData(BotId),

    /// A phase callable failed inside the host.
    ///
    /// The scheduler logs this and continues with the remaining phases;
    /// it never reaches the host loop.
    #[error("Phase {phase} failed: {reason}")]
    PhaseFailed {
        /// Which phase failed.
        phase: Phase,
        /// Host-supplied failure description.
        reason: String,
    },

    /// Generic I/O error (config file loading).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, PacerError>;
