//! services/console/src/error.rs
//!
//! Defines the primary error type for the entire console service.

use crate::config::ConfigError;
use hr_insight_core::ports::PortError;

/// The primary error type for the `console` service.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents an error from the line editor.
    #[error("Readline error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),

    /// Represents a standard Input/Output error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}
