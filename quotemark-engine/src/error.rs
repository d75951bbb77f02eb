//! Layered error types

use quotemark_core::CoreError;
use thiserror::Error;

/// Engine-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Error from the core algorithms
    #[error("core algorithm error: {0}")]
    Core(#[from] CoreError),

    /// Invalid or incomplete configuration
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
