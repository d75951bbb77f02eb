//! Core error types (deterministic only)

use thiserror::Error;

/// Core errors (no I/O, no external failures)
///
/// Document-quality problems such as an unpaired quotation mark are not
/// errors; they are collected as [`crate::QuotationMarkResolutionIssue`]s.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Resolver state was queried for something that is not currently open
    #[error("invalid resolver state: {reason}")]
    InvalidState {
        /// What was requested and why it could not be answered
        reason: String,
    },

    /// No convention with this name exists in the set
    #[error("unknown quote convention '{name}'")]
    UnknownConvention {
        /// The requested convention name
        name: String,
    },

    /// Convention catalog could not be parsed or validated
    #[error("invalid quote convention catalog: {0}")]
    Catalog(String),

    /// Character range outside a text segment
    #[error("invalid character range {start}..{end} for a segment of length {length}")]
    InvalidOffsets {
        /// Start offset in characters
        start: usize,
        /// End offset in characters
        end: usize,
        /// Segment length in characters
        length: usize,
    },
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
