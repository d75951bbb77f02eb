//! Orchestration for quotation-mark convention detection and conversion
//!
//! This crate drives the core resolvers over whole documents: it detects
//! the convention a text was written in, picks a per-chapter strategy, and
//! rewrites quotation marks from one convention to another.

#![warn(missing_docs)]

pub mod config;
pub mod detector;
pub mod error;
pub mod first_pass;
pub mod updater;

// Re-export key types
pub use config::{UpdateSettings, UpdateStrategy};
pub use detector::{QuoteConventionAnalysis, QuoteConventionDetector};
pub use error::{EngineError, Result};
pub use first_pass::{analyze_chapters, find_best_chapter_strategies, ChapterAnalysis};
pub use updater::{ChapterReport, QuotationMarkUpdater, QuotationMarkUpdaterBuilder};

// Re-export from core for convenience
pub use quotemark_core::{
    standard_quote_convention, standard_quote_conventions, Chapter, Document, DocumentBuilder,
    IssueSet, QuotationMarkResolutionIssue, QuoteConvention, QuoteConventionSet, SegmentId,
};
