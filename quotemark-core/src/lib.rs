//! Quotation-mark convention detection and depth-based resolution
//!
//! This crate holds the pure, single-threaded machinery for working with
//! quotation marks in structured text: a catalog of named conventions, a
//! segment model for marker-tagged text runs, a finder for candidate marks,
//! and resolvers that assign every mark a nesting depth and a direction.
//!
//! # Architecture
//!
//! - **convention**: immutable conventions and the aggregate [`QuoteConventionSet`]
//! - **segment**: text segments linked through a per-run [`SegmentArena`]
//! - **mark**: candidate matches, resolved metadata, and the [`QuotationMarkFinder`]
//! - **resolution**: resolver state, the categorizer, and both resolvers
//! - **analysis**: frequency tabulation and preliminary convention narrowing
//!
//! # Example
//!
//! ```rust
//! use quotemark_core::{
//!     standard_quote_convention, DepthBasedQuotationMarkResolver, QuotationMarkFinder,
//!     QuotationMarkResolutionSettings, QuotationMarkResolver, SegmentArena, TextSegment,
//!     UpdateResolutionSettings,
//! };
//!
//! let convention = standard_quote_convention("standard_english").unwrap();
//! let mut arena = SegmentArena::new();
//! let id = arena.push(TextSegment::new("“Hello,” she said."));
//!
//! let settings = UpdateResolutionSettings::new(convention.clone());
//! let finder = QuotationMarkFinder::new(settings.quote_convention_set().clone());
//! let matches = finder.find_all_potential_quotation_marks_in_segments(&arena, &[id]);
//!
//! let mut resolver = DepthBasedQuotationMarkResolver::new(settings);
//! let resolved = resolver.resolve_quotation_marks(&matches);
//! assert_eq!(resolved.len(), 2);
//! assert!(resolver.issues().is_empty());
//! ```

pub mod analysis;
pub mod convention;
pub mod error;
pub mod mark;
pub mod resolution;
pub mod segment;

pub use analysis::{PreliminaryQuotationMarkAnalyzer, QuotationMarkCounts, QuotationMarkTabulator};
pub use convention::{
    standard_quote_convention, standard_quote_conventions, QuotationMarkDirection, QuoteConvention,
    QuoteConventionSet, SingleLevelQuoteConvention,
};
pub use error::{CoreError, Result};
pub use mark::{QuotationMarkFinder, QuotationMarkMetadata, QuotationMarkStringMatch};
pub use resolution::{
    categorize, Classification, DepthBasedQuotationMarkResolver, DetectionResolutionSettings,
    FallbackQuotationMarkResolver, IssueSet, QuotationMarkResolutionIssue,
    QuotationMarkResolutionSettings, QuotationMarkResolver, QuotationMarkResolverState,
    QuoteContinuerState, QuoteContinuerStyle, UpdateResolutionSettings, MAX_NESTING_DEPTH,
};
pub use segment::{
    Chapter, Document, DocumentBuilder, Embed, MarkerType, SegmentArena, SegmentId, TextSegment,
    TextSegmentBuilder, Verse,
};
