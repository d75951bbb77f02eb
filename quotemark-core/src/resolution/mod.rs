//! Quotation-mark resolution
//!
//! Resolution turns an ordered list of candidate matches into
//! [`QuotationMarkMetadata`]: every structural mark gets a nesting depth and a
//! direction. Apostrophes are dropped and document-quality problems are
//! collected in an [`IssueSet`] instead of failing the run.

mod categorizer;
mod depth_based;
mod fallback;
mod issue;
mod settings;
mod state;

pub use categorizer::{categorize, Classification};
pub use depth_based::{DepthBasedQuotationMarkResolver, MAX_NESTING_DEPTH};
pub use fallback::FallbackQuotationMarkResolver;
pub use issue::{IssueSet, QuotationMarkResolutionIssue};
pub use settings::{
    DetectionResolutionSettings, QuotationMarkResolutionSettings, UpdateResolutionSettings,
};
pub use state::{QuotationMarkResolverState, QuoteContinuerState, QuoteContinuerStyle};

use crate::mark::{QuotationMarkMetadata, QuotationMarkStringMatch};

/// Common interface of the depth-based and fallback resolvers
///
/// Matches must be supplied in document order. State carries over between
/// calls until [`QuotationMarkResolver::reset`] is called.
pub trait QuotationMarkResolver {
    /// Resolve a sequence of matches, emitting metadata for structural marks
    fn resolve_quotation_marks(
        &mut self,
        matches: &[QuotationMarkStringMatch<'_>],
    ) -> Vec<QuotationMarkMetadata>;

    /// Issues recorded since the last reset
    fn issues(&self) -> &IssueSet;

    /// Clear all resolution state and recorded issues
    fn reset(&mut self);
}
