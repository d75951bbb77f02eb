use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::convention::QuotationMarkDirection;
use crate::error::{CoreError, Result};
use crate::mark::{QuotationMarkMetadata, QuotationMarkStringMatch};

type QuotationStack = SmallVec<[QuotationMarkMetadata; 4]>;

/// Stack of currently open quotations
#[derive(Debug, Clone, Default)]
pub struct QuotationMarkResolverState {
    quotations: QuotationStack,
}

impl QuotationMarkResolverState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.quotations.clear();
    }

    /// Open quotations, outermost first
    pub fn quotations(&self) -> &[QuotationMarkMetadata] {
        &self.quotations
    }

    pub fn current_depth(&self) -> usize {
        self.quotations.len()
    }

    pub fn has_open_quotation_mark(&self) -> bool {
        !self.quotations.is_empty()
    }

    pub fn are_more_than_n_quotes_open(&self, n: usize) -> bool {
        self.current_depth() > n
    }

    /// Open a quotation one level deeper than the current depth
    pub fn add_opening_quotation_mark(
        &mut self,
        quotation_mark_match: &QuotationMarkStringMatch<'_>,
    ) -> QuotationMarkMetadata {
        let metadata =
            quotation_mark_match.resolve(self.current_depth() + 1, QuotationMarkDirection::Opening);
        self.quotations.push(metadata.clone());
        metadata
    }

    /// Close the deepest open quotation
    ///
    /// Must only be called while a quotation is open.
    pub fn add_closing_quotation_mark(
        &mut self,
        quotation_mark_match: &QuotationMarkStringMatch<'_>,
    ) -> QuotationMarkMetadata {
        let metadata =
            quotation_mark_match.resolve(self.current_depth(), QuotationMarkDirection::Closing);
        self.quotations.pop();
        metadata
    }

    /// Abandon every quotation deeper than `depth`
    pub fn unwind_to(&mut self, depth: usize) {
        self.quotations.truncate(depth);
    }

    /// Opening mark of the quotation open at a 1-based `depth`
    pub fn get_opening_quotation_mark_at_depth(&self, depth: usize) -> Result<&str> {
        if depth == 0 || depth > self.current_depth() {
            return Err(CoreError::InvalidState {
                reason: format!(
                    "opening quotation mark at depth {depth} requested from a quotation stack with depth {}",
                    self.current_depth()
                ),
            });
        }
        Ok(self.quotations[depth - 1].quotation_mark())
    }

    pub fn get_deepest_opening_quotation_mark(&self) -> Result<&str> {
        self.quotations
            .last()
            .map(QuotationMarkMetadata::quotation_mark)
            .ok_or_else(|| CoreError::InvalidState {
                reason: "deepest opening quotation mark requested from an empty quotation stack"
                    .to_string(),
            })
    }
}

/// How quotations are re-announced at the start of a new paragraph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum QuoteContinuerStyle {
    #[default]
    Undetermined,
    /// The opening marks are repeated
    English,
    /// The closing marks are used
    Spanish,
}

/// Progress through a sequence of quote continuers
#[derive(Debug, Clone, Default)]
pub struct QuoteContinuerState {
    continuer_marks: QuotationStack,
    style: QuoteContinuerStyle,
}

impl QuoteContinuerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.continuer_marks.clear();
        self.style = QuoteContinuerStyle::Undetermined;
    }

    /// Number of continuers seen in the current sequence
    pub fn current_depth(&self) -> usize {
        self.continuer_marks.len()
    }

    pub fn continuer_style(&self) -> QuoteContinuerStyle {
        self.style
    }

    /// True while a continuer sequence has started but not yet caught up with the open quotations
    pub fn continuer_has_been_observed(&self) -> bool {
        !self.continuer_marks.is_empty()
    }

    /// Record a continuer; the sequence completes once it reaches the resolver's depth
    pub fn add_quote_continuer(
        &mut self,
        quotation_mark_match: &QuotationMarkStringMatch<'_>,
        resolver_state: &QuotationMarkResolverState,
        style: QuoteContinuerStyle,
    ) -> QuotationMarkMetadata {
        let metadata = quotation_mark_match
            .resolve(self.current_depth() + 1, QuotationMarkDirection::Opening);
        self.continuer_marks.push(metadata.clone());
        self.style = style;
        if self.current_depth() == resolver_state.current_depth() {
            self.continuer_marks.clear();
        }
        metadata
    }
}
