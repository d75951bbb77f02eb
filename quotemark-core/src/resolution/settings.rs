use std::collections::BTreeSet;
use std::sync::Arc;

use regex::Regex;

use crate::convention::{QuotationMarkDirection, QuoteConvention, QuoteConventionSet};
use crate::mark::QuotationMarkStringMatch;

/// Which conventions a resolver judges marks against
///
/// Every query has a default answered by [`Self::quote_convention_set`];
/// implementations usually only pick the set and the paragraph-marker policy.
pub trait QuotationMarkResolutionSettings {
    /// Conventions in play
    fn quote_convention_set(&self) -> &Arc<QuoteConventionSet>;

    /// Whether a quote continuer must follow a paragraph marker
    fn should_rely_on_paragraph_markers(&self) -> bool;

    fn is_valid_opening_quotation_mark(&self, quotation_mark_match: &QuotationMarkStringMatch<'_>) -> bool {
        quotation_mark_match.is_valid_opening_quotation_mark(self.quote_convention_set())
    }

    fn is_valid_closing_quotation_mark(&self, quotation_mark_match: &QuotationMarkStringMatch<'_>) -> bool {
        quotation_mark_match.is_valid_closing_quotation_mark(self.quote_convention_set())
    }

    fn marks_are_a_valid_pair(&self, opening: &str, closing: &str) -> bool {
        self.quote_convention_set().marks_are_a_valid_pair(opening, closing)
    }

    fn opening_quotation_mark_regex(&self) -> Option<&Regex> {
        self.quote_convention_set().opening_quotation_mark_regex()
    }

    fn closing_quotation_mark_regex(&self) -> Option<&Regex> {
        self.quote_convention_set().closing_quotation_mark_regex()
    }

    fn possible_depths(&self, mark: &str, direction: QuotationMarkDirection) -> BTreeSet<usize> {
        self.quote_convention_set().possible_depths(mark, direction)
    }

    fn metadata_matches_quotation_mark(
        &self,
        mark: &str,
        depth: usize,
        direction: QuotationMarkDirection,
    ) -> bool {
        self.quote_convention_set()
            .metadata_matches_quotation_mark(mark, depth, direction)
    }
}

/// Settings for detection: any candidate convention may apply
///
/// Continuers are only recognised after a paragraph marker, since the
/// convention is not known yet.
#[derive(Debug, Clone)]
pub struct DetectionResolutionSettings {
    conventions: Arc<QuoteConventionSet>,
}

impl DetectionResolutionSettings {
    pub fn new(conventions: Arc<QuoteConventionSet>) -> Self {
        Self { conventions }
    }
}

impl QuotationMarkResolutionSettings for DetectionResolutionSettings {
    fn quote_convention_set(&self) -> &Arc<QuoteConventionSet> {
        &self.conventions
    }

    fn should_rely_on_paragraph_markers(&self) -> bool {
        true
    }
}

/// Settings for conversion: only the known source convention applies
#[derive(Debug, Clone)]
pub struct UpdateResolutionSettings {
    source: Arc<QuoteConvention>,
    conventions: Arc<QuoteConventionSet>,
}

impl UpdateResolutionSettings {
    pub fn new(source: Arc<QuoteConvention>) -> Self {
        let conventions = Arc::new(QuoteConventionSet::from_shared(vec![Arc::clone(&source)]));
        Self {
            source,
            conventions,
        }
    }

    /// The convention the text is written in
    pub fn source_convention(&self) -> &Arc<QuoteConvention> {
        &self.source
    }
}

impl QuotationMarkResolutionSettings for UpdateResolutionSettings {
    fn quote_convention_set(&self) -> &Arc<QuoteConventionSet> {
        &self.conventions
    }

    fn should_rely_on_paragraph_markers(&self) -> bool {
        false
    }

    fn metadata_matches_quotation_mark(
        &self,
        mark: &str,
        depth: usize,
        direction: QuotationMarkDirection,
    ) -> bool {
        self.source.expected_quotation_mark(depth, direction) == Some(mark)
    }
}
