use super::issue::{IssueSet, QuotationMarkResolutionIssue};
use super::settings::QuotationMarkResolutionSettings;
use super::QuotationMarkResolver;
use crate::convention::QuotationMarkDirection;
use crate::mark::{QuotationMarkMetadata, QuotationMarkStringMatch};

/// Context-only resolver for text whose nesting cannot be trusted
///
/// Each mark's direction comes from the characters around it and the last
/// mark resolved. Every mark is emitted at depth 1.
#[derive(Debug, Clone)]
pub struct FallbackQuotationMarkResolver<S> {
    settings: S,
    last_quotation_mark: Option<QuotationMarkMetadata>,
    issues: IssueSet,
}

impl<S: QuotationMarkResolutionSettings> FallbackQuotationMarkResolver<S> {
    pub fn new(settings: S) -> Self {
        Self {
            settings,
            last_quotation_mark: None,
            issues: IssueSet::new(),
        }
    }

    pub fn settings(&self) -> &S {
        &self.settings
    }

    /// The most recently emitted mark
    pub fn last_quotation_mark(&self) -> Option<&QuotationMarkMetadata> {
        self.last_quotation_mark.as_ref()
    }

    pub fn resolve_quotation_mark(
        &mut self,
        quotation_mark_match: &QuotationMarkStringMatch<'_>,
    ) -> QuotationMarkMetadata {
        let direction = if self.is_opening_quotation_mark(quotation_mark_match) {
            QuotationMarkDirection::Opening
        } else if self.is_closing_quotation_mark(quotation_mark_match) {
            QuotationMarkDirection::Closing
        } else {
            self.issues
                .insert(QuotationMarkResolutionIssue::AmbiguousQuotationMark);
            // Alternate with whatever came last
            match &self.last_quotation_mark {
                Some(last) if last.direction() == QuotationMarkDirection::Opening => {
                    QuotationMarkDirection::Closing
                }
                _ => QuotationMarkDirection::Opening,
            }
        };

        let metadata = quotation_mark_match.resolve(1, direction);
        self.last_quotation_mark = Some(metadata.clone());
        metadata
    }

    pub fn is_opening_quotation_mark(&self, m: &QuotationMarkStringMatch<'_>) -> bool {
        let valid_opening = self.settings.is_valid_opening_quotation_mark(m);
        if valid_opening && self.settings.is_valid_closing_quotation_mark(m) {
            return (m.is_at_start_of_segment()
                || m.has_leading_whitespace()
                || self.most_recent_opening_mark_immediately_precedes(m)
                || m.has_quote_introducer_in_leading_substring())
                && !(m.has_trailing_whitespace() || m.has_trailing_punctuation());
        }
        valid_opening
    }

    pub fn is_closing_quotation_mark(&self, m: &QuotationMarkStringMatch<'_>) -> bool {
        let valid_closing = self.settings.is_valid_closing_quotation_mark(m);
        if valid_closing && self.settings.is_valid_opening_quotation_mark(m) {
            return (m.has_trailing_whitespace()
                || m.has_trailing_punctuation()
                || m.is_at_end_of_segment())
                && !m.has_leading_whitespace();
        }
        valid_closing
    }

    fn most_recent_opening_mark_immediately_precedes(&self, m: &QuotationMarkStringMatch<'_>) -> bool {
        self.last_quotation_mark.as_ref().is_some_and(|last| {
            last.direction() == QuotationMarkDirection::Opening
                && last.segment() == m.segment_id()
                && last.end_index() == m.start_index()
        })
    }
}

impl<S: QuotationMarkResolutionSettings> QuotationMarkResolver for FallbackQuotationMarkResolver<S> {
    fn resolve_quotation_marks(
        &mut self,
        matches: &[QuotationMarkStringMatch<'_>],
    ) -> Vec<QuotationMarkMetadata> {
        matches
            .iter()
            .map(|quotation_mark_match| self.resolve_quotation_mark(quotation_mark_match))
            .collect()
    }

    fn issues(&self) -> &IssueSet {
        &self.issues
    }

    fn reset(&mut self) {
        self.last_quotation_mark = None;
        self.issues.clear();
    }
}
