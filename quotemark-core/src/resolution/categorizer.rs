//! Classification of a single candidate mark against the current resolution state
//!
//! [`categorize`] is a pure function: it reads the resolver and continuer
//! state but never changes it. The resolver acts on the returned
//! [`Classification`].

use std::sync::OnceLock;

use regex::Regex;

use super::settings::QuotationMarkResolutionSettings;
use super::state::{QuotationMarkResolverState, QuoteContinuerState, QuoteContinuerStyle};
use crate::mark::QuotationMarkStringMatch;
use crate::segment::MarkerType;

/// Only this mark has been seen starting a Spanish-style continuer sequence
const SPANISH_CONTINUER_MARK: &str = "\u{00BB}";

fn apostrophe_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"['\u{2019}\u{2018}]").expect("apostrophe pattern should be valid"))
}

/// What a candidate mark is, given everything resolved before it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Opens a new, deeper quotation
    Opening,
    /// Closes an open quotation
    Closing,
    /// Looks like a miskeyed opener
    MalformedOpening,
    /// Sits where a closer is expected but does not pair with the open quotation
    MalformedClosing,
    /// A closer with nothing open
    UnpairedClosing,
    /// Not a quotation mark at all
    Apostrophe,
    /// Re-announces an already open quotation at a paragraph start
    Continuer(QuoteContinuerStyle),
    /// None of the above could be decided
    Ambiguous,
}

/// Classify `quotation_mark_match`
///
/// `next_match` is the following candidate in document order, used to check
/// that continuers are contiguous and to tell possessives from closers.
pub fn categorize<S>(
    quotation_mark_match: &QuotationMarkStringMatch<'_>,
    next_match: Option<&QuotationMarkStringMatch<'_>>,
    resolver_state: &QuotationMarkResolverState,
    continuer_state: &QuoteContinuerState,
    settings: &S,
) -> Classification
where
    S: QuotationMarkResolutionSettings + ?Sized,
{
    let categorizer = Categorizer {
        settings,
        resolver_state,
        continuer_state,
    };

    if categorizer.is_opening_quotation_mark(quotation_mark_match) {
        if categorizer.is_english_quote_continuer(quotation_mark_match, next_match) {
            return Classification::Continuer(QuoteContinuerStyle::English);
        }
        return Classification::Opening;
    }
    if categorizer.is_apostrophe(quotation_mark_match, next_match) {
        return Classification::Apostrophe;
    }
    if categorizer.is_closing_quotation_mark(quotation_mark_match) {
        if categorizer.is_spanish_quote_continuer(quotation_mark_match, next_match) {
            return Classification::Continuer(QuoteContinuerStyle::Spanish);
        }
        if !resolver_state.has_open_quotation_mark() {
            return Classification::UnpairedClosing;
        }
        return Classification::Closing;
    }
    if categorizer.is_malformed_opening_quotation_mark(quotation_mark_match) {
        return Classification::MalformedOpening;
    }
    if categorizer.is_malformed_closing_quotation_mark(quotation_mark_match) {
        return Classification::MalformedClosing;
    }
    if categorizer.is_unpaired_closing_quotation_mark(quotation_mark_match) {
        return Classification::UnpairedClosing;
    }
    Classification::Ambiguous
}

struct Categorizer<'s, S: ?Sized> {
    settings: &'s S,
    resolver_state: &'s QuotationMarkResolverState,
    continuer_state: &'s QuoteContinuerState,
}

impl<S> Categorizer<'_, S>
where
    S: QuotationMarkResolutionSettings + ?Sized,
{
    fn is_opening_quotation_mark(&self, m: &QuotationMarkStringMatch<'_>) -> bool {
        if !self.settings.is_valid_opening_quotation_mark(m) {
            return false;
        }
        // Direction-ambiguous marks need context
        if self.settings.is_valid_closing_quotation_mark(m) {
            return (m.has_leading_whitespace()
                || self.most_recent_opening_mark_immediately_precedes(m)
                || m.has_quote_introducer_in_leading_substring())
                && !(m.has_trailing_whitespace() || m.has_trailing_punctuation());
        }
        true
    }

    fn is_closing_quotation_mark(&self, m: &QuotationMarkStringMatch<'_>) -> bool {
        if !self.settings.is_valid_closing_quotation_mark(m) {
            return false;
        }
        if self.settings.is_valid_opening_quotation_mark(m) {
            let next_is_closer = self
                .settings
                .closing_quotation_mark_regex()
                .is_some_and(|pattern| m.next_character_matches(pattern));
            return (m.has_trailing_whitespace()
                || m.has_trailing_punctuation()
                || m.is_at_end_of_segment()
                || next_is_closer)
                && !m.has_leading_whitespace();
        }
        true
    }

    fn is_malformed_opening_quotation_mark(&self, m: &QuotationMarkStringMatch<'_>) -> bool {
        (self.settings.is_valid_opening_quotation_mark(m)
            || self.settings.is_valid_closing_quotation_mark(m))
            && m.has_leading_whitespace()
            && m.has_trailing_whitespace()
            && m.has_quote_introducer_in_leading_substring()
            && !self.resolver_state.has_open_quotation_mark()
    }

    fn is_malformed_closing_quotation_mark(&self, m: &QuotationMarkStringMatch<'_>) -> bool {
        if !self.settings.is_valid_closing_quotation_mark(m) {
            return false;
        }
        if !(m.is_at_end_of_segment() || m.has_trailing_whitespace()) {
            return false;
        }
        if !self.resolver_state.are_more_than_n_quotes_open(1) {
            return false;
        }
        self.deepest_opening_mark()
            .is_some_and(|deepest| !self.settings.marks_are_a_valid_pair(deepest, m.quotation_mark()))
    }

    fn is_unpaired_closing_quotation_mark(&self, m: &QuotationMarkStringMatch<'_>) -> bool {
        self.settings.is_valid_closing_quotation_mark(m)
            && !self.resolver_state.has_open_quotation_mark()
            && !m.has_leading_whitespace()
            && (m.is_at_end_of_segment() || m.has_trailing_whitespace())
    }

    fn is_apostrophe(
        &self,
        m: &QuotationMarkStringMatch<'_>,
        next_match: Option<&QuotationMarkStringMatch<'_>>,
    ) -> bool {
        if !m.quotation_mark_matches(apostrophe_pattern()) {
            return false;
        }

        if m.has_leading_latin_letter() && m.has_trailing_latin_letter() {
            return true;
        }

        // Possible possessive after a final s
        if m.previous_character() == Some('s')
            && (m.has_trailing_whitespace() || m.has_trailing_punctuation())
        {
            let Some(deepest) = self.deepest_opening_mark() else {
                return true;
            };
            if !self.settings.marks_are_a_valid_pair(deepest, m.quotation_mark()) {
                return true;
            }
            if next_match
                .is_some_and(|next| self.settings.marks_are_a_valid_pair(deepest, next.quotation_mark()))
            {
                return true;
            }
        }

        match self.deepest_opening_mark() {
            None => m.quotation_mark() == "'",
            Some(deepest) => !self.settings.marks_are_a_valid_pair(deepest, m.quotation_mark()),
        }
    }

    fn is_english_quote_continuer(
        &self,
        m: &QuotationMarkStringMatch<'_>,
        next_match: Option<&QuotationMarkStringMatch<'_>>,
    ) -> bool {
        if self.continuer_state.continuer_style() == QuoteContinuerStyle::Spanish {
            return false;
        }
        if !self.meets_quote_continuer_prerequisites(m) {
            return false;
        }
        let Some(expected) = self.next_continued_opening_mark() else {
            return false;
        };
        if m.quotation_mark() != expected {
            return false;
        }
        self.continues_sequence(m, next_match)
    }

    fn is_spanish_quote_continuer(
        &self,
        m: &QuotationMarkStringMatch<'_>,
        next_match: Option<&QuotationMarkStringMatch<'_>>,
    ) -> bool {
        if self.continuer_state.continuer_style() == QuoteContinuerStyle::English {
            return false;
        }
        if !self.meets_quote_continuer_prerequisites(m) {
            return false;
        }
        let Some(continued) = self.next_continued_opening_mark() else {
            return false;
        };
        if !self.settings.marks_are_a_valid_pair(continued, m.quotation_mark()) {
            return false;
        }
        if !self.continuer_state.continuer_has_been_observed()
            && m.quotation_mark() != SPANISH_CONTINUER_MARK
        {
            return false;
        }
        self.continues_sequence(m, next_match)
    }

    fn meets_quote_continuer_prerequisites(&self, m: &QuotationMarkStringMatch<'_>) -> bool {
        if self.settings.should_rely_on_paragraph_markers()
            && !m
                .text_segment()
                .marker_is_in_preceding_context(MarkerType::Paragraph)
        {
            return false;
        }
        self.resolver_state.has_open_quotation_mark()
    }

    /// The first continuer must start its segment and, when several
    /// quotations are open, be followed directly by the next one.
    fn continues_sequence(
        &self,
        m: &QuotationMarkStringMatch<'_>,
        next_match: Option<&QuotationMarkStringMatch<'_>>,
    ) -> bool {
        if self.continuer_state.continuer_has_been_observed() {
            return true;
        }
        if m.start_index() > 0 {
            return false;
        }
        if self.resolver_state.are_more_than_n_quotes_open(1) {
            return next_match.is_some_and(|next| {
                next.segment_id() == m.segment_id() && next.start_index() == m.end_index()
            });
        }
        true
    }

    fn next_continued_opening_mark(&self) -> Option<&str> {
        self.resolver_state
            .get_opening_quotation_mark_at_depth(self.continuer_state.current_depth() + 1)
            .ok()
    }

    fn deepest_opening_mark(&self) -> Option<&str> {
        self.resolver_state.get_deepest_opening_quotation_mark().ok()
    }

    fn most_recent_opening_mark_immediately_precedes(&self, m: &QuotationMarkStringMatch<'_>) -> bool {
        let (Some(deepest), Some(previous)) = (self.deepest_opening_mark(), m.previous_character()) else {
            return false;
        };
        let mut buffer = [0; 4];
        deepest == previous.encode_utf8(&mut buffer)
    }
}
