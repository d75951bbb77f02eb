use super::categorizer::{categorize, Classification};
use super::issue::{IssueSet, QuotationMarkResolutionIssue};
use super::settings::QuotationMarkResolutionSettings;
use super::state::{QuotationMarkResolverState, QuoteContinuerState, QuoteContinuerStyle};
use super::QuotationMarkResolver;
use crate::convention::QuotationMarkDirection;
use crate::mark::{QuotationMarkMetadata, QuotationMarkStringMatch};

/// Deepest nesting level that is still resolved
pub const MAX_NESTING_DEPTH: usize = 4;

/// Stateful resolver that tracks nesting depth across a run of matches
///
/// State persists across calls to [`QuotationMarkResolver::resolve_quotation_marks`]
/// until [`QuotationMarkResolver::reset`]. Each call is treated as a complete
/// context: quotations still open when it returns are reported as unpaired.
///
/// Openers past [`MAX_NESTING_DEPTH`] are dropped, and so are the closers that
/// pair with them, until nesting unwinds back to the deepest resolved level.
#[derive(Debug, Clone)]
pub struct DepthBasedQuotationMarkResolver<S> {
    settings: S,
    resolver_state: QuotationMarkResolverState,
    continuer_state: QuoteContinuerState,
    issues: IssueSet,
    suppressed_openings: Vec<String>,
}

impl<S: QuotationMarkResolutionSettings> DepthBasedQuotationMarkResolver<S> {
    pub fn new(settings: S) -> Self {
        Self {
            settings,
            resolver_state: QuotationMarkResolverState::new(),
            continuer_state: QuoteContinuerState::new(),
            issues: IssueSet::new(),
            suppressed_openings: Vec::new(),
        }
    }

    pub fn settings(&self) -> &S {
        &self.settings
    }

    pub fn resolver_state(&self) -> &QuotationMarkResolverState {
        &self.resolver_state
    }

    pub fn continuer_state(&self) -> &QuoteContinuerState {
        &self.continuer_state
    }

    /// Resolve one match given the one that follows it
    pub fn resolve_quotation_mark(
        &mut self,
        quotation_mark_match: &QuotationMarkStringMatch<'_>,
        next_match: Option<&QuotationMarkStringMatch<'_>>,
    ) -> Option<QuotationMarkMetadata> {
        let classification = categorize(
            quotation_mark_match,
            next_match,
            &self.resolver_state,
            &self.continuer_state,
            &self.settings,
        );

        if self.closes_suppressed_opening(quotation_mark_match, classification) {
            return None;
        }

        match classification {
            Classification::Opening => self.process_opening_mark(quotation_mark_match),
            Classification::Closing => Some(self.process_closing_mark(quotation_mark_match)),
            Classification::Continuer(style) => {
                Some(self.process_quote_continuer(quotation_mark_match, style))
            }
            Classification::UnpairedClosing => {
                self.issues
                    .insert(QuotationMarkResolutionIssue::UnpairedQuotationMark);
                Some(quotation_mark_match.resolve(1, QuotationMarkDirection::Closing))
            }
            Classification::MalformedOpening | Classification::MalformedClosing => {
                self.issues
                    .insert(QuotationMarkResolutionIssue::IncompatibleQuotationMark);
                None
            }
            Classification::Apostrophe => None,
            Classification::Ambiguous => {
                self.issues
                    .insert(QuotationMarkResolutionIssue::AmbiguousQuotationMark);
                None
            }
        }
    }

    fn process_opening_mark(
        &mut self,
        quotation_mark_match: &QuotationMarkStringMatch<'_>,
    ) -> Option<QuotationMarkMetadata> {
        if self
            .resolver_state
            .are_more_than_n_quotes_open(MAX_NESTING_DEPTH - 1)
        {
            self.issues.insert(QuotationMarkResolutionIssue::TooDeepNesting);
            self.suppressed_openings
                .push(quotation_mark_match.quotation_mark().to_string());
            return None;
        }

        let depth = self.resolver_state.current_depth() + 1;
        if !self.settings.metadata_matches_quotation_mark(
            quotation_mark_match.quotation_mark(),
            depth,
            QuotationMarkDirection::Opening,
        ) {
            self.issues
                .insert(QuotationMarkResolutionIssue::IncompatibleQuotationMark);
        }
        Some(
            self.resolver_state
                .add_opening_quotation_mark(quotation_mark_match),
        )
    }

    /// Drop a closer of a quotation opened past the maximum depth
    fn closes_suppressed_opening(
        &mut self,
        quotation_mark_match: &QuotationMarkStringMatch<'_>,
        classification: Classification,
    ) -> bool {
        let Some(opening) = self.suppressed_openings.last() else {
            return false;
        };
        let may_close = match classification {
            Classification::Closing
            | Classification::MalformedClosing
            | Classification::UnpairedClosing
            | Classification::Ambiguous => true,
            // Word-internal apostrophes never close
            Classification::Apostrophe => {
                !(quotation_mark_match.has_leading_latin_letter()
                    && quotation_mark_match.has_trailing_latin_letter())
            }
            Classification::Opening
            | Classification::MalformedOpening
            | Classification::Continuer(_) => false,
        };
        if may_close
            && self
                .settings
                .marks_are_a_valid_pair(opening, quotation_mark_match.quotation_mark())
        {
            self.suppressed_openings.pop();
            return true;
        }
        false
    }

    fn process_closing_mark(
        &mut self,
        quotation_mark_match: &QuotationMarkStringMatch<'_>,
    ) -> QuotationMarkMetadata {
        // A resolved level closes while deeper dropped quotations are still open
        if !self.suppressed_openings.is_empty() {
            self.suppressed_openings.clear();
            self.issues
                .insert(QuotationMarkResolutionIssue::UnpairedQuotationMark);
        }

        let mark = quotation_mark_match.quotation_mark();
        let depth = self.resolver_state.current_depth();

        if !self.pairs_with_opening_mark_at(depth, mark) {
            // A shallower quotation this mark closes leaves the deeper ones unclosed
            match (1..depth).rev().find(|&d| self.pairs_with_opening_mark_at(d, mark)) {
                Some(paired_depth) => {
                    self.issues
                        .insert(QuotationMarkResolutionIssue::UnpairedQuotationMark);
                    self.resolver_state.unwind_to(paired_depth);
                }
                None => {
                    self.issues
                        .insert(QuotationMarkResolutionIssue::IncompatibleQuotationMark);
                }
            }
        }

        if !self.settings.metadata_matches_quotation_mark(
            mark,
            self.resolver_state.current_depth(),
            QuotationMarkDirection::Closing,
        ) {
            self.issues
                .insert(QuotationMarkResolutionIssue::IncompatibleQuotationMark);
        }
        self.resolver_state
            .add_closing_quotation_mark(quotation_mark_match)
    }

    fn process_quote_continuer(
        &mut self,
        quotation_mark_match: &QuotationMarkStringMatch<'_>,
        style: QuoteContinuerStyle,
    ) -> QuotationMarkMetadata {
        self.continuer_state
            .add_quote_continuer(quotation_mark_match, &self.resolver_state, style)
    }

    fn pairs_with_opening_mark_at(&self, depth: usize, closing: &str) -> bool {
        self.resolver_state
            .get_opening_quotation_mark_at_depth(depth)
            .is_ok_and(|opening| self.settings.marks_are_a_valid_pair(opening, closing))
    }
}

impl<S: QuotationMarkResolutionSettings> QuotationMarkResolver for DepthBasedQuotationMarkResolver<S> {
    fn resolve_quotation_marks(
        &mut self,
        matches: &[QuotationMarkStringMatch<'_>],
    ) -> Vec<QuotationMarkMetadata> {
        let mut resolved = Vec::with_capacity(matches.len());
        for (index, quotation_mark_match) in matches.iter().enumerate() {
            if let Some(metadata) = self.resolve_quotation_mark(quotation_mark_match, matches.get(index + 1)) {
                resolved.push(metadata);
            }
        }
        if self.resolver_state.has_open_quotation_mark() || !self.suppressed_openings.is_empty() {
            self.issues
                .insert(QuotationMarkResolutionIssue::UnpairedQuotationMark);
        }
        resolved
    }

    fn issues(&self) -> &IssueSet {
        &self.issues
    }

    fn reset(&mut self) {
        self.resolver_state.reset();
        self.continuer_state.reset();
        self.issues.clear();
        self.suppressed_openings.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convention::standard_quote_convention;
    use crate::mark::QuotationMarkFinder;
    use crate::resolution::settings::UpdateResolutionSettings;
    use crate::segment::{MarkerType, SegmentArena, SegmentId, TextSegment};
    use QuotationMarkDirection::{Closing, Opening};
    use QuotationMarkResolutionIssue::*;

    fn resolver(name: &str) -> DepthBasedQuotationMarkResolver<UpdateResolutionSettings> {
        DepthBasedQuotationMarkResolver::new(UpdateResolutionSettings::new(
            standard_quote_convention(name).unwrap(),
        ))
    }

    fn resolve_segments(
        resolver: &mut DepthBasedQuotationMarkResolver<UpdateResolutionSettings>,
        arena: &SegmentArena,
        ids: &[SegmentId],
    ) -> Vec<(String, usize, QuotationMarkDirection)> {
        let finder = QuotationMarkFinder::new(resolver.settings().quote_convention_set().clone());
        let matches = finder.find_all_potential_quotation_marks_in_segments(arena, ids);
        resolver
            .resolve_quotation_marks(&matches)
            .into_iter()
            .map(|m| (m.quotation_mark().to_string(), m.depth(), m.direction()))
            .collect()
    }

    fn resolve_text(
        resolver: &mut DepthBasedQuotationMarkResolver<UpdateResolutionSettings>,
        text: &str,
    ) -> Vec<(String, usize, QuotationMarkDirection)> {
        let mut arena = SegmentArena::new();
        let id = arena.push(TextSegment::new(text));
        resolve_segments(resolver, &arena, &[id])
    }

    fn mark(text: &str, depth: usize, direction: QuotationMarkDirection) -> (String, usize, QuotationMarkDirection) {
        (text.to_string(), depth, direction)
    }

    #[test]
    fn test_well_formed_nesting() {
        let mut resolver = resolver("standard_english");
        let resolved = resolve_text(
            &mut resolver,
            "\u{201C}He said, \u{2018}Go \u{201C}now\u{201D}.\u{2019}\u{201D}",
        );
        assert_eq!(
            resolved,
            vec![
                mark("\u{201C}", 1, Opening),
                mark("\u{2018}", 2, Opening),
                mark("\u{201C}", 3, Opening),
                mark("\u{201D}", 3, Closing),
                mark("\u{2019}", 2, Closing),
                mark("\u{201D}", 1, Closing),
            ]
        );
        assert!(resolver.issues().is_empty());
    }

    #[test]
    fn test_missing_inner_closer() {
        let mut resolver = resolver("standard_english");
        let resolved = resolve_text(&mut resolver, "\u{201C}This is a \u{2018}quote\u{201D}");
        assert_eq!(
            resolved,
            vec![
                mark("\u{201C}", 1, Opening),
                mark("\u{2018}", 2, Opening),
                mark("\u{201D}", 1, Closing),
            ]
        );
        assert!(resolver.issues().contains(UnpairedQuotationMark));
        assert!(!resolver.resolver_state().has_open_quotation_mark());
    }

    #[test]
    fn test_nesting_past_the_maximum_depth() {
        let mut resolver = resolver("standard_english");
        let resolved = resolve_text(
            &mut resolver,
            "\u{201C}This \u{2018}is \u{201C}a \u{2018}quote \u{201C}nested too deeply",
        );
        let depths: Vec<usize> = resolved.iter().map(|(_, depth, _)| *depth).collect();
        assert_eq!(depths, vec![1, 2, 3, 4]);
        assert!(resolved.iter().all(|(_, _, direction)| *direction == Opening));
        assert_eq!(resolver.issues().to_vec(), vec![TooDeepNesting, UnpairedQuotationMark]);
    }

    #[test]
    fn test_closers_of_too_deep_quotations_are_dropped() {
        let mut resolver = resolver("standard_english");
        let resolved = resolve_text(
            &mut resolver,
            "\u{201C}a \u{2018}b \u{201C}c \u{2018}d \u{201C}e\u{201D} f\u{2019} g\u{201D} h\u{2019} i\u{201D}",
        );
        assert_eq!(
            resolved,
            vec![
                mark("\u{201C}", 1, Opening),
                mark("\u{2018}", 2, Opening),
                mark("\u{201C}", 3, Opening),
                mark("\u{2018}", 4, Opening),
                mark("\u{2019}", 4, Closing),
                mark("\u{201D}", 3, Closing),
                mark("\u{2019}", 2, Closing),
                mark("\u{201D}", 1, Closing),
            ]
        );
        assert_eq!(resolver.issues().to_vec(), vec![TooDeepNesting]);
        assert!(!resolver.resolver_state().has_open_quotation_mark());
    }

    #[test]
    fn test_reset_clears_too_deep_suppression() {
        let mut resolver = resolver("standard_english");
        resolve_text(
            &mut resolver,
            "\u{201C}a \u{2018}b \u{201C}c \u{2018}d \u{201C}e",
        );
        resolver.reset();
        let resolved = resolve_text(&mut resolver, "\u{201C}fresh\u{201D}");
        assert_eq!(
            resolved,
            vec![mark("\u{201C}", 1, Opening), mark("\u{201D}", 1, Closing)]
        );
        assert!(resolver.issues().is_empty());
    }

    #[test]
    fn test_unpaired_closer_emits_depth_one() {
        let mut resolver = resolver("standard_english");
        let resolved = resolve_text(&mut resolver, "no opener\u{201D} here");
        assert_eq!(resolved, vec![mark("\u{201D}", 1, Closing)]);
        assert_eq!(resolver.issues().to_vec(), vec![UnpairedQuotationMark]);
        assert_eq!(resolver.resolver_state().current_depth(), 0);
    }

    #[test]
    fn test_incompatible_opener_is_still_resolved() {
        let mut resolver = resolver("standard_english");
        let resolved = resolve_text(&mut resolver, "\u{2018}single first\u{2019}");
        assert_eq!(
            resolved,
            vec![mark("\u{2018}", 1, Opening), mark("\u{2019}", 1, Closing)]
        );
        assert!(resolver.issues().contains(IncompatibleQuotationMark));
    }

    #[test]
    fn test_malformed_opening_is_dropped() {
        let mut resolver = resolver("typewriter_english");
        let resolved = resolve_text(&mut resolver, "He said: \" Go");
        assert!(resolved.is_empty());
        assert_eq!(resolver.issues().to_vec(), vec![IncompatibleQuotationMark]);
    }

    #[test]
    fn test_apostrophes_are_dropped_silently() {
        let mut resolver = resolver("standard_english");
        let resolved = resolve_text(&mut resolver, "\u{201C}It\u{2019}s fine,\u{201D} he said.");
        assert_eq!(
            resolved,
            vec![mark("\u{201C}", 1, Opening), mark("\u{201D}", 1, Closing)]
        );
        assert!(resolver.issues().is_empty());
    }

    #[test]
    fn test_english_continuer_across_paragraphs() {
        let mut resolver = resolver("standard_english");
        let mut arena = SegmentArena::new();
        let ids = arena.push_linked([
            TextSegment::new("\u{201C}First paragraph."),
            TextSegment::builder()
                .text("\u{201C}Second paragraph.\u{201D}")
                .preceding_marker(MarkerType::Paragraph)
                .build(),
        ]);
        let resolved = resolve_segments(&mut resolver, &arena, &ids);
        assert_eq!(
            resolved,
            vec![
                mark("\u{201C}", 1, Opening),
                mark("\u{201C}", 1, Opening),
                mark("\u{201D}", 1, Closing),
            ]
        );
        assert!(resolver.issues().is_empty());
        assert_eq!(resolver.continuer_state().continuer_style(), QuoteContinuerStyle::English);
    }

    #[test]
    fn test_two_level_continuer() {
        let mut resolver = resolver("standard_english");
        let mut arena = SegmentArena::new();
        let ids = arena.push_linked([
            TextSegment::new("\u{201C}Outer \u{2018}inner."),
            TextSegment::builder()
                .text("\u{201C}\u{2018}More.\u{2019}\u{201D}")
                .preceding_marker(MarkerType::Paragraph)
                .build(),
        ]);
        let resolved = resolve_segments(&mut resolver, &arena, &ids);
        assert_eq!(
            resolved,
            vec![
                mark("\u{201C}", 1, Opening),
                mark("\u{2018}", 2, Opening),
                mark("\u{201C}", 1, Opening),
                mark("\u{2018}", 2, Opening),
                mark("\u{2019}", 2, Closing),
                mark("\u{201D}", 1, Closing),
            ]
        );
        assert!(resolver.issues().is_empty());
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut resolver = resolver("standard_english");
        resolve_text(&mut resolver, "\u{201C}Open \u{2018}and never closed");
        assert_eq!(resolver.resolver_state().current_depth(), 2);
        assert!(!resolver.issues().is_empty());

        resolver.reset();
        assert_eq!(resolver.resolver_state().current_depth(), 0);
        assert!(resolver.resolver_state().quotations().is_empty());
        assert_eq!(resolver.continuer_state().current_depth(), 0);
        assert_eq!(resolver.continuer_state().continuer_style(), QuoteContinuerStyle::Undetermined);
        assert!(resolver.issues().is_empty());
    }

    #[test]
    fn test_state_carries_across_calls() {
        let mut resolver = resolver("standard_english");
        resolve_text(&mut resolver, "\u{201C}Start");
        // Each call is a complete context, so the open quotation is reported
        assert_eq!(resolver.issues().to_vec(), vec![UnpairedQuotationMark]);
        let resolved = resolve_text(&mut resolver, "end\u{201D}.");
        assert_eq!(resolved, vec![mark("\u{201D}", 1, Closing)]);
    }
}
