//! Speculative first pass choosing a strategy per chapter
//!
//! Each chapter is resolved on its own with a fresh resolver, so with the
//! `parallel` feature chapters are checked concurrently.

use std::sync::Arc;

use quotemark_core::{
    Chapter, DepthBasedQuotationMarkResolver, IssueSet, QuotationMarkFinder, QuoteConvention,
    QuoteConventionSet, SegmentArena, UpdateResolutionSettings,
};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::debug;

use crate::config::UpdateStrategy;
use crate::updater::resolve_chapter;

/// First-pass verdict for one chapter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterAnalysis {
    /// Strategy the second pass should apply
    pub strategy: UpdateStrategy,
    /// Issues the full resolver recorded
    pub issues: IssueSet,
}

/// Pick `ApplyFull` for chapters that resolve without issues and `ApplyFallback` otherwise
pub fn find_best_chapter_strategies(
    arena: &SegmentArena,
    chapters: &[Chapter],
    source: &Arc<QuoteConvention>,
) -> Vec<UpdateStrategy> {
    analyze_chapters(arena, chapters, source)
        .into_iter()
        .map(|analysis| analysis.strategy)
        .collect()
}

/// Resolve every chapter speculatively and keep its strategy and issues
pub fn analyze_chapters(
    arena: &SegmentArena,
    chapters: &[Chapter],
    source: &Arc<QuoteConvention>,
) -> Vec<ChapterAnalysis> {
    let finder = QuotationMarkFinder::new(Arc::new(QuoteConventionSet::from_shared(vec![
        Arc::clone(source),
    ])));
    let check = |(index, chapter): (usize, &Chapter)| {
        let issues = chapter_issues(&finder, arena, chapter, source);
        let strategy = choose_strategy(&issues);
        debug!(
            chapter = index,
            strategy = %strategy,
            issues = issues.len(),
            "chose chapter strategy"
        );
        ChapterAnalysis { strategy, issues }
    };

    #[cfg(feature = "parallel")]
    {
        chapters.par_iter().enumerate().map(check).collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        chapters.iter().enumerate().map(check).collect()
    }
}

/// Issues the full resolver records for one chapter, embeds included
pub fn chapter_issues(
    finder: &QuotationMarkFinder,
    arena: &SegmentArena,
    chapter: &Chapter,
    source: &Arc<QuoteConvention>,
) -> IssueSet {
    let mut resolver =
        DepthBasedQuotationMarkResolver::new(UpdateResolutionSettings::new(Arc::clone(source)));
    let (_, issues) = resolve_chapter(finder, &mut resolver, arena, chapter);
    issues
}

/// Strategy for a chapter given the issues its full resolution produced
pub fn choose_strategy(issues: &IssueSet) -> UpdateStrategy {
    if issues.is_empty() {
        UpdateStrategy::ApplyFull
    } else {
        UpdateStrategy::ApplyFallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quotemark_core::{standard_quote_convention, Document, QuotationMarkResolutionIssue};

    fn two_chapters(first: &str, second: &str) -> Document {
        let mut builder = Document::builder();
        builder.chapter().verse();
        builder.text(first);
        builder.chapter().verse();
        builder.text(second);
        builder.build()
    }

    #[test]
    fn test_well_formed_chapter_gets_full_strategy() {
        let source = standard_quote_convention("standard_english").unwrap();
        let document = two_chapters("He said, “Go ‘now’ please.”", "No quotes here.");
        let strategies = find_best_chapter_strategies(document.arena(), document.chapters(), &source);
        assert_eq!(strategies, vec![UpdateStrategy::ApplyFull, UpdateStrategy::ApplyFull]);
    }

    #[test]
    fn test_unpaired_chapter_gets_fallback_strategy() {
        let source = standard_quote_convention("standard_english").unwrap();
        let document = two_chapters("He said, “Go now.", "He said, “Go now.”");
        let strategies = find_best_chapter_strategies(document.arena(), document.chapters(), &source);
        assert_eq!(
            strategies,
            vec![UpdateStrategy::ApplyFallback, UpdateStrategy::ApplyFull]
        );
    }

    #[test]
    fn test_chapter_issues_reports_unpaired() {
        let source = standard_quote_convention("standard_english").unwrap();
        let document = two_chapters("He said, “Go now.", "");
        let finder = QuotationMarkFinder::new(Arc::new(QuoteConventionSet::from_shared(vec![
            Arc::clone(&source),
        ])));
        let issues = chapter_issues(&finder, document.arena(), &document.chapters()[0], &source);
        assert!(issues.contains(QuotationMarkResolutionIssue::UnpairedQuotationMark));
    }

    #[test]
    fn test_unpaired_embed_gets_fallback_strategy() {
        let source = standard_quote_convention("standard_english").unwrap();
        let mut builder = Document::builder();
        builder.chapter().verse();
        builder.text("He said, “Go.”");
        builder.start_embed();
        builder.text("A “note ‘here”");
        builder.end_embed();
        let document = builder.build();

        let analyses = analyze_chapters(document.arena(), document.chapters(), &source);
        assert_eq!(analyses[0].strategy, UpdateStrategy::ApplyFallback);
        assert!(analyses[0]
            .issues
            .contains(QuotationMarkResolutionIssue::UnpairedQuotationMark));
    }

    #[test]
    fn test_empty_chapter_keeps_strategy_alignment() {
        let source = standard_quote_convention("standard_english").unwrap();
        let mut builder = Document::builder();
        builder.chapter();
        builder.chapter().verse();
        builder.text("He said, “Go now.");
        let document = builder.build();
        let strategies = find_best_chapter_strategies(document.arena(), document.chapters(), &source);
        assert_eq!(
            strategies,
            vec![UpdateStrategy::ApplyFull, UpdateStrategy::ApplyFallback]
        );
    }

    #[test]
    fn test_no_chapters_no_strategies() {
        let source = standard_quote_convention("standard_english").unwrap();
        let document = Document::default();
        assert!(find_best_chapter_strategies(document.arena(), document.chapters(), &source).is_empty());
    }
}
