//! End-to-end quote convention detection

use std::collections::BTreeSet;
use std::sync::Arc;

use quotemark_core::{
    standard_quote_conventions, Chapter, DepthBasedQuotationMarkResolver,
    DetectionResolutionSettings, Document, PreliminaryQuotationMarkAnalyzer,
    QuotationMarkDirection, QuotationMarkFinder, QuotationMarkMetadata, QuotationMarkResolver,
    QuotationMarkTabulator, QuoteConvention, QuoteConventionSet, SegmentArena,
};
use tracing::debug;

use crate::error::Result;

/// Outcome of detecting a document's quote convention
#[derive(Debug, Clone)]
pub struct QuoteConventionAnalysis {
    /// Best-scoring convention
    pub convention: Arc<QuoteConvention>,
    /// Its similarity to the tabulated marks, in `(0, 1]`
    pub similarity: f64,
    /// Every scored candidate, best first
    pub candidates: Vec<(Arc<QuoteConvention>, f64)>,
    /// Most common marks per depth, one line each
    pub summary: String,
}

impl QuoteConventionAnalysis {
    /// Name of the best-scoring convention
    pub fn convention_name(&self) -> &str {
        self.convention.name()
    }
}

/// Detects which convention of a catalog a document was written in
#[derive(Debug, Clone)]
pub struct QuoteConventionDetector {
    conventions: Arc<QuoteConventionSet>,
    preliminary_analysis: bool,
}

impl QuoteConventionDetector {
    /// Detector over a caller-supplied catalog
    pub fn new(conventions: Arc<QuoteConventionSet>) -> Self {
        Self {
            conventions,
            preliminary_analysis: false,
        }
    }

    /// Detector over the built-in catalog
    pub fn with_standard_conventions() -> Result<Self> {
        Ok(Self::new(standard_quote_conventions()?))
    }

    /// Narrow the catalog from raw mark statistics before resolving
    ///
    /// Word-position statistics need a fair amount of text, so this suits
    /// whole books better than single verses.
    pub fn with_preliminary_analysis(mut self, enabled: bool) -> Self {
        self.preliminary_analysis = enabled;
        self
    }

    /// The catalog candidates are drawn from
    pub fn quote_conventions(&self) -> &QuoteConventionSet {
        &self.conventions
    }

    /// Detect the convention of a whole document
    pub fn detect(&self, document: &Document) -> Option<QuoteConventionAnalysis> {
        self.detect_in_chapters(document.arena(), document.chapters())
    }

    /// Detect the convention of some chapters
    ///
    /// Returns `None` when no candidate scores above zero, which includes
    /// text with no quotation marks at all.
    pub fn detect_in_chapters(
        &self,
        arena: &SegmentArena,
        chapters: &[Chapter],
    ) -> Option<QuoteConventionAnalysis> {
        let resolution_set = if self.preliminary_analysis {
            self.narrow_candidates(arena, chapters)
        } else {
            Arc::clone(&self.conventions)
        };

        let mut tabulator = QuotationMarkTabulator::new();
        let mut observed = ObservedQuotationMarks::default();
        for resolved in resolve_chapters(&resolution_set, arena, chapters) {
            observed.record(&resolved);
            tabulator.tabulate(&resolved);
        }

        let candidates = observed.compatible_conventions(&resolution_set);
        let scores = candidates.score_all_quote_conventions(&tabulator);
        let (convention, similarity) = scores.first().cloned()?;
        if similarity <= 0.0 {
            debug!(
                marks = tabulator.total_quotation_mark_count(),
                "no quote convention matched"
            );
            return None;
        }

        debug!(
            convention = convention.name(),
            similarity,
            candidates = scores.len(),
            "detected quote convention"
        );
        Some(QuoteConventionAnalysis {
            convention,
            similarity,
            candidates: scores,
            summary: tabulator.summary_message(),
        })
    }

    fn narrow_candidates(&self, arena: &SegmentArena, chapters: &[Chapter]) -> Arc<QuoteConventionSet> {
        let mut analyzer = PreliminaryQuotationMarkAnalyzer::new(Arc::clone(&self.conventions));
        let narrowed = analyzer.narrow_down_possible_quote_conventions(arena, chapters);
        if narrowed.is_empty() {
            debug!("preliminary analysis ruled out every convention, resolving against the full catalog");
            return Arc::clone(&self.conventions);
        }
        debug!(remaining = narrowed.len(), "narrowed candidate conventions");
        Arc::new(narrowed)
    }
}

/// Distinct marks resolved as openers and as closers
#[derive(Debug, Default)]
struct ObservedQuotationMarks {
    opening: BTreeSet<String>,
    closing: BTreeSet<String>,
}

impl ObservedQuotationMarks {
    fn record(&mut self, resolved: &[QuotationMarkMetadata]) {
        for quotation_mark in resolved {
            let marks = match quotation_mark.direction() {
                QuotationMarkDirection::Opening => &mut self.opening,
                QuotationMarkDirection::Closing => &mut self.closing,
            };
            if !marks.contains(quotation_mark.quotation_mark()) {
                marks.insert(quotation_mark.quotation_mark().to_string());
            }
        }
    }

    /// Members of `conventions` that could produce every observed mark
    ///
    /// Falls back to all of `conventions` when none can.
    fn compatible_conventions(&self, conventions: &Arc<QuoteConventionSet>) -> Arc<QuoteConventionSet> {
        let opening: Vec<&str> = self.opening.iter().map(String::as_str).collect();
        let closing: Vec<&str> = self.closing.iter().map(String::as_str).collect();
        let compatible = conventions.filter_to_compatible_quote_conventions(&opening, &closing);
        if compatible.is_empty() {
            return Arc::clone(conventions);
        }
        Arc::new(compatible)
    }
}

/// Resolve each chapter independently over `conventions`
fn resolve_chapters(
    conventions: &Arc<QuoteConventionSet>,
    arena: &SegmentArena,
    chapters: &[Chapter],
) -> Vec<Vec<QuotationMarkMetadata>> {
    let finder = QuotationMarkFinder::new(Arc::clone(conventions));
    let mut resolver =
        DepthBasedQuotationMarkResolver::new(DetectionResolutionSettings::new(Arc::clone(conventions)));

    chapters
        .iter()
        .map(|chapter| {
            resolver.reset();
            let matches = finder.find_all_potential_quotation_marks_in_chapter(arena, chapter);
            resolver.resolve_quotation_marks(&matches)
        })
        .collect()
}
