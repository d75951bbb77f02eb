//! Quotation-mark conversion between conventions
//!
//! Verse text of a chapter is one resolution context; each embed inside it
//! is another, resolved from a clean state. Resolver state never crosses a
//! chapter boundary.

use std::collections::HashMap;
use std::sync::Arc;

use quotemark_core::{
    standard_quote_conventions, Chapter, CoreError, DepthBasedQuotationMarkResolver, Document,
    FallbackQuotationMarkResolver, IssueSet, QuotationMarkFinder, QuotationMarkMetadata,
    QuotationMarkResolver, QuoteConvention, QuoteConventionSet, SegmentArena, SegmentId,
    UpdateResolutionSettings,
};
use tracing::debug;

use crate::config::{UpdateSettings, UpdateStrategy};
use crate::error::{EngineError, Result};
use crate::first_pass::analyze_chapters;

/// What happened to one chapter during an update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterReport {
    /// Chapter position in the document
    pub index: usize,
    /// Strategy applied
    pub strategy: UpdateStrategy,
    /// Issues recorded while resolving the chapter
    pub issues: IssueSet,
    /// Number of resolved quotation marks
    pub quotation_marks: usize,
}

/// Rewrites quotation marks from a source convention to a target convention
#[derive(Debug, Clone)]
pub struct QuotationMarkUpdater {
    source: Arc<QuoteConvention>,
    target: Arc<QuoteConvention>,
    settings: UpdateSettings,
    finder: QuotationMarkFinder,
}

impl QuotationMarkUpdater {
    /// Updater with explicit conventions and settings
    pub fn new(
        source: Arc<QuoteConvention>,
        target: Arc<QuoteConvention>,
        settings: UpdateSettings,
    ) -> Self {
        let finder = QuotationMarkFinder::new(Arc::new(QuoteConventionSet::from_shared(vec![
            Arc::clone(&source),
        ])));
        Self {
            source,
            target,
            settings,
            finder,
        }
    }

    /// Start configuring an updater
    pub fn builder() -> QuotationMarkUpdaterBuilder {
        QuotationMarkUpdaterBuilder::new()
    }

    /// Convention the text is read as
    pub fn source_convention(&self) -> &Arc<QuoteConvention> {
        &self.source
    }

    /// Convention the text is rewritten to
    pub fn target_convention(&self) -> &Arc<QuoteConvention> {
        &self.target
    }

    /// Configured strategies
    pub fn settings(&self) -> &UpdateSettings {
        &self.settings
    }

    /// Rewrite a whole document in place
    ///
    /// Without configured chapter strategies, a first pass picks one per
    /// chapter and its issues are included in the reports.
    pub fn update_document(&self, document: &mut Document) -> Result<Vec<ChapterReport>> {
        let (arena, chapters) = document.parts_mut();
        self.update_chapters(arena, chapters)
    }

    /// Rewrite the given chapters in place
    pub fn update_chapters(
        &self,
        arena: &mut SegmentArena,
        chapters: &[Chapter],
    ) -> Result<Vec<ChapterReport>> {
        let (settings, first_pass_issues) = if self.settings.has_chapter_strategies() {
            (self.settings.clone(), Vec::new())
        } else {
            let analyses = analyze_chapters(arena, chapters, &self.source);
            let settings = UpdateSettings {
                chapter_strategies: analyses.iter().map(|analysis| analysis.strategy).collect(),
                default_strategy: self.settings.default_strategy,
            };
            let issues: Vec<IssueSet> = analyses.into_iter().map(|analysis| analysis.issues).collect();
            (settings, issues)
        };

        chapters
            .iter()
            .enumerate()
            .map(|(index, chapter)| {
                let strategy = settings.strategy_for_chapter(index);
                let mut report = self.update_chapter(arena, chapter, index, strategy)?;
                if let Some(issues) = first_pass_issues.get(index) {
                    report.issues.extend_from(issues);
                }
                Ok(report)
            })
            .collect()
    }

    /// Rewrite one chapter with a fixed strategy
    pub fn update_chapter(
        &self,
        arena: &mut SegmentArena,
        chapter: &Chapter,
        index: usize,
        strategy: UpdateStrategy,
    ) -> Result<ChapterReport> {
        let (mut metadata, issues) = match strategy {
            UpdateStrategy::Skip => (Vec::new(), IssueSet::new()),
            UpdateStrategy::ApplyFull => {
                let mut resolver = DepthBasedQuotationMarkResolver::new(self.resolution_settings());
                resolve_chapter(&self.finder, &mut resolver, arena, chapter)
            }
            UpdateStrategy::ApplyFallback => {
                let mut resolver = FallbackQuotationMarkResolver::new(self.resolution_settings());
                resolve_chapter(&self.finder, &mut resolver, arena, chapter)
            }
        };

        update_quotation_marks(arena, &mut metadata, &self.target)?;
        debug!(
            chapter = index,
            strategy = %strategy,
            marks = metadata.len(),
            issues = issues.len(),
            "updated chapter"
        );
        Ok(ChapterReport {
            index,
            strategy,
            issues,
            quotation_marks: metadata.len(),
        })
    }

    fn resolution_settings(&self) -> UpdateResolutionSettings {
        UpdateResolutionSettings::new(Arc::clone(&self.source))
    }
}

/// Resolve a chapter's verse text, then each embed from a clean resolver
///
/// The resolver is left reset.
pub(crate) fn resolve_chapter<R: QuotationMarkResolver>(
    finder: &QuotationMarkFinder,
    resolver: &mut R,
    arena: &SegmentArena,
    chapter: &Chapter,
) -> (Vec<QuotationMarkMetadata>, IssueSet) {
    let mut issues = IssueSet::new();

    resolver.reset();
    let matches = finder.find_all_potential_quotation_marks_in_chapter(arena, chapter);
    let mut metadata = resolver.resolve_quotation_marks(&matches);
    issues.extend_from(resolver.issues());

    for embed in chapter.verses().iter().flat_map(|verse| verse.embeds()) {
        resolver.reset();
        let matches = finder.find_all_potential_quotation_marks_in_segments(arena, embed.segments());
        metadata.extend(resolver.resolve_quotation_marks(&matches));
        issues.extend_from(resolver.issues());
    }
    resolver.reset();

    (metadata, issues)
}

/// Substitute every resolved mark with `target`'s mark for its depth and direction
///
/// `metadata` must be in reading order within each segment. A single forward
/// pass keeps a running length delta per segment and shifts each later mark
/// of that segment by it before rewriting.
pub fn update_quotation_marks(
    arena: &mut SegmentArena,
    metadata: &mut [QuotationMarkMetadata],
    target: &QuoteConvention,
) -> Result<()> {
    let mut deltas: HashMap<SegmentId, isize> = HashMap::new();
    for quotation_mark in metadata.iter_mut() {
        let delta = deltas.entry(quotation_mark.segment()).or_insert(0);
        if *delta != 0 {
            quotation_mark.shift_indices(*delta);
        }
        *delta += quotation_mark.update_quotation_mark(arena, target)?;
    }
    Ok(())
}

#[derive(Debug, Clone)]
enum ConventionChoice {
    Named(String),
    Given(Arc<QuoteConvention>),
}

impl ConventionChoice {
    fn resolve(self, catalog: &QuoteConventionSet) -> Result<Arc<QuoteConvention>> {
        match self {
            ConventionChoice::Given(convention) => Ok(convention),
            ConventionChoice::Named(name) => catalog
                .quote_convention_by_name(&name)
                .cloned()
                .ok_or_else(|| EngineError::Core(CoreError::UnknownConvention { name })),
        }
    }
}

/// Fluent configuration for [`QuotationMarkUpdater`]
///
/// Convention names are looked up in the built-in catalog unless another
/// catalog is supplied.
#[derive(Debug, Clone, Default)]
pub struct QuotationMarkUpdaterBuilder {
    catalog: Option<Arc<QuoteConventionSet>>,
    source: Option<ConventionChoice>,
    target: Option<ConventionChoice>,
    normalize_source: bool,
    settings: UpdateSettings,
}

impl QuotationMarkUpdaterBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog used to look up convention names
    pub fn catalog(mut self, catalog: Arc<QuoteConventionSet>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Source convention by catalog name
    pub fn source<S: Into<String>>(mut self, name: S) -> Self {
        self.source = Some(ConventionChoice::Named(name.into()));
        self
    }

    /// Source convention given directly
    pub fn source_convention(mut self, convention: Arc<QuoteConvention>) -> Self {
        self.source = Some(ConventionChoice::Given(convention));
        self
    }

    /// Target convention by catalog name
    pub fn target<S: Into<String>>(mut self, name: S) -> Self {
        self.target = Some(ConventionChoice::Named(name.into()));
        self
    }

    /// Target convention given directly
    pub fn target_convention(mut self, convention: Arc<QuoteConvention>) -> Self {
        self.target = Some(ConventionChoice::Given(convention));
        self
    }

    /// Read the text as the typewriter-normalized form of the source
    ///
    /// Without an explicit source, the target is normalized instead, which
    /// turns straight quotes into the target's typographic marks.
    pub fn normalized_source(mut self) -> Self {
        self.normalize_source = true;
        self
    }

    /// Per-chapter strategies; leaving these empty runs the first pass
    pub fn chapter_strategies(mut self, strategies: Vec<UpdateStrategy>) -> Self {
        self.settings.chapter_strategies = strategies;
        self
    }

    /// Strategy for chapters without a configured one
    pub fn default_strategy(mut self, strategy: UpdateStrategy) -> Self {
        self.settings.default_strategy = strategy;
        self
    }

    /// Build the updater
    pub fn build(self) -> Result<QuotationMarkUpdater> {
        let catalog = match self.catalog {
            Some(catalog) => catalog,
            None => standard_quote_conventions()?,
        };

        let target = self
            .target
            .ok_or_else(|| EngineError::Config("a target convention is required".to_string()))?
            .resolve(&catalog)?;

        let source = match self.source {
            Some(choice) => choice.resolve(&catalog)?,
            None if self.normalize_source => Arc::clone(&target),
            None => {
                return Err(EngineError::Config(
                    "a source convention is required".to_string(),
                ))
            }
        };
        let source = if self.normalize_source {
            Arc::new(source.normalize())
        } else {
            source
        };

        Ok(QuotationMarkUpdater::new(source, target, self.settings))
    }
}
