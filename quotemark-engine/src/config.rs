//! Configuration types for the engine

use std::fmt;

use tracing::warn;

/// How one chapter's quotation marks are rewritten
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum UpdateStrategy {
    /// Resolve nesting depth and substitute the target mark at the same depth
    #[default]
    ApplyFull,
    /// Ignore nesting and substitute the target's depth-1 marks
    ApplyFallback,
    /// Leave the chapter untouched
    Skip,
}

impl fmt::Display for UpdateStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UpdateStrategy::ApplyFull => "apply_full",
            UpdateStrategy::ApplyFallback => "apply_fallback",
            UpdateStrategy::Skip => "skip",
        };
        f.write_str(name)
    }
}

/// Per-chapter strategies for one conversion run
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UpdateSettings {
    /// Strategy for each chapter, by chapter index
    pub chapter_strategies: Vec<UpdateStrategy>,
    /// Used for chapters past the end of `chapter_strategies`
    pub default_strategy: UpdateStrategy,
}

impl UpdateSettings {
    /// Explicit strategies with the default fallback
    pub fn new(chapter_strategies: Vec<UpdateStrategy>) -> Self {
        Self {
            chapter_strategies,
            default_strategy: UpdateStrategy::default(),
        }
    }

    /// Whether any per-chapter strategy has been configured
    pub fn has_chapter_strategies(&self) -> bool {
        !self.chapter_strategies.is_empty()
    }

    /// Strategy for the chapter at `index`
    pub fn strategy_for_chapter(&self, index: usize) -> UpdateStrategy {
        match self.chapter_strategies.get(index) {
            Some(&strategy) => strategy,
            None => {
                if self.has_chapter_strategies() {
                    warn!(
                        chapter = index,
                        configured = self.chapter_strategies.len(),
                        default = %self.default_strategy,
                        "no strategy for chapter, using default"
                    );
                }
                self.default_strategy
            }
        }
    }
}
