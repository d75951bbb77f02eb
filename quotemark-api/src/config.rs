//! High-level configuration API

use crate::error::{ApiError, Result};
use quotemark_engine::{standard_quote_conventions, QuotationMarkUpdaterBuilder, UpdateStrategy};

/// High-level configuration for quotation-mark conversion
#[derive(Debug, Clone)]
pub struct Config {
    pub(crate) source: Option<String>,
    pub(crate) target: String,
    pub(crate) normalized_source: bool,
    pub(crate) chapter_strategies: Vec<UpdateStrategy>,
    pub(crate) default_strategy: UpdateStrategy,
    pub(crate) preliminary_analysis: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: None,
            target: "standard_english".to_string(),
            normalized_source: false,
            chapter_strategies: Vec::new(),
            default_strategy: UpdateStrategy::ApplyFull,
            preliminary_analysis: false,
        }
    }
}

impl Config {
    /// Convert to `target`, detecting the source convention
    pub fn to_convention(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            ..Self::default()
        }
    }

    /// Turn straight quotes into `target`'s typographic marks
    pub fn denormalize(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            normalized_source: true,
            ..Self::default()
        }
    }

    /// Create a builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Explicit source convention name, if any
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Target convention name
    pub fn target(&self) -> &str {
        &self.target
    }

    pub(crate) fn updater_builder(&self) -> QuotationMarkUpdaterBuilder {
        let mut builder = QuotationMarkUpdaterBuilder::new()
            .target(self.target.clone())
            .chapter_strategies(self.chapter_strategies.clone())
            .default_strategy(self.default_strategy);
        if let Some(source) = &self.source {
            builder = builder.source(source.clone());
        }
        if self.normalized_source {
            builder = builder.normalized_source();
        }
        builder
    }
}

/// Configuration builder
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the source convention; without one it is detected
    pub fn source(mut self, name: impl Into<String>) -> Self {
        self.config.source = Some(name.into());
        self
    }

    /// Set the target convention
    pub fn target(mut self, name: impl Into<String>) -> Self {
        self.config.target = name.into();
        self
    }

    /// Read the source as its typewriter-normalized form
    pub fn normalized_source(mut self) -> Self {
        self.config.normalized_source = true;
        self
    }

    /// Set one strategy per chapter; leaving this empty picks them automatically
    pub fn chapter_strategies(mut self, strategies: Vec<UpdateStrategy>) -> Self {
        self.config.chapter_strategies = strategies;
        self
    }

    /// Set the strategy for chapters past the configured list
    pub fn default_strategy(mut self, strategy: UpdateStrategy) -> Self {
        self.config.default_strategy = strategy;
        self
    }

    /// Narrow candidate conventions from raw mark statistics during detection
    pub fn preliminary_analysis(mut self, enabled: bool) -> Self {
        self.config.preliminary_analysis = enabled;
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<Config> {
        let catalog = standard_quote_conventions().map_err(|e| ApiError::Engine(e.to_string()))?;
        let names = self.config.source.iter().chain(std::iter::once(&self.config.target));
        for name in names {
            if catalog.quote_convention_by_name(name).is_none() {
                return Err(ApiError::Config(format!("unknown quote convention '{name}'")));
            }
        }
        Ok(self.config)
    }
}
