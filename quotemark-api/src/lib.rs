//! Public API for quotation-mark convention detection and conversion
//!
//! This crate provides a stable interface over token streams and hides
//! the segment arena and resolver types of the lower layers.

#![warn(missing_docs)]

pub mod config;
pub mod dto;
pub mod error;

use error::Result;
use quotemark_engine::{standard_quote_conventions, QuoteConventionDetector, SegmentId};

// Re-export key types
pub use config::{Config, ConfigBuilder};
pub use dto::{
    CandidateDTO, ChapterReportDTO, ConventionDTO, ConversionOutput, DetectionOutput, Input,
    LevelDTO, Token,
};
pub use error::ApiError;
pub use quotemark_engine::UpdateStrategy;

/// Main entry point for detection and conversion
#[derive(Debug, Clone, Default)]
pub struct QuoteConventionProcessor {
    config: Config,
}

impl QuoteConventionProcessor {
    /// Create a processor with custom configuration
    pub fn with_config(config: Config) -> Self {
        Self { config }
    }

    /// Get the current configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Detect the quote convention of the input
    ///
    /// `None` means no convention matched, for instance because the text
    /// holds no quotation marks.
    pub fn detect(&self, input: &Input) -> Result<Option<DetectionOutput>> {
        let (document, _) = input.to_document();
        let detector = QuoteConventionDetector::with_standard_conventions()
            .map_err(|e| ApiError::Engine(e.to_string()))?
            .with_preliminary_analysis(self.config.preliminary_analysis);
        Ok(detector.detect(&document).map(DetectionOutput::from))
    }

    /// Convert the input's quotation marks to the target convention
    ///
    /// Without a configured source, the source is detected first.
    pub fn convert(&self, input: &Input) -> Result<ConversionOutput> {
        let (mut document, segment_ids) = input.to_document();

        let mut builder = self.config.updater_builder();
        if self.config.source.is_none() && !self.config.normalized_source {
            let detector = QuoteConventionDetector::with_standard_conventions()
                .map_err(|e| ApiError::Engine(e.to_string()))?
                .with_preliminary_analysis(self.config.preliminary_analysis);
            let analysis = detector.detect(&document).ok_or_else(|| {
                ApiError::Config(
                    "source quote convention could not be detected; set one explicitly".to_string(),
                )
            })?;
            builder = builder.source_convention(analysis.convention);
        }
        let updater = builder
            .build()
            .map_err(|e| ApiError::Engine(e.to_string()))?;

        let reports = updater
            .update_document(&mut document)
            .map_err(|e| ApiError::Engine(e.to_string()))?;

        let text_of = |id: &Option<SegmentId>| {
            (*id)
                .map(|id| document.text(id).to_string())
                .unwrap_or_default()
        };
        let tokens = input
            .tokens
            .iter()
            .zip(&segment_ids)
            .map(|(token, ids)| match token {
                Token::Text(_) => Token::Text(ids.first().map(&text_of).unwrap_or_default()),
                Token::Embed(_) => Token::Embed(ids.iter().map(&text_of).collect()),
                other => other.clone(),
            })
            .collect();

        Ok(ConversionOutput {
            tokens,
            source: updater.source_convention().name().to_string(),
            target: updater.target_convention().name().to_string(),
            chapters: reports.iter().map(ChapterReportDTO::from).collect(),
        })
    }
}

// Convenience functions

/// Detect the quote convention of the input against the built-in catalog
pub fn detect_quote_convention(input: &Input) -> Result<Option<DetectionOutput>> {
    QuoteConventionProcessor::default().detect(input)
}

/// Convert the input from `source` (detected when `None`) to `target`
pub fn convert_quote_convention(
    input: &Input,
    source: Option<&str>,
    target: &str,
) -> Result<ConversionOutput> {
    let mut builder = Config::builder().target(target);
    if let Some(source) = source {
        builder = builder.source(source);
    }
    QuoteConventionProcessor::with_config(builder.build()?).convert(input)
}

/// Names of the built-in conventions, sorted
pub fn standard_convention_names() -> Result<Vec<String>> {
    let catalog = standard_quote_conventions().map_err(|e| ApiError::Engine(e.to_string()))?;
    Ok(catalog
        .all_quote_convention_names()
        .into_iter()
        .map(str::to_string)
        .collect())
}
