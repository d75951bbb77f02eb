//! Data Transfer Objects for API

use quotemark_engine::{ChapterReport, Document, QuoteConvention, QuoteConventionAnalysis, SegmentId};

#[cfg(feature = "serde")]
use crate::error::Result;

/// One structural event or run of text in reading order
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Token {
    /// A chapter starts
    Chapter,
    /// A verse starts
    Verse,
    /// A paragraph starts
    Paragraph,
    /// An inline character style starts or ends
    Character,
    /// A run of verse text
    Text(String),
    /// Embedded content such as a footnote, one entry per text run
    Embed(Vec<String>),
}

/// Input token stream
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Input {
    /// Tokens in reading order
    pub tokens: Vec<Token>,
}

impl Input {
    /// Create input from tokens
    pub fn from_tokens(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    /// A single chapter holding one verse of plain text
    pub fn from_text(text: impl Into<String>) -> Self {
        Self::from_tokens(vec![Token::Chapter, Token::Verse, Token::Text(text.into())])
    }

    /// Parse a JSON token stream
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build the document plus, per token, the ids of its text segments
    pub(crate) fn to_document(&self) -> (Document, Vec<Vec<Option<SegmentId>>>) {
        let mut builder = Document::builder();
        let mut segment_ids = Vec::with_capacity(self.tokens.len());
        for token in &self.tokens {
            let ids = match token {
                Token::Chapter => {
                    builder.chapter();
                    Vec::new()
                }
                Token::Verse => {
                    builder.verse();
                    Vec::new()
                }
                Token::Paragraph => {
                    builder.paragraph();
                    Vec::new()
                }
                Token::Character => {
                    builder.character();
                    Vec::new()
                }
                Token::Text(text) => vec![builder.text(text)],
                Token::Embed(texts) => {
                    builder.start_embed();
                    let ids = texts.iter().map(|text| builder.text(text)).collect();
                    builder.end_embed();
                    ids
                }
            };
            segment_ids.push(ids);
        }
        (builder.build(), segment_ids)
    }
}

/// One level of a quote convention
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LevelDTO {
    /// Opening mark
    pub opening: String,
    /// Closing mark
    pub closing: String,
}

/// A quote convention by name and levels
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConventionDTO {
    /// Convention name
    pub name: String,
    /// Marks per depth, outermost first
    pub levels: Vec<LevelDTO>,
}

impl From<&QuoteConvention> for ConventionDTO {
    fn from(convention: &QuoteConvention) -> Self {
        Self {
            name: convention.name().to_string(),
            levels: convention
                .levels()
                .iter()
                .map(|level| LevelDTO {
                    opening: level.opening().to_string(),
                    closing: level.closing().to_string(),
                })
                .collect(),
        }
    }
}

/// A scored candidate convention
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CandidateDTO {
    /// Convention name
    pub name: String,
    /// Similarity in `[0, 1]`
    pub similarity: f64,
}

/// Detection result
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DetectionOutput {
    /// Best-matching convention
    pub convention: ConventionDTO,
    /// Its similarity in `(0, 1]`
    pub similarity: f64,
    /// Every scored candidate, best first
    pub candidates: Vec<CandidateDTO>,
    /// Most common marks per depth
    pub summary: String,
}

impl From<QuoteConventionAnalysis> for DetectionOutput {
    fn from(analysis: QuoteConventionAnalysis) -> Self {
        Self {
            convention: ConventionDTO::from(analysis.convention.as_ref()),
            similarity: analysis.similarity,
            candidates: analysis
                .candidates
                .iter()
                .map(|(convention, similarity)| CandidateDTO {
                    name: convention.name().to_string(),
                    similarity: *similarity,
                })
                .collect(),
            summary: analysis.summary,
        }
    }
}

#[cfg(feature = "serde")]
impl DetectionOutput {
    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// What happened to one chapter
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChapterReportDTO {
    /// Chapter position
    pub index: usize,
    /// Strategy applied
    pub strategy: String,
    /// Issues recorded during resolution
    pub issues: Vec<String>,
    /// Number of resolved quotation marks
    pub quotation_marks: usize,
}

impl From<&ChapterReport> for ChapterReportDTO {
    fn from(report: &ChapterReport) -> Self {
        Self {
            index: report.index,
            strategy: report.strategy.to_string(),
            issues: report.issues.iter().map(|issue| issue.to_string()).collect(),
            quotation_marks: report.quotation_marks,
        }
    }
}

/// Conversion result
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConversionOutput {
    /// Converted tokens in input order
    pub tokens: Vec<Token>,
    /// Source convention the text was read as
    pub source: String,
    /// Target convention
    pub target: String,
    /// One report per chapter
    pub chapters: Vec<ChapterReportDTO>,
}

#[cfg(feature = "serde")]
impl ConversionOutput {
    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
