//! Configuration structures and validation
//!
//! This module defines the TOML schema for quote convention catalogs.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::quote_convention::{QuoteConvention, SingleLevelQuoteConvention};
use crate::error::{CoreError, Result};

/// Root catalog configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub conventions: Vec<ConventionConfig>,
}

/// One named convention
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConventionConfig {
    pub name: String,
    pub levels: Vec<LevelConfig>,
}

/// Marks for one nesting depth
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelConfig {
    pub opening: String,
    pub closing: String,
}

impl CatalogConfig {
    /// Parse and validate a catalog
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let config: CatalogConfig = toml::from_str(toml_str)
            .map_err(|e| CoreError::Catalog(format!("failed to parse catalog: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Check names and marks
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for convention in &self.conventions {
            if convention.name.trim().is_empty() {
                return Err(CoreError::Catalog("convention name is empty".to_string()));
            }
            if !seen.insert(convention.name.as_str()) {
                return Err(CoreError::Catalog(format!(
                    "duplicate convention name '{}'",
                    convention.name
                )));
            }
            if convention.levels.is_empty() {
                return Err(CoreError::Catalog(format!(
                    "convention '{}' has no levels",
                    convention.name
                )));
            }
            for (index, level) in convention.levels.iter().enumerate() {
                if level.opening.is_empty() || level.closing.is_empty() {
                    return Err(CoreError::Catalog(format!(
                        "convention '{}' has an empty mark at depth {}",
                        convention.name,
                        index + 1
                    )));
                }
            }
        }
        Ok(())
    }

    /// Convert into conventions, keeping file order
    pub fn into_conventions(self) -> Vec<QuoteConvention> {
        self.conventions
            .into_iter()
            .map(|convention| {
                QuoteConvention::new(
                    convention.name,
                    convention
                        .levels
                        .into_iter()
                        .map(|level| SingleLevelQuoteConvention::new(level.opening, level.closing))
                        .collect(),
                )
            })
            .collect()
    }
}
