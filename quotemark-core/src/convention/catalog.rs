//! Built-in convention catalog
//!
//! The standard conventions are embedded at compile time and parsed once.

use std::sync::{Arc, OnceLock};

use super::config::CatalogConfig;
use super::quote_convention::QuoteConvention;
use super::set::QuoteConventionSet;
use crate::error::{CoreError, Result};

/// Embedded standard conventions
static STANDARD: OnceLock<Result<Arc<QuoteConventionSet>>> = OnceLock::new();

/// The built-in catalog of standard conventions
pub fn standard_quote_conventions() -> Result<Arc<QuoteConventionSet>> {
    STANDARD
        .get_or_init(|| {
            load_embedded_catalog(include_str!("../../configs/conventions.toml")).map_err(|e| {
                tracing::error!("failed to load the standard quote conventions: {e}");
                e
            })
        })
        .clone()
}

/// Look up one built-in convention by name
pub fn standard_quote_convention(name: &str) -> Result<Arc<QuoteConvention>> {
    standard_quote_conventions()?
        .quote_convention_by_name(name)
        .cloned()
        .ok_or_else(|| CoreError::UnknownConvention {
            name: name.to_string(),
        })
}

fn load_embedded_catalog(toml_str: &str) -> Result<Arc<QuoteConventionSet>> {
    let config = CatalogConfig::from_toml_str(toml_str)?;
    let set = QuoteConventionSet::new(config.into_conventions());
    tracing::debug!(conventions = set.len(), "loaded standard quote conventions");
    Ok(Arc::new(set))
}
