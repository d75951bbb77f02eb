//! Quote convention catalog
//!
//! Immutable descriptions of named quotation-mark conventions and the
//! aggregate [`QuoteConventionSet`] used to query many of them at once.

pub mod catalog;
pub mod config;
mod quote_convention;
mod set;

pub use catalog::{standard_quote_convention, standard_quote_conventions};
pub use quote_convention::{QuotationMarkDirection, QuoteConvention, SingleLevelQuoteConvention};
pub use set::QuoteConventionSet;
