//! Candidate quotation marks and their resolved form

mod finder;
mod metadata;
mod string_match;

pub use finder::QuotationMarkFinder;
pub use metadata::QuotationMarkMetadata;
pub use string_match::QuotationMarkStringMatch;
