//! Statistics over quotation marks
//!
//! - **tabulator**: counts resolved marks by depth and direction and scores conventions
//! - **preliminary**: cheap per-verse heuristics that narrow the catalog before resolution

mod preliminary;
mod tabulator;

pub use preliminary::PreliminaryQuotationMarkAnalyzer;
pub use tabulator::{QuotationMarkCounts, QuotationMarkTabulator};
