use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use regex::Regex;

use super::config::CatalogConfig;
use super::quote_convention::{QuotationMarkDirection, QuoteConvention};
use crate::analysis::QuotationMarkTabulator;
use crate::error::Result;

/// Read-only aggregate over zero or more quote conventions
///
/// All derived indexes are computed once in the constructor and depend only
/// on the input conventions and their order.
#[derive(Debug, Clone)]
pub struct QuoteConventionSet {
    conventions: Vec<Arc<QuoteConvention>>,
    opening_mark_regex: Option<Regex>,
    closing_mark_regex: Option<Regex>,
    all_mark_regex: Option<Regex>,
    closing_marks_by_opening_mark: BTreeMap<String, BTreeSet<String>>,
    opening_marks_by_closing_mark: BTreeMap<String, BTreeSet<String>>,
    ambiguous_marks: BTreeSet<String>,
}

impl QuoteConventionSet {
    /// Build a set that owns the given conventions
    pub fn new(conventions: Vec<QuoteConvention>) -> Self {
        Self::from_shared(conventions.into_iter().map(Arc::new).collect())
    }

    /// Build a set over conventions shared with other sets
    pub fn from_shared(conventions: Vec<Arc<QuoteConvention>>) -> Self {
        let mut opening_marks = BTreeSet::new();
        let mut closing_marks = BTreeSet::new();
        let mut closing_marks_by_opening_mark: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        let mut opening_marks_by_closing_mark: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        let mut ambiguous_marks = BTreeSet::new();

        for convention in &conventions {
            for level in convention.levels() {
                opening_marks.insert(level.opening().to_string());
                closing_marks.insert(level.closing().to_string());
                closing_marks_by_opening_mark
                    .entry(level.opening().to_string())
                    .or_default()
                    .insert(level.closing().to_string());
                opening_marks_by_closing_mark
                    .entry(level.closing().to_string())
                    .or_default()
                    .insert(level.opening().to_string());
            }

            // Only dual use within one convention makes a mark ambiguous
            for level in convention.levels() {
                if convention.includes_closing_mark(level.opening()) {
                    ambiguous_marks.insert(level.opening().to_string());
                }
            }
        }

        let all_marks: BTreeSet<String> = opening_marks.union(&closing_marks).cloned().collect();

        Self {
            opening_mark_regex: character_class(&opening_marks),
            closing_mark_regex: character_class(&closing_marks),
            all_mark_regex: character_class(&all_marks),
            conventions,
            closing_marks_by_opening_mark,
            opening_marks_by_closing_mark,
            ambiguous_marks,
        }
    }

    /// Parse a catalog from TOML (see `configs/conventions.toml` for the schema)
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let config = CatalogConfig::from_toml_str(toml_str)?;
        Ok(Self::new(config.into_conventions()))
    }

    /// Member conventions in insertion order
    pub fn conventions(&self) -> &[Arc<QuoteConvention>] {
        &self.conventions
    }

    /// Number of member conventions
    pub fn len(&self) -> usize {
        self.conventions.len()
    }

    /// Whether the set has no conventions
    pub fn is_empty(&self) -> bool {
        self.conventions.is_empty()
    }

    /// Character class matching any character of any opening mark
    pub fn opening_quotation_mark_regex(&self) -> Option<&Regex> {
        self.opening_mark_regex.as_ref()
    }

    /// Character class matching any character of any closing mark
    pub fn closing_quotation_mark_regex(&self) -> Option<&Regex> {
        self.closing_mark_regex.as_ref()
    }

    /// Character class matching any character of any mark
    pub fn all_quotation_mark_regex(&self) -> Option<&Regex> {
        self.all_mark_regex.as_ref()
    }

    /// First convention with this name
    pub fn quote_convention_by_name(&self, name: &str) -> Option<&Arc<QuoteConvention>> {
        self.conventions.iter().find(|c| c.name() == name)
    }

    /// All convention names, sorted
    pub fn all_quote_convention_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.conventions.iter().map(|c| c.name()).collect();
        names.sort_unstable();
        names
    }

    /// Every opening mark used by any member, sorted
    pub fn possible_opening_quotation_marks(&self) -> Vec<&str> {
        self.closing_marks_by_opening_mark
            .keys()
            .map(String::as_str)
            .collect()
    }

    /// Every closing mark used by any member, sorted
    pub fn possible_closing_quotation_marks(&self) -> Vec<&str> {
        self.opening_marks_by_closing_mark
            .keys()
            .map(String::as_str)
            .collect()
    }

    /// Whether `mark` opens a quotation in some member
    pub fn is_valid_opening_quotation_mark(&self, mark: &str) -> bool {
        self.closing_marks_by_opening_mark.contains_key(mark)
    }

    /// Whether `mark` closes a quotation in some member
    pub fn is_valid_closing_quotation_mark(&self, mark: &str) -> bool {
        self.opening_marks_by_closing_mark.contains_key(mark)
    }

    /// Whether some member pairs `opening` with `closing` at one level
    pub fn marks_are_a_valid_pair(&self, opening: &str, closing: &str) -> bool {
        self.closing_marks_by_opening_mark
            .get(opening)
            .is_some_and(|closers| closers.contains(closing))
    }

    /// Whether some single member uses `mark` both to open and to close
    pub fn is_quotation_mark_direction_ambiguous(&self, mark: &str) -> bool {
        self.ambiguous_marks.contains(mark)
    }

    /// Marks that can pair with `mark` in either direction
    pub fn possible_paired_quotation_marks(&self, mark: &str) -> BTreeSet<&str> {
        let closers = self.closing_marks_by_opening_mark.get(mark).into_iter();
        let openers = self.opening_marks_by_closing_mark.get(mark).into_iter();
        closers
            .chain(openers)
            .flatten()
            .map(String::as_str)
            .collect()
    }

    /// Union of the depths at which any member uses `mark` in `direction`
    pub fn possible_depths(&self, mark: &str, direction: QuotationMarkDirection) -> BTreeSet<usize> {
        self.conventions
            .iter()
            .flat_map(|c| c.possible_depths(mark, direction))
            .collect()
    }

    /// Whether some member prescribes exactly `mark` at `depth` for `direction`
    pub fn metadata_matches_quotation_mark(
        &self,
        mark: &str,
        depth: usize,
        direction: QuotationMarkDirection,
    ) -> bool {
        self.conventions
            .iter()
            .any(|c| c.expected_quotation_mark(depth, direction) == Some(mark))
    }

    /// New set containing only the members compatible with the observed marks
    pub fn filter_to_compatible_quote_conventions<S: AsRef<str>>(
        &self,
        opening_marks: &[S],
        closing_marks: &[S],
    ) -> QuoteConventionSet {
        Self::from_shared(
            self.conventions
                .iter()
                .filter(|c| c.is_compatible_with_observed_quotation_marks(opening_marks, closing_marks))
                .cloned()
                .collect(),
        )
    }

    /// Best-scoring member for the tabulated marks
    ///
    /// Ties go to the earlier member. An empty set yields `(None, f64::MIN)`.
    pub fn find_most_similar_convention(
        &self,
        tabulator: &QuotationMarkTabulator,
    ) -> (Option<Arc<QuoteConvention>>, f64) {
        let mut best_similarity = f64::MIN;
        let mut best = None;
        for convention in &self.conventions {
            let similarity = tabulator.calculate_similarity(convention);
            if similarity > best_similarity {
                best_similarity = similarity;
                best = Some(Arc::clone(convention));
            }
        }
        (best, best_similarity)
    }

    /// Every member with its similarity, best first (stable on ties)
    pub fn score_all_quote_conventions(
        &self,
        tabulator: &QuotationMarkTabulator,
    ) -> Vec<(Arc<QuoteConvention>, f64)> {
        let mut scores: Vec<_> = self
            .conventions
            .iter()
            .map(|c| (Arc::clone(c), tabulator.calculate_similarity(c)))
            .collect();
        scores.sort_by(|a, b| b.1.total_cmp(&a.1));
        scores
    }
}

impl PartialEq for QuoteConventionSet {
    fn eq(&self, other: &Self) -> bool {
        self.conventions == other.conventions
    }
}

fn character_class(marks: &BTreeSet<String>) -> Option<Regex> {
    let chars: BTreeSet<char> = marks.iter().flat_map(|m| m.chars()).collect();
    if chars.is_empty() {
        return None;
    }
    let class: String = chars
        .into_iter()
        .map(|c| regex::escape(c.encode_utf8(&mut [0; 4])))
        .collect();
    match Regex::new(&format!("[{class}]")) {
        Ok(pattern) => Some(pattern),
        Err(e) => {
            tracing::warn!("failed to build quotation mark pattern for {class:?}: {e}");
            None
        }
    }
}
