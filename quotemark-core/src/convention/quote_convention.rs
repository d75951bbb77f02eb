use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Whether a quotation mark opens or closes a quotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum QuotationMarkDirection {
    /// Opens a quotation
    Opening,
    /// Closes a quotation
    Closing,
}

impl fmt::Display for QuotationMarkDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuotationMarkDirection::Opening => write!(f, "opening"),
            QuotationMarkDirection::Closing => write!(f, "closing"),
        }
    }
}

/// Opening and closing marks for exactly one nesting depth
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SingleLevelQuoteConvention {
    opening: String,
    closing: String,
}

impl SingleLevelQuoteConvention {
    /// Create a level from its opening and closing marks
    pub fn new(opening: impl Into<String>, closing: impl Into<String>) -> Self {
        Self {
            opening: opening.into(),
            closing: closing.into(),
        }
    }

    /// The opening mark
    pub fn opening(&self) -> &str {
        &self.opening
    }

    /// The closing mark
    pub fn closing(&self) -> &str {
        &self.closing
    }

    /// Map typographic marks onto their typewriter equivalents
    pub fn normalize(&self) -> Self {
        Self::new(normalize_mark(&self.opening), normalize_mark(&self.closing))
    }
}

fn normalize_mark(mark: &str) -> &str {
    match mark {
        "\u{00AB}" | "\u{00BB}" | "\u{201C}" | "\u{201D}" | "\u{201E}" | "\u{300C}" | "\u{300D}"
        | "\u{300A}" | "\u{300B}" => "\"",
        "\u{2018}" | "\u{2019}" | "\u{201A}" => "'",
        other => other,
    }
}

/// A named, ordered list of per-depth quotation mark pairs
///
/// Index `i` of the level list describes depth `i + 1`. The same mark may
/// appear at several depths; context decides which one applies.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QuoteConvention {
    name: String,
    levels: Vec<SingleLevelQuoteConvention>,
}

impl QuoteConvention {
    /// Create a convention from its levels, outermost first
    pub fn new(name: impl Into<String>, levels: Vec<SingleLevelQuoteConvention>) -> Self {
        Self {
            name: name.into(),
            levels,
        }
    }

    /// Convention name, e.g. `standard_english`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All levels, outermost first
    pub fn levels(&self) -> &[SingleLevelQuoteConvention] {
        &self.levels
    }

    /// Maximum nesting depth described by this convention
    pub fn num_levels(&self) -> usize {
        self.levels.len()
    }

    /// Opening mark at a 1-based depth
    pub fn opening_mark_at_depth(&self, depth: usize) -> Option<&str> {
        self.level(depth).map(SingleLevelQuoteConvention::opening)
    }

    /// Closing mark at a 1-based depth
    pub fn closing_mark_at_depth(&self, depth: usize) -> Option<&str> {
        self.level(depth).map(SingleLevelQuoteConvention::closing)
    }

    /// The mark this convention prescribes at `depth` for `direction`
    ///
    /// Returns `None` outside `1..=num_levels()`.
    pub fn expected_quotation_mark(
        &self,
        depth: usize,
        direction: QuotationMarkDirection,
    ) -> Option<&str> {
        let level = self.level(depth)?;
        Some(match direction {
            QuotationMarkDirection::Opening => level.opening(),
            QuotationMarkDirection::Closing => level.closing(),
        })
    }

    /// Like [`Self::expected_quotation_mark`], but depths past the last level
    /// keep alternating between the two innermost levels
    ///
    /// A one-level convention repeats its only level.
    pub fn cycled_quotation_mark(
        &self,
        depth: usize,
        direction: QuotationMarkDirection,
    ) -> Option<&str> {
        let num_levels = self.num_levels();
        if depth == 0 || num_levels == 0 {
            return None;
        }
        let mut effective = depth;
        if num_levels == 1 {
            effective = 1;
        }
        while effective > num_levels {
            effective -= 2;
        }
        self.expected_quotation_mark(effective, direction)
    }

    /// Whether any level opens with `mark`
    pub fn includes_opening_mark(&self, mark: &str) -> bool {
        self.levels.iter().any(|level| level.opening == mark)
    }

    /// Whether any level closes with `mark`
    pub fn includes_closing_mark(&self, mark: &str) -> bool {
        self.levels.iter().any(|level| level.closing == mark)
    }

    /// Every depth at which `mark` is used in `direction`
    pub fn possible_depths(&self, mark: &str, direction: QuotationMarkDirection) -> BTreeSet<usize> {
        self.levels
            .iter()
            .enumerate()
            .filter(|(_, level)| match direction {
                QuotationMarkDirection::Opening => level.opening == mark,
                QuotationMarkDirection::Closing => level.closing == mark,
            })
            .map(|(index, _)| index + 1)
            .collect()
    }

    /// Whether observed opening and closing marks could all come from this convention
    ///
    /// Every observed opener must be an opener here and every observed closer a
    /// closer, so a mark observed in both roles must be used in both roles by
    /// this convention. The depth-1 pair must itself have been observed, which
    /// also means empty observations are compatible with nothing.
    pub fn is_compatible_with_observed_quotation_marks<S: AsRef<str>>(
        &self,
        opening_marks: &[S],
        closing_marks: &[S],
    ) -> bool {
        if !opening_marks
            .iter()
            .all(|mark| self.includes_opening_mark(mark.as_ref()))
        {
            return false;
        }
        if !closing_marks
            .iter()
            .all(|mark| self.includes_closing_mark(mark.as_ref()))
        {
            return false;
        }

        let (Some(first_opening), Some(first_closing)) =
            (self.opening_mark_at_depth(1), self.closing_mark_at_depth(1))
        else {
            return false;
        };
        opening_marks.iter().any(|mark| mark.as_ref() == first_opening)
            && closing_marks.iter().any(|mark| mark.as_ref() == first_closing)
    }

    /// Typewriter-normalized copy named `<name>_normalized`
    pub fn normalize(&self) -> Self {
        Self::new(
            format!("{}_normalized", self.name),
            self.levels.iter().map(SingleLevelQuoteConvention::normalize).collect(),
        )
    }

    fn level(&self, depth: usize) -> Option<&SingleLevelQuoteConvention> {
        depth.checked_sub(1).and_then(|index| self.levels.get(index))
    }
}

impl fmt::Display for QuoteConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name)?;
        for (index, level) in self.levels.iter().enumerate() {
            writeln!(
                f,
                "  level {}: {}text{}",
                index + 1,
                level.opening,
                level.closing
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard_english() -> QuoteConvention {
        QuoteConvention::new(
            "standard_english",
            vec![
                SingleLevelQuoteConvention::new("\u{201C}", "\u{201D}"),
                SingleLevelQuoteConvention::new("\u{2018}", "\u{2019}"),
                SingleLevelQuoteConvention::new("\u{201C}", "\u{201D}"),
                SingleLevelQuoteConvention::new("\u{2018}", "\u{2019}"),
            ],
        )
    }

    fn western_european() -> QuoteConvention {
        QuoteConvention::new(
            "western_european",
            vec![
                SingleLevelQuoteConvention::new("\u{00AB}", "\u{00BB}"),
                SingleLevelQuoteConvention::new("\u{201C}", "\u{201D}"),
                SingleLevelQuoteConvention::new("\u{2018}", "\u{2019}"),
            ],
        )
    }

    #[test]
    fn test_single_level_normalize() {
        let level = SingleLevelQuoteConvention::new("\u{201E}", "\u{201C}");
        assert_eq!(level.normalize(), SingleLevelQuoteConvention::new("\"", "\""));

        let level = SingleLevelQuoteConvention::new("\u{201A}", "\u{2018}");
        assert_eq!(level.normalize(), SingleLevelQuoteConvention::new("'", "'"));

        let level = SingleLevelQuoteConvention::new("\u{2039}", "\u{203A}");
        assert_eq!(level.normalize(), level);
    }

    #[test]
    fn test_marks_at_depth() {
        let convention = western_european();
        assert_eq!(convention.num_levels(), 3);
        assert_eq!(convention.opening_mark_at_depth(1), Some("\u{00AB}"));
        assert_eq!(convention.closing_mark_at_depth(3), Some("\u{2019}"));
        assert_eq!(convention.opening_mark_at_depth(0), None);
        assert_eq!(convention.opening_mark_at_depth(4), None);
    }

    #[test]
    fn test_expected_quotation_mark() {
        let convention = standard_english();
        assert_eq!(
            convention.expected_quotation_mark(2, QuotationMarkDirection::Closing),
            Some("\u{2019}")
        );
        assert_eq!(
            convention.expected_quotation_mark(5, QuotationMarkDirection::Opening),
            None
        );
        assert_eq!(
            convention.expected_quotation_mark(0, QuotationMarkDirection::Opening),
            None
        );
    }

    #[test]
    fn test_cycled_quotation_mark() {
        let convention = western_european();
        assert_eq!(
            convention.cycled_quotation_mark(3, QuotationMarkDirection::Opening),
            Some("\u{2018}")
        );
        // depth 4 alternates back to the second level
        assert_eq!(
            convention.cycled_quotation_mark(4, QuotationMarkDirection::Opening),
            Some("\u{201C}")
        );
        assert_eq!(
            convention.cycled_quotation_mark(5, QuotationMarkDirection::Closing),
            Some("\u{2019}")
        );

        let single = QuoteConvention::new("single", vec![SingleLevelQuoteConvention::new("<", ">")]);
        assert_eq!(
            single.cycled_quotation_mark(2, QuotationMarkDirection::Closing),
            Some(">")
        );
        assert_eq!(
            QuoteConvention::new("empty", vec![])
                .cycled_quotation_mark(1, QuotationMarkDirection::Opening),
            None
        );
    }

    #[test]
    fn test_possible_depths() {
        let convention = standard_english();
        let depths = convention.possible_depths("\u{201C}", QuotationMarkDirection::Opening);
        assert_eq!(depths.into_iter().collect::<Vec<_>>(), vec![1, 3]);
        assert!(convention
            .possible_depths("\u{201C}", QuotationMarkDirection::Closing)
            .is_empty());
    }

    #[test]
    fn test_is_compatible_with_observed_quotation_marks() {
        let convention = standard_english();
        assert!(convention.is_compatible_with_observed_quotation_marks(
            &["\u{201C}", "\u{2018}"],
            &["\u{201D}", "\u{2019}"]
        ));
        assert!(convention.is_compatible_with_observed_quotation_marks(&["\u{201C}"], &["\u{201D}"]));
        // depth-1 closer never observed
        assert!(!convention.is_compatible_with_observed_quotation_marks(&["\u{201C}"], &["\u{2019}"]));
        // guillemet is foreign to this convention
        assert!(!convention
            .is_compatible_with_observed_quotation_marks(&["\u{201C}", "\u{00AB}"], &["\u{201D}"]));
        let empty: [&str; 0] = [];
        assert!(!convention.is_compatible_with_observed_quotation_marks(&empty, &empty));
    }

    #[test]
    fn test_normalize() {
        let normalized = western_european().normalize();
        assert_eq!(normalized.name(), "western_european_normalized");
        assert_eq!(normalized.opening_mark_at_depth(1), Some("\""));
        assert_eq!(normalized.closing_mark_at_depth(2), Some("\""));
        assert_eq!(normalized.opening_mark_at_depth(3), Some("'"));
    }
}
