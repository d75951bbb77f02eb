//! Cheap, resolution-free narrowing of the convention catalog
//!
//! Marks are grouped per verse into earlier/later pairs and apostrophe-like
//! marks are profiled by word position. The marks that look like openers and
//! closers then filter the catalog with
//! [`QuoteConventionSet::filter_to_compatible_quote_conventions`].

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use regex::Regex;

use crate::convention::QuoteConventionSet;
use crate::mark::{QuotationMarkFinder, QuotationMarkStringMatch};
use crate::segment::{Chapter, SegmentArena, Verse};

const MAXIMUM_APOSTROPHE_PROPORTION: f64 = 0.02;
const MAXIMUM_PROPORTION_FOR_RARITY: f64 = 0.1;
const MAXIMUM_WORD_POSITION_DIFFERENCE: f64 = 0.3;
const SOLE_OCCURRENCE_MINIMUM_COUNT: usize = 5;
const MUCH_MORE_COMMON_MINIMUM_RATIO: usize = 10;
const MAXIMUM_SEQUENCE_RATE_DIFFERENCE: f64 = 0.2;

fn apostrophe_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"['\u{2019}]").expect("apostrophe pattern should be valid"))
}

fn count(counts: &BTreeMap<String, usize>, mark: &str) -> usize {
    counts.get(mark).copied().unwrap_or(0)
}

fn increment(counts: &mut BTreeMap<String, usize>, mark: &str) {
    *counts.entry(mark.to_string()).or_default() += 1;
}

fn proportion(part: usize, whole: usize) -> f64 {
    part as f64 / whole as f64
}

#[derive(Debug, Clone, Default)]
struct ApostropheProportionStatistics {
    num_characters: usize,
    num_apostrophes: usize,
}

impl ApostropheProportionStatistics {
    fn is_apostrophe_proportion_greater_than(&self, threshold: f64) -> bool {
        self.num_characters > 0 && proportion(self.num_apostrophes, self.num_characters) > threshold
    }
}

#[derive(Debug, Clone, Default)]
struct QuotationMarkWordPositions {
    word_initial: BTreeMap<String, usize>,
    mid_word: BTreeMap<String, usize>,
    word_final: BTreeMap<String, usize>,
}

impl QuotationMarkWordPositions {
    fn total(&self, mark: &str) -> usize {
        count(&self.word_initial, mark) + count(&self.mid_word, mark) + count(&self.word_final, mark)
    }

    fn is_mark_rarely_initial(&self, mark: &str) -> bool {
        let total = self.total(mark);
        total > 0 && proportion(count(&self.word_initial, mark), total) < MAXIMUM_PROPORTION_FOR_RARITY
    }

    fn is_mark_rarely_final(&self, mark: &str) -> bool {
        let total = self.total(mark);
        total > 0 && proportion(count(&self.word_final, mark), total) < MAXIMUM_PROPORTION_FOR_RARITY
    }

    fn are_initial_and_final_rates_similar(&self, mark: &str) -> bool {
        let total = self.total(mark);
        let difference = count(&self.word_initial, mark).abs_diff(count(&self.word_final, mark));
        total > 0 && proportion(difference, total) < MAXIMUM_WORD_POSITION_DIFFERENCE
    }

    fn is_mark_commonly_mid_word(&self, mark: &str) -> bool {
        let total = self.total(mark);
        total > 0 && proportion(count(&self.mid_word, mark), total) > MAXIMUM_WORD_POSITION_DIFFERENCE
    }
}

/// How often each mark came first or second in a verse-level pair
#[derive(Debug, Clone, Default)]
struct QuotationMarkSequences {
    earlier: BTreeMap<String, usize>,
    later: BTreeMap<String, usize>,
}

impl QuotationMarkSequences {
    fn is_mark_much_more_common_earlier(&self, mark: &str) -> bool {
        let early = count(&self.earlier, mark);
        let late = count(&self.later, mark);
        (late == 0 && early > SOLE_OCCURRENCE_MINIMUM_COUNT) || early > late * MUCH_MORE_COMMON_MINIMUM_RATIO
    }

    fn is_mark_much_more_common_later(&self, mark: &str) -> bool {
        let early = count(&self.earlier, mark);
        let late = count(&self.later, mark);
        (early == 0 && late > SOLE_OCCURRENCE_MINIMUM_COUNT) || late > early * MUCH_MORE_COMMON_MINIMUM_RATIO
    }

    fn are_early_and_late_rates_similar(&self, mark: &str) -> bool {
        let early = count(&self.earlier, mark);
        let late = count(&self.later, mark);
        early > 0 && proportion(early.abs_diff(late), early) < MAXIMUM_SEQUENCE_RATE_DIFFERENCE
    }
}

/// Pairs of marks within one verse that plausibly open and close the same quotation
fn quotation_mark_pairs(
    matches: &[QuotationMarkStringMatch<'_>],
    conventions: &QuoteConventionSet,
) -> Vec<(String, String)> {
    let mut grouped: BTreeMap<&str, Vec<&QuotationMarkStringMatch<'_>>> = BTreeMap::new();
    for m in matches {
        grouped.entry(m.quotation_mark()).or_default().push(m);
    }

    let has_distinct_paired_mark = |mark: &str| {
        conventions
            .possible_paired_quotation_marks(mark)
            .into_iter()
            .any(|paired| paired != mark && grouped.contains_key(paired))
    };

    let mut pairs = Vec::new();
    for (&mark1, matches1) in &grouped {
        // Identical opening and closing marks
        if matches1.len() == 2
            && conventions.is_quotation_mark_direction_ambiguous(mark1)
            && !has_distinct_paired_mark(mark1)
        {
            pairs.push((mark1.to_string(), mark1.to_string()));
            continue;
        }

        // Repeated marks make the pairing unclear
        if matches1.len() > 1 {
            continue;
        }

        for (&mark2, matches2) in &grouped {
            if matches2.len() == 1
                && conventions.marks_are_a_valid_pair(mark1, mark2)
                && matches1[0].precedes(matches2[0])
            {
                pairs.push((mark1.to_string(), mark2.to_string()));
            }
        }
    }
    pairs
}

#[derive(Debug, Clone, Default)]
struct PreliminaryApostropheAnalyzer {
    proportions: ApostropheProportionStatistics,
    word_positions: QuotationMarkWordPositions,
}

impl PreliminaryApostropheAnalyzer {
    fn process_quotation_marks(
        &mut self,
        arena: &SegmentArena,
        verse: &Verse,
        matches: &[QuotationMarkStringMatch<'_>],
    ) {
        self.proportions.num_characters += verse
            .segments()
            .iter()
            .map(|&id| arena.get(id).length())
            .sum::<usize>();

        for m in matches.iter().filter(|m| m.quotation_mark_matches(apostrophe_pattern())) {
            self.count_apostrophe(m);
        }
    }

    fn count_apostrophe(&mut self, m: &QuotationMarkStringMatch<'_>) {
        let mark = m.quotation_mark();
        self.proportions.num_apostrophes += 1;

        let leading = m.has_leading_whitespace();
        let trailing = m.has_trailing_whitespace();
        if !trailing && (m.is_at_start_of_segment() || leading) {
            increment(&mut self.word_positions.word_initial, mark);
        } else if !trailing && !leading {
            increment(&mut self.word_positions.mid_word, mark);
        } else if (m.is_at_end_of_segment() || trailing) && !leading {
            increment(&mut self.word_positions.word_final, mark);
        }
    }

    fn is_apostrophe_only(&self, mark: &str) -> bool {
        if !apostrophe_pattern().is_match(mark) {
            return false;
        }
        if self.word_positions.is_mark_rarely_initial(mark) || self.word_positions.is_mark_rarely_final(mark) {
            return true;
        }
        if self.word_positions.are_initial_and_final_rates_similar(mark)
            && self.word_positions.is_mark_commonly_mid_word(mark)
        {
            return true;
        }
        self.proportions
            .is_apostrophe_proportion_greater_than(MAXIMUM_APOSTROPHE_PROPORTION)
    }
}

/// Narrows a convention set from raw mark statistics, before any resolution
///
/// Accumulates across calls until [`Self::reset`].
#[derive(Debug, Clone)]
pub struct PreliminaryQuotationMarkAnalyzer {
    conventions: Arc<QuoteConventionSet>,
    apostrophe_analyzer: PreliminaryApostropheAnalyzer,
    sequences: QuotationMarkSequences,
}

impl PreliminaryQuotationMarkAnalyzer {
    pub fn new(conventions: Arc<QuoteConventionSet>) -> Self {
        Self {
            conventions,
            apostrophe_analyzer: PreliminaryApostropheAnalyzer::default(),
            sequences: QuotationMarkSequences::default(),
        }
    }

    pub fn reset(&mut self) {
        self.apostrophe_analyzer = PreliminaryApostropheAnalyzer::default();
        self.sequences = QuotationMarkSequences::default();
    }

    /// Analyze every verse of `chapters` and return the conventions still compatible
    pub fn narrow_down_possible_quote_conventions(
        &mut self,
        arena: &SegmentArena,
        chapters: &[Chapter],
    ) -> QuoteConventionSet {
        let finder = QuotationMarkFinder::new(Arc::clone(&self.conventions));
        for verse in chapters.iter().flat_map(Chapter::verses) {
            let matches = finder.find_all_potential_quotation_marks_in_verse(arena, verse);
            for (earlier, later) in quotation_mark_pairs(&matches, &self.conventions) {
                increment(&mut self.sequences.earlier, &earlier);
                increment(&mut self.sequences.later, &later);
            }
            self.apostrophe_analyzer
                .process_quotation_marks(arena, verse, &matches);
        }
        self.select_compatible_quote_conventions()
    }

    /// Conventions compatible with the marks classified so far
    pub fn select_compatible_quote_conventions(&self) -> QuoteConventionSet {
        let opening: Vec<&str> = self
            .conventions
            .possible_opening_quotation_marks()
            .into_iter()
            .filter(|mark| self.is_opening_quotation_mark(mark))
            .collect();
        let closing: Vec<&str> = self
            .conventions
            .possible_closing_quotation_marks()
            .into_iter()
            .filter(|mark| self.is_closing_quotation_mark(mark))
            .collect();
        self.conventions
            .filter_to_compatible_quote_conventions(&opening, &closing)
    }

    fn is_opening_quotation_mark(&self, mark: &str) -> bool {
        if self.apostrophe_analyzer.is_apostrophe_only(mark) {
            return false;
        }
        self.sequences.is_mark_much_more_common_earlier(mark)
            || (self.sequences.are_early_and_late_rates_similar(mark)
                && self.conventions.is_quotation_mark_direction_ambiguous(mark))
    }

    fn is_closing_quotation_mark(&self, mark: &str) -> bool {
        if self.apostrophe_analyzer.is_apostrophe_only(mark) {
            return false;
        }
        self.sequences.is_mark_much_more_common_later(mark)
            || (self.sequences.are_early_and_late_rates_similar(mark)
                && self.conventions.is_quotation_mark_direction_ambiguous(mark))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convention::standard_quote_convention;
    use crate::segment::TextSegment;

    fn candidate_set() -> Arc<QuoteConventionSet> {
        let names = [
            "standard_english",
            "typewriter_english",
            "standard_french",
            "western_european",
            "standard_swedish",
        ];
        Arc::new(QuoteConventionSet::from_shared(
            names
                .iter()
                .map(|name| standard_quote_convention(name).unwrap())
                .collect(),
        ))
    }

    fn single_verse(text: &str) -> (SegmentArena, Vec<Chapter>) {
        let mut arena = SegmentArena::new();
        let id = arena.push(TextSegment::new(text));
        let verse = Verse::new(&mut arena, vec![id]);
        (arena, vec![Chapter::new(vec![verse])])
    }

    fn narrowed_names(analyzer: &mut PreliminaryQuotationMarkAnalyzer, text: &str) -> Vec<String> {
        analyzer.reset();
        let (arena, chapters) = single_verse(text);
        analyzer
            .narrow_down_possible_quote_conventions(&arena, &chapters)
            .conventions()
            .iter()
            .map(|c| c.name().to_string())
            .collect()
    }

    #[test]
    fn test_sequence_decides_opening_and_closing() {
        let mut analyzer = PreliminaryQuotationMarkAnalyzer::new(candidate_set());
        assert_eq!(
            narrowed_names(&mut analyzer, "initial text \u{201C} quoted English text \u{201D} final text"),
            vec!["standard_english"]
        );
        assert_eq!(
            narrowed_names(&mut analyzer, "initial text \u{201D} quoted Swedish text \u{201D} final text"),
            vec!["standard_swedish"]
        );
        assert_eq!(
            narrowed_names(
                &mut analyzer,
                "initial text \u{00AB} quoted French/Western European text \u{00BB} final text"
            ),
            vec!["standard_french", "western_european"]
        );
    }

    #[test]
    fn test_no_quotes_leaves_nothing_compatible() {
        let mut analyzer = PreliminaryQuotationMarkAnalyzer::new(candidate_set());
        assert!(narrowed_names(&mut analyzer, "no quotation marks here").is_empty());
    }

    #[test]
    fn test_pairs_within_a_verse() {
        let conventions = candidate_set();
        let mut arena = SegmentArena::new();
        let id = arena.push(TextSegment::new("\u{201C}a\u{201D} \"b\" \u{2018}c \u{2018}d"));
        let finder = QuotationMarkFinder::new(Arc::clone(&conventions));
        let matches = finder.find_all_potential_quotation_marks_in_segment(&arena, id);
        let pairs = quotation_mark_pairs(&matches, &conventions);
        assert!(pairs.contains(&("\u{201C}".to_string(), "\u{201D}".to_string())));
        assert!(pairs.contains(&("\"".to_string(), "\"".to_string())));
        assert!(!pairs.iter().any(|(first, _)| first == "\u{2018}"));
    }

    #[test]
    fn test_word_positions() {
        let mut positions = QuotationMarkWordPositions::default();
        for _ in 0..9 {
            increment(&mut positions.mid_word, "'");
        }
        increment(&mut positions.word_final, "'");
        assert!(positions.is_mark_rarely_initial("'"));
        assert!(!positions.is_mark_rarely_final("'"));
        assert!(positions.is_mark_commonly_mid_word("'"));
        assert!(positions.are_initial_and_final_rates_similar("'"));
        assert!(!positions.is_mark_rarely_initial("\u{2019}"));
    }

    #[test]
    fn test_sequence_rates() {
        let mut sequences = QuotationMarkSequences::default();
        increment(&mut sequences.earlier, "\u{201C}");
        assert!(sequences.is_mark_much_more_common_earlier("\u{201C}"));
        assert!(!sequences.is_mark_much_more_common_later("\u{201C}"));

        for _ in 0..6 {
            increment(&mut sequences.later, "\u{201D}");
        }
        assert!(sequences.is_mark_much_more_common_later("\u{201D}"));

        increment(&mut sequences.earlier, "\"");
        increment(&mut sequences.later, "\"");
        assert!(sequences.are_early_and_late_rates_similar("\""));
        assert!(!sequences.are_early_and_late_rates_similar("\u{201D}"));
    }

    #[test]
    fn test_frequent_apostrophes_are_not_quotation_marks() {
        let mut analyzer = PreliminaryApostropheAnalyzer::default();
        let mut arena = SegmentArena::new();
        let id = arena.push(TextSegment::new("ha'a'e'i ke'o"));
        let verse = Verse::new(&mut arena, vec![id]);
        let conventions = Arc::new(QuoteConventionSet::from_shared(vec![standard_quote_convention(
            "typewriter_english",
        )
        .unwrap()]));
        let matches = QuotationMarkFinder::new(conventions).find_all_potential_quotation_marks_in_verse(&arena, &verse);
        analyzer.process_quotation_marks(&arena, &verse, &matches);
        assert!(analyzer.is_apostrophe_only("'"));
        assert!(!analyzer.is_apostrophe_only("\""));
    }
}
