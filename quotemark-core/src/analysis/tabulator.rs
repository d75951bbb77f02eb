use std::collections::BTreeMap;
use std::fmt::Write;

use crate::convention::{QuotationMarkDirection, QuoteConvention};
use crate::mark::QuotationMarkMetadata;

/// Occurrence counts of the marks seen at one depth and direction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuotationMarkCounts {
    counts: BTreeMap<String, usize>,
    total_count: usize,
}

impl QuotationMarkCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count_quotation_mark(&mut self, quotation_mark: &str) {
        *self.counts.entry(quotation_mark.to_string()).or_default() += 1;
        self.total_count += 1;
    }

    pub fn count_from(&mut self, other: &QuotationMarkCounts) {
        for (quotation_mark, count) in &other.counts {
            *self.counts.entry(quotation_mark.clone()).or_default() += count;
        }
        self.total_count += other.total_count;
    }

    pub fn total_count(&self) -> usize {
        self.total_count
    }

    /// Most frequent mark with its count and the total count
    ///
    /// Ties go to the lexicographically smallest mark.
    pub fn find_best_quotation_mark_proportion(&self) -> Option<(&str, usize, usize)> {
        self.counts
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(mark, &count)| (mark.as_str(), count, self.total_count))
    }

    /// Number of counted marks that differ from `expected`
    pub fn calculate_num_differences(&self, expected: Option<&str>) -> usize {
        let matching = expected
            .and_then(|mark| self.counts.get(mark))
            .copied()
            .unwrap_or(0);
        self.total_count - matching
    }
}

/// Resolved marks counted by (depth, direction)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuotationMarkTabulator {
    counts_by_depth_and_direction: BTreeMap<(usize, QuotationMarkDirection), QuotationMarkCounts>,
}

impl QuotationMarkTabulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tabulate(&mut self, quotation_marks: &[QuotationMarkMetadata]) {
        for quotation_mark in quotation_marks {
            self.counts_by_depth_and_direction
                .entry((quotation_mark.depth(), quotation_mark.direction()))
                .or_default()
                .count_quotation_mark(quotation_mark.quotation_mark());
        }
    }

    /// Merge another tabulation into this one
    pub fn tabulate_from(&mut self, other: &QuotationMarkTabulator) {
        for (key, counts) in &other.counts_by_depth_and_direction {
            self.counts_by_depth_and_direction
                .entry(*key)
                .or_default()
                .count_from(counts);
        }
    }

    pub fn total_quotation_mark_count(&self) -> usize {
        self.counts_by_depth_and_direction
            .values()
            .map(QuotationMarkCounts::total_count)
            .sum()
    }

    /// Fraction of tabulated marks that `convention` agrees with, in `[0, 1]`
    ///
    /// Agreement at a depth is weighted by the agreement rate one level
    /// shallower, so a wrong outer level drags the inner ones down with it.
    /// Depths past the convention's last level cycle through its inner levels.
    pub fn calculate_similarity(&self, convention: &QuoteConvention) -> f64 {
        let mut num_marks_by_depth: BTreeMap<usize, usize> = BTreeMap::new();
        let mut num_matching_marks_by_depth: BTreeMap<usize, usize> = BTreeMap::new();

        for (&(depth, direction), counts) in &self.counts_by_depth_and_direction {
            let expected = convention.cycled_quotation_mark(depth, direction);
            let total = counts.total_count();
            *num_marks_by_depth.entry(depth).or_default() += total;
            *num_matching_marks_by_depth.entry(depth).or_default() +=
                total - counts.calculate_num_differences(expected);
        }

        let mut scores_by_depth: BTreeMap<usize, f64> = BTreeMap::new();
        for &depth in num_marks_by_depth.keys() {
            let previous_depth_score = depth
                .checked_sub(1)
                .and_then(|previous| {
                    let score = scores_by_depth.get(&previous)?;
                    let marks = num_marks_by_depth.get(&previous)?;
                    Some(score / *marks as f64)
                })
                .unwrap_or(1.0);
            let matching = num_matching_marks_by_depth.get(&depth).copied().unwrap_or(0);
            scores_by_depth.insert(depth, previous_depth_score * matching as f64);
        }

        let total_marks: usize = num_marks_by_depth.values().sum();
        if total_marks == 0 {
            return 0.0;
        }
        scores_by_depth.values().sum::<f64>() / total_marks as f64
    }

    /// One line per depth (1 to 4) with both directions observed, naming the most common marks
    pub fn summary_message(&self) -> String {
        let mut message = String::new();
        for depth in 1..=4 {
            let opening = self.most_common(depth, QuotationMarkDirection::Opening);
            let closing = self.most_common(depth, QuotationMarkDirection::Closing);
            if let (Some((opening, opening_count, opening_total)), Some((closing, closing_count, closing_total))) =
                (opening, closing)
            {
                let _ = writeln!(
                    message,
                    "The most common level {depth} quotation marks are {opening} ({opening_count} of {opening_total} opening marks) and {closing} ({closing_count} of {closing_total} closing marks)"
                );
            }
        }
        message
    }

    fn most_common(
        &self,
        depth: usize,
        direction: QuotationMarkDirection,
    ) -> Option<(&str, usize, usize)> {
        self.counts_by_depth_and_direction
            .get(&(depth, direction))
            .and_then(QuotationMarkCounts::find_best_quotation_mark_proportion)
    }
}
