use std::sync::{Arc, OnceLock};

use regex::Regex;

use super::string_match::QuotationMarkStringMatch;
use crate::convention::QuoteConventionSet;
use crate::segment::{Chapter, SegmentArena, SegmentId, Verse};

fn quotation_mark_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(\p{Quotation_Mark}|<<|>>|<|>)").expect("quotation mark pattern should be valid")
    })
}

/// Scans segments for marks that some convention in its set could use
#[derive(Debug, Clone)]
pub struct QuotationMarkFinder {
    conventions: Arc<QuoteConventionSet>,
}

impl QuotationMarkFinder {
    pub fn new(conventions: Arc<QuoteConventionSet>) -> Self {
        Self { conventions }
    }

    pub fn quote_conventions(&self) -> &QuoteConventionSet {
        &self.conventions
    }

    pub fn find_all_potential_quotation_marks_in_chapters<'a>(
        &self,
        arena: &'a SegmentArena,
        chapters: &[Chapter],
    ) -> Vec<QuotationMarkStringMatch<'a>> {
        chapters
            .iter()
            .flat_map(|chapter| self.find_all_potential_quotation_marks_in_chapter(arena, chapter))
            .collect()
    }

    /// Verse text only; embeds are separate contexts
    pub fn find_all_potential_quotation_marks_in_chapter<'a>(
        &self,
        arena: &'a SegmentArena,
        chapter: &Chapter,
    ) -> Vec<QuotationMarkStringMatch<'a>> {
        chapter
            .verses()
            .iter()
            .flat_map(|verse| self.find_all_potential_quotation_marks_in_verse(arena, verse))
            .collect()
    }

    pub fn find_all_potential_quotation_marks_in_verse<'a>(
        &self,
        arena: &'a SegmentArena,
        verse: &Verse,
    ) -> Vec<QuotationMarkStringMatch<'a>> {
        self.find_all_potential_quotation_marks_in_segments(arena, verse.segments())
    }

    pub fn find_all_potential_quotation_marks_in_segments<'a>(
        &self,
        arena: &'a SegmentArena,
        segments: &[SegmentId],
    ) -> Vec<QuotationMarkStringMatch<'a>> {
        segments
            .iter()
            .flat_map(|&id| self.find_all_potential_quotation_marks_in_segment(arena, id))
            .collect()
    }

    /// Candidate marks in one segment, in reading order
    pub fn find_all_potential_quotation_marks_in_segment<'a>(
        &self,
        arena: &'a SegmentArena,
        segment: SegmentId,
    ) -> Vec<QuotationMarkStringMatch<'a>> {
        let text = arena.get(segment).text();
        let mut matches = Vec::new();
        let mut byte_position = 0;
        let mut char_position = 0;

        for found in quotation_mark_pattern().find_iter(text) {
            char_position += text[byte_position..found.start()].chars().count();
            let length = found.as_str().chars().count();
            byte_position = found.end();

            let candidate =
                QuotationMarkStringMatch::new(arena, segment, char_position, char_position + length);
            char_position += length;

            if candidate.is_valid_opening_quotation_mark(&self.conventions)
                || candidate.is_valid_closing_quotation_mark(&self.conventions)
            {
                matches.push(candidate);
            }
        }
        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convention::standard_quote_conventions;
    use crate::segment::TextSegment;

    fn offsets(text: &str) -> Vec<(usize, usize)> {
        let finder = QuotationMarkFinder::new(standard_quote_conventions().unwrap());
        let mut arena = SegmentArena::new();
        let id = arena.push(TextSegment::new(text));
        finder
            .find_all_potential_quotation_marks_in_segment(&arena, id)
            .iter()
            .map(|m| (m.start_index(), m.end_index()))
            .collect()
    }

    #[test]
    fn test_all_possible_quotation_marks_are_identified() {
        assert_eq!(offsets("\u{201C}Sample Text\u{201D}"), vec![(0, 1), (12, 13)]);
        assert_eq!(offsets("\"Sample Text'"), vec![(0, 1), (12, 13)]);
        assert_eq!(
            offsets("All \u{201C}the \u{2019}English quotation\u{2018} marks\u{201D}"),
            vec![(4, 5), (9, 10), (27, 28), (34, 35)]
        );
        assert_eq!(
            offsets("All \u{00AB}the \u{2039}French quotation\u{203A} marks\u{00BB}"),
            vec![(4, 5), (9, 10), (26, 27), (33, 34)]
        );
        assert_eq!(
            offsets("All \"the 'typewriter quotation marks"),
            vec![(4, 5), (9, 10)]
        );
    }

    #[test]
    fn test_multi_character_marks() {
        assert_eq!(offsets("<<Sample <text> here>>"), vec![(0, 2), (9, 10), (14, 15), (20, 22)]);
    }

    #[test]
    fn test_offsets_count_characters_not_bytes() {
        assert_eq!(offsets("उत्पत्ति “पुस्तकले”"), vec![(9, 10), (18, 19)]);
    }

    #[test]
    fn test_marks_outside_the_set_are_ignored() {
        let finder = QuotationMarkFinder::new(Arc::new(QuoteConventionSet::new(vec![
            crate::convention::QuoteConvention::new(
                "standard_english",
                vec![crate::convention::SingleLevelQuoteConvention::new("\u{201C}", "\u{201D}")],
            ),
        ])));
        let mut arena = SegmentArena::new();
        let id = arena.push(TextSegment::new("\u{201C}a\u{00AB}b\u{201D} 'c'"));
        let marks: Vec<&str> = finder
            .find_all_potential_quotation_marks_in_segment(&arena, id)
            .iter()
            .map(|m| m.quotation_mark())
            .collect();
        assert_eq!(marks, vec!["\u{201C}", "\u{201D}"]);
    }

    #[test]
    fn test_find_in_segments_keeps_order() {
        let finder = QuotationMarkFinder::new(standard_quote_conventions().unwrap());
        let mut arena = SegmentArena::new();
        let ids = arena.push_linked([TextSegment::new("\u{201C}one"), TextSegment::new("two\u{201D}")]);
        let matches = finder.find_all_potential_quotation_marks_in_segments(&arena, &ids);
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].segment_id(), ids[0]);
        assert_eq!(matches[1].segment_id(), ids[1]);
        assert_eq!(matches[1].start_index(), 3);
    }
}
