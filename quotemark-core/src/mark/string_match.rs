use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use super::metadata::QuotationMarkMetadata;
use crate::convention::{QuotationMarkDirection, QuoteConventionSet};
use crate::segment::{MarkerType, SegmentArena, SegmentId, TextSegment};

fn letter_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"[\p{L}\u{1E200}-\u{1E28F}]").expect("letter pattern should be valid")
    })
}

fn latin_letter_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\p{scx=Latin}$").expect("latin pattern should be valid"))
}

fn is_whitespace(c: char) -> bool {
    c.is_whitespace() || c == '~'
}

fn is_punctuation(c: char) -> bool {
    matches!(
        c,
        '.' | ',' | ';' | '?' | '!' | ')' | ']' | '-' | '\u{2014}' | '\u{06D4}' | '\u{060C}' | '\u{061B}'
    )
}

fn char_matches(c: char, pattern: &Regex) -> bool {
    pattern.is_match(c.encode_utf8(&mut [0; 4]))
}

/// A candidate quotation mark: a character range inside one segment
///
/// Context queries look into the linked neighbour segments, except that a
/// segment opened by a paragraph marker is never looked past.
#[derive(Clone, Copy)]
pub struct QuotationMarkStringMatch<'a> {
    arena: &'a SegmentArena,
    segment: SegmentId,
    start_index: usize,
    end_index: usize,
}

impl<'a> QuotationMarkStringMatch<'a> {
    pub fn new(arena: &'a SegmentArena, segment: SegmentId, start_index: usize, end_index: usize) -> Self {
        Self {
            arena,
            segment,
            start_index,
            end_index,
        }
    }

    pub fn segment_id(&self) -> SegmentId {
        self.segment
    }

    pub fn text_segment(&self) -> &'a TextSegment {
        self.arena.get(self.segment)
    }

    pub fn start_index(&self) -> usize {
        self.start_index
    }

    pub fn end_index(&self) -> usize {
        self.end_index
    }

    /// The matched mark text
    pub fn quotation_mark(&self) -> &'a str {
        self.text_segment().substring(self.start_index, self.end_index)
    }

    pub fn is_valid_opening_quotation_mark(&self, conventions: &QuoteConventionSet) -> bool {
        conventions.is_valid_opening_quotation_mark(self.quotation_mark())
    }

    pub fn is_valid_closing_quotation_mark(&self, conventions: &QuoteConventionSet) -> bool {
        conventions.is_valid_closing_quotation_mark(self.quotation_mark())
    }

    pub fn quotation_mark_matches(&self, pattern: &Regex) -> bool {
        pattern.is_match(self.quotation_mark())
    }

    /// Character before the mark, possibly the last one of the previous segment
    pub fn previous_character(&self) -> Option<char> {
        if self.is_at_start_of_segment() {
            if self.crosses_into_neighbours() {
                return self.arena.previous(self.segment).and_then(TextSegment::last_char);
            }
            return None;
        }
        self.text_segment().char_at(self.start_index - 1)
    }

    /// Character after the mark, possibly the first one of the next segment
    pub fn next_character(&self) -> Option<char> {
        if self.is_at_end_of_segment() {
            if self.crosses_into_neighbours() {
                return self.arena.next(self.segment).and_then(TextSegment::first_char);
            }
            return None;
        }
        self.text_segment().char_at(self.end_index)
    }

    pub fn previous_character_matches(&self, pattern: &Regex) -> bool {
        self.previous_character().is_some_and(|c| char_matches(c, pattern))
    }

    pub fn next_character_matches(&self, pattern: &Regex) -> bool {
        self.next_character().is_some_and(|c| char_matches(c, pattern))
    }

    pub fn leading_substring_matches(&self, pattern: &Regex) -> bool {
        pattern.is_match(self.text_segment().substring_before(self.start_index))
    }

    pub fn trailing_substring_matches(&self, pattern: &Regex) -> bool {
        pattern.is_match(self.text_segment().substring_after(self.end_index))
    }

    /// Whether this match comes before `other`; both must be in the same verse
    pub fn precedes(&self, other: &QuotationMarkStringMatch<'_>) -> bool {
        let own_index = self.text_segment().index_in_verse();
        let other_index = other.text_segment().index_in_verse();
        own_index < other_index || (own_index == other_index && self.start_index < other.start_index)
    }

    /// Up to ten characters of text around the mark
    pub fn context(&self) -> &'a str {
        let segment = self.text_segment();
        let start = self.start_index.saturating_sub(10);
        let end = (self.end_index + 10).min(segment.length());
        segment.substring(start, end)
    }

    /// Fix this match's depth and direction
    pub fn resolve(&self, depth: usize, direction: QuotationMarkDirection) -> QuotationMarkMetadata {
        QuotationMarkMetadata::new(
            self.quotation_mark(),
            depth,
            direction,
            self.segment,
            self.start_index,
            self.end_index,
        )
    }

    pub fn is_at_start_of_segment(&self) -> bool {
        self.start_index == 0
    }

    pub fn is_at_end_of_segment(&self) -> bool {
        self.end_index == self.text_segment().length()
    }

    /// Whitespace before the mark; a structural break counts when there is no previous character
    pub fn has_leading_whitespace(&self) -> bool {
        match self.previous_character() {
            Some(c) => is_whitespace(c),
            None => {
                let segment = self.text_segment();
                segment.marker_is_in_preceding_context(MarkerType::Paragraph)
                    || segment.marker_is_in_preceding_context(MarkerType::Embed)
                    || segment.marker_is_in_preceding_context(MarkerType::Verse)
            }
        }
    }

    pub fn has_trailing_whitespace(&self) -> bool {
        self.next_character().is_some_and(is_whitespace)
    }

    pub fn has_leading_punctuation(&self) -> bool {
        self.previous_character().is_some_and(is_punctuation)
    }

    pub fn has_trailing_punctuation(&self) -> bool {
        self.next_character().is_some_and(is_punctuation)
    }

    pub fn has_letter_in_leading_substring(&self) -> bool {
        self.leading_substring_matches(letter_pattern())
    }

    pub fn has_letter_in_trailing_substring(&self) -> bool {
        self.trailing_substring_matches(letter_pattern())
    }

    pub fn has_leading_latin_letter(&self) -> bool {
        self.previous_character_matches(latin_letter_pattern())
    }

    pub fn has_trailing_latin_letter(&self) -> bool {
        self.next_character_matches(latin_letter_pattern())
    }

    /// A colon or comma, optionally followed by whitespace, right before the mark
    pub fn has_quote_introducer_in_leading_substring(&self) -> bool {
        let leading = self.text_segment().substring_before(self.start_index);
        leading
            .trim_end_matches(char::is_whitespace)
            .ends_with([':', ','])
    }

    fn crosses_into_neighbours(&self) -> bool {
        !self
            .text_segment()
            .marker_is_in_preceding_context(MarkerType::Paragraph)
    }
}

impl fmt::Debug for QuotationMarkStringMatch<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuotationMarkStringMatch")
            .field("segment", &self.segment)
            .field("start_index", &self.start_index)
            .field("end_index", &self.end_index)
            .field("quotation_mark", &self.quotation_mark())
            .finish()
    }
}

impl PartialEq for QuotationMarkStringMatch<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.arena, other.arena)
            && self.segment == other.segment
            && self.start_index == other.start_index
            && self.end_index == other.end_index
    }
}

impl Eq for QuotationMarkStringMatch<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(text: &str) -> (SegmentArena, SegmentId) {
        let mut arena = SegmentArena::new();
        let id = arena.push(TextSegment::new(text));
        (arena, id)
    }

    #[test]
    fn test_quotation_mark() {
        let (arena, id) = single("quick brown fox");
        assert_eq!(QuotationMarkStringMatch::new(&arena, id, 6, 7).quotation_mark(), "b");
        assert_eq!(QuotationMarkStringMatch::new(&arena, id, 6, 11).quotation_mark(), "brown");

        let (arena, id) = single("new “example” text");
        assert_eq!(QuotationMarkStringMatch::new(&arena, id, 4, 5).quotation_mark(), "\u{201C}");
        assert_eq!(QuotationMarkStringMatch::new(&arena, id, 12, 13).quotation_mark(), "\u{201D}");
    }

    #[test]
    fn test_previous_and_next_character() {
        let (arena, id) = single("sample text");
        let m = QuotationMarkStringMatch::new(&arena, id, 1, 2);
        assert_eq!(m.previous_character(), Some('s'));
        assert_eq!(m.next_character(), Some('m'));

        let m = QuotationMarkStringMatch::new(&arena, id, 0, 1);
        assert_eq!(m.previous_character(), None);

        let m = QuotationMarkStringMatch::new(&arena, id, 10, 11);
        assert_eq!(m.next_character(), None);
    }

    #[test]
    fn test_characters_cross_segment_boundaries() {
        let mut arena = SegmentArena::new();
        let ids = arena.push_linked([
            TextSegment::new("previous segment "),
            TextSegment::new("“middle”"),
            TextSegment::new(" next segment"),
        ]);
        let opening = QuotationMarkStringMatch::new(&arena, ids[1], 0, 1);
        assert_eq!(opening.previous_character(), Some(' '));
        assert!(opening.has_leading_whitespace());

        let closing = QuotationMarkStringMatch::new(&arena, ids[1], 7, 8);
        assert_eq!(closing.next_character(), Some(' '));
        assert!(closing.has_trailing_whitespace());
    }

    #[test]
    fn test_paragraph_blocks_cross_segment_lookup() {
        let mut arena = SegmentArena::new();
        let ids = arena.push_linked([
            TextSegment::new("previous segment "),
            TextSegment::builder()
                .text("“middle”")
                .preceding_marker(MarkerType::Paragraph)
                .build(),
            TextSegment::new(" next"),
        ]);
        let opening = QuotationMarkStringMatch::new(&arena, ids[1], 0, 1);
        assert_eq!(opening.previous_character(), None);
        // the paragraph break itself counts as whitespace
        assert!(opening.has_leading_whitespace());

        let closing = QuotationMarkStringMatch::new(&arena, ids[1], 7, 8);
        assert_eq!(closing.next_character(), None);
        assert!(!closing.has_trailing_whitespace());
    }

    #[test]
    fn test_leading_whitespace_from_markers() {
        let (arena, id) = single("“text");
        assert!(!QuotationMarkStringMatch::new(&arena, id, 0, 1).has_leading_whitespace());

        for marker in [MarkerType::Paragraph, MarkerType::Embed, MarkerType::Verse] {
            let mut arena = SegmentArena::new();
            let id = arena.push(TextSegment::builder().text("“text").preceding_marker(marker).build());
            assert!(QuotationMarkStringMatch::new(&arena, id, 0, 1).has_leading_whitespace());
        }

        let mut arena = SegmentArena::new();
        let id = arena.push(
            TextSegment::builder()
                .text("“text")
                .preceding_marker(MarkerType::Character)
                .build(),
        );
        assert!(!QuotationMarkStringMatch::new(&arena, id, 0, 1).has_leading_whitespace());
    }

    #[test]
    fn test_whitespace_and_punctuation() {
        let (arena, id) = single("word “ x”. ~”");
        let m = QuotationMarkStringMatch::new(&arena, id, 5, 6);
        assert!(m.has_leading_whitespace());
        assert!(m.has_trailing_whitespace());

        let m = QuotationMarkStringMatch::new(&arena, id, 8, 9);
        assert!(m.has_trailing_punctuation());
        assert!(!m.has_leading_punctuation());

        // tilde is a non-breaking space in some markup
        let m = QuotationMarkStringMatch::new(&arena, id, 12, 13);
        assert!(m.has_leading_whitespace());
    }

    #[test]
    fn test_latin_letters() {
        let (arena, id) = single("don't λ'λ");
        let m = QuotationMarkStringMatch::new(&arena, id, 3, 4);
        assert!(m.has_leading_latin_letter());
        assert!(m.has_trailing_latin_letter());

        let m = QuotationMarkStringMatch::new(&arena, id, 7, 8);
        assert!(!m.has_leading_latin_letter());
        assert!(!m.has_trailing_latin_letter());
        assert!(m.has_letter_in_leading_substring());
        assert!(m.has_letter_in_trailing_substring());
    }

    #[test]
    fn test_quote_introducer() {
        let (arena, id) = single("He said: “Go” and, “stay");
        let introduced = QuotationMarkStringMatch::new(&arena, id, 9, 10);
        assert!(introduced.has_quote_introducer_in_leading_substring());
        let closing = QuotationMarkStringMatch::new(&arena, id, 12, 13);
        assert!(!closing.has_quote_introducer_in_leading_substring());
        let after_comma = QuotationMarkStringMatch::new(&arena, id, 19, 20);
        assert!(after_comma.has_quote_introducer_in_leading_substring());
    }

    #[test]
    fn test_resolve_and_precedes() {
        let (arena, id) = single("“a” b");
        let first = QuotationMarkStringMatch::new(&arena, id, 0, 1);
        let second = QuotationMarkStringMatch::new(&arena, id, 2, 3);
        assert!(first.precedes(&second));
        assert!(!second.precedes(&first));

        let metadata = second.resolve(1, QuotationMarkDirection::Closing);
        assert_eq!(metadata.quotation_mark(), "\u{201D}");
        assert_eq!(metadata.depth(), 1);
        assert_eq!(metadata.start_index(), 2);
        assert_eq!(metadata.end_index(), 3);
    }

    #[test]
    fn test_start_and_end_of_segment() {
        let (arena, id) = single("“a”");
        assert!(QuotationMarkStringMatch::new(&arena, id, 0, 1).is_at_start_of_segment());
        assert!(QuotationMarkStringMatch::new(&arena, id, 2, 3).is_at_end_of_segment());
        assert!(!QuotationMarkStringMatch::new(&arena, id, 1, 2).is_at_end_of_segment());
    }
}
