use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::{CoreError, Result};

/// Kind of structural marker that can precede a text run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarkerType {
    /// No marker precedes the run
    NoMarker,
    /// Chapter start
    Chapter,
    /// Verse start
    Verse,
    /// Paragraph start
    Paragraph,
    /// Inline character style
    Character,
    /// Embedded content such as a footnote
    Embed,
}

/// Index of a segment inside its [`SegmentArena`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SegmentId(usize);

impl SegmentId {
    /// Position in the arena
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A run of text plus the structural context it appeared in
///
/// All offsets are counted in Unicode scalar values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSegment {
    text: String,
    immediate_preceding_marker: MarkerType,
    markers_in_preceding_context: SmallVec<[MarkerType; 4]>,
    previous_segment: Option<SegmentId>,
    next_segment: Option<SegmentId>,
    index_in_verse: usize,
    num_segments_in_verse: usize,
}

impl TextSegment {
    /// Segment with no preceding markers and no links
    pub fn new(text: impl Into<String>) -> Self {
        Self::builder().text(text).build()
    }

    /// Start building a segment
    pub fn builder() -> TextSegmentBuilder {
        TextSegmentBuilder::default()
    }

    /// The segment's current text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length in Unicode scalar values
    pub fn length(&self) -> usize {
        self.text.chars().count()
    }

    /// The marker directly before this run
    pub fn immediate_preceding_marker(&self) -> MarkerType {
        self.immediate_preceding_marker
    }

    /// Every marker seen since the previous run, in order
    pub fn markers_in_preceding_context(&self) -> &[MarkerType] {
        &self.markers_in_preceding_context
    }

    /// Whether `marker` appeared since the previous run
    pub fn marker_is_in_preceding_context(&self, marker: MarkerType) -> bool {
        self.markers_in_preceding_context.contains(&marker)
    }

    /// Previous linked segment
    pub fn previous_segment(&self) -> Option<SegmentId> {
        self.previous_segment
    }

    /// Next linked segment
    pub fn next_segment(&self) -> Option<SegmentId> {
        self.next_segment
    }

    /// Position within the owning verse
    pub fn index_in_verse(&self) -> usize {
        self.index_in_verse
    }

    /// Number of segments in the owning verse
    pub fn num_segments_in_verse(&self) -> usize {
        self.num_segments_in_verse
    }

    pub fn is_first_segment_in_verse(&self) -> bool {
        self.index_in_verse == 0
    }

    pub fn is_last_segment_in_verse(&self) -> bool {
        self.index_in_verse + 1 >= self.num_segments_in_verse
    }

    /// Text before character offset `index`
    pub fn substring_before(&self, index: usize) -> &str {
        &self.text[..self.byte_offset(index)]
    }

    /// Text from character offset `index` on
    pub fn substring_after(&self, index: usize) -> &str {
        &self.text[self.byte_offset(index)..]
    }

    /// Text between two character offsets
    pub fn substring(&self, start: usize, end: usize) -> &str {
        let start = self.byte_offset(start);
        let end = self.byte_offset(end).max(start);
        &self.text[start..end]
    }

    /// Character at offset `index`
    pub fn char_at(&self, index: usize) -> Option<char> {
        self.text.chars().nth(index)
    }

    /// First character of the text
    pub fn first_char(&self) -> Option<char> {
        self.text.chars().next()
    }

    /// Last character of the text
    pub fn last_char(&self) -> Option<char> {
        self.text.chars().next_back()
    }

    /// Replace the characters in `start..end` with `replacement`
    ///
    /// Characters outside the range are left untouched.
    pub fn replace_substring(&mut self, start: usize, end: usize, replacement: &str) -> Result<()> {
        let length = self.length();
        if start > end || end > length {
            return Err(CoreError::InvalidOffsets { start, end, length });
        }
        let byte_start = self.byte_offset(start);
        let byte_end = self.byte_offset(end);
        self.text.replace_range(byte_start..byte_end, replacement);
        Ok(())
    }

    pub(crate) fn set_previous_segment(&mut self, previous: Option<SegmentId>) {
        self.previous_segment = previous;
    }

    pub(crate) fn set_next_segment(&mut self, next: Option<SegmentId>) {
        self.next_segment = next;
    }

    pub(crate) fn set_verse_position(&mut self, index_in_verse: usize, num_segments_in_verse: usize) {
        self.index_in_verse = index_in_verse;
        self.num_segments_in_verse = num_segments_in_verse;
    }

    /// Byte offset of a character offset, clamped to the end of the text
    fn byte_offset(&self, index: usize) -> usize {
        self.text
            .char_indices()
            .nth(index)
            .map_or(self.text.len(), |(offset, _)| offset)
    }
}

/// Builder for [`TextSegment`]
#[derive(Debug, Clone, Default)]
pub struct TextSegmentBuilder {
    text: String,
    immediate_preceding_marker: Option<MarkerType>,
    markers_in_preceding_context: SmallVec<[MarkerType; 4]>,
}

impl TextSegmentBuilder {
    /// Set the text
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Record a marker seen before the text; the last one added is the immediate one
    pub fn preceding_marker(mut self, marker: MarkerType) -> Self {
        self.add_preceding_marker(marker);
        self
    }

    /// In-place variant of [`Self::preceding_marker`]
    pub fn add_preceding_marker(&mut self, marker: MarkerType) {
        self.immediate_preceding_marker = Some(marker);
        if !self.markers_in_preceding_context.contains(&marker) {
            self.markers_in_preceding_context.push(marker);
        }
    }

    /// Build the segment
    pub fn build(self) -> TextSegment {
        TextSegment {
            text: self.text,
            immediate_preceding_marker: self
                .immediate_preceding_marker
                .unwrap_or(MarkerType::NoMarker),
            markers_in_preceding_context: self.markers_in_preceding_context,
            previous_segment: None,
            next_segment: None,
            index_in_verse: 0,
            num_segments_in_verse: 1,
        }
    }
}

/// Owns every segment of one processing run
///
/// Segments refer to their neighbours by [`SegmentId`] only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SegmentArena {
    segments: Vec<TextSegment>,
}

impl SegmentArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an unlinked segment
    pub fn push(&mut self, segment: TextSegment) -> SegmentId {
        self.segments.push(segment);
        SegmentId(self.segments.len() - 1)
    }

    /// Add segments and link each to its neighbours in the given order
    pub fn push_linked(&mut self, segments: impl IntoIterator<Item = TextSegment>) -> Vec<SegmentId> {
        let ids: Vec<SegmentId> = segments.into_iter().map(|s| self.push(s)).collect();
        self.link(&ids);
        ids
    }

    /// Link the given segments into a chain, in order
    pub fn link(&mut self, ids: &[SegmentId]) {
        for pair in ids.windows(2) {
            self.segments[pair[0].0].set_next_segment(Some(pair[1]));
            self.segments[pair[1].0].set_previous_segment(Some(pair[0]));
        }
    }

    /// Segment by id
    ///
    /// Ids are only ever produced by this arena, so lookups are in bounds.
    pub fn get(&self, id: SegmentId) -> &TextSegment {
        &self.segments[id.0]
    }

    /// Mutable segment by id
    pub fn get_mut(&mut self, id: SegmentId) -> &mut TextSegment {
        &mut self.segments[id.0]
    }

    /// Previous linked segment of `id`
    pub fn previous(&self, id: SegmentId) -> Option<&TextSegment> {
        self.get(id).previous_segment().map(|p| self.get(p))
    }

    /// Next linked segment of `id`
    pub fn next(&self, id: SegmentId) -> Option<&TextSegment> {
        self.get(id).next_segment().map(|n| self.get(n))
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// All ids in insertion order
    pub fn ids(&self) -> impl Iterator<Item = SegmentId> + '_ {
        (0..self.segments.len()).map(SegmentId)
    }

    /// All segments in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &TextSegment> {
        self.segments.iter()
    }
}
