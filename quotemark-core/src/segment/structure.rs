//! Chapter and verse structure over an arena of segments

use super::text_segment::{MarkerType, SegmentArena, SegmentId, TextSegmentBuilder};

/// Embedded content (e.g. a footnote) inside a verse
///
/// An embed is its own quotation context: its segments link only to each other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Embed {
    segments: Vec<SegmentId>,
}

impl Embed {
    /// Embed over already-linked segments
    pub fn new(segments: Vec<SegmentId>) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> &[SegmentId] {
        &self.segments
    }
}

/// The text runs of one verse, plus any embeds found inside it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Verse {
    segments: Vec<SegmentId>,
    embeds: Vec<Embed>,
}

impl Verse {
    /// Verse over `segments`, recording each segment's position in the verse
    pub fn new(arena: &mut SegmentArena, segments: Vec<SegmentId>) -> Self {
        let count = segments.len();
        for (index, id) in segments.iter().enumerate() {
            arena.get_mut(*id).set_verse_position(index, count);
        }
        Self {
            segments,
            embeds: Vec::new(),
        }
    }

    /// Attach an embed
    pub fn with_embed(mut self, embed: Embed) -> Self {
        self.embeds.push(embed);
        self
    }

    /// Verse text segments in reading order
    pub fn segments(&self) -> &[SegmentId] {
        &self.segments
    }

    /// Embeds in reading order
    pub fn embeds(&self) -> &[Embed] {
        &self.embeds
    }

    fn is_empty(&self) -> bool {
        self.segments.is_empty() && self.embeds.is_empty()
    }
}

/// The verses of one chapter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Chapter {
    verses: Vec<Verse>,
}

impl Chapter {
    pub fn new(verses: Vec<Verse>) -> Self {
        Self { verses }
    }

    pub fn verses(&self) -> &[Verse] {
        &self.verses
    }

    /// Every verse text segment of the chapter in reading order (embeds excluded)
    pub fn segments(&self) -> impl Iterator<Item = SegmentId> + '_ {
        self.verses.iter().flat_map(|v| v.segments().iter().copied())
    }
}

/// A fully materialized run: the segment arena plus its chapter structure
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    arena: SegmentArena,
    chapters: Vec<Chapter>,
}

impl Document {
    pub fn new(arena: SegmentArena, chapters: Vec<Chapter>) -> Self {
        Self { arena, chapters }
    }

    /// Start building from a marker/text event stream
    pub fn builder() -> DocumentBuilder {
        DocumentBuilder::default()
    }

    pub fn arena(&self) -> &SegmentArena {
        &self.arena
    }

    pub fn arena_mut(&mut self) -> &mut SegmentArena {
        &mut self.arena
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    /// Mutable arena alongside the chapter structure that indexes into it
    pub fn parts_mut(&mut self) -> (&mut SegmentArena, &[Chapter]) {
        (&mut self.arena, &self.chapters)
    }

    /// Split into the arena and the chapters
    pub fn into_parts(self) -> (SegmentArena, Vec<Chapter>) {
        (self.arena, self.chapters)
    }

    /// Text of one segment
    pub fn text(&self, id: SegmentId) -> &str {
        self.arena.get(id).text()
    }
}

/// Builds a [`Document`] from structural events in reading order
///
/// Verse text segments are linked to their neighbours within a verse, never
/// across a verse boundary. Embed segments are linked only within their embed.
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    arena: SegmentArena,
    chapters: Vec<Chapter>,
    verses: Vec<Verse>,
    verse_segments: Vec<SegmentId>,
    verse_embeds: Vec<Embed>,
    next_segment: TextSegmentBuilder,
    embed: Option<(Vec<SegmentId>, TextSegmentBuilder)>,
    in_chapter: bool,
}

impl DocumentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A chapter starts; pending markers are discarded
    ///
    /// Every chapter marker yields a chapter, even one without text, so
    /// chapter indices follow the input.
    pub fn chapter(&mut self) -> &mut Self {
        self.close_chapter();
        self.in_chapter = true;
        self.next_segment = TextSegmentBuilder::default().preceding_marker(MarkerType::Chapter);
        self
    }

    /// A verse starts
    pub fn verse(&mut self) -> &mut Self {
        self.close_verse();
        self.marker(MarkerType::Verse)
    }

    /// A paragraph starts
    pub fn paragraph(&mut self) -> &mut Self {
        self.marker(MarkerType::Paragraph)
    }

    /// An inline character style starts or ends
    pub fn character(&mut self) -> &mut Self {
        self.marker(MarkerType::Character)
    }

    /// Embedded content starts; text until [`Self::end_embed`] belongs to it
    pub fn start_embed(&mut self) -> &mut Self {
        let builder = TextSegmentBuilder::default().preceding_marker(MarkerType::Embed);
        self.embed = Some((Vec::new(), builder));
        self
    }

    /// Embedded content ends
    pub fn end_embed(&mut self) -> &mut Self {
        if let Some((segments, _)) = self.embed.take() {
            if !segments.is_empty() {
                self.verse_embeds.push(Embed::new(segments));
            }
        }
        self
    }

    /// A run of text; returns its id unless the text is empty
    pub fn text(&mut self, text: &str) -> Option<SegmentId> {
        if text.is_empty() {
            return None;
        }
        if let Some((segments, builder)) = self.embed.as_mut() {
            let segment = std::mem::take(builder).text(text).build();
            let id = self.arena.push(segment);
            if let Some(&previous) = segments.last() {
                self.arena.link(&[previous, id]);
            }
            segments.push(id);
            return Some(id);
        }

        let segment = std::mem::take(&mut self.next_segment).text(text).build();
        let id = self.arena.push(segment);
        if let Some(&previous) = self.verse_segments.last() {
            self.arena.link(&[previous, id]);
        }
        self.verse_segments.push(id);
        Some(id)
    }

    /// Finish and return the document
    pub fn build(mut self) -> Document {
        self.end_embed();
        self.close_chapter();
        Document::new(self.arena, self.chapters)
    }

    fn close_chapter(&mut self) {
        self.close_verse();
        if self.in_chapter || !self.verses.is_empty() {
            let verses = std::mem::take(&mut self.verses);
            self.chapters.push(Chapter::new(verses));
        }
    }

    fn marker(&mut self, marker: MarkerType) -> &mut Self {
        match self.embed.as_mut() {
            Some((_, builder)) => builder.add_preceding_marker(marker),
            None => self.next_segment.add_preceding_marker(marker),
        }
        self
    }

    fn close_verse(&mut self) {
        self.end_embed();
        let segments = std::mem::take(&mut self.verse_segments);
        let mut verse = Verse::new(&mut self.arena, segments);
        verse.embeds = std::mem::take(&mut self.verse_embeds);
        if !verse.is_empty() {
            self.verses.push(verse);
        }
    }
}
