//! Text segment model
//!
//! Marker-tagged text runs, linked through indices into a per-run
//! [`SegmentArena`], and the chapter/verse structure built over them.

mod structure;
mod text_segment;

pub use structure::{Chapter, Document, DocumentBuilder, Embed, Verse};
pub use text_segment::{MarkerType, SegmentArena, SegmentId, TextSegment, TextSegmentBuilder};
