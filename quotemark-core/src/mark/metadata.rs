use crate::convention::{QuotationMarkDirection, QuoteConvention};
use crate::error::Result;
use crate::segment::{SegmentArena, SegmentId};

/// A quotation mark with its resolved depth and direction
///
/// Produced by resolvers. Only the updater's offset adjustment changes it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QuotationMarkMetadata {
    quotation_mark: String,
    depth: usize,
    direction: QuotationMarkDirection,
    segment: SegmentId,
    start_index: usize,
    end_index: usize,
}

impl QuotationMarkMetadata {
    pub fn new(
        quotation_mark: impl Into<String>,
        depth: usize,
        direction: QuotationMarkDirection,
        segment: SegmentId,
        start_index: usize,
        end_index: usize,
    ) -> Self {
        Self {
            quotation_mark: quotation_mark.into(),
            depth,
            direction,
            segment,
            start_index,
            end_index,
        }
    }

    pub fn quotation_mark(&self) -> &str {
        &self.quotation_mark
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn direction(&self) -> QuotationMarkDirection {
        self.direction
    }

    pub fn segment(&self) -> SegmentId {
        self.segment
    }

    pub fn start_index(&self) -> usize {
        self.start_index
    }

    pub fn end_index(&self) -> usize {
        self.end_index
    }

    /// Shift both offsets by `delta` characters
    pub fn shift_indices(&mut self, delta: isize) {
        self.start_index = self.start_index.saturating_add_signed(delta);
        self.end_index = self.end_index.saturating_add_signed(delta);
    }

    /// Rewrite the mark in its segment with `target`'s mark for the same depth and direction
    ///
    /// Returns the change in segment length, in characters.
    pub fn update_quotation_mark(
        &mut self,
        arena: &mut SegmentArena,
        target: &QuoteConvention,
    ) -> Result<isize> {
        let Some(replacement) = target.cycled_quotation_mark(self.depth, self.direction) else {
            return Ok(0);
        };
        if replacement == self.quotation_mark {
            return Ok(0);
        }

        arena
            .get_mut(self.segment)
            .replace_substring(self.start_index, self.end_index, replacement)?;

        let old_length = self.quotation_mark.chars().count() as isize;
        let new_length = replacement.chars().count() as isize;
        let delta = new_length - old_length;
        self.end_index = self.end_index.saturating_add_signed(delta);
        self.quotation_mark = replacement.to_string();
        Ok(delta)
    }
}
