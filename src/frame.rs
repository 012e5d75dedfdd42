//! Frames emitted by the playback loop.

use std::sync::Arc;

use crate::highlight::MarkedText;

/// One rendered snapshot of the in-progress reveal.
#[derive(Clone, Debug)]
pub struct Frame {
    /// Full session snapshot
    source: Arc<str>,
    /// Byte length of the visible prefix
    visible: usize,
    /// Units revealed so far
    position: usize,
    /// Units in the snapshot
    total: usize,
    /// Visible prefix with highlighting applied
    marked: MarkedText,
    /// Whether the blinking cursor follows the text
    active_cursor: bool,
}

impl Frame {
    pub(crate) fn new(source: Arc<str>, visible: usize, position: usize, total: usize, marked: MarkedText) -> Self {
        Self {
            source,
            visible,
            position,
            total,
            marked,
            active_cursor: position < total,
        }
    }

    /// The visible prefix without any markup.
    #[inline]
    pub fn plain(&self) -> &str {
        &self.source[..self.visible]
    }

    /// The visible prefix, escaped and highlighted.
    #[inline]
    pub fn marked(&self) -> &MarkedText {
        &self.marked
    }

    /// Units revealed so far.
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Units in the whole snapshot.
    #[inline]
    pub fn total(&self) -> usize {
        self.total
    }

    /// Whether this frame should show the active cursor marker.
    #[inline]
    pub fn has_cursor(&self) -> bool {
        self.active_cursor
    }

    /// Check if this is the last frame of a completed session.
    #[inline]
    pub fn is_final(&self) -> bool {
        self.position == self.total
    }

    /// Get the position as a fraction (0.0 - 1.0).
    pub fn progress(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.position as f64 / self.total as f64
    }
}
