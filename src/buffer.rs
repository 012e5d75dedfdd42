//! Source text storage and derived statistics.

/// Character, word and line counts for a piece of text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextStats {
    /// Number of Unicode scalar values
    pub chars: usize,
    /// Number of whitespace-delimited tokens
    pub words: usize,
    /// Number of newline-delimited segments (a trailing partial line counts)
    pub lines: usize,
}

impl TextStats {
    /// Compute statistics for the given text.
    ///
    /// ## Example
    ///
    /// ```rust
    /// use rapstar_core::TextStats;
    ///
    /// let stats = TextStats::compute("one two\nthree\n");
    /// assert_eq!(stats.chars, 14);
    /// assert_eq!(stats.words, 3);
    /// assert_eq!(stats.lines, 2);
    /// ```
    pub fn compute(text: &str) -> Self {
        Self {
            chars: text.chars().count(),
            words: text.split_whitespace().count(),
            lines: text.lines().count(),
        }
    }

    /// Format the counts the way the status bars show them.
    pub fn summary(&self) -> String {
        format!(
            "{} chars • {} words • {} lines",
            self.chars, self.words, self.lines
        )
    }
}

/// Decode raw bytes as UTF-8, replacing invalid sequences.
///
/// Loading never fails on bad encodings; the damaged bytes simply become
/// `U+FFFD` in the resulting text.
pub fn decode_lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// The user-supplied text and its statistics.
///
/// Statistics are recomputed on every mutation so they can never go stale.
/// A running playback session holds its own snapshot, so editing the buffer
/// does not affect it.
#[derive(Clone, Debug, Default)]
pub struct TextBuffer {
    text: String,
    stats: TextStats,
}

impl TextBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a buffer holding `text`.
    pub fn with_text(text: impl Into<String>) -> Self {
        let mut buffer = Self::new();
        buffer.set_text(text);
        buffer
    }

    /// Replace the buffer contents.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.stats = TextStats::compute(&self.text);
        tracing::trace!(chars = self.stats.chars, lines = self.stats.lines, "buffer text replaced");
    }

    /// Replace the buffer contents from raw bytes, decoding lossily.
    pub fn load_bytes(&mut self, bytes: &[u8]) {
        self.set_text(decode_lossy(bytes));
    }

    /// Remove all text.
    pub fn clear(&mut self) {
        self.set_text(String::new());
    }

    /// The current raw text.
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The current statistics.
    #[inline]
    pub fn stats(&self) -> TextStats {
        self.stats
    }

    /// Check if the text is empty or whitespace only.
    #[inline]
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Check if there is anything worth persisting.
    #[inline]
    pub fn has_exportable_text(&self) -> bool {
        !self.is_blank()
    }

    /// Return the raw text verbatim for the shell to persist.
    pub fn export_text(&self) -> String {
        self.text.clone()
    }
}
