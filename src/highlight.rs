//! Case-insensitive search highlighting over escaped text.
//!
//! Matching always runs on the raw text, so a term can never match inside
//! an escape entity. The output is the escaped text with every match wrapped
//! in [`MARK_OPEN`]/[`MARK_CLOSE`].

use std::ops::Range;

/// Opening tag inserted before each match.
pub const MARK_OPEN: &str = "<mark>";
/// Closing tag inserted after each match.
pub const MARK_CLOSE: &str = "</mark>";

/// A single match location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Span {
    /// Byte range of the match in the raw text
    pub source: Range<usize>,
    /// Byte range of the escaped match inside [`MarkedText::display`]
    pub display: Range<usize>,
}

/// Escaped text with match spans marked.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MarkedText {
    /// Escaped text with matches wrapped in mark tags
    pub display: String,
    /// Matches in left-to-right order, never overlapping
    pub spans: Vec<Span>,
}

impl MarkedText {
    /// Number of matches.
    #[inline]
    pub fn match_count(&self) -> usize {
        self.spans.len()
    }

    /// Check if any match was found.
    #[inline]
    pub fn has_matches(&self) -> bool {
        !self.spans.is_empty()
    }
}

/// Append `text` to `out`, escaping markup-significant characters.
pub fn push_escaped(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
}

/// Escape markup-significant characters.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    push_escaped(&mut out, text);
    out
}

/// Check whether a term selects anything at all.
#[inline]
pub fn is_blank_term(term: &str) -> bool {
    term.trim().is_empty()
}

#[inline]
fn chars_match(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

/// Outcome of testing for a match at one position.
enum MatchAt {
    /// Match of the given byte length
    Match(usize),
    /// No match starts here
    Miss,
    /// The text ran out before the term could be decided
    Pending,
}

fn match_at(text: &str, at: usize, needle: &[char]) -> MatchAt {
    let mut chars = text[at..].char_indices();
    for &n in needle {
        match chars.next() {
            Some((_, c)) if chars_match(c, n) => {}
            Some(_) => return MatchAt::Miss,
            None => return MatchAt::Pending,
        }
    }
    MatchAt::Match(chars.next().map_or(text.len() - at, |(i, _)| i))
}

#[inline]
fn char_len_at(text: &str, at: usize) -> usize {
    text[at..].chars().next().map_or(1, char::len_utf8)
}

/// Find all non-overlapping case-insensitive matches, left to right.
///
/// Returns byte ranges into `text`. A blank term matches nothing.
///
/// ## Example
///
/// ```rust
/// use rapstar_core::highlight::find_matches;
///
/// let matches = find_matches("cat CAT Cat", "cat");
/// assert_eq!(matches, vec![0..3, 4..7, 8..11]);
/// ```
pub fn find_matches(text: &str, term: &str) -> Vec<Range<usize>> {
    if is_blank_term(term) {
        return Vec::new();
    }
    let needle: Vec<char> = term.chars().collect();
    let mut results = Vec::new();
    let mut pos = 0;
    while pos < text.len() {
        match match_at(text, pos, &needle) {
            MatchAt::Match(len) => {
                results.push(pos..pos + len);
                pos += len;
            }
            MatchAt::Miss => pos += char_len_at(text, pos),
            MatchAt::Pending => break,
        }
    }
    results
}

/// Find the first match starting at or after byte offset `from`.
pub fn find_next(text: &str, term: &str, from: usize) -> Option<Range<usize>> {
    find_matches(text, term)
        .into_iter()
        .find(|range| range.start >= from)
}

/// Find the last match ending at or before byte offset `before`.
pub fn find_prev(text: &str, term: &str, before: usize) -> Option<Range<usize>> {
    find_matches(text, term)
        .into_iter()
        .rev()
        .find(|range| range.end <= before)
}

/// Escape `text` and mark every case-insensitive occurrence of `term`.
///
/// A blank term returns the escaped text with no spans.
///
/// ## Example
///
/// ```rust
/// use rapstar_core::highlight::render;
///
/// let marked = render("a<b> AB", "ab");
/// assert_eq!(marked.display, "a&lt;b&gt; <mark>AB</mark>");
/// assert_eq!(marked.match_count(), 1);
/// ```
pub fn render(text: &str, term: &str) -> MarkedText {
    IncrementalHighlighter::new().render(text, term)
}

/// Highlighter that extends its previous output as the text grows.
///
/// Feed it successively longer prefixes of the same text. Matching state is
/// kept up to the last position a match could still be decided, so each call
/// only scans the newly revealed part. The output is identical to [`render`].
/// Changing the term, or passing a text that does not start with the part
/// already scanned, starts over.
#[derive(Clone, Debug, Default)]
pub struct IncrementalHighlighter {
    term: String,
    needle: Vec<char>,
    /// Byte offset in the source where scanning resumes
    scanned: usize,
    /// Raw source for `..scanned`
    source: String,
    /// Escaped and marked output for `..scanned`
    committed: String,
    spans: Vec<Span>,
}

impl IncrementalHighlighter {
    /// Create an empty highlighter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget all cached output.
    pub fn reset(&mut self) {
        self.term.clear();
        self.needle.clear();
        self.scanned = 0;
        self.source.clear();
        self.committed.clear();
        self.spans.clear();
    }

    fn restart(&mut self, term: &str) {
        self.reset();
        self.term.push_str(term);
        if !is_blank_term(term) {
            self.needle = term.chars().collect();
        }
    }

    /// Render `text`, reusing work from the previous call when possible.
    pub fn render(&mut self, text: &str, term: &str) -> MarkedText {
        if term != self.term || text.get(..self.scanned) != Some(self.source.as_str()) {
            self.restart(term);
        }

        if self.needle.is_empty() {
            push_escaped(&mut self.committed, &text[self.scanned..]);
            self.source.push_str(&text[self.scanned..]);
            self.scanned = text.len();
        } else {
            while self.scanned < text.len() {
                match match_at(text, self.scanned, &self.needle) {
                    MatchAt::Match(len) => {
                        let matched = &text[self.scanned..self.scanned + len];
                        self.committed.push_str(MARK_OPEN);
                        let start = self.committed.len();
                        push_escaped(&mut self.committed, matched);
                        let end = self.committed.len();
                        self.committed.push_str(MARK_CLOSE);
                        self.spans.push(Span {
                            source: self.scanned..self.scanned + len,
                            display: start..end,
                        });
                        self.source.push_str(matched);
                        self.scanned += len;
                    }
                    MatchAt::Miss => {
                        let len = char_len_at(text, self.scanned);
                        let unit = &text[self.scanned..self.scanned + len];
                        push_escaped(&mut self.committed, unit);
                        self.source.push_str(unit);
                        self.scanned += len;
                    }
                    MatchAt::Pending => break,
                }
            }
        }

        let mut display = self.committed.clone();
        push_escaped(&mut display, &text[self.scanned..]);
        MarkedText {
            display,
            spans: self.spans.clone(),
        }
    }
}
