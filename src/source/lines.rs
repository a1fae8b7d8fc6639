//! Document line table: byte offsets of every line in a text buffer.

/// One document line, without its terminating `\n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLine {
    /// Zero-based line number.
    pub index: usize,
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
}

impl SourceLine {
    /// The line's text within `document`.
    pub fn text<'a>(&self, document: &'a str) -> &'a str {
        &document[self.start..self.end]
    }

    /// Byte offset of the first non-whitespace character (or `end` for a blank line).
    pub fn indent_end(&self, document: &str) -> usize {
        let text = self.text(document);
        self.start + (text.len() - text.trim_start().len())
    }
}

/// Split a document into lines. An empty document still has one (empty) line,
/// and a trailing newline yields a final empty line.
pub fn split_lines(document: &str) -> Vec<SourceLine> {
    let mut lines = Vec::new();
    let mut start = 0;
    for (index, text) in document.split('\n').enumerate() {
        lines.push(SourceLine {
            index,
            start,
            end: start + text.len(),
        });
        start += text.len() + 1;
    }
    lines
}
