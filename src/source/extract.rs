//! Block extractor: splits a document into setup statements and ordered
//! pattern blocks.
//!
//! Lines are scanned top to bottom. Setup-only lines are recorded as setup
//! statements; any other non-blank line starts a block, which keeps
//! absorbing lines while the expression is visibly unfinished (open
//! brackets, a trailing separator, or a `.method()` continuation).
//! Unbalanced input never fails: an unclosed bracket simply extends the
//! block to the end of the document.

use super::classify::{classify, ends_with_separator, starts_with_continuation, LineKind};
use super::lines::{split_lines, SourceLine};
use super::scanner::{BracketScanner, LineScan};
use super::segment::{build_block, PatternBlock};

/// A setup statement, trimmed and stripped of any trailing comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupLine {
    /// Zero-based document line.
    pub line: usize,
    /// Statement text as it will appear in the setup code.
    pub text: String,
    /// Document offset of the first character of `text`.
    pub doc_from: usize,
    /// Document offset one past the last character of `text`.
    pub doc_to: usize,
}

/// A document line that contributes to a pattern block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContributingLine {
    pub line: SourceLine,
    /// Where the line's code ends: the line end, or the last non-blank
    /// character before a trailing `//` comment.
    pub code_end: usize,
}

/// The run of lines forming one pattern block, before segments are built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockLines {
    pub start_line: usize,
    pub lines: Vec<ContributingLine>,
}

/// The result of extracting a whole document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub setup: Vec<SetupLine>,
    pub blocks: Vec<PatternBlock>,
}

/// Extract setup statements and pattern blocks from a document.
pub fn extract(document: &str) -> Extraction {
    let lines = split_lines(document);
    let mut extraction = Extraction::default();
    let mut i = 0;

    while i < lines.len() {
        match classify(lines[i].text(document)) {
            LineKind::Blank => i += 1,
            LineKind::Comment => i = skip_comment(document, &lines, i),
            LineKind::Setup(_) => i = take_setup(document, &lines, i, &mut extraction.setup),
            LineKind::Pattern => {
                let (run, next) = take_block(document, &lines, i);
                if let Some(block) = build_block(document, &run) {
                    extraction.blocks.push(block);
                }
                i = next;
            }
        }
    }

    extraction
}

/// Record a setup statement starting at `start`, following it across lines
/// by the same continuation rules as a block. Returns the index of the next
/// unread line.
fn take_setup(
    document: &str,
    lines: &[SourceLine],
    start: usize,
    setup: &mut Vec<SetupLine>,
) -> usize {
    let mut scanner = BracketScanner::new();
    let mut last_code = "";
    let mut j = start;

    while j < lines.len() {
        let line = lines[j];
        let text = line.text(document);
        if j > start {
            if scanner.in_code() && classify(text) == LineKind::Comment {
                j = skip_comment(document, lines, j);
                continue;
            }
            if !continues(document, lines, j, &scanner, last_code) {
                break;
            }
        }

        let scan = scanner.scan_line(text);
        let code = code_text(text, &scan).trim_end();
        let doc_from = line.indent_end(document);
        let doc_to = doc_from.max(line.start + code.len());
        if doc_from < doc_to {
            setup.push(SetupLine {
                line: line.index,
                text: document[doc_from..doc_to].to_string(),
                doc_from,
                doc_to,
            });
            last_code = code;
        }
        j += 1;
    }

    j
}

/// Collect the lines of the block starting at `start`. Returns the run and
/// the index of the first line that was not absorbed.
fn take_block(document: &str, lines: &[SourceLine], start: usize) -> (BlockLines, usize) {
    let mut scanner = BracketScanner::new();
    let mut run = BlockLines {
        start_line: start,
        lines: Vec::new(),
    };

    let first = lines[start];
    let scan = scanner.scan_line(first.text(document));
    let mut last_code = push_line(document, first, &scan, &mut run);

    let mut j = start + 1;
    while j < lines.len() {
        let line = lines[j];
        let text = line.text(document);

        // Comment lines never close a block and never contribute to it.
        if scanner.in_code() && classify(text) == LineKind::Comment {
            j = skip_comment(document, lines, j);
            continue;
        }
        if !continues(document, lines, j, &scanner, last_code) {
            break;
        }

        let scan = scanner.scan_line(text);
        let code = push_line(document, line, &scan, &mut run);
        if !code.trim().is_empty() {
            last_code = code;
        }
        j += 1;
    }

    (run, j)
}

/// Whether line `j` extends the expression scanned so far: brackets,
/// strings or comments are still open, the last code ends with a separator,
/// or the line (or the next code line, across blanks) is a `.method()`
/// continuation.
fn continues(
    document: &str,
    lines: &[SourceLine],
    j: usize,
    scanner: &BracketScanner,
    last_code: &str,
) -> bool {
    let text = lines[j].text(document);
    scanner.is_open()
        || ends_with_separator(last_code)
        || match classify(text) {
            LineKind::Blank => next_code_continues(document, lines, j + 1),
            _ => starts_with_continuation(text),
        }
}

/// Index of the first line after the comment starting at `start`. A block
/// comment is followed until it closes.
fn skip_comment(document: &str, lines: &[SourceLine], start: usize) -> usize {
    let mut scanner = BracketScanner::new();
    let mut j = start;
    while j < lines.len() {
        scanner.scan_line(lines[j].text(document));
        j += 1;
        if scanner.in_code() {
            break;
        }
    }
    j
}

/// Append a contributing line and return its code text.
fn push_line<'a>(
    document: &'a str,
    line: SourceLine,
    scan: &LineScan,
    run: &mut BlockLines,
) -> &'a str {
    let text = line.text(document);
    let code = match scan.comment_start {
        Some(_) => code_text(text, scan).trim_end(),
        None => text,
    };
    run.lines.push(ContributingLine {
        line,
        code_end: line.start + code.len(),
    });
    code
}

/// The part of a scanned line before its trailing comment.
fn code_text<'a>(text: &'a str, scan: &LineScan) -> &'a str {
    match scan.comment_start {
        Some(at) => &text[..at],
        None => text,
    }
}

/// Whether the next line holding code (skipping blanks and comments) is a
/// `.method()` continuation.
fn next_code_continues(document: &str, lines: &[SourceLine], from: usize) -> bool {
    let mut j = from;
    while j < lines.len() {
        let text = lines[j].text(document);
        match classify(text) {
            LineKind::Blank => j += 1,
            LineKind::Comment => j = skip_comment(document, lines, j),
            _ => return starts_with_continuation(text),
        }
    }
    false
}
