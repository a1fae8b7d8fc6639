//! Bracket scanner: tracks nesting depth across lines while ignoring the
//! contents of strings and comments.
//!
//! Only ASCII bytes are inspected, so scanning byte-wise is safe on UTF-8:
//! every offset it reports sits on a char boundary.

/// Lexical state that survives a line break.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Carry {
    #[default]
    Code,
    BlockComment,
    Template,
}

/// Result of scanning one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineScan {
    /// Line-relative byte offset where a trailing `//` comment starts.
    pub comment_start: Option<usize>,
    /// Bracket depth after the line.
    pub depth: u32,
}

/// Incremental scanner fed one line at a time.
#[derive(Debug, Clone, Default)]
pub struct BracketScanner {
    depth: u32,
    carry: Carry,
}

impl BracketScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current bracket depth. Stray closers never push it below zero.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Whether the next line starts in plain code (not inside a backtick
    /// string or a block comment).
    pub fn in_code(&self) -> bool {
        self.carry == Carry::Code
    }

    /// Whether the expression scanned so far is still open.
    pub fn is_open(&self) -> bool {
        self.depth > 0 || !self.in_code()
    }

    /// Scan one line (without its newline) and update the carried state.
    pub fn scan_line(&mut self, line: &str) -> LineScan {
        let bytes = line.as_bytes();
        let mut quote: Option<u8> = None;
        let mut comment_start = None;
        let mut i = 0;

        while i < bytes.len() {
            let b = bytes[i];
            let next = bytes.get(i + 1).copied();

            match self.carry {
                Carry::BlockComment => {
                    if b == b'*' && next == Some(b'/') {
                        self.carry = Carry::Code;
                        i += 2;
                    } else {
                        i += 1;
                    }
                    continue;
                }
                Carry::Template => {
                    if b == b'\\' {
                        i += 2;
                        continue;
                    }
                    if b == b'`' {
                        self.carry = Carry::Code;
                    }
                    i += 1;
                    continue;
                }
                Carry::Code => {}
            }

            if let Some(q) = quote {
                if b == b'\\' {
                    i += 2;
                    continue;
                }
                if b == q {
                    quote = None;
                }
                i += 1;
                continue;
            }

            match b {
                b'"' | b'\'' => quote = Some(b),
                b'`' => self.carry = Carry::Template,
                b'/' if next == Some(b'/') => {
                    comment_start = Some(i);
                    break;
                }
                b'/' if next == Some(b'*') => {
                    self.carry = Carry::BlockComment;
                    i += 2;
                    continue;
                }
                b'(' | b'[' | b'{' => self.depth += 1,
                b')' | b']' | b'}' => self.depth = self.depth.saturating_sub(1),
                _ => {}
            }
            i += 1;
        }

        LineScan {
            comment_start,
            depth: self.depth,
        }
    }
}
