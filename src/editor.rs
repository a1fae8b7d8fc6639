//! Pattern editor buffer: line-based text with a cursor that notifies
//! subscribers after every edit.

use std::fmt;

/// Callback receiving the full document text after a change.
pub type ChangeCallback = Box<dyn FnMut(&str)>;

/// The editing surface the highlight core reads from.
pub trait DocumentSource {
    /// The whole document.
    fn text(&self) -> String;

    /// Register a callback invoked after every change.
    fn on_change(&mut self, callback: ChangeCallback);
}

/// A minimal editor for pattern source.
///
/// Columns are byte offsets within the line and always sit on char boundaries.
pub struct Editor {
    lines: Vec<String>,
    cursor_row: usize,
    cursor_col: usize,
    listeners: Vec<ChangeCallback>,
}

impl Editor {
    /// Create an editor with initial content.
    pub fn new(content: &str) -> Self {
        Self {
            lines: content.split('\n').map(str::to_string).collect(),
            cursor_row: 0,
            cursor_col: 0,
            listeners: Vec::new(),
        }
    }

    /// Get all lines.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Get cursor position (row, col).
    pub fn cursor(&self) -> (usize, usize) {
        (self.cursor_row, self.cursor_col)
    }

    /// Number of lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Place the cursor, clamped to the buffer.
    pub fn set_cursor(&mut self, row: usize, col: usize) {
        self.cursor_row = row.min(self.lines.len() - 1);
        self.cursor_col = floor_boundary(&self.lines[self.cursor_row], col);
    }

    /// Insert a character at the cursor.
    pub fn insert_char(&mut self, c: char) {
        let line = &mut self.lines[self.cursor_row];
        line.insert(self.cursor_col, c);
        self.cursor_col += c.len_utf8();
        self.notify();
    }

    /// Insert text at the cursor, splitting lines at `\n`.
    pub fn insert_str(&mut self, text: &str) {
        let rest = self.lines[self.cursor_row].split_off(self.cursor_col);
        let mut pieces = text.split('\n');
        if let Some(first) = pieces.next() {
            self.lines[self.cursor_row].push_str(first);
            self.cursor_col = self.lines[self.cursor_row].len();
        }
        for piece in pieces {
            self.cursor_row += 1;
            self.lines.insert(self.cursor_row, piece.to_string());
            self.cursor_col = piece.len();
        }
        self.lines[self.cursor_row].push_str(&rest);
        self.notify();
    }

    /// Split the line at the cursor.
    pub fn newline(&mut self) {
        let rest = self.lines[self.cursor_row].split_off(self.cursor_col);
        self.cursor_row += 1;
        self.lines.insert(self.cursor_row, rest);
        self.cursor_col = 0;
        self.notify();
    }

    /// Delete character before cursor (backspace).
    pub fn backspace(&mut self) {
        if self.cursor_col > 0 {
            let line = &mut self.lines[self.cursor_row];
            let prev = prev_boundary(line, self.cursor_col);
            line.replace_range(prev..self.cursor_col, "");
            self.cursor_col = prev;
        } else if self.cursor_row > 0 {
            let current = self.lines.remove(self.cursor_row);
            self.cursor_row -= 1;
            self.cursor_col = self.lines[self.cursor_row].len();
            self.lines[self.cursor_row].push_str(&current);
        } else {
            return;
        }
        self.notify();
    }

    /// Delete character at cursor.
    pub fn delete(&mut self) {
        let line_len = self.lines[self.cursor_row].len();
        if self.cursor_col < line_len {
            let line = &mut self.lines[self.cursor_row];
            let next = next_boundary(line, self.cursor_col);
            line.replace_range(self.cursor_col..next, "");
        } else if self.cursor_row + 1 < self.lines.len() {
            let next_line = self.lines.remove(self.cursor_row + 1);
            self.lines[self.cursor_row].push_str(&next_line);
        } else {
            return;
        }
        self.notify();
    }

    /// Move cursor left.
    pub fn move_left(&mut self) {
        if self.cursor_col > 0 {
            self.cursor_col = prev_boundary(&self.lines[self.cursor_row], self.cursor_col);
        } else if self.cursor_row > 0 {
            self.cursor_row -= 1;
            self.cursor_col = self.lines[self.cursor_row].len();
        }
    }

    /// Move cursor right.
    pub fn move_right(&mut self) {
        let line = &self.lines[self.cursor_row];
        if self.cursor_col < line.len() {
            self.cursor_col = next_boundary(line, self.cursor_col);
        } else if self.cursor_row + 1 < self.lines.len() {
            self.cursor_row += 1;
            self.cursor_col = 0;
        }
    }

    /// Move cursor up.
    pub fn move_up(&mut self) {
        if self.cursor_row > 0 {
            self.cursor_row -= 1;
            self.cursor_col = floor_boundary(&self.lines[self.cursor_row], self.cursor_col);
        }
    }

    /// Move cursor down.
    pub fn move_down(&mut self) {
        if self.cursor_row + 1 < self.lines.len() {
            self.cursor_row += 1;
            self.cursor_col = floor_boundary(&self.lines[self.cursor_row], self.cursor_col);
        }
    }

    /// Replace all content and reset the cursor.
    pub fn set_content(&mut self, content: &str) {
        self.lines = content.split('\n').map(str::to_string).collect();
        self.cursor_row = 0;
        self.cursor_col = 0;
        self.notify();
    }

    fn notify(&mut self) {
        if self.listeners.is_empty() {
            return;
        }
        let text = self.lines.join("\n");
        for listener in &mut self.listeners {
            listener(&text);
        }
    }
}

impl DocumentSource for Editor {
    fn text(&self) -> String {
        self.lines.join("\n")
    }

    fn on_change(&mut self, callback: ChangeCallback) {
        self.listeners.push(callback);
    }
}

impl fmt::Debug for Editor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Editor")
            .field("lines", &self.lines)
            .field("cursor_row", &self.cursor_row)
            .field("cursor_col", &self.cursor_col)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

fn prev_boundary(line: &str, col: usize) -> usize {
    line[..col]
        .char_indices()
        .next_back()
        .map(|(i, _)| i)
        .unwrap_or(0)
}

fn next_boundary(line: &str, col: usize) -> usize {
    line[col..]
        .chars()
        .next()
        .map(|c| col + c.len_utf8())
        .unwrap_or(col)
}

fn floor_boundary(line: &str, col: usize) -> usize {
    let mut col = col.min(line.len());
    while !line.is_char_boundary(col) {
        col -= 1;
    }
    col
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn new_with_content() {
        let ed = Editor::new("hello\nworld");
        assert_eq!(ed.line_count(), 2);
        assert_eq!(ed.lines()[0], "hello");
        assert_eq!(ed.lines()[1], "world");
    }

    #[test]
    fn text_round_trip_keeps_trailing_newline() {
        let src = "setcps(1)\ns(\"bd\")\n";
        let ed = Editor::new(src);
        assert_eq!(ed.text(), src);
    }

    #[test]
    fn insert_char() {
        let mut ed = Editor::new("");
        ed.insert_char('a');
        ed.insert_char('é');
        assert_eq!(ed.text(), "aé");
        assert_eq!(ed.cursor(), (0, 3));
    }

    #[test]
    fn insert_str_splits_lines() {
        let mut ed = Editor::new("s()");
        ed.set_cursor(0, 2);
        ed.insert_str("\"bd\n  sd\"");
        assert_eq!(ed.text(), "s(\"bd\n  sd\")");
        assert_eq!(ed.cursor(), (1, 5));
    }

    #[test]
    fn newline_splits_line() {
        let mut ed = Editor::new("hello");
        ed.set_cursor(0, 3);
        ed.newline();
        assert_eq!(ed.lines()[0], "hel");
        assert_eq!(ed.lines()[1], "lo");
        assert_eq!(ed.cursor(), (1, 0));
    }

    #[test]
    fn backspace_removes_multibyte_char() {
        let mut ed = Editor::new("aéb");
        ed.set_cursor(0, 3);
        ed.backspace();
        assert_eq!(ed.text(), "ab");
        assert_eq!(ed.cursor(), (0, 1));
    }

    #[test]
    fn backspace_joins_lines() {
        let mut ed = Editor::new("hello\nworld");
        ed.set_cursor(1, 0);
        ed.backspace();
        assert_eq!(ed.text(), "helloworld");
        assert_eq!(ed.cursor(), (0, 5));
    }

    #[test]
    fn delete_joins_next_line() {
        let mut ed = Editor::new("hello\nworld");
        ed.set_cursor(0, 5);
        ed.delete();
        assert_eq!(ed.text(), "helloworld");
    }

    #[test]
    fn cursor_movement_clamps() {
        let mut ed = Editor::new("short\nlonger line");
        ed.set_cursor(1, 10);
        ed.move_up();
        assert_eq!(ed.cursor(), (0, 5));
        ed.move_right();
        assert_eq!(ed.cursor(), (1, 0));
        ed.move_left();
        assert_eq!(ed.cursor(), (0, 5));
        ed.move_down();
        assert_eq!(ed.cursor(), (1, 5));
    }

    #[test]
    fn listeners_receive_text_after_each_edit() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut ed = Editor::new("ab");
        ed.on_change(Box::new(move |text| sink.borrow_mut().push(text.to_string())));

        ed.set_cursor(0, 2);
        ed.insert_char('c');
        ed.backspace();
        ed.move_left();
        ed.set_content("x\ny");

        assert_eq!(*seen.borrow(), vec!["abc", "ab", "x\ny"]);
    }

    #[test]
    fn no_op_edits_do_not_notify() {
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);
        let mut ed = Editor::new("a");
        ed.on_change(Box::new(move |_| *sink.borrow_mut() += 1));
        ed.backspace();
        ed.set_cursor(0, 1);
        ed.delete();
        assert_eq!(*count.borrow(), 0);
    }
}
