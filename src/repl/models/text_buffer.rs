//! # Text Buffer
//!
//! Backing store for one region: lines of text, a cursor, and a scroll
//! origin. Columns are counted in characters, not bytes.

/// Cursor or origin coordinates inside a buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BufferPosition {
    pub row: usize,
    pub col: usize,
}

impl BufferPosition {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBuffer {
    lines: Vec<String>,
    cursor: BufferPosition,
    origin: BufferPosition,
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

fn byte_index(line: &str, col: usize) -> usize {
    line.char_indices()
        .nth(col)
        .map(|(idx, _)| idx)
        .unwrap_or(line.len())
}

impl TextBuffer {
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
            cursor: BufferPosition::default(),
            origin: BufferPosition::default(),
        }
    }

    /// Buffer holding `text` with the cursor after its last character
    pub fn with_text(text: &str) -> Self {
        let mut buffer = Self::new();
        buffer.set_text(text);
        buffer
    }

    /// Replace the whole content, move the cursor to the end and reset scrolling
    pub fn set_text(&mut self, text: &str) {
        self.lines = text.split('\n').map(str::to_string).collect();
        self.origin = BufferPosition::default();
        self.move_to_buffer_end();
    }

    pub fn clear(&mut self) {
        self.set_text("");
    }

    /// Full content with lines joined by `\n`
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Content with surrounding whitespace removed, as fields are read
    pub fn value(&self) -> String {
        self.text().trim().to_string()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.len() == 1 && self.lines[0].is_empty()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn line(&self, row: usize) -> Option<&str> {
        self.lines.get(row).map(String::as_str)
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    fn line_len(&self, row: usize) -> usize {
        self.lines.get(row).map_or(0, |line| line.chars().count())
    }

    pub fn cursor(&self) -> BufferPosition {
        self.cursor
    }

    /// Place the cursor, clamped to existing content
    pub fn set_cursor(&mut self, row: usize, col: usize) {
        let row = row.min(self.lines.len() - 1);
        let col = col.min(self.line_len(row));
        self.cursor = BufferPosition::new(row, col);
    }

    pub fn origin(&self) -> BufferPosition {
        self.origin
    }

    pub fn set_origin(&mut self, row: usize, col: usize) {
        self.origin = BufferPosition::new(row, col);
    }

    /// Text on the cursor line up to the cursor
    pub fn text_before_cursor(&self) -> &str {
        let line = &self.lines[self.cursor.row];
        &line[..byte_index(line, self.cursor.col)]
    }

    pub fn is_cursor_at_end(&self) -> bool {
        self.cursor.row == self.lines.len() - 1 && self.cursor.col == self.line_len(self.cursor.row)
    }

    pub fn insert_char(&mut self, ch: char) {
        if ch == '\n' {
            self.insert_newline();
            return;
        }
        let BufferPosition { row, col } = self.cursor;
        let line = &mut self.lines[row];
        let idx = byte_index(line, col);
        line.insert(idx, ch);
        self.cursor.col += 1;
    }

    pub fn insert_str(&mut self, text: &str) {
        for ch in text.chars() {
            self.insert_char(ch);
        }
    }

    /// Split the current line at the cursor
    pub fn insert_newline(&mut self) {
        let BufferPosition { row, col } = self.cursor;
        let line = &mut self.lines[row];
        let idx = byte_index(line, col);
        let rest = line.split_off(idx);
        self.lines.insert(row + 1, rest);
        self.cursor = BufferPosition::new(row + 1, 0);
    }

    /// Delete the character before the cursor, joining lines at column zero
    pub fn delete_backward(&mut self) -> bool {
        let BufferPosition { row, col } = self.cursor;
        if col > 0 {
            let line = &mut self.lines[row];
            let idx = byte_index(line, col - 1);
            line.remove(idx);
            self.cursor.col -= 1;
            true
        } else if row > 0 {
            let current = self.lines.remove(row);
            let prev_len = self.line_len(row - 1);
            self.lines[row - 1].push_str(&current);
            self.cursor = BufferPosition::new(row - 1, prev_len);
            true
        } else {
            false
        }
    }

    /// Delete the character under the cursor, joining lines at line end
    pub fn delete_forward(&mut self) -> bool {
        let BufferPosition { row, col } = self.cursor;
        if col < self.line_len(row) {
            let line = &mut self.lines[row];
            let idx = byte_index(line, col);
            line.remove(idx);
            true
        } else if row + 1 < self.lines.len() {
            let next = self.lines.remove(row + 1);
            self.lines[row].push_str(&next);
            true
        } else {
            false
        }
    }

    /// Delete from the start of the cursor line up to the cursor
    pub fn delete_to_line_start(&mut self) -> bool {
        let BufferPosition { row, col } = self.cursor;
        if col == 0 {
            return false;
        }
        let line = &mut self.lines[row];
        let idx = byte_index(line, col);
        line.replace_range(..idx, "");
        self.cursor.col = 0;
        true
    }

    /// Delete the word before the cursor along with any spaces after it
    pub fn delete_word_backward(&mut self) -> bool {
        let before: Vec<char> = self.text_before_cursor().chars().collect();
        let spaces = before.iter().rev().take_while(|c| c.is_whitespace()).count();
        let word = before[..before.len() - spaces]
            .iter()
            .rev()
            .take_while(|c| !c.is_whitespace())
            .count();
        let count = spaces + word;
        for _ in 0..count {
            self.delete_backward();
        }
        count > 0
    }

    pub fn move_left(&mut self) {
        let BufferPosition { row, col } = self.cursor;
        if col > 0 {
            self.cursor.col -= 1;
        } else if row > 0 {
            self.cursor = BufferPosition::new(row - 1, self.line_len(row - 1));
        }
    }

    pub fn move_right(&mut self) {
        let BufferPosition { row, col } = self.cursor;
        if col < self.line_len(row) {
            self.cursor.col += 1;
        } else if row + 1 < self.lines.len() {
            self.cursor = BufferPosition::new(row + 1, 0);
        }
    }

    pub fn move_up(&mut self) {
        if self.cursor.row > 0 {
            let row = self.cursor.row - 1;
            self.set_cursor(row, self.cursor.col);
        }
    }

    /// Move down one line; a no-op on the last line
    pub fn move_down(&mut self) {
        if self.cursor.row + 1 < self.lines.len() {
            let row = self.cursor.row + 1;
            self.set_cursor(row, self.cursor.col);
        }
    }

    pub fn move_to_line_start(&mut self) {
        self.cursor.col = 0;
    }

    pub fn move_to_line_end(&mut self) {
        self.cursor.col = self.line_len(self.cursor.row);
    }

    pub fn move_to_buffer_start(&mut self) {
        self.cursor = BufferPosition::default();
        self.origin = BufferPosition::default();
    }

    pub fn move_to_buffer_end(&mut self) {
        let row = self.lines.len() - 1;
        self.cursor = BufferPosition::new(row, self.line_len(row));
    }

    /// Drop trailing empty lines, keeping the cursor inside the content
    pub fn trim_trailing_newlines(&mut self) -> bool {
        let mut trimmed = false;
        while self.lines.len() > 1 && self.lines.last().is_some_and(String::is_empty) {
            self.lines.pop();
            trimmed = true;
        }
        if trimmed {
            let BufferPosition { row, col } = self.cursor;
            self.set_cursor(row, col);
        }
        trimmed
    }

    /// Adjust the origin so the cursor sits inside a `width` x `height` viewport
    pub fn scroll_to_cursor(&mut self, width: usize, height: usize) {
        if width == 0 || height == 0 {
            return;
        }
        let BufferPosition { row, col } = self.cursor;
        if row < self.origin.row {
            self.origin.row = row;
        } else if row >= self.origin.row + height {
            self.origin.row = row + 1 - height;
        }
        if col < self.origin.col {
            self.origin.col = col;
        } else if col >= self.origin.col + width {
            self.origin.col = col + 1 - width;
        }
    }

    /// Scroll the origin vertically without moving the cursor
    pub fn scroll_by(&mut self, delta: isize) {
        let max_row = self.lines.len().saturating_sub(1);
        let row = self.origin.row.saturating_add_signed(delta).min(max_row);
        self.origin.row = row;
    }
}
