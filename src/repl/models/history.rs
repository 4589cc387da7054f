//! # Request History
//!
//! Append-only log of completed exchanges with a cursor that defaults to
//! the newest entry. Navigation only moves the cursor.

use super::request_model::Request;

pub const EMPTY_HISTORY: &str = "[!] No items in history";

#[derive(Debug, Clone, Default)]
pub struct History {
    entries: Vec<Request>,
    cursor: usize,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry and point the cursor at it
    pub fn push(&mut self, request: Request) {
        self.entries.push(request);
        self.cursor = self.entries.len() - 1;
        tracing::debug!("history: {} entries, cursor {}", self.entries.len(), self.cursor);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Entry under the cursor
    pub fn current(&self) -> Option<&Request> {
        self.entries.get(self.cursor)
    }

    /// Move the cursor to `index`; out-of-range indices are ignored
    pub fn recall(&mut self, index: usize) -> Option<&Request> {
        if index >= self.entries.len() {
            return None;
        }
        self.cursor = index;
        self.entries.get(index)
    }

    /// One summary line per entry, as listed in the history popup
    pub fn summary_lines(&self) -> Vec<String> {
        if self.entries.is_empty() {
            return vec![EMPTY_HISTORY.to_string()];
        }
        self.entries
            .iter()
            .enumerate()
            .map(|(i, request)| summarize(i, request))
            .collect()
    }
}

fn summarize(index: usize, request: &Request) -> String {
    let mut line = format!("[{index:02}] {} {}", request.method, request.url);
    if !request.get_params.is_empty() {
        line.push('?');
        line.push_str(&request.get_params.replace('\n', "&"));
    }
    if !request.data.is_empty() {
        line.push(' ');
        line.push_str(&request.data.replace('\n', "&"));
    }
    if !request.headers.is_empty() {
        line.push(' ');
        line.push_str(&request.headers.replace('\n', ";"));
    }
    line
}
