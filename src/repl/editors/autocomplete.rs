//! # Autocomplete Layer
//!
//! After every key the token before the cursor is matched against a
//! candidate list. Matches are shown in a floating box: a single match is
//! drawn inline as the untyped suffix, several are listed in a dropdown one
//! row below the token. Enter while suggesting accepts the first match.

use super::{EditContext, Editor, EditorEffect};
use crate::repl::geometry::RegionPositions;
use crossterm::event::{KeyCode, KeyEvent};

const MAX_SUGGESTIONS_SHOWN: usize = 10;

/// Common request header names offered in the headers field
pub const REQUEST_HEADERS: &[&str] = &[
    "A-IM",
    "Accept",
    "Accept-Charset",
    "Accept-Datetime",
    "Accept-Encoding",
    "Accept-Language",
    "Access-Control-Request-Headers",
    "Access-Control-Request-Method",
    "Authorization",
    "Cache-Control",
    "Connection",
    "Content-Encoding",
    "Content-Length",
    "Content-MD5",
    "Content-Type",
    "Cookie",
    "DNT",
    "Date",
    "Expect",
    "Forwarded",
    "From",
    "Host",
    "If-Match",
    "If-Modified-Since",
    "If-None-Match",
    "If-Range",
    "If-Unmodified-Since",
    "Max-Forwards",
    "Origin",
    "Pragma",
    "Proxy-Authorization",
    "Range",
    "Referer",
    "TE",
    "Upgrade",
    "Upgrade-Insecure-Requests",
    "User-Agent",
    "Via",
    "Warning",
    "X-Correlation-ID",
    "X-Csrf-Token",
    "X-Forwarded-For",
    "X-Forwarded-Host",
    "X-Forwarded-Proto",
    "X-Http-Method-Override",
    "X-Request-ID",
    "X-Requested-With",
];

fn is_symbol_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-'
}

/// The completable token (`[a-zA-Z0-9-]+`) at the end of `text`, possibly empty
pub fn last_symbol(text: &str) -> &str {
    let start = text
        .char_indices()
        .rev()
        .take_while(|(_, c)| is_symbol_char(*c))
        .last()
        .map_or(text.len(), |(idx, _)| idx);
    &text[start..]
}

/// Candidates that strictly extend `token`
pub fn complete_from_slice(token: &str, candidates: &[&str]) -> Vec<String> {
    if token.is_empty() || token.trim_end_matches([' ', '\n']) != token {
        return Vec::new();
    }
    candidates
        .iter()
        .filter(|candidate| candidate.starts_with(token) && **candidate != token)
        .map(|candidate| candidate.to_string())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
enum AutocompleteState {
    #[default]
    Idle,
    Suggesting {
        candidates: Vec<String>,
    },
}

type Candidates = Box<dyn Fn(&str) -> Vec<String> + Send>;

pub struct AutocompleteEditor {
    inner: Box<dyn Editor>,
    candidates: Candidates,
    state: AutocompleteState,
}

impl std::fmt::Debug for AutocompleteEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutocompleteEditor")
            .field("inner", &self.inner)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl AutocompleteEditor {
    pub fn new(
        inner: Box<dyn Editor>,
        candidates: impl Fn(&str) -> Vec<String> + Send + 'static,
    ) -> Self {
        Self {
            inner,
            candidates: Box::new(candidates),
            state: AutocompleteState::Idle,
        }
    }

    pub fn is_suggesting(&self) -> bool {
        matches!(self.state, AutocompleteState::Suggesting { .. })
    }

    fn accept(ctx: &mut EditContext<'_>, candidates: &[String]) {
        let Some(first) = candidates.first() else {
            return;
        };
        let token_len = last_symbol(ctx.buffer.text_before_cursor()).len();
        if candidates.len() == 1 {
            ctx.buffer.insert_str(first.get(token_len..).unwrap_or_default());
        } else {
            for _ in 0..token_len {
                ctx.buffer.delete_backward();
            }
            ctx.buffer.insert_str(first);
        }
        tracing::debug!("autocomplete: accepted {first}");
    }

    /// Frame for the suggestion box, relative to the screen
    fn placement(ctx: &EditContext<'_>, items: &[String], token_len: usize) -> Option<RegionPositions> {
        let region = ctx.region?;
        let cursor = ctx.buffer.cursor();
        let origin = ctx.buffer.origin();
        let visible_col = cursor.col.saturating_sub(origin.col);
        let visible_row = cursor.row.saturating_sub(origin.row);

        let mut x = region.x0 + visible_col as i32;
        let mut y = region.y0 + visible_row as i32;
        let mut max_width = region.inner_width().saturating_sub(visible_col);
        if items.len() > 1 {
            y += 1;
            x -= token_len as i32;
            max_width += token_len;
        }

        let widest = items.iter().map(String::len).max().unwrap_or(0);
        let width = widest.min(max_width) as i32;
        let height = items.len().min(MAX_SUGGESTIONS_SHOWN) as i32;
        Some(RegionPositions::absolute(x, y, x + width + 1, y + height + 1))
    }
}

impl Editor for AutocompleteEditor {
    fn handle_key(&mut self, ctx: &mut EditContext<'_>, key: KeyEvent) {
        if key.code == KeyCode::Enter {
            if let AutocompleteState::Suggesting { candidates } = std::mem::take(&mut self.state) {
                Self::accept(ctx, &candidates);
                ctx.emit(EditorEffect::CloseSuggestions);
                return;
            }
        }
        self.inner.handle_key(ctx, key);

        ctx.emit(EditorEffect::CloseSuggestions);
        self.state = AutocompleteState::Idle;

        let token = last_symbol(ctx.buffer.text_before_cursor()).to_string();
        let candidates = (self.candidates)(&token);
        if candidates.is_empty() {
            return;
        }

        let items: Vec<String> = if candidates.len() == 1 {
            vec![candidates[0].get(token.len()..).unwrap_or_default().to_string()]
        } else {
            candidates.clone()
        };
        // Enter only completes what the box actually shows
        let Some(positions) = Self::placement(ctx, &items, token.len()) else {
            return;
        };
        ctx.emit(EditorEffect::ShowSuggestions { items, positions });
        self.state = AutocompleteState::Suggesting { candidates };
    }

    fn reset(&mut self) {
        self.state = AutocompleteState::Idle;
        self.inner.reset();
    }
}
