//! # Editor Chains
//!
//! Keystrokes for an editable region go through a chain of editors. Each
//! layer owns exactly one inner layer, applies its own rules and decides
//! whether to forward the key:
//!
//! ```text
//! SearchEditor / AutocompleteEditor / SingleLineEditor
//!        │
//!        ▼
//!   BaseEditor ──▶ TextBuffer
//! ```
//!
//! Editors never touch anything outside the focused buffer directly. Side
//! effects on the rest of the screen (focus changes, the suggestion box) are
//! returned as [`EditorEffect`]s for the application state to apply.

pub mod autocomplete;
pub mod base;
pub mod search;
pub mod single_line;

pub use autocomplete::{complete_from_slice, last_symbol, AutocompleteEditor, REQUEST_HEADERS};
pub use base::BaseEditor;
pub use search::SearchEditor;
pub use single_line::SingleLineEditor;

use crate::repl::events::UpdateSender;
use crate::repl::geometry::{Rect, RegionPositions};
use crate::repl::layout::EditorKind;
use crate::repl::models::TextBuffer;
use crossterm::event::{KeyEvent, KeyModifiers};
use std::fmt::Debug;

/// Something an editor wants done outside its own buffer
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEffect {
    /// Move focus to the previous region
    FocusPrevious,
    /// Show the floating suggestion box
    ShowSuggestions {
        items: Vec<String>,
        positions: RegionPositions,
    },
    /// Tear the suggestion box down
    CloseSuggestions,
}

/// What an editor may look at and change while handling one key
#[derive(Debug)]
pub struct EditContext<'a> {
    pub buffer: &'a mut TextBuffer,
    /// Frame of the region being edited, if it is currently on screen
    pub region: Option<Rect>,
    effects: Vec<EditorEffect>,
}

impl<'a> EditContext<'a> {
    pub fn new(buffer: &'a mut TextBuffer, region: Option<Rect>) -> Self {
        Self {
            buffer,
            region,
            effects: Vec::new(),
        }
    }

    pub fn emit(&mut self, effect: EditorEffect) {
        self.effects.push(effect);
    }

    pub fn into_effects(self) -> Vec<EditorEffect> {
        self.effects
    }
}

/// One layer of an editor chain
pub trait Editor: Debug + Send {
    fn handle_key(&mut self, ctx: &mut EditContext<'_>, key: KeyEvent);

    /// Drop state tied to the last keys, e.g. a completion no longer on screen
    fn reset(&mut self) {}
}

/// Plain text input: no modifier, or only Shift
pub(crate) fn is_text_input(key: &KeyEvent) -> bool {
    key.modifiers.difference(KeyModifiers::SHIFT).is_empty()
}

/// Build the chain bound to a region kind
pub fn build_chain(kind: EditorKind, updates: &UpdateSender) -> Option<Box<dyn Editor>> {
    let chain: Box<dyn Editor> = match kind {
        EditorKind::None => return None,
        EditorKind::MultiLine => Box::new(BaseEditor::new()),
        EditorKind::SingleLine => Box::new(SingleLineEditor::new(Box::new(BaseEditor::new()))),
        EditorKind::HeaderCompletion => Box::new(AutocompleteEditor::new(
            Box::new(BaseEditor::new()),
            |token| complete_from_slice(token, REQUEST_HEADERS),
        )),
        EditorKind::Search => Box::new(SingleLineEditor::new(Box::new(SearchEditor::new(
            Box::new(BaseEditor::new()),
            updates.clone(),
        )))),
        EditorKind::Viewer => Box::new(BaseEditor::read_only()),
    };
    Some(chain)
}

#[cfg(test)]
pub(crate) mod test_support {
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    pub fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    pub fn ch(c: char) -> KeyEvent {
        key(KeyCode::Char(c))
    }

    pub fn alt(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::ALT)
    }
}
