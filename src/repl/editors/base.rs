//! Innermost editor: multi-line editing, or scrolling for read-only views.

use super::{is_text_input, EditContext, Editor, EditorEffect};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Default)]
pub struct BaseEditor {
    read_only: bool,
    /// An Alt+`[` is waiting to see whether a `Z` completes a back-tab
    back_tab_pending: bool,
}

fn is_back_tab_start(key: &KeyEvent) -> bool {
    key.code == KeyCode::Char('[') && key.modifiers == KeyModifiers::ALT
}

impl BaseEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Editor for response views: no mutation, Up/Down scroll
    pub fn read_only() -> Self {
        Self {
            read_only: true,
            back_tab_pending: false,
        }
    }

    fn apply(&self, ctx: &mut EditContext<'_>, key: KeyEvent) {
        if self.read_only {
            match key.code {
                KeyCode::Up => ctx.buffer.scroll_by(-1),
                KeyCode::Down => ctx.buffer.scroll_by(1),
                _ => {}
            }
            return;
        }

        let buffer = &mut *ctx.buffer;
        match key.code {
            KeyCode::Char(c) if is_text_input(&key) => buffer.insert_char(c),
            KeyCode::Enter => buffer.insert_newline(),
            KeyCode::Tab if key.modifiers.is_empty() => buffer.insert_char('\t'),
            KeyCode::Backspace => {
                buffer.delete_backward();
            }
            KeyCode::Delete => {
                buffer.delete_forward();
            }
            KeyCode::Left => buffer.move_left(),
            KeyCode::Right => buffer.move_right(),
            KeyCode::Up => buffer.move_up(),
            KeyCode::Down => buffer.move_down(),
            KeyCode::Home => buffer.move_to_line_start(),
            KeyCode::End => buffer.move_to_line_end(),
            _ => {}
        }
    }
}

impl Editor for BaseEditor {
    fn handle_key(&mut self, ctx: &mut EditContext<'_>, key: KeyEvent) {
        if std::mem::take(&mut self.back_tab_pending) {
            if matches!(key.code, KeyCode::Char('Z')) {
                ctx.emit(EditorEffect::FocusPrevious);
                return;
            }
            self.apply(ctx, KeyEvent::new(KeyCode::Char('['), KeyModifiers::ALT));
        }

        if is_back_tab_start(&key) {
            self.back_tab_pending = true;
            return;
        }

        self.apply(ctx, key);
    }

    fn reset(&mut self) {
        self.back_tab_pending = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repl::editors::test_support::{alt, ch, key};
    use crate::repl::models::{BufferPosition, TextBuffer};

    fn run(editor: &mut BaseEditor, buffer: &mut TextBuffer, keys: &[KeyEvent]) -> Vec<EditorEffect> {
        let mut effects = Vec::new();
        for k in keys {
            let mut ctx = EditContext::new(buffer, None);
            editor.handle_key(&mut ctx, *k);
            effects.extend(ctx.into_effects());
        }
        effects
    }

    #[test]
    fn typing_should_insert_and_enter_should_split_lines() {
        let mut editor = BaseEditor::new();
        let mut buffer = TextBuffer::new();
        run(
            &mut editor,
            &mut buffer,
            &[ch('a'), ch('b'), key(KeyCode::Enter), ch('C')],
        );
        assert_eq!(buffer.text(), "ab\nC");
    }

    #[test]
    fn alt_bracket_followed_by_z_should_request_previous_focus() {
        let mut editor = BaseEditor::new();
        let mut buffer = TextBuffer::with_text("x");
        let effects = run(&mut editor, &mut buffer, &[alt('['), ch('Z')]);
        assert_eq!(effects, vec![EditorEffect::FocusPrevious]);
        assert_eq!(buffer.text(), "x");
    }

    #[test]
    fn alt_bracket_followed_by_other_key_should_process_that_key() {
        let mut editor = BaseEditor::new();
        let mut buffer = TextBuffer::new();
        let effects = run(&mut editor, &mut buffer, &[alt('['), ch('q')]);
        assert!(effects.is_empty());
        assert_eq!(buffer.text(), "q");
    }

    #[test]
    fn down_on_last_line_should_not_scroll_or_move() {
        let mut editor = BaseEditor::new();
        let mut buffer = TextBuffer::with_text("one\ntwo");
        run(&mut editor, &mut buffer, &[key(KeyCode::Down)]);
        assert_eq!(buffer.cursor(), BufferPosition::new(1, 3));
        assert_eq!(buffer.line_count(), 2);
    }

    #[test]
    fn control_chords_should_not_insert_text() {
        let mut editor = BaseEditor::new();
        let mut buffer = TextBuffer::new();
        let ctrl_r = KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL);
        run(&mut editor, &mut buffer, &[ctrl_r]);
        assert!(buffer.is_empty());
    }

    #[test]
    fn read_only_editor_should_scroll_without_mutating() {
        let mut editor = BaseEditor::read_only();
        let mut buffer = TextBuffer::with_text("a\nb\nc");
        buffer.move_to_buffer_start();
        run(
            &mut editor,
            &mut buffer,
            &[ch('x'), key(KeyCode::Backspace), key(KeyCode::Down)],
        );
        assert_eq!(buffer.text(), "a\nb\nc");
        assert_eq!(buffer.origin().row, 1);
    }
}
