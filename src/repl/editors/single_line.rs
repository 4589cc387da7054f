//! Restricts an editor to a single line of input.

use super::{is_text_input, EditContext, Editor};
use crossterm::event::{KeyCode, KeyEvent};

#[derive(Debug)]
pub struct SingleLineEditor {
    inner: Box<dyn Editor>,
}

impl SingleLineEditor {
    pub fn new(inner: Box<dyn Editor>) -> Self {
        Self { inner }
    }
}

impl Editor for SingleLineEditor {
    fn handle_key(&mut self, ctx: &mut EditContext<'_>, key: KeyEvent) {
        match key.code {
            KeyCode::Char(_) if is_text_input(&key) => {
                self.inner.handle_key(ctx, key);
                ctx.buffer.trim_trailing_newlines();
            }
            KeyCode::Enter => {}
            KeyCode::Right if ctx.buffer.is_cursor_at_end() => {}
            KeyCode::Home | KeyCode::Up => ctx.buffer.move_to_buffer_start(),
            KeyCode::End | KeyCode::Down => ctx.buffer.move_to_buffer_end(),
            _ => self.inner.handle_key(ctx, key),
        }
    }

    fn reset(&mut self) {
        self.inner.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repl::editors::test_support::{ch, key};
    use crate::repl::editors::BaseEditor;
    use crate::repl::models::{BufferPosition, TextBuffer};

    fn editor() -> SingleLineEditor {
        SingleLineEditor::new(Box::new(BaseEditor::new()))
    }

    fn press(editor: &mut SingleLineEditor, buffer: &mut TextBuffer, k: KeyEvent) {
        let mut ctx = EditContext::new(buffer, None);
        editor.handle_key(&mut ctx, k);
    }

    #[test]
    fn enter_should_be_ignored() {
        let mut editor = editor();
        let mut buffer = TextBuffer::with_text("http://x");
        press(&mut editor, &mut buffer, key(KeyCode::Enter));
        assert_eq!(buffer.text(), "http://x");
        assert_eq!(buffer.line_count(), 1);
    }

    #[test]
    fn home_and_end_should_jump_to_buffer_edges() {
        let mut editor = editor();
        let mut buffer = TextBuffer::with_text("abcdef");
        press(&mut editor, &mut buffer, key(KeyCode::Up));
        assert_eq!(buffer.cursor(), BufferPosition::new(0, 0));
        press(&mut editor, &mut buffer, key(KeyCode::Down));
        assert_eq!(buffer.cursor(), BufferPosition::new(0, 6));
        press(&mut editor, &mut buffer, key(KeyCode::Home));
        press(&mut editor, &mut buffer, key(KeyCode::End));
        assert!(buffer.is_cursor_at_end());
    }

    #[test]
    fn right_at_end_should_not_move() {
        let mut editor = editor();
        let mut buffer = TextBuffer::with_text("ab");
        press(&mut editor, &mut buffer, key(KeyCode::Right));
        assert_eq!(buffer.cursor(), BufferPosition::new(0, 2));
    }

    #[test]
    fn typing_should_trim_trailing_newlines() {
        let mut editor = editor();
        let mut buffer = TextBuffer::with_text("ab\n");
        buffer.set_cursor(0, 2);
        press(&mut editor, &mut buffer, ch('c'));
        assert_eq!(buffer.text(), "abc");
    }
}
