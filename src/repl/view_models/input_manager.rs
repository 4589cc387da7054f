//! # Input Handling
//!
//! Keys are offered in order to: the open popup, bindings scoped to the
//! focused region, global bindings, and finally the focused region's editor
//! chain.

use crate::repl::commands::{Command, Scope};
use crate::repl::editors::{EditContext, EditorEffect};
use crate::repl::events::RegionId;
use crate::repl::models::TextBuffer;
use crate::repl::view_models::core::{ViewModel, METHODS};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

impl ViewModel {
    pub fn handle_key(&mut self, key: KeyEvent) {
        if self.layout.is_too_small() {
            // only global bindings reach a terminal showing the size notice
            if let Some(command) = self.bindings.lookup(Scope::Global, &key) {
                self.execute_command(command);
            }
            return;
        }

        if self.modal.is_some() {
            self.handle_popup_key(key);
            return;
        }

        let focus = self.focused_region();
        if self.handle_region_key(focus, &key) {
            return;
        }
        if let Some(command) = self.bindings.resolve(focus, &key) {
            self.execute_command(command);
            return;
        }
        self.forward_to_editor(focus, key);
    }

    fn handle_popup_key(&mut self, key: KeyEvent) {
        let Some(region) = self.open_popup() else {
            return;
        };
        let ctrl_q = key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL);
        if key.code == KeyCode::Esc || (ctrl_q && region == RegionId::SaveDialog) {
            self.close_popup();
            return;
        }

        let is_list = matches!(
            region,
            RegionId::History | RegionId::MethodList | RegionId::SaveFormat
        );
        match key.code {
            KeyCode::Enter if region == RegionId::SaveDialog => return self.confirm_path_dialog(),
            KeyCode::Enter if is_list || region == RegionId::SaveResult => {
                return self.confirm_list_selection()
            }
            KeyCode::Up if is_list || region == RegionId::Help => return self.move_popup_cursor(false),
            KeyCode::Down if is_list || region == RegionId::Help => return self.move_popup_cursor(true),
            _ => {}
        }

        if let Some(command) = self.bindings.resolve(region, &key) {
            self.execute_command(command);
            return;
        }
        if region == RegionId::SaveDialog {
            self.forward_to_editor(region, key);
        }
    }

    /// Keys with fixed meaning in one region: the method field
    fn handle_region_key(&mut self, focus: RegionId, key: &KeyEvent) -> bool {
        if focus != RegionId::Method || !key.modifiers.is_empty() {
            return false;
        }
        match key.code {
            KeyCode::Enter => self.toggle_method_list(),
            KeyCode::Up => self.cycle_method(false),
            KeyCode::Down => self.cycle_method(true),
            _ => return false,
        }
        true
    }

    /// Step to the neighbouring method; stops at either end of the list
    fn cycle_method(&mut self, forward: bool) {
        let current = self.field_value(RegionId::Method);
        let Some(index) = METHODS.iter().position(|m| *m == current) else {
            return;
        };
        let next = if forward {
            index + 1
        } else {
            index.wrapping_sub(1)
        };
        if let Some(method) = METHODS.get(next) {
            self.set_field_text(RegionId::Method, method);
        }
    }

    fn forward_to_editor(&mut self, region: RegionId, key: KeyEvent) {
        let rect = self.region_rect(region);
        let Some(editor) = self.editors.get_mut(&region) else {
            return;
        };
        let buffer = self.buffers.entry(region).or_default();
        let mut ctx = EditContext::new(buffer, rect);
        editor.handle_key(&mut ctx, key);

        for effect in ctx.into_effects() {
            match effect {
                EditorEffect::FocusPrevious => self.prev_view(),
                EditorEffect::ShowSuggestions { items, positions } => {
                    self.show_suggestions(&items, positions)
                }
                EditorEffect::CloseSuggestions => self.close_suggestions(),
            }
        }
    }

    pub fn execute_command(&mut self, command: Command) {
        tracing::debug!("command: {command}");
        match command {
            Command::Submit => self.submit_request(),
            Command::NextView => self.next_view(),
            Command::PrevView => self.prev_view(),
            Command::Focus(region) => self.focus_region(region),
            Command::History => self.toggle_history(),
            Command::SaveResponse => self.open_save_response_dialog(),
            Command::SaveRequest => self.toggle_save_format(),
            Command::LoadRequest => self.open_load_request_dialog(),
            Command::Help => self.toggle_help(),
            Command::ToggleRedirects => self.toggle_redirects(),
            Command::ToggleContextSpecificSearch => self.toggle_context_specific_search(),
            Command::ClearHistory => self.clear_history(),
            Command::DeleteLine => self.edit_focused(|buffer| buffer.delete_to_line_start()),
            Command::DeleteWord => self.edit_focused(|buffer| buffer.delete_word_backward()),
            Command::ScrollUp => self.scroll_focused(-1),
            Command::ScrollDown => self.scroll_focused(1),
            Command::PageUp => {
                let page = self.page_size();
                self.scroll_focused(-page)
            }
            Command::PageDown => {
                let page = self.page_size();
                self.scroll_focused(page)
            }
            Command::Quit => self.request_quit(),
        }
    }

    fn edit_focused(&mut self, edit: impl FnOnce(&mut TextBuffer) -> bool) {
        let region = self.active_region();
        if region.is_response() || !self.editors.contains_key(&region) {
            return;
        }
        let changed = edit(self.buffer_mut(region));
        self.dismiss_suggestions();
        if changed && region == RegionId::Search {
            self.print_body();
        }
    }

    fn scroll_focused(&mut self, delta: isize) {
        let region = self.active_region();
        self.buffer_mut(region).scroll_by(delta);
    }

    fn page_size(&self) -> isize {
        self.region_rect(self.active_region())
            .map_or(1, |rect| rect.inner_height().max(1) as isize)
    }
}
