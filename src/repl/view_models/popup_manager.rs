//! # Popup Management
//!
//! At most one modal popup (history, method list, help, save dialogs) is
//! open at a time and it takes keyboard input while open. The info popup
//! ("Sending request..") and the suggestion box are not modal and sit on
//! top of whatever has focus.

use crate::repl::events::RegionId;
use crate::repl::geometry::{Position, RegionPositions};
use crate::repl::models::{ExportFormat, SavedRequest};
use crate::repl::view_models::core::{DialogAction, ModalPopup, ViewModel, METHODS};
use std::path::Path;

const HISTORY_WIDTH: u16 = 100;
const METHOD_LIST_WIDTH: u16 = 50;
const HELP_SIZE: (u16, u16) = (60, 40);
const SAVE_FORMAT_WIDTH: u16 = 30;
const DIALOG_WIDTH: u16 = 60;

pub const SAVE_RESPONSE_TITLE: &str = "Save Response (enter to submit, ctrl+q to cancel)";
pub const SAVE_REQUEST_TITLE: &str = "Save Request (enter to submit, ctrl+q to cancel)";
pub const LOAD_REQUEST_TITLE: &str = "Load Request (enter to submit, ctrl+q to cancel)";

fn clamp_len(len: usize) -> u16 {
    u16::try_from(len).unwrap_or(u16::MAX)
}

impl ViewModel {
    /// Region of the open modal popup, if any
    pub fn open_popup(&self) -> Option<RegionId> {
        self.modal.map(|popup| popup.region)
    }

    pub fn info_message(&self) -> Option<&str> {
        self.info.as_deref()
    }

    pub fn suggestions_visible(&self) -> bool {
        self.suggestions
    }

    /// Row to highlight in list popups
    pub fn highlighted_row(&self, region: RegionId) -> Option<usize> {
        match region {
            RegionId::History | RegionId::MethodList | RegionId::SaveFormat
                if self.open_popup() == Some(region) =>
            {
                self.buffer(region).map(|buffer| buffer.cursor().row)
            }
            _ => None,
        }
    }

    /// Show a modal popup, replacing any other one
    fn show_popup(&mut self, region: RegionId, size: (u16, u16), text: &str, row: usize) {
        self.close_popup();
        self.dismiss_suggestions();

        let title = self.default_title(region);
        self.set_title(region, title);
        let buffer = self.buffer_mut(region);
        buffer.set_text(text);
        buffer.move_to_buffer_start();
        buffer.set_cursor(row, 0);

        self.modal = Some(ModalPopup { region, size });
        tracing::debug!("popup: opened {region}");
    }

    pub fn close_popup(&mut self) {
        if let Some(popup) = self.modal.take() {
            tracing::debug!("popup: closed {}", popup.region);
        }
        self.dialog_action = None;
    }

    /// Close the popup if `region` is the one open; true when it was
    fn close_if_open(&mut self, region: RegionId) -> bool {
        if self.open_popup() == Some(region) {
            self.close_popup();
            true
        } else {
            false
        }
    }

    pub fn toggle_history(&mut self) {
        if self.close_if_open(RegionId::History) {
            return;
        }
        let lines = self.history.summary_lines();
        let height = clamp_len(self.history.len()).max(1);
        let cursor = self.history.cursor();
        self.show_popup(RegionId::History, (HISTORY_WIDTH, height), &lines.join("\n"), cursor);
    }

    pub fn toggle_method_list(&mut self) {
        if self.close_if_open(RegionId::MethodList) {
            return;
        }
        let current = self.field_value(RegionId::Method);
        let row = METHODS.iter().position(|m| *m == current).unwrap_or(0);
        self.show_popup(
            RegionId::MethodList,
            (METHOD_LIST_WIDTH, clamp_len(METHODS.len())),
            &METHODS.join("\n"),
            row,
        );
    }

    pub fn toggle_help(&mut self) {
        if self.close_if_open(RegionId::Help) {
            return;
        }
        let text = self.bindings.help_text();
        self.show_popup(RegionId::Help, HELP_SIZE, text.trim_end(), 0);
    }

    /// First step of "save request": pick an export format
    pub fn toggle_save_format(&mut self) {
        if self.close_if_open(RegionId::SaveFormat) {
            return;
        }
        let names: Vec<&str> = ExportFormat::ALL.iter().map(|f| f.name()).collect();
        self.show_popup(
            RegionId::SaveFormat,
            (SAVE_FORMAT_WIDTH, clamp_len(names.len())),
            &names.join("\n"),
            0,
        );
    }

    /// Path dialog prefilled with the working directory
    pub fn open_path_dialog(&mut self, title: &str, action: DialogAction) {
        let mut prefill = std::env::current_dir()
            .map(|dir| dir.display().to_string())
            .unwrap_or_default();
        prefill.push('/');

        self.show_popup(RegionId::SaveDialog, (DIALOG_WIDTH, 1), &prefill, 0);
        self.buffer_mut(RegionId::SaveDialog).move_to_buffer_end();
        self.set_title(RegionId::SaveDialog, title);
        self.dialog_action = Some(action);
    }

    pub fn open_save_response_dialog(&mut self) {
        self.open_path_dialog(SAVE_RESPONSE_TITLE, DialogAction::SaveResponse);
    }

    pub fn open_load_request_dialog(&mut self) {
        self.open_path_dialog(LOAD_REQUEST_TITLE, DialogAction::LoadRequest);
    }

    /// Enter in the path dialog
    pub fn confirm_path_dialog(&mut self) {
        let path = self.field_value(RegionId::SaveDialog);
        let action = self.dialog_action;
        self.close_popup();
        match action {
            Some(DialogAction::SaveResponse) => {
                let message = self.save_response(Path::new(&path));
                self.show_save_result(&message);
            }
            Some(DialogAction::SaveRequest(format)) => {
                let message = self.save_request(format, Path::new(&path));
                self.show_save_result(&message);
            }
            Some(DialogAction::LoadRequest) => self.load_request(Path::new(&path)),
            None => {}
        }
    }

    /// Enter in a list popup
    pub fn confirm_list_selection(&mut self) {
        let Some(region) = self.open_popup() else {
            return;
        };
        let row = self.buffer(region).map_or(0, |buffer| buffer.cursor().row);
        match region {
            RegionId::History => {
                if row < self.history.len() {
                    self.restore_request(row);
                }
            }
            RegionId::MethodList => {
                if let Some(method) = METHODS.get(row) {
                    self.set_field_text(RegionId::Method, method);
                }
                self.close_popup();
            }
            RegionId::SaveFormat => {
                if let Some(&format) = ExportFormat::ALL.get(row) {
                    self.open_path_dialog(SAVE_REQUEST_TITLE, DialogAction::SaveRequest(format));
                }
            }
            RegionId::SaveResult => self.close_popup(),
            _ => {}
        }
    }

    /// Move the selection in a list popup, or scroll the help text
    pub fn move_popup_cursor(&mut self, down: bool) {
        let Some(region) = self.open_popup() else {
            return;
        };
        let buffer = self.buffer_mut(region);
        match (region, down) {
            (RegionId::Help, true) => buffer.scroll_by(1),
            (RegionId::Help, false) => buffer.scroll_by(-1),
            (_, true) => buffer.move_down(),
            (_, false) => buffer.move_up(),
        }
    }

    /// Write the current entry's raw body to `path`
    pub fn save_response(&self, path: &Path) -> String {
        let Some(body) = self
            .history
            .current()
            .and_then(|request| request.raw_response_body.as_ref())
        else {
            return "Error saving response: no response to save".to_string();
        };
        match std::fs::write(path, body) {
            Ok(()) => {
                tracing::info!("response saved to {}", path.display());
                "Response saved successfully.".to_string()
            }
            Err(e) => format!("Error saving response: {e}"),
        }
    }

    /// Export the current field values to `path`
    pub fn save_request(&self, format: ExportFormat, path: &Path) -> String {
        let result = format
            .export(&self.field_snapshot())
            .and_then(|text| Ok(std::fs::write(path, text)?));
        match result {
            Ok(()) => {
                tracing::info!("request saved to {} as {}", path.display(), format.name());
                format!("Request saved successfully in {}", format.name())
            }
            Err(e) => format!("Error saving request: {e:#}"),
        }
    }

    /// Fill the request fields from a JSON request file
    ///
    /// Only keys present in the file are touched. Failures are reported in
    /// the response body.
    pub fn load_request(&mut self, path: &Path) {
        let raw = match std::fs::read(path) {
            Ok(raw) => raw,
            Err(e) => {
                self.show_response_message(&format!("File reading error: {e}"));
                return;
            }
        };
        let saved = match SavedRequest::from_json(&raw) {
            Ok(saved) => saved,
            Err(e) => {
                self.show_response_message(&format!("JSON decoding error: {e:#}"));
                return;
            }
        };
        self.apply_saved_request(&saved);
        tracing::info!("request loaded from {}", path.display());
    }

    pub fn apply_saved_request(&mut self, saved: &SavedRequest) {
        let fields = [
            (RegionId::Url, &saved.url),
            (RegionId::Method, &saved.method),
            (RegionId::UrlParams, &saved.get_params),
            (RegionId::RequestData, &saved.data),
            (RegionId::RequestHeaders, &saved.headers),
        ];
        for (region, value) in fields {
            if let Some(value) = value {
                self.set_field_text(region, value);
            }
        }
    }

    fn show_save_result(&mut self, message: &str) {
        let width = self.layout.dimensions().width.max(1);
        let title_len = self.default_title(RegionId::SaveResult).chars().count() + 2;
        let mut content_width = clamp_len((message.chars().count() + 1).max(title_len));
        let mut height = 1;
        if content_width > width {
            height = content_width / width + 1;
            content_width = width;
        }
        self.show_popup(RegionId::SaveResult, (content_width, height), message, 0);
    }

    /// Non-modal one-line notice centred on screen
    pub fn show_info(&mut self, message: &str) {
        self.info = Some(message.to_string());
        self.buffer_mut(RegionId::Popup).set_text(message);

        let half = i32::try_from(message.chars().count() / 2).unwrap_or(i32::MAX / 2);
        self.layout.set_positions(
            RegionId::Popup,
            RegionPositions::new(
                Position::new(0.5, -half - 1),
                Position::new(0.5, -1),
                Position::new(0.5, half + 1),
                Position::new(0.5, 1),
            ),
        );
    }

    pub fn close_info(&mut self) {
        self.info = None;
    }

    pub(super) fn show_suggestions(&mut self, items: &[String], positions: RegionPositions) {
        self.layout.set_positions(RegionId::Autocomplete, positions);
        self.buffer_mut(RegionId::Autocomplete)
            .set_text(&items.join("\n"));
        self.buffer_mut(RegionId::Autocomplete).move_to_buffer_start();
        self.suggestions = true;
    }

    pub(super) fn close_suggestions(&mut self) {
        self.suggestions = false;
    }

    /// Hide the suggestion box from outside the editors and disarm every chain
    pub(super) fn dismiss_suggestions(&mut self) {
        self.close_suggestions();
        for editor in self.editors.values_mut() {
            editor.reset();
        }
    }

    /// Re-centre the modal popup for the current terminal size
    pub(super) fn position_popups(&mut self) {
        let Some(popup) = self.modal else {
            return;
        };
        let dims = self.layout.dimensions();
        let width = popup.size.0.min(dims.width.saturating_sub(4));
        let height = popup.size.1.min(dims.height.saturating_sub(4));
        self.layout
            .set_positions(popup.region, RegionPositions::centered(width, height));
    }
}
