//! # Core ViewModel Structure
//!
//! Contains the main ViewModel struct, its construction, and the read-only
//! accessors the renderer uses. Behaviour is split across the manager
//! modules next to this one, each adding an `impl ViewModel` block.

use crate::repl::commands::KeyBindings;
use crate::repl::editors::{build_chain, Editor};
use crate::repl::events::{RegionFlags, RegionId, UpdateQueue};
use crate::repl::formatters::FormatterRegistry;
use crate::repl::geometry::{Dimensions, Rect};
use crate::repl::layout::{EditorKind, LayoutConfig, LayoutEngine};
use crate::repl::models::{ExportFormat, FieldSnapshot, History, StatusLine, TextBuffer};
use crate::repl::services::{HttpService, HttpTransport};
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Regions drawn on top of the main layout
pub(crate) const OVERLAYS: [RegionId; 9] = [
    RegionId::Error,
    RegionId::Popup,
    RegionId::Autocomplete,
    RegionId::History,
    RegionId::MethodList,
    RegionId::Help,
    RegionId::SaveFormat,
    RegionId::SaveDialog,
    RegionId::SaveResult,
];

/// Request methods offered by the method list, in display order
pub const METHODS: [&str; 9] = [
    "GET", "POST", "PUT", "DELETE", "PATCH", "OPTIONS", "TRACE", "CONNECT", "HEAD",
];

/// Behaviour switches taken from the `[general]` configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewOptions {
    pub format_json: bool,
    pub preserve_scroll_position: bool,
    pub context_specific_search: bool,
    pub default_url_scheme: String,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            format_json: true,
            preserve_scroll_position: true,
            context_specific_search: true,
            default_url_scheme: "https".to_string(),
        }
    }
}

/// What the path dialog does when Enter is pressed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogAction {
    SaveResponse,
    SaveRequest(ExportFormat),
    LoadRequest,
}

/// The modal popup currently on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModalPopup {
    pub region: RegionId,
    /// Requested content size before clamping to the terminal
    pub size: (u16, u16),
}

/// Application state: every region buffer plus the request/response data
/// behind them
pub struct ViewModel {
    pub(super) layout: LayoutEngine,
    pub(super) buffers: HashMap<RegionId, TextBuffer>,
    pub(super) titles: HashMap<RegionId, String>,
    pub(super) editors: HashMap<RegionId, Box<dyn Editor>>,
    pub(super) focus: usize,
    pub(super) modal: Option<ModalPopup>,
    pub(super) dialog_action: Option<DialogAction>,
    pub(super) info: Option<String>,
    pub(super) suggestions: bool,
    pub(super) history: History,
    pub(super) status_line: StatusLine,
    pub(super) formatters: FormatterRegistry,
    pub(super) http: HttpService,
    pub(super) updates: UpdateQueue,
    pub(super) bindings: KeyBindings,
    pub(super) options: ViewOptions,
    pub(super) should_quit: bool,
}

impl std::fmt::Debug for ViewModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewModel")
            .field("focus", &self.focused_region())
            .field("modal", &self.modal)
            .field("history", &self.history.len())
            .finish_non_exhaustive()
    }
}

impl ViewModel {
    pub fn new(
        options: ViewOptions,
        bindings: KeyBindings,
        transport: Arc<dyn HttpTransport>,
        follow_redirects: Arc<AtomicBool>,
        dims: Dimensions,
    ) -> Self {
        let mut layout = LayoutEngine::new(LayoutConfig::default(), dims);
        layout.configure_default_scheme(&options.default_url_scheme);

        let updates = UpdateQueue::new();
        let http = HttpService::new(transport, follow_redirects, updates.sender());

        let mut buffers = HashMap::new();
        let mut titles = HashMap::new();
        let mut editors = HashMap::new();
        for region in RegionId::MAIN.into_iter().chain(OVERLAYS) {
            let (text, title, kind) = layout
                .config()
                .properties(region)
                .map(|props| (props.text.clone(), props.title.clone(), props.editor))
                .unwrap_or((String::new(), String::new(), EditorKind::None));

            buffers.insert(region, TextBuffer::with_text(&text));
            titles.insert(region, title);
            if let Some(chain) = build_chain(kind, &updates.sender()) {
                editors.insert(region, chain);
            }
        }

        let mut view_model = Self {
            layout,
            buffers,
            titles,
            editors,
            focus: 0,
            modal: None,
            dialog_action: None,
            info: None,
            suggestions: false,
            history: History::new(),
            status_line: StatusLine::default(),
            formatters: FormatterRegistry::new(options.format_json),
            http,
            updates,
            bindings,
            options,
            should_quit: false,
        };
        view_model.refresh_status_line();
        tracing::debug!("view model created for {}x{}", dims.width, dims.height);
        view_model
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn request_quit(&mut self) {
        self.should_quit = true;
    }

    pub fn options(&self) -> &ViewOptions {
        &self.options
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    pub fn layout(&self) -> &LayoutEngine {
        &self.layout
    }

    pub fn is_request_in_flight(&self) -> bool {
        self.http.is_in_flight()
    }

    /// Buffer behind a region
    pub fn buffer(&self, region: RegionId) -> Option<&TextBuffer> {
        self.buffers.get(&region)
    }

    pub(super) fn buffer_mut(&mut self, region: RegionId) -> &mut TextBuffer {
        self.buffers.entry(region).or_default()
    }

    /// Full text of a region
    pub fn region_text(&self, region: RegionId) -> String {
        self.buffer(region).map(TextBuffer::text).unwrap_or_default()
    }

    /// Trimmed value of a region, as fields are read on submit
    pub fn field_value(&self, region: RegionId) -> String {
        self.buffer(region).map(TextBuffer::value).unwrap_or_default()
    }

    /// Replace a region's content, leaving the cursor after the text
    pub fn set_field_text(&mut self, region: RegionId, text: &str) {
        self.buffer_mut(region).set_text(text);
    }

    pub fn region_title(&self, region: RegionId) -> &str {
        self.titles.get(&region).map(String::as_str).unwrap_or_default()
    }

    pub(super) fn set_title(&mut self, region: RegionId, title: impl Into<String>) {
        self.titles.insert(region, title.into());
    }

    /// Title a region starts with
    pub(super) fn default_title(&self, region: RegionId) -> String {
        self.layout
            .config()
            .properties(region)
            .map(|props| props.title.clone())
            .unwrap_or_default()
    }

    pub fn region_flags(&self, region: RegionId) -> RegionFlags {
        self.layout
            .config()
            .properties(region)
            .map(|props| props.flags)
            .unwrap_or_default()
    }

    pub(super) fn editor_kind(&self, region: RegionId) -> EditorKind {
        self.layout
            .config()
            .properties(region)
            .map(|props| props.editor)
            .unwrap_or(EditorKind::None)
    }

    /// Current screen rectangle of a region
    pub fn region_rect(&self, region: RegionId) -> Option<Rect> {
        self.layout.resolve(region)
    }

    /// The five request fields as they would be submitted
    pub fn field_snapshot(&self) -> FieldSnapshot {
        FieldSnapshot {
            url: self.field_value(RegionId::Url),
            method: self.field_value(RegionId::Method),
            get_params: self.field_value(RegionId::UrlParams),
            data: self.field_value(RegionId::RequestData),
            headers: self.field_value(RegionId::RequestHeaders),
        }
    }

    /// Rebuild the status bar text from current state
    pub(super) fn refresh_status_line(&mut self) {
        let current = self.history.current();
        self.status_line
            .set_response_time(current.map(|request| request.duration));
        self.status_line
            .set_request_position(self.history.cursor(), self.history.len());

        let search_type = current.and_then(|request| {
            if !self.options.context_specific_search {
                Some(self.formatters.default_formatter().title())
            } else if request.formatter.searchable() {
                Some(request.formatter.title())
            } else {
                None
            }
        });
        self.status_line.set_search_type(search_type);
        self.status_line
            .set_redirects_restricted(!self.http.follows_redirects());

        let text = self.status_line.render();
        self.buffer_mut(RegionId::StatusLine).set_text(&text);
    }
}
