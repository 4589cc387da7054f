//! # Core Event Types
//!
//! Region identifiers and the capability flags attached to each region.

use bitflags::bitflags;
use std::fmt;

/// Every named, independently positioned area of the screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RegionId {
    Url,
    UrlParams,
    Method,
    RequestData,
    RequestHeaders,
    ResponseHeaders,
    ResponseBody,
    StatusLine,
    Search,
    SearchPrompt,
    Error,
    Popup,
    Autocomplete,
    History,
    MethodList,
    Help,
    SaveFormat,
    SaveDialog,
    SaveResult,
}

impl RegionId {
    /// Regions that take part in Tab / Shift+Tab focus cycling, in order
    pub const FOCUS_ORDER: [RegionId; 8] = [
        RegionId::Url,
        RegionId::UrlParams,
        RegionId::Method,
        RegionId::RequestData,
        RegionId::RequestHeaders,
        RegionId::Search,
        RegionId::ResponseHeaders,
        RegionId::ResponseBody,
    ];

    /// Regions laid out from the static table on every pass
    pub const MAIN: [RegionId; 10] = [
        RegionId::Url,
        RegionId::UrlParams,
        RegionId::Method,
        RegionId::RequestData,
        RegionId::RequestHeaders,
        RegionId::ResponseHeaders,
        RegionId::ResponseBody,
        RegionId::StatusLine,
        RegionId::SearchPrompt,
        RegionId::Search,
    ];

    /// Stable name, used in config sections and saved request files
    pub const fn name(self) -> &'static str {
        match self {
            RegionId::Url => "url",
            RegionId::UrlParams => "get",
            RegionId::Method => "method",
            RegionId::RequestData => "data",
            RegionId::RequestHeaders => "headers",
            RegionId::ResponseHeaders => "response-headers",
            RegionId::ResponseBody => "response-body",
            RegionId::StatusLine => "status-line",
            RegionId::Search => "search",
            RegionId::SearchPrompt => "prompt",
            RegionId::Error => "error_view",
            RegionId::Popup => "popup_view",
            RegionId::Autocomplete => "autocomplete_view",
            RegionId::History => "history",
            RegionId::MethodList => "method-list",
            RegionId::Help => "help",
            RegionId::SaveFormat => "save-request-format-dialog",
            RegionId::SaveDialog => "save-dialog",
            RegionId::SaveResult => "save-result",
        }
    }

    /// Look a focusable region up by its name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::FOCUS_ORDER
            .into_iter()
            .chain([RegionId::History, RegionId::MethodList])
            .find(|region| region.name() == name)
    }

    /// Whether this region shows response content rather than user input
    pub const fn is_response(self) -> bool {
        matches!(self, RegionId::ResponseHeaders | RegionId::ResponseBody)
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

bitflags! {
    /// Static display and editing properties of a region
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct RegionFlags: u32 {
        /// Draw a border and title around the content
        const FRAMED   = 0b0001;
        /// Accepts keystrokes through an editor chain
        const EDITABLE = 0b0010;
        /// Long lines wrap instead of scrolling horizontally
        const WRAP     = 0b0100;

        /// Standard input field
        const FIELD = Self::FRAMED.bits() | Self::EDITABLE.bits();
        /// Response display
        const VIEWER = Self::FRAMED.bits() | Self::EDITABLE.bits() | Self::WRAP.bits();
    }
}
