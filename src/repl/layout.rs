//! # Layout Engine
//!
//! Resolves every named region against the current terminal size.
//!
//! Each region is described by four [`Position`]s in a [`LayoutConfig`].
//! Normal regions come from the static table; popups and the autocomplete box
//! get their positions overridden per instance right before they are shown.
//! When the terminal drops below the minimum size the engine reports a single
//! "too small" notice instead of the normal regions, and flags the pass that
//! follows recovery so focus can be handed back.

use crate::repl::events::{RegionFlags, RegionId};
use crate::repl::geometry::{Dimensions, Position, Rect, RegionPositions};
use std::collections::HashMap;

pub const MIN_WIDTH: u16 = 60;
pub const MIN_HEIGHT: u16 = 20;

/// Which editor chain a region is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorKind {
    /// Not editable
    None,
    /// Plain multi-line editing
    MultiLine,
    /// Single-line field
    SingleLine,
    /// Multi-line with header-name completion
    HeaderCompletion,
    /// Single-line field that re-runs the response search on every key
    Search,
    /// Read-only scrolling view
    Viewer,
}

/// Static descriptor of a region
#[derive(Debug, Clone, PartialEq)]
pub struct RegionProperties {
    pub title: String,
    pub flags: RegionFlags,
    pub editor: EditorKind,
    pub text: String,
}

impl RegionProperties {
    fn new(title: &str, flags: RegionFlags, editor: EditorKind) -> Self {
        Self {
            title: title.to_string(),
            flags,
            editor,
            text: String::new(),
        }
    }

    fn with_text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }
}

/// Geometry and properties of every region, passed explicitly into the engine
#[derive(Debug, Clone)]
pub struct LayoutConfig {
    positions: HashMap<RegionId, RegionPositions>,
    properties: HashMap<RegionId, RegionProperties>,
}

fn pos(fraction: f32, offset: i32) -> Position {
    Position::new(fraction, offset)
}

fn edges(l: Position, t: Position, r: Position, b: Position) -> RegionPositions {
    RegionPositions::new(l, t, r, b)
}

impl Default for LayoutConfig {
    fn default() -> Self {
        use RegionId::*;

        let positions = HashMap::from([
            (Url, edges(pos(0.0, 0), pos(0.0, 0), pos(1.0, -2), pos(0.0, 3))),
            (UrlParams, edges(pos(0.0, 0), pos(0.0, 3), pos(0.3, 0), pos(0.25, 0))),
            (Method, edges(pos(0.0, 0), pos(0.25, 0), pos(0.3, 0), pos(0.25, 2))),
            (RequestData, edges(pos(0.0, 0), pos(0.25, 2), pos(0.3, 0), pos(0.5, 1))),
            (RequestHeaders, edges(pos(0.0, 0), pos(0.5, 1), pos(0.3, 0), pos(1.0, -3))),
            (ResponseHeaders, edges(pos(0.3, 0), pos(0.0, 3), pos(1.0, -2), pos(0.25, 2))),
            (ResponseBody, edges(pos(0.3, 0), pos(0.25, 2), pos(1.0, -2), pos(1.0, -3))),
            (StatusLine, edges(pos(0.0, -1), pos(1.0, -4), pos(1.0, 0), pos(1.0, -1))),
            (Search, edges(pos(0.0, 7), pos(1.0, -3), pos(1.0, -1), pos(1.0, -1))),
            (SearchPrompt, edges(pos(0.0, -1), pos(1.0, -3), pos(0.0, 8), pos(1.0, -1))),
            (Error, edges(pos(0.0, 0), pos(0.0, 0), pos(1.0, -2), pos(1.0, -2))),
            (Popup, edges(pos(0.5, -1), pos(0.5, -1), pos(0.5, 1), pos(0.5, 1))),
        ]);

        let plain = RegionFlags::empty();
        let properties = HashMap::from([
            (
                Url,
                RegionProperties::new("URL - press F1 for help", RegionFlags::FIELD, EditorKind::SingleLine),
            ),
            (UrlParams, RegionProperties::new("URL params", RegionFlags::FIELD, EditorKind::MultiLine)),
            (
                Method,
                RegionProperties::new("Method", RegionFlags::FIELD, EditorKind::SingleLine).with_text("GET"),
            ),
            (
                RequestData,
                RegionProperties::new("Request data (POST/PUT/PATCH)", RegionFlags::FIELD, EditorKind::MultiLine),
            ),
            (
                RequestHeaders,
                RegionProperties::new("Request headers", RegionFlags::FIELD, EditorKind::HeaderCompletion),
            ),
            (
                ResponseHeaders,
                RegionProperties::new("Response headers", RegionFlags::VIEWER, EditorKind::Viewer),
            ),
            (
                ResponseBody,
                RegionProperties::new("Response body", RegionFlags::VIEWER, EditorKind::Viewer),
            ),
            (Search, RegionProperties::new("", RegionFlags::EDITABLE, EditorKind::Search)),
            (StatusLine, RegionProperties::new("", plain, EditorKind::None)),
            (
                SearchPrompt,
                RegionProperties::new("", plain, EditorKind::None).with_text(SEARCH_PROMPT),
            ),
            (Error, RegionProperties::new("Error", RegionFlags::FRAMED, EditorKind::None)),
            (Popup, RegionProperties::new("Info", RegionFlags::FRAMED, EditorKind::None)),
            (Autocomplete, RegionProperties::new("", plain, EditorKind::None)),
            (History, RegionProperties::new("History", RegionFlags::FRAMED, EditorKind::None)),
            (MethodList, RegionProperties::new("Methods", RegionFlags::FRAMED, EditorKind::None)),
            (Help, RegionProperties::new("Help", RegionFlags::FRAMED, EditorKind::None)),
            (
                SaveFormat,
                RegionProperties::new("Choose export format", RegionFlags::FRAMED, EditorKind::None),
            ),
            (SaveDialog, RegionProperties::new("", RegionFlags::FIELD, EditorKind::SingleLine)),
            (
                SaveResult,
                RegionProperties::new(
                    "Save Result (press enter to close)",
                    RegionFlags::FRAMED | RegionFlags::WRAP,
                    EditorKind::None,
                ),
            ),
        ]);

        Self {
            positions,
            properties,
        }
    }
}

pub const SEARCH_PROMPT: &str = "search> ";

impl LayoutConfig {
    pub fn positions(&self, region: RegionId) -> Option<&RegionPositions> {
        self.positions.get(&region)
    }

    pub fn properties(&self, region: RegionId) -> Option<&RegionProperties> {
        self.properties.get(&region)
    }
}

/// Outcome of one layout pass
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// The terminal is below the minimum size; only the notice is drawn
    TooSmall(Option<Rect>),
    /// Normal regions in drawing order, degenerate ones already dropped
    Regions(Vec<(RegionId, Rect)>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutPass {
    pub frame: Frame,
    /// Set on the first normal pass after a too-small one
    pub recovered: bool,
}

/// Resolves region geometry for the current terminal size
#[derive(Debug, Clone)]
pub struct LayoutEngine {
    config: LayoutConfig,
    dims: Dimensions,
    too_small: bool,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig, dims: Dimensions) -> Self {
        Self {
            config,
            dims,
            too_small: false,
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dims
    }

    pub fn resize(&mut self, dims: Dimensions) {
        tracing::debug!("layout: resize to {}x{}", dims.width, dims.height);
        self.dims = dims;
    }

    pub fn is_too_small(&self) -> bool {
        self.dims.width < MIN_WIDTH || self.dims.height < MIN_HEIGHT
    }

    /// Override a region's positions before it is resolved
    pub fn set_positions(&mut self, region: RegionId, positions: RegionPositions) {
        self.config.positions.insert(region, positions);
    }

    /// Replace a region's default text
    pub fn set_default_text(&mut self, region: RegionId, text: impl Into<String>) {
        if let Some(props) = self.config.properties.get_mut(&region) {
            props.text = text.into();
        }
    }

    /// Make the URL field start with `<scheme>://`
    pub fn configure_default_scheme(&mut self, scheme: &str) {
        if !scheme.is_empty() && !scheme.ends_with("://") {
            self.set_default_text(RegionId::Url, format!("{scheme}://"));
        }
    }

    /// Resolve a single region, `None` when unknown or degenerate
    pub fn resolve(&self, region: RegionId) -> Option<Rect> {
        self.config.positions.get(&region)?.resolve(self.dims)
    }

    /// Run a full pass for the main regions followed by `overlays`
    pub fn pass(&mut self, overlays: &[RegionId]) -> LayoutPass {
        if self.is_too_small() {
            if !self.too_small {
                tracing::debug!("layout: terminal too small");
            }
            self.too_small = true;
            return LayoutPass {
                frame: Frame::TooSmall(self.resolve(RegionId::Error)),
                recovered: false,
            };
        }

        let recovered = std::mem::replace(&mut self.too_small, false);
        let regions = RegionId::MAIN
            .iter()
            .chain(overlays)
            .filter_map(|&region| self.resolve(region).map(|rect| (region, rect)))
            .collect();

        LayoutPass {
            frame: Frame::Regions(regions),
            recovered,
        }
    }
}
