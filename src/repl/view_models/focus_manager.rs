//! # Focus Management
//!
//! Focus cycles through [`RegionId::FOCUS_ORDER`]. Any focus change tears
//! down open popups and the suggestion box.

use crate::repl::events::RegionId;
use crate::repl::geometry::{Dimensions, Rect};
use crate::repl::layout::{Frame, LayoutPass};
use crate::repl::view_models::core::ViewModel;

impl ViewModel {
    /// Region that receives editor input when no popup is open
    pub fn focused_region(&self) -> RegionId {
        RegionId::FOCUS_ORDER[self.focus % RegionId::FOCUS_ORDER.len()]
    }

    /// Region whose buffer currently receives keys, popups included
    pub fn active_region(&self) -> RegionId {
        self.modal
            .map(|popup| popup.region)
            .unwrap_or_else(|| self.focused_region())
    }

    pub fn next_view(&mut self) {
        self.set_focus_index((self.focus + 1) % RegionId::FOCUS_ORDER.len());
    }

    pub fn prev_view(&mut self) {
        let len = RegionId::FOCUS_ORDER.len();
        self.set_focus_index((self.focus + len - 1) % len);
    }

    /// Focus a specific region; regions outside the focus order are ignored
    pub fn focus_region(&mut self, region: RegionId) {
        if let Some(index) = RegionId::FOCUS_ORDER.iter().position(|&r| r == region) {
            self.set_focus_index(index);
        }
    }

    fn set_focus_index(&mut self, index: usize) {
        self.close_popup();
        self.dismiss_suggestions();
        self.focus = index;
        tracing::debug!("focus: {}", self.focused_region());
    }

    pub fn update_terminal_size(&mut self, width: u16, height: u16) {
        self.layout.resize(Dimensions::new(width, height));
        self.dismiss_suggestions();
    }

    pub fn is_terminal_too_small(&self) -> bool {
        self.layout.is_too_small()
    }

    /// Resolve the frame to draw: main regions plus whatever overlays are open
    pub fn layout_pass(&mut self) -> LayoutPass {
        self.position_popups();

        let mut overlays = Vec::new();
        if self.suggestions {
            overlays.push(RegionId::Autocomplete);
        }
        if let Some(popup) = self.modal {
            overlays.push(popup.region);
        }
        if self.info.is_some() {
            overlays.push(RegionId::Popup);
        }

        let pass = self.layout.pass(&overlays);
        if pass.recovered {
            tracing::debug!("terminal large enough again, focus back on {}", self.active_region());
        }
        if let Frame::Regions(regions) = &pass.frame {
            self.scroll_regions_to_cursor(regions);
        }
        pass
    }

    /// Keep editable regions scrolled to their cursor
    fn scroll_regions_to_cursor(&mut self, regions: &[(RegionId, Rect)]) {
        for &(region, rect) in regions {
            if region.is_response() || !self.editors.contains_key(&region) {
                continue;
            }
            if let Some(buffer) = self.buffers.get_mut(&region) {
                buffer.scroll_to_cursor(rect.inner_width(), rect.inner_height());
            }
        }
    }
}
