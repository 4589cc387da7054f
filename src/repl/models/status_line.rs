//! # Status Line Model
//!
//! State shown in the one-line bar at the bottom of the screen.

use std::time::Duration;

/// Status bar content, rebuilt from application state before each render
#[derive(Debug, Clone, PartialEq)]
pub struct StatusLine {
    version: String,
    response_time: Option<Duration>,
    request_position: Option<(usize, usize)>,
    search_type: Option<String>,
    redirects_restricted: bool,
}

impl StatusLine {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            response_time: None,
            request_position: None,
            search_type: None,
            redirects_restricted: false,
        }
    }

    pub fn set_response_time(&mut self, duration: Option<Duration>) {
        self.response_time = duration;
    }

    /// Zero-based `index` of `total` history entries
    pub fn set_request_position(&mut self, index: usize, total: usize) {
        self.request_position = (total > 0).then_some((index, total));
    }

    pub fn set_search_type(&mut self, title: Option<String>) {
        self.search_type = title;
    }

    pub fn set_redirects_restricted(&mut self, restricted: bool) {
        self.redirects_restricted = restricted;
    }

    pub fn render(&self) -> String {
        let mut parts = vec![format!("[buzz {}]", self.version)];
        if let Some(duration) = self.response_time {
            parts.push(format!("[Response time: {duration:?}]"));
        }
        if let Some((index, total)) = self.request_position {
            parts.push(format!("[Request no.: {}/{}]", index + 1, total));
        }
        if let Some(title) = &self.search_type {
            parts.push(format!("[Search type: {title}]"));
        }
        if self.redirects_restricted {
            parts.push("[Redirects Restricted Mode]".to_string());
        }
        parts.join(" ")
    }
}

impl Default for StatusLine {
    fn default() -> Self {
        Self::new(env!("CARGO_PKG_VERSION"))
    }
}
