//! # Response Formatters
//!
//! A formatter renders a raw response body for display and, when it is
//! searchable, answers search queries against it. The [`FormatterRegistry`]
//! picks one by the response's declared content type and falls back to plain
//! text.

pub mod binary;
pub mod json;
pub mod text;

pub use binary::BinaryFormatter;
pub use json::JsonFormatter;
pub use text::TextFormatter;

use anyhow::Result;
use std::fmt::Debug;
use std::sync::Arc;

/// Renders and searches a response body for one content type
pub trait ResponseFormatter: Debug + Send + Sync {
    /// Short label shown next to the response body title
    fn title(&self) -> String;

    /// Whether [`ResponseFormatter::search`] is meaningful for this type
    fn searchable(&self) -> bool;

    /// Append the rendered body to `output`
    fn format(&self, output: &mut String, raw: &[u8]) -> Result<()>;

    /// Matches for `query`, in document order
    fn search(&self, query: &str, raw: &[u8]) -> Result<Vec<String>>;
}

type Factory = fn(&str) -> Arc<dyn ResponseFormatter>;

#[derive(Debug, Clone, Copy)]
enum MediaMatch {
    Prefix(&'static str),
    Suffix(&'static str),
}

impl MediaMatch {
    fn matches(self, media_type: &str) -> bool {
        match self {
            MediaMatch::Prefix(prefix) => media_type.starts_with(prefix),
            MediaMatch::Suffix(suffix) => media_type.ends_with(suffix),
        }
    }
}

fn text_factory(content_type: &str) -> Arc<dyn ResponseFormatter> {
    Arc::new(TextFormatter::for_content_type(content_type))
}

fn json_factory(_: &str) -> Arc<dyn ResponseFormatter> {
    Arc::new(JsonFormatter)
}

fn binary_factory(_: &str) -> Arc<dyn ResponseFormatter> {
    Arc::new(BinaryFormatter)
}

/// Media type without parameters, lowercased
pub fn media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Content-type driven formatter lookup
#[derive(Debug, Clone)]
pub struct FormatterRegistry {
    entries: Vec<(MediaMatch, Factory)>,
    default: Arc<dyn ResponseFormatter>,
}

impl FormatterRegistry {
    /// Registry with the built-in formatters; JSON pretty-printing is optional
    pub fn new(format_json: bool) -> Self {
        let mut entries: Vec<(MediaMatch, Factory)> = Vec::new();
        if format_json {
            entries.push((MediaMatch::Prefix("application/json"), json_factory));
            entries.push((MediaMatch::Suffix("+json"), json_factory));
        }
        entries.push((MediaMatch::Prefix("text/"), text_factory));
        for prefix in [
            "application/octet-stream",
            "application/pdf",
            "application/zip",
            "image/",
            "audio/",
            "video/",
        ] {
            entries.push((MediaMatch::Prefix(prefix), binary_factory));
        }

        Self {
            entries,
            default: Arc::new(TextFormatter::default()),
        }
    }

    /// The plain-text formatter used when nothing else matches
    pub fn default_formatter(&self) -> Arc<dyn ResponseFormatter> {
        Arc::clone(&self.default)
    }

    /// Formatter for a response's `Content-Type` value
    pub fn select(&self, content_type: &str) -> Arc<dyn ResponseFormatter> {
        let media = media_type(content_type);
        self.entries
            .iter()
            .find(|(matcher, _)| matcher.matches(&media))
            .map(|(_, factory)| factory(content_type))
            .unwrap_or_else(|| text_factory(content_type))
    }
}

impl Default for FormatterRegistry {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_should_match_json_by_prefix_and_suffix() {
        let registry = FormatterRegistry::new(true);
        assert_eq!(registry.select("application/json; charset=utf-8").title(), "[json]");
        assert_eq!(registry.select("application/problem+json").title(), "[json]");
    }

    #[test]
    fn select_should_fall_back_to_text_when_json_formatting_is_off() {
        let registry = FormatterRegistry::new(false);
        assert_eq!(registry.select("application/json").title(), "[text]");
    }

    #[test]
    fn select_should_pick_binary_for_images() {
        let registry = FormatterRegistry::default();
        let formatter = registry.select("image/png");
        assert_eq!(formatter.title(), "[binary]");
        assert!(!formatter.searchable());
    }

    #[test]
    fn unknown_and_missing_types_should_use_text() {
        let registry = FormatterRegistry::default();
        assert_eq!(registry.select("").title(), "[text]");
        assert_eq!(registry.select("application/x-unknown").title(), "[text]");
        assert_eq!(registry.select("TEXT/HTML").title(), "[text]");
    }

    #[test]
    fn media_type_should_strip_parameters() {
        assert_eq!(media_type(" Text/Plain ; charset=UTF-8"), "text/plain");
    }
}
