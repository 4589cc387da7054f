//! Plain text rendering with regex search.

use super::ResponseFormatter;
use anyhow::Result;
use encoding_rs::{Encoding, UTF_8};
use regex::Regex;

/// Upper bound on the number of matches a single search returns
const MAX_MATCHES: usize = 1000;

#[derive(Debug, Clone, Copy)]
pub struct TextFormatter {
    encoding: &'static Encoding,
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self { encoding: UTF_8 }
    }
}

impl TextFormatter {
    /// Honour a `charset` parameter, defaulting to UTF-8
    pub fn for_content_type(content_type: &str) -> Self {
        let encoding = content_type
            .split(';')
            .skip(1)
            .filter_map(|param| param.split_once('='))
            .find(|(key, _)| key.trim().eq_ignore_ascii_case("charset"))
            .and_then(|(_, label)| Encoding::for_label(label.trim().trim_matches('"').as_bytes()))
            .unwrap_or(UTF_8);
        Self { encoding }
    }

    fn decode(&self, raw: &[u8]) -> String {
        let (text, _, had_errors) = self.encoding.decode(raw);
        if had_errors {
            tracing::debug!("text formatter: lossy decode with {}", self.encoding.name());
        }
        text.into_owned()
    }
}

impl ResponseFormatter for TextFormatter {
    fn title(&self) -> String {
        "[text]".to_string()
    }

    fn searchable(&self) -> bool {
        true
    }

    fn format(&self, output: &mut String, raw: &[u8]) -> Result<()> {
        output.push_str(&self.decode(raw));
        Ok(())
    }

    fn search(&self, query: &str, raw: &[u8]) -> Result<Vec<String>> {
        let pattern = Regex::new(query)?;
        let text = self.decode(raw);
        Ok(pattern
            .find_iter(&text)
            .take(MAX_MATCHES)
            .map(|found| found.as_str().to_string())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_should_return_every_regex_match() {
        let formatter = TextFormatter::default();
        let results = formatter.search("b[a-z]+", b"foo bar baz").unwrap();
        assert_eq!(results, vec!["bar", "baz"]);
    }

    #[test]
    fn search_with_invalid_regex_should_error() {
        let formatter = TextFormatter::default();
        assert!(formatter.search("(", b"anything").is_err());
    }

    #[test]
    fn search_without_matches_should_be_empty() {
        let formatter = TextFormatter::default();
        assert!(formatter.search("zzz", b"abc").unwrap().is_empty());
    }

    #[test]
    fn charset_parameter_should_drive_decoding() {
        let formatter = TextFormatter::for_content_type("text/plain; charset=ISO-8859-1");
        let mut out = String::new();
        formatter.format(&mut out, &[0x63, 0x61, 0x66, 0xe9]).unwrap();
        assert_eq!(out, "café");
    }

    #[test]
    fn invalid_utf8_should_render_lossily() {
        let mut out = String::new();
        TextFormatter::default()
            .format(&mut out, &[b'a', 0xff, b'b'])
            .unwrap();
        assert_eq!(out, "a\u{fffd}b");
    }
}
