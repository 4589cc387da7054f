//! Key names as written in the configuration file (`CtrlR`, `AltH`, `F1`,
//! `PageUp`, ...) and their mapping onto crossterm key events.

use super::BindingError;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// A key with only the modifiers that matter for bindings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeySpec {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeySpec {
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    /// Normalize a decoded event so it can be compared against bindings
    ///
    /// Shift is dropped (it is already reflected in the character or in
    /// `BackTab`) and characters pressed with Ctrl or Alt are lowercased.
    pub fn from_event(event: &KeyEvent) -> Self {
        let modifiers = event.modifiers & (KeyModifiers::CONTROL | KeyModifiers::ALT);
        let code = match event.code {
            KeyCode::Char(c) if !modifiers.is_empty() => KeyCode::Char(c.to_ascii_lowercase()),
            other => other,
        };
        Self { code, modifiers }
    }

    pub fn matches(&self, event: &KeyEvent) -> bool {
        *self == Self::from_event(event)
    }
}

fn named_key(name: &str) -> Option<KeySpec> {
    let plain = |code| Some(KeySpec::new(code, KeyModifiers::NONE));
    if let Some(number) = name.strip_prefix('F') {
        if let Ok(n @ 1..=12) = number.parse::<u8>() {
            return plain(KeyCode::F(n));
        }
    }
    if let Some(rest) = name.strip_prefix("Ctrl") {
        let mut chars = rest.chars();
        return match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_alphanumeric() => Some(KeySpec::new(
                KeyCode::Char(c.to_ascii_lowercase()),
                KeyModifiers::CONTROL,
            )),
            _ if rest == "Space" => Some(KeySpec::new(KeyCode::Char(' '), KeyModifiers::CONTROL)),
            _ => None,
        };
    }
    match name {
        "Insert" => plain(KeyCode::Insert),
        "Delete" => plain(KeyCode::Delete),
        "Home" => plain(KeyCode::Home),
        "End" => plain(KeyCode::End),
        "PageUp" | "Pgup" => plain(KeyCode::PageUp),
        "PageDown" | "Pgdn" => plain(KeyCode::PageDown),
        "ArrowUp" | "Up" => plain(KeyCode::Up),
        "ArrowDown" | "Down" => plain(KeyCode::Down),
        "ArrowLeft" | "Left" => plain(KeyCode::Left),
        "ArrowRight" | "Right" => plain(KeyCode::Right),
        "Backspace" => plain(KeyCode::Backspace),
        "Tab" => plain(KeyCode::Tab),
        "BackTab" => plain(KeyCode::BackTab),
        "Enter" => plain(KeyCode::Enter),
        "Esc" => plain(KeyCode::Esc),
        "Space" => plain(KeyCode::Char(' ')),
        _ => None,
    }
}

/// Parse a configured key name
pub fn parse_key(name: &str) -> Result<KeySpec, BindingError> {
    let (alt, rest) = match name.strip_prefix("Alt") {
        Some(rest) => (true, rest),
        None => (false, name),
    };

    let mut chars = rest.chars();
    let mut spec = match (chars.next(), chars.next()) {
        (None, _) => return Err(BindingError::EmptyKey),
        (Some(c), None) if alt => KeySpec::new(KeyCode::Char(c.to_ascii_lowercase()), KeyModifiers::NONE),
        (Some(c), None) => KeySpec::new(KeyCode::Char(c), KeyModifiers::NONE),
        _ => named_key(rest).ok_or_else(|| BindingError::UnknownKey(name.to_string()))?,
    };
    if alt {
        spec.modifiers |= KeyModifiers::ALT;
    }
    Ok(spec)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ctrl_and_alt_names_should_map_to_lowercase_chars() {
        assert_eq!(
            parse_key("CtrlR").unwrap(),
            KeySpec::new(KeyCode::Char('r'), KeyModifiers::CONTROL)
        );
        assert_eq!(
            parse_key("AltH").unwrap(),
            KeySpec::new(KeyCode::Char('h'), KeyModifiers::ALT)
        );
    }

    #[test]
    fn named_keys_should_parse() {
        assert_eq!(parse_key("F1").unwrap().code, KeyCode::F(1));
        assert_eq!(parse_key("F11").unwrap().code, KeyCode::F(11));
        assert_eq!(parse_key("PageUp").unwrap().code, KeyCode::PageUp);
        assert_eq!(parse_key("Pgdn").unwrap().code, KeyCode::PageDown);
        assert_eq!(parse_key("Enter").unwrap().code, KeyCode::Enter);
        assert_eq!(parse_key("AltArrowUp").unwrap(), KeySpec::new(KeyCode::Up, KeyModifiers::ALT));
    }

    #[test]
    fn bad_names_should_be_rejected() {
        assert_eq!(parse_key(""), Err(BindingError::EmptyKey));
        assert_eq!(parse_key("Alt"), Err(BindingError::EmptyKey));
        assert_eq!(parse_key("F13"), Err(BindingError::UnknownKey("F13".to_string())));
        assert_eq!(parse_key("Hyper"), Err(BindingError::UnknownKey("Hyper".to_string())));
    }

    #[test]
    fn events_should_match_regardless_of_shift_and_case() {
        let spec = parse_key("CtrlR").unwrap();
        let shifted = KeyEvent::new(
            KeyCode::Char('R'),
            KeyModifiers::CONTROL | KeyModifiers::SHIFT,
        );
        assert!(spec.matches(&shifted));
        assert!(!spec.matches(&KeyEvent::new(KeyCode::Char('r'), KeyModifiers::NONE)));

        let back_tab = KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT);
        assert!(parse_key("BackTab").unwrap().matches(&back_tab));
    }
}
