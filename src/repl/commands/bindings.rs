//! # Key Bindings
//!
//! Bindings are grouped by scope: `global` applies everywhere, a region scope
//! applies only while that region has focus and wins over `global`. Each
//! binding keeps the key name it was configured with so the help popup can
//! show it back verbatim.

use super::keys::{parse_key, KeySpec};
use super::Command;
use crate::repl::events::RegionId;
use crossterm::event::KeyEvent;
use std::collections::BTreeMap;
use std::fmt::{self, Write};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    #[error("empty key string")]
    EmptyKey,
    #[error("unknown key: {0}")]
    UnknownKey(String),
    #[error("unknown command: {0}")]
    UnknownCommand(String),
    #[error("unknown view: {0}")]
    UnknownRegion(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scope {
    Global,
    Region(RegionId),
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Global => f.write_str("global"),
            Scope::Region(region) => region.fmt(f),
        }
    }
}

impl FromStr for Scope {
    type Err = BindingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "global" => Ok(Scope::Global),
            other => RegionId::from_name(other)
                .map(Scope::Region)
                .ok_or_else(|| BindingError::UnknownRegion(other.to_string())),
        }
    }
}

const DEFAULT_BINDINGS: &[(&str, &str, &str)] = &[
    ("global", "CtrlR", "submit"),
    ("global", "CtrlC", "quit"),
    ("global", "CtrlS", "saveResponse"),
    ("global", "CtrlF", "loadRequest"),
    ("global", "CtrlE", "saveRequest"),
    ("global", "CtrlD", "deleteLine"),
    ("global", "CtrlW", "deleteWord"),
    ("global", "CtrlT", "toggleContextSpecificSearch"),
    ("global", "CtrlX", "clearHistory"),
    ("global", "Tab", "nextView"),
    ("global", "CtrlJ", "nextView"),
    ("global", "CtrlK", "prevView"),
    ("global", "BackTab", "prevView"),
    ("global", "AltH", "history"),
    ("global", "F1", "help"),
    ("global", "F2", "focus url"),
    ("global", "F3", "focus get"),
    ("global", "F4", "focus method"),
    ("global", "F5", "focus data"),
    ("global", "F6", "focus headers"),
    ("global", "F7", "focus search"),
    ("global", "F8", "focus response-headers"),
    ("global", "F9", "focus response-body"),
    ("global", "F11", "toggleRedirects"),
    ("url", "Enter", "submit"),
    ("response-headers", "ArrowUp", "scrollUp"),
    ("response-headers", "ArrowDown", "scrollDown"),
    ("response-headers", "PageUp", "pageUp"),
    ("response-headers", "PageDown", "pageDown"),
    ("response-body", "ArrowUp", "scrollUp"),
    ("response-body", "ArrowDown", "scrollDown"),
    ("response-body", "PageUp", "pageUp"),
    ("response-body", "PageDown", "pageDown"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
struct Binding {
    key: KeySpec,
    command: Command,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyBindings {
    scopes: BTreeMap<Scope, BTreeMap<String, Binding>>,
}

impl KeyBindings {
    /// No bindings at all
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in binding set
    pub fn defaults() -> Self {
        let mut bindings = Self::empty();
        for &(scope, key, command) in DEFAULT_BINDINGS {
            if let Err(e) = bindings.bind_str(scope, key, command) {
                tracing::error!("invalid default binding {scope}/{key}: {e}");
            }
        }
        bindings
    }

    /// Bind `key` in `scope`; an empty command removes the binding
    pub fn bind(&mut self, scope: Scope, key: &str, command: &str) -> Result<(), BindingError> {
        let spec = parse_key(key)?;
        if command.trim().is_empty() {
            if let Some(keys) = self.scopes.get_mut(&scope) {
                keys.retain(|_, binding| binding.key != spec);
            }
            tracing::debug!("bindings: removed {scope}/{key}");
            return Ok(());
        }

        let command = command.parse::<Command>()?;
        let keys = self.scopes.entry(scope).or_default();
        // an alias such as Pgup replaces a binding configured as PageUp
        keys.retain(|_, binding| binding.key != spec);
        keys.insert(key.to_string(), Binding { key: spec, command });
        Ok(())
    }

    /// [`KeyBindings::bind`] with the scope given by name
    pub fn bind_str(&mut self, scope: &str, key: &str, command: &str) -> Result<(), BindingError> {
        self.bind(scope.parse()?, key, command)
    }

    /// Command bound to `event` in exactly `scope`
    pub fn lookup(&self, scope: Scope, event: &KeyEvent) -> Option<Command> {
        let spec = KeySpec::from_event(event);
        self.scopes
            .get(&scope)?
            .values()
            .find(|binding| binding.key == spec)
            .map(|binding| binding.command)
    }

    /// Command for `event` while `focus` has focus, region scope first
    pub fn resolve(&self, focus: RegionId, event: &KeyEvent) -> Option<Command> {
        self.lookup(Scope::Region(focus), event)
            .or_else(|| self.lookup(Scope::Global, event))
    }

    /// Listing for the help popup, global scope first, keys sorted by name
    pub fn help_text(&self) -> String {
        let mut out = String::from("Keybindings:\n");
        for (scope, keys) in &self.scopes {
            if keys.is_empty() {
                continue;
            }
            let _ = write!(out, "\n {scope}\n");
            for (name, binding) in keys {
                let _ = writeln!(out, "  {name:<15} {}", binding.command);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn defaults_should_bind_submit_globally_and_enter_in_url() {
        let bindings = KeyBindings::defaults();
        assert_eq!(bindings.resolve(RegionId::RequestData, &ctrl('r')), Some(Command::Submit));

        let enter = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(bindings.resolve(RegionId::Url, &enter), Some(Command::Submit));
        assert_eq!(bindings.resolve(RegionId::RequestData, &enter), None);
    }

    #[test]
    fn region_scope_should_win_over_global() {
        let mut bindings = KeyBindings::defaults();
        bindings.bind_str("headers", "CtrlR", "history").unwrap();
        assert_eq!(bindings.resolve(RegionId::RequestHeaders, &ctrl('r')), Some(Command::History));
        assert_eq!(bindings.resolve(RegionId::Url, &ctrl('r')), Some(Command::Submit));
    }

    #[test]
    fn empty_command_should_remove_a_default() {
        let mut bindings = KeyBindings::defaults();
        bindings.bind_str("global", "CtrlC", "").unwrap();
        assert_eq!(bindings.resolve(RegionId::Url, &ctrl('c')), None);
    }

    #[test]
    fn alias_key_name_should_replace_existing_binding() {
        let mut bindings = KeyBindings::defaults();
        bindings.bind_str("response-body", "Pgup", "scrollUp").unwrap();
        let page_up = KeyEvent::new(KeyCode::PageUp, KeyModifiers::NONE);
        assert_eq!(bindings.resolve(RegionId::ResponseBody, &page_up), Some(Command::ScrollUp));
        // only response-headers still maps a page key to pageUp
        assert_eq!(bindings.help_text().matches("pageUp").count(), 1);
    }

    #[test]
    fn unknown_scope_or_command_should_be_reported() {
        let mut bindings = KeyBindings::empty();
        assert_eq!(
            bindings.bind_str("sidebar", "CtrlR", "submit"),
            Err(BindingError::UnknownRegion("sidebar".to_string()))
        );
        assert_eq!(
            bindings.bind_str("global", "CtrlR", "fly"),
            Err(BindingError::UnknownCommand("fly".to_string()))
        );
    }

    #[test]
    fn help_text_should_group_by_scope_with_sorted_keys() {
        let mut bindings = KeyBindings::empty();
        bindings.bind_str("global", "F1", "help").unwrap();
        bindings.bind_str("global", "CtrlR", "submit").unwrap();
        bindings.bind_str("url", "Enter", "submit").unwrap();
        assert_eq!(
            bindings.help_text(),
            "Keybindings:\n\n global\n  CtrlR           submit\n  F1              help\n\n url\n  Enter           submit\n"
        );
    }
}
