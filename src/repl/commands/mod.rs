//! # Commands
//!
//! Named actions that keys can be bound to, the key names used in the
//! configuration file, and the per-scope binding table.

pub mod bindings;
pub mod keys;

pub use bindings::{BindingError, KeyBindings, Scope};
pub use keys::{parse_key, KeySpec};

use crate::repl::events::RegionId;
use std::fmt;
use std::str::FromStr;

/// An action a key binding can trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Submit,
    NextView,
    PrevView,
    Focus(RegionId),
    History,
    SaveResponse,
    SaveRequest,
    LoadRequest,
    Help,
    ToggleRedirects,
    ToggleContextSpecificSearch,
    ClearHistory,
    DeleteLine,
    DeleteWord,
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    Quit,
}

impl Command {
    pub const fn name(self) -> &'static str {
        match self {
            Command::Submit => "submit",
            Command::NextView => "nextView",
            Command::PrevView => "prevView",
            Command::Focus(_) => "focus",
            Command::History => "history",
            Command::SaveResponse => "saveResponse",
            Command::SaveRequest => "saveRequest",
            Command::LoadRequest => "loadRequest",
            Command::Help => "help",
            Command::ToggleRedirects => "toggleRedirects",
            Command::ToggleContextSpecificSearch => "toggleContextSpecificSearch",
            Command::ClearHistory => "clearHistory",
            Command::DeleteLine => "deleteLine",
            Command::DeleteWord => "deleteWord",
            Command::ScrollUp => "scrollUp",
            Command::ScrollDown => "scrollDown",
            Command::PageUp => "pageUp",
            Command::PageDown => "pageDown",
            Command::Quit => "quit",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Focus(region) => write!(f, "focus {region}"),
            other => f.write_str(other.name()),
        }
    }
}

impl FromStr for Command {
    type Err = BindingError;

    /// `name` or `name argument`, e.g. `focus response-body`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, argument) = match s.trim().split_once(' ') {
            Some((name, argument)) => (name, argument.trim()),
            None => (s.trim(), ""),
        };
        let command = match name {
            "submit" => Command::Submit,
            "nextView" => Command::NextView,
            "prevView" => Command::PrevView,
            "focus" => RegionId::from_name(argument)
                .map(Command::Focus)
                .ok_or_else(|| BindingError::UnknownRegion(argument.to_string()))?,
            "history" => Command::History,
            "saveResponse" => Command::SaveResponse,
            "saveRequest" => Command::SaveRequest,
            "loadRequest" => Command::LoadRequest,
            "help" => Command::Help,
            "toggleRedirects" => Command::ToggleRedirects,
            "toggleContextSpecificSearch" => Command::ToggleContextSpecificSearch,
            "clearHistory" => Command::ClearHistory,
            "deleteLine" => Command::DeleteLine,
            "deleteWord" => Command::DeleteWord,
            "scrollUp" => Command::ScrollUp,
            "scrollDown" => Command::ScrollDown,
            "pageUp" => Command::PageUp,
            "pageDown" => Command::PageDown,
            "quit" => Command::Quit,
            other => return Err(BindingError::UnknownCommand(other.to_string())),
        };
        Ok(command)
    }
}
