//! # Views Module
//!
//! Rendering of the view model onto the terminal.

pub mod terminal_renderer;

pub use terminal_renderer::{TerminalRenderer, ViewRenderer, TOO_SMALL_MESSAGE};
