//! # I/O Abstraction Layer
//!
//! Traits over terminal input and output so the controller and renderer can
//! run against a real terminal or against in-memory streams in tests.
//!
//! ```text
//! Production:  AppController ──▶ TerminalEventStream  ──▶ crossterm::event
//!              TerminalRenderer ──▶ TerminalRenderStream ──▶ stdout
//!
//! Testing:     AppController ──▶ MockEventStream  ──▶ VecDeque<Event>
//!              TerminalRenderer ──▶ MockRenderStream ──▶ character grid
//! ```

use anyhow::Result;
use crossterm::event::Event;
use std::io::Write;
use std::time::Duration;

pub mod mock;
pub mod terminal;

pub use mock::{MockEventStream, MockRenderStream, RenderCommand};
pub use terminal::{TerminalEventStream, TerminalRenderStream};

/// Terminal size as (width, height)
pub type TerminalSize = (u16, u16);

/// Source of keyboard and resize events
pub trait EventStream: Send {
    /// True when an event can be read within `timeout`
    fn poll(&mut self, timeout: Duration) -> Result<bool>;

    /// Next event; only call after `poll` returned true
    fn read(&mut self) -> Result<Event>;
}

/// Destination for rendered output
///
/// Styled text and cursor moves are written through `Write` with crossterm's
/// `queue!`; the methods below cover terminal state that is not plain output.
pub trait RenderStream: Write + Send {
    fn clear_screen(&mut self) -> Result<()>;

    /// Move cursor to (column, row)
    fn move_cursor(&mut self, x: u16, y: u16) -> Result<()>;

    fn hide_cursor(&mut self) -> Result<()>;

    fn show_cursor(&mut self) -> Result<()>;

    fn get_size(&self) -> Result<TerminalSize>;

    fn enter_alternate_screen(&mut self) -> Result<()>;

    fn leave_alternate_screen(&mut self) -> Result<()>;

    fn enable_raw_mode(&mut self) -> Result<()>;

    fn disable_raw_mode(&mut self) -> Result<()>;
}
