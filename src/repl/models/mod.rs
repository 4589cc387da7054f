//! # Models Module
//!
//! Plain data owned by the application state: region text buffers, the
//! request/response records, the history log and the status bar.

pub mod history;
pub mod request_model;
pub mod status_line;
pub mod text_buffer;

pub use history::History;
pub use request_model::{ExportFormat, FieldSnapshot, Request, SavedRequest};
pub use status_line::StatusLine;
pub use text_buffer::{BufferPosition, TextBuffer};
