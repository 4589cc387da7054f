//! # ViewModel Module
//!
//! Application state split into focused responsibilities, each adding an
//! `impl ViewModel` block.

mod core;
mod focus_manager;
mod http_manager;
mod input_manager;
mod popup_manager;
#[cfg(test)]
mod tests;

pub use core::{DialogAction, ModalPopup, ViewModel, ViewOptions, METHODS};
pub use http_manager::SENDING_REQUEST;
pub use popup_manager::{LOAD_REQUEST_TITLE, SAVE_REQUEST_TITLE, SAVE_RESPONSE_TITLE};
