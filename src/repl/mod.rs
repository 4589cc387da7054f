//! # Interactive HTTP Client
//!
//! Layout, editing, request execution and rendering for the terminal UI.

pub mod commands;
pub mod controllers;
pub mod editors;
pub mod events;
pub mod formatters;
pub mod geometry;
pub mod io;
pub mod layout;
pub mod models;
pub mod services;
pub mod view_models;
pub mod views;

pub use controllers::AppController;
pub use view_models::{ViewModel, ViewOptions};
