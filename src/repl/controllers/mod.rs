//! # Controllers Module
//!
//! The event loop tying input, view model and renderer together.

pub mod app_controller;

pub use app_controller::AppController;
