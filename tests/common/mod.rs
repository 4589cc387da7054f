//! Common test utilities for integration tests
//!
//! Builds a view model wired to the real reqwest transport so requests go
//! out over the loopback interface to a wiremock server.

#![allow(dead_code)]

use buzz::repl::commands::{Command, KeyBindings};
use buzz::repl::events::RegionId;
use buzz::repl::geometry::Dimensions;
use buzz::repl::services::{HttpSettings, ReqwestTransport};
use buzz::{ViewModel, ViewOptions};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

pub const TERMINAL_SIZE: (u16, u16) = (120, 40);

/// View model talking to the network with default settings
pub fn live_view_model() -> ViewModel {
    live_view_model_with(HttpSettings::default(), ViewOptions::default())
}

pub fn live_view_model_with(settings: HttpSettings, options: ViewOptions) -> ViewModel {
    let follow_redirects = Arc::new(AtomicBool::new(settings.follow_redirects));
    let transport = ReqwestTransport::new(&settings, Arc::clone(&follow_redirects))
        .expect("client should build with default settings");
    ViewModel::new(
        options,
        KeyBindings::defaults(),
        Arc::new(transport),
        follow_redirects,
        Dimensions::new(TERMINAL_SIZE.0, TERMINAL_SIZE.1),
    )
}

/// Submit the current fields and wait for the exchange to come back
pub async fn submit_and_wait(vm: &mut ViewModel) {
    vm.execute_command(Command::Submit);
    assert!(vm.is_request_in_flight(), "request should be running");
    assert!(vm.wait_for_update().await, "update queue closed early");
}

pub fn fill(vm: &mut ViewModel, fields: &[(RegionId, &str)]) {
    for (region, text) in fields {
        vm.set_field_text(*region, text);
    }
}

pub fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

pub fn ctrl(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
}

pub fn type_text(vm: &mut ViewModel, text: &str) {
    for c in text.chars() {
        vm.handle_key(key(KeyCode::Char(c)));
    }
}
