//! # View Model Tests
//!
//! Exercise the view model end to end with a canned transport in place of
//! the network.

use super::*;
use crate::repl::commands::{Command, KeyBindings};
use crate::repl::events::RegionId;
use crate::repl::geometry::Dimensions;
use crate::repl::models::ExportFormat;
use crate::repl::services::transport::{OutgoingRequest, TransportFuture, TransportResponse};
use crate::repl::services::HttpTransport;
use bytes::Bytes;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Debug)]
struct CannedTransport {
    content_type: &'static str,
    body: &'static [u8],
    sent: Mutex<Vec<OutgoingRequest>>,
}

impl CannedTransport {
    fn new(content_type: &'static str, body: &'static [u8]) -> Arc<Self> {
        Arc::new(Self {
            content_type,
            body,
            sent: Mutex::new(Vec::new()),
        })
    }
}

impl HttpTransport for CannedTransport {
    fn execute(&self, request: OutgoingRequest) -> TransportFuture<'_> {
        self.sent.lock().unwrap().push(request);
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(self.content_type));
        let response = TransportResponse {
            version: "HTTP/1.1".to_string(),
            status: 200,
            reason: "OK".to_string(),
            headers,
            trailers: HeaderMap::new(),
            body: Bytes::from_static(self.body),
        };
        Box::pin(async move { Ok(response) })
    }
}

fn view_model_with(transport: Arc<CannedTransport>, options: ViewOptions) -> ViewModel {
    ViewModel::new(
        options,
        KeyBindings::defaults(),
        transport,
        Arc::new(AtomicBool::new(true)),
        Dimensions::new(100, 40),
    )
}

fn view_model() -> ViewModel {
    view_model_with(
        CannedTransport::new("application/json", br#"{"a": 1, "items": [{"id": 7}]}"#),
        ViewOptions::default(),
    )
}

fn press(vm: &mut ViewModel, code: KeyCode) {
    vm.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
}

fn ctrl(vm: &mut ViewModel, c: char) {
    vm.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL));
}

fn type_text(vm: &mut ViewModel, text: &str) {
    for c in text.chars() {
        press(vm, KeyCode::Char(c));
    }
}

async fn send(vm: &mut ViewModel, url: &str) {
    vm.set_field_text(RegionId::Url, url);
    vm.execute_command(Command::Submit);
    assert!(vm.wait_for_update().await);
}

#[test]
fn new_view_model_should_seed_default_field_text() {
    let vm = view_model();
    assert_eq!(vm.region_text(RegionId::Url), "https://");
    assert_eq!(vm.region_text(RegionId::Method), "GET");
    assert_eq!(vm.region_text(RegionId::SearchPrompt), "search> ");
    assert_eq!(vm.focused_region(), RegionId::Url);
    assert!(vm.region_text(RegionId::StatusLine).starts_with("[buzz "));
}

#[test]
fn bad_header_should_abort_without_history() {
    let mut vm = view_model();
    vm.set_field_text(RegionId::Url, "http://example.com/");
    vm.set_field_text(RegionId::RequestHeaders, "BadHeaderNoColon");
    vm.execute_command(Command::Submit);

    assert_eq!(vm.region_text(RegionId::ResponseBody), "Invalid header: BadHeaderNoColon");
    assert!(vm.history().is_empty());
    assert!(!vm.is_request_in_flight());
    assert_eq!(vm.info_message(), None);
}

#[tokio::test]
async fn finished_exchange_should_land_in_history_and_regions() {
    let mut vm = view_model();
    vm.set_field_text(RegionId::Url, "http://example.com/");
    vm.execute_command(Command::Submit);
    assert_eq!(vm.info_message(), Some(SENDING_REQUEST));

    assert!(vm.wait_for_update().await);
    assert_eq!(vm.info_message(), None);
    assert_eq!(vm.history().len(), 1);
    assert!(vm
        .region_text(RegionId::ResponseHeaders)
        .starts_with("HTTP/1.1 200 OK\nContent-Type: application/json"));
    assert_eq!(vm.region_title(RegionId::ResponseBody), "Response body [json]");
    assert!(vm.region_text(RegionId::ResponseBody).contains("\"items\": ["));
    assert!(vm.region_text(RegionId::StatusLine).contains("[Request no.: 1/1]"));
    assert!(vm.region_text(RegionId::StatusLine).contains("[Search type: [json]]"));
}

#[tokio::test]
async fn second_submit_while_in_flight_should_be_refused() {
    let mut vm = view_model();
    vm.set_field_text(RegionId::Url, "http://example.com/");
    vm.execute_command(Command::Submit);
    vm.execute_command(Command::Submit);
    assert_eq!(vm.info_message(), Some("Request already in progress"));

    assert!(vm.wait_for_update().await);
    assert_eq!(vm.history().len(), 1);
    assert!(!vm.is_request_in_flight());
}

#[tokio::test]
async fn search_field_should_switch_body_to_results() {
    let mut vm = view_model();
    send(&mut vm, "http://example.com/").await;

    vm.focus_region(RegionId::Search);
    type_text(&mut vm, "items.#.id");
    assert!(vm.apply_pending_updates() > 0);
    assert_eq!(vm.region_title(RegionId::ResponseBody), "1 results");
    assert_eq!(vm.region_text(RegionId::ResponseBody), "-----\n7\n");
}

#[tokio::test]
async fn binary_body_without_context_search_should_fall_back_to_text() {
    let options = ViewOptions {
        context_specific_search: false,
        ..ViewOptions::default()
    };
    let mut vm = view_model_with(
        CannedTransport::new("application/octet-stream", b"\x00\x01raw"),
        options,
    );
    send(&mut vm, "http://example.com/blob").await;
    assert_eq!(vm.region_title(RegionId::ResponseBody), "Response body [binary]");

    vm.set_field_text(RegionId::Search, "missing");
    vm.print_body();
    assert_eq!(vm.region_title(RegionId::ResponseBody), "No results");
    assert_eq!(vm.region_text(RegionId::ResponseBody), "Error: no results");

    vm.set_field_text(RegionId::Search, "raw");
    vm.print_body();
    assert_eq!(vm.region_title(RegionId::ResponseBody), "1 results");
}

#[tokio::test]
async fn recall_should_restore_first_request_fields() {
    let mut vm = view_model();
    vm.set_field_text(RegionId::UrlParams, "a=1");
    send(&mut vm, "http://example.com/first").await;
    vm.set_field_text(RegionId::UrlParams, "");
    vm.set_field_text(RegionId::Method, "POST");
    send(&mut vm, "http://example.com/second").await;
    assert_eq!(vm.history().cursor(), 1);

    vm.restore_request(0);
    assert_eq!(vm.history().cursor(), 0);
    assert_eq!(vm.region_text(RegionId::Url), "http://example.com/first");
    assert_eq!(vm.region_text(RegionId::Method), "GET");
    assert_eq!(vm.region_text(RegionId::UrlParams), "a=1");
    assert!(vm.region_text(RegionId::StatusLine).contains("[Request no.: 1/2]"));

    vm.restore_request(5);
    assert_eq!(vm.history().cursor(), 0);
}

#[tokio::test]
async fn history_popup_enter_should_recall_selected_entry() {
    let mut vm = view_model();
    send(&mut vm, "http://example.com/one").await;
    send(&mut vm, "http://example.com/two").await;

    vm.execute_command(Command::History);
    assert_eq!(vm.open_popup(), Some(RegionId::History));
    assert_eq!(vm.highlighted_row(RegionId::History), Some(1));

    press(&mut vm, KeyCode::Up);
    press(&mut vm, KeyCode::Enter);
    assert_eq!(vm.open_popup(), None);
    assert_eq!(vm.region_text(RegionId::Url), "http://example.com/one");
}

#[test]
fn empty_history_popup_should_show_placeholder() {
    let mut vm = view_model();
    vm.execute_command(Command::History);
    assert_eq!(vm.region_text(RegionId::History), "[!] No items in history");
    vm.execute_command(Command::History);
    assert_eq!(vm.open_popup(), None);
}

#[test]
fn tab_should_cycle_focus_and_close_popups() {
    let mut vm = view_model();
    vm.execute_command(Command::Help);
    assert_eq!(vm.open_popup(), Some(RegionId::Help));

    press(&mut vm, KeyCode::Tab);
    assert_eq!(vm.open_popup(), None);
    assert_eq!(vm.focused_region(), RegionId::UrlParams);

    ctrl(&mut vm, 'k');
    ctrl(&mut vm, 'k');
    assert_eq!(vm.focused_region(), RegionId::ResponseBody);
}

#[test]
fn method_field_should_cycle_and_open_the_list() {
    let mut vm = view_model();
    vm.focus_region(RegionId::Method);
    press(&mut vm, KeyCode::Down);
    assert_eq!(vm.region_text(RegionId::Method), "POST");
    press(&mut vm, KeyCode::Up);
    press(&mut vm, KeyCode::Up);
    assert_eq!(vm.region_text(RegionId::Method), "GET");

    press(&mut vm, KeyCode::Enter);
    assert_eq!(vm.open_popup(), Some(RegionId::MethodList));
    assert_eq!(vm.highlighted_row(RegionId::MethodList), Some(0));
    press(&mut vm, KeyCode::Down);
    press(&mut vm, KeyCode::Down);
    press(&mut vm, KeyCode::Enter);
    assert_eq!(vm.region_text(RegionId::Method), "PUT");
    assert_eq!(vm.open_popup(), None);
}

#[test]
fn typing_a_header_prefix_should_open_suggestions() {
    let mut vm = view_model();
    vm.focus_region(RegionId::RequestHeaders);
    type_text(&mut vm, "Content-T");
    assert!(vm.suggestions_visible());
    assert_eq!(vm.region_text(RegionId::Autocomplete), "ype");

    press(&mut vm, KeyCode::Enter);
    assert!(!vm.suggestions_visible());
    assert_eq!(vm.region_text(RegionId::RequestHeaders), "Content-Type");
}

#[test]
fn enter_after_tabbing_back_should_not_complete_hidden_suggestion() {
    let mut vm = view_model();
    vm.focus_region(RegionId::RequestHeaders);
    type_text(&mut vm, "Content-T");
    assert!(vm.suggestions_visible());

    press(&mut vm, KeyCode::Tab);
    vm.focus_region(RegionId::RequestHeaders);
    assert!(!vm.suggestions_visible());

    press(&mut vm, KeyCode::Enter);
    assert_eq!(vm.region_text(RegionId::RequestHeaders), "Content-T\n");
}

#[test]
fn enter_after_resize_should_not_complete_hidden_suggestion() {
    let mut vm = view_model();
    vm.focus_region(RegionId::RequestHeaders);
    type_text(&mut vm, "Content-T");
    assert!(vm.suggestions_visible());

    vm.update_terminal_size(120, 50);
    assert!(!vm.suggestions_visible());

    press(&mut vm, KeyCode::Enter);
    assert_eq!(vm.region_text(RegionId::RequestHeaders), "Content-T\n");
}

#[test]
fn enter_after_delete_line_should_insert_newline() {
    let mut vm = view_model();
    vm.focus_region(RegionId::RequestHeaders);
    type_text(&mut vm, "Content-T");
    ctrl(&mut vm, 'd');
    assert!(!vm.suggestions_visible());

    press(&mut vm, KeyCode::Enter);
    assert_eq!(vm.region_text(RegionId::RequestHeaders), "\n");
}

#[test]
fn url_field_should_stay_single_line() {
    let mut vm = view_model();
    type_text(&mut vm, "example.com");
    press(&mut vm, KeyCode::Home);
    type_text(&mut vm, "x");
    assert_eq!(vm.region_text(RegionId::Url), "xhttps://example.com");
}

#[test]
fn save_request_flow_should_write_json_and_load_it_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("request.json");

    let mut vm = view_model();
    vm.set_field_text(RegionId::Url, "http://example.com/api");
    vm.set_field_text(RegionId::Method, "PATCH");
    vm.set_field_text(RegionId::UrlParams, "a=1\nb=2");
    vm.set_field_text(RegionId::RequestData, "{\"k\": 1}");
    vm.set_field_text(RegionId::RequestHeaders, "Content-Type: application/json");

    vm.execute_command(Command::SaveRequest);
    assert_eq!(vm.open_popup(), Some(RegionId::SaveFormat));
    press(&mut vm, KeyCode::Enter);
    assert_eq!(vm.open_popup(), Some(RegionId::SaveDialog));
    assert_eq!(vm.region_title(RegionId::SaveDialog), SAVE_REQUEST_TITLE);
    assert!(vm.region_text(RegionId::SaveDialog).ends_with('/'));

    vm.set_field_text(RegionId::SaveDialog, &path.display().to_string());
    press(&mut vm, KeyCode::Enter);
    assert_eq!(vm.open_popup(), Some(RegionId::SaveResult));
    assert_eq!(
        vm.region_text(RegionId::SaveResult),
        format!("Request saved successfully in {}", ExportFormat::Json.name())
    );
    press(&mut vm, KeyCode::Enter);
    assert_eq!(vm.open_popup(), None);

    let mut fresh = view_model();
    fresh.load_request(&path);
    assert_eq!(fresh.field_snapshot(), vm.field_snapshot());
}

#[test]
fn load_request_errors_should_show_in_response_body() {
    let dir = tempfile::tempdir().unwrap();
    let mut vm = view_model();

    vm.load_request(&dir.path().join("absent.json"));
    assert!(vm
        .region_text(RegionId::ResponseBody)
        .starts_with("File reading error: "));

    let garbage = dir.path().join("garbage.json");
    std::fs::write(&garbage, "not json").unwrap();
    vm.load_request(&garbage);
    assert!(vm
        .region_text(RegionId::ResponseBody)
        .starts_with("JSON decoding error: "));
}

#[test]
fn partial_request_file_should_only_touch_present_keys() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("partial.json");
    std::fs::write(&path, r#"{"method": "DELETE"}"#).unwrap();

    let mut vm = view_model();
    vm.set_field_text(RegionId::Url, "http://keep.me/");
    vm.load_request(&path);
    assert_eq!(vm.region_text(RegionId::Method), "DELETE");
    assert_eq!(vm.region_text(RegionId::Url), "http://keep.me/");
}

#[tokio::test]
async fn save_response_should_write_raw_body() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("body.bin");
    let mut vm = view_model();
    assert!(vm.save_response(&path).starts_with("Error saving response"));

    send(&mut vm, "http://example.com/").await;
    assert_eq!(vm.save_response(&path), "Response saved successfully.");
    assert_eq!(
        std::fs::read(&path).unwrap(),
        br#"{"a": 1, "items": [{"id": 7}]}"#
    );
}

#[test]
fn save_dialog_should_cancel_on_ctrl_q() {
    let mut vm = view_model();
    vm.execute_command(Command::SaveResponse);
    assert_eq!(vm.open_popup(), Some(RegionId::SaveDialog));
    ctrl(&mut vm, 'q');
    assert_eq!(vm.open_popup(), None);
}

#[test]
fn redirect_toggle_should_show_in_status_line() {
    let mut vm = view_model();
    press(&mut vm, KeyCode::F(11));
    assert!(vm.region_text(RegionId::StatusLine).ends_with("[Redirects Restricted Mode]"));
    press(&mut vm, KeyCode::F(11));
    assert!(!vm.region_text(RegionId::StatusLine).contains("Redirects"));
}

#[test]
fn too_small_terminal_should_ignore_editing_but_keep_focus() {
    let mut vm = view_model();
    vm.focus_region(RegionId::RequestData);
    vm.update_terminal_size(40, 10);
    type_text(&mut vm, "ignored");
    assert_eq!(vm.region_text(RegionId::RequestData), "");

    vm.update_terminal_size(100, 40);
    assert!(vm.layout_pass().frame != crate::repl::layout::Frame::TooSmall(None));
    assert_eq!(vm.focused_region(), RegionId::RequestData);
    type_text(&mut vm, "ok");
    assert_eq!(vm.region_text(RegionId::RequestData), "ok");
}

#[test]
fn quit_binding_should_raise_the_flag() {
    let mut vm = view_model();
    assert!(!vm.should_quit());
    ctrl(&mut vm, 'c');
    assert!(vm.should_quit());
}
