//! # HTTP Management
//!
//! Submitting the request fields, applying the finished exchange when it
//! comes back through the update queue, and rendering the current history
//! entry into the response regions.

use crate::repl::events::{RegionId, Update};
use crate::repl::formatters::ResponseFormatter;
use crate::repl::models::{History, Request};
use crate::repl::services::{CompletedExchange, ExchangeResult, SubmitError};
use crate::repl::view_models::core::ViewModel;
use std::sync::Arc;

pub const SENDING_REQUEST: &str = "Sending request..";

impl ViewModel {
    /// Validate the fields and start the request in the background
    pub fn submit_request(&mut self) {
        if self.http.is_in_flight() {
            self.show_info(&SubmitError::Busy.to_string());
            return;
        }

        self.buffer_mut(RegionId::ResponseBody).clear();
        self.buffer_mut(RegionId::ResponseHeaders).clear();
        let title = self.default_title(RegionId::ResponseBody);
        self.set_title(RegionId::ResponseBody, title);

        let snapshot = self.field_snapshot();
        match self.http.submit(snapshot) {
            Ok(()) => self.show_info(SENDING_REQUEST),
            Err(e) => {
                tracing::warn!("request not sent: {e}");
                self.show_response_message(&e.to_string());
            }
        }
    }

    /// Apply everything queued by background work; returns how many updates ran
    pub fn apply_pending_updates(&mut self) -> usize {
        let updates = self.updates.drain();
        let count = updates.len();
        for update in updates {
            self.apply_update(update);
        }
        count
    }

    /// Wait for the next queued update and apply it
    pub async fn wait_for_update(&mut self) -> bool {
        match self.updates.recv().await {
            Some(update) => {
                self.apply_update(update);
                true
            }
            None => false,
        }
    }

    pub fn apply_update(&mut self, update: Update) {
        match update {
            Update::ExchangeFinished(result) => self.finish_exchange(*result),
            Update::RefreshSearch => self.print_body(),
        }
    }

    fn finish_exchange(&mut self, result: ExchangeResult) {
        self.http.finish();
        self.close_info();
        match result {
            Ok(exchange) => self.record_exchange(exchange),
            Err(e) => self.show_response_message(&e.to_string()),
        }
    }

    fn record_exchange(&mut self, exchange: CompletedExchange) {
        let formatter = self.formatters.select(&exchange.content_type);
        let CompletedExchange {
            snapshot,
            response_headers,
            content_type,
            body,
            duration,
            ..
        } = exchange;

        self.history.push(Request {
            url: snapshot.url,
            method: snapshot.method,
            get_params: snapshot.get_params,
            data: snapshot.data,
            headers: snapshot.headers,
            response_headers: response_headers.clone(),
            raw_response_body: Some(body),
            content_type,
            duration,
            formatter,
        });

        let headers = self.buffer_mut(RegionId::ResponseHeaders);
        headers.set_text(&response_headers);
        headers.move_to_buffer_start();

        self.print_body();
        self.refresh_status_line();
    }

    /// Replace the response body with a one-off message
    pub fn show_response_message(&mut self, message: &str) {
        let body = self.buffer_mut(RegionId::ResponseBody);
        body.set_text(message);
        body.move_to_buffer_start();
    }

    /// Render the current history entry, or its search results, into the body
    pub fn print_body(&mut self) {
        let Some(request) = self.history.current() else {
            return;
        };
        let Some(raw) = request.raw_response_body.clone() else {
            return;
        };
        let formatter = Arc::clone(&request.formatter);

        let base_title = self.default_title(RegionId::ResponseBody);
        self.set_title(RegionId::ResponseBody, format!("{base_title} {}", formatter.title()));

        let query = self.field_value(RegionId::Search);
        let context_specific = self.options.context_specific_search;
        if query.is_empty() || (context_specific && !formatter.searchable()) {
            self.render_formatted(formatter.as_ref(), &raw);
            return;
        }

        let search_formatter = if context_specific {
            formatter
        } else {
            self.formatters.default_formatter()
        };
        self.render_search(search_formatter.as_ref(), &query, &raw);
    }

    fn render_formatted(&mut self, formatter: &dyn ResponseFormatter, raw: &[u8]) {
        let mut output = String::new();
        if let Err(e) = formatter.format(&mut output, raw) {
            tracing::warn!("formatter {} failed: {e:#}", formatter.title());
            output.push_str(&format!("Error: cannot decode response body: {e:#}"));
        }

        let preserve = self.options.preserve_scroll_position;
        let body = self.buffer_mut(RegionId::ResponseBody);
        let origin = body.origin();
        body.set_text(&output);
        body.move_to_buffer_start();
        if preserve && !output.is_empty() {
            let row = origin.row.min(body.line_count().saturating_sub(1));
            body.set_origin(row, origin.col);
        }
    }

    fn render_search(&mut self, formatter: &dyn ResponseFormatter, query: &str, raw: &[u8]) {
        let output = match formatter.search(query, raw) {
            Err(e) => format!("Search error: {e:#}"),
            Ok(results) if results.is_empty() => {
                self.set_title(RegionId::ResponseBody, "No results");
                "Error: no results".to_string()
            }
            Ok(results) => {
                self.set_title(RegionId::ResponseBody, format!("{} results", results.len()));
                results
                    .iter()
                    .map(|result| format!("-----\n{result}\n"))
                    .collect()
            }
        };
        self.show_response_message(&output);
    }

    /// Put a history entry back into the fields without a network call
    pub fn restore_request(&mut self, index: usize) {
        if index >= self.history.len() {
            return;
        }
        self.close_popup();
        let Some(request) = self.history.recall(index) else {
            return;
        };
        let fields = [
            (RegionId::Url, request.url.clone()),
            (RegionId::Method, request.method.clone()),
            (RegionId::UrlParams, request.get_params.clone()),
            (RegionId::RequestData, request.data.clone()),
            (RegionId::RequestHeaders, request.headers.clone()),
            (RegionId::ResponseHeaders, request.response_headers.clone()),
        ];
        for (region, text) in fields {
            self.set_field_text(region, &text);
        }
        self.buffer_mut(RegionId::ResponseHeaders).move_to_buffer_start();
        tracing::debug!("history: recalled entry {index}");

        self.print_body();
        self.refresh_status_line();
    }

    /// Forget every recorded exchange
    pub fn clear_history(&mut self) {
        self.history = History::new();
        self.close_if_history_open();
        self.buffer_mut(RegionId::ResponseBody).clear();
        self.buffer_mut(RegionId::ResponseHeaders).clear();
        let title = self.default_title(RegionId::ResponseBody);
        self.set_title(RegionId::ResponseBody, title);
        self.refresh_status_line();
    }

    fn close_if_history_open(&mut self) {
        if self.open_popup() == Some(RegionId::History) {
            self.close_popup();
        }
    }

    pub fn toggle_redirects(&mut self) {
        self.http.toggle_redirects();
        self.refresh_status_line();
    }

    pub fn toggle_context_specific_search(&mut self) {
        self.options.context_specific_search = !self.options.context_specific_search;
        self.print_body();
        self.refresh_status_line();
    }
}
