//! # Request Model
//!
//! The five editable request fields as a [`FieldSnapshot`], the completed
//! [`Request`] kept in history, and the on-disk export formats.

use crate::repl::formatters::ResponseFormatter;
use anyhow::{Context, Result};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Field values read at submit or save time
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldSnapshot {
    pub url: String,
    pub method: String,
    #[serde(rename = "get")]
    pub get_params: String,
    pub data: String,
    pub headers: String,
}

/// A request file as read from disk; absent keys leave the field untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SavedRequest {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default, rename = "get")]
    pub get_params: Option<String>,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub headers: Option<String>,
}

impl SavedRequest {
    pub fn from_json(raw: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(raw)?)
    }
}

impl From<FieldSnapshot> for SavedRequest {
    fn from(snapshot: FieldSnapshot) -> Self {
        Self {
            url: Some(snapshot.url),
            method: Some(snapshot.method),
            get_params: Some(snapshot.get_params),
            data: Some(snapshot.data),
            headers: Some(snapshot.headers),
        }
    }
}

/// A finished exchange as stored in history
#[derive(Debug, Clone)]
pub struct Request {
    pub url: String,
    pub method: String,
    pub get_params: String,
    pub data: String,
    pub headers: String,
    pub response_headers: String,
    pub raw_response_body: Option<Bytes>,
    pub content_type: String,
    pub duration: Duration,
    pub formatter: Arc<dyn ResponseFormatter>,
}

/// Formats a request can be saved in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Curl,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 2] = [ExportFormat::Json, ExportFormat::Curl];

    pub const fn name(self) -> &'static str {
        match self {
            ExportFormat::Json => "JSON",
            ExportFormat::Curl => "curl",
        }
    }

    pub fn export(self, snapshot: &FieldSnapshot) -> Result<String> {
        match self {
            ExportFormat::Json => export_json(snapshot),
            ExportFormat::Curl => export_curl(snapshot),
        }
    }
}

pub fn export_json(snapshot: &FieldSnapshot) -> Result<String> {
    Ok(serde_json::to_string(snapshot)?)
}

/// A `curl` command line reproducing the request
pub fn export_curl(snapshot: &FieldSnapshot) -> Result<String> {
    let mut url = snapshot.url.clone();
    if !snapshot.get_params.is_empty() {
        url.push('?');
        url.push_str(&snapshot.get_params.replace('\n', "&"));
    }

    let mut args: Vec<&str> = vec!["curl"];
    for header in snapshot.headers.lines().filter(|line| !line.is_empty()) {
        args.extend(["-H", header]);
    }
    args.extend(["-X", &snapshot.method, "-d", &snapshot.data, &url]);

    let command = shlex::try_join(args).context("request contains a NUL byte")?;
    Ok(format!("{command}\n"))
}
