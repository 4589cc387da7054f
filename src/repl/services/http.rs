//! # HTTP Service
//!
//! Turns the request fields into an [`OutgoingRequest`] and runs it off the
//! event loop.
//!
//! Validation (URL, query parameters, headers, body shape) happens
//! synchronously in [`HttpService::submit`] so that mistakes are reported
//! before anything is sent. The exchange itself runs on a spawned task and
//! reports back with a single [`Update::ExchangeFinished`].

use super::decoder::decode_body;
use super::transport::{
    HttpTransport, MultipartField, MultipartValue, OutgoingBody, OutgoingRequest,
};
use crate::repl::events::{Update, UpdateSender};
use crate::repl::models::FieldSnapshot;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_ENCODING, CONTENT_TYPE};
use reqwest::Method;
use std::collections::BTreeMap;
use std::fmt::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use url::Url;

/// Ways a submit can fail; the display text is what the response body shows
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("URL parse error: {0}")]
    Url(String),
    #[error("Invalid GET parameters: {0}")]
    Params(String),
    #[error("Invalid header: {0}")]
    Header(String),
    #[error("Invalid form data: {0}")]
    Form(String),
    #[error("Request error: {0}")]
    Request(String),
    #[error("Error: {0}")]
    Io(String),
    #[error("Response error: {0}")]
    Transport(String),
    #[error("Cannot uncompress response: {0}")]
    Decompress(String),
    #[error("Request already in progress")]
    Busy,
}

/// A finished exchange, body already decompressed
#[derive(Debug, Clone)]
pub struct CompletedExchange {
    pub snapshot: FieldSnapshot,
    /// Status line, sorted headers and sorted trailers, one per line
    pub response_headers: String,
    pub content_type: String,
    pub body: Bytes,
    pub duration: Duration,
}

pub type ExchangeResult = Result<CompletedExchange, SubmitError>;

/// Where a multipart field's content comes from
#[derive(Debug, Clone, PartialEq, Eq)]
enum FieldSource {
    Text(String),
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum BodyPlan {
    Empty,
    Raw(String),
    Multipart(Vec<(String, FieldSource)>),
}

/// A validated request whose multipart files have not been read yet
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: BodyPlan,
}

impl PreparedRequest {
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    async fn into_outgoing(self) -> Result<OutgoingRequest, SubmitError> {
        let body = match self.body {
            BodyPlan::Empty => OutgoingBody::Empty,
            BodyPlan::Raw(text) => OutgoingBody::Raw(text),
            BodyPlan::Multipart(fields) => {
                let mut resolved = Vec::with_capacity(fields.len());
                for (name, source) in fields {
                    let value = match source {
                        FieldSource::Text(text) => MultipartValue::Text(text),
                        FieldSource::File(path) => {
                            let data = tokio::fs::read(&path).await.map_err(|e| {
                                SubmitError::Io(format!("open {}: {e}", path.display()))
                            })?;
                            MultipartValue::File {
                                file_name: base_name(&path),
                                data,
                            }
                        }
                    };
                    resolved.push(MultipartField { name, value });
                }
                OutgoingBody::Multipart(resolved)
            }
        };
        Ok(OutgoingRequest {
            method: self.method,
            url: self.url,
            headers: self.headers,
            body,
        })
    }
}

fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

/// Strict form decoding: `+` is a space and every `%` needs two hex digits
fn decode_component(raw: &str) -> Result<String, String> {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let hi = bytes.get(i + 1).copied().and_then(hex_value);
                let lo = bytes.get(i + 2).copied().and_then(hex_value);
                match (hi, lo) {
                    (Some(hi), Some(lo)) => out.push(hi << 4 | lo),
                    _ => {
                        let escape: String = raw[i..].chars().take(3).collect();
                        return Err(format!("invalid URL escape \"{escape}\""));
                    }
                }
                i += 3;
            }
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            other => {
                out.push(other);
                i += 1;
            }
        }
    }
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// Parse `k=v` pairs separated by `&`; a missing `=` means an empty value
pub fn parse_query(raw: &str) -> Result<Vec<(String, String)>, String> {
    let mut pairs = Vec::new();
    for part in raw.split('&').filter(|part| !part.is_empty()) {
        if part.contains(';') {
            return Err("invalid semicolon separator in query".to_string());
        }
        let (key, value) = part.split_once('=').unwrap_or((part, ""));
        pairs.push((decode_component(key)?, decode_component(value)?));
    }
    Ok(pairs)
}

/// Add the params field to the URL's own query, re-encoded with keys sorted
pub fn merge_query(url: &mut Url, params: &str) -> Result<(), SubmitError> {
    let extra = parse_query(&params.replace('\n', "&")).map_err(SubmitError::Params)?;

    let mut merged: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (key, value) in url.query_pairs().into_owned().chain(extra) {
        merged.entry(key).or_default().push(value);
    }

    if merged.is_empty() {
        url.set_query(None);
        return Ok(());
    }
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, values) in &merged {
        for value in values {
            serializer.append_pair(key, value);
        }
    }
    url.set_query(Some(&serializer.finish()));
    Ok(())
}

/// Parse `Name: Value` lines; later duplicates replace earlier ones
pub fn parse_headers(text: &str) -> Result<HeaderMap, SubmitError> {
    let mut headers = HeaderMap::new();
    for line in text.split('\n').filter(|line| !line.is_empty()) {
        let invalid = || SubmitError::Header(line.to_string());
        let (name, value) = line.split_once(": ").ok_or_else(invalid)?;
        let name = HeaderName::from_bytes(name.trim().as_bytes()).map_err(|_| invalid())?;
        let value = HeaderValue::from_str(value).map_err(|_| invalid())?;
        headers.insert(name, value);
    }
    Ok(headers)
}

fn body_plan(method: &Method, data: &str, headers: &mut HeaderMap) -> Result<BodyPlan, SubmitError> {
    if !matches!(*method, Method::POST | Method::PUT | Method::PATCH) {
        return Ok(BodyPlan::Empty);
    }

    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if content_type.starts_with("multipart/form-data") {
        let pairs = parse_query(&data.replace('\n', "&")).map_err(SubmitError::Form)?;
        let fields = pairs
            .into_iter()
            .map(|(name, value)| match value.strip_prefix('@') {
                Some(path) => (name, FieldSource::File(PathBuf::from(path))),
                None => (name, FieldSource::Text(value)),
            })
            .collect();
        // the transport sets the type together with the boundary
        headers.remove(CONTENT_TYPE);
        return Ok(BodyPlan::Multipart(fields));
    }

    if content_type.starts_with("application/x-www-form-urlencoded") {
        return Ok(BodyPlan::Raw(data.replace('\n', "&")));
    }
    Ok(BodyPlan::Raw(data.to_string()))
}

/// Validate the fields and work out exactly what will be sent
pub fn prepare_request(snapshot: &FieldSnapshot) -> Result<PreparedRequest, SubmitError> {
    let mut url = Url::parse(&snapshot.url).map_err(|e| SubmitError::Url(e.to_string()))?;
    merge_query(&mut url, &snapshot.get_params)?;

    let method = if snapshot.method.is_empty() {
        Method::GET
    } else {
        Method::from_bytes(snapshot.method.as_bytes())
            .map_err(|_| SubmitError::Request(format!("invalid method {:?}", snapshot.method)))?
    };

    let mut headers = parse_headers(&snapshot.headers)?;
    let body = body_plan(&method, &snapshot.data, &mut headers)?;

    Ok(PreparedRequest {
        method,
        url,
        headers,
        body,
    })
}

/// `content-type` becomes `Content-Type`
pub fn canonical_header_name(name: &str) -> String {
    name.split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_ascii_uppercase().to_string() + &chars.as_str().to_ascii_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

/// One `Name: v1,v2` line per header name, sorted by canonical name
pub fn write_sorted_headers(output: &mut String, headers: &HeaderMap) {
    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in headers {
        grouped
            .entry(canonical_header_name(name.as_str()))
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }
    for (name, values) in grouped {
        let _ = writeln!(output, "{name}: {}", values.join(","));
    }
}

fn header_str(headers: &HeaderMap, name: HeaderName) -> String {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

async fn run_exchange(
    transport: Arc<dyn HttpTransport>,
    snapshot: FieldSnapshot,
    prepared: PreparedRequest,
) -> ExchangeResult {
    let outgoing = prepared.into_outgoing().await?;
    tracing::info!("sending {} {}", outgoing.method, outgoing.url);

    let start = Instant::now();
    let response = transport
        .execute(outgoing)
        .await
        .map_err(|e| SubmitError::Transport(format!("{e:#}")))?;
    let duration = start.elapsed();
    tracing::info!("received {} after {:?}", response.status, duration);

    let encoding = header_str(&response.headers, CONTENT_ENCODING);
    let body = decode_body(response.body, &encoding)
        .map_err(|e| SubmitError::Decompress(format!("{e:#}")))?;

    let mut response_headers = format!("{} {} {}\n", response.version, response.status, response.reason);
    write_sorted_headers(&mut response_headers, &response.headers);
    write_sorted_headers(&mut response_headers, &response.trailers);

    Ok(CompletedExchange {
        snapshot,
        response_headers,
        content_type: header_str(&response.headers, CONTENT_TYPE),
        body,
        duration,
    })
}

/// Runs at most one exchange at a time and reports through the update queue
#[derive(Debug)]
pub struct HttpService {
    transport: Arc<dyn HttpTransport>,
    follow_redirects: Arc<AtomicBool>,
    updates: UpdateSender,
    in_flight: bool,
}

impl HttpService {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        follow_redirects: Arc<AtomicBool>,
        updates: UpdateSender,
    ) -> Self {
        Self {
            transport,
            follow_redirects,
            updates,
            in_flight: false,
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Called by the loop once it has applied the finished exchange
    pub fn finish(&mut self) {
        self.in_flight = false;
    }

    pub fn follows_redirects(&self) -> bool {
        self.follow_redirects.load(Ordering::Relaxed)
    }

    /// Flip redirect following for subsequent requests, returning the new value
    pub fn toggle_redirects(&self) -> bool {
        let follow = !self.follow_redirects.fetch_xor(true, Ordering::Relaxed);
        tracing::debug!("http: follow redirects = {follow}");
        follow
    }

    /// Validate the fields and start the exchange in the background
    pub fn submit(&mut self, snapshot: FieldSnapshot) -> Result<(), SubmitError> {
        if self.in_flight {
            return Err(SubmitError::Busy);
        }
        let prepared = prepare_request(&snapshot)?;

        let transport = Arc::clone(&self.transport);
        let updates = self.updates.clone();
        self.in_flight = true;
        tokio::spawn(async move {
            let result = run_exchange(transport, snapshot, prepared).await;
            if let Err(e) = &result {
                tracing::warn!("request failed: {e}");
            }
            updates.send(Update::ExchangeFinished(Box::new(result)));
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(url: &str) -> FieldSnapshot {
        FieldSnapshot {
            url: url.to_string(),
            method: "GET".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn merge_query_should_sort_and_keep_existing_params() {
        let mut url = Url::parse("http://example.com/path?z=26&a=1").unwrap();
        merge_query(&mut url, "m=13\na=2").unwrap();
        assert_eq!(url.query(), Some("a=1&a=2&m=13&z=26"));
    }

    #[test]
    fn merge_query_should_reject_bad_escapes() {
        let mut url = Url::parse("http://example.com/").unwrap();
        let err = merge_query(&mut url, "a=%zz").unwrap_err();
        assert_eq!(err.to_string(), "Invalid GET parameters: invalid URL escape \"%zz\"");
    }

    #[test]
    fn empty_params_should_leave_no_question_mark() {
        let mut url = Url::parse("http://example.com/").unwrap();
        merge_query(&mut url, "").unwrap();
        assert_eq!(url.as_str(), "http://example.com/");
    }

    #[test]
    fn header_without_colon_should_abort() {
        let mut fields = snapshot("http://example.com/");
        fields.headers = "Accept: */*\nBadHeaderNoColon".to_string();
        let err = prepare_request(&fields).unwrap_err();
        assert_eq!(err, SubmitError::Header("BadHeaderNoColon".to_string()));
        assert_eq!(err.to_string(), "Invalid header: BadHeaderNoColon");
    }

    #[test]
    fn unparsable_url_should_report_parse_error() {
        let err = prepare_request(&snapshot("not a url")).unwrap_err();
        assert!(err.to_string().starts_with("URL parse error: "));
    }

    #[test]
    fn form_urlencoded_body_should_join_lines_with_ampersand() {
        let mut fields = snapshot("http://example.com/");
        fields.method = "POST".to_string();
        fields.data = "a=1\nb=2".to_string();
        fields.headers = "Content-Type: application/x-www-form-urlencoded".to_string();
        let prepared = prepare_request(&fields).unwrap();
        assert_eq!(prepared.body, BodyPlan::Raw("a=1&b=2".to_string()));
    }

    #[test]
    fn get_should_not_carry_a_body() {
        let mut fields = snapshot("http://example.com/");
        fields.data = "ignored".to_string();
        assert_eq!(prepare_request(&fields).unwrap().body, BodyPlan::Empty);
    }

    #[test]
    fn multipart_body_should_split_files_from_text_and_drop_content_type() {
        let mut fields = snapshot("http://example.com/upload");
        fields.method = "PUT".to_string();
        fields.data = "name=buzz\nfile=@/tmp/report.txt".to_string();
        fields.headers = "Content-Type: multipart/form-data".to_string();
        let prepared = prepare_request(&fields).unwrap();
        assert_eq!(
            prepared.body,
            BodyPlan::Multipart(vec![
                ("name".to_string(), FieldSource::Text("buzz".to_string())),
                ("file".to_string(), FieldSource::File(PathBuf::from("/tmp/report.txt"))),
            ])
        );
        assert!(prepared.headers().get(CONTENT_TYPE).is_none());
    }

    #[tokio::test]
    async fn missing_multipart_file_should_fail_with_io_error() {
        let prepared = PreparedRequest {
            method: Method::POST,
            url: Url::parse("http://example.com/").unwrap(),
            headers: HeaderMap::new(),
            body: BodyPlan::Multipart(vec![(
                "f".to_string(),
                FieldSource::File(PathBuf::from("/definitely/not/here.bin")),
            )]),
        };
        let err = prepared.into_outgoing().await.unwrap_err();
        assert!(err.to_string().starts_with("Error: open /definitely/not/here.bin"));
    }

    #[test]
    fn sorted_headers_should_be_canonical_and_joined() {
        let mut headers = HeaderMap::new();
        headers.insert("zebra", HeaderValue::from_static("z"));
        headers.insert("alpha", HeaderValue::from_static("a"));
        headers.append("mango", HeaderValue::from_static("1"));
        headers.append("mango", HeaderValue::from_static("2"));

        let mut out = String::new();
        write_sorted_headers(&mut out, &headers);
        assert_eq!(out, "Alpha: a\nMango: 1,2\nZebra: z\n");
    }

    #[test]
    fn canonical_header_name_should_capitalize_each_word() {
        assert_eq!(canonical_header_name("content-type"), "Content-Type");
        assert_eq!(canonical_header_name("X-REQUEST-ID"), "X-Request-Id");
        assert_eq!(canonical_header_name("etag"), "Etag");
    }
}
