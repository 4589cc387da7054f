//! # HTTP Transport
//!
//! The boundary between the request pipeline and the network. The pipeline
//! hands over a fully validated [`OutgoingRequest`] and gets back the raw
//! status, headers and (still encoded) body. [`ReqwestTransport`] is the
//! production implementation; tests substitute their own.

use anyhow::{bail, Context, Result};
use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::redirect::Policy;
use reqwest::{Client, Method, Proxy};
use std::fmt::Debug;
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

const MAX_REDIRECTS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TlsVersion {
    Tls10,
    Tls11,
    Tls12,
    Tls13,
}

impl FromStr for TlsVersion {
    type Err = anyhow::Error;

    /// Accepts `TLS1.2`, `tlsv1.2` or a bare `1.2`
    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_ascii_lowercase();
        let number = lower.trim_start_matches("tls").trim_start_matches('v');
        match number {
            "1.0" => Ok(TlsVersion::Tls10),
            "1.1" => Ok(TlsVersion::Tls11),
            "1.2" => Ok(TlsVersion::Tls12),
            "1.3" => Ok(TlsVersion::Tls13),
            _ => bail!("unknown TLS version: {s}"),
        }
    }
}

impl From<TlsVersion> for reqwest::tls::Version {
    fn from(version: TlsVersion) -> Self {
        match version {
            TlsVersion::Tls10 => reqwest::tls::Version::TLS_1_0,
            TlsVersion::Tls11 => reqwest::tls::Version::TLS_1_1,
            TlsVersion::Tls12 => reqwest::tls::Version::TLS_1_2,
            TlsVersion::Tls13 => reqwest::tls::Version::TLS_1_3,
        }
    }
}

/// Client-wide settings, fixed for the lifetime of the client
#[derive(Debug, Clone, PartialEq)]
pub struct HttpSettings {
    pub timeout: Duration,
    pub insecure: bool,
    pub tls_min: TlsVersion,
    pub tls_max: TlsVersion,
    pub proxy: Option<String>,
    pub follow_redirects: bool,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(60_000),
            insecure: false,
            tls_min: TlsVersion::Tls10,
            tls_max: TlsVersion::Tls13,
            proxy: None,
            follow_redirects: true,
        }
    }
}

/// Normalize a proxy address, defaulting to `http://` when no scheme is given
pub fn proxy_url(raw: &str) -> Result<Url> {
    let raw = raw.trim();
    let with_scheme = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("http://{raw}")
    };
    let url = Url::parse(&with_scheme).with_context(|| format!("invalid proxy address: {raw}"))?;
    match url.scheme() {
        "http" | "https" | "socks5" | "socks5h" => Ok(url),
        other => bail!("unsupported proxy scheme: {other}"),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MultipartValue {
    Text(String),
    File { file_name: String, data: Vec<u8> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartField {
    pub name: String,
    pub value: MultipartValue,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OutgoingBody {
    #[default]
    Empty,
    Raw(String),
    Multipart(Vec<MultipartField>),
}

/// A validated request ready to be put on the wire
#[derive(Debug, Clone)]
pub struct OutgoingRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: OutgoingBody,
}

/// What came back, before any content decoding
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// Protocol label such as `HTTP/1.1`
    pub version: String,
    pub status: u16,
    pub reason: String,
    pub headers: HeaderMap,
    pub trailers: HeaderMap,
    pub body: Bytes,
}

pub type TransportFuture<'a> = Pin<Box<dyn Future<Output = Result<TransportResponse>> + Send + 'a>>;

/// "Submit request, get response"
pub trait HttpTransport: Debug + Send + Sync {
    fn execute(&self, request: OutgoingRequest) -> TransportFuture<'_>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Build the shared client; `follow_redirects` is re-read on every redirect
    pub fn new(settings: &HttpSettings, follow_redirects: Arc<AtomicBool>) -> Result<Self> {
        let policy = Policy::custom(move |attempt| {
            if !follow_redirects.load(Ordering::Relaxed) {
                attempt.stop()
            } else if attempt.previous().len() > MAX_REDIRECTS {
                attempt.error(format!("stopped after {MAX_REDIRECTS} redirects"))
            } else {
                attempt.follow()
            }
        });

        let mut builder = Client::builder()
            .timeout(settings.timeout)
            .redirect(policy)
            .danger_accept_invalid_certs(settings.insecure)
            .min_tls_version(settings.tls_min.into())
            .max_tls_version(settings.tls_max.into());

        if let Some(proxy) = &settings.proxy {
            let url = proxy_url(proxy)?;
            tracing::debug!("transport: using proxy {url}");
            builder = builder.proxy(Proxy::all(url)?);
        }

        let client = builder.build().context("failed to build HTTP client")?;
        tracing::info!("HTTP client created");
        Ok(Self { client })
    }
}

fn multipart_form(fields: Vec<MultipartField>) -> Result<reqwest::multipart::Form> {
    let mut form = reqwest::multipart::Form::new();
    for field in fields {
        form = match field.value {
            MultipartValue::Text(text) => form.text(field.name, text),
            MultipartValue::File { file_name, data } => {
                let part = reqwest::multipart::Part::bytes(data)
                    .file_name(file_name)
                    .mime_str("application/octet-stream")?;
                form.part(field.name, part)
            }
        };
    }
    Ok(form)
}

impl HttpTransport for ReqwestTransport {
    fn execute(&self, request: OutgoingRequest) -> TransportFuture<'_> {
        Box::pin(async move {
            let mut builder = self
                .client
                .request(request.method, request.url)
                .headers(request.headers);
            builder = match request.body {
                OutgoingBody::Empty => builder,
                OutgoingBody::Raw(text) => builder.body(text),
                OutgoingBody::Multipart(fields) => builder.multipart(multipart_form(fields)?),
            };

            let response = builder.send().await?;
            let status = response.status();
            let version = format!("{:?}", response.version());
            let headers = response.headers().clone();
            let body = response.bytes().await?;

            Ok(TransportResponse {
                version,
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
                headers,
                trailers: HeaderMap::new(),
                body,
            })
        })
    }
}
