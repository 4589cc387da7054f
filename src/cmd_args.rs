use crate::config::AppConfig;
use crate::repl::models::SavedRequest;
use crate::repl::services::transport::proxy_url;
use crate::repl::services::TlsVersion;
use anyhow::{anyhow, bail, Context, Result};
use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

pub use clap::Parser;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const JSON_CONTENT_TYPE: &str = "application/json";
const MULTIPART_CONTENT_TYPE: &str = "multipart/form-data";
const COMPRESSED_ENCODINGS: &str = "gzip, deflate";

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "buzz", version, about = "Interactive cli tool for HTTP inspection", long_about = None)]
struct ClapArgs {
    /// URL to prefill; the default scheme is added when missing
    url: Option<String>,

    #[arg(short = 'H', long = "header", value_name = "HEADER", help = "add a request header")]
    headers: Vec<String>,

    #[arg(short = 'd', long = "data", value_name = "DATA", help = "add form request data")]
    data: Vec<String>,

    #[arg(long = "data-binary", value_name = "DATA", help = "set raw request data")]
    data_binary: Option<String>,

    #[arg(long = "data-urlencode", value_name = "DATA", help = "add form request data, url-encoded")]
    data_urlencode: Vec<String>,

    #[arg(short = 'j', long = "json", value_name = "JSON", help = "set JSON request data and headers")]
    json: Option<String>,

    /// Multipart form data; values starting with @ are file paths to upload
    #[arg(short = 'F', long = "form", value_name = "DATA")]
    form: Option<String>,

    #[arg(short = 'X', long = "request", value_name = "METHOD", help = "request method")]
    method: Option<String>,

    #[arg(
        short = 't',
        long = "timeout",
        value_name = "MSECS",
        value_parser = clap::value_parser!(u64).range(1..),
        help = "request timeout in milliseconds"
    )]
    timeout: Option<u64>,

    #[arg(long, help = "ask for a gzip/deflate compressed response")]
    compressed: bool,

    #[arg(short = 'k', long, help = "allow insecure SSL certs")]
    insecure: bool,

    #[arg(short = 'R', long = "disable-redirects", help = "do not follow HTTP redirects")]
    disable_redirects: bool,

    #[arg(long = "tlsv1.0", help = "force TLS1.0 only")]
    tls_10: bool,

    #[arg(long = "tlsv1.1", help = "force TLS1.1 only")]
    tls_11: bool,

    #[arg(long = "tlsv1.2", help = "force TLS1.2 only")]
    tls_12: bool,

    #[arg(long = "tlsv1.3", help = "force TLS1.3 only")]
    tls_13: bool,

    /// Allowed TLS versions, e.g. `TLS1.1` or `TLS1.0,TLS1.2`
    #[arg(short = 'T', long = "tls", value_name = "MIN[,MAX]")]
    tls: Option<String>,

    #[arg(short = 'x', long = "proxy", value_name = "URL", help = "HTTP(S) or SOCKS5 proxy")]
    proxy: Option<String>,

    #[arg(short = 'f', long = "file", value_name = "REQUEST", help = "load a saved JSON request")]
    file: Option<PathBuf>,

    #[arg(short = 'c', long = "config", value_name = "PATH", help = "custom configuration file")]
    config: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CommandLineArgs {
    args: ClapArgs,
}

impl CommandLineArgs {
    pub fn parse() -> Self {
        Self {
            args: ClapArgs::parse(),
        }
    }

    pub fn parse_from<I, T>(itr: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Self {
            args: ClapArgs::parse_from(itr),
        }
    }

    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Ok(Self {
            args: ClapArgs::try_parse_from(itr)?,
        })
    }

    pub fn config_path(&self) -> Option<&str> {
        self.args.config.as_deref()
    }

    pub fn url(&self) -> Option<&str> {
        self.args.url.as_deref()
    }

    /// Override configuration values given on the command line
    pub fn apply_to(&self, config: &mut AppConfig) -> Result<()> {
        let args = &self.args;
        if let Some(ms) = args.timeout {
            config.http.timeout = Duration::from_millis(ms);
        }
        if args.insecure {
            config.http.insecure = true;
        }
        if args.disable_redirects {
            config.http.follow_redirects = false;
        }

        let forced = [
            (args.tls_10, TlsVersion::Tls10),
            (args.tls_11, TlsVersion::Tls11),
            (args.tls_12, TlsVersion::Tls12),
            (args.tls_13, TlsVersion::Tls13),
        ];
        for (set, version) in forced {
            if set {
                config.http.tls_min = version;
                config.http.tls_max = version;
            }
        }
        if let Some(range) = &args.tls {
            let (min, max) = parse_tls_range(range)?;
            config.http.tls_min = min;
            config.http.tls_max = max;
        }

        if let Some(proxy) = &args.proxy {
            let url = proxy_url(proxy).map_err(|e| anyhow!("invalid proxy URL: {e:#}"))?;
            config.http.proxy = Some(url.to_string());
        }
        Ok(())
    }

    /// Initial field values from the URL, data and header flags
    ///
    /// A request file given with `-f` is the base; flags are layered on top.
    pub fn seed_fields(&self, default_scheme: &str) -> Result<SavedRequest> {
        let args = &self.args;
        let mut seed = match &args.file {
            Some(path) => {
                let raw = std::fs::read(path)
                    .with_context(|| format!("cannot read request file {}", path.display()))?;
                SavedRequest::from_json(&raw)
                    .with_context(|| format!("cannot decode request file {}", path.display()))?
            }
            None => SavedRequest::default(),
        };

        if let Some(raw) = &args.url {
            let (url, params) = seed_url(raw, default_scheme)?;
            seed.url = Some(url);
            if !params.is_empty() {
                seed.get_params = Some(params);
            }
        }

        let mut body: Vec<String> = args.data.clone();
        body.extend(
            args.data_urlencode
                .iter()
                .map(|value| url::form_urlencoded::byte_serialize(value.as_bytes()).collect::<String>()),
        );
        let mut content_type = (!body.is_empty()).then_some(FORM_CONTENT_TYPE);
        let mut accept = None;
        if let Some(json) = &args.json {
            content_type = Some(JSON_CONTENT_TYPE);
            accept = Some(JSON_CONTENT_TYPE);
            body.push(json.clone());
        }
        if let Some(form) = &args.form {
            content_type = Some(MULTIPART_CONTENT_TYPE);
            body.push(form.clone());
        }
        if let Some(binary) = &args.data_binary {
            body.push(binary.clone());
        }

        match &args.method {
            Some(method) => {
                let method = method.to_ascii_uppercase();
                if content_type.is_none() && matches!(method.as_str(), "POST" | "PUT" | "PATCH") {
                    content_type = Some(FORM_CONTENT_TYPE);
                }
                seed.method = Some(method);
            }
            None if !body.is_empty() => seed.method = Some("POST".to_string()),
            None => {}
        }
        if !body.is_empty() {
            seed.data = Some(body.join("&"));
        }

        let mut headers: Vec<String> = seed
            .headers
            .as_deref()
            .map(|text| text.lines().map(str::to_string).collect())
            .unwrap_or_default();
        headers.extend(args.headers.iter().cloned());
        let extra = [
            ("Content-Type", content_type),
            ("Accept", accept),
            ("Accept-Encoding", args.compressed.then_some(COMPRESSED_ENCODINGS)),
        ];
        for (name, value) in extra {
            if let Some(value) = value {
                if !has_header(&headers, name) {
                    headers.push(format!("{name}: {value}"));
                }
            }
        }
        if !headers.is_empty() {
            seed.headers = Some(headers.join("\n"));
        }

        tracing::debug!("seeded fields from command line: {seed:?}");
        Ok(seed)
    }
}

/// Normalize the URL argument and split its query into `k=v` lines
fn seed_url(raw: &str, default_scheme: &str) -> Result<(String, String)> {
    let with_scheme = if raw.starts_with("http://") || raw.starts_with("https://") {
        raw.to_string()
    } else {
        format!("{}://{raw}", default_scheme.trim_end_matches("://"))
    };
    let mut url = Url::parse(&with_scheme).map_err(|_| anyhow!("invalid url"))?;
    if url.host_str().map_or(true, str::is_empty) {
        bail!("invalid url");
    }
    if url.path().is_empty() {
        url.set_path("/");
    }

    let params: Vec<String> = url
        .query_pairs()
        .map(|(key, value)| format!("{key}={value}"))
        .collect();
    url.set_query(None);
    Ok((url.to_string(), params.join("\n")))
}

fn parse_tls_range(range: &str) -> Result<(TlsVersion, TlsVersion)> {
    let (min, max) = range.split_once(',').unwrap_or((range, range));
    let min = min
        .parse()
        .map_err(|_| anyhow!("Minimum TLS version not found: {min}"))?;
    let max = max
        .parse()
        .map_err(|_| anyhow!("Maximum TLS version not found: {max}"))?;
    Ok((min, max))
}

fn has_header(lines: &[String], name: &str) -> bool {
    lines.iter().any(|line| {
        line.split_once(':')
            .is_some_and(|(header, _)| header.trim().eq_ignore_ascii_case(name))
    })
}
