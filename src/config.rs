//! Configuration file loading for buzz
//!
//! The file is INI. `[general]` holds client and display settings,
//! `[keys.<scope>]` sections rebind keys, where the scope is `global` or a
//! region name such as `url` or `response-body`:
//!
//! ```ini
//! [general]
//! timeout = 5000
//! default_url_scheme = http
//!
//! [keys.global]
//! CtrlR = submit
//! AltH =
//! ```
//!
//! An empty command removes the default binding for that key.

use crate::repl::commands::{BindingError, KeyBindings};
use crate::repl::services::{HttpSettings, TlsVersion};
use crate::repl::view_models::ViewOptions;
use ini::{Ini, Properties};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "~/.buzz/config";

/// Environment variable overriding the configuration file path
pub const CONFIG_PATH_ENV_VAR: &str = "BUZZ_CONFIG_PATH";

const GENERAL_SECTION: &str = "general";
const KEYS_SECTION_PREFIX: &str = "keys.";

const INI_TIMEOUT: &str = "timeout";
const INI_FORMAT_JSON: &str = "format_json";
const INI_INSECURE: &str = "insecure";
const INI_PRESERVE_SCROLL: &str = "preserve_scroll_position";
const INI_FOLLOW_REDIRECTS: &str = "follow_redirects";
const INI_DEFAULT_SCHEME: &str = "default_url_scheme";
const INI_CONTEXT_SEARCH: &str = "context_specific_search";
const INI_TLS_MIN: &str = "tls_version_min";
const INI_TLS_MAX: &str = "tls_version_max";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file specified but does not exist: \"{0}\"")]
    Missing(String),
    #[error("cannot read {path}: {message}")]
    Parse { path: String, message: String },
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
    #[error("[{section}] {source}")]
    Binding {
        section: String,
        #[source]
        source: BindingError,
    },
}

/// Get the configuration path, checking the environment variable first,
/// then falling back to the default
pub fn get_config_path() -> String {
    std::env::var_os(CONFIG_PATH_ENV_VAR)
        .and_then(|val| val.into_string().ok())
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
}

/// Everything read from the configuration file
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http: HttpSettings,
    pub view: ViewOptions,
    pub bindings: KeyBindings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            http: HttpSettings::default(),
            view: ViewOptions::default(),
            bindings: KeyBindings::defaults(),
        }
    }
}

impl AppConfig {
    /// Load from an explicit path, or from the default location
    ///
    /// An explicit path must exist; a missing default file means defaults.
    pub fn load(explicit: Option<&str>) -> Result<Self, ConfigError> {
        let (raw, required) = match explicit {
            Some(path) => (path.to_string(), true),
            None => (get_config_path(), false),
        };
        let path = shellexpand::tilde(&raw).to_string();

        if !Path::new(&path).exists() {
            if required {
                return Err(ConfigError::Missing(raw));
            }
            tracing::debug!("no config file at {path}, using defaults");
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(&path).map_err(|e| ConfigError::Parse {
            path: path.clone(),
            message: e.to_string(),
        })?;
        tracing::info!("loaded config from {path}");
        Self::from_ini(&ini)
    }

    pub fn parse_str(text: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(text).map_err(|e| ConfigError::Parse {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        Self::from_ini(&ini)
    }

    pub fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(general) = ini.section(Some(GENERAL_SECTION)) {
            config.apply_general(general)?;
        }

        for (name, section) in ini.iter() {
            let Some(scope) = name.and_then(|n| n.strip_prefix(KEYS_SECTION_PREFIX)) else {
                continue;
            };
            for (key, command) in section.iter() {
                config
                    .bindings
                    .bind_str(scope, key, command.trim())
                    .map_err(|source| ConfigError::Binding {
                        section: format!("{KEYS_SECTION_PREFIX}{scope}"),
                        source,
                    })?;
            }
        }
        Ok(config)
    }

    fn apply_general(&mut self, section: &Properties) -> Result<(), ConfigError> {
        if let Some(ms) = try_get::<u64>(section, INI_TIMEOUT)? {
            self.http.timeout = Duration::from_millis(ms);
        }
        if let Some(insecure) = try_get(section, INI_INSECURE)? {
            self.http.insecure = insecure;
        }
        if let Some(follow) = try_get(section, INI_FOLLOW_REDIRECTS)? {
            self.http.follow_redirects = follow;
        }
        if let Some(min) = try_get::<TlsVersion>(section, INI_TLS_MIN)? {
            self.http.tls_min = min;
        }
        if let Some(max) = try_get::<TlsVersion>(section, INI_TLS_MAX)? {
            self.http.tls_max = max;
        }
        if let Some(format_json) = try_get(section, INI_FORMAT_JSON)? {
            self.view.format_json = format_json;
        }
        if let Some(preserve) = try_get(section, INI_PRESERVE_SCROLL)? {
            self.view.preserve_scroll_position = preserve;
        }
        if let Some(context) = try_get(section, INI_CONTEXT_SEARCH)? {
            self.view.context_specific_search = context;
        }
        if let Some(scheme) = section.get(INI_DEFAULT_SCHEME) {
            self.view.default_url_scheme = scheme.trim().to_string();
        }
        Ok(())
    }
}

fn try_get<T: std::str::FromStr>(section: &Properties, key: &str) -> Result<Option<T>, ConfigError> {
    section
        .get(key)
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                value: raw.to_string(),
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repl::commands::{Command, Scope};
    use crate::repl::events::RegionId;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn test_default_config_path() {
        assert_eq!(DEFAULT_CONFIG_PATH, "~/.buzz/config");
        assert_eq!(CONFIG_PATH_ENV_VAR, "BUZZ_CONFIG_PATH");
    }

    #[test]
    fn general_section_should_override_defaults() {
        let config = AppConfig::parse_str(
            "[general]\n\
             timeout = 2500\n\
             insecure = true\n\
             follow_redirects = false\n\
             format_json = false\n\
             context_specific_search = false\n\
             default_url_scheme = http\n\
             tls_version_min = TLS1.2\n",
        )
        .unwrap();

        assert_eq!(config.http.timeout, Duration::from_millis(2500));
        assert!(config.http.insecure);
        assert!(!config.http.follow_redirects);
        assert_eq!(config.http.tls_min, TlsVersion::Tls12);
        assert_eq!(config.http.tls_max, TlsVersion::Tls13);
        assert!(!config.view.format_json);
        assert!(!config.view.context_specific_search);
        assert!(config.view.preserve_scroll_position);
        assert_eq!(config.view.default_url_scheme, "http");
    }

    #[test]
    fn bad_value_should_name_the_key() {
        let err = AppConfig::parse_str("[general]\ntimeout = soon\n").unwrap_err();
        assert_eq!(err.to_string(), "invalid value for timeout: \"soon\"");
    }

    #[test]
    fn key_sections_should_rebind_and_unbind() {
        let config = AppConfig::parse_str(
            "[keys.global]\n\
             CtrlR =\n\
             CtrlG = submit\n\
             [keys.response-body]\n\
             CtrlN = scrollDown\n",
        )
        .unwrap();

        let bindings = &config.bindings;
        assert_eq!(bindings.lookup(Scope::Global, &ctrl('r')), None);
        assert_eq!(bindings.lookup(Scope::Global, &ctrl('g')), Some(Command::Submit));
        assert_eq!(
            bindings.resolve(RegionId::ResponseBody, &ctrl('n')),
            Some(Command::ScrollDown)
        );
        assert_eq!(bindings.lookup(Scope::Global, &ctrl('c')), Some(Command::Quit));
    }

    #[test]
    fn unknown_command_should_fail_with_section() {
        let err = AppConfig::parse_str("[keys.global]\nCtrlR = launch\n").unwrap_err();
        assert!(matches!(err, ConfigError::Binding { ref section, .. } if section == "keys.global"));
    }

    #[test]
    fn explicit_missing_file_should_be_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.ini");
        let err = AppConfig::load(Some(&path.display().to_string())).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(_)));
    }

    #[test]
    fn explicit_file_should_be_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config");
        std::fs::write(&path, "[general]\npreserve_scroll_position = false\n").unwrap();
        let config = AppConfig::load(Some(&path.display().to_string())).unwrap();
        assert!(!config.view.preserve_scroll_position);
    }
}
