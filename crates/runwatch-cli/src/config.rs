//! Client configuration file and flag merging.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result, bail};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use runwatch_session::HttpApiConfig;
use serde::Deserialize;

/// Environment variable naming an alternative config file.
pub const CONFIG_ENV: &str = "RUNWATCH_CONFIG";

const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Contents of the TOML config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server_url: Option<String>,
    /// Base64 encoded access token.
    #[serde(default)]
    pub access_token: Option<String>,
    /// Request timeout in seconds.
    #[serde(default)]
    pub timeout: Option<u64>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub insecure: Option<bool>,
}

impl FileConfig {
    /// Read the config at `path`. A missing file is an empty config.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file");
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parse config {}", path.display()))
    }
}

/// Values given on the command line. These win over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub server_url: Option<String>,
    /// Plain access token.
    pub token: Option<String>,
    pub timeout: Option<u64>,
    pub language: Option<String>,
    pub insecure: bool,
}

/// Effective client settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_url: String,
    pub access_token: String,
    pub timeout: Duration,
    pub language: String,
    pub insecure: bool,
}

impl Settings {
    /// Merge flags over the file config.
    ///
    /// `locale` is the process locale, used when no language is set.
    pub fn resolve(file: FileConfig, flags: Overrides, locale: Option<&str>) -> Result<Self> {
        let server_url = flags
            .server_url
            .or(file.server_url)
            .filter(|url| !url.is_empty())
            .context("server URL not set, use --server-url or server_url in config")?;

        let access_token = match (flags.token, file.access_token) {
            (Some(token), _) if !token.is_empty() => token,
            (_, Some(encoded)) if !encoded.is_empty() => decode_token(&encoded)?,
            _ => bail!("access token not set, use --token or access_token in config"),
        };

        let language = flags
            .language
            .or(file.language)
            .filter(|lang| !lang.is_empty())
            .unwrap_or_else(|| language_from_locale(locale).to_string());

        let timeout = flags
            .timeout
            .or(file.timeout)
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Ok(Self {
            server_url,
            access_token,
            timeout: Duration::from_secs(timeout),
            language,
            insecure: flags.insecure || file.insecure.unwrap_or(false),
        })
    }

    #[must_use]
    pub fn api_config(&self) -> HttpApiConfig {
        HttpApiConfig {
            server_url: self.server_url.clone(),
            access_token: self.access_token.clone(),
            language: self.language.clone(),
            timeout: self.timeout,
            insecure: self.insecure,
        }
    }
}

/// Config file location: explicit path, else `~/.runwatch/config.toml`.
pub fn config_path(explicit: Option<PathBuf>) -> Option<PathBuf> {
    explicit.or_else(|| dirs::home_dir().map(|home| home.join(".runwatch").join("config.toml")))
}

fn decode_token(encoded: &str) -> Result<String> {
    let bytes = BASE64
        .decode(encoded.trim())
        .context("decode access_token in config")?;
    String::from_utf8(bytes).context("access_token in config is not UTF-8")
}

fn language_from_locale(locale: Option<&str>) -> &'static str {
    match locale {
        Some(l) if l.to_ascii_lowercase().starts_with("zh") => "ZH",
        _ => "EN",
    }
}
