use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use lookalike::PROCESS_PATH;
use serde::Deserialize;
use std::{collections::HashMap, fs::File, path::Path};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to open config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid header in config: {0}")]
    Header(#[from] reqwest::header::InvalidHeaderName),
    #[error("invalid header value in config: {0}")]
    HeaderValue(#[from] reqwest::header::InvalidHeaderValue),
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Connection settings for the search backend. Every field is optional in
/// the config file.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub headers: HashMap<String, String>,
    /// Path of the search endpoint. A backend that only routes
    /// `/process/` must be configured with that exact path: a redirect
    /// can't replay the multipart upload.
    pub process_path: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            headers: HashMap::new(),
            process_path: PROCESS_PATH.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let config = serde_json::from_reader(file)?;
        Ok(config)
    }

    /// Resolve the config from, in order of precedence, an explicit URL,
    /// the `LOOKALIKE_URL` variable, a config file, and the defaults. The
    /// config file path comes from the CLI or `LOOKALIKE_CONFIG_PATH`.
    pub fn resolve(url: Option<String>, config_path: Option<String>) -> Result<Self, ConfigError> {
        let config_path = config_path.or_else(|| dotenvy::var("LOOKALIKE_CONFIG_PATH").ok());
        let mut config = match config_path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        if let Some(url) = url.or_else(|| dotenvy::var("LOOKALIKE_URL").ok()) {
            config.base_url = url;
        }
        Ok(config)
    }

    /// Default headers sent with every request.
    pub fn header_map(&self) -> Result<HeaderMap, ConfigError> {
        let mut header_map = HeaderMap::with_capacity(self.headers.len());
        for (name, value) in &self.headers {
            let name = HeaderName::from_bytes(name.as_bytes())?;
            let value = HeaderValue::from_str(value)?;
            header_map.insert(name, value);
        }
        Ok(header_map)
    }

    /// Base URL without trailing slashes so paths can be appended as-is.
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}
