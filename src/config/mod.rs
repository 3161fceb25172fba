//! Configuration management for the voice chat front end

pub mod file;

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::locale::Locale;
use crate::{Error, Result};

/// Default upstream voice-chat endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000/voice-chat";

/// Default upper bound for one upstream round trip
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Default web server port
pub const DEFAULT_PORT: u16 = 7860;

/// File name of the persisted history inside the temp directory
pub const HISTORY_FILE_NAME: &str = "voice_chat_history.json";

/// Directory for request and reply audio inside the temp directory
pub const ARTIFACT_DIR_NAME: &str = "voice-chat";

/// Voice chat front end configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Upstream endpoint configuration
    pub upstream: UpstreamConfig,

    /// Path of the persisted history JSON file
    pub history_path: PathBuf,

    /// Directory receiving request and reply audio files
    pub artifact_dir: PathBuf,

    /// Web server configuration
    pub server: ServerConfig,

    /// Language for the page and status messages
    pub locale: Locale,
}

/// Upstream voice-chat endpoint configuration
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Endpoint URL receiving the multipart upload
    pub endpoint: String,

    /// Upper bound for a single request
    pub timeout: Duration,
}

/// Web server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind
    pub host: String,

    /// Port to listen on
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        let temp_dir = std::env::temp_dir();
        Self {
            upstream: UpstreamConfig {
                endpoint: DEFAULT_ENDPOINT.to_string(),
                timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            },
            history_path: temp_dir.join(HISTORY_FILE_NAME),
            artifact_dir: temp_dir.join(ARTIFACT_DIR_NAME),
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: DEFAULT_PORT,
            },
            locale: Locale::default(),
        }
    }
}

impl Config {
    /// Load configuration (env > toml > default)
    ///
    /// `config_path` overrides the standard config file location.
    ///
    /// # Errors
    ///
    /// Returns error if an environment variable holds an invalid value
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let fc = file::load_config_file(config_path);
        let defaults = Self::default();

        let endpoint = std::env::var("VOICE_CHAT_ENDPOINT")
            .ok()
            .or(fc.upstream.endpoint)
            .unwrap_or(defaults.upstream.endpoint);

        let timeout_secs = match std::env::var("VOICE_CHAT_TIMEOUT_SECS") {
            Ok(raw) => raw.parse::<u64>().map_err(|e| {
                Error::Config(format!("invalid VOICE_CHAT_TIMEOUT_SECS '{raw}': {e}"))
            })?,
            Err(_) => fc.upstream.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        };

        let history_path = std::env::var("VOICE_CHAT_HISTORY_PATH")
            .ok()
            .map(PathBuf::from)
            .or(fc.storage.history_path)
            .unwrap_or(defaults.history_path);

        let artifact_dir = std::env::var("VOICE_CHAT_ARTIFACT_DIR")
            .ok()
            .map(PathBuf::from)
            .or(fc.storage.artifact_dir)
            .unwrap_or(defaults.artifact_dir);

        let port = match std::env::var("VOICE_CHAT_PORT") {
            Ok(raw) => raw
                .parse()
                .map_err(|e| Error::Config(format!("invalid VOICE_CHAT_PORT '{raw}': {e}")))?,
            Err(_) => fc.server.port.unwrap_or(DEFAULT_PORT),
        };

        let host = std::env::var("VOICE_CHAT_HOST")
            .ok()
            .or(fc.server.host)
            .unwrap_or(defaults.server.host);

        let locale = match std::env::var("VOICE_CHAT_LOCALE") {
            Ok(raw) => raw.parse()?,
            Err(_) => fc.locale.unwrap_or_default(),
        };

        let config = Self {
            upstream: UpstreamConfig {
                endpoint,
                timeout: Duration::from_secs(timeout_secs),
            },
            history_path,
            artifact_dir,
            server: ServerConfig { host, port },
            locale,
        };
        config.validate()?;

        Ok(config)
    }

    /// Check values that would only fail later at request time
    ///
    /// # Errors
    ///
    /// Returns error if the endpoint is not an http(s) URL or the timeout is zero
    pub fn validate(&self) -> Result<()> {
        let endpoint = &self.upstream.endpoint;
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(Error::Config(format!(
                "endpoint must be an http(s) URL: {endpoint}"
            )));
        }
        if self.upstream.timeout.is_zero() {
            return Err(Error::Config("timeout must be greater than zero".to_string()));
        }
        Ok(())
    }

    /// Ensure the artifact directory and the history file's parent exist
    ///
    /// # Errors
    ///
    /// Returns error if a directory cannot be created
    pub fn ensure_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(&self.artifact_dir)?;
        if let Some(parent) = self.history_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// Scheme, host and port of the endpoint, as shown to users when it is unreachable
    #[must_use]
    pub fn server_origin(&self) -> String {
        endpoint_origin(&self.upstream.endpoint)
    }
}

/// Strip the path from an endpoint URL
#[must_use]
pub fn endpoint_origin(endpoint: &str) -> String {
    reqwest::Url::parse(endpoint).map_or_else(
        |_| endpoint.to_string(),
        |url| url.origin().ascii_serialization(),
    )
}
