//! TOML configuration file loading
//!
//! Supports `~/.config/voice-chat/config.toml` as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::locale::Locale;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct VoiceChatConfigFile {
    /// Upstream voice-chat endpoint settings
    #[serde(default)]
    pub upstream: UpstreamFileConfig,

    /// Local storage settings
    #[serde(default)]
    pub storage: StorageFileConfig,

    /// Web server settings
    #[serde(default)]
    pub server: ServerFileConfig,

    /// Language for the page and status messages
    pub locale: Option<Locale>,
}

/// Upstream endpoint configuration
#[derive(Debug, Default, Deserialize)]
pub struct UpstreamFileConfig {
    /// Endpoint URL (e.g. "http://localhost:8000/voice-chat")
    pub endpoint: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,
}

/// Storage configuration
#[derive(Debug, Default, Deserialize)]
pub struct StorageFileConfig {
    /// Path of the persisted history JSON file
    pub history_path: Option<PathBuf>,

    /// Directory receiving request and reply audio files
    pub artifact_dir: Option<PathBuf>,
}

/// Web server configuration
#[derive(Debug, Default, Deserialize)]
pub struct ServerFileConfig {
    /// Address to bind
    pub host: Option<String>,

    /// Port to listen on
    pub port: Option<u16>,
}

/// Load the TOML config file from `path`, or from the standard path when `None`
///
/// Returns `VoiceChatConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file(path: Option<&Path>) -> VoiceChatConfigFile {
    let Some(path) = path.map(Path::to_path_buf).or_else(config_file_path) else {
        return VoiceChatConfigFile::default();
    };

    if !path.exists() {
        return VoiceChatConfigFile::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                VoiceChatConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            VoiceChatConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/voice-chat/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("voice-chat").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_partial_file() {
        let config: VoiceChatConfigFile = toml::from_str(
            r#"
            locale = "en"

            [upstream]
            endpoint = "http://gpu-box:9000/voice-chat"

            [server]
            port = 8080
            "#,
        )
        .unwrap();

        assert_eq!(config.locale, Some(Locale::En));
        assert_eq!(
            config.upstream.endpoint.as_deref(),
            Some("http://gpu-box:9000/voice-chat")
        );
        assert!(config.upstream.timeout_secs.is_none());
        assert_eq!(config.server.port, Some(8080));
        assert!(config.storage.history_path.is_none());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_file(Some(&dir.path().join("nope.toml")));
        assert!(config.upstream.endpoint.is_none());
        assert!(config.locale.is_none());
    }

    #[test]
    fn unparsable_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[upstream\nendpoint = ").unwrap();
        let config = load_config_file(Some(&path));
        assert!(config.upstream.endpoint.is_none());
    }
}
