//! Interaction orchestrator
//!
//! One call to [`Orchestrator::send_turn`] is one upload/download cycle:
//! write the recorded clip to a WAV file, post it to the voice-chat
//! endpoint, and write the reply audio to a second file. Every failure is
//! terminal for that call; nothing is retried.

mod transport;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

pub use transport::{HttpTransport, Transport, TransportFailure, UpstreamResponse};

use crate::config::Config;
use crate::voice::AudioClip;

/// Why a turn produced no reply audio
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TurnError {
    /// Nothing was recorded
    #[error("no audio captured")]
    NoInput,

    /// The request clip could not be written to disk
    #[error("failed to save input audio: {0}")]
    SaveFailure(String),

    /// The upstream did not answer within the timeout
    #[error("request timed out")]
    Timeout,

    /// The upstream could not be reached
    #[error("cannot connect to {server}")]
    ConnectionFailure {
        /// Origin of the unreachable server
        server: String,
    },

    /// Any other transport failure
    #[error("request failed: {0}")]
    TransportError(String),

    /// The upstream answered with a non-200 status
    #[error("server returned status {status}")]
    ServerError {
        /// HTTP status code
        status: u16,
        /// `message` field of a JSON error body, if any
        detail: Option<String>,
    },

    /// The upstream answered 200 with no body
    #[error("server returned an empty response")]
    EmptyResponse,

    /// The reply audio could not be written, or the written file is empty
    #[error("failed to save response audio{}", detail_suffix(.0.as_deref()))]
    ResponseWriteFailure(Option<String>),

    /// Anything else that went wrong during the call
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl TurnError {
    /// Whether the failure should also be recorded in the chat history
    #[must_use]
    pub const fn is_recorded(&self) -> bool {
        !matches!(self, Self::NoInput)
    }
}

/// Runs the request/response cycle for recorded clips
#[derive(Clone)]
pub struct Orchestrator {
    transport: Arc<dyn Transport>,
    artifact_dir: PathBuf,
    server_origin: String,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("transport", &self.transport.name())
            .field("artifact_dir", &self.artifact_dir)
            .field("server_origin", &self.server_origin)
            .finish()
    }
}

impl Orchestrator {
    /// Create an orchestrator writing artifacts to `artifact_dir`
    ///
    /// `server_origin` is named in the connection-failure message.
    #[must_use]
    pub fn new(
        transport: Arc<dyn Transport>,
        artifact_dir: impl Into<PathBuf>,
        server_origin: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            artifact_dir: artifact_dir.into(),
            server_origin: server_origin.into(),
        }
    }

    /// Create an orchestrator using the HTTP transport from configuration
    ///
    /// # Errors
    ///
    /// Returns error if the configured endpoint is invalid
    pub fn from_config(config: &Config) -> crate::Result<Self> {
        let transport = HttpTransport::new(&config.upstream.endpoint, config.upstream.timeout)?;
        Ok(Self::new(
            Arc::new(transport),
            &config.artifact_dir,
            config.server_origin(),
        ))
    }

    /// Directory receiving request and reply audio
    #[must_use]
    pub fn artifact_dir(&self) -> &Path {
        &self.artifact_dir
    }

    /// Send one recorded clip and return the path of the reply audio
    ///
    /// Blocks for the whole network round trip. Must not be called on an
    /// async worker thread.
    ///
    /// # Errors
    ///
    /// Returns the [`TurnError`] describing the first failing step
    pub fn send_turn(&self, audio: Option<&AudioClip>) -> Result<PathBuf, TurnError> {
        let Some(clip) = audio.filter(|clip| !clip.is_empty()) else {
            tracing::warn!("no audio captured, skipping request");
            return Err(TurnError::NoInput);
        };

        tracing::info!(
            sample_rate = clip.sample_rate,
            channels = clip.channels,
            samples = clip.samples.len(),
            "processing voice request"
        );

        let input_name = artifact_name("input");
        let input_path = self.artifact_dir.join(&input_name);
        if let Err(e) = clip.write_wav(&input_path) {
            tracing::error!(path = %input_path.display(), error = %e, "failed to save input audio");
            return Err(TurnError::SaveFailure(e.to_string()));
        }
        if !input_path.exists() {
            tracing::error!(path = %input_path.display(), "input audio missing after write");
            return Err(TurnError::SaveFailure(format!(
                "{} was not created",
                input_path.display()
            )));
        }
        tracing::info!(path = %input_path.display(), "saved input audio");

        let wav = std::fs::read(&input_path).map_err(|e| {
            tracing::error!(path = %input_path.display(), error = %e, "failed to read input audio");
            TurnError::Unexpected(e.to_string())
        })?;

        let response = self
            .transport
            .post_audio(&input_name, wav)
            .map_err(|failure| self.transport_error(failure))?;

        self.handle_response(response)
    }

    fn transport_error(&self, failure: TransportFailure) -> TurnError {
        match failure {
            TransportFailure::Timeout => {
                tracing::error!(transport = self.transport.name(), "request timed out");
                TurnError::Timeout
            }
            TransportFailure::Connect(detail) => {
                tracing::error!(
                    transport = self.transport.name(),
                    error = %detail,
                    "connection error"
                );
                TurnError::ConnectionFailure {
                    server: self.server_origin.clone(),
                }
            }
            TransportFailure::Other(detail) => {
                tracing::error!(
                    transport = self.transport.name(),
                    error = %detail,
                    "request error"
                );
                TurnError::TransportError(detail)
            }
        }
    }

    fn handle_response(&self, response: UpstreamResponse) -> Result<PathBuf, TurnError> {
        if response.status != 200 {
            tracing::error!(status = response.status, "server returned error status");
            return Err(TurnError::ServerError {
                status: response.status,
                detail: error_message(&response.body),
            });
        }

        if response.body.is_empty() {
            tracing::error!("response content is empty");
            return Err(TurnError::EmptyResponse);
        }

        if !response.is_audio() {
            tracing::warn!(
                content_type = response.content_type.as_deref().unwrap_or_default(),
                "reply is not labelled as audio, saving it anyway"
            );
        }

        let output_path = self.artifact_dir.join(artifact_name("tts_output"));
        if let Err(e) = std::fs::write(&output_path, &response.body) {
            tracing::error!(
                path = %output_path.display(),
                error = %e,
                "failed to save response audio"
            );
            return Err(TurnError::ResponseWriteFailure(Some(e.to_string())));
        }

        let written = file_len(&output_path);
        if written == 0 {
            tracing::error!(path = %output_path.display(), "output file doesn't exist or is empty");
            return Err(TurnError::ResponseWriteFailure(None));
        }

        tracing::info!(path = %output_path.display(), bytes = written, "saved response audio");
        Ok(output_path)
    }
}

/// File name for a request or reply artifact, stamped with the current second
fn artifact_name(prefix: &str) -> String {
    format!("{prefix}_{}.wav", chrono::Utc::now().timestamp())
}

/// Size of a written artifact, 0 when it is missing
fn file_len(path: &Path) -> u64 {
    std::fs::metadata(path).map_or(0, |m| m.len())
}

fn detail_suffix(detail: Option<&str>) -> String {
    detail.map(|d| format!(": {d}")).unwrap_or_default()
}

/// Extract the `message` field from a JSON error body
fn error_message(body: &[u8]) -> Option<String> {
    if body.is_empty() {
        return None;
    }

    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    match value.get("message")? {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
