//! Upstream transport for the voice-chat endpoint

use std::time::Duration;

use reqwest::blocking::multipart::{Form, Part};

use crate::{Error, Result};

/// Raw upstream reply, before any classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResponse {
    /// HTTP status code
    pub status: u16,

    /// `Content-Type` header, if any
    pub content_type: Option<String>,

    /// Full response body
    pub body: Vec<u8>,
}

impl UpstreamResponse {
    /// Build a response without a content type
    #[must_use]
    pub const fn new(status: u16, body: Vec<u8>) -> Self {
        Self {
            status,
            content_type: None,
            body,
        }
    }

    /// Whether the reply is labelled as audio
    ///
    /// A missing `Content-Type` is taken on trust.
    #[must_use]
    pub fn is_audio(&self) -> bool {
        self.content_type
            .as_deref()
            .is_none_or(|ct| ct.trim().to_ascii_lowercase().starts_with("audio/"))
    }
}

/// Failure below the HTTP layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportFailure {
    /// The request did not complete within the timeout
    Timeout,

    /// The server could not be reached
    Connect(String),

    /// Any other transport failure
    Other(String),
}

/// Sends one audio upload to the voice-chat endpoint
///
/// Implementations block the calling thread until the reply is fully read
/// or the request fails. They never retry.
pub trait Transport: Send + Sync {
    /// Upload `wav` as multipart field `file` named `file_name`
    ///
    /// # Errors
    ///
    /// Returns a [`TransportFailure`] if no HTTP response was received
    fn post_audio(
        &self,
        file_name: &str,
        wav: Vec<u8>,
    ) -> std::result::Result<UpstreamResponse, TransportFailure>;

    /// Transport name for logging
    fn name(&self) -> &'static str;
}

/// Blocking HTTP transport backed by `reqwest`
///
/// A client is created per request on the calling thread, so the blocking
/// client's internal runtime is created and dropped outside any async
/// context. Call it from `spawn_blocking` or a plain thread.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    endpoint: String,
    timeout: Duration,
}

impl HttpTransport {
    /// Create a transport for `endpoint` with a fixed request timeout
    ///
    /// # Errors
    ///
    /// Returns error if the endpoint is not a valid URL
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let endpoint = endpoint.into();
        reqwest::Url::parse(&endpoint)
            .map_err(|e| Error::Config(format!("invalid endpoint '{endpoint}': {e}")))?;

        Ok(Self { endpoint, timeout })
    }

    /// Endpoint receiving uploads
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Request timeout
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Transport for HttpTransport {
    fn post_audio(
        &self,
        file_name: &str,
        wav: Vec<u8>,
    ) -> std::result::Result<UpstreamResponse, TransportFailure> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| TransportFailure::Other(format!("failed to create HTTP client: {e}")))?;

        let part = Part::bytes(wav)
            .file_name(file_name.to_string())
            .mime_str("audio/wav")
            .map_err(|e| TransportFailure::Other(e.to_string()))?;
        let form = Form::new().part("file", part);

        tracing::info!(endpoint = %self.endpoint, file_name, "sending voice request");

        let response = client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .map_err(classify)?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string);
        let body = response.bytes().map_err(classify)?.to_vec();

        tracing::info!(
            status,
            content_type = content_type.as_deref().unwrap_or_default(),
            content_length = body.len(),
            "received voice response"
        );

        Ok(UpstreamResponse {
            status,
            content_type,
            body,
        })
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// Map a `reqwest` error onto the transport taxonomy
///
/// Timeouts win over connection errors, so a connect timeout is a timeout.
fn classify(error: reqwest::Error) -> TransportFailure {
    if error.is_timeout() {
        TransportFailure::Timeout
    } else if error.is_connect() {
        TransportFailure::Connect(error.to_string())
    } else {
        TransportFailure::Other(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_endpoint() {
        assert!(HttpTransport::new("not a url", Duration::from_secs(1)).is_err());
    }

    #[test]
    fn audio_content_type_detection() {
        let mut response = UpstreamResponse::new(200, vec![1]);
        assert!(response.is_audio());

        response.content_type = Some("audio/wav".to_string());
        assert!(response.is_audio());

        response.content_type = Some("Audio/X-WAV".to_string());
        assert!(response.is_audio());

        response.content_type = Some("application/json".to_string());
        assert!(!response.is_audio());
    }

    #[test]
    fn keeps_settings() {
        let transport =
            HttpTransport::new("http://localhost:8000/voice-chat", Duration::from_secs(300))
                .unwrap();
        assert_eq!(transport.endpoint(), "http://localhost:8000/voice-chat");
        assert_eq!(transport.timeout(), Duration::from_secs(300));
        assert_eq!(transport.name(), "http");
    }
}
