//! Turn submission and history endpoints

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::Ordering;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tokio::task::JoinError;

use super::ApiState;
use crate::history::{StatusKind, Turn, render_status};
use crate::orchestrator::TurnError;
use crate::voice::AudioClip;

/// Build turn and history router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/turn", post(submit_turn))
        .route("/history", get(get_history).delete(clear_history))
        .with_state(state)
}

/// Format of an uploaded PCM clip
#[derive(Debug, Deserialize)]
pub struct TurnParams {
    pub sample_rate: Option<u32>,
    #[serde(default = "default_channels")]
    pub channels: u16,
}

const fn default_channels() -> u16 {
    1
}

/// Result of one submitted turn
#[derive(Debug, Serialize)]
pub struct TurnResponse {
    pub ok: bool,
    pub status: String,
    pub status_kind: StatusKind,
    pub status_html: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    pub history_html: String,
}

/// Current transcript
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub history_html: String,
    pub turns: Vec<Turn>,
}

/// Transcript after clearing
#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub status: String,
    pub status_html: String,
    pub history_html: String,
}

/// Clears the in-flight flag when the request finishes, however it finishes
struct InFlightGuard<'a>(&'a ApiState);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.in_flight.store(false, Ordering::SeqCst);
    }
}

/// Send a recorded clip upstream and record the outcome
///
/// The body is raw little-endian 16-bit PCM described by the query string,
/// or a WAV file when sent as `audio/wav`. An empty body means nothing was
/// recorded.
async fn submit_turn(
    State(state): State<Arc<ApiState>>,
    Query(params): Query<TurnParams>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<TurnResponse>, TurnApiError> {
    if state.in_flight.swap(true, Ordering::SeqCst) {
        tracing::warn!("rejecting turn while another is in flight");
        return Err(TurnApiError::Busy(state.locale.messages().busy.to_string()));
    }
    let _guard = InFlightGuard(&state);

    let clip = decode_clip(&headers, &body, &params)?;
    let timestamp = Turn::timestamp_now();
    let orchestrator = state.session.lock().await.orchestrator().clone();

    let result = join_turn(
        tokio::task::spawn_blocking(move || orchestrator.send_turn(clip.as_ref())).await,
    );

    let mut session = state.session.lock().await;
    let outcome = session.record(timestamp, result);

    let audio_url = outcome
        .audio_path
        .as_deref()
        .and_then(|p| p.file_name())
        .map(|name| format!("/audio/{}", name.to_string_lossy()));

    Ok(Json(TurnResponse {
        ok: outcome.is_success(),
        status_html: outcome.status_html(),
        status: outcome.status,
        status_kind: outcome.status_kind,
        audio_url,
        history_html: session.history_html(),
    }))
}

/// Flatten the blocking task result; a panicked or cancelled task is `Unexpected`
fn join_turn(
    joined: Result<Result<PathBuf, TurnError>, JoinError>,
) -> Result<PathBuf, TurnError> {
    joined.unwrap_or_else(|e| {
        tracing::error!(error = %e, "voice request task failed");
        Err(TurnError::Unexpected(e.to_string()))
    })
}

/// Turn the request body into a clip; `None` when nothing was recorded
fn decode_clip(
    headers: &HeaderMap,
    body: &[u8],
    params: &TurnParams,
) -> Result<Option<AudioClip>, TurnApiError> {
    if body.is_empty() {
        return Ok(None);
    }

    let is_wav = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| matches!(ct, "audio/wav" | "audio/x-wav" | "audio/wave"))
        || body.starts_with(b"RIFF");

    let clip = if is_wav {
        AudioClip::from_wav(body)
    } else {
        let sample_rate = params
            .sample_rate
            .ok_or_else(|| {
                TurnApiError::BadRequest("sample_rate is required for PCM uploads".to_string())
            })?;
        AudioClip::from_pcm16le(body, sample_rate, params.channels)
    }
    .map_err(|e| TurnApiError::BadRequest(e.to_string()))?;

    Ok(Some(clip))
}

/// Get the rendered transcript and raw turns
async fn get_history(State(state): State<Arc<ApiState>>) -> Json<HistoryResponse> {
    let session = state.session.lock().await;
    Json(HistoryResponse {
        history_html: session.history_html(),
        turns: session.history().turns().to_vec(),
    })
}

/// Delete all history
async fn clear_history(State(state): State<Arc<ApiState>>) -> Json<ClearResponse> {
    let mut session = state.session.lock().await;
    let status = session.clear();
    Json(ClearResponse {
        status_html: render_status(&status, StatusKind::Success),
        status,
        history_html: session.history_html(),
    })
}

/// Turn API errors
#[derive(Debug)]
pub enum TurnApiError {
    Busy(String),
    BadRequest(String),
}

impl IntoResponse for TurnApiError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: ErrorBody,
            status_html: String,
        }

        #[derive(Serialize)]
        struct ErrorBody {
            code: &'static str,
            message: String,
        }

        let (status, code, message, kind) = match self {
            Self::Busy(msg) => (StatusCode::CONFLICT, "busy", msg, StatusKind::Warning),
            Self::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                "bad_request",
                msg,
                StatusKind::Error,
            ),
        };

        (
            status,
            Json(ErrorResponse {
                status_html: render_status(&message, kind),
                error: ErrorBody { code, message },
            }),
        )
            .into_response()
    }
}
