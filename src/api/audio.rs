//! Reply audio downloads
//!
//! Only reply artifacts (`tts_output_<seconds>.wav`) are reachable; every
//! other name in the artifact directory answers 404.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use tower::ServiceExt;
use tower_http::services::ServeFile;

use super::ApiState;

/// Build the reply audio router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/{file}", get(serve_reply))
        .with_state(state)
}

/// Whether `name` is a reply artifact written by the orchestrator
#[must_use]
pub fn is_reply_artifact(name: &str) -> bool {
    name.strip_prefix("tts_output_")
        .and_then(|rest| rest.strip_suffix(".wav"))
        .is_some_and(|stamp| !stamp.is_empty() && stamp.bytes().all(|b| b.is_ascii_digit()))
}

async fn serve_reply(
    State(state): State<Arc<ApiState>>,
    Path(file): Path<String>,
    request: Request,
) -> Response {
    if !is_reply_artifact(&file) {
        tracing::warn!(file = %file, "refusing to serve file that is not reply audio");
        return StatusCode::NOT_FOUND.into_response();
    }

    match ServeFile::new(state.artifact_dir.join(&file))
        .oneshot(request)
        .await
    {
        Ok(response) => response.into_response(),
        Err(never) => match never {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_only_reply_artifacts() {
        assert!(is_reply_artifact("tts_output_1760870400.wav"));

        assert!(!is_reply_artifact("tts_output_.wav"));
        assert!(!is_reply_artifact("input_1760870400.wav"));
        assert!(!is_reply_artifact("voice_chat_history.json"));
        assert!(!is_reply_artifact("tts_output_12.wav.bak"));
        assert!(!is_reply_artifact("tts_output_1a.wav"));
        assert!(!is_reply_artifact("..%2Ftts_output_1.wav"));
    }
}
