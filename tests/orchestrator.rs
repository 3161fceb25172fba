//! Orchestrator integration tests
//!
//! Classification is tested against a mock transport and, for the HTTP
//! transport, against a local stand-in for the voice-chat server.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    body::Bytes,
    http::{StatusCode, header},
    response::IntoResponse,
    routing::post,
};
use voice_chat_web::{
    AudioClip, HttpTransport, Orchestrator, TransportFailure, TurnError, UpstreamResponse,
};

mod common;
use common::{MockTransport, orchestrator, test_clip};

#[test]
fn no_audio_skips_network() {
    let dir = tempfile::tempdir().unwrap();
    let transport = MockTransport::ok(b"RIFF");
    let orch = orchestrator(transport.clone(), dir.path());

    assert_eq!(orch.send_turn(None), Err(TurnError::NoInput));
    assert_eq!(transport.calls(), 0);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn timeout_yields_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let transport = MockTransport::replying(Err(TransportFailure::Timeout));
    let orch = orchestrator(transport.clone(), dir.path());

    assert_eq!(orch.send_turn(Some(&test_clip())), Err(TurnError::Timeout));
    assert_eq!(transport.calls(), 1);

    let outputs = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().starts_with("tts_output_"))
        .count();
    assert_eq!(outputs, 0);
}

#[test]
fn empty_success_body_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let transport = MockTransport::ok(b"");
    let orch = orchestrator(transport, dir.path());

    assert_eq!(orch.send_turn(Some(&test_clip())), Err(TurnError::EmptyResponse));
}

#[test]
fn success_writes_exact_reply_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let reply: Vec<u8> = (0..=255).cycle().take(5000).collect();
    let transport = MockTransport::ok(&reply);
    let orch = orchestrator(transport, dir.path());

    let path = orch.send_turn(Some(&test_clip())).unwrap();

    assert!(path.starts_with(dir.path()));
    assert!(
        path.file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("tts_output_")
    );
    assert_eq!(std::fs::read(&path).unwrap(), reply);
}

#[test]
fn upload_is_the_saved_wav() {
    let dir = tempfile::tempdir().unwrap();
    let transport = MockTransport::ok(b"reply");
    let orch = orchestrator(transport.clone(), dir.path());
    let clip = test_clip();

    orch.send_turn(Some(&clip)).unwrap();

    let uploads = transport.uploads();
    assert_eq!(uploads.len(), 1);
    let (name, wav) = &uploads[0];
    assert!(name.starts_with("input_") && name.ends_with(".wav"));
    assert_eq!(&std::fs::read(dir.path().join(name)).unwrap(), wav);
    assert_eq!(AudioClip::from_wav(wav).unwrap(), clip);
}

#[test]
fn server_error_surfaces_json_message() {
    let dir = tempfile::tempdir().unwrap();
    let transport = MockTransport::replying(Ok(UpstreamResponse::new(
        500,
        br#"{"message": "TTS model failed"}"#.to_vec(),
    )));
    let orch = orchestrator(transport, dir.path());

    assert_eq!(
        orch.send_turn(Some(&test_clip())),
        Err(TurnError::ServerError {
            status: 500,
            detail: Some("TTS model failed".to_string()),
        })
    );
}

#[test]
fn server_error_without_json_keeps_status() {
    let dir = tempfile::tempdir().unwrap();
    let transport =
        MockTransport::replying(Ok(UpstreamResponse::new(502, b"Bad Gateway".to_vec())));
    let orch = orchestrator(transport, dir.path());

    assert_eq!(
        orch.send_turn(Some(&test_clip())),
        Err(TurnError::ServerError {
            status: 502,
            detail: None,
        })
    );
}

/// Start a stand-in voice-chat server, returning its endpoint URL
async fn spawn_upstream(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/voice-chat")
}

fn http_orchestrator(endpoint: &str, timeout: Duration, dir: &std::path::Path) -> Orchestrator {
    let transport = HttpTransport::new(endpoint, timeout).unwrap();
    Orchestrator::new(Arc::new(transport), dir, "http://127.0.0.1")
}

#[tokio::test(flavor = "multi_thread")]
async fn http_transport_uploads_multipart_and_saves_reply() {
    async fn voice_chat(body: Bytes) -> impl IntoResponse {
        let text = String::from_utf8_lossy(&body);
        if !text.contains("name=\"file\"") || !text.contains("filename=\"input_") {
            return (StatusCode::UNPROCESSABLE_ENTITY, Vec::new()).into_response();
        }
        ([(header::CONTENT_TYPE, "audio/wav")], b"RIFF-reply".to_vec()).into_response()
    }

    let endpoint = spawn_upstream(Router::new().route("/voice-chat", post(voice_chat))).await;
    let dir = tempfile::tempdir().unwrap();
    let orch = http_orchestrator(&endpoint, Duration::from_secs(10), dir.path());

    let path = tokio::task::spawn_blocking(move || orch.send_turn(Some(&test_clip())))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(std::fs::read(path).unwrap(), b"RIFF-reply");
}

#[tokio::test(flavor = "multi_thread")]
async fn http_transport_reads_error_message() {
    async fn voice_chat() -> impl IntoResponse {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({ "message": "model is loading" })),
        )
    }

    let endpoint = spawn_upstream(Router::new().route("/voice-chat", post(voice_chat))).await;
    let dir = tempfile::tempdir().unwrap();
    let orch = http_orchestrator(&endpoint, Duration::from_secs(10), dir.path());

    let result = tokio::task::spawn_blocking(move || orch.send_turn(Some(&test_clip())))
        .await
        .unwrap();

    assert_eq!(
        result,
        Err(TurnError::ServerError {
            status: 503,
            detail: Some("model is loading".to_string()),
        })
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn http_transport_times_out() {
    async fn voice_chat() -> &'static str {
        tokio::time::sleep(Duration::from_secs(5)).await;
        "too late"
    }

    let endpoint = spawn_upstream(Router::new().route("/voice-chat", post(voice_chat))).await;
    let dir = tempfile::tempdir().unwrap();
    let orch = http_orchestrator(&endpoint, Duration::from_millis(300), dir.path());

    let result = tokio::task::spawn_blocking(move || orch.send_turn(Some(&test_clip())))
        .await
        .unwrap();

    assert_eq!(result, Err(TurnError::Timeout));
}

#[tokio::test(flavor = "multi_thread")]
async fn http_transport_reports_refused_connection() {
    // Grab a free port, then close it so nothing is listening
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let endpoint = format!("http://127.0.0.1:{port}/voice-chat");
    let dir = tempfile::tempdir().unwrap();
    let orch = http_orchestrator(&endpoint, Duration::from_secs(5), dir.path());

    let result = tokio::task::spawn_blocking(move || orch.send_turn(Some(&test_clip())))
        .await
        .unwrap();

    assert_eq!(
        result,
        Err(TurnError::ConnectionFailure {
            server: "http://127.0.0.1".to_string()
        })
    );
}
