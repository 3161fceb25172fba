//! Shared test utilities

#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use voice_chat_web::{
    AudioClip, ChatSession, HistoryStore, Locale, Orchestrator, Transport, TransportFailure,
    UpstreamResponse,
};

/// Transport that replays a fixed reply and counts calls
pub struct MockTransport {
    reply: Result<UpstreamResponse, TransportFailure>,
    calls: AtomicUsize,
    uploads: Mutex<Vec<(String, Vec<u8>)>>,
}

impl MockTransport {
    pub fn replying(reply: Result<UpstreamResponse, TransportFailure>) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: AtomicUsize::new(0),
            uploads: Mutex::new(Vec::new()),
        })
    }

    pub fn ok(body: &[u8]) -> Arc<Self> {
        Self::replying(Ok(UpstreamResponse::new(200, body.to_vec())))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn uploads(&self) -> Vec<(String, Vec<u8>)> {
        self.uploads.lock().unwrap().clone()
    }
}

impl Transport for MockTransport {
    fn post_audio(
        &self,
        file_name: &str,
        wav: Vec<u8>,
    ) -> Result<UpstreamResponse, TransportFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.uploads.lock().unwrap().push((file_name.to_string(), wav));
        self.reply.clone()
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Short mono clip
pub fn test_clip() -> AudioClip {
    AudioClip::mono(16_000, (0..1600_i16).map(|i| (i % 64) * 256).collect())
}

/// Orchestrator writing artifacts into `dir`
pub fn orchestrator(transport: Arc<MockTransport>, dir: &Path) -> Orchestrator {
    Orchestrator::new(transport, dir, "http://localhost:8000")
}

/// Session with history stored in `dir`
pub fn session(transport: Arc<MockTransport>, dir: &Path, locale: Locale) -> ChatSession {
    ChatSession::new(
        orchestrator(transport, dir),
        HistoryStore::open(dir.join("voice_chat_history.json")),
        locale,
    )
}
