//! HTTP server for the browser front end

pub mod audio;
pub mod health;
pub mod page;
pub mod turn;

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use axum::{
    Router,
    extract::{DefaultBodyLimit, State},
    response::Html,
    routing::get,
};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;

use crate::locale::Locale;
use crate::session::ChatSession;
use crate::Result;

/// Largest accepted upload (about six minutes of 48 kHz stereo PCM)
pub const MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

/// Shared state for API handlers
#[derive(Debug)]
pub struct ApiState {
    /// The single interactive session
    pub session: Mutex<ChatSession>,
    /// Set while a turn is being processed
    pub in_flight: AtomicBool,
    /// Locale for page and error strings
    pub locale: Locale,
    /// Directory holding reply audio served under `/audio`
    pub artifact_dir: PathBuf,
}

impl ApiState {
    /// Wrap a session for sharing between handlers
    #[must_use]
    pub fn new(session: ChatSession) -> Arc<Self> {
        let locale = session.locale();
        let artifact_dir = session.orchestrator().artifact_dir().to_path_buf();
        Arc::new(Self {
            session: Mutex::new(session),
            in_flight: AtomicBool::new(false),
            locale,
            artifact_dir,
        })
    }
}

/// Serve the recorder page with the current transcript
async fn index(State(state): State<Arc<ApiState>>) -> Html<String> {
    let history_html = state.session.lock().await.history_html();
    Html(page::render_page(state.locale, &history_html))
}

/// Build the router with all routes
///
/// Same-origin only; no CORS layer is installed.
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/", get(index))
        .with_state(state.clone())
        .nest("/api", turn::router(state.clone()))
        .nest("/audio", audio::router(state.clone()))
        .merge(health::router())
        .merge(health::ready_router(state))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
}

/// Web server
pub struct ApiServer {
    state: Arc<ApiState>,
    host: String,
    port: u16,
}

impl ApiServer {
    /// Create a server for `session`
    #[must_use]
    pub fn new(session: ChatSession, host: impl Into<String>, port: u16) -> Self {
        Self {
            state: ApiState::new(session),
            host: host.into(),
            port,
        }
    }

    /// Run the server until Ctrl-C
    ///
    /// # Errors
    ///
    /// Returns error if server fails to bind or run
    pub async fn run(self) -> Result<()> {
        let addr = format!("{}:{}", self.host, self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| crate::Error::Server(format!("failed to bind {addr}: {e}")))?;

        tracing::info!(address = %addr, "voice chat front end listening on http://{addr}");

        axum::serve(listener, router(self.state))
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| crate::Error::Server(format!("server error: {e}")))?;

        tracing::info!("voice chat front end stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
