//! Voice Chat Web - browser front end for a remote voice-chat endpoint
//!
//! The browser records a clip and uploads it; the server relays it to the
//! voice-chat endpoint, stores the synthesized reply for playback and keeps
//! a persisted transcript of every turn.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                Browser page                  │
//! │   record  │  send  │  clear  │  play reply   │
//! └──────────────────────┬───────────────────────┘
//!                        │ HTTP (api)
//! ┌──────────────────────▼───────────────────────┐
//! │                 ChatSession                  │
//! │   Orchestrator  │  HistoryStore  │  render   │
//! └──────────────────────┬───────────────────────┘
//!                        │ multipart POST (blocking)
//! ┌──────────────────────▼───────────────────────┐
//! │          Voice-chat inference server         │
//! └──────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod history;
pub mod locale;
pub mod orchestrator;
pub mod session;
pub mod voice;

pub use config::Config;
pub use error::{Error, Result};
pub use history::{HistoryStore, StatusKind, Turn, render_history, render_status};
pub use locale::Locale;
pub use orchestrator::{
    HttpTransport, Orchestrator, Transport, TransportFailure, TurnError, UpstreamResponse,
};
pub use session::{ChatSession, TurnOutcome};
pub use voice::AudioClip;
