//! Chat session: the orchestrator plus the history it feeds
//!
//! A session turns each orchestrator result into a history entry and a
//! localized status line. Successful exchanges are recorded as a voice
//! message/voice reply pair; failures (except "nothing recorded") are
//! recorded as a turn whose user label is the error text.

use std::path::PathBuf;

use crate::history::{HistoryStore, StatusKind, Turn, render_history, render_status};
use crate::locale::Locale;
use crate::orchestrator::{Orchestrator, TurnError};
use crate::voice::AudioClip;

/// Result of one submission, ready for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    /// Reply audio on success
    pub audio_path: Option<PathBuf>,

    /// Localized status line
    pub status: String,

    /// Severity of the status line
    pub status_kind: StatusKind,

    /// Failure, if any
    pub error: Option<TurnError>,
}

impl TurnOutcome {
    /// Whether reply audio is available
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.audio_path.is_some()
    }

    /// Status line as banner markup
    #[must_use]
    pub fn status_html(&self) -> String {
        render_status(&self.status, self.status_kind)
    }
}

/// Orchestrator and history store for one interactive session
#[derive(Debug)]
pub struct ChatSession {
    orchestrator: Orchestrator,
    history: HistoryStore,
    locale: Locale,
}

impl ChatSession {
    /// Create a session
    #[must_use]
    pub const fn new(orchestrator: Orchestrator, history: HistoryStore, locale: Locale) -> Self {
        Self {
            orchestrator,
            history,
            locale,
        }
    }

    /// Run one full turn: send the clip, then record the outcome
    ///
    /// Blocks for the network round trip.
    pub fn submit(&mut self, audio: Option<&AudioClip>) -> TurnOutcome {
        let timestamp = Turn::timestamp_now();
        let result = self.orchestrator.send_turn(audio);
        self.record(timestamp, result)
    }

    /// Record an orchestrator result taken at `timestamp`
    ///
    /// Split from [`Self::submit`] so callers can run the blocking request
    /// without holding the session.
    pub fn record(&mut self, timestamp: String, result: Result<PathBuf, TurnError>) -> TurnOutcome {
        let messages = self.locale.messages();

        match result {
            Ok(path) => {
                self.history.append(Turn::new(
                    messages.user_voice_label,
                    Some(messages.assistant_voice_label.to_string()),
                    timestamp,
                ));
                TurnOutcome {
                    audio_path: Some(path),
                    status: messages.success.to_string(),
                    status_kind: StatusKind::Success,
                    error: None,
                }
            }
            Err(error) => {
                let status = messages.turn_error(&error);
                if error.is_recorded() {
                    self.history.append(Turn::new(status.clone(), None, timestamp));
                }
                TurnOutcome {
                    audio_path: None,
                    status,
                    status_kind: status_kind(&error),
                    error: Some(error),
                }
            }
        }
    }

    /// Forget all history; returns the localized confirmation
    pub fn clear(&mut self) -> String {
        self.history.clear();
        self.locale.messages().cleared.to_string()
    }

    /// Rendered transcript
    #[must_use]
    pub fn history_html(&self) -> String {
        render_history(self.history.turns(), self.locale.messages().empty_history)
    }

    /// Recorded turns
    #[must_use]
    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// The orchestrator used for submissions
    #[must_use]
    pub const fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    /// Session locale
    #[must_use]
    pub const fn locale(&self) -> Locale {
        self.locale
    }
}

/// Banner severity for a failed turn
#[must_use]
pub const fn status_kind(error: &TurnError) -> StatusKind {
    match error {
        TurnError::Timeout | TurnError::ConnectionFailure { .. } | TurnError::TransportError(_) => {
            StatusKind::Error
        }
        TurnError::NoInput
        | TurnError::SaveFailure(_)
        | TurnError::ServerError { .. }
        | TurnError::EmptyResponse
        | TurnError::ResponseWriteFailure(_)
        | TurnError::Unexpected(_) => StatusKind::Warning,
    }
}
