//! Chat history persistence
//!
//! History is an ordered, append-only log of [`Turn`]s mirrored to a single
//! JSON file. Persistence is best effort: read and write failures are logged
//! and never surfaced to callers.

mod render;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub use render::{StatusKind, render_history, render_status};

/// Timestamp format used for turns
const TIMESTAMP_FORMAT: &str = "%H:%M:%S";

/// One recorded exchange
///
/// Persisted as a three-element array `[user_label, assistant_label|null, timestamp]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TurnRecord", into = "TurnRecord")]
pub struct Turn {
    /// Label of the user side (voice message marker or error text)
    pub user_label: String,

    /// Label of the assistant side, absent for failed turns
    pub assistant_label: Option<String>,

    /// Local wall-clock time, `HH:MM:SS`
    pub timestamp: String,
}

#[derive(Serialize, Deserialize)]
struct TurnRecord(String, Option<String>, String);

impl From<TurnRecord> for Turn {
    fn from(TurnRecord(user_label, assistant_label, timestamp): TurnRecord) -> Self {
        Self {
            user_label,
            assistant_label,
            timestamp,
        }
    }
}

impl From<Turn> for TurnRecord {
    fn from(turn: Turn) -> Self {
        Self(turn.user_label, turn.assistant_label, turn.timestamp)
    }
}

impl Turn {
    /// Create a turn with an explicit timestamp
    #[must_use]
    pub fn new(
        user_label: impl Into<String>,
        assistant_label: Option<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            user_label: user_label.into(),
            assistant_label,
            timestamp: timestamp.into(),
        }
    }

    /// Current local time formatted as a turn timestamp
    #[must_use]
    pub fn timestamp_now() -> String {
        chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
    }

    /// Whether this turn records a failure rather than an exchange
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.assistant_label.is_none()
    }
}

/// Ordered log of turns backed by a JSON file
#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    turns: Vec<Turn>,
}

impl HistoryStore {
    /// Open the store at `path`, loading whatever history is on disk
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let turns = Self::load(&path);
        tracing::debug!(path = %path.display(), turns = turns.len(), "opened chat history");
        Self { path, turns }
    }

    /// Read persisted history
    ///
    /// A missing, unreadable or corrupt file yields an empty history.
    #[must_use]
    pub fn load(path: &Path) -> Vec<Turn> {
        if !path.exists() {
            return Vec::new();
        }

        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "failed to load chat history");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<Turn>>(&contents) {
            Ok(turns) => turns,
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "failed to load chat history");
                Vec::new()
            }
        }
    }

    /// Append a turn and rewrite the whole file
    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
        self.save();
    }

    /// Delete the persisted file and forget all turns
    pub fn clear(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::error!(
                    path = %self.path.display(),
                    error = %e,
                    "failed to delete chat history"
                );
            }
        }
        self.turns.clear();
        tracing::info!(path = %self.path.display(), "chat history cleared");
    }

    /// Turns in chronological order
    #[must_use]
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Number of recorded turns
    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether no turns are recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Location of the persisted file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) {
        let json = match serde_json::to_string_pretty(&self.turns) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize chat history");
                return;
            }
        };

        if let Err(e) = std::fs::write(&self.path, json) {
            tracing::error!(path = %self.path.display(), error = %e, "failed to save chat history");
        } else {
            tracing::debug!(
                path = %self.path.display(),
                turns = self.turns.len(),
                "saved chat history"
            );
        }
    }
}
