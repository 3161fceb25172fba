//! User-facing strings
//!
//! Indonesian is the default locale; English is available for operators
//! running the front end elsewhere.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::Error;
use crate::orchestrator::TurnError;

/// Language used for status messages, history labels and the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// Bahasa Indonesia
    #[default]
    Id,
    /// English
    En,
}

impl Locale {
    /// String table for this locale
    #[must_use]
    pub const fn messages(self) -> &'static Messages {
        match self {
            Self::Id => &ID,
            Self::En => &EN,
        }
    }

    /// BCP 47 tag used for the page `lang` attribute
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::En => "en",
        }
    }
}

impl FromStr for Locale {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "id" | "id-id" | "indonesian" => Ok(Self::Id),
            "en" | "en-us" | "en-gb" | "english" => Ok(Self::En),
            other => Err(Error::Config(format!("unsupported locale: {other}"))),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Static string table for one locale
#[derive(Debug)]
pub struct Messages {
    pub app_title: &'static str,
    pub app_subtitle: &'static str,
    pub history_title: &'static str,
    pub record_title: &'static str,
    pub reply_title: &'static str,
    pub ready_to_record: &'static str,
    pub recording: &'static str,
    pub clear_button: &'static str,
    pub send_button: &'static str,
    pub footer: &'static str,
    pub ready: &'static str,
    pub processing: &'static str,
    pub busy: &'static str,
    pub success: &'static str,
    pub cleared: &'static str,
    pub empty_history: &'static str,
    pub user_voice_label: &'static str,
    pub assistant_voice_label: &'static str,
    pub microphone_denied: &'static str,
    no_input: &'static str,
    save_failure: &'static str,
    timeout: &'static str,
    connection_failure: &'static str,
    transport_error: &'static str,
    server_error: &'static str,
    status_code: &'static str,
    empty_response: &'static str,
    response_invalid: &'static str,
    response_write_failure: &'static str,
    unexpected: &'static str,
}

impl Messages {
    /// Localized text for a failed turn
    ///
    /// This text is shown in the status banner and, for every error except
    /// [`TurnError::NoInput`], recorded as the user label of a history turn.
    #[must_use]
    pub fn turn_error(&self, error: &TurnError) -> String {
        match error {
            TurnError::NoInput => self.no_input.to_string(),
            TurnError::SaveFailure(_) => self.save_failure.to_string(),
            TurnError::Timeout => self.timeout.to_string(),
            TurnError::ConnectionFailure { server } => {
                format!("{} {server}", self.connection_failure)
            }
            TurnError::TransportError(detail) => format!("{} {detail}", self.transport_error),
            TurnError::ServerError { status, detail } => {
                let detail = detail
                    .clone()
                    .unwrap_or_else(|| format!("{} {status}", self.status_code));
                format!("{} {detail}", self.server_error)
            }
            TurnError::EmptyResponse => self.empty_response.to_string(),
            TurnError::ResponseWriteFailure(None) => self.response_invalid.to_string(),
            TurnError::ResponseWriteFailure(Some(detail)) => {
                format!("{} {detail}", self.response_write_failure)
            }
            TurnError::Unexpected(detail) => format!("{} {detail}", self.unexpected),
        }
    }
}

static ID: Messages = Messages {
    app_title: "AI-Speech Response App",
    app_subtitle: "Asisten Suara Bahasa Indonesia",
    history_title: "Riwayat Percakapan",
    record_title: "Rekam Suara",
    reply_title: "Balasan Asisten",
    ready_to_record: "Siap merekam",
    recording: "Sedang merekam...",
    clear_button: "🗑️ Hapus Riwayat",
    send_button: "🚀 Kirim",
    footer: "SUARA AI © 2025 - Platform AI Berbasis Suara Bahasa Indonesia",
    ready: "Siap menerima pertanyaan",
    processing: "Memproses suara...",
    busy: "⏳ Permintaan sebelumnya masih diproses",
    success: "✅ Berhasil mendapatkan respons",
    cleared: "🗑️ Riwayat percakapan telah dihapus",
    empty_history: "Belum ada percakapan. Mulai dengan merekam suara Anda.",
    user_voice_label: "🎤 Pesan Suara",
    assistant_voice_label: "🔊 Balasan Suara",
    microphone_denied: "⚠️ Mikrofon tidak dapat diakses",
    no_input: "⚠️ Mohon rekam suara terlebih dahulu",
    save_failure: "⚠️ Gagal menyimpan file audio",
    timeout: "🕒 Waktu permintaan habis. Server membutuhkan waktu terlalu lama untuk merespons.",
    connection_failure: "🔌 Tidak dapat terhubung ke server. Pastikan server berjalan di",
    transport_error: "🔴 Error:",
    server_error: "⚠️ Server Error:",
    status_code: "Kode status:",
    empty_response: "⚠️ Server mengembalikan respons kosong",
    response_invalid: "⚠️ File audio respons kosong atau tidak valid",
    response_write_failure: "⚠️ Gagal menyimpan file audio respons:",
    unexpected: "⚠️ Terjadi kesalahan:",
};

static EN: Messages = Messages {
    app_title: "AI-Speech Response App",
    app_subtitle: "Voice Assistant",
    history_title: "Conversation History",
    record_title: "Record Voice",
    reply_title: "Assistant Reply",
    ready_to_record: "Ready to record",
    recording: "Recording...",
    clear_button: "🗑️ Clear History",
    send_button: "🚀 Send",
    footer: "SUARA AI © 2025 - Voice-Based AI Platform",
    ready: "Ready for your question",
    processing: "Processing voice...",
    busy: "⏳ A previous request is still being processed",
    success: "✅ Response received",
    cleared: "🗑️ Conversation history cleared",
    empty_history: "No conversation yet. Start by recording your voice.",
    user_voice_label: "🎤 Voice Message",
    assistant_voice_label: "🔊 Voice Reply",
    microphone_denied: "⚠️ Microphone is not available",
    no_input: "⚠️ Please record your voice first",
    save_failure: "⚠️ Failed to save the audio file",
    timeout: "🕒 The request timed out. The server took too long to respond.",
    connection_failure: "🔌 Cannot connect to the server. Make sure it is running at",
    transport_error: "🔴 Error:",
    server_error: "⚠️ Server Error:",
    status_code: "Status code:",
    empty_response: "⚠️ The server returned an empty response",
    response_invalid: "⚠️ The reply audio file is empty or invalid",
    response_write_failure: "⚠️ Failed to save the reply audio file:",
    unexpected: "⚠️ Something went wrong:",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_locale() {
        assert_eq!("id".parse::<Locale>().unwrap(), Locale::Id);
        assert_eq!(" EN ".parse::<Locale>().unwrap(), Locale::En);
        assert!("fr".parse::<Locale>().is_err());
    }

    #[test]
    fn server_error_falls_back_to_status_code() {
        let msg = Locale::Id.messages().turn_error(&TurnError::ServerError {
            status: 503,
            detail: None,
        });
        assert_eq!(msg, "⚠️ Server Error: Kode status: 503");
    }

    #[test]
    fn server_error_prefers_detail() {
        let msg = Locale::En.messages().turn_error(&TurnError::ServerError {
            status: 500,
            detail: Some("model not loaded".to_string()),
        });
        assert_eq!(msg, "⚠️ Server Error: model not loaded");
    }

    #[test]
    fn connection_failure_names_server() {
        let msg = Locale::Id.messages().turn_error(&TurnError::ConnectionFailure {
            server: "http://localhost:8000".to_string(),
        });
        assert!(msg.starts_with("🔌"));
        assert!(msg.ends_with("http://localhost:8000"));
    }
}
