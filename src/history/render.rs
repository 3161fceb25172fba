//! HTML rendering for the transcript and status banner

use super::Turn;

/// Severity of a status banner
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    /// Neutral, e.g. "ready"
    Info,
    Success,
    Warning,
    Error,
}

impl StatusKind {
    const fn css_class(self) -> &'static str {
        match self {
            Self::Info => "status-message",
            Self::Success => "status-message status-success",
            Self::Warning => "status-message status-warning",
            Self::Error => "status-message status-error",
        }
    }
}

/// Render the full transcript
///
/// `empty_message` is shown when there are no turns. Assistant bubbles are
/// only emitted for turns that have an assistant label.
#[must_use]
pub fn render_history(turns: &[Turn], empty_message: &str) -> String {
    if turns.is_empty() {
        return format!(
            "<div class=\"empty-history\">{}</div>",
            escape_html(empty_message)
        );
    }

    let mut html = String::from("<div class=\"chat-container\">");
    for turn in turns {
        html.push_str(&bubble("user-bubble", "👤", &turn.user_label, &turn.timestamp));
        if let Some(assistant) = &turn.assistant_label {
            html.push_str(&bubble("assistant-bubble", "🤖", assistant, &turn.timestamp));
        }
    }
    html.push_str("</div>");
    html
}

/// Render the status banner shown under the recorder
#[must_use]
pub fn render_status(message: &str, kind: StatusKind) -> String {
    format!(
        "<div class=\"{}\">{}</div>",
        kind.css_class(),
        escape_html(message)
    )
}

fn bubble(class: &str, icon: &str, message: &str, timestamp: &str) -> String {
    format!(
        "<div class=\"chat-row\">\
         <div class=\"chat-bubble {class}\">\
         <div class=\"chat-content\">\
         <div class=\"chat-icon\">{icon}</div>\
         <div class=\"chat-message\">{}</div>\
         </div>\
         <div class=\"timestamp\">{}</div>\
         </div>\
         </div>",
        escape_html(message),
        escape_html(timestamp)
    )
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_history_shows_placeholder() {
        let html = render_history(&[], "Belum ada percakapan.");
        assert_eq!(
            html,
            "<div class=\"empty-history\">Belum ada percakapan.</div>"
        );
    }

    #[test]
    fn renders_both_sides_in_order() {
        let turns = vec![
            Turn::new("first", Some("reply one".to_string()), "10:00:00"),
            Turn::new("second", Some("reply two".to_string()), "10:05:00"),
        ];
        let html = render_history(&turns, "");

        assert!(html.starts_with("<div class=\"chat-container\">"));
        assert_eq!(html.matches("user-bubble").count(), 2);
        assert_eq!(html.matches("assistant-bubble").count(), 2);

        let first = html.find("first").unwrap();
        let reply = html.find("reply one").unwrap();
        let second = html.find("second").unwrap();
        assert!(first < reply && reply < second);
    }

    #[test]
    fn error_turn_has_no_assistant_bubble() {
        let turns = vec![Turn::new("🕒 timed out", None, "12:00:00")];
        let html = render_history(&turns, "");

        assert_eq!(html.matches("user-bubble").count(), 1);
        assert!(!html.contains("assistant-bubble"));
        assert_eq!(html.matches("12:00:00").count(), 1);
    }

    #[test]
    fn escapes_markup_in_labels() {
        let turns = vec![Turn::new("<script>alert(1)</script>", None, "00:00:00")];
        let html = render_history(&turns, "");

        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let turns = vec![Turn::new("a & b", Some("c".to_string()), "01:02:03")];
        assert_eq!(render_history(&turns, ""), render_history(&turns, ""));
    }

    #[test]
    fn status_classes() {
        assert_eq!(
            render_status("ok", StatusKind::Success),
            "<div class=\"status-message status-success\">ok</div>"
        );
        assert!(render_status("x", StatusKind::Error).contains("status-error"));
        assert!(render_status("x", StatusKind::Warning).contains("status-warning"));
        assert_eq!(
            render_status("ready", StatusKind::Info),
            "<div class=\"status-message\">ready</div>"
        );
    }
}
