//! services/console/src/ui/transcript.rs
//!
//! Renders conversation messages to the terminal. This is the console
//! counterpart of the dashboard's chat bubbles: user and assistant lines
//! are colored by role, and assistant answers carry their metadata badges.

use colored::Colorize;
use hr_insight_core::domain::{AnswerMetadata, Message, Role};

/// Renders one message, including the metadata badges for answers.
pub fn render_message(message: &Message) -> String {
    match message.role {
        Role::User => format!("{} {}", "you >".bold().blue(), message.content),
        Role::Assistant => {
            let mut out = format!("{} {}", "hr  >".bold().green(), message.content);
            if let Some(metadata) = &message.metadata {
                out.push('\n');
                out.push_str(&format!("      {}", badges(metadata).dimmed()));
            }
            out
        }
    }
}

/// Renders a whole transcript, one message per paragraph.
pub fn render_transcript(messages: &[Message]) -> String {
    if messages.is_empty() {
        return "No messages yet. Ask something about your workforce data.".to_string();
    }
    messages
        .iter()
        .map(render_message)
        .collect::<Vec<_>>()
        .join("\n")
}

/// The badge line shown under an answer: query type, source count,
/// response time.
fn badges(metadata: &AnswerMetadata) -> String {
    format!(
        "[{}] [{} sources] [{:.1}s]",
        metadata.query_type, metadata.source_count, metadata.response_time_seconds
    )
}
