//! crates/hr_insight_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any transport or serialization format.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// The author of a message in the conversation transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

/// Server-reported details about how an answer was produced.
/// Only present on assistant messages created from a successful round-trip.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerMetadata {
    pub query_type: String,
    pub source_count: usize,
    pub response_time_seconds: f64,
}

/// A single entry in the conversation transcript.
#[derive(Debug, Clone)]
pub struct Message {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    pub metadata: Option<AnswerMetadata>,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Creates a user message with a client-assigned timestamp.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: Role::User,
            content: content.into(),
            metadata: None,
            timestamp: Utc::now(),
        }
    }

    /// Creates an assistant message, optionally carrying answer metadata.
    pub fn assistant(content: impl Into<String>, metadata: Option<AnswerMetadata>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: Role::Assistant,
            content: content.into(),
            metadata,
            timestamp: Utc::now(),
        }
    }
}

/// The ordered conversation state tied to one backend-issued identifier.
///
/// `session_id` is `None` until the backend assigns one on the first
/// successful response. `turn_count` is the authoritative server-side
/// conversation length, not a locally computed count.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub session_id: Option<String>,
    pub messages: Vec<Message>,
    pub turn_count: u32,
}

/// A successful answer from the query backend.
#[derive(Debug, Clone)]
pub struct QueryAnswer {
    pub answer: String,
    pub session_id: String,
    pub conversation_length: u32,
    pub query_type: String,
    pub sources: Vec<String>,
    pub response_time_seconds: f64,
}

/// Aggregate backend health, as reported by the status endpoint.
#[derive(Debug, Clone)]
pub struct SystemStatus {
    pub status: String,
    pub documents_indexed: u32,
    pub system_ready: bool,
    pub memory_enabled: bool,
    pub version: String,
}

/// Headcount for one department.
#[derive(Debug, Clone)]
pub struct DepartmentCount {
    pub department: String,
    pub count: u32,
}

/// One entry of the top-performers ranking.
#[derive(Debug, Clone)]
pub struct Performer {
    pub first_name: String,
    pub last_name: String,
    pub score: i32,
    pub title: Option<String>,
    pub department: Option<String>,
}

/// A message retrieved from the backend's conversation archive.
#[derive(Debug, Clone)]
pub struct ArchivedMessage {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// A full archived conversation, as returned by the history endpoint.
#[derive(Debug, Clone)]
pub struct ArchivedConversation {
    pub session_id: String,
    pub messages: Vec<ArchivedMessage>,
    pub total_messages: u32,
}

/// A single match from a cross-conversation search.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub session_id: String,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Statistics about the backend's conversation memory store.
#[derive(Debug, Clone)]
pub struct MemoryStats {
    pub total_sessions: u32,
    pub total_messages: u32,
    pub active_sessions_24h: u32,
    pub db_size_mb: f64,
    pub retention_days: u32,
}
