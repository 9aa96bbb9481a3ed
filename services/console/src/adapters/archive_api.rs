//! services/console/src/adapters/archive_api.rs
//!
//! This module contains the adapter for the backend's conversation memory
//! endpoints. It implements the `ConversationArchiveService` port from the
//! `core` crate.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use hr_insight_core::domain::{ArchivedConversation, ArchivedMessage, MemoryStats, Role, SearchHit};
use hr_insight_core::ports::{ConversationArchiveService, PortError, PortResult};
use serde::Deserialize;
use serde_json::Value;

use crate::adapters::backend::Backend;

//=========================================================================================
// "Impure" Wire Record Structs
//=========================================================================================

#[derive(Deserialize)]
struct ArchivedMessageRecord {
    role: String,
    content: String,
    timestamp: String,
}

impl ArchivedMessageRecord {
    fn to_domain(self) -> PortResult<ArchivedMessage> {
        Ok(ArchivedMessage {
            role: parse_role(&self.role),
            content: self.content,
            timestamp: parse_timestamp(&self.timestamp)?,
        })
    }
}

#[derive(Deserialize)]
struct ConversationRecord {
    session_id: String,
    messages: Vec<ArchivedMessageRecord>,
    total_messages: u32,
}

impl ConversationRecord {
    fn to_domain(self) -> PortResult<ArchivedConversation> {
        Ok(ArchivedConversation {
            session_id: self.session_id,
            messages: self
                .messages
                .into_iter()
                .map(|r| r.to_domain())
                .collect::<PortResult<Vec<_>>>()?,
            total_messages: self.total_messages,
        })
    }
}

#[derive(Deserialize)]
struct SearchHitRecord {
    session_id: String,
    role: String,
    content: String,
    timestamp: String,
}

impl SearchHitRecord {
    fn to_domain(self) -> PortResult<SearchHit> {
        Ok(SearchHit {
            session_id: self.session_id,
            role: parse_role(&self.role),
            content: self.content,
            timestamp: parse_timestamp(&self.timestamp)?,
        })
    }
}

#[derive(Deserialize)]
struct SearchResultsRecord {
    results: Vec<SearchHitRecord>,
}

#[derive(Deserialize)]
struct MemoryStatsRecord {
    total_sessions: u32,
    total_messages: u32,
    active_sessions_24h: u32,
    db_size_mb: f64,
    retention_days: u32,
}

impl MemoryStatsRecord {
    fn to_domain(self) -> MemoryStats {
        MemoryStats {
            total_sessions: self.total_sessions,
            total_messages: self.total_messages,
            active_sessions_24h: self.active_sessions_24h,
            db_size_mb: self.db_size_mb,
            retention_days: self.retention_days,
        }
    }
}

/// Anything that is not a user message renders as the assistant, matching
/// the dashboard's lenient handling of archived roles.
fn parse_role(raw: &str) -> Role {
    if raw.eq_ignore_ascii_case("user") {
        Role::User
    } else {
        Role::Assistant
    }
}

/// The memory store emits `YYYY-MM-DD HH:MM:SS` strings while newer backend
/// versions emit RFC 3339; accept both.
fn parse_timestamp(raw: &str) -> PortResult<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .map(|naive| Utc.from_utc_datetime(&naive))
        .map_err(|_| PortError::Malformed(format!("Unrecognized timestamp '{raw}'")))
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `ConversationArchiveService` port.
#[derive(Clone)]
pub struct HttpArchiveAdapter {
    backend: Backend,
}

impl HttpArchiveAdapter {
    /// Creates a new `HttpArchiveAdapter`.
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl ConversationArchiveService for HttpArchiveAdapter {
    async fn conversation(&self, session_id: &str) -> PortResult<ArchivedConversation> {
        let record: ConversationRecord = self
            .backend
            .get_json(&["conversations", session_id], &[])
            .await?;
        record.to_domain()
    }

    async fn search(&self, query: &str, limit: u32) -> PortResult<Vec<SearchHit>> {
        let record: SearchResultsRecord = self
            .backend
            .get_json(
                &["conversations", "search", query],
                &[("limit", limit.to_string())],
            )
            .await?;
        record
            .results
            .into_iter()
            .map(|r| r.to_domain())
            .collect()
    }

    async fn memory_stats(&self) -> PortResult<MemoryStats> {
        let record: MemoryStatsRecord = self.backend.get_json(&["memory", "stats"], &[]).await?;
        Ok(record.to_domain())
    }

    async fn cleanup(&self) -> PortResult<()> {
        let _: Value = self.backend.post_empty(&["memory", "cleanup"]).await?;
        Ok(())
    }
}
