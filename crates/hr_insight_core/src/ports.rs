//! crates/hr_insight_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the
//! core to be independent of specific external implementations like HTTP APIs.

use async_trait::async_trait;

use crate::domain::{
    ArchivedConversation, DepartmentCount, MemoryStats, Performer, QueryAnswer, SearchHit,
    SystemStatus,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., HTTP client).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    /// The backend rejected the request and supplied a human-readable detail.
    #[error("{0}")]
    Service(String),
    /// The request never produced a response (connection refused, DNS, etc.).
    #[error("Transport error: {0}")]
    Transport(String),
    /// The response arrived but could not be decoded into the expected shape.
    #[error("Malformed response: {0}")]
    Malformed(String),
    /// The round-trip exceeded the configured deadline.
    #[error("The request timed out")]
    Timeout,
    #[error("Item not found: {0}")]
    NotFound(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait QueryService: Send + Sync {
    /// Sends one question to the RAG backend, threading the session id when known.
    async fn ask(&self, question: &str, session_id: Option<&str>) -> PortResult<QueryAnswer>;
}

#[async_trait]
pub trait HrDataService: Send + Sync {
    /// Fetches aggregate backend health.
    async fn status(&self) -> PortResult<SystemStatus>;

    /// Fetches per-department headcounts.
    async fn departments(&self) -> PortResult<Vec<DepartmentCount>>;

    /// Fetches the top-performers ranking, at most `limit` entries.
    async fn top_performers(&self, limit: u32) -> PortResult<Vec<Performer>>;

    /// Asks the backend to rebuild its document index.
    async fn reindex(&self) -> PortResult<()>;
}

#[async_trait]
pub trait ConversationArchiveService: Send + Sync {
    /// Fetches the full archived transcript for one session.
    async fn conversation(&self, session_id: &str) -> PortResult<ArchivedConversation>;

    /// Searches message contents across all archived conversations.
    async fn search(&self, query: &str, limit: u32) -> PortResult<Vec<SearchHit>>;

    /// Fetches statistics about the backend's conversation memory store.
    async fn memory_stats(&self) -> PortResult<MemoryStats>;

    /// Asks the backend to prune conversations past its retention window.
    async fn cleanup(&self) -> PortResult<()>;
}
