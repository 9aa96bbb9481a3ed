//! services/console/src/adapters/query_api.rs
//!
//! This module contains the adapter for the RAG question endpoint.
//! It implements the `QueryService` port from the `core` crate.

use async_trait::async_trait;
use hr_insight_core::domain::QueryAnswer;
use hr_insight_core::ports::{PortResult, QueryService};
use serde::{Deserialize, Serialize};

use crate::adapters::backend::Backend;

//=========================================================================================
// Wire Shapes
//=========================================================================================

#[derive(Serialize)]
struct QueryRequestBody<'a> {
    question: &'a str,
    session_id: Option<&'a str>,
    include_sources: bool,
}

#[derive(Deserialize)]
struct QueryResponseBody {
    answer: String,
    #[serde(default)]
    sources: Vec<String>,
    query_type: String,
    response_time: f64,
    session_id: String,
    conversation_length: u32,
}

impl QueryResponseBody {
    fn to_domain(self) -> QueryAnswer {
        QueryAnswer {
            answer: self.answer,
            session_id: self.session_id,
            conversation_length: self.conversation_length,
            query_type: self.query_type,
            sources: self.sources,
            response_time_seconds: self.response_time,
        }
    }
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `QueryService` against the backend's
/// `POST /query` endpoint.
#[derive(Clone)]
pub struct HttpQueryAdapter {
    backend: Backend,
}

impl HttpQueryAdapter {
    /// Creates a new `HttpQueryAdapter`.
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl QueryService for HttpQueryAdapter {
    async fn ask(&self, question: &str, session_id: Option<&str>) -> PortResult<QueryAnswer> {
        let body = QueryRequestBody {
            question,
            session_id,
            include_sources: true,
        };
        let response: QueryResponseBody = self.backend.post_json(&["query"], &body).await?;
        Ok(response.to_domain())
    }
}
