//! services/console/src/adapters/hr_data.rs
//!
//! This module contains the adapter for the dashboard's aggregate HR data
//! endpoints. It implements the `HrDataService` port from the `core` crate.

use async_trait::async_trait;
use hr_insight_core::domain::{DepartmentCount, Performer, SystemStatus};
use hr_insight_core::ports::{HrDataService, PortResult};
use serde::Deserialize;
use serde_json::Value;

use crate::adapters::backend::Backend;

//=========================================================================================
// "Impure" Wire Record Structs
//=========================================================================================

#[derive(Deserialize)]
struct StatusRecord {
    status: String,
    documents_indexed: u32,
    system_ready: bool,
    #[serde(default)]
    memory_enabled: bool,
    #[serde(default)]
    version: String,
}

impl StatusRecord {
    fn to_domain(self) -> SystemStatus {
        SystemStatus {
            status: self.status,
            documents_indexed: self.documents_indexed,
            system_ready: self.system_ready,
            memory_enabled: self.memory_enabled,
            version: self.version,
        }
    }
}

#[derive(Deserialize)]
struct DepartmentRecord {
    department: String,
    count: u32,
}

impl DepartmentRecord {
    fn to_domain(self) -> DepartmentCount {
        DepartmentCount {
            department: self.department,
            count: self.count,
        }
    }
}

#[derive(Deserialize)]
struct PerformerRecord {
    first_name: String,
    last_name: String,
    score: i32,
    title: Option<String>,
    department: Option<String>,
}

impl PerformerRecord {
    fn to_domain(self) -> Performer {
        Performer {
            first_name: self.first_name,
            last_name: self.last_name,
            score: self.score,
            title: self.title,
            department: self.department,
        }
    }
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `HrDataService` port.
#[derive(Clone)]
pub struct HttpHrDataAdapter {
    backend: Backend,
}

impl HttpHrDataAdapter {
    /// Creates a new `HttpHrDataAdapter`.
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl HrDataService for HttpHrDataAdapter {
    async fn status(&self) -> PortResult<SystemStatus> {
        let record: StatusRecord = self.backend.get_json(&["status"], &[]).await?;
        Ok(record.to_domain())
    }

    async fn departments(&self) -> PortResult<Vec<DepartmentCount>> {
        let records: Vec<DepartmentRecord> = self.backend.get_json(&["departments"], &[]).await?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn top_performers(&self, limit: u32) -> PortResult<Vec<Performer>> {
        let records: Vec<PerformerRecord> = self
            .backend
            .get_json(&["top-performers"], &[("limit", limit.to_string())])
            .await?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn reindex(&self) -> PortResult<()> {
        // The backend replies with a progress summary; only success matters here.
        let _: Value = self.backend.post_empty(&["reindex"]).await?;
        Ok(())
    }
}
