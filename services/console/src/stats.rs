//! services/console/src/stats.rs
//!
//! A cache of the dashboard sidebar numbers, refreshed in the background by
//! the poller so `/stats` renders instantly from the latest snapshot.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use hr_insight_core::domain::{DepartmentCount, SystemStatus};
use hr_insight_core::ports::{HrDataService, PortResult};

/// One refresh worth of sidebar data.
#[derive(Debug, Clone)]
pub struct StatsSnapshot {
    pub status: SystemStatus,
    pub departments: Vec<DepartmentCount>,
    pub refreshed_at: DateTime<Utc>,
}

/// Holds the most recent `StatsSnapshot`, if any refresh has succeeded yet.
#[derive(Default)]
pub struct StatsCache {
    latest: Mutex<Option<StatsSnapshot>>,
}

impl StatsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetches status and departments together and stores the result.
    /// A failed refresh leaves the previous snapshot in place.
    pub async fn refresh(&self, hr_data: &dyn HrDataService) -> PortResult<()> {
        let (status, departments) =
            futures::future::try_join(hr_data.status(), hr_data.departments()).await?;
        let snapshot = StatsSnapshot {
            status,
            departments,
            refreshed_at: Utc::now(),
        };
        *self.latest.lock().unwrap_or_else(|e| e.into_inner()) = Some(snapshot);
        Ok(())
    }

    /// Returns the most recent snapshot, if one exists.
    pub fn latest(&self) -> Option<StatsSnapshot> {
        self.latest
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use hr_insight_core::domain::Performer;
    use hr_insight_core::ports::PortError;

    use super::*;

    struct FakeHrData {
        fail: bool,
    }

    #[async_trait]
    impl HrDataService for FakeHrData {
        async fn status(&self) -> PortResult<SystemStatus> {
            if self.fail {
                return Err(PortError::Transport("down".to_string()));
            }
            Ok(SystemStatus {
                status: "ok".to_string(),
                documents_indexed: 10,
                system_ready: true,
                memory_enabled: true,
                version: "2.0.0".to_string(),
            })
        }

        async fn departments(&self) -> PortResult<Vec<DepartmentCount>> {
            Ok(vec![DepartmentCount {
                department: "Engineering".to_string(),
                count: 42,
            }])
        }

        async fn top_performers(&self, _limit: u32) -> PortResult<Vec<Performer>> {
            Ok(Vec::new())
        }

        async fn reindex(&self) -> PortResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn refresh_fills_the_cache() {
        let cache = StatsCache::new();
        assert!(cache.latest().is_none());

        cache.refresh(&FakeHrData { fail: false }).await.unwrap();
        let snapshot = cache.latest().expect("snapshot after refresh");
        assert_eq!(snapshot.status.documents_indexed, 10);
        assert_eq!(snapshot.departments.len(), 1);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_the_previous_snapshot() {
        let cache = StatsCache::new();
        cache.refresh(&FakeHrData { fail: false }).await.unwrap();

        assert!(cache.refresh(&FakeHrData { fail: true }).await.is_err());
        assert!(cache.latest().is_some());
    }
}
