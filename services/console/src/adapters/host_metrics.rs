//! services/console/src/adapters/host_metrics.rs
//!
//! Fabricated host gauges for the admin panel.
//!
//! This is PLACEHOLDER data: the backend exposes no host telemetry, so the
//! admin view animates a random walk instead, exactly like the dashboard it
//! replaces. Nothing here measures the real machine.

use std::sync::Mutex;

use rand::Rng;

/// A fabricated point-in-time host reading.
#[derive(Debug, Clone, Copy)]
pub struct HostSnapshot {
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub uptime_seconds: u64,
}

/// Placeholder source of host gauges. Each `sample` nudges the previous
/// reading so the panel looks alive between refreshes.
pub struct PlaceholderHostMetrics {
    state: Mutex<HostSnapshot>,
}

impl PlaceholderHostMetrics {
    pub fn new() -> Self {
        let mut rng = rand::thread_rng();
        Self {
            state: Mutex::new(HostSnapshot {
                cpu_percent: 35.0,
                memory_percent: 65.0,
                uptime_seconds: rng.gen_range(0..86_400),
            }),
        }
    }

    /// Produces the next fabricated reading.
    pub fn sample(&self) -> HostSnapshot {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let mut rng = rand::thread_rng();
        state.cpu_percent = (state.cpu_percent + rng.gen_range(-15.0..15.0)).clamp(2.0, 98.0);
        state.memory_percent = (state.memory_percent + rng.gen_range(-10.0..10.0)).clamp(20.0, 95.0);
        state.uptime_seconds += 1;
        *state
    }
}

impl Default for PlaceholderHostMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_stay_within_plausible_bounds() {
        let metrics = PlaceholderHostMetrics::new();
        for _ in 0..500 {
            let snapshot = metrics.sample();
            assert!((2.0..=98.0).contains(&snapshot.cpu_percent));
            assert!((20.0..=95.0).contains(&snapshot.memory_percent));
        }
    }

    #[test]
    fn uptime_only_moves_forward() {
        let metrics = PlaceholderHostMetrics::new();
        let first = metrics.sample().uptime_seconds;
        let second = metrics.sample().uptime_seconds;
        assert!(second > first);
    }
}
