//! Combined service report for the metrics endpoint.

use serde::Serialize;

use super::{TelemetrySnapshot, VisitorTracker};
use crate::cache::CacheStats;

/// Everything `/metrics` reports, in one serializable value.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceReport {
    pub pipeline: TelemetrySnapshot,
    pub cache: CacheStats,
    pub requests_per_second: f64,
    pub active_visitors: usize,
}

impl ServiceReport {
    pub fn collect(
        pipeline: TelemetrySnapshot,
        cache: CacheStats,
        visitors: &VisitorTracker,
    ) -> Self {
        Self {
            pipeline,
            cache,
            requests_per_second: visitors.requests_per_second(),
            active_visitors: visitors.active_visitors(),
        }
    }
}
