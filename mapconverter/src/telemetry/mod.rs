//! Service telemetry.
//!
//! Lock-free counters for the render pipeline, a tracker for recent
//! visitors and request rate, and a combined report served by `/metrics`.
//!
//! # Architecture
//!
//! ```text
//! TileLoader / MapPipeline ──► PipelineMetrics ──► TelemetrySnapshot ─┐
//! HTTP handlers ─────────────► VisitorTracker ──────────────────────────┼─► ServiceReport
//! TileCache ─────────────────► CacheStats ──────────────────────────────┘
//! ```

mod metrics;
mod report;
mod snapshot;
mod visitors;

pub use metrics::PipelineMetrics;
pub use report::ServiceReport;
pub use snapshot::TelemetrySnapshot;
pub use visitors::{
    VisitorTracker, DEFAULT_VISITOR_CAPACITY, MAX_TRACKED_REQUESTS, RATE_WINDOW, VISITOR_WINDOW,
};
