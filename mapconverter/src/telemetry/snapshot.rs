//! Point-in-time telemetry snapshot.

use std::fmt;
use std::time::Duration;

use serde::{Serialize, Serializer};

/// Immutable copy of [`PipelineMetrics`](super::PipelineMetrics).
#[derive(Clone, Debug, Serialize)]
pub struct TelemetrySnapshot {
    /// How long the service has been running
    #[serde(rename = "uptime_secs", serialize_with = "as_secs")]
    pub uptime: Duration,
    pub requests_total: u64,
    pub requests_completed: u64,
    pub requests_failed: u64,
    pub requests_active: usize,
    pub tiles_downloaded: u64,
    pub placeholder_tiles: u64,
    /// Mean render time of successful requests
    pub average_render_ms: f64,
}

impl TelemetrySnapshot {
    /// Fraction of finished requests that failed (0.0 - 1.0).
    pub fn error_rate(&self) -> f64 {
        let total = self.requests_completed + self.requests_failed;
        if total == 0 {
            0.0
        } else {
            self.requests_failed as f64 / total as f64
        }
    }

    pub fn uptime_human(&self) -> String {
        format_duration(self.uptime)
    }
}

fn as_secs<S: Serializer>(d: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(d.as_secs())
}

impl fmt::Display for TelemetrySnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Render Telemetry (uptime: {})", self.uptime_human())?;
        writeln!(
            f,
            "  Requests: {} total, {} completed, {} failed, {} active",
            self.requests_total, self.requests_completed, self.requests_failed, self.requests_active
        )?;
        writeln!(f, "  Error rate: {:.1}%", self.error_rate() * 100.0)?;
        writeln!(
            f,
            "  Tiles: {} downloaded, {} placeholders",
            self.tiles_downloaded, self.placeholder_tiles
        )?;
        write!(f, "  Average render: {:.1} ms", self.average_render_ms)
    }
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}
