//! Lock-free atomic metrics collection.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use super::TelemetrySnapshot;

/// Counters for requests and tile fetches.
///
/// All operations use `Relaxed` ordering; the counters are independent.
pub struct PipelineMetrics {
    start_time: Instant,

    // === Requests ===
    requests_total: AtomicU64,
    requests_completed: AtomicU64,
    requests_failed: AtomicU64,
    requests_active: AtomicUsize,

    // === Tiles ===
    /// Tiles requested from the network (cache misses)
    tiles_downloaded: AtomicU64,
    /// Network fetches that ended in the gray placeholder
    placeholder_tiles: AtomicU64,

    // === Timing (microseconds) ===
    render_time_us: AtomicU64,
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            requests_total: AtomicU64::new(0),
            requests_completed: AtomicU64::new(0),
            requests_failed: AtomicU64::new(0),
            requests_active: AtomicUsize::new(0),
            tiles_downloaded: AtomicU64::new(0),
            placeholder_tiles: AtomicU64::new(0),
            render_time_us: AtomicU64::new(0),
        }
    }

    /// Record a render request starting.
    pub fn request_started(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
        self.requests_active.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a render request finishing successfully.
    pub fn request_completed(&self, elapsed: Duration) {
        self.requests_completed.fetch_add(1, Ordering::Relaxed);
        self.render_time_us
            .fetch_add(elapsed.as_micros() as u64, Ordering::Relaxed);
        self.requests_active.fetch_sub(1, Ordering::Relaxed);
    }

    /// Record a render request failing.
    pub fn request_failed(&self) {
        self.requests_failed.fetch_add(1, Ordering::Relaxed);
        self.requests_active.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn tile_downloaded(&self) {
        self.tiles_downloaded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn tile_placeholder(&self) {
        self.placeholder_tiles.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a point-in-time copy of all counters.
    pub fn snapshot(&self) -> TelemetrySnapshot {
        let requests_completed = self.requests_completed.load(Ordering::Relaxed);
        let render_time_us = self.render_time_us.load(Ordering::Relaxed);
        let average_render_ms = if requests_completed == 0 {
            0.0
        } else {
            render_time_us as f64 / requests_completed as f64 / 1000.0
        };

        TelemetrySnapshot {
            uptime: self.start_time.elapsed(),
            requests_total: self.requests_total.load(Ordering::Relaxed),
            requests_completed,
            requests_failed: self.requests_failed.load(Ordering::Relaxed),
            requests_active: self.requests_active.load(Ordering::Relaxed),
            tiles_downloaded: self.tiles_downloaded.load(Ordering::Relaxed),
            placeholder_tiles: self.placeholder_tiles.load(Ordering::Relaxed),
            average_render_ms,
        }
    }
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}
