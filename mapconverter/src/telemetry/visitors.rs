//! Recent-visitor and request-rate tracking.
//!
//! Visitors are keyed by client address and expire after
//! [`VISITOR_WINDOW`] of inactivity. The map never holds more than its
//! capacity: when it is full an insert first sweeps expired entries and,
//! if still full, evicts the longest-idle visitor. New addresses are
//! admitted one at a time so concurrent inserts cannot overshoot the
//! bound; repeat visits only touch their own entry. A background sweeper
//! started with [`VisitorTracker::spawn_sweeper`] keeps memory flat
//! between inserts.

use std::collections::VecDeque;
use std::net::IpAddr;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::debug;

/// Inactivity after which a visitor no longer counts as active.
pub const VISITOR_WINDOW: Duration = Duration::from_secs(600);

/// Window over which requests per second are averaged.
pub const RATE_WINDOW: Duration = Duration::from_secs(10);

/// Request timestamps kept for rate calculation.
pub const MAX_TRACKED_REQUESTS: usize = 1000;

pub const DEFAULT_VISITOR_CAPACITY: usize = 10_000;

pub struct VisitorTracker {
    visitors: DashMap<IpAddr, Instant>,
    /// Held while a new address is checked against capacity and inserted
    admission: Mutex<()>,
    requests: Mutex<VecDeque<Instant>>,
    capacity: usize,
}

impl VisitorTracker {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_VISITOR_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            visitors: DashMap::new(),
            admission: Mutex::new(()),
            requests: Mutex::new(VecDeque::with_capacity(MAX_TRACKED_REQUESTS)),
            capacity: capacity.max(1),
        }
    }

    /// Record a request from `addr` now.
    pub fn record(&self, addr: IpAddr) {
        self.record_at(addr, Instant::now());
    }

    pub fn record_at(&self, addr: IpAddr, now: Instant) {
        let known = match self.visitors.get_mut(&addr) {
            Some(mut seen) => {
                *seen = now;
                true
            }
            None => false,
        };

        if !known {
            let _admission = self.admission.lock();
            if !self.visitors.contains_key(&addr) && self.visitors.len() >= self.capacity {
                self.sweep_at(now);
                if self.visitors.len() >= self.capacity {
                    self.evict_oldest();
                }
            }
            self.visitors.insert(addr, now);
        }

        let mut requests = self.requests.lock();
        requests.push_back(now);
        while requests.len() > MAX_TRACKED_REQUESTS {
            requests.pop_front();
        }
    }

    /// Drop visitors idle for longer than [`VISITOR_WINDOW`].
    ///
    /// Returns the number of entries removed.
    pub fn sweep(&self) -> usize {
        self.sweep_at(Instant::now())
    }

    pub fn sweep_at(&self, now: Instant) -> usize {
        let before = self.visitors.len();
        self.visitors
            .retain(|_, seen| now.saturating_duration_since(*seen) < VISITOR_WINDOW);
        before.saturating_sub(self.visitors.len())
    }

    fn evict_oldest(&self) {
        let oldest = self
            .visitors
            .iter()
            .min_by_key(|entry| *entry.value())
            .map(|entry| *entry.key());
        if let Some(addr) = oldest {
            self.visitors.remove(&addr);
        }
    }

    pub fn active_visitors(&self) -> usize {
        self.active_visitors_at(Instant::now())
    }

    pub fn active_visitors_at(&self, now: Instant) -> usize {
        self.visitors
            .iter()
            .filter(|entry| now.saturating_duration_since(*entry.value()) < VISITOR_WINDOW)
            .count()
    }

    /// Mean requests per second over the last [`RATE_WINDOW`].
    pub fn requests_per_second(&self) -> f64 {
        self.requests_per_second_at(Instant::now())
    }

    pub fn requests_per_second_at(&self, now: Instant) -> f64 {
        let recent = self
            .requests
            .lock()
            .iter()
            .filter(|t| now.saturating_duration_since(**t) <= RATE_WINDOW)
            .count();
        recent as f64 / RATE_WINDOW.as_secs_f64()
    }

    /// Number of entries currently held, expired or not.
    pub fn tracked(&self) -> usize {
        self.visitors.len()
    }

    /// Sweep on a timer until the tracker is dropped.
    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let tracker: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(tracker) = tracker.upgrade() else {
                    break;
                };
                let removed = tracker.sweep();
                if removed > 0 {
                    debug!(removed, remaining = tracker.tracked(), "Expired visitors swept");
                }
            }
        })
    }
}

impl Default for VisitorTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn ip(n: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(192, 168, 0, n))
    }

    #[test]
    fn test_repeat_visits_count_once() {
        let tracker = VisitorTracker::new();
        tracker.record(ip(1));
        tracker.record(ip(1));
        tracker.record(ip(2));
        assert_eq!(tracker.active_visitors(), 2);
    }

    #[test]
    fn test_visitors_expire_after_window() {
        let tracker = VisitorTracker::new();
        let t0 = Instant::now();
        tracker.record_at(ip(1), t0);
        tracker.record_at(ip(2), t0 + Duration::from_secs(300));

        let later = t0 + VISITOR_WINDOW + Duration::from_secs(1);
        assert_eq!(tracker.active_visitors_at(later), 1);
        assert_eq!(tracker.sweep_at(later), 1);
        assert_eq!(tracker.tracked(), 1);
    }

    #[test]
    fn test_capacity_is_bounded() {
        let tracker = VisitorTracker::with_capacity(3);
        let t0 = Instant::now();
        for n in 0..5u8 {
            tracker.record_at(ip(n), t0 + Duration::from_secs(n as u64));
        }
        assert_eq!(tracker.tracked(), 3);
        // the two longest-idle visitors were evicted
        assert!(!tracker.visitors.contains_key(&ip(0)));
        assert!(!tracker.visitors.contains_key(&ip(1)));
        assert!(tracker.visitors.contains_key(&ip(4)));
    }

    #[test]
    fn test_capacity_holds_under_concurrent_inserts() {
        let tracker = VisitorTracker::with_capacity(8);
        let t0 = Instant::now();

        std::thread::scope(|scope| {
            for thread in 0..8u8 {
                let tracker = &tracker;
                scope.spawn(move || {
                    for n in 0..200u16 {
                        let addr = IpAddr::V4(Ipv4Addr::new(10, thread, (n >> 8) as u8, n as u8));
                        tracker.record_at(addr, t0 + Duration::from_millis(n as u64));
                        assert!(tracker.tracked() <= 8, "capacity exceeded");
                    }
                });
            }
        });

        assert_eq!(tracker.tracked(), 8);
    }

    #[test]
    fn test_full_map_prefers_expired_entries() {
        let tracker = VisitorTracker::with_capacity(2);
        let t0 = Instant::now();
        tracker.record_at(ip(1), t0);
        tracker.record_at(ip(2), t0 + VISITOR_WINDOW);
        tracker.record_at(ip(3), t0 + VISITOR_WINDOW + Duration::from_secs(1));

        assert!(tracker.visitors.contains_key(&ip(2)));
        assert!(tracker.visitors.contains_key(&ip(3)));
    }

    #[test]
    fn test_requests_per_second_window() {
        let tracker = VisitorTracker::new();
        let t0 = Instant::now();
        for i in 0..20u64 {
            tracker.record_at(ip(1), t0 + Duration::from_millis(i * 100));
        }
        let now = t0 + Duration::from_secs(2);
        assert!((tracker.requests_per_second_at(now) - 2.0).abs() < 1e-9);
        assert_eq!(tracker.requests_per_second_at(now + Duration::from_secs(30)), 0.0);
    }

    #[test]
    fn test_request_history_is_bounded() {
        let tracker = VisitorTracker::new();
        for _ in 0..(MAX_TRACKED_REQUESTS + 50) {
            tracker.record(ip(9));
        }
        assert_eq!(tracker.requests.lock().len(), MAX_TRACKED_REQUESTS);
    }

    #[tokio::test]
    async fn test_sweeper_stops_when_tracker_dropped() {
        let tracker = Arc::new(VisitorTracker::new());
        let handle = tracker.spawn_sweeper(Duration::from_millis(5));
        drop(tracker);
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
