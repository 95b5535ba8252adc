use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use notify::NotificationQueue;
use parking_lot::RwLock;
use serde::Serialize;
use utoipa::ToSchema;

use super::orchestrator::Heartbeat;

/// A crawler is reported as running if it beat within this many seconds
pub const STALE_AFTER_SECS: i64 = 120;

/// Last time any crawl loop started a pass.
///
/// Starts at process start, so a freshly launched process reports running.
#[derive(Debug)]
pub struct LivenessTracker {
    last_seen: RwLock<DateTime<Utc>>,
}

impl LivenessTracker {
    pub fn new() -> Self {
        Self::starting_at(Utc::now())
    }

    pub fn starting_at(at: DateTime<Utc>) -> Self {
        Self {
            last_seen: RwLock::new(at),
        }
    }

    pub fn beat_at(&self, at: DateTime<Utc>) {
        *self.last_seen.write() = at;
    }

    pub fn last_seen(&self) -> DateTime<Utc> {
        *self.last_seen.read()
    }

    pub fn is_alive_at(&self, now: DateTime<Utc>) -> bool {
        now - self.last_seen() < Duration::seconds(STALE_AFTER_SECS)
    }
}

impl Default for LivenessTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl Heartbeat for LivenessTracker {
    fn beat(&self) {
        self.beat_at(Utc::now());
    }
}

/// Operator-facing status snapshot
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CrawlerStatus {
    /// Whether a crawl pass started within the last two minutes
    pub running: bool,
    /// Notifications waiting to be sent
    pub queue_size: usize,
    /// Notifications currently being sent
    pub queue_pending: usize,
    pub last_seen_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct StatusService {
    liveness: Arc<LivenessTracker>,
    queue: NotificationQueue,
}

impl StatusService {
    pub fn new(liveness: Arc<LivenessTracker>, queue: NotificationQueue) -> Self {
        Self { liveness, queue }
    }

    pub fn status(&self) -> CrawlerStatus {
        self.status_at(Utc::now())
    }

    pub fn status_at(&self, now: DateTime<Utc>) -> CrawlerStatus {
        CrawlerStatus {
            running: self.liveness.is_alive_at(now),
            queue_size: self.queue.size(),
            queue_pending: self.queue.pending(),
            last_seen_at: self.liveness.last_seen(),
        }
    }
}
