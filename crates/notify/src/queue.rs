use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{watch, Notify};
use tokio::time::Instant;

/// Boxed unit of notification work
type Job = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Queue tuning
#[derive(Debug, Clone, Copy)]
pub struct QueueConfig {
    /// Minimum spacing between two job starts
    pub interval: Duration,
    /// Per-job execution deadline
    pub timeout: Duration,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Snapshot of the queue counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStats {
    /// Jobs waiting to run
    pub size: usize,
    /// Jobs currently running (0 or 1)
    pub pending: usize,
    pub paused: bool,
}

struct QueuedJob {
    priority: i32,
    seq: u64,
    job: Job,
}

impl PartialEq for QueuedJob {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}

impl Eq for QueuedJob {}

impl PartialOrd for QueuedJob {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedJob {
    // Max-heap: higher priority first, then lower sequence number.
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

#[derive(Default)]
struct State {
    jobs: BinaryHeap<QueuedJob>,
    next_seq: u64,
    paused: bool,
    pending: usize,
}

impl State {
    fn stats(&self) -> QueueStats {
        QueueStats {
            size: self.jobs.len(),
            pending: self.pending,
            paused: self.paused,
        }
    }
}

struct Shared {
    state: Mutex<State>,
    wake: Notify,
    stats: watch::Sender<QueueStats>,
}

impl Shared {
    /// Must be called with the state lock held so snapshots stay ordered.
    fn publish(&self, state: &State) {
        self.stats.send_replace(state.stats());
    }
}

/// Serialized, rate-limited job runner.
///
/// A single worker task drains an in-memory priority inbox. At most one job
/// runs at a time, job starts are spaced by at least [`QueueConfig::interval`],
/// and a job exceeding [`QueueConfig::timeout`] is aborted and dropped.
/// Enqueueing never waits for execution.
#[derive(Clone)]
pub struct NotificationQueue {
    shared: Arc<Shared>,
}

impl NotificationQueue {
    /// Creates the queue and spawns its worker on the current tokio runtime.
    pub fn new(config: QueueConfig) -> Self {
        let (stats, _) = watch::channel(QueueStats::default());
        let shared = Arc::new(Shared {
            state: Mutex::new(State::default()),
            wake: Notify::new(),
            stats,
        });

        tokio::spawn(run_worker(Arc::clone(&shared), config));

        Self { shared }
    }

    /// Enqueues a job with priority 0.
    pub fn enqueue<F>(&self, job: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.enqueue_with_priority(job, 0);
    }

    /// Enqueues a job. Higher priority runs first; ties run in enqueue order.
    pub fn enqueue_with_priority<F>(&self, job: F, priority: i32)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        {
            let mut state = self.shared.state.lock();
            let seq = state.next_seq;
            state.next_seq += 1;
            state.jobs.push(QueuedJob {
                priority,
                seq,
                job: Box::pin(job),
            });
            self.shared.publish(&state);
        }
        self.shared.wake.notify_one();
    }

    /// Number of jobs waiting
    pub fn size(&self) -> usize {
        self.shared.state.lock().jobs.len()
    }

    /// Number of jobs running
    pub fn pending(&self) -> usize {
        self.shared.state.lock().pending
    }

    pub fn is_paused(&self) -> bool {
        self.shared.state.lock().paused
    }

    pub fn stats(&self) -> QueueStats {
        self.shared.state.lock().stats()
    }

    /// Stops releasing new jobs. A running job is not interrupted.
    pub fn pause(&self) {
        let mut state = self.shared.state.lock();
        state.paused = true;
        self.shared.publish(&state);
    }

    pub fn resume(&self) {
        {
            let mut state = self.shared.state.lock();
            state.paused = false;
            self.shared.publish(&state);
        }
        self.shared.wake.notify_one();
    }

    /// Drops every waiting job. A running job is not interrupted.
    pub fn clear(&self) {
        let mut state = self.shared.state.lock();
        let dropped = state.jobs.len();
        state.jobs.clear();
        self.shared.publish(&state);
        if dropped > 0 {
            tracing::debug!("Cleared {} queued notification jobs", dropped);
        }
    }

    /// Resolves once no job is waiting or running.
    pub async fn on_idle(&self) {
        let mut rx = self.shared.stats.subscribe();
        let _ = rx.wait_for(|s| s.size == 0 && s.pending == 0).await;
    }
}

async fn run_worker(shared: Arc<Shared>, config: QueueConfig) {
    tracing::debug!(
        "Notification queue started (interval: {:?}, timeout: {:?})",
        config.interval,
        config.timeout
    );

    let mut last_start: Option<Instant> = None;

    loop {
        if !has_eligible_job(&shared) {
            shared.wake.notified().await;
            continue;
        }

        if let Some(started) = last_start {
            tokio::time::sleep_until(started + config.interval).await;
        }

        // Re-check after the rate-limit wait: the queue may have been paused
        // or cleared, and a higher priority job may have arrived.
        let next = {
            let mut state = shared.state.lock();
            if state.paused {
                None
            } else {
                let next = state.jobs.pop();
                if next.is_some() {
                    state.pending = 1;
                    shared.publish(&state);
                }
                next
            }
        };

        let Some(queued) = next else {
            continue;
        };

        last_start = Some(Instant::now());
        execute(queued.job, config.timeout).await;

        let mut state = shared.state.lock();
        state.pending = 0;
        shared.publish(&state);
    }
}

fn has_eligible_job(shared: &Shared) -> bool {
    let state = shared.state.lock();
    !state.paused && !state.jobs.is_empty()
}

/// Runs a job in its own task so a panic or a hang stays contained.
async fn execute(job: Job, timeout: Duration) {
    let handle = tokio::spawn(job);
    let abort = handle.abort_handle();

    match tokio::time::timeout(timeout, handle).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            tracing::error!("Notification job failed: {}", e);
        }
        Err(_) => {
            abort.abort();
            tracing::warn!("Notification job timed out after {:?}, dropped", timeout);
        }
    }
}
