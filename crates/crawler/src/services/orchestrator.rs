use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use tokio::task::JoinHandle;

use super::enumeration::{EnumerationPolicy, Enumerator};
use crate::catalog::Catalog;
use crate::error::CrawlError;
use crate::models::{AssetClass, PassReport};

/// Receives a beat at the start of every scan pass
pub trait Heartbeat: Send + Sync {
    fn beat(&self);
}

/// Loop timing for one asset class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassSchedule {
    pub class: AssetClass,
    /// Delay after a successful pass
    pub interval: Duration,
    /// Delay after a failed pass
    pub error_backoff: Duration,
}

impl ClassSchedule {
    pub fn for_class(class: AssetClass) -> Self {
        let (interval, error_backoff) = match class {
            AssetClass::Art => (60, 30),
            AssetClass::Label => (5 * 60, 60),
            AssetClass::Joystick => (10 * 60, 2 * 60),
            AssetClass::Frame => (60 * 60, 10 * 60),
        };

        Self {
            class,
            interval: Duration::from_secs(interval),
            error_backoff: Duration::from_secs(error_backoff),
        }
    }
}

/// Runs scan passes, one class at a time or as independent loops.
pub struct ScanOrchestrator {
    enumerator: Enumerator,
    catalog: Arc<Catalog>,
    heartbeat: Arc<dyn Heartbeat>,
}

impl ScanOrchestrator {
    pub fn new(
        enumerator: Enumerator,
        catalog: Arc<Catalog>,
        heartbeat: Arc<dyn Heartbeat>,
    ) -> Self {
        Self {
            enumerator,
            catalog,
            heartbeat,
        }
    }

    /// One pass over `class`.
    ///
    /// Per-subject classes fan out across the whole roster inside this task;
    /// each subject's own indices stay sequential.
    pub async fn run_pass(&self, class: AssetClass) -> Result<PassReport, CrawlError> {
        self.heartbeat.beat();
        let started_at = Utc::now();
        let policy = EnumerationPolicy::for_class(class);

        let outcomes = if policy.is_per_subject() {
            join_all(
                self.catalog
                    .roster()
                    .iter()
                    .map(|subject| self.enumerator.enumerate(&policy, Some(subject))),
            )
            .await
        } else {
            vec![self.enumerator.enumerate(&policy, None).await]
        };

        let mut discoveries = Vec::new();
        let mut failure = None;
        for outcome in outcomes {
            match outcome {
                Ok(outcome) => discoveries.extend(outcome.discoveries),
                Err(e) => {
                    tracing::error!("{} scan failed: {}", class, e);
                    failure.get_or_insert(e);
                }
            }
        }

        if let Some(e) = failure {
            return Err(e.into());
        }

        tracing::info!("Found {} new {} assets.", discoveries.len(), class);

        Ok(PassReport {
            class,
            started_at,
            discoveries,
        })
    }

    /// Runs one pass in its own task and returns how long to wait before
    /// the next one. Errors and panics both map to the error backoff.
    pub async fn run_cycle(self: &Arc<Self>, schedule: &ClassSchedule) -> Duration {
        let this = Arc::clone(self);
        let class = schedule.class;

        let result = match tokio::spawn(async move { this.run_pass(class).await }).await {
            Ok(result) => result,
            Err(e) => Err(CrawlError::Aborted(e.to_string())),
        };

        match result {
            Ok(_) => {
                tracing::info!(
                    "Scan {} again after {}s...",
                    class,
                    schedule.interval.as_secs()
                );
                schedule.interval
            }
            Err(e) => {
                tracing::error!("{} crawler error: {}", class, e);
                schedule.error_backoff
            }
        }
    }

    /// Repeats [`run_cycle`](Self::run_cycle) until the task is dropped.
    pub async fn run_forever(self: Arc<Self>, schedule: ClassSchedule) {
        loop {
            let delay = self.run_cycle(&schedule).await;
            tokio::time::sleep(delay).await;
        }
    }

    /// Spawns one independent loop per class.
    pub fn spawn_loops(self: &Arc<Self>, classes: &[AssetClass]) -> Vec<JoinHandle<()>> {
        classes
            .iter()
            .map(|&class| {
                let this = Arc::clone(self);
                tokio::spawn(this.run_forever(ClassSchedule::for_class(class)))
            })
            .collect()
    }
}
