use std::ops::RangeInclusive;
use std::sync::Arc;

use chrono::Utc;
use notify::NotificationHandle;

use super::prober::AssetProber;
use super::storage::{AssetStore, StorageError};
use crate::catalog::Catalog;
use crate::models::{AssetClass, DiscoveryRecord, ProbeResult, Subject};

/// How an index becomes an identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierRule {
    /// `<subject><NN>`, index zero-padded to two digits
    SubjectIndex2,
    /// `<prefix><n>`, global sequence without padding
    Prefixed(&'static str),
}

/// Index range, identifier rule and stop condition for one asset class
#[derive(Debug, Clone)]
pub struct EnumerationPolicy {
    pub class: AssetClass,
    pub indices: RangeInclusive<u32>,
    /// Misses after which a subject is abandoned for the pass. Hits do not
    /// reset the count.
    pub miss_threshold: Option<u32>,
    pub rule: IdentifierRule,
}

impl EnumerationPolicy {
    pub fn art() -> Self {
        Self {
            class: AssetClass::Art,
            indices: 0..=30,
            miss_threshold: Some(4),
            rule: IdentifierRule::SubjectIndex2,
        }
    }

    pub fn label() -> Self {
        Self {
            class: AssetClass::Label,
            indices: 1..=30,
            miss_threshold: Some(17),
            rule: IdentifierRule::SubjectIndex2,
        }
    }

    pub fn joystick() -> Self {
        Self {
            class: AssetClass::Joystick,
            indices: 0..=30,
            miss_threshold: None,
            rule: IdentifierRule::SubjectIndex2,
        }
    }

    pub fn frame() -> Self {
        Self {
            class: AssetClass::Frame,
            indices: 600..=9999,
            miss_threshold: None,
            rule: IdentifierRule::Prefixed("HeadFrame"),
        }
    }

    pub fn for_class(class: AssetClass) -> Self {
        match class {
            AssetClass::Art => Self::art(),
            AssetClass::Label => Self::label(),
            AssetClass::Joystick => Self::joystick(),
            AssetClass::Frame => Self::frame(),
        }
    }

    /// Whether a pass walks the roster or a single global sequence
    pub fn is_per_subject(&self) -> bool {
        matches!(self.rule, IdentifierRule::SubjectIndex2)
    }

    /// Formats the identifier for `index`. Per-subject rules need a subject.
    pub fn identifier(&self, subject: Option<&Subject>, index: u32) -> Option<String> {
        match self.rule {
            IdentifierRule::SubjectIndex2 => subject.map(|s| format!("{}{:02}", s, index)),
            IdentifierRule::Prefixed(prefix) => Some(format!("{}{}", prefix, index)),
        }
    }
}

/// Counters and discoveries from enumerating one subject (or the global
/// sequence)
#[derive(Debug, Default)]
pub struct EnumerationOutcome {
    pub discoveries: Vec<DiscoveryRecord>,
    pub probed: u32,
    pub skipped: u32,
    pub stopped_early: bool,
}

/// Walks a policy's index range, persisting and announcing every new asset.
pub struct Enumerator {
    prober: AssetProber,
    store: AssetStore,
    catalog: Arc<Catalog>,
    notifications: NotificationHandle,
    role_mention: String,
}

impl Enumerator {
    pub fn new(
        prober: AssetProber,
        store: AssetStore,
        catalog: Arc<Catalog>,
        notifications: NotificationHandle,
        role_mention: impl Into<String>,
    ) -> Self {
        Self {
            prober,
            store,
            catalog,
            notifications,
            role_mention: role_mention.into(),
        }
    }

    /// Visits indices in increasing order. Already-stored identifiers are
    /// skipped without probing and leave the miss counter untouched. The
    /// counter starts at zero for every subject and only ever grows.
    pub async fn enumerate(
        &self,
        policy: &EnumerationPolicy,
        subject: Option<&Subject>,
    ) -> Result<EnumerationOutcome, StorageError> {
        let endpoints = self.catalog.endpoints(policy.class);
        let mut outcome = EnumerationOutcome::default();
        let mut misses = 0u32;

        for index in policy.indices.clone() {
            let Some(id) = policy.identifier(subject, index) else {
                tracing::warn!("{} enumeration needs a subject, skipping", policy.class);
                break;
            };

            if self.store.is_stored(policy.class, subject, &id).await {
                tracing::debug!("Skipping stored {} {}", policy.class, id);
                outcome.skipped += 1;
                continue;
            }
            let path = self.store.path_for(policy.class, subject, &id);

            outcome.probed += 1;
            match self
                .prober
                .probe(&id, &endpoints.servers, &endpoints.placeholder)
                .await
            {
                ProbeResult::Found(asset) => {
                    self.store.save(&path, &asset.bytes).await?;

                    let message = self.announcement(policy.class, subject, &id, &asset.server);
                    tracing::info!("{}", message);
                    self.notifications.notify_with_attachment(
                        policy.class.channel(),
                        message,
                        asset.bytes,
                        format!("{}.{}", id, policy.class.extension()),
                    );

                    outcome.discoveries.push(DiscoveryRecord {
                        id,
                        source_url: asset.source_url,
                        server: asset.server,
                        found_at: Utc::now(),
                    });
                }
                ProbeResult::NotFound => {
                    misses += 1;
                    if policy.miss_threshold.is_some_and(|limit| misses >= limit) {
                        tracing::debug!(
                            "Stopping {} scan for {} after {} misses",
                            policy.class,
                            subject.map(Subject::as_str).unwrap_or("global"),
                            misses
                        );
                        outcome.stopped_early = true;
                        break;
                    }
                }
            }
        }

        Ok(outcome)
    }

    fn announcement(
        &self,
        class: AssetClass,
        subject: Option<&Subject>,
        id: &str,
        server: &str,
    ) -> String {
        let name = || match subject {
            Some(subject) => self.catalog.display_name(subject.as_str()),
            None => self.catalog.display_name_for_id(id),
        };

        let body = match class {
            AssetClass::Art => format!(
                "🎨 [Art Crawler] Found new skin art ID: {} - {} (Server: {})",
                id,
                name(),
                server
            ),
            AssetClass::Label => format!(
                "🏷️ [Label Crawler] Found new skin label: {} - {} (Server: {})",
                id,
                name(),
                server
            ),
            AssetClass::Joystick => format!(
                "🕹️ [JoyTick Crawler] Found new joystick: {} (Server: {})",
                id, server
            ),
            AssetClass::Frame => format!(
                "🖼️ [Frame Crawler] Found new frame: {} (Server: {})",
                id, server
            ),
        };

        format!("{}{}", body, self.role_mention)
    }
}
