use std::sync::Arc;

use super::prober::AssetProber;
use crate::catalog::Catalog;
use crate::models::{AssetClass, ProbeResult};

/// On-demand fetch through the same server fallback as the crawlers.
///
/// Nothing is written to disk and no discovery is recorded.
#[derive(Clone)]
pub struct AssetLookup {
    prober: AssetProber,
    catalog: Arc<Catalog>,
}

impl AssetLookup {
    pub fn new(prober: AssetProber, catalog: Arc<Catalog>) -> Self {
        Self { prober, catalog }
    }

    pub async fn fetch_asset(&self, class: AssetClass, id: &str) -> ProbeResult {
        let endpoints = self.catalog.endpoints(class);
        tracing::debug!("Looking up {} {} on {} servers", class, id, endpoints.servers.len());

        self.prober
            .probe(id, &endpoints.servers, &endpoints.placeholder)
            .await
    }

    /// Display name resolved from the identifier's subject prefix, for the
    /// classes whose assets belong to a named subject.
    pub fn display_name(&self, class: AssetClass, id: &str) -> Option<&str> {
        class
            .has_display_name()
            .then(|| self.catalog.display_name_for_id(id))
    }
}
