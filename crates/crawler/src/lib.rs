//! Discovers newly published game assets by probing mirrored content
//! servers, stores them under a data root and announces each one on a
//! chat channel.

pub mod api;
pub mod banner;
pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod openapi;
pub mod services;
pub mod state;

#[cfg(test)]
mod test_support;

use std::net::SocketAddr;

use utoipa_scalar::{Scalar, Servable};

pub use api::create_router;
pub use banner::print_banner;
pub use catalog::Catalog;
pub use config::{Config, ConfigError};
pub use error::{AppError, AppResult, CrawlError};
pub use models::{AssetClass, DiscoveryRecord, PassReport, ProbeResult, Subject};
pub use state::AppState;

/// Serves the operator API (and its Scalar docs at `/docs`) until the
/// listener fails.
pub async fn run_api(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let (router, api) = create_router(state);
    let app = router.merge(Scalar::with_url("/docs", api));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Operator API listening on http://{}", addr);
    axum::serve(listener, app.into_make_service()).await
}
