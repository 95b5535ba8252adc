use axum::{extract::State, Json};

use crate::services::CrawlerStatus;
use crate::state::AppState;

/// Crawler liveness and notification queue counters
#[utoipa::path(
    get,
    path = "/api/status",
    tag = "status",
    responses(
        (status = 200, description = "Current crawler status", body = CrawlerStatus)
    )
)]
pub async fn get_status(State(state): State<AppState>) -> Json<CrawlerStatus> {
    Json(state.status.status())
}
