use utoipa::OpenApi;

use crate::error::ErrorResponse;
use crate::models::AssetClass;
use crate::services::CrawlerStatus;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Skinwatch API",
        version = "1.0.0"
    ),
    tags(
        (name = "status", description = "Crawler liveness endpoints"),
        (name = "assets", description = "On-demand asset lookup endpoints")
    ),
    components(schemas(CrawlerStatus, ErrorResponse, AssetClass))
)]
pub struct ApiDoc;
