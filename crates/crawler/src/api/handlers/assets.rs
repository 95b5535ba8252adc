use axum::{
    extract::{Path, State},
    http::{header, HeaderName, HeaderValue},
    response::{IntoResponse, Response},
};

use super::{ASSET_NAME_HEADER, ASSET_SERVER_HEADER};
use crate::error::{AppError, AppResult, ErrorResponse};
use crate::models::{AssetClass, ProbeResult};
use crate::state::AppState;

/// Fetch an asset from the first server that has it, without storing it
#[utoipa::path(
    get,
    path = "/api/assets/{class}/{id}",
    tag = "assets",
    params(
        ("class" = String, Path, description = "Asset class: art, label, joystick or frame"),
        ("id" = String, Path, description = "Asset identifier, e.g. 10100 or HeadFrame600")
    ),
    responses(
        (status = 200, description = "Raw image bytes; art and label carry the subject name in x-asset-name", content_type = "image/*"),
        (status = 400, description = "Unknown asset class", body = ErrorResponse),
        (status = 404, description = "Not found on any server", body = ErrorResponse)
    )
)]
pub async fn get_asset(
    State(state): State<AppState>,
    Path((class, id)): Path<(String, String)>,
) -> AppResult<Response> {
    let class: AssetClass = class.parse()?;

    let asset = match state.lookup.fetch_asset(class, &id).await {
        ProbeResult::Found(asset) => asset,
        ProbeResult::NotFound => {
            return Err(AppError::not_found(format!(
                "{} {} not found in any server",
                class, id
            )))
        }
    };

    let name = state.lookup.display_name(class, &id);
    tracing::info!(
        "Served {} {} ({}) from {}",
        class,
        id,
        name.unwrap_or("-"),
        asset.server
    );

    let mut response = asset.bytes.into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(class.content_type()),
    );
    if let Ok(server) = HeaderValue::from_str(&asset.server) {
        headers.insert(HeaderName::from_static(ASSET_SERVER_HEADER), server);
    }
    if let Some(Ok(name)) = name.map(|n| HeaderValue::from_bytes(n.as_bytes())) {
        headers.insert(HeaderName::from_static(ASSET_NAME_HEADER), name);
    }

    Ok(response)
}
