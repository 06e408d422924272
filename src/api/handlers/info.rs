//! Handler for link info endpoint.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::dto::link::LinkInfoResponse;
use crate::error::AppError;
use crate::state::AppState;

/// Returns the stored state of a short link without counting a visit.
///
/// `GET /url/{code}`; 404 for unknown or disabled links.
pub async fn link_info_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<LinkInfoResponse>, AppError> {
    let short = state.redirect_service.get_link_info(&code).await?;
    Ok(Json(short.into()))
}
