//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect},
};

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short code to its target URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Request Flow
///
/// 1. Look the code up in the redirect cache
/// 2. On a hit, queue the visit for the background worker
/// 3. On a miss, read the database, count the visit and populate the cache
/// 4. Return 307 Temporary Redirect
///
/// The redirect is temporary so clients come back through the service and
/// every visit is counted.
///
/// # Errors
///
/// - 404 Not Found if the code is unknown, malformed, disabled or blocked
/// - 503 Service Unavailable if the database fails on a cache miss
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let url = state.redirect_service.resolve_short_link(&code).await?;
    Ok(Redirect::temporary(&url))
}
