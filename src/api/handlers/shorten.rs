//! Handler for link shortening endpoint.

use axum::{Json, extract::State};
use validator::Validate;

use crate::api::dto::link::{LinkResponse, ShortenRequest};
use crate::error::AppError;
use crate::state::AppState;

/// Creates (or reuses) the short link for a URL.
///
/// # Endpoint
///
/// `POST /url`
///
/// # Request Body
///
/// ```json
/// { "url": "https://example.com/some/long/path" }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "link": "867nv",
///   "full_link": "https://l1nk.zip/867nv",
///   "url": "https://example.com/some/long/path",
///   "visits": 0
/// }
/// ```
///
/// Shortening the same URL twice returns the same link.
///
/// # Errors
///
/// - 400 Bad Request if the URL is invalid
/// - 403 Forbidden if the URL is a known phishing target
/// - 503 Service Unavailable if the database fails
pub async fn shorten_handler(
    State(state): State<AppState>,
    Json(payload): Json<ShortenRequest>,
) -> Result<Json<LinkResponse>, AppError> {
    payload.validate()?;

    let short = state
        .redirect_service
        .create_short_link(&payload.url)
        .await?;

    Ok(Json(short.into()))
}
