//! DTOs for link creation and link info endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::entities::ShortLink;
use crate::utils::url_normalizer::MAX_URL_LENGTH;

/// `MAX_URL_LENGTH` in the integer type `validator` expects.
const MAX_REQUEST_URL_LENGTH: u64 = MAX_URL_LENGTH as u64;

/// Request to shorten a URL.
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenRequest {
    /// The target URL (absolute HTTP/HTTPS).
    #[validate(
        url(message = "Invalid URL format"),
        length(max = MAX_REQUEST_URL_LENGTH, message = "URL is too long")
    )]
    pub url: String,
}

/// A short link as returned by `POST /url`.
#[derive(Debug, Serialize, Deserialize)]
pub struct LinkResponse {
    /// Short code.
    pub link: String,
    pub full_link: String,
    pub url: String,
    pub visits: i64,
}

impl From<ShortLink> for LinkResponse {
    fn from(short: ShortLink) -> Self {
        Self {
            link: short.link.code,
            full_link: short.full_link,
            url: short.link.url,
            visits: short.link.visits,
        }
    }
}

/// Link details as returned by `GET /url/{code}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct LinkInfoResponse {
    #[serde(flatten)]
    pub link: LinkResponse,
    pub created_at: DateTime<Utc>,
}

impl From<ShortLink> for LinkInfoResponse {
    fn from(short: ShortLink) -> Self {
        let created_at = short.link.created_at;
        Self {
            link: short.into(),
            created_at,
        }
    }
}
