//! Link entity representing a shortened URL mapping.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// A persisted link row as returned by a [`crate::domain::repositories::LinkRepository`].
///
/// Rows carry no short code: the code is a pure function of `id` and is
/// recomputed by the codec whenever it is needed.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct LinkRecord {
    pub id: i64,
    pub url: String,
    pub visits: i64,
    pub created_at: DateTime<Utc>,
    pub disabled: bool,
}

/// A shortened URL together with its short code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub id: i64,
    pub code: String,
    pub url: String,
    pub visits: i64,
    pub created_at: DateTime<Utc>,
    pub disabled: bool,
}

impl Link {
    /// Attaches the encoded short code to a stored row.
    pub fn from_record(record: LinkRecord, code: String) -> Self {
        Self {
            id: record.id,
            code,
            url: record.url,
            visits: record.visits,
            created_at: record.created_at,
            disabled: record.disabled,
        }
    }

    /// Returns true if the link may be served.
    pub fn is_active(&self) -> bool {
        !self.disabled
    }
}

/// A short link as handed back to the creation caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortLink {
    pub link: Link,
    /// Absolute short URL, e.g. `https://l1nk.zip/5wppq`.
    pub full_link: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(disabled: bool) -> LinkRecord {
        LinkRecord {
            id: 23,
            url: "https://example.com/".to_string(),
            visits: 4,
            created_at: Utc::now(),
            disabled,
        }
    }

    #[test]
    fn test_link_from_record() {
        let record = record(false);
        let created_at = record.created_at;
        let link = Link::from_record(record, "5wppq".to_string());

        assert_eq!(link.id, 23);
        assert_eq!(link.code, "5wppq");
        assert_eq!(link.url, "https://example.com/");
        assert_eq!(link.visits, 4);
        assert_eq!(link.created_at, created_at);
        assert!(link.is_active());
    }

    #[test]
    fn test_disabled_link_is_inactive() {
        let link = Link::from_record(record(true), "5wppq".to_string());
        assert!(!link.is_active());
    }
}
