//! Category domain model.

use serde::{Deserialize, Serialize};

/// Article category identified by a unique URL alias.
///
/// `article_count` is a denormalized counter over stored articles whose
/// `category_alias` equals `url_alias`; it is bumped atomically by the
/// lifecycle service and may go negative when the invariant is violated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Unique URL path segment, the category's identity.
    pub url_alias: String,
    /// Human-readable display name.
    pub name: String,
    /// Count of stored articles in this category.
    pub article_count: i64,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl Category {
    /// Creates a category with a zeroed counter.
    pub fn new(url_alias: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            url_alias: url_alias.into(),
            name: name.into(),
            article_count: 0,
            created_at: crate::model::article::now_epoch_ms(),
        }
    }
}
