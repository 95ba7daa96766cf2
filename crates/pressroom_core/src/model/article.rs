//! Article domain model.
//!
//! # Responsibility
//! - Define the canonical article record and its publication status.
//! - Provide lifecycle helpers for recycle-bin (soft-delete) semantics.
//!
//! # Invariants
//! - `uuid` is stable and never reused for another article.
//! - `is_recycled` is the source of truth for recycle-bin state.
//! - `category_alias` must not be blank; tags must not be blank.

use crate::model::resource::ResourceLink;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for an article.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type ArticleId = Uuid;

/// Publication status of an article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArticleStatus {
    /// Visible to readers.
    Published,
    /// Submitted, awaiting editorial review.
    PendingReview,
    /// Work in progress, author-only.
    Draft,
}

impl ArticleStatus {
    /// Stable storage/token representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Published => "published",
            Self::PendingReview => "pending_review",
            Self::Draft => "draft",
        }
    }

    /// Parses the stable representation back into a status.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "published" => Some(Self::Published),
            "pending_review" => Some(Self::PendingReview),
            "draft" => Some(Self::Draft),
            _ => None,
        }
    }
}

impl Display for ArticleStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation failure for article write paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArticleValidationError {
    /// Category alias is empty after trim.
    BlankCategoryAlias,
    /// A tag name is empty after trim.
    BlankTag,
}

impl Display for ArticleValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankCategoryAlias => write!(f, "article category alias must not be blank"),
            Self::BlankTag => write!(f, "article tags must not be blank"),
        }
    }
}

impl Error for ArticleValidationError {}

/// Canonical article record.
///
/// The tag/image/accessory lists live on the article row; the `article_tags`
/// join table is maintained separately by the lifecycle service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Stable global ID used for linking and join-table rows.
    pub uuid: ArticleId,
    /// Alias of the owning category.
    pub category_alias: String,
    /// Ordered set of tag names (first-seen order, no duplicates).
    pub tags: Vec<String>,
    /// Image resources embedded in the article body.
    pub images: Vec<ResourceLink>,
    /// Attached (downloadable) resources.
    pub accessories: Vec<ResourceLink>,
    /// Free-text body.
    pub content: String,
    /// Publication status.
    pub status: ArticleStatus,
    /// Recycle-bin tombstone; the record stays in storage.
    pub is_recycled: bool,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds.
    pub updated_at: i64,
}

impl Article {
    /// Creates a new article with a generated stable ID.
    pub fn new(
        category_alias: impl Into<String>,
        content: impl Into<String>,
        status: ArticleStatus,
    ) -> Self {
        Self::with_id(Uuid::new_v4(), category_alias, content, status)
    }

    /// Creates a new article with a caller-provided stable ID.
    ///
    /// Used by import paths where identity already exists externally.
    pub fn with_id(
        uuid: ArticleId,
        category_alias: impl Into<String>,
        content: impl Into<String>,
        status: ArticleStatus,
    ) -> Self {
        let now = now_epoch_ms();
        Self {
            uuid,
            category_alias: category_alias.into(),
            tags: Vec::new(),
            images: Vec::new(),
            accessories: Vec::new(),
            content: content.into(),
            status,
            is_recycled: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Checks write-path invariants.
    pub fn validate(&self) -> Result<(), ArticleValidationError> {
        if self.category_alias.trim().is_empty() {
            return Err(ArticleValidationError::BlankCategoryAlias);
        }
        if self.tags.iter().any(|tag| tag.trim().is_empty()) {
            return Err(ArticleValidationError::BlankTag);
        }
        Ok(())
    }

    /// Returns whether this article is visible outside the recycle bin.
    pub fn is_active(&self) -> bool {
        !self.is_recycled
    }
}

/// Collapses duplicate tag names while preserving first-seen order.
pub fn dedup_tags(tags: &[String]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let trimmed = tag.trim();
        if !trimmed.is_empty() && !seen.iter().any(|existing| existing.as_str() == trimmed) {
            seen.push(trimmed.to_string());
        }
    }
    seen
}

/// Current wall-clock time in Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::{dedup_tags, Article, ArticleStatus, ArticleValidationError};

    #[test]
    fn validate_rejects_blank_category_and_tags() {
        let mut article = Article::new("  ", "body", ArticleStatus::Draft);
        assert_eq!(
            article.validate(),
            Err(ArticleValidationError::BlankCategoryAlias)
        );

        article.category_alias = "systems".to_string();
        article.tags = vec!["rust".to_string(), "   ".to_string()];
        assert_eq!(article.validate(), Err(ArticleValidationError::BlankTag));
    }

    #[test]
    fn dedup_tags_preserves_first_seen_order() {
        let tags = vec![
            "go".to_string(),
            "rust".to_string(),
            "go".to_string(),
            " rust ".to_string(),
        ];
        assert_eq!(dedup_tags(&tags), vec!["go".to_string(), "rust".to_string()]);
    }

    #[test]
    fn status_round_trips_through_stable_representation() {
        for status in [
            ArticleStatus::Published,
            ArticleStatus::PendingReview,
            ArticleStatus::Draft,
        ] {
            assert_eq!(ArticleStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ArticleStatus::parse("archived"), None);
    }
}
