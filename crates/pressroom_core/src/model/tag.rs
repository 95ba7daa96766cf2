//! Tag domain model.

use serde::{Deserialize, Serialize};

/// Content tag identified by its unique name.
///
/// `article_count` counts stored articles carrying this tag. Tag names are
/// trimmed but case-preserving; identity is the verbatim name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Unique tag name, the tag's identity.
    pub name: String,
    /// Count of stored articles carrying this tag.
    pub article_count: i64,
    /// Unix epoch milliseconds; filter metadata lists tags newest-first.
    pub created_at: i64,
}
