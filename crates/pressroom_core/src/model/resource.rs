//! Media resource domain model.

use serde::{Deserialize, Serialize};

/// Stored media resource identified by its unique location.
///
/// `reference_count` counts stored articles embedding this resource as an
/// image or accessory. It is bumped atomically by the lifecycle service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// Unique path/URL, the resource's identity.
    pub location: String,
    /// Original file name for display.
    pub name: String,
    /// Count of stored articles referencing this resource.
    pub reference_count: i64,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

/// The `(location, name)` projection of a resource as embedded in an
/// article's image/accessory lists. Persisted as JSON on the article row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLink {
    /// Unique path/URL of the referenced resource.
    pub location: String,
    /// Original file name for display.
    pub name: String,
}

impl ResourceLink {
    pub fn new(location: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            name: name.into(),
        }
    }
}
