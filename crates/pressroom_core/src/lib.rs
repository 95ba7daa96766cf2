//! Core domain logic for Pressroom, a content-management backend.
//! This crate is the single source of truth for counter-consistency
//! invariants across articles, categories, tags, and media resources.

pub mod db;
pub mod logging;
pub mod model;
pub mod query;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::article::{Article, ArticleId, ArticleStatus, ArticleValidationError};
pub use model::category::Category;
pub use model::resource::{Resource, ResourceLink};
pub use model::tag::Tag;
pub use query::{MonthRange, QueryTokenError, StatusSelector, YearMonth};
pub use repo::article_repo::{
    ArticleListQuery, ArticleRepository, RepoError, RepoResult, SqliteArticleRepository,
};
pub use repo::catalog_repo::{CatalogRepository, SqliteCatalogRepository};
pub use service::article_service::{ArticleService, ArticleServiceError, FilterConditions};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
