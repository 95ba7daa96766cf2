//! Article lifecycle service.
//!
//! # Responsibility
//! - Own the counter-consistency invariant: category `article_count`, tag
//!   `article_count`, and resource `reference_count` always reflect the
//!   current set of stored articles referencing them.
//! - Reconcile image/accessory references and tag bindings on update.
//! - Compose status/date/category/tag filter queries.
//!
//! # Invariants
//! - Create and hard-delete are exact counter inverses; create-then-delete
//!   is a counter no-op.
//! - Recycle-bin toggling never touches counters: counters track stored
//!   articles, and recycling keeps the row stored.
//! - The `article_tags` join table follows the article's tag set through
//!   create, update, and delete.

use crate::model::article::{dedup_tags, Article, ArticleId, ArticleStatus, ArticleValidationError};
use crate::model::category::Category;
use crate::model::tag::Tag;
use crate::query::{month_buckets, normalize_filter_token, QueryTokenError, StatusSelector, YearMonth};
use crate::repo::article_repo::{ArticleListQuery, ArticleRepository, RepoError};
use crate::repo::catalog_repo::CatalogRepository;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for article lifecycle use-cases.
#[derive(Debug)]
pub enum ArticleServiceError {
    /// Target article does not exist.
    ArticleNotFound(ArticleId),
    /// Referenced category does not exist.
    CategoryNotFound(String),
    /// Referenced tag row vanished during strict teardown.
    TagNotFound(String),
    /// Referenced resource row vanished during reconciliation.
    ResourceNotFound(String),
    /// Article input breaks a model invariant.
    Validation(ArticleValidationError),
    /// Malformed status/date token at the query boundary.
    Token(QueryTokenError),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for ArticleServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ArticleNotFound(id) => write!(f, "article not found: {id}"),
            Self::CategoryNotFound(alias) => write!(f, "category not found: `{alias}`"),
            Self::TagNotFound(name) => write!(f, "tag not found: `{name}`"),
            Self::ResourceNotFound(location) => write!(f, "resource not found: `{location}`"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Token(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent article state: {details}"),
        }
    }
}

impl Error for ArticleServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Token(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ArticleServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::ArticleNotFound(id) => Self::ArticleNotFound(id),
            RepoError::CategoryNotFound(alias) => Self::CategoryNotFound(alias),
            RepoError::TagNotFound(name) => Self::TagNotFound(name),
            RepoError::ResourceNotFound(location) => Self::ResourceNotFound(location),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<QueryTokenError> for ArticleServiceError {
    fn from(value: QueryTokenError) -> Self {
        Self::Token(value)
    }
}

type ServiceResult<T> = Result<T, ArticleServiceError>;

/// Filter metadata aggregate for article list views.
///
/// Month buckets span the full creation-time range of *all* stored
/// articles, recycled included; counts split by recycle flag and status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterConditions {
    /// Descending `YYYY-MM` labels, every month in range present.
    pub months: Vec<String>,
    /// All categories, oldest first.
    pub categories: Vec<Category>,
    /// All tags, newest first.
    pub tags: Vec<Tag>,
    /// Stored non-recycled articles.
    pub active_count: i64,
    pub published_count: i64,
    pub pending_review_count: i64,
    pub draft_count: i64,
    /// Stored recycled articles.
    pub recycle_bin_count: i64,
}

/// Article lifecycle service facade over repository implementations.
pub struct ArticleService<A: ArticleRepository, C: CatalogRepository> {
    articles: A,
    catalog: C,
}

impl<A: ArticleRepository, C: CatalogRepository> ArticleService<A, C> {
    /// Creates a service using the provided repository implementations.
    pub fn new(articles: A, catalog: C) -> Self {
        Self { articles, catalog }
    }

    /// Persists a new article and brings every dependent counter in line.
    ///
    /// # Contract
    /// - The target category must already exist (`CategoryNotFound`).
    /// - Missing tags are created with count 1; existing tags increment.
    /// - Every image/accessory resource is upserted with
    ///   `reference_count = 1`: a new article's resources are treated as
    ///   first references, without dedup against other articles.
    pub fn create_article(&self, mut article: Article) -> ServiceResult<Article> {
        article.tags = dedup_tags(&article.tags);
        article.validate().map_err(ArticleServiceError::Validation)?;

        self.articles.insert_article(&article)?;
        self.catalog.bump_category_count(&article.category_alias, 1)?;

        for tag in &article.tags {
            self.catalog.upsert_tag_increment(tag)?;
            self.catalog.link_tag(article.uuid, tag)?;
        }

        for link in article.images.iter().chain(article.accessories.iter()) {
            self.catalog.save_resource(link, 1)?;
        }

        info!(
            "event=article_created module=service status=ok article={} category={} tags={}",
            article.uuid,
            article.category_alias,
            article.tags.len()
        );

        self.read_back(article.uuid, "created article not found in read-back")
    }

    /// Updates an article, reconciling resources, category, and tags
    /// against its previous state.
    ///
    /// The caller populates only newly added images; still-referenced old
    /// images (location present in the new content) are carried over, and
    /// dropped ones decrement their resource row. Accessories reconcile by
    /// location set-diff. The tag diff also rewrites `article_tags` rows.
    pub fn update_article(&self, mut article: Article) -> ServiceResult<Article> {
        article.tags = dedup_tags(&article.tags);
        article.validate().map_err(ArticleServiceError::Validation)?;

        let old = self
            .articles
            .get_article(article.uuid)?
            .ok_or(ArticleServiceError::ArticleNotFound(article.uuid))?;

        for link in &article.images {
            self.catalog.save_resource(link, 1)?;
        }
        for old_link in &old.images {
            if article.content.contains(&old_link.location) {
                let already_listed = article
                    .images
                    .iter()
                    .any(|link| link.location == old_link.location);
                if !already_listed {
                    article.images.push(old_link.clone());
                }
            } else {
                self.catalog.bump_resource_refs(&old_link.location, -1)?;
            }
        }

        for link in &article.accessories {
            let was_attached = old
                .accessories
                .iter()
                .any(|old_link| old_link.location == link.location);
            if !was_attached {
                self.catalog.save_resource(link, 1)?;
            }
        }
        for old_link in &old.accessories {
            let still_attached = article
                .accessories
                .iter()
                .any(|link| link.location == old_link.location);
            if !still_attached {
                self.catalog.bump_resource_refs(&old_link.location, -1)?;
            }
        }

        if article.category_alias != old.category_alias {
            self.catalog.bump_category_count(&article.category_alias, 1)?;
            self.catalog.bump_category_count(&old.category_alias, -1)?;
        }

        for tag in &article.tags {
            if !old.tags.contains(tag) {
                self.catalog.upsert_tag_increment(tag)?;
                self.catalog.link_tag(article.uuid, tag)?;
            }
        }
        for old_tag in &old.tags {
            if !article.tags.contains(old_tag) {
                // Tolerate a vanished tag row; the binding still goes away.
                self.catalog.bump_tag_count(old_tag, -1)?;
                self.catalog.unlink_tag(article.uuid, old_tag)?;
            }
        }

        self.articles.update_article(&article)?;

        info!(
            "event=article_updated module=service status=ok article={} category={}",
            article.uuid, article.category_alias
        );

        self.read_back(article.uuid, "updated article not found in read-back")
    }

    /// Hard-deletes an article and tears down every counter it feeds.
    ///
    /// Teardown is strict: a category, tag, or resource row missing at this
    /// point is a broken invariant and surfaces as its NotFound error.
    pub fn delete_article(&self, id: ArticleId) -> ServiceResult<()> {
        let article = self
            .articles
            .get_article(id)?
            .ok_or(ArticleServiceError::ArticleNotFound(id))?;

        self.articles.delete_article(id)?;
        self.catalog.bump_category_count(&article.category_alias, -1)?;

        for tag in &article.tags {
            if !self.catalog.bump_tag_count(tag, -1)? {
                return Err(ArticleServiceError::TagNotFound(tag.clone()));
            }
            self.catalog.unlink_tag(id, tag)?;
        }

        for link in article.images.iter().chain(article.accessories.iter()) {
            self.catalog.bump_resource_refs(&link.location, -1)?;
        }

        info!(
            "event=article_deleted module=service status=ok article={} category={}",
            id, article.category_alias
        );

        Ok(())
    }

    /// Computes filter metadata over all stored articles.
    ///
    /// Returns a zeroed aggregate when no articles exist at all.
    pub fn filter_conditions(&self) -> ServiceResult<FilterConditions> {
        let all = self.articles.list_all_articles()?;
        let Some(latest) = all.first() else {
            return Ok(FilterConditions::default());
        };
        let earliest = all.last().map(|article| article.created_at).unwrap_or(0);

        Ok(FilterConditions {
            months: month_buckets(earliest, latest.created_at),
            categories: self.catalog.list_categories()?,
            tags: self.catalog.list_tags()?,
            active_count: self.articles.count_articles(false, None)?,
            published_count: self
                .articles
                .count_articles(false, Some(ArticleStatus::Published))?,
            pending_review_count: self
                .articles
                .count_articles(false, Some(ArticleStatus::PendingReview))?,
            draft_count: self
                .articles
                .count_articles(false, Some(ArticleStatus::Draft))?,
            recycle_bin_count: self.articles.count_articles(true, None)?,
        })
    }

    /// Lists articles for one status selector, newest first.
    pub fn articles_by_status(&self, selector: StatusSelector) -> ServiceResult<Vec<Article>> {
        let query = ArticleListQuery {
            recycled: selector.recycled(),
            status: selector.status_filter(),
            created_between: None,
        };
        Ok(self.articles.list_articles(&query)?)
    }

    /// Lists articles matching selector + optional month, then applies
    /// AND-combined category/tag post-filters in memory.
    pub fn articles_by_conditions(
        &self,
        selector: StatusSelector,
        month: Option<YearMonth>,
        category: Option<&str>,
        tag: Option<&str>,
    ) -> ServiceResult<Vec<Article>> {
        let created_between = match month {
            Some(month) => Some(
                month
                    .range()
                    .ok_or_else(|| QueryTokenError::InvalidMonth(month.label()))?,
            ),
            None => None,
        };

        let query = ArticleListQuery {
            recycled: selector.recycled(),
            status: selector.status_filter(),
            created_between,
        };
        let mut articles = self.articles.list_articles(&query)?;

        if let Some(category) = normalize_filter_token(category) {
            articles.retain(|article| article.category_alias == category);
        }
        if let Some(tag) = normalize_filter_token(tag) {
            articles.retain(|article| article.tags.iter().any(|name| *name == tag));
        }

        Ok(articles)
    }

    /// Token-boundary variant of [`Self::articles_by_conditions`].
    ///
    /// Accepts the raw controller-facing tokens: a status token, an optional
    /// `YYYY-MM` month token, and category/tag filters where `None`,
    /// `"null"`, and blank all mean "no filter".
    pub fn articles_by_condition_tokens(
        &self,
        status: Option<&str>,
        month: Option<&str>,
        category: Option<&str>,
        tag: Option<&str>,
    ) -> ServiceResult<Vec<Article>> {
        let selector = StatusSelector::parse(status)?;
        let month = match normalize_filter_token(month) {
            Some(token) => Some(YearMonth::parse(&token)?),
            None => None,
        };
        self.articles_by_conditions(selector, month, category, tag)
    }

    /// Moves an article into or out of the recycle bin.
    ///
    /// Deliberately counter-neutral: the row stays stored either way.
    pub fn move_to_recycle_bin(&self, id: ArticleId, recycled: bool) -> ServiceResult<Article> {
        self.articles.set_recycled(id, recycled)?;

        info!(
            "event=article_recycle_toggled module=service status=ok article={} recycled={}",
            id, recycled
        );

        self.read_back(id, "article missing after recycle toggle")
    }

    fn read_back(&self, id: ArticleId, details: &'static str) -> ServiceResult<Article> {
        self.articles
            .get_article(id)?
            .ok_or(ArticleServiceError::InconsistentState(details))
    }
}
