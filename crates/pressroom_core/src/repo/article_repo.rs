//! Article repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable CRUD and query APIs over article rows.
//! - Keep SQL details and ordering behavior inside the persistence boundary.
//!
//! # Invariants
//! - Listing order is always `created_at DESC, uuid ASC`.
//! - Write paths call `Article::validate()` before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::DbError;
use crate::model::article::{Article, ArticleId, ArticleStatus, ArticleValidationError};
use crate::model::resource::ResourceLink;
use crate::query::MonthRange;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const ARTICLE_SELECT_SQL: &str = "SELECT
    uuid,
    category_alias,
    tags,
    images,
    accessories,
    content,
    status,
    is_recycled,
    created_at,
    updated_at
FROM articles";

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for article/catalog persistence operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ArticleValidationError),
    Db(DbError),
    ArticleNotFound(ArticleId),
    CategoryNotFound(String),
    TagNotFound(String),
    ResourceNotFound(String),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::ArticleNotFound(id) => write!(f, "article not found: {id}"),
            Self::CategoryNotFound(alias) => write!(f, "category not found: `{alias}`"),
            Self::TagNotFound(name) => write!(f, "tag not found: `{name}`"),
            Self::ResourceNotFound(location) => write!(f, "resource not found: `{location}`"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ArticleValidationError> for RepoError {
    fn from(value: ArticleValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Query options for listing articles.
///
/// `recycled` is always applied; status and creation range are optional.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArticleListQuery {
    pub recycled: bool,
    pub status: Option<ArticleStatus>,
    /// Half-open `[start, end)` filter on `created_at`.
    pub created_between: Option<MonthRange>,
}

/// Repository interface for article row operations.
pub trait ArticleRepository {
    /// Inserts one article row.
    fn insert_article(&self, article: &Article) -> RepoResult<()>;
    /// Rewrites all mutable columns of an existing row.
    fn update_article(&self, article: &Article) -> RepoResult<()>;
    /// Loads one article by id, recycled or not.
    fn get_article(&self, id: ArticleId) -> RepoResult<Option<Article>>;
    /// Lists articles matching the query, newest first.
    fn list_articles(&self, query: &ArticleListQuery) -> RepoResult<Vec<Article>>;
    /// Lists every stored article including recycled ones, newest first.
    fn list_all_articles(&self) -> RepoResult<Vec<Article>>;
    /// Counts articles by recycle flag and optional status.
    fn count_articles(&self, recycled: bool, status: Option<ArticleStatus>) -> RepoResult<i64>;
    /// Hard-deletes one article row.
    fn delete_article(&self, id: ArticleId) -> RepoResult<()>;
    /// Flips the recycle-bin flag on one article row.
    fn set_recycled(&self, id: ArticleId, recycled: bool) -> RepoResult<()>;
}

/// SQLite-backed article repository.
pub struct SqliteArticleRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteArticleRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        if !table_exists(conn, "articles")? {
            return Err(RepoError::InvalidData(
                "connection is missing required table `articles`".to_string(),
            ));
        }
        Ok(Self { conn })
    }
}

impl ArticleRepository for SqliteArticleRepository<'_> {
    fn insert_article(&self, article: &Article) -> RepoResult<()> {
        article.validate()?;

        self.conn.execute(
            "INSERT INTO articles (
                uuid,
                category_alias,
                tags,
                images,
                accessories,
                content,
                status,
                is_recycled,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
            params![
                article.uuid.to_string(),
                article.category_alias.as_str(),
                tags_to_json(&article.tags)?,
                links_to_json(&article.images)?,
                links_to_json(&article.accessories)?,
                article.content.as_str(),
                article.status.as_str(),
                bool_to_int(article.is_recycled),
                article.created_at,
                article.updated_at,
            ],
        )?;

        Ok(())
    }

    fn update_article(&self, article: &Article) -> RepoResult<()> {
        article.validate()?;

        let changed = self.conn.execute(
            "UPDATE articles
             SET
                category_alias = ?1,
                tags = ?2,
                images = ?3,
                accessories = ?4,
                content = ?5,
                status = ?6,
                is_recycled = ?7,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?8;",
            params![
                article.category_alias.as_str(),
                tags_to_json(&article.tags)?,
                links_to_json(&article.images)?,
                links_to_json(&article.accessories)?,
                article.content.as_str(),
                article.status.as_str(),
                bool_to_int(article.is_recycled),
                article.uuid.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::ArticleNotFound(article.uuid));
        }

        Ok(())
    }

    fn get_article(&self, id: ArticleId) -> RepoResult<Option<Article>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ARTICLE_SELECT_SQL} WHERE uuid = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_article_row(row)?));
        }

        Ok(None)
    }

    fn list_articles(&self, query: &ArticleListQuery) -> RepoResult<Vec<Article>> {
        let mut sql = format!("{ARTICLE_SELECT_SQL} WHERE is_recycled = ?");
        let mut bind_values: Vec<Value> = vec![Value::Integer(bool_to_int(query.recycled))];

        if let Some(status) = query.status {
            sql.push_str(" AND status = ?");
            bind_values.push(Value::Text(status.as_str().to_string()));
        }

        if let Some(range) = query.created_between {
            sql.push_str(" AND created_at >= ? AND created_at < ?");
            bind_values.push(Value::Integer(range.start_ms));
            bind_values.push(Value::Integer(range.end_ms));
        }

        sql.push_str(" ORDER BY created_at DESC, uuid ASC;");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut articles = Vec::new();
        while let Some(row) = rows.next()? {
            articles.push(parse_article_row(row)?);
        }

        Ok(articles)
    }

    fn list_all_articles(&self) -> RepoResult<Vec<Article>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ARTICLE_SELECT_SQL} ORDER BY created_at DESC, uuid ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut articles = Vec::new();
        while let Some(row) = rows.next()? {
            articles.push(parse_article_row(row)?);
        }

        Ok(articles)
    }

    fn count_articles(&self, recycled: bool, status: Option<ArticleStatus>) -> RepoResult<i64> {
        let count = match status {
            Some(status) => self.conn.query_row(
                "SELECT COUNT(*) FROM articles WHERE is_recycled = ?1 AND status = ?2;",
                params![bool_to_int(recycled), status.as_str()],
                |row| row.get(0),
            )?,
            None => self.conn.query_row(
                "SELECT COUNT(*) FROM articles WHERE is_recycled = ?1;",
                [bool_to_int(recycled)],
                |row| row.get(0),
            )?,
        };

        Ok(count)
    }

    fn delete_article(&self, id: ArticleId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM articles WHERE uuid = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::ArticleNotFound(id));
        }

        Ok(())
    }

    fn set_recycled(&self, id: ArticleId, recycled: bool) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE articles
             SET
                is_recycled = ?1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?2;",
            params![bool_to_int(recycled), id.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::ArticleNotFound(id));
        }

        Ok(())
    }
}

fn parse_article_row(row: &Row<'_>) -> RepoResult<Article> {
    let uuid_text: String = row.get("uuid")?;
    let uuid = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in articles.uuid"))
    })?;

    let status_text: String = row.get("status")?;
    let status = ArticleStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid status value `{status_text}` in articles.status"
        ))
    })?;

    let is_recycled = match row.get::<_, i64>("is_recycled")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_recycled value `{other}` in articles.is_recycled"
            )));
        }
    };

    let article = Article {
        uuid,
        category_alias: row.get("category_alias")?,
        tags: tags_from_json(&row.get::<_, String>("tags")?)?,
        images: links_from_json(&row.get::<_, String>("images")?, "articles.images")?,
        accessories: links_from_json(
            &row.get::<_, String>("accessories")?,
            "articles.accessories",
        )?,
        content: row.get("content")?,
        status,
        is_recycled,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    article.validate()?;
    Ok(article)
}

fn tags_to_json(tags: &[String]) -> RepoResult<String> {
    serde_json::to_string(tags)
        .map_err(|err| RepoError::InvalidData(format!("cannot encode tags: {err}")))
}

fn tags_from_json(json: &str) -> RepoResult<Vec<String>> {
    serde_json::from_str(json)
        .map_err(|err| RepoError::InvalidData(format!("invalid JSON in articles.tags: {err}")))
}

fn links_to_json(links: &[ResourceLink]) -> RepoResult<String> {
    serde_json::to_string(links)
        .map_err(|err| RepoError::InvalidData(format!("cannot encode resource links: {err}")))
}

fn links_from_json(json: &str, column: &str) -> RepoResult<Vec<ResourceLink>> {
    serde_json::from_str(json)
        .map_err(|err| RepoError::InvalidData(format!("invalid JSON in {column}: {err}")))
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

pub(crate) fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
