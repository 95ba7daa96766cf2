//! Catalog repository: categories, tags, article-tag bindings, resources.
//!
//! # Responsibility
//! - Provide keyed lookups and listings for catalog entities.
//! - Own the atomic counter-bump primitives the lifecycle service relies on.
//!
//! # Invariants
//! - Every counter change is one `UPDATE .. SET c = c + delta` statement;
//!   there is no read-modify-write window.
//! - A bump targeting a missing row reports absence instead of inventing
//!   the row (except `upsert_tag_increment`, whose contract is
//!   create-or-increment).
//! - Negative counters are persisted and logged, not clamped; they are the
//!   monitoring signal for a broken bookkeeping path.

use crate::model::article::{now_epoch_ms, ArticleId};
use crate::model::category::Category;
use crate::model::resource::{Resource, ResourceLink};
use crate::model::tag::Tag;
use crate::repo::article_repo::{table_exists, RepoError, RepoResult};
use log::warn;
use rusqlite::{params, Connection, OptionalExtension};

/// Repository interface for catalog entities and counter bumps.
pub trait CatalogRepository {
    /// Inserts one category row.
    fn create_category(&self, category: &Category) -> RepoResult<()>;
    /// Loads one category by unique alias.
    fn get_category(&self, url_alias: &str) -> RepoResult<Option<Category>>;
    /// Lists all categories, oldest first.
    fn list_categories(&self) -> RepoResult<Vec<Category>>;
    /// Atomically adds `delta` to a category's article count.
    fn bump_category_count(&self, url_alias: &str, delta: i64) -> RepoResult<()>;

    /// Loads one tag by unique name.
    fn get_tag(&self, name: &str) -> RepoResult<Option<Tag>>;
    /// Lists all tags, newest first.
    fn list_tags(&self) -> RepoResult<Vec<Tag>>;
    /// Creates the tag with count 1, or atomically increments an existing one.
    fn upsert_tag_increment(&self, name: &str) -> RepoResult<()>;
    /// Atomically adds `delta` to a tag's article count.
    ///
    /// Returns whether a row changed; a missing tag is not an error here
    /// because the update path tolerates decrementing vanished tags.
    fn bump_tag_count(&self, name: &str, delta: i64) -> RepoResult<bool>;

    /// Records that an article carries a tag.
    fn link_tag(&self, article_id: ArticleId, tag_name: &str) -> RepoResult<()>;
    /// Removes one article-tag binding.
    fn unlink_tag(&self, article_id: ArticleId, tag_name: &str) -> RepoResult<()>;
    /// Lists tag names bound to an article, sorted.
    fn linked_tags(&self, article_id: ArticleId) -> RepoResult<Vec<String>>;

    /// Loads one resource by unique location.
    fn get_resource(&self, location: &str) -> RepoResult<Option<Resource>>;
    /// Upserts a resource row with an explicit reference count.
    fn save_resource(&self, link: &ResourceLink, reference_count: i64) -> RepoResult<()>;
    /// Atomically adds `delta` to a resource's reference count.
    fn bump_resource_refs(&self, location: &str, delta: i64) -> RepoResult<()>;
}

/// SQLite-backed catalog repository.
pub struct SqliteCatalogRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCatalogRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        for table in ["categories", "tags", "article_tags", "resources"] {
            if !table_exists(conn, table)? {
                return Err(RepoError::InvalidData(format!(
                    "connection is missing required table `{table}`"
                )));
            }
        }
        Ok(Self { conn })
    }

    fn warn_if_negative(&self, entity: &str, key: &str, sql: &str) -> RepoResult<()> {
        let count: Option<i64> = self
            .conn
            .query_row(sql, [key], |row| row.get(0))
            .optional()?;
        if let Some(count) = count {
            if count < 0 {
                warn!(
                    "event=counter_negative module=repo entity={entity} key={key} count={count}"
                );
            }
        }
        Ok(())
    }
}

impl CatalogRepository for SqliteCatalogRepository<'_> {
    fn create_category(&self, category: &Category) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO categories (url_alias, name, article_count, created_at)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                category.url_alias.as_str(),
                category.name.as_str(),
                category.article_count,
                category.created_at,
            ],
        )?;
        Ok(())
    }

    fn get_category(&self, url_alias: &str) -> RepoResult<Option<Category>> {
        let category = self
            .conn
            .query_row(
                "SELECT url_alias, name, article_count, created_at
                 FROM categories
                 WHERE url_alias = ?1;",
                [url_alias],
                |row| {
                    Ok(Category {
                        url_alias: row.get(0)?,
                        name: row.get(1)?,
                        article_count: row.get(2)?,
                        created_at: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(category)
    }

    fn list_categories(&self) -> RepoResult<Vec<Category>> {
        let mut stmt = self.conn.prepare(
            "SELECT url_alias, name, article_count, created_at
             FROM categories
             ORDER BY created_at ASC, url_alias ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut categories = Vec::new();
        while let Some(row) = rows.next()? {
            categories.push(Category {
                url_alias: row.get(0)?,
                name: row.get(1)?,
                article_count: row.get(2)?,
                created_at: row.get(3)?,
            });
        }
        Ok(categories)
    }

    fn bump_category_count(&self, url_alias: &str, delta: i64) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE categories
             SET article_count = article_count + ?1
             WHERE url_alias = ?2;",
            params![delta, url_alias],
        )?;

        if changed == 0 {
            return Err(RepoError::CategoryNotFound(url_alias.to_string()));
        }

        self.warn_if_negative(
            "category",
            url_alias,
            "SELECT article_count FROM categories WHERE url_alias = ?1;",
        )
    }

    fn get_tag(&self, name: &str) -> RepoResult<Option<Tag>> {
        let tag = self
            .conn
            .query_row(
                "SELECT name, article_count, created_at FROM tags WHERE name = ?1;",
                [name],
                |row| {
                    Ok(Tag {
                        name: row.get(0)?,
                        article_count: row.get(1)?,
                        created_at: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(tag)
    }

    fn list_tags(&self) -> RepoResult<Vec<Tag>> {
        let mut stmt = self.conn.prepare(
            "SELECT name, article_count, created_at
             FROM tags
             ORDER BY created_at DESC, name ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut tags = Vec::new();
        while let Some(row) = rows.next()? {
            tags.push(Tag {
                name: row.get(0)?,
                article_count: row.get(1)?,
                created_at: row.get(2)?,
            });
        }
        Ok(tags)
    }

    fn upsert_tag_increment(&self, name: &str) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO tags (name, article_count, created_at)
             VALUES (?1, 1, ?2)
             ON CONFLICT (name) DO UPDATE SET article_count = article_count + 1;",
            params![name, now_epoch_ms()],
        )?;
        Ok(())
    }

    fn bump_tag_count(&self, name: &str, delta: i64) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE tags SET article_count = article_count + ?1 WHERE name = ?2;",
            params![delta, name],
        )?;

        if changed == 0 {
            return Ok(false);
        }

        self.warn_if_negative(
            "tag",
            name,
            "SELECT article_count FROM tags WHERE name = ?1;",
        )?;
        Ok(true)
    }

    fn link_tag(&self, article_id: ArticleId, tag_name: &str) -> RepoResult<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO article_tags (article_uuid, tag_name) VALUES (?1, ?2);",
            params![article_id.to_string(), tag_name],
        )?;
        Ok(())
    }

    fn unlink_tag(&self, article_id: ArticleId, tag_name: &str) -> RepoResult<()> {
        self.conn.execute(
            "DELETE FROM article_tags WHERE article_uuid = ?1 AND tag_name = ?2;",
            params![article_id.to_string(), tag_name],
        )?;
        Ok(())
    }

    fn linked_tags(&self, article_id: ArticleId) -> RepoResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT tag_name FROM article_tags WHERE article_uuid = ?1 ORDER BY tag_name ASC;",
        )?;
        let mut rows = stmt.query([article_id.to_string()])?;
        let mut tags = Vec::new();
        while let Some(row) = rows.next()? {
            tags.push(row.get(0)?);
        }
        Ok(tags)
    }

    fn get_resource(&self, location: &str) -> RepoResult<Option<Resource>> {
        let resource = self
            .conn
            .query_row(
                "SELECT location, name, reference_count, created_at
                 FROM resources
                 WHERE location = ?1;",
                [location],
                |row| {
                    Ok(Resource {
                        location: row.get(0)?,
                        name: row.get(1)?,
                        reference_count: row.get(2)?,
                        created_at: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(resource)
    }

    fn save_resource(&self, link: &ResourceLink, reference_count: i64) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO resources (location, name, reference_count, created_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (location) DO UPDATE SET
                name = excluded.name,
                reference_count = excluded.reference_count;",
            params![
                link.location.as_str(),
                link.name.as_str(),
                reference_count,
                now_epoch_ms(),
            ],
        )?;
        Ok(())
    }

    fn bump_resource_refs(&self, location: &str, delta: i64) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE resources
             SET reference_count = reference_count + ?1
             WHERE location = ?2;",
            params![delta, location],
        )?;

        if changed == 0 {
            return Err(RepoError::ResourceNotFound(location.to_string()));
        }

        self.warn_if_negative(
            "resource",
            location,
            "SELECT reference_count FROM resources WHERE location = ?1;",
        )
    }
}
