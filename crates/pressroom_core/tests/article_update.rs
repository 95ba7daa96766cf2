use pressroom_core::db::open_db_in_memory;
use pressroom_core::{
    Article, ArticleService, ArticleServiceError, ArticleStatus, CatalogRepository, Category,
    ResourceLink, SqliteArticleRepository, SqliteCatalogRepository,
};
use rusqlite::Connection;

fn service(conn: &Connection) -> ArticleService<SqliteArticleRepository<'_>, SqliteCatalogRepository<'_>> {
    let articles = SqliteArticleRepository::try_new(conn).unwrap();
    let catalog = SqliteCatalogRepository::try_new(conn).unwrap();
    ArticleService::new(articles, catalog)
}

fn seed_category(conn: &Connection, alias: &str) {
    let catalog = SqliteCatalogRepository::try_new(conn).unwrap();
    catalog
        .create_category(&Category::new(alias, alias.to_uppercase()))
        .unwrap();
}

fn category_count(conn: &Connection, alias: &str) -> i64 {
    let catalog = SqliteCatalogRepository::try_new(conn).unwrap();
    catalog.get_category(alias).unwrap().unwrap().article_count
}

fn tag_count(conn: &Connection, name: &str) -> Option<i64> {
    let catalog = SqliteCatalogRepository::try_new(conn).unwrap();
    catalog.get_tag(name).unwrap().map(|tag| tag.article_count)
}

fn resource_count(conn: &Connection, location: &str) -> Option<i64> {
    let catalog = SqliteCatalogRepository::try_new(conn).unwrap();
    catalog
        .get_resource(location)
        .unwrap()
        .map(|resource| resource.reference_count)
}

#[test]
fn category_move_shifts_one_count_between_categories() {
    let conn = open_db_in_memory().unwrap();
    seed_category(&conn, "systems");
    seed_category(&conn, "culture");
    let service = service(&conn);

    let mut article = Article::new("systems", "body", ArticleStatus::Published);
    article.tags = vec!["go".to_string()];
    let created = service.create_article(article).unwrap();
    assert_eq!(category_count(&conn, "systems"), 1);
    assert_eq!(category_count(&conn, "culture"), 0);

    let mut moved = created.clone();
    moved.category_alias = "culture".to_string();
    service.update_article(moved).unwrap();

    assert_eq!(category_count(&conn, "systems"), 0);
    assert_eq!(category_count(&conn, "culture"), 1);
    // Total across categories is invariant under a move.
    assert_eq!(
        category_count(&conn, "systems") + category_count(&conn, "culture"),
        1
    );
}

#[test]
fn tag_diff_adjusts_only_changed_tags_and_rewrites_bindings() {
    let conn = open_db_in_memory().unwrap();
    seed_category(&conn, "systems");
    let service = service(&conn);

    let mut article = Article::new("systems", "body", ArticleStatus::Draft);
    article.tags = vec!["a".to_string(), "b".to_string()];
    let created = service.create_article(article).unwrap();

    let mut updated = created.clone();
    updated.tags = vec!["b".to_string(), "c".to_string()];
    service.update_article(updated).unwrap();

    assert_eq!(tag_count(&conn, "a"), Some(0));
    assert_eq!(tag_count(&conn, "b"), Some(1));
    assert_eq!(tag_count(&conn, "c"), Some(1));

    let catalog = SqliteCatalogRepository::try_new(&conn).unwrap();
    assert_eq!(
        catalog.linked_tags(created.uuid).unwrap(),
        vec!["b".to_string(), "c".to_string()]
    );
}

#[test]
fn image_reconciliation_follows_content_references() {
    let conn = open_db_in_memory().unwrap();
    seed_category(&conn, "systems");
    let service = service(&conn);

    let mut article = Article::new(
        "systems",
        "intro ![cover](/media/one.png)",
        ArticleStatus::Draft,
    );
    article.images = vec![ResourceLink::new("/media/one.png", "one.png")];
    let created = service.create_article(article).unwrap();
    assert_eq!(resource_count(&conn, "/media/one.png"), Some(1));

    // The caller only populates newly added images; the old one is still
    // referenced by the new content and must be carried over.
    let mut updated = created.clone();
    updated.content = "intro ![cover](/media/one.png) ![extra](/media/two.png)".to_string();
    updated.images = vec![ResourceLink::new("/media/two.png", "two.png")];
    let after_first = service.update_article(updated).unwrap();

    assert_eq!(resource_count(&conn, "/media/one.png"), Some(1));
    assert_eq!(resource_count(&conn, "/media/two.png"), Some(1));
    let mut locations: Vec<&str> = after_first
        .images
        .iter()
        .map(|link| link.location.as_str())
        .collect();
    locations.sort_unstable();
    assert_eq!(locations, vec!["/media/one.png", "/media/two.png"]);

    // Dropping one.png from the content releases its reference.
    let mut second = after_first.clone();
    second.content = "only ![extra](/media/two.png) remains".to_string();
    second.images = Vec::new();
    let after_second = service.update_article(second).unwrap();

    assert_eq!(resource_count(&conn, "/media/one.png"), Some(0));
    assert_eq!(resource_count(&conn, "/media/two.png"), Some(1));
    assert_eq!(after_second.images.len(), 1);
    assert_eq!(after_second.images[0].location, "/media/two.png");
}

#[test]
fn accessory_reconciliation_diffs_by_location() {
    let conn = open_db_in_memory().unwrap();
    seed_category(&conn, "systems");
    let service = service(&conn);

    let mut article = Article::new("systems", "body", ArticleStatus::Draft);
    article.accessories = vec![
        ResourceLink::new("/files/a.pdf", "a.pdf"),
        ResourceLink::new("/files/keep.zip", "keep.zip"),
    ];
    let created = service.create_article(article).unwrap();

    let mut updated = created.clone();
    updated.accessories = vec![
        ResourceLink::new("/files/keep.zip", "keep.zip"),
        ResourceLink::new("/files/b.pdf", "b.pdf"),
    ];
    service.update_article(updated).unwrap();

    assert_eq!(resource_count(&conn, "/files/a.pdf"), Some(0));
    assert_eq!(resource_count(&conn, "/files/keep.zip"), Some(1));
    assert_eq!(resource_count(&conn, "/files/b.pdf"), Some(1));
}

#[test]
fn update_missing_article_is_explicit_not_found() {
    let conn = open_db_in_memory().unwrap();
    seed_category(&conn, "systems");
    let service = service(&conn);

    let ghost = Article::new("systems", "body", ArticleStatus::Draft);
    let err = service.update_article(ghost).unwrap_err();
    assert!(matches!(err, ArticleServiceError::ArticleNotFound(_)));
}

#[test]
fn update_into_missing_category_fails_before_old_category_changes() {
    let conn = open_db_in_memory().unwrap();
    seed_category(&conn, "systems");
    let service = service(&conn);

    let created = service
        .create_article(Article::new("systems", "body", ArticleStatus::Draft))
        .unwrap();

    let mut moved = created.clone();
    moved.category_alias = "ghost".to_string();
    let err = service.update_article(moved).unwrap_err();
    assert!(matches!(err, ArticleServiceError::CategoryNotFound(alias) if alias == "ghost"));
    assert_eq!(category_count(&conn, "systems"), 1);
}
