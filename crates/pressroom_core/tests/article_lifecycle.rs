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

fn draft_article(category: &str, tags: &[&str]) -> Article {
    let mut article = Article::new(category, "body", ArticleStatus::Draft);
    article.tags = tags.iter().map(|tag| tag.to_string()).collect();
    article
}

#[test]
fn creating_articles_counts_category_and_tags() {
    let conn = open_db_in_memory().unwrap();
    seed_category(&conn, "systems");
    let service = service(&conn);

    service
        .create_article(draft_article("systems", &["go", "rust"]))
        .unwrap();
    service
        .create_article(draft_article("systems", &["rust"]))
        .unwrap();
    service
        .create_article(draft_article("systems", &["db"]))
        .unwrap();

    assert_eq!(category_count(&conn, "systems"), 3);
    assert_eq!(tag_count(&conn, "rust"), Some(2));
    assert_eq!(tag_count(&conn, "go"), Some(1));
    assert_eq!(tag_count(&conn, "db"), Some(1));
}

#[test]
fn create_then_delete_is_a_counter_no_op() {
    let conn = open_db_in_memory().unwrap();
    seed_category(&conn, "systems");
    let service = service(&conn);

    // Pre-existing state the article under test must not disturb.
    service
        .create_article(draft_article("systems", &["go"]))
        .unwrap();
    let category_before = category_count(&conn, "systems");
    let go_before = tag_count(&conn, "go");

    let mut article = draft_article("systems", &["go", "rust"]);
    article.images = vec![ResourceLink::new("/media/cover.png", "cover.png")];
    article.accessories = vec![ResourceLink::new("/media/errata.pdf", "errata.pdf")];
    let created = service.create_article(article).unwrap();

    assert_eq!(category_count(&conn, "systems"), category_before + 1);
    assert_eq!(resource_count(&conn, "/media/cover.png"), Some(1));
    assert_eq!(resource_count(&conn, "/media/errata.pdf"), Some(1));

    service.delete_article(created.uuid).unwrap();

    assert_eq!(category_count(&conn, "systems"), category_before);
    assert_eq!(tag_count(&conn, "go"), go_before);
    assert_eq!(tag_count(&conn, "rust"), Some(0));
    assert_eq!(resource_count(&conn, "/media/cover.png"), Some(0));
    assert_eq!(resource_count(&conn, "/media/errata.pdf"), Some(0));
}

#[test]
fn delete_removes_article_tag_bindings() {
    let conn = open_db_in_memory().unwrap();
    seed_category(&conn, "systems");
    let service = service(&conn);

    let created = service
        .create_article(draft_article("systems", &["go", "rust"]))
        .unwrap();

    let catalog = SqliteCatalogRepository::try_new(&conn).unwrap();
    assert_eq!(
        catalog.linked_tags(created.uuid).unwrap(),
        vec!["go".to_string(), "rust".to_string()]
    );

    service.delete_article(created.uuid).unwrap();
    assert!(catalog.linked_tags(created.uuid).unwrap().is_empty());
    assert!(service.delete_article(created.uuid).is_err());
}

#[test]
fn create_rejects_missing_category_and_duplicate_tags_collapse() {
    let conn = open_db_in_memory().unwrap();
    seed_category(&conn, "systems");
    let service = service(&conn);

    let err = service
        .create_article(draft_article("nonexistent", &["go"]))
        .unwrap_err();
    assert!(matches!(err, ArticleServiceError::CategoryNotFound(alias) if alias == "nonexistent"));

    let created = service
        .create_article(draft_article("systems", &["go", "go", "rust"]))
        .unwrap();
    assert_eq!(created.tags, vec!["go".to_string(), "rust".to_string()]);
    assert_eq!(tag_count(&conn, "go"), Some(1));
}

#[test]
fn recycle_bin_toggle_leaves_counters_untouched() {
    let conn = open_db_in_memory().unwrap();
    seed_category(&conn, "systems");
    let service = service(&conn);

    let created = service
        .create_article(draft_article("systems", &["go"]))
        .unwrap();

    let recycled = service.move_to_recycle_bin(created.uuid, true).unwrap();
    assert!(recycled.is_recycled);
    assert_eq!(category_count(&conn, "systems"), 1);
    assert_eq!(tag_count(&conn, "go"), Some(1));

    let restored = service.move_to_recycle_bin(created.uuid, false).unwrap();
    assert!(!restored.is_recycled);
    assert_eq!(category_count(&conn, "systems"), 1);
}

#[test]
fn delete_missing_article_is_explicit_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let err = service.delete_article(uuid::Uuid::new_v4()).unwrap_err();
    assert!(matches!(err, ArticleServiceError::ArticleNotFound(_)));
}
