//! Domain model for articles and their catalog entities.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep validation rules next to the records they protect.
//!
//! # Invariants
//! - Every article is identified by a stable `ArticleId`.
//! - Recycle-bin state is a soft-delete flag on the article, never a
//!   separate copy of the record.
//! - Denormalized counters (`article_count`, `reference_count`) are owned
//!   by the lifecycle service; model types only carry them.

pub mod article;
pub mod category;
pub mod resource;
pub mod tag;
