//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Repository writes must enforce `Article::validate()` before persistence.
//! - Counter updates are single atomic in-place bumps, never a
//!   load-increment-save round trip.
//! - Repository APIs return semantic errors (NotFound variants) in addition
//!   to DB transport errors.

pub mod article_repo;
pub mod catalog_repo;
