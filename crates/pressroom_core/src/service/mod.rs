//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep controller layers decoupled from storage details.
//!
//! # Invariants
//! - Every counter a lifecycle operation touches is adjusted exactly once
//!   per operation.

pub mod article_service;
