//! Catalog Tree - Library
//! Lazily populated, filterable mirror of a database catalog for schema browser panels
//!
//! A base [`CatalogTree`](catalog::CatalogTree) loads schemas, objects and
//! their columns, indexes, triggers and foreign keys on demand through a
//! [`FetchDelegate`](delegate::FetchDelegate). A filtered view derived from it
//! shares the base payloads and forwards every change back to the base.

pub mod catalog;
pub mod config;
pub mod delegate;
pub mod error;
pub mod fixture;
pub mod tree;
