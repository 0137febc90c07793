//! Persistence layer for a crawled product catalog.
//!
//! The catalog is a four-level hierarchy (category, two subcategory levels,
//! product) plus free-form product properties, stored in SQLite through
//! Diesel. Besides plain CRUD the repository tracks crawl progress: workers
//! lease unparsed listings and products, then mark them parsed or failed.
//!
//! The `data` feature builds everything except the `catalog-admin` binary's
//! configuration loader, which needs `cli`.

#[cfg(feature = "cli")]
pub mod config;
#[cfg(feature = "data")]
pub mod db;
#[cfg(feature = "data")]
pub mod domain;
#[cfg(feature = "data")]
pub mod dto;
#[cfg(feature = "data")]
pub mod forms;
#[cfg(feature = "data")]
pub mod models;
#[cfg(feature = "data")]
pub mod repository;
#[cfg(feature = "data")]
pub mod schema;
#[cfg(feature = "data")]
pub mod services;
