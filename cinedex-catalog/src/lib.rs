//! Movie catalog: record normalization and relational upsert pipeline
//!
//! Ingests raw movie payloads assembled from two upstream providers,
//! validates and normalizes them into a canonical record, splits the
//! embedded actors, directors and polls into their own upserted
//! collections, and stores the movie with entity references in their
//! place. Reads expand the references back. Search runs over prefix
//! n-gram blobs with a fuzzy ranking pass; stats answer max-of-field
//! queries over the stored documents.

pub mod catalog;
pub mod db;
pub mod models;
pub mod ngram;
pub mod normalize;
pub mod similarity;
pub mod slug;
pub mod stats;

pub use catalog::{Catalog, SearchHit};
pub use db::movies::MovieFilter;

pub use cinedex_common::{CatalogConfig, Error, LinkMode, Result};
