//! # Cinedex Common Library
//!
//! Shared code for the cinedex crates:
//! - Error taxonomy and result type
//! - Configuration loading
//! - Timestamp utilities

pub mod config;
pub mod error;
pub mod time;

pub use config::{CatalogConfig, LinkMode};
pub use error::{Error, Result};
