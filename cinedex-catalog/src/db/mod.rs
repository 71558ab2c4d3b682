//! Persistence gateway for the catalog collections
//!
//! One module per collection plus idempotent schema creation. Movie
//! documents are stored as serialized JSON with the columns the pipeline
//! queries promoted alongside; entity tables carry a `guid` storage
//! identity next to the UNIQUE external id they are upserted by.

pub mod actors;
pub mod directors;
pub mod movies;
pub mod polls;
pub mod schema;

use cinedex_common::{Error, Result};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::path::Path;
use tracing::info;

use crate::models::EntityRef;

/// Open (creating if needed) the catalog database and initialize its schema
pub async fn init_pool(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(20)
        .min_connections(5)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new catalog database: {}", db_path.display());
    } else {
        info!("Opened existing catalog database: {}", db_path.display());
    }

    // WAL allows concurrent readers with one writer; the entity batches
    // of a single write contend only briefly.
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    schema::init_schema(&pool).await?;

    Ok(pool)
}

/// Parse a guid column value
pub(crate) fn parse_guid(guid: &str) -> Result<uuid::Uuid> {
    uuid::Uuid::parse_str(guid)
        .map_err(|e| Error::Internal(format!("Invalid UUID in database: {}", e)))
}

/// Split a reference set into guid and external-id lookups
pub(crate) fn split_refs(refs: &[EntityRef]) -> (Vec<String>, Vec<i64>) {
    let mut guids = Vec::new();
    let mut ext_ids = Vec::new();
    for reference in refs {
        match reference {
            EntityRef::Stored(guid) => guids.push(guid.to_string()),
            EntityRef::External(ext_id) => ext_ids.push(*ext_id),
        }
    }
    (guids, ext_ids)
}

/// Append `guid IN (…) OR ext_id IN (…)` for whichever sets are non-empty
///
/// At least one of the two sets must be non-empty.
pub(crate) fn push_ref_clauses(
    qb: &mut QueryBuilder<'_, Sqlite>,
    guids: &[String],
    ext_ids: &[i64],
) {
    if !guids.is_empty() {
        qb.push("guid IN (");
        let mut items = qb.separated(", ");
        for guid in guids {
            items.push_bind(guid.clone());
        }
        qb.push(")");
    }
    if !guids.is_empty() && !ext_ids.is_empty() {
        qb.push(" OR ");
    }
    if !ext_ids.is_empty() {
        qb.push("ext_id IN (");
        let mut items = qb.separated(", ");
        for ext_id in ext_ids {
            items.push_bind(*ext_id);
        }
        qb.push(")");
    }
}
