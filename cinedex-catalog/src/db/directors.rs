//! Director collection operations

use cinedex_common::Result;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use std::collections::HashMap;
use uuid::Uuid;

use crate::db::{parse_guid, push_ref_clauses, split_refs};
use crate::models::{Director, EntityRef};

/// Stored director row
#[derive(Debug, Clone)]
pub struct DirectorRow {
    pub guid: Uuid,
    pub ext_id: i64,
    pub name: String,
    pub picture: String,
}

/// Bulk upsert keyed by external id
///
/// The batch must already be deduplicated by external id.
pub async fn upsert_directors(pool: &SqlitePool, directors: &[Director]) -> Result<()> {
    if directors.is_empty() {
        return Ok(());
    }

    let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new(
        "INSERT INTO directors (guid, ext_id, name, picture, created_at, updated_at) ",
    );
    qb.push_values(directors, |mut row, director| {
        row.push_bind(Uuid::new_v4().to_string())
            .push_bind(director.id)
            .push_bind(&director.name)
            .push_bind(&director.picture)
            .push("CURRENT_TIMESTAMP")
            .push("CURRENT_TIMESTAMP");
    });
    qb.push(
        r#" ON CONFLICT(ext_id) DO UPDATE SET
            name = excluded.name,
            picture = excluded.picture,
            updated_at = CURRENT_TIMESTAMP"#,
    );

    qb.build().execute(pool).await?;
    Ok(())
}

/// Map external ids to storage guids for the given id set
pub async fn resolve_guids(pool: &SqlitePool, ext_ids: &[i64]) -> Result<HashMap<i64, Uuid>> {
    if ext_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let mut qb: QueryBuilder<'_, Sqlite> =
        QueryBuilder::new("SELECT ext_id, guid FROM directors WHERE ext_id IN (");
    let mut ids = qb.separated(", ");
    for ext_id in ext_ids {
        ids.push_bind(*ext_id);
    }
    qb.push(")");

    let rows: Vec<(i64, String)> = qb.build_query_as().fetch_all(pool).await?;
    rows.into_iter()
        .map(|(ext_id, guid)| Ok((ext_id, parse_guid(&guid)?)))
        .collect()
}

/// Batched lookup by reference set (guids, external ids, or a mix)
pub async fn find_by_refs(pool: &SqlitePool, refs: &[EntityRef]) -> Result<Vec<DirectorRow>> {
    let (guids, ext_ids) = split_refs(refs);
    if guids.is_empty() && ext_ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut qb: QueryBuilder<'_, Sqlite> =
        QueryBuilder::new("SELECT guid, ext_id, name, picture FROM directors WHERE ");
    push_ref_clauses(&mut qb, &guids, &ext_ids);

    let rows = qb.build().fetch_all(pool).await?;
    rows.iter().map(director_row).collect()
}

/// Load one director by external id
pub async fn get_director(pool: &SqlitePool, ext_id: i64) -> Result<Option<DirectorRow>> {
    let row = sqlx::query("SELECT guid, ext_id, name, picture FROM directors WHERE ext_id = ?")
        .bind(ext_id)
        .fetch_optional(pool)
        .await?;
    row.as_ref().map(director_row).transpose()
}

fn director_row(row: &sqlx::sqlite::SqliteRow) -> Result<DirectorRow> {
    let guid: String = row.get("guid");
    Ok(DirectorRow {
        guid: parse_guid(&guid)?,
        ext_id: row.get("ext_id"),
        name: row.get("name"),
        picture: row.get("picture"),
    })
}
