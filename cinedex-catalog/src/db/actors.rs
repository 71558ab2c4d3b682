//! Actor collection operations

use cinedex_common::Result;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use std::collections::HashMap;
use uuid::Uuid;

use crate::db::{parse_guid, push_ref_clauses, split_refs};
use crate::models::{Actor, EntityRef};

/// Stored actor row
#[derive(Debug, Clone)]
pub struct ActorRow {
    pub guid: Uuid,
    pub ext_id: i64,
    pub name: String,
    pub picture: String,
}

/// Bulk upsert keyed by external id
///
/// Fresh rows receive a new guid; rows hit on conflict keep theirs and
/// take the incoming field values. The batch must already be
/// deduplicated by external id.
pub async fn upsert_actors(pool: &SqlitePool, actors: &[Actor]) -> Result<()> {
    if actors.is_empty() {
        return Ok(());
    }

    let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new(
        "INSERT INTO actors (guid, ext_id, name, picture, created_at, updated_at) ",
    );
    qb.push_values(actors, |mut row, actor| {
        row.push_bind(Uuid::new_v4().to_string())
            .push_bind(actor.id)
            .push_bind(&actor.name)
            .push_bind(&actor.picture)
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
///
/// Ids with no stored row are absent from the result.
pub async fn resolve_guids(pool: &SqlitePool, ext_ids: &[i64]) -> Result<HashMap<i64, Uuid>> {
    if ext_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let mut qb: QueryBuilder<'_, Sqlite> =
        QueryBuilder::new("SELECT ext_id, guid FROM actors WHERE ext_id IN (");
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
pub async fn find_by_refs(pool: &SqlitePool, refs: &[EntityRef]) -> Result<Vec<ActorRow>> {
    let (guids, ext_ids) = split_refs(refs);
    if guids.is_empty() && ext_ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut qb: QueryBuilder<'_, Sqlite> =
        QueryBuilder::new("SELECT guid, ext_id, name, picture FROM actors WHERE ");
    push_ref_clauses(&mut qb, &guids, &ext_ids);

    let rows = qb.build().fetch_all(pool).await?;
    rows.iter().map(actor_row).collect()
}

/// Load one actor by external id
pub async fn get_actor(pool: &SqlitePool, ext_id: i64) -> Result<Option<ActorRow>> {
    let row = sqlx::query("SELECT guid, ext_id, name, picture FROM actors WHERE ext_id = ?")
        .bind(ext_id)
        .fetch_optional(pool)
        .await?;
    row.as_ref().map(actor_row).transpose()
}

fn actor_row(row: &sqlx::sqlite::SqliteRow) -> Result<ActorRow> {
    let guid: String = row.get("guid");
    Ok(ActorRow {
        guid: parse_guid(&guid)?,
        ext_id: row.get("ext_id"),
        name: row.get("name"),
        picture: row.get("picture"),
    })
}
