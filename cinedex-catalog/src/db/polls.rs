//! Poll collection operations

use cinedex_common::Result;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use std::collections::HashMap;
use uuid::Uuid;

use crate::db::{parse_guid, push_ref_clauses, split_refs};
use crate::models::{EntityRef, Poll};

/// Stored poll row
#[derive(Debug, Clone)]
pub struct PollRow {
    pub guid: Uuid,
    pub ext_id: i64,
    pub label: String,
    pub cover: Option<String>,
    pub participation_count: i64,
}

/// Bulk upsert keyed by external id
///
/// The batch must already be deduplicated by external id.
pub async fn upsert_polls(pool: &SqlitePool, polls: &[Poll]) -> Result<()> {
    if polls.is_empty() {
        return Ok(());
    }

    let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new(
        "INSERT INTO polls (guid, ext_id, label, cover, participation_count, created_at, updated_at) ",
    );
    qb.push_values(polls, |mut row, poll| {
        row.push_bind(Uuid::new_v4().to_string())
            .push_bind(poll.id)
            .push_bind(&poll.label)
            .push_bind(&poll.cover)
            .push_bind(poll.participation_count)
            .push("CURRENT_TIMESTAMP")
            .push("CURRENT_TIMESTAMP");
    });
    qb.push(
        r#" ON CONFLICT(ext_id) DO UPDATE SET
            label = excluded.label,
            cover = excluded.cover,
            participation_count = excluded.participation_count,
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
        QueryBuilder::new("SELECT ext_id, guid FROM polls WHERE ext_id IN (");
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
pub async fn find_by_refs(pool: &SqlitePool, refs: &[EntityRef]) -> Result<Vec<PollRow>> {
    let (guids, ext_ids) = split_refs(refs);
    if guids.is_empty() && ext_ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new(
        "SELECT guid, ext_id, label, cover, participation_count FROM polls WHERE ",
    );
    push_ref_clauses(&mut qb, &guids, &ext_ids);

    let rows = qb.build().fetch_all(pool).await?;
    rows.iter().map(poll_row).collect()
}

/// Load one poll by external id
pub async fn get_poll(pool: &SqlitePool, ext_id: i64) -> Result<Option<PollRow>> {
    let row = sqlx::query(
        "SELECT guid, ext_id, label, cover, participation_count FROM polls WHERE ext_id = ?",
    )
    .bind(ext_id)
    .fetch_optional(pool)
    .await?;
    row.as_ref().map(poll_row).transpose()
}

fn poll_row(row: &sqlx::sqlite::SqliteRow) -> Result<PollRow> {
    let guid: String = row.get("guid");
    Ok(PollRow {
        guid: parse_guid(&guid)?,
        ext_id: row.get("ext_id"),
        label: row.get("label"),
        cover: row.get("cover"),
        participation_count: row.get("participation_count"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        crate::db::schema::init_schema(&pool).await.unwrap();
        pool
    }

    fn poll(id: i64, label: &str, participants: i64) -> Poll {
        Poll {
            id,
            label: label.to_string(),
            cover: None,
            participation_count: participants,
        }
    }

    #[tokio::test]
    async fn test_upsert_then_get() {
        let pool = test_pool().await;

        upsert_polls(&pool, &[poll(955, "Best of 2023", 1204)]).await.unwrap();

        let row = get_poll(&pool, 955).await.unwrap().unwrap();
        assert_eq!(row.label, "Best of 2023");
        assert_eq!(row.cover, None);
        assert_eq!(row.participation_count, 1204);
    }

    #[tokio::test]
    async fn test_upsert_updates_participation() {
        let pool = test_pool().await;

        upsert_polls(&pool, &[poll(955, "Best of 2023", 1204)]).await.unwrap();
        let first = get_poll(&pool, 955).await.unwrap().unwrap();

        upsert_polls(&pool, &[poll(955, "Best of 2023", 1599)]).await.unwrap();
        let second = get_poll(&pool, 955).await.unwrap().unwrap();

        assert_eq!(first.guid, second.guid);
        assert_eq!(second.participation_count, 1599);
    }

    #[tokio::test]
    async fn test_cover_round_trips() {
        let pool = test_pool().await;

        let mut with_cover = poll(956, "Top Sci-Fi", 88);
        with_cover.cover = Some("https://img.example/covers/956.jpg".to_string());
        upsert_polls(&pool, &[with_cover]).await.unwrap();

        let row = get_poll(&pool, 956).await.unwrap().unwrap();
        assert_eq!(
            row.cover.as_deref(),
            Some("https://img.example/covers/956.jpg")
        );
    }

    #[tokio::test]
    async fn test_find_by_refs_mixed() {
        let pool = test_pool().await;
        upsert_polls(&pool, &[poll(1, "A", 1), poll(2, "B", 2)]).await.unwrap();

        let guid = get_poll(&pool, 1).await.unwrap().unwrap().guid;
        let refs = [EntityRef::Stored(guid), EntityRef::External(2)];

        let mut rows = find_by_refs(&pool, &refs).await.unwrap();
        rows.sort_by_key(|row| row.ext_id);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].label, "A");
        assert_eq!(rows[1].label, "B");
    }
}
