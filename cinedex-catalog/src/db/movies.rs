//! Movie collection operations
//!
//! The stored (linked) document is the source of truth; title, search
//! blob, popularity and the ops flags are promoted into columns so the
//! scan and search paths never have to decode JSON.

use cinedex_common::{Error, Result};
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::db::parse_guid;
use crate::models::LinkedMovie;

/// Stored movie row with the document decoded
#[derive(Debug, Clone)]
pub struct MovieRow {
    pub guid: Uuid,
    pub ext_id: i64,
    pub title: String,
    pub search: String,
    pub popularity: f64,
    pub released: bool,
    pub unfound: bool,
    pub last_job_at: i64,
    pub last_update_at: i64,
    pub doc: LinkedMovie,
}

/// Candidate returned by the search blob scan
#[derive(Debug, Clone)]
pub struct SearchCandidate {
    pub ext_id: i64,
    pub title: String,
}

/// Optional column filter for catalog scans
#[derive(Debug, Clone, Default)]
pub struct MovieFilter {
    pub released: Option<bool>,
    pub unfound: Option<bool>,
    pub min_popularity: Option<f64>,
}

impl MovieFilter {
    /// Append a WHERE clause covering whichever fields are set
    pub(crate) fn push_where(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        qb.push(" WHERE 1=1");
        if let Some(released) = self.released {
            qb.push(" AND released = ").push_bind(released);
        }
        if let Some(unfound) = self.unfound {
            qb.push(" AND unfound = ").push_bind(unfound);
        }
        if let Some(min) = self.min_popularity {
            qb.push(" AND popularity >= ").push_bind(min);
        }
    }
}

/// Upsert one movie by external id, returning its stable guid
///
/// Promoted columns and the document update in one statement, so a
/// reader never observes them out of step.
pub async fn upsert_movie(pool: &SqlitePool, movie: &LinkedMovie) -> Result<Uuid> {
    let doc = serde_json::to_string(movie)
        .map_err(|e| Error::Internal(format!("Failed to serialize movie document: {}", e)))?;

    let guid: (String,) = sqlx::query_as(
        r#"
        INSERT INTO movies (
            guid, ext_id, title, search, popularity, released, unfound,
            last_job_at, last_update_at, doc, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
        ON CONFLICT(ext_id) DO UPDATE SET
            title = excluded.title,
            search = excluded.search,
            popularity = excluded.popularity,
            released = excluded.released,
            unfound = excluded.unfound,
            last_job_at = excluded.last_job_at,
            last_update_at = excluded.last_update_at,
            doc = excluded.doc,
            updated_at = CURRENT_TIMESTAMP
        RETURNING guid
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(movie.id)
    .bind(&movie.social.title)
    .bind(&movie.search)
    .bind(movie.popularity)
    .bind(movie.released)
    .bind(movie.ops.unfound)
    .bind(movie.ops.last_job_at)
    .bind(movie.ops.last_update_at)
    .bind(&doc)
    .fetch_one(pool)
    .await?;

    parse_guid(&guid.0)
}

/// Load one movie by external id
pub async fn get_by_ext_id(pool: &SqlitePool, ext_id: i64) -> Result<Option<MovieRow>> {
    let row = sqlx::query(
        r#"
        SELECT guid, ext_id, title, search, popularity, released, unfound,
               last_job_at, last_update_at, doc
        FROM movies WHERE ext_id = ?
        "#,
    )
    .bind(ext_id)
    .fetch_optional(pool)
    .await?;
    row.as_ref().map(movie_row).transpose()
}

/// Movies whose search blob contains the lowercased query, capped at `limit`
///
/// LIKE metacharacters in the query match literally.
pub async fn search_candidates(
    pool: &SqlitePool,
    query: &str,
    limit: i64,
) -> Result<Vec<SearchCandidate>> {
    // Backslash first, or the wildcard escapes get re-escaped
    let needle = query
        .trim()
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    let rows: Vec<(i64, String)> =
        sqlx::query_as("SELECT ext_id, title FROM movies WHERE search LIKE ? ESCAPE '\\' LIMIT ?")
            .bind(format!("%{}%", needle))
            .bind(limit)
            .fetch_all(pool)
            .await?;
    Ok(rows
        .into_iter()
        .map(|(ext_id, title)| SearchCandidate { ext_id, title })
        .collect())
}

fn movie_row(row: &sqlx::sqlite::SqliteRow) -> Result<MovieRow> {
    let guid: String = row.get("guid");
    let doc: String = row.get("doc");
    let doc: LinkedMovie = serde_json::from_str(&doc)
        .map_err(|e| Error::Internal(format!("Corrupt movie document: {}", e)))?;
    Ok(MovieRow {
        guid: parse_guid(&guid)?,
        ext_id: row.get("ext_id"),
        title: row.get("title"),
        search: row.get("search"),
        popularity: row.get("popularity"),
        released: row.get("released"),
        unfound: row.get("unfound"),
        last_job_at: row.get("last_job_at"),
        last_update_at: row.get("last_update_at"),
        doc,
    })
}
