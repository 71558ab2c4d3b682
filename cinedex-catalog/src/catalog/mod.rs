//! Catalog coordinator
//!
//! [`Catalog`] ties the pipeline together: validate and normalize a raw
//! payload, upsert the entities it embeds, rewrite them into references
//! per the configured link mode, and persist the movie. Reads run the
//! rewrite in reverse.

mod expand;
mod linker;

use cinedex_common::{config, CatalogConfig, LinkMode, Result};
use serde_json::Value;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::db;
use crate::db::movies::MovieFilter;
use crate::models::{LinkedMovie, Movie};
use crate::ngram;
use crate::normalize;
use crate::similarity;
use crate::stats;

/// Handle to the movie catalog
///
/// Cheap to clone; clones share the same connection pool.
#[derive(Debug, Clone)]
pub struct Catalog {
    pool: SqlitePool,
    link_mode: LinkMode,
    similarity_threshold: f64,
    search_limit: i64,
}

/// One title-search result; lower score means closer match
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub ext_id: i64,
    pub title: String,
    pub score: f64,
}

impl Catalog {
    /// Catalog over an existing pool with default search settings
    pub fn new(pool: SqlitePool, link_mode: LinkMode) -> Self {
        Self {
            pool,
            link_mode,
            similarity_threshold: similarity::DEFAULT_THRESHOLD,
            search_limit: config::DEFAULT_SEARCH_LIMIT,
        }
    }

    /// Catalog over an existing pool, settings taken from the configuration
    pub fn with_config(pool: SqlitePool, config: &CatalogConfig) -> Self {
        Self {
            pool,
            link_mode: config.link_mode,
            similarity_threshold: config.similarity_threshold,
            search_limit: config.search_limit,
        }
    }

    /// Open (creating if needed) the configured database and build a catalog
    pub async fn open(config: &CatalogConfig) -> Result<Self> {
        let pool = db::init_pool(&config.database_path).await?;
        Ok(Self::with_config(pool, config))
    }

    /// Reference representation this catalog writes
    pub fn link_mode(&self) -> LinkMode {
        self.link_mode
    }

    /// The underlying connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Validate, normalize and persist one raw movie payload
    ///
    /// Returns the movie's stable storage guid. Entity rows upserted
    /// before a later step fails stay in place; retrying the same
    /// payload converges on the same state.
    pub async fn save_movie(&self, payload: &Value) -> Result<Uuid> {
        let linked = self.normalize_and_link(payload).await?;
        let guid = db::movies::upsert_movie(&self.pool, &linked).await?;
        debug!(movie = linked.id, %guid, "movie saved");
        Ok(guid)
    }

    /// The write pipeline short of the final movie upsert
    ///
    /// 1. validate and normalize the payload
    /// 2. fill the search blob when the payload left it empty
    /// 3. partition and bulk-upsert the entity batches
    /// 4. rewrite embedded entities into references per the link mode
    pub async fn normalize_and_link(&self, payload: &Value) -> Result<LinkedMovie> {
        let mut movie = normalize::parse_movie(payload)?;

        if movie.search.is_empty() {
            movie.search =
                ngram::search_blob(&movie.social.title, movie.social.original_title.as_deref());
        }

        let batches = linker::partition(&movie);
        linker::upsert_batches(&self.pool, &batches).await?;
        linker::link_movie(&self.pool, self.link_mode, movie).await
    }

    /// Load one movie with its references expanded back into entities
    pub async fn get_movie(&self, ext_id: i64) -> Result<Option<Movie>> {
        match db::movies::get_by_ext_id(&self.pool, ext_id).await? {
            None => Ok(None),
            Some(row) => Ok(Some(expand::expand_movie(&self.pool, row.doc).await?)),
        }
    }

    /// Load one movie document exactly as stored, references included
    pub async fn get_movie_document(&self, ext_id: i64) -> Result<Option<LinkedMovie>> {
        Ok(db::movies::get_by_ext_id(&self.pool, ext_id)
            .await?
            .map(|row| row.doc))
    }

    /// Fuzzy title search over the n-gram search blobs
    ///
    /// Scans up to `limit` candidates whose blob contains the query,
    /// then ranks them by fuzzy distance to the title, best first.
    /// Candidates outside the similarity threshold are dropped.
    pub async fn search_movies(&self, query: &str, limit: Option<i64>) -> Result<Vec<SearchHit>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let limit = limit.unwrap_or(self.search_limit);

        let candidates = db::movies::search_candidates(&self.pool, query, limit).await?;
        let mut hits: Vec<SearchHit> = candidates
            .into_iter()
            .filter_map(|candidate| {
                let score = similarity::rate_with_threshold(
                    &[candidate.title.as_str()],
                    Some(query),
                    self.similarity_threshold,
                );
                // NaN marks a candidate the threshold rejected
                if score.is_nan() {
                    return None;
                }
                Some(SearchHit {
                    ext_id: candidate.ext_id,
                    title: candidate.title,
                    score,
                })
            })
            .collect();
        hits.sort_by(|a, b| a.score.total_cmp(&b.score));

        debug!(query, hits = hits.len(), "title search");
        Ok(hits)
    }

    /// Largest numeric value of a dotted document field across the catalog
    pub async fn max_value(&self, property: &str, filter: Option<&MovieFilter>) -> Result<f64> {
        stats::max_value(&self.pool, property, filter).await
    }
}
