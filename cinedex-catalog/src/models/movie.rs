//! Movie aggregate: canonical and stored (linked) variants
//!
//! The canonical `Movie` embeds full entity values and is what validation
//! produces and what reads return after expansion. `LinkedMovie` is the
//! shape persisted in the `movies` collection: identical except that the
//! three entity lists hold `EntityRef` links instead of embedded values.

use crate::models::entities::{CastEntry, CastRef, Director, EntityRef, Poll};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Canonical movie record with embedded related entities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    /// External numeric id, unique and immutable
    pub id: i64,
    pub social: SocialRecord,
    pub meta: Option<MetaRecord>,
    pub providers: Vec<WatchProvider>,
    /// Free-text search blob (prefix n-grams)
    pub search: String,
    pub popularity: f64,
    pub released: bool,
    pub ops: OpsData,
}

/// Stored movie record: entity lists reduced to references
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedMovie {
    pub id: i64,
    pub social: LinkedSocial,
    pub meta: Option<MetaRecord>,
    pub providers: Vec<WatchProvider>,
    pub search: String,
    pub popularity: f64,
    pub released: bool,
    pub ops: OpsData,
}

/// Social/rating-provider sub-record, canonical form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialRecord {
    pub actors: Vec<CastEntry>,
    /// Defaults to "Film" when the payload omits it
    pub category: String,
    pub countries: Vec<String>,
    pub date_release: Option<String>,
    pub date_release_original: Option<String>,
    pub directors: Vec<Director>,
    pub duration: Option<i64>,
    pub genres: Vec<String>,
    /// Provider's own id for this movie
    pub id: i64,
    pub local_release_date: Option<String>,
    pub original_title: Option<String>,
    pub pictures: Pictures,
    pub polls: Vec<Poll>,
    pub popularity: f64,
    pub rating: Option<f64>,
    pub slug: String,
    pub stats: SocialStats,
    pub synopsis: String,
    pub title: String,
    /// Hoisted out of the payload's `medias.videos` wrapper
    pub videos: Vec<Video>,
    pub year_of_production: Option<i64>,
}

/// Social sub-record in stored form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedSocial {
    pub actors: Vec<CastRef>,
    pub category: String,
    pub countries: Vec<String>,
    pub date_release: Option<String>,
    pub date_release_original: Option<String>,
    pub directors: Vec<EntityRef>,
    pub duration: Option<i64>,
    pub genres: Vec<String>,
    pub id: i64,
    pub local_release_date: Option<String>,
    pub original_title: Option<String>,
    pub pictures: Pictures,
    pub polls: Vec<EntityRef>,
    pub popularity: f64,
    pub rating: Option<f64>,
    pub slug: String,
    pub stats: SocialStats,
    pub synopsis: String,
    pub title: String,
    pub videos: Vec<Video>,
    pub year_of_production: Option<i64>,
}

/// Poster/backdrop/screenshot URL sets
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Pictures {
    pub backdrops: Vec<String>,
    pub posters: Vec<String>,
    pub screenshots: Vec<String>,
}

/// Engagement counters from the social provider
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SocialStats {
    pub rating_count: i64,
    pub recommend_count: i64,
    pub review_count: i64,
    pub wish_count: i64,
}

/// Trailer/clip attached to a movie
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub id: String,
    pub image: Option<String>,
    pub provider: String,
    pub kind: String,
}

/// Metadata-provider sub-record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaRecord {
    pub clean_title: String,
    pub digital_release: Option<String>,
    pub genres: Vec<String>,
    /// Projected from the payload's `{remote_url}` wrappers
    pub images: Vec<String>,
    pub imdb_id: Option<String>,
    pub in_cinemas: Option<String>,
    pub original_language: Language,
    pub original_title: String,
    pub physical_release: Option<String>,
    pub popularity: f64,
    /// Keyed by rating source name; BTreeMap keeps serialization stable
    pub ratings: BTreeMap<String, RatingStat>,
    /// Provider's own id for this movie
    pub remote_id: i64,
    pub runtime: i64,
    /// Provider scan cursor, defaults to 0
    pub search_page: i64,
    pub sort_title: String,
    pub studio: String,
    pub title: String,
    pub year: i64,
}

/// Language descriptor from the metadata provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Language {
    pub id: i64,
    pub name: String,
}

/// One rating source's aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingStat {
    pub votes: i64,
    pub value: f64,
}

/// Watch-provider entry; unknown keys pass through unchanged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchProvider {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Pipeline bookkeeping carried on every movie
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpsData {
    /// Epoch milliseconds of the last ingest job that touched this movie
    pub last_job_at: i64,
    /// Epoch milliseconds of the last upstream change observed
    pub last_update_at: i64,
    /// Set when an upstream lookup came back empty
    pub unfound: bool,
}

/// Minimal canonical movie for pipeline-level tests
#[cfg(test)]
pub(crate) fn movie_fixture(ext_id: i64, title: &str) -> Movie {
    Movie {
        id: ext_id,
        social: SocialRecord {
            actors: vec![],
            category: "Film".to_string(),
            countries: vec![],
            date_release: None,
            date_release_original: None,
            directors: vec![],
            duration: None,
            genres: vec![],
            id: ext_id,
            local_release_date: None,
            original_title: None,
            pictures: Pictures::default(),
            polls: vec![],
            popularity: 0.0,
            rating: None,
            slug: String::new(),
            stats: SocialStats::default(),
            synopsis: String::new(),
            title: title.to_string(),
            videos: vec![],
            year_of_production: None,
        },
        meta: None,
        providers: vec![],
        search: String::new(),
        popularity: 0.0,
        released: false,
        ops: OpsData {
            last_job_at: 1_700_000_000_000,
            last_update_at: 1_700_000_000_000,
            unfound: false,
        },
    }
}

/// Minimal stored movie for persistence-level tests
#[cfg(test)]
pub(crate) fn linked_fixture(ext_id: i64, title: &str) -> LinkedMovie {
    LinkedMovie {
        id: ext_id,
        social: LinkedSocial {
            actors: vec![],
            category: "Film".to_string(),
            countries: vec![],
            date_release: None,
            date_release_original: None,
            directors: vec![],
            duration: None,
            genres: vec![],
            id: ext_id,
            local_release_date: None,
            original_title: None,
            pictures: Pictures::default(),
            polls: vec![],
            popularity: 0.0,
            rating: None,
            slug: String::new(),
            stats: SocialStats::default(),
            synopsis: String::new(),
            title: title.to_string(),
            videos: vec![],
            year_of_production: None,
        },
        meta: None,
        providers: vec![],
        search: String::new(),
        popularity: 0.0,
        released: false,
        ops: OpsData {
            last_job_at: 1_700_000_000_000,
            last_update_at: 1_700_000_000_000,
            unfound: false,
        },
    }
}
