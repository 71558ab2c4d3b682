//! Write-path linking
//!
//! Partitions the embedded entities out of a canonical movie, bulk
//! upserts them, and rewrites the movie's entity lists into references
//! per the configured link mode.

use cinedex_common::{Error, LinkMode, Result};
use sqlx::SqlitePool;
use std::collections::HashMap;
use tokio::try_join;
use tracing::debug;
use uuid::Uuid;

use crate::db;
use crate::models::{Actor, CastRef, Director, EntityRef, LinkedMovie, LinkedSocial, Movie, Poll};

/// Entity batches partitioned out of one canonical movie
///
/// Each batch is deduplicated by external id with the last occurrence
/// winning; the movie's own edge lists are left untouched.
#[derive(Debug, Default)]
pub(crate) struct EntityBatches {
    pub(crate) actors: Vec<Actor>,
    pub(crate) directors: Vec<Director>,
    pub(crate) polls: Vec<Poll>,
}

pub(crate) fn partition(movie: &Movie) -> EntityBatches {
    EntityBatches {
        actors: dedup_last_wins(
            movie.social.actors.iter().map(|entry| entry.actor.clone()),
            |actor| actor.id,
        ),
        directors: dedup_last_wins(movie.social.directors.iter().cloned(), |d| d.id),
        polls: dedup_last_wins(movie.social.polls.iter().cloned(), |p| p.id),
    }
}

/// Deduplicate by key, keeping first-seen order and last-seen values
fn dedup_last_wins<T>(items: impl Iterator<Item = T>, key: impl Fn(&T) -> i64) -> Vec<T> {
    let mut order = Vec::new();
    let mut by_id: HashMap<i64, T> = HashMap::new();
    for item in items {
        let id = key(&item);
        if !by_id.contains_key(&id) {
            order.push(id);
        }
        by_id.insert(id, item);
    }
    order
        .into_iter()
        .filter_map(|id| by_id.remove(&id))
        .collect()
}

/// Upsert all three entity batches concurrently
pub(crate) async fn upsert_batches(pool: &SqlitePool, batches: &EntityBatches) -> Result<()> {
    debug!(
        actors = batches.actors.len(),
        directors = batches.directors.len(),
        polls = batches.polls.len(),
        "upserting entity batches"
    );
    try_join!(
        db::actors::upsert_actors(pool, &batches.actors),
        db::directors::upsert_directors(pool, &batches.directors),
        db::polls::upsert_polls(pool, &batches.polls),
    )?;
    Ok(())
}

/// Rewrite the embedded entity lists into references
///
/// Must run after [`upsert_batches`]: in resolved-id mode every entity
/// on the movie is expected to have a stored row by now, and a missing
/// one is an internal error rather than a validation problem.
pub(crate) async fn link_movie(
    pool: &SqlitePool,
    mode: LinkMode,
    movie: Movie,
) -> Result<LinkedMovie> {
    let maps = match mode {
        LinkMode::NaturalKey => None,
        LinkMode::ResolvedId => Some(resolution_maps(pool, &movie).await?),
    };

    let social = movie.social;

    let actors = social
        .actors
        .into_iter()
        .map(|entry| {
            Ok(CastRef {
                actor: make_ref(maps.as_ref().map(|m| &m.actors), entry.actor.id, "actor")?,
                role: entry.role,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let directors = social
        .directors
        .into_iter()
        .map(|director| make_ref(maps.as_ref().map(|m| &m.directors), director.id, "director"))
        .collect::<Result<Vec<_>>>()?;

    let polls = social
        .polls
        .into_iter()
        .map(|poll| make_ref(maps.as_ref().map(|m| &m.polls), poll.id, "poll"))
        .collect::<Result<Vec<_>>>()?;

    Ok(LinkedMovie {
        id: movie.id,
        social: LinkedSocial {
            actors,
            directors,
            polls,
            category: social.category,
            countries: social.countries,
            date_release: social.date_release,
            date_release_original: social.date_release_original,
            duration: social.duration,
            genres: social.genres,
            id: social.id,
            local_release_date: social.local_release_date,
            original_title: social.original_title,
            pictures: social.pictures,
            popularity: social.popularity,
            rating: social.rating,
            slug: social.slug,
            stats: social.stats,
            synopsis: social.synopsis,
            title: social.title,
            videos: social.videos,
            year_of_production: social.year_of_production,
        },
        meta: movie.meta,
        providers: movie.providers,
        search: movie.search,
        popularity: movie.popularity,
        released: movie.released,
        ops: movie.ops,
    })
}

struct ResolutionMaps {
    actors: HashMap<i64, Uuid>,
    directors: HashMap<i64, Uuid>,
    polls: HashMap<i64, Uuid>,
}

async fn resolution_maps(pool: &SqlitePool, movie: &Movie) -> Result<ResolutionMaps> {
    let actor_ids: Vec<i64> = movie.social.actors.iter().map(|e| e.actor.id).collect();
    let director_ids: Vec<i64> = movie.social.directors.iter().map(|d| d.id).collect();
    let poll_ids: Vec<i64> = movie.social.polls.iter().map(|p| p.id).collect();

    let (actors, directors, polls) = try_join!(
        db::actors::resolve_guids(pool, &actor_ids),
        db::directors::resolve_guids(pool, &director_ids),
        db::polls::resolve_guids(pool, &poll_ids),
    )?;

    Ok(ResolutionMaps {
        actors,
        directors,
        polls,
    })
}

fn make_ref(map: Option<&HashMap<i64, Uuid>>, ext_id: i64, kind: &str) -> Result<EntityRef> {
    match map {
        None => Ok(EntityRef::External(ext_id)),
        Some(map) => map
            .get(&ext_id)
            .map(|guid| EntityRef::Stored(*guid))
            .ok_or_else(|| Error::Internal(format!("{} {} missing after upsert", kind, ext_id))),
    }
}
