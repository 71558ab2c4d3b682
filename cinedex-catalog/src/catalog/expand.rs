//! Read-time expansion of stored references into embedded entities

use cinedex_common::{Error, Result};
use sqlx::SqlitePool;
use std::collections::HashMap;
use tokio::try_join;

use crate::db;
use crate::models::{
    Actor, CastEntry, Director, EntityRef, LinkedMovie, Movie, Poll, SocialRecord,
};

/// Resolve every reference on a stored movie back into entity values
///
/// All three kinds are fetched in one batched lookup each. A reference
/// that resolves to nothing means the document and the entity tables
/// disagree, and the whole expansion fails.
pub(crate) async fn expand_movie(pool: &SqlitePool, linked: LinkedMovie) -> Result<Movie> {
    let social = linked.social;

    let actor_refs: Vec<EntityRef> = social.actors.iter().map(|edge| edge.actor).collect();
    let (actor_rows, director_rows, poll_rows) = try_join!(
        db::actors::find_by_refs(pool, &actor_refs),
        db::directors::find_by_refs(pool, &social.directors),
        db::polls::find_by_refs(pool, &social.polls),
    )?;

    let actors_by_ref = index_actors(actor_rows);
    let directors_by_ref = index_directors(director_rows);
    let polls_by_ref = index_polls(poll_rows);

    let actors = social
        .actors
        .into_iter()
        .map(|edge| {
            let actor = actors_by_ref
                .get(&edge.actor)
                .cloned()
                .ok_or_else(|| dangling("actor", edge.actor))?;
            Ok(CastEntry {
                actor,
                role: edge.role,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let directors = social
        .directors
        .into_iter()
        .map(|reference| {
            directors_by_ref
                .get(&reference)
                .cloned()
                .ok_or_else(|| dangling("director", reference))
        })
        .collect::<Result<Vec<_>>>()?;

    let polls = social
        .polls
        .into_iter()
        .map(|reference| {
            polls_by_ref
                .get(&reference)
                .cloned()
                .ok_or_else(|| dangling("poll", reference))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Movie {
        id: linked.id,
        social: SocialRecord {
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
        meta: linked.meta,
        providers: linked.providers,
        search: linked.search,
        popularity: linked.popularity,
        released: linked.released,
        ops: linked.ops,
    })
}

fn dangling(kind: &str, reference: EntityRef) -> Error {
    Error::NotFound(format!("{} reference {} does not resolve", kind, reference))
}

// Each row is indexed under both of its addresses, so documents written
// in either link mode resolve through the same map.

fn index_actors(rows: Vec<db::actors::ActorRow>) -> HashMap<EntityRef, Actor> {
    let mut map = HashMap::with_capacity(rows.len() * 2);
    for row in rows {
        let db::actors::ActorRow {
            guid,
            ext_id,
            name,
            picture,
        } = row;
        let actor = Actor {
            id: ext_id,
            name,
            picture,
        };
        map.insert(EntityRef::Stored(guid), actor.clone());
        map.insert(EntityRef::External(ext_id), actor);
    }
    map
}

fn index_directors(rows: Vec<db::directors::DirectorRow>) -> HashMap<EntityRef, Director> {
    let mut map = HashMap::with_capacity(rows.len() * 2);
    for row in rows {
        let db::directors::DirectorRow {
            guid,
            ext_id,
            name,
            picture,
        } = row;
        let director = Director {
            id: ext_id,
            name,
            picture,
        };
        map.insert(EntityRef::Stored(guid), director.clone());
        map.insert(EntityRef::External(ext_id), director);
    }
    map
}

fn index_polls(rows: Vec<db::polls::PollRow>) -> HashMap<EntityRef, Poll> {
    let mut map = HashMap::with_capacity(rows.len() * 2);
    for row in rows {
        let db::polls::PollRow {
            guid,
            ext_id,
            label,
            cover,
            participation_count,
        } = row;
        let poll = Poll {
            id: ext_id,
            label,
            cover,
            participation_count,
        };
        map.insert(EntityRef::Stored(guid), poll.clone());
        map.insert(EntityRef::External(ext_id), poll);
    }
    map
}
