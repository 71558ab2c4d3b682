//! Payload validation and normalization
//!
//! Turns a loosely-typed JSON payload (the merge of both upstream
//! providers, snake_case keys) into a canonical [`Movie`], or fails with
//! `Error::Validation` naming the dotted path of the first offending
//! field. All-or-nothing: no partially normalized record is ever produced.
//!
//! Normalization applies the upstream quirks in one place:
//! - wrapper projections (`countries[].name`, `genres[].label`,
//!   `polls[].poll`, meta `images[].remote_url`)
//! - actor/director `contact` flattening; a cast entry without contact is
//!   dropped, a director without contact is rejected
//! - `medias.videos` hoisted to `videos`, null tolerated at both levels
//! - defaults: `category` "Film", `search` "", `popularity` 0,
//!   `released`/`unfound` false, ops timestamps "now", lists empty
//! - unknown keys are ignored, except watch-provider entries which carry
//!   them through unchanged

mod field;

use crate::models::{
    Actor, CastEntry, Director, Language, MetaRecord, Movie, OpsData, Pictures, Poll, RatingStat,
    SocialRecord, SocialStats, Video, WatchProvider,
};
use cinedex_common::{time, Result};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::debug;

/// Validate and normalize one merged upstream payload
pub fn parse_movie(payload: &Value) -> Result<Movie> {
    let root = field::as_object(payload, "payload")?;

    let (social_obj, social_path) = field::req_object(root, "", "social")?;
    let social = social_record(social_obj, &social_path)?;

    let meta = match field::opt_object(root, "", "meta")? {
        Some((meta_obj, meta_path)) => Some(meta_record(meta_obj, &meta_path)?),
        None => None,
    };

    Ok(Movie {
        id: field::req_i64(root, "", "id")?,
        social,
        meta,
        providers: providers(root)?,
        search: field::str_or(root, "", "search", "")?,
        popularity: field::f64_or(root, "", "popularity", 0.0)?,
        released: field::bool_or(root, "", "released", false)?,
        ops: ops_data(root)?,
    })
}

fn social_record(obj: &Map<String, Value>, path: &str) -> Result<SocialRecord> {
    let countries_path = field::join(path, "countries");
    let genres_path = field::join(path, "genres");

    Ok(SocialRecord {
        actors: cast_entries(obj, path)?,
        category: field::str_or(obj, path, "category", "Film")?,
        countries: named_wrappers(
            field::req_slice(obj, path, "countries")?,
            &countries_path,
            "name",
        )?,
        date_release: field::opt_str(obj, path, "date_release")?,
        date_release_original: field::opt_str(obj, path, "date_release_original")?,
        directors: director_entries(obj, path)?,
        duration: field::opt_i64(obj, path, "duration")?,
        genres: named_wrappers(field::req_slice(obj, path, "genres")?, &genres_path, "label")?,
        id: field::req_i64(obj, path, "id")?,
        local_release_date: field::opt_str(obj, path, "local_release_date")?,
        original_title: field::opt_str(obj, path, "original_title")?,
        pictures: pictures(obj, path)?,
        polls: poll_entries(obj, path)?,
        popularity: field::f64_or(obj, path, "popularity", 0.0)?,
        rating: field::opt_f64(obj, path, "rating")?,
        slug: field::req_str(obj, path, "slug")?,
        stats: social_stats(obj, path)?,
        synopsis: field::req_str(obj, path, "synopsis")?,
        title: field::req_str(obj, path, "title")?,
        videos: videos(obj, path)?,
        year_of_production: field::opt_i64(obj, path, "year_of_production")?,
    })
}

/// Project `[{key: "value"}]` wrappers to a flat string list
fn named_wrappers(items: &[Value], path: &str, key: &str) -> Result<Vec<String>> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let item_path = field::index(path, i);
            let obj = field::as_object(item, &item_path)?;
            field::req_str(obj, &item_path, key)
        })
        .collect()
}

fn cast_entries(obj: &Map<String, Value>, path: &str) -> Result<Vec<CastEntry>> {
    let list_path = field::join(path, "actors");
    let items = field::slice_or_empty(obj, path, "actors")?;

    let mut entries = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let entry_path = field::index(&list_path, i);
        let entry = field::as_object(item, &entry_path)?;
        let name = field::req_str(entry, &entry_path, "name")?;
        let role = field::opt_str(entry, &entry_path, "role")?;

        // Without contact there is no external id to link the entry to.
        let Some((contact, contact_path)) = field::opt_object(entry, &entry_path, "contact")?
        else {
            debug!(actor = %name, "dropping cast entry without contact");
            continue;
        };

        entries.push(CastEntry {
            actor: Actor {
                id: field::req_i64(contact, &contact_path, "id")?,
                name,
                picture: field::req_str(contact, &contact_path, "picture")?,
            },
            role,
        });
    }
    Ok(entries)
}

fn director_entries(obj: &Map<String, Value>, path: &str) -> Result<Vec<Director>> {
    let list_path = field::join(path, "directors");
    let items = field::slice_or_empty(obj, path, "directors")?;

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let entry_path = field::index(&list_path, i);
            let entry = field::as_object(item, &entry_path)?;
            let (contact, contact_path) = field::req_object(entry, &entry_path, "contact")?;
            Ok(Director {
                id: field::req_i64(contact, &contact_path, "id")?,
                name: field::req_str(entry, &entry_path, "name")?,
                picture: field::req_str(contact, &contact_path, "picture")?,
            })
        })
        .collect()
}

fn poll_entries(obj: &Map<String, Value>, path: &str) -> Result<Vec<Poll>> {
    let list_path = field::join(path, "polls");
    let items = field::slice_or_empty(obj, path, "polls")?;

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let entry_path = field::index(&list_path, i);
            let entry = field::as_object(item, &entry_path)?;
            let (poll, poll_path) = field::req_object(entry, &entry_path, "poll")?;
            Ok(Poll {
                id: field::req_i64(poll, &poll_path, "id")?,
                label: field::req_str(poll, &poll_path, "label")?,
                cover: field::opt_str(poll, &poll_path, "cover")?,
                participation_count: field::req_i64(poll, &poll_path, "participation_count")?,
            })
        })
        .collect()
}

fn pictures(obj: &Map<String, Value>, path: &str) -> Result<Pictures> {
    let (pics, pics_path) = field::req_object(obj, path, "pictures")?;
    Ok(Pictures {
        backdrops: field::string_list(pics, &pics_path, "backdrops")?,
        posters: field::string_list(pics, &pics_path, "posters")?,
        screenshots: field::string_list(pics, &pics_path, "screenshots")?,
    })
}

fn social_stats(obj: &Map<String, Value>, path: &str) -> Result<SocialStats> {
    let (stats, stats_path) = field::req_object(obj, path, "stats")?;
    Ok(SocialStats {
        rating_count: field::req_i64(stats, &stats_path, "rating_count")?,
        recommend_count: field::req_i64(stats, &stats_path, "recommend_count")?,
        review_count: field::req_i64(stats, &stats_path, "review_count")?,
        wish_count: field::req_i64(stats, &stats_path, "wish_count")?,
    })
}

fn videos(obj: &Map<String, Value>, path: &str) -> Result<Vec<Video>> {
    // Videos sit under a `medias` wrapper; both levels tolerate null.
    let Some((medias, medias_path)) = field::opt_object(obj, path, "medias")? else {
        return Ok(Vec::new());
    };
    let list_path = field::join(&medias_path, "videos");
    let items = field::slice_or_empty(medias, &medias_path, "videos")?;

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let item_path = field::index(&list_path, i);
            let video = field::as_object(item, &item_path)?;
            Ok(Video {
                id: field::req_str(video, &item_path, "id")?,
                image: field::opt_str(video, &item_path, "image")?,
                provider: field::req_str(video, &item_path, "provider")?,
                kind: field::req_str(video, &item_path, "kind")?,
            })
        })
        .collect()
}

fn meta_record(obj: &Map<String, Value>, path: &str) -> Result<MetaRecord> {
    let images_path = field::join(path, "images");
    let (lang, lang_path) = field::req_object(obj, path, "original_language")?;

    Ok(MetaRecord {
        clean_title: field::req_str(obj, path, "clean_title")?,
        digital_release: field::opt_str(obj, path, "digital_release")?,
        genres: field::string_list(obj, path, "genres")?,
        images: named_wrappers(
            field::req_slice(obj, path, "images")?,
            &images_path,
            "remote_url",
        )?,
        imdb_id: field::opt_str(obj, path, "imdb_id")?,
        in_cinemas: field::opt_str(obj, path, "in_cinemas")?,
        original_language: Language {
            id: field::req_i64(lang, &lang_path, "id")?,
            name: field::req_str(lang, &lang_path, "name")?,
        },
        original_title: field::req_str(obj, path, "original_title")?,
        physical_release: field::opt_str(obj, path, "physical_release")?,
        popularity: field::req_f64(obj, path, "popularity")?,
        ratings: rating_map(obj, path)?,
        remote_id: field::req_i64(obj, path, "remote_id")?,
        runtime: field::req_i64(obj, path, "runtime")?,
        search_page: field::i64_or(obj, path, "search_page", 0)?,
        sort_title: field::req_str(obj, path, "sort_title")?,
        studio: field::req_str(obj, path, "studio")?,
        title: field::req_str(obj, path, "title")?,
        year: field::req_i64(obj, path, "year")?,
    })
}

fn rating_map(obj: &Map<String, Value>, path: &str) -> Result<BTreeMap<String, RatingStat>> {
    let (ratings, ratings_path) = field::req_object(obj, path, "ratings")?;
    ratings
        .iter()
        .map(|(source, value)| {
            let entry_path = field::join(&ratings_path, source);
            let entry = field::as_object(value, &entry_path)?;
            Ok((
                source.clone(),
                RatingStat {
                    votes: field::req_i64(entry, &entry_path, "votes")?,
                    value: field::req_f64(entry, &entry_path, "value")?,
                },
            ))
        })
        .collect()
}

fn providers(root: &Map<String, Value>) -> Result<Vec<WatchProvider>> {
    let items = field::slice_or_empty(root, "", "providers")?;

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let item_path = field::index("providers", i);
            let obj = field::as_object(item, &item_path)?;
            let extra = obj
                .iter()
                .filter(|(key, _)| !matches!(key.as_str(), "id" | "name" | "url"))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect();
            Ok(WatchProvider {
                id: field::req_str(obj, &item_path, "id")?,
                name: field::req_str(obj, &item_path, "name")?,
                url: field::opt_str(obj, &item_path, "url")?,
                extra,
            })
        })
        .collect()
}

fn ops_data(root: &Map<String, Value>) -> Result<OpsData> {
    let now = time::epoch_millis();
    let Some((ops, ops_path)) = field::opt_object(root, "", "ops")? else {
        return Ok(OpsData {
            last_job_at: now,
            last_update_at: now,
            unfound: false,
        });
    };
    Ok(OpsData {
        last_job_at: field::i64_or(ops, &ops_path, "last_job_at", now)?,
        last_update_at: field::i64_or(ops, &ops_path, "last_update_at", now)?,
        unfound: field::bool_or(ops, &ops_path, "unfound", false)?,
    })
}
