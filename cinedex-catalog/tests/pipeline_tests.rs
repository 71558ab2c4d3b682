//! End-to-end tests for the save/load pipeline
//!
//! Each test runs the full path: raw payload in, normalization, entity
//! upserts, reference rewrite, movie upsert, and back out through the
//! expanded and document reads.

mod helpers;

use cinedex_catalog::models::EntityRef;
use cinedex_catalog::{Error, LinkMode};
use helpers::{memory_catalog, movie_payload};
use serde_json::json;

async fn count(catalog: &cinedex_catalog::Catalog, table: &str) -> i64 {
    let row: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(catalog.pool())
        .await
        .unwrap();
    row.0
}

#[tokio::test]
async fn test_save_then_get_round_trips_entities() {
    let catalog = memory_catalog(LinkMode::ResolvedId).await;

    catalog
        .save_movie(&movie_payload(4821, "La Spirale"))
        .await
        .unwrap();

    let movie = catalog.get_movie(4821).await.unwrap().unwrap();
    assert_eq!(movie.id, 4821);
    assert_eq!(movie.social.title, "La Spirale");

    assert_eq!(movie.social.actors.len(), 1);
    assert_eq!(movie.social.actors[0].actor.id, 901);
    assert_eq!(movie.social.actors[0].actor.name, "Ana Reyes");
    assert_eq!(movie.social.actors[0].role.as_deref(), Some("Lead"));

    assert_eq!(movie.social.directors.len(), 1);
    assert_eq!(movie.social.directors[0].name, "Nora Vale");

    assert_eq!(movie.social.polls.len(), 1);
    assert_eq!(movie.social.polls[0].label, "Best of 2021");
    assert_eq!(movie.social.polls[0].participation_count, 12042);
}

#[tokio::test]
async fn test_save_twice_is_idempotent() {
    let catalog = memory_catalog(LinkMode::ResolvedId).await;
    let payload = movie_payload(4821, "La Spirale");

    let first = catalog.save_movie(&payload).await.unwrap();
    let second = catalog.save_movie(&payload).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(count(&catalog, "movies").await, 1);
    assert_eq!(count(&catalog, "actors").await, 1);
    assert_eq!(count(&catalog, "directors").await, 1);
    assert_eq!(count(&catalog, "polls").await, 1);
}

#[tokio::test]
async fn test_natural_key_mode_stores_external_ids() {
    let catalog = memory_catalog(LinkMode::NaturalKey).await;
    catalog
        .save_movie(&movie_payload(4821, "La Spirale"))
        .await
        .unwrap();

    let doc = catalog.get_movie_document(4821).await.unwrap().unwrap();
    assert_eq!(doc.social.actors[0].actor, EntityRef::External(901));
    assert_eq!(doc.social.directors[0], EntityRef::External(777));
    assert_eq!(doc.social.polls[0], EntityRef::External(31));

    // On the wire the reference is a plain number.
    let value = serde_json::to_value(&doc).unwrap();
    assert_eq!(value["social"]["directors"][0], json!(777));
}

#[tokio::test]
async fn test_resolved_mode_stores_guids() {
    let catalog = memory_catalog(LinkMode::ResolvedId).await;
    catalog
        .save_movie(&movie_payload(4821, "La Spirale"))
        .await
        .unwrap();

    let doc = catalog.get_movie_document(4821).await.unwrap().unwrap();
    let EntityRef::Stored(guid) = doc.social.actors[0].actor else {
        panic!("expected a stored reference, got {:?}", doc.social.actors[0].actor);
    };

    let stored = cinedex_catalog::db::actors::get_actor(catalog.pool(), 901)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(guid, stored.guid);

    // On the wire the reference is the guid string.
    let value = serde_json::to_value(&doc).unwrap();
    assert_eq!(value["social"]["actors"][0]["actor"], json!(guid.to_string()));
}

#[tokio::test]
async fn test_expanded_read_works_in_both_link_modes() {
    for mode in [LinkMode::ResolvedId, LinkMode::NaturalKey] {
        let catalog = memory_catalog(mode).await;
        catalog
            .save_movie(&movie_payload(4821, "La Spirale"))
            .await
            .unwrap();

        let movie = catalog.get_movie(4821).await.unwrap().unwrap();
        assert_eq!(movie.social.actors[0].actor.name, "Ana Reyes");
        assert_eq!(movie.social.directors[0].id, 777);
    }
}

#[tokio::test]
async fn test_shared_entities_converge_last_write_wins() {
    let catalog = memory_catalog(LinkMode::ResolvedId).await;
    catalog.save_movie(&movie_payload(1, "First")).await.unwrap();

    let mut second = movie_payload(2, "Second");
    second["social"]["actors"][0]["name"] = json!("Ana R. Reyes");
    catalog.save_movie(&second).await.unwrap();

    assert_eq!(count(&catalog, "actors").await, 1);

    // The shared row took the later name, visible through both movies.
    let first = catalog.get_movie(1).await.unwrap().unwrap();
    assert_eq!(first.social.actors[0].actor.name, "Ana R. Reyes");
}

#[tokio::test]
async fn test_rejected_payload_writes_nothing() {
    let catalog = memory_catalog(LinkMode::ResolvedId).await;

    let mut bad = movie_payload(3, "Broken");
    bad["social"].as_object_mut().unwrap().remove("stats");

    let err = catalog.save_movie(&bad).await.unwrap_err();
    assert!(matches!(err, Error::Validation { .. }));
    assert_eq!(err.to_string(), "Invalid payload at `social.stats`: expected object");

    assert_eq!(count(&catalog, "movies").await, 0);
    assert_eq!(count(&catalog, "actors").await, 0);
}

#[tokio::test]
async fn test_cast_entry_without_contact_is_dropped() {
    let catalog = memory_catalog(LinkMode::ResolvedId).await;

    let mut payload = movie_payload(4, "Ghosted");
    payload["social"]["actors"] = json!([
        { "name": "Keeps", "contact": { "picture": "https://img.example/k.jpg", "id": 55 } },
        { "name": "Ghost Credit", "role": "Cameo", "contact": null }
    ]);
    catalog.save_movie(&payload).await.unwrap();

    let movie = catalog.get_movie(4).await.unwrap().unwrap();
    assert_eq!(movie.social.actors.len(), 1);
    assert_eq!(movie.social.actors[0].actor.id, 55);
    assert_eq!(count(&catalog, "actors").await, 1);
}

#[tokio::test]
async fn test_director_without_contact_is_rejected() {
    let catalog = memory_catalog(LinkMode::ResolvedId).await;

    let mut payload = movie_payload(5, "No Contact");
    payload["social"]["directors"] = json!([{ "name": "Napless" }]);

    let err = catalog.save_movie(&payload).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid payload at `social.directors[0].contact`: expected object"
    );
}

#[tokio::test]
async fn test_search_blob_generated_when_payload_omits_it() {
    let catalog = memory_catalog(LinkMode::ResolvedId).await;
    catalog.save_movie(&movie_payload(6, "Alien")).await.unwrap();

    let doc = catalog.get_movie_document(6).await.unwrap().unwrap();
    assert_eq!(doc.search, "alien ali alie alien");
}

#[tokio::test]
async fn test_search_blob_covers_original_title() {
    let catalog = memory_catalog(LinkMode::ResolvedId).await;

    let mut payload = movie_payload(7, "The Spiral");
    payload["social"]["original_title"] = json!("La Spirale");
    catalog.save_movie(&payload).await.unwrap();

    let doc = catalog.get_movie_document(7).await.unwrap().unwrap();
    assert!(doc.search.contains("spiral"));
    assert!(doc.search.contains("spirale"));
}

#[tokio::test]
async fn test_payload_supplied_search_is_kept() {
    let catalog = memory_catalog(LinkMode::ResolvedId).await;

    let mut payload = movie_payload(8, "Custom");
    payload["search"] = json!("custom blob");
    catalog.save_movie(&payload).await.unwrap();

    let doc = catalog.get_movie_document(8).await.unwrap().unwrap();
    assert_eq!(doc.search, "custom blob");
}

#[tokio::test]
async fn test_resave_overwrites_document() {
    let catalog = memory_catalog(LinkMode::ResolvedId).await;
    catalog.save_movie(&movie_payload(9, "Before")).await.unwrap();

    let mut after = movie_payload(9, "After");
    after["released"] = json!(true);
    after["popularity"] = json!(8.25);
    catalog.save_movie(&after).await.unwrap();

    let movie = catalog.get_movie(9).await.unwrap().unwrap();
    assert_eq!(movie.social.title, "After");
    assert!(movie.released);
    assert_eq!(movie.popularity, 8.25);
    assert_eq!(count(&catalog, "movies").await, 1);
}

#[tokio::test]
async fn test_provider_extras_survive_storage() {
    let catalog = memory_catalog(LinkMode::ResolvedId).await;

    let mut payload = movie_payload(10, "Providers");
    payload["providers"] = json!([
        { "id": "svc-1", "name": "StreamCo", "url": "https://streamco.example/m/10", "rank": 3 }
    ]);
    catalog.save_movie(&payload).await.unwrap();

    let doc = catalog.get_movie_document(10).await.unwrap().unwrap();
    assert_eq!(doc.providers.len(), 1);
    assert_eq!(doc.providers[0].name, "StreamCo");
    assert_eq!(doc.providers[0].extra.get("rank"), Some(&json!(3)));
}

#[tokio::test]
async fn test_get_missing_movie_is_none() {
    let catalog = memory_catalog(LinkMode::ResolvedId).await;
    assert!(catalog.get_movie(404).await.unwrap().is_none());
    assert!(catalog.get_movie_document(404).await.unwrap().is_none());
}
