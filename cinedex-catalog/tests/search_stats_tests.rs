//! Title search and field statistics over a populated catalog

mod helpers;

use cinedex_catalog::{Catalog, CatalogConfig, Error, LinkMode, MovieFilter};
use helpers::{memory_catalog, movie_payload};
use serde_json::json;
use sqlx::sqlite::SqlitePoolOptions;

async fn seeded_catalog() -> Catalog {
    let catalog = memory_catalog(LinkMode::ResolvedId).await;
    for (ext_id, title, wish_count) in [
        (1, "The Matrix", 500),
        (2, "Matrix Reloaded", 300),
        (3, "Alien", 900),
    ] {
        let mut payload = movie_payload(ext_id, title);
        payload["social"]["stats"]["wish_count"] = json!(wish_count);
        catalog.save_movie(&payload).await.unwrap();
    }
    catalog
}

#[tokio::test]
async fn test_search_ranks_closest_title_first() {
    let catalog = seeded_catalog().await;

    let hits = catalog.search_movies("matrix", None).await.unwrap();

    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].title, "The Matrix");
    assert_eq!(hits[1].title, "Matrix Reloaded");
    assert!(hits[0].score < hits[1].score);
}

#[tokio::test]
async fn test_search_matches_are_case_insensitive() {
    let catalog = seeded_catalog().await;

    let hits = catalog.search_movies("MATRIX", None).await.unwrap();
    assert_eq!(hits.len(), 2);

    let exact = catalog.search_movies("The Matrix", None).await.unwrap();
    assert_eq!(exact[0].title, "The Matrix");
    assert_eq!(exact[0].score, 0.0);
}

#[tokio::test]
async fn test_search_empty_query_returns_nothing() {
    let catalog = seeded_catalog().await;
    assert!(catalog.search_movies("", None).await.unwrap().is_empty());
    assert!(catalog.search_movies("   ", None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_search_unmatched_query_returns_empty() {
    let catalog = seeded_catalog().await;
    assert!(catalog.search_movies("zzz", None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_search_limit_caps_candidates() {
    let catalog = seeded_catalog().await;
    let hits = catalog.search_movies("matrix", Some(1)).await.unwrap();
    assert_eq!(hits.len(), 1);
}

#[tokio::test]
async fn test_search_drops_hits_outside_threshold() {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    cinedex_catalog::db::schema::init_schema(&pool).await.unwrap();
    let config = CatalogConfig {
        similarity_threshold: 0.2,
        ..CatalogConfig::default()
    };
    let catalog = Catalog::with_config(pool, &config);

    catalog
        .save_movie(&movie_payload(1, "Matrix Revolutions Extended"))
        .await
        .unwrap();
    catalog.save_movie(&movie_payload(2, "Matrix")).await.unwrap();

    // Both blobs contain "matrix"; only the close title beats the cutoff
    let hits = catalog.search_movies("matrix", None).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].ext_id, 2);
    assert!(hits[0].score <= 0.2);

    // When no candidate qualifies the result is empty, never NaN-scored
    let none = catalog.search_movies("revolutions", None).await.unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_max_value_over_nested_field() {
    let catalog = seeded_catalog().await;
    let max = catalog
        .max_value("social.stats.wish_count", None)
        .await
        .unwrap();
    assert_eq!(max, 900.0);
}

#[tokio::test]
async fn test_max_value_respects_filter() {
    let catalog = memory_catalog(LinkMode::ResolvedId).await;
    for (ext_id, popularity, released) in [(1, 9.0, false), (2, 3.0, true)] {
        let mut payload = movie_payload(ext_id, "Seed");
        payload["popularity"] = json!(popularity);
        payload["released"] = json!(released);
        catalog.save_movie(&payload).await.unwrap();
    }

    let all = catalog.max_value("popularity", None).await.unwrap();
    assert_eq!(all, 9.0);

    let filter = MovieFilter {
        released: Some(true),
        ..MovieFilter::default()
    };
    let released_only = catalog.max_value("popularity", Some(&filter)).await.unwrap();
    assert_eq!(released_only, 3.0);
}

#[tokio::test]
async fn test_max_value_on_empty_catalog_is_zero() {
    let catalog = memory_catalog(LinkMode::ResolvedId).await;
    let max = catalog.max_value("popularity", None).await.unwrap();
    assert_eq!(max, 0.0);
}

#[tokio::test]
async fn test_max_value_absent_field_is_not_found() {
    let catalog = seeded_catalog().await;
    let err = catalog.max_value("social.no_such_field", None).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}
