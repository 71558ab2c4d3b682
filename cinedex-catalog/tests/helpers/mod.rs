//! Shared helpers for catalog integration tests

use cinedex_catalog::{Catalog, LinkMode};
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;

/// Catalog over a fresh in-memory database
///
/// Not every integration binary uses every helper.
#[allow(dead_code)]
pub async fn memory_catalog(mode: LinkMode) -> Catalog {
    // Single connection so every query sees the same in-memory database.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("connect in-memory database");
    cinedex_catalog::db::schema::init_schema(&pool)
        .await
        .expect("initialize schema");
    Catalog::new(pool, mode)
}

/// One valid merged payload in the upstream wire shape
///
/// Embeds one actor (901), one director (777) and one poll (31), so
/// movies built from this base share their entity rows.
pub fn movie_payload(ext_id: i64, title: &str) -> Value {
    json!({
        "id": ext_id,
        "social": {
            "actors": [
                {
                    "name": "Ana Reyes",
                    "role": "Lead",
                    "contact": { "picture": "https://img.example/ana.jpg", "id": 901 }
                }
            ],
            "category": "Film",
            "countries": [ { "name": "France" } ],
            "date_release": "2021-05-12",
            "date_release_original": null,
            "directors": [
                {
                    "name": "Nora Vale",
                    "contact": { "picture": "https://img.example/nora.jpg", "id": 777 }
                }
            ],
            "duration": 7260,
            "genres": [ { "label": "Drama" } ],
            "id": ext_id,
            "local_release_date": null,
            "medias": { "videos": [] },
            "original_title": null,
            "pictures": { "backdrops": [], "posters": [], "screenshots": [] },
            "polls": [
                {
                    "poll": {
                        "id": 31,
                        "cover": null,
                        "label": "Best of 2021",
                        "participation_count": 12042
                    }
                }
            ],
            "rating": 7.4,
            "slug": "example",
            "stats": {
                "rating_count": 100,
                "recommend_count": 10,
                "review_count": 5,
                "wish_count": 50
            },
            "synopsis": "A test movie.",
            "title": title,
            "year_of_production": 2021
        },
        "released": false
    })
}
