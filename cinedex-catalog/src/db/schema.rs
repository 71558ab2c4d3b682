//! Idempotent schema creation for the catalog tables

use cinedex_common::Result;
use sqlx::SqlitePool;
use tracing::info;

/// Create all catalog tables and indexes if they do not exist
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    create_movies_table(pool).await?;
    create_actors_table(pool).await?;
    create_directors_table(pool).await?;
    create_polls_table(pool).await?;

    info!("Catalog schema initialized");
    Ok(())
}

/// Movies: serialized document plus promoted query columns
pub async fn create_movies_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS movies (
            guid TEXT PRIMARY KEY,
            ext_id INTEGER NOT NULL UNIQUE,
            title TEXT NOT NULL,
            search TEXT NOT NULL DEFAULT '',
            popularity REAL NOT NULL DEFAULT 0.0,
            released INTEGER NOT NULL DEFAULT 0,
            unfound INTEGER NOT NULL DEFAULT 0,
            last_job_at INTEGER NOT NULL,
            last_update_at INTEGER NOT NULL,
            doc TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_movies_popularity ON movies(popularity)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_movies_released ON movies(released)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Actors keyed by external id
pub async fn create_actors_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS actors (
            guid TEXT PRIMARY KEY,
            ext_id INTEGER NOT NULL UNIQUE,
            name TEXT NOT NULL,
            picture TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_actors_ext_id ON actors(ext_id)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Directors keyed by external id
pub async fn create_directors_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS directors (
            guid TEXT PRIMARY KEY,
            ext_id INTEGER NOT NULL UNIQUE,
            name TEXT NOT NULL,
            picture TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_directors_ext_id ON directors(ext_id)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Polls keyed by external id
pub async fn create_polls_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS polls (
            guid TEXT PRIMARY KEY,
            ext_id INTEGER NOT NULL UNIQUE,
            label TEXT NOT NULL,
            cover TEXT,
            participation_count INTEGER NOT NULL DEFAULT 0,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_polls_participation ON polls(participation_count)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
