//! Unit tests for database initialization
//!
//! Tests cover:
//! - Automatic database creation with default schema
//! - Re-opening an existing database
//! - Foreign keys enabled on pooled connections

use tempfile::TempDir;
use tunebox_common::db::init::{init_database, SCHEMA_VERSION};

#[tokio::test]
async fn test_database_creation_when_missing() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("data").join("tunebox.db");

    let result = init_database(&db_path).await;

    assert!(result.is_ok(), "Database initialization failed: {:?}", result.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_database_opens_existing() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("tunebox.db");

    let pool1 = init_database(&db_path).await.unwrap();
    sqlx::query("INSERT INTO playlist (name) VALUES ('Chill')")
        .execute(&pool1)
        .await
        .unwrap();
    pool1.close().await;

    let pool2 = init_database(&db_path).await;
    assert!(pool2.is_ok(), "Failed to open existing database: {:?}", pool2.as_ref().err());

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM playlist")
        .fetch_one(&pool2.unwrap())
        .await
        .unwrap();
    assert_eq!(count, 1, "Existing rows must survive re-initialization");
}

#[tokio::test]
async fn test_all_tables_created() {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("tunebox.db")).await.unwrap();

    for table in ["schema_version", "audio", "playlist", "playlist_audio"] {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?)",
        )
        .bind(table)
        .fetch_one(&pool)
        .await
        .unwrap();

        assert!(exists, "Table {} was not created", table);
    }

    let version: i64 = sqlx::query_scalar("SELECT MAX(version) FROM schema_version")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(version, SCHEMA_VERSION);
}

#[tokio::test]
async fn test_foreign_keys_enforced() {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("tunebox.db")).await.unwrap();

    let result = sqlx::query("INSERT INTO playlist_audio (playlist_id, audio_id, position) VALUES (1, 1, 1)")
        .execute(&pool)
        .await;

    assert!(result.is_err(), "Membership without parent rows must be rejected");
}

#[tokio::test]
async fn test_audio_format_check_constraint() {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("tunebox.db")).await.unwrap();

    let result = sqlx::query(
        "INSERT INTO audio (title, artist, audio_format, audio_size) VALUES ('a', 'b', '.ogg', 1)",
    )
    .execute(&pool)
    .await;

    assert!(result.is_err(), "Unsupported format must be rejected by the schema");
}
