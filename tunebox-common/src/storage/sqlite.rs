//! SQLite backend
//!
//! Tables are created by [`crate::db::init_database`]. Statement-level
//! atomicity covers single-row changes; multi-row changes run inside a
//! transaction.

use async_trait::async_trait;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::debug;

use super::{AudioStore, PlaylistStore};
use crate::{AudioRecord, Error, NewAudio, Playlist, Result};

fn audio_from_row(row: &SqliteRow) -> Result<AudioRecord> {
    let format: String = row.try_get("audio_format")?;

    Ok(AudioRecord {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        artist: row.try_get("artist")?,
        format: format.parse()?,
        size: row.try_get("audio_size")?,
        is_favorite: row.try_get("is_favorite")?,
    })
}

/// Audio metadata kept in the `audio` table
#[derive(Clone)]
pub struct SqliteAudioStore {
    pool: SqlitePool,
}

impl SqliteAudioStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AudioStore for SqliteAudioStore {
    async fn load_all(&self) -> Result<Vec<AudioRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, artist, audio_format, audio_size, is_favorite
            FROM audio
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(audio_from_row).collect()
    }

    async fn load_favorites(&self) -> Result<Vec<AudioRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, artist, audio_format, audio_size, is_favorite
            FROM audio
            WHERE is_favorite = 1
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(audio_from_row).collect()
    }

    async fn save_all(&self, records: &[AudioRecord]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for record in records {
            sqlx::query(
                r#"
                INSERT INTO audio (id, title, artist, audio_format, audio_size, is_favorite)
                VALUES (?, ?, ?, ?, ?, ?)
                ON CONFLICT(id) DO UPDATE SET
                    title = excluded.title,
                    artist = excluded.artist,
                    audio_format = excluded.audio_format,
                    audio_size = excluded.audio_size,
                    is_favorite = excluded.is_favorite
                "#,
            )
            .bind(record.id)
            .bind(&record.title)
            .bind(&record.artist)
            .bind(record.format.extension())
            .bind(record.size)
            .bind(record.is_favorite)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        debug!("Upserted {} audio rows", records.len());
        Ok(())
    }

    async fn insert(&self, audio: &NewAudio) -> Result<i64> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO audio (title, artist, audio_format, audio_size, is_favorite)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&audio.title)
        .bind(&audio.artist)
        .bind(audio.format.extension())
        .bind(audio.size)
        .bind(audio.is_favorite)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn update(&self, record: &AudioRecord) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE audio
            SET title = ?,
                artist = ?,
                audio_format = ?,
                audio_size = ?,
                is_favorite = ?
            WHERE id = ?
            "#,
        )
        .bind(&record.title)
        .bind(&record.artist)
        .bind(record.format.extension())
        .bind(record.size)
        .bind(record.is_favorite)
        .bind(record.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Audio with id {}", record.id)));
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM audio WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

/// Playlists kept in the `playlist` and `playlist_audio` tables
#[derive(Clone)]
pub struct SqlitePlaylistStore {
    pool: SqlitePool,
}

impl SqlitePlaylistStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlaylistStore for SqlitePlaylistStore {
    async fn load_all(&self) -> Result<Vec<Playlist>> {
        let rows = sqlx::query("SELECT id, name FROM playlist ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        let mut playlists = Vec::with_capacity(rows.len());
        for row in rows {
            let mut playlist = Playlist::new(row.try_get("id")?, row.try_get::<String, _>("name")?);
            playlist.audio_ids = self.members_of(playlist.id).await?;
            playlists.push(playlist);
        }

        Ok(playlists)
    }

    async fn create(&self, name: &str) -> Result<Playlist> {
        // A taken name leaves the row untouched and returns nothing
        let id: Option<i64> = sqlx::query_scalar(
            "INSERT INTO playlist (name) VALUES (?) ON CONFLICT(name) DO NOTHING RETURNING id",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        match id {
            Some(id) => Ok(Playlist::new(id, name)),
            None => Err(Error::Conflict(format!("Playlist '{}' already exists", name))),
        }
    }

    async fn delete(&self, name: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM playlist WHERE name = ?")
            .bind(name)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn add_member(&self, playlist_id: i64, audio_id: i64) -> Result<bool> {
        // Position is computed and inserted in one statement so concurrent
        // writers cannot pick the same position
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO playlist_audio (playlist_id, audio_id, position)
            SELECT ?, ?, COALESCE(MAX(position), 0) + 1
            FROM playlist_audio
            WHERE playlist_id = ?
            "#,
        )
        .bind(playlist_id)
        .bind(audio_id)
        .bind(playlist_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn remove_member(&self, playlist_id: i64, audio_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM playlist_audio WHERE playlist_id = ? AND audio_id = ?")
            .bind(playlist_id)
            .bind(audio_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn members_of(&self, playlist_id: i64) -> Result<Vec<i64>> {
        let ids: Vec<i64> = sqlx::query_scalar(
            "SELECT audio_id FROM playlist_audio WHERE playlist_id = ? ORDER BY position ASC",
        )
        .bind(playlist_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }
}
