//! Storage Adapter contract and its implementations
//!
//! Services depend on [`AudioStore`] and [`PlaylistStore`] only. Two
//! interchangeable backends exist:
//! - [`json`]: whole-document JSON files in the root folder
//! - [`sqlite`]: rows in the `audio`, `playlist` and `playlist_audio` tables

use crate::{AudioRecord, NewAudio, Playlist, Result};
use async_trait::async_trait;

pub mod json;
pub mod sqlite;

pub use json::{JsonAudioStore, JsonPlaylistStore};
pub use sqlite::{SqliteAudioStore, SqlitePlaylistStore};

/// Persistence of audio metadata records
#[async_trait]
pub trait AudioStore: Send + Sync {
    /// Read the entire catalog in id order
    ///
    /// Returns an empty list if nothing was ever written.
    async fn load_all(&self) -> Result<Vec<AudioRecord>>;

    /// Read the records flagged as favorite
    async fn load_favorites(&self) -> Result<Vec<AudioRecord>>;

    /// Overwrite or upsert the entire catalog
    async fn save_all(&self, records: &[AudioRecord]) -> Result<()>;

    /// Persist a brand-new record and return the id the store assigned
    ///
    /// The only operation that mints ids.
    async fn insert(&self, audio: &NewAudio) -> Result<i64>;

    /// Persist field mutations of an existing record
    ///
    /// Fails with [`crate::Error::NotFound`] if the id is unknown.
    async fn update(&self, record: &AudioRecord) -> Result<()>;

    /// Remove a record by id (no-op if absent)
    async fn delete(&self, id: i64) -> Result<()>;
}

/// Persistence of playlists and their ordered membership
#[async_trait]
pub trait PlaylistStore: Send + Sync {
    /// Read every playlist with members ordered by position
    async fn load_all(&self) -> Result<Vec<Playlist>>;

    /// Create an empty playlist
    ///
    /// Fails with [`crate::Error::Conflict`] if the name is taken.
    async fn create(&self, name: &str) -> Result<Playlist>;

    /// Delete a playlist and its membership; false if it did not exist
    async fn delete(&self, name: &str) -> Result<bool>;

    /// Append `audio_id` after the current last position
    ///
    /// Returns false if the id already is a member.
    async fn add_member(&self, playlist_id: i64, audio_id: i64) -> Result<bool>;

    /// Remove `audio_id` from the playlist; false if it was not a member
    async fn remove_member(&self, playlist_id: i64, audio_id: i64) -> Result<bool>;

    /// Member ids ordered by position ascending
    async fn members_of(&self, playlist_id: i64) -> Result<Vec<i64>>;
}
