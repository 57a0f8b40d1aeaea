//! JSON document backend
//!
//! Each store owns one document holding a JSON array. Every mutating call
//! rewrites the whole document: it is written to a sibling `.tmp` file and
//! renamed over the original, so readers never see a half-written file.
//! A per-store async mutex serializes read-modify-write cycles.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::{AudioStore, PlaylistStore};
use crate::{AudioRecord, Error, NewAudio, Playlist, Result};

/// Read a JSON array document; a missing or blank file is an empty list
async fn read_document<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    Ok(serde_json::from_slice(&bytes)?)
}

/// Replace a JSON array document
async fn write_document<T: Serialize>(path: &Path, items: &[T]) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let json = serde_json::to_vec_pretty(items)?;
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, json).await?;
    tokio::fs::rename(&tmp, path).await?;

    debug!("Wrote {} entries to {}", items.len(), path.display());
    Ok(())
}

/// Next id strictly above both the counter and every id on disk
fn next_free_id(counter: i64, max_on_disk: Option<i64>) -> i64 {
    counter.max(max_on_disk.map_or(1, |max| max + 1))
}

/// Audio metadata kept in `audio_metadata.json`
pub struct JsonAudioStore {
    path: PathBuf,
    /// Next id to hand out; only grows while the store is open
    ///
    /// Reseeded from the largest id on disk at open, so the id of a deleted
    /// newest record can be handed out again after a restart.
    next_id: Mutex<i64>,
}

impl JsonAudioStore {
    /// Open the document at `path`, seeding the id counter from its contents
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let records: Vec<AudioRecord> = read_document(&path).await?;
        let next_id = next_free_id(1, records.iter().map(|r| r.id).max());

        info!(
            "Opened audio metadata document {} ({} records)",
            path.display(),
            records.len()
        );

        Ok(Self {
            path,
            next_id: Mutex::new(next_id),
        })
    }
}

#[async_trait]
impl AudioStore for JsonAudioStore {
    async fn load_all(&self) -> Result<Vec<AudioRecord>> {
        let _guard = self.next_id.lock().await;
        read_document(&self.path).await
    }

    async fn load_favorites(&self) -> Result<Vec<AudioRecord>> {
        let records = self.load_all().await?;
        Ok(records.into_iter().filter(|r| r.is_favorite).collect())
    }

    async fn save_all(&self, records: &[AudioRecord]) -> Result<()> {
        let mut next_id = self.next_id.lock().await;
        write_document(&self.path, records).await?;
        *next_id = next_free_id(*next_id, records.iter().map(|r| r.id).max());
        Ok(())
    }

    async fn insert(&self, audio: &NewAudio) -> Result<i64> {
        let mut next_id = self.next_id.lock().await;
        let mut records: Vec<AudioRecord> = read_document(&self.path).await?;

        let id = next_free_id(*next_id, records.iter().map(|r| r.id).max());
        records.push(AudioRecord::from_new(id, audio.clone()));
        write_document(&self.path, &records).await?;

        *next_id = id + 1;
        Ok(id)
    }

    async fn update(&self, record: &AudioRecord) -> Result<()> {
        let _guard = self.next_id.lock().await;
        let mut records: Vec<AudioRecord> = read_document(&self.path).await?;

        let existing = records
            .iter_mut()
            .find(|r| r.id == record.id)
            .ok_or_else(|| Error::NotFound(format!("Audio with id {}", record.id)))?;
        *existing = record.clone();

        write_document(&self.path, &records).await
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let _guard = self.next_id.lock().await;
        let mut records: Vec<AudioRecord> = read_document(&self.path).await?;

        let before = records.len();
        records.retain(|r| r.id != id);
        if records.len() == before {
            return Ok(());
        }

        write_document(&self.path, &records).await
    }
}

/// Playlists kept in `playlists.json`
///
/// Member order inside each `audioIds` array is the position order.
pub struct JsonPlaylistStore {
    path: PathBuf,
    next_id: Mutex<i64>,
}

impl JsonPlaylistStore {
    /// Open the document at `path`, seeding the id counter from its contents
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let playlists: Vec<Playlist> = read_document(&path).await?;
        let next_id = next_free_id(1, playlists.iter().map(|p| p.id).max());

        info!(
            "Opened playlist document {} ({} playlists)",
            path.display(),
            playlists.len()
        );

        Ok(Self {
            path,
            next_id: Mutex::new(next_id),
        })
    }

    /// Run `f` against the playlist with `playlist_id` and persist if it
    /// reports a change
    async fn modify_members<F>(&self, playlist_id: i64, f: F) -> Result<bool>
    where
        F: FnOnce(&mut Vec<i64>) -> bool + Send,
    {
        let _guard = self.next_id.lock().await;
        let mut playlists: Vec<Playlist> = read_document(&self.path).await?;

        let playlist = playlists
            .iter_mut()
            .find(|p| p.id == playlist_id)
            .ok_or_else(|| Error::NotFound(format!("Playlist with id {}", playlist_id)))?;

        let changed = f(&mut playlist.audio_ids);
        if changed {
            write_document(&self.path, &playlists).await?;
        }
        Ok(changed)
    }
}

#[async_trait]
impl PlaylistStore for JsonPlaylistStore {
    async fn load_all(&self) -> Result<Vec<Playlist>> {
        let _guard = self.next_id.lock().await;
        read_document(&self.path).await
    }

    async fn create(&self, name: &str) -> Result<Playlist> {
        let mut next_id = self.next_id.lock().await;
        let mut playlists: Vec<Playlist> = read_document(&self.path).await?;

        if playlists.iter().any(|p| p.name == name) {
            return Err(Error::Conflict(format!("Playlist '{}' already exists", name)));
        }

        let id = next_free_id(*next_id, playlists.iter().map(|p| p.id).max());
        let playlist = Playlist::new(id, name);
        playlists.push(playlist.clone());
        write_document(&self.path, &playlists).await?;

        *next_id = id + 1;
        Ok(playlist)
    }

    async fn delete(&self, name: &str) -> Result<bool> {
        let _guard = self.next_id.lock().await;
        let mut playlists: Vec<Playlist> = read_document(&self.path).await?;

        let before = playlists.len();
        playlists.retain(|p| p.name != name);
        if playlists.len() == before {
            return Ok(false);
        }

        write_document(&self.path, &playlists).await?;
        Ok(true)
    }

    async fn add_member(&self, playlist_id: i64, audio_id: i64) -> Result<bool> {
        self.modify_members(playlist_id, |ids| {
            if ids.contains(&audio_id) {
                false
            } else {
                ids.push(audio_id);
                true
            }
        })
        .await
    }

    async fn remove_member(&self, playlist_id: i64, audio_id: i64) -> Result<bool> {
        self.modify_members(playlist_id, |ids| {
            let before = ids.len();
            ids.retain(|id| *id != audio_id);
            ids.len() != before
        })
        .await
    }

    async fn members_of(&self, playlist_id: i64) -> Result<Vec<i64>> {
        let playlists = self.load_all().await?;
        playlists
            .into_iter()
            .find(|p| p.id == playlist_id)
            .map(|p| p.audio_ids)
            .ok_or_else(|| Error::NotFound(format!("Playlist with id {}", playlist_id)))
    }
}
