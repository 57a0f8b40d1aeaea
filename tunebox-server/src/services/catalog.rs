//! Audio Catalog Service
//!
//! In-memory working set of audio records, seeded from an [`AudioStore`]
//! at startup. Writers hold the write lock across the storage call, so the
//! duplicate check and the insert that follows it cannot interleave with
//! another request.

use std::sync::Arc;
use tokio::sync::{RwLock, RwLockReadGuard};
use tracing::{debug, info, warn};
use tunebox_common::storage::AudioStore;
use tunebox_common::{AudioPatch, AudioRecord, Error, NewAudio, Result};

pub struct AudioCatalog {
    store: Arc<dyn AudioStore>,
    records: RwLock<Vec<AudioRecord>>,
}

/// A record held in the catalog for as long as this guard lives
///
/// Removals and other writers wait until it is dropped.
pub struct PinnedAudio<'a> {
    records: RwLockReadGuard<'a, Vec<AudioRecord>>,
    index: usize,
}

impl PinnedAudio<'_> {
    pub fn record(&self) -> &AudioRecord {
        &self.records[self.index]
    }
}

impl AudioCatalog {
    /// Create an empty catalog; call [`AudioCatalog::initialize`] before use
    pub fn new(store: Arc<dyn AudioStore>) -> Self {
        Self {
            store,
            records: RwLock::new(Vec::new()),
        }
    }

    /// Load the full catalog from the store
    pub async fn initialize(&self) -> Result<()> {
        let loaded = self.store.load_all().await?;
        let favorites = loaded.iter().filter(|r| r.is_favorite).count();
        info!("Audio catalog loaded: {} records ({} favorites)", loaded.len(), favorites);

        *self.records.write().await = loaded;
        Ok(())
    }

    /// Discard the in-memory list and re-read it from the store
    pub async fn reload(&self) -> Result<()> {
        let mut records = self.records.write().await;
        *records = self.store.load_all().await?;
        debug!("Audio catalog reloaded: {} records", records.len());
        Ok(())
    }

    /// Every record in insertion order
    pub async fn list(&self) -> Vec<AudioRecord> {
        self.records.read().await.clone()
    }

    /// Records flagged as favorite, in catalog order
    pub async fn favorites(&self) -> Vec<AudioRecord> {
        self.records
            .read()
            .await
            .iter()
            .filter(|r| r.is_favorite)
            .cloned()
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Add a new record
    ///
    /// Returns `None` without touching the store when a record with the same
    /// title and artist already exists.
    pub async fn add(&self, audio: NewAudio) -> Result<Option<AudioRecord>> {
        let mut records = self.records.write().await;

        if records.iter().any(|r| r.same_song(&audio.title, &audio.artist)) {
            warn!("Rejected duplicate audio '{}' by '{}'", audio.title, audio.artist);
            return Ok(None);
        }

        let id = self.store.insert(&audio).await?;
        let record = AudioRecord::from_new(id, audio);
        records.push(record.clone());

        info!("Audio added with ID: {}, Title: {}, Artist: {}", record.id, record.title, record.artist);
        Ok(Some(record))
    }

    /// Remove a record by id
    ///
    /// Returns the removed record, or `None` if the id was not in the catalog.
    pub async fn remove(&self, id: i64) -> Result<Option<AudioRecord>> {
        let mut records = self.records.write().await;

        let Some(index) = records.iter().position(|r| r.id == id) else {
            return Ok(None);
        };

        self.store.delete(id).await?;
        let removed = records.remove(index);

        info!("Audio removed: {} ('{}')", removed.id, removed.title);
        Ok(Some(removed))
    }

    pub async fn retrieve_by_id(&self, id: i64) -> Option<AudioRecord> {
        self.records.read().await.iter().find(|r| r.id == id).cloned()
    }

    /// Look up a record and keep it from being removed while the guard lives
    pub async fn pin(&self, id: i64) -> Option<PinnedAudio<'_>> {
        let records = self.records.read().await;
        let index = records.iter().position(|r| r.id == id)?;
        Some(PinnedAudio { records, index })
    }

    /// Persist the mutable fields of an existing record
    ///
    /// The format is fixed at upload; a record carrying another one is
    /// rejected.
    pub async fn save(&self, record: &AudioRecord) -> Result<()> {
        let mut records = self.records.write().await;

        let slot = records
            .iter_mut()
            .find(|r| r.id == record.id)
            .ok_or_else(|| Error::NotFound(format!("Audio with id {} not found", record.id)))?;

        if slot.format != record.format {
            return Err(Error::InvalidInput(format!(
                "Audio {} is {} and cannot become {}",
                record.id, slot.format, record.format
            )));
        }

        self.store.update(record).await?;
        *slot = record.clone();
        Ok(())
    }

    /// Apply a partial update and persist it
    ///
    /// An empty patch is rejected, as is a blank title or artist. Both are
    /// trimmed like upload fields. Renaming onto the title and artist of
    /// another record is a conflict.
    pub async fn update(&self, id: i64, patch: &AudioPatch) -> Result<AudioRecord> {
        if patch.is_empty() {
            return Err(Error::InvalidInput(format!(
                "Audio with id {} should have a field to be modified",
                id
            )));
        }

        let patch = AudioPatch {
            title: trimmed_field("Title", patch.title.as_deref())?,
            artist: trimmed_field("Artist", patch.artist.as_deref())?,
            is_favorite: patch.is_favorite,
        };

        let mut records = self.records.write().await;

        let index = records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| Error::NotFound(format!("Audio with id {} not found", id)))?;

        let mut updated = records[index].clone();
        patch.apply_to(&mut updated);

        if records
            .iter()
            .any(|r| r.id != id && r.same_song(&updated.title, &updated.artist))
        {
            return Err(Error::Conflict(format!(
                "'{}' by '{}' already exists",
                updated.title, updated.artist
            )));
        }

        self.store.update(&updated).await?;
        records[index] = updated.clone();

        debug!("Audio {} updated", id);
        Ok(updated)
    }

    /// Write the whole in-memory catalog back to the store
    pub async fn persist_all(&self) -> Result<()> {
        let records = self.records.read().await;
        self.store.save_all(&records).await
    }
}

fn trimmed_field(label: &str, value: Option<&str>) -> Result<Option<String>> {
    match value.map(str::trim) {
        Some("") => Err(Error::InvalidInput(format!("{} must not be blank", label))),
        other => Ok(other.map(str::to_string)),
    }
}
