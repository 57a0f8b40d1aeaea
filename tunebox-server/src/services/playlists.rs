//! Playlist Manager
//!
//! Named, ordered collections of audio ids. The manager knows nothing about
//! audio deletions: callers cascade them through [`PlaylistManager::containing`]
//! and [`PlaylistManager::remove_member`].

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use tunebox_common::storage::PlaylistStore;
use tunebox_common::{Error, Playlist, Result};

pub struct PlaylistManager {
    store: Arc<dyn PlaylistStore>,
    playlists: RwLock<Vec<Playlist>>,
}

fn not_found(name: &str) -> Error {
    Error::NotFound(format!("Playlist '{}' not found", name))
}

impl PlaylistManager {
    pub fn new(store: Arc<dyn PlaylistStore>) -> Self {
        Self {
            store,
            playlists: RwLock::new(Vec::new()),
        }
    }

    /// Populate the in-memory set from the store
    pub async fn initialize(&self) -> Result<()> {
        self.load_all().await?;
        info!("Playlists loaded: {}", self.playlists.read().await.len());
        Ok(())
    }

    /// Replace the in-memory set with the store contents, returning them
    pub async fn load_all(&self) -> Result<Vec<Playlist>> {
        let mut playlists = self.playlists.write().await;
        *playlists = self.store.load_all().await?;
        Ok(playlists.clone())
    }

    pub async fn list_all(&self) -> Vec<Playlist> {
        self.playlists.read().await.clone()
    }

    pub async fn get_by_name(&self, name: &str) -> Option<Playlist> {
        self.playlists
            .read()
            .await
            .iter()
            .find(|p| p.name == name)
            .cloned()
    }

    /// Create an empty playlist
    ///
    /// Names are case-sensitive and must not be blank.
    pub async fn create(&self, name: &str) -> Result<Playlist> {
        if name.trim().is_empty() {
            return Err(Error::InvalidInput("Playlist name is required".to_string()));
        }

        let mut playlists = self.playlists.write().await;
        if playlists.iter().any(|p| p.name == name) {
            return Err(Error::Conflict(format!("Playlist '{}' already exists", name)));
        }

        let playlist = self.store.create(name).await?;
        playlists.push(playlist.clone());

        info!("Playlist created: '{}' (id {})", playlist.name, playlist.id);
        Ok(playlist)
    }

    pub async fn delete(&self, name: &str) -> Result<()> {
        let mut playlists = self.playlists.write().await;
        let index = playlists
            .iter()
            .position(|p| p.name == name)
            .ok_or_else(|| not_found(name))?;

        self.store.delete(name).await?;
        playlists.remove(index);

        info!("Playlist deleted: '{}'", name);
        Ok(())
    }

    /// Append `audio_id` to the playlist
    ///
    /// Returns false if it already was a member.
    pub async fn add_member(&self, name: &str, audio_id: i64) -> Result<bool> {
        let mut playlists = self.playlists.write().await;
        let playlist = playlists
            .iter_mut()
            .find(|p| p.name == name)
            .ok_or_else(|| not_found(name))?;

        if playlist.contains(audio_id) {
            debug!("Audio {} already in playlist '{}'", audio_id, name);
            return Ok(false);
        }

        self.store.add_member(playlist.id, audio_id).await?;
        playlist.audio_ids.push(audio_id);

        info!("Audio {} added to playlist '{}'", audio_id, name);
        Ok(true)
    }

    /// Remove `audio_id` from the playlist
    ///
    /// Returns false if it was not a member.
    pub async fn remove_member(&self, name: &str, audio_id: i64) -> Result<bool> {
        let mut playlists = self.playlists.write().await;
        let playlist = playlists
            .iter_mut()
            .find(|p| p.name == name)
            .ok_or_else(|| not_found(name))?;

        if !playlist.contains(audio_id) {
            return Ok(false);
        }

        self.store.remove_member(playlist.id, audio_id).await?;
        playlist.audio_ids.retain(|id| *id != audio_id);

        info!("Audio {} removed from playlist '{}'", audio_id, name);
        Ok(true)
    }

    /// Member ids in position order
    pub async fn members_of(&self, name: &str) -> Result<Vec<i64>> {
        self.get_by_name(name)
            .await
            .map(|p| p.audio_ids)
            .ok_or_else(|| not_found(name))
    }

    /// Names of the playlists that hold `audio_id`
    pub async fn containing(&self, audio_id: i64) -> Vec<String> {
        self.playlists
            .read()
            .await
            .iter()
            .filter(|p| p.contains(audio_id))
            .map(|p| p.name.clone())
            .collect()
    }
}
