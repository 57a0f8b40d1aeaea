//! tunebox-server library - audio library and playlist service
//!
//! Uploaded audio files are catalogued with their metadata and can be
//! favorited and grouped into named playlists. Metadata lives in JSON
//! documents or a SQLite database, selected at startup.

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post, put};
use axum::Router;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tunebox_common::config::{RootLayout, StorageBackend};
use tunebox_common::db::init_database;
use tunebox_common::storage::{
    AudioStore, JsonAudioStore, JsonPlaylistStore, PlaylistStore, SqliteAudioStore,
    SqlitePlaylistStore,
};

pub mod api;
pub mod config;
pub mod error;
pub mod services;

use config::DEFAULT_MAX_UPLOAD_BYTES;
use services::{AudioCatalog, MediaStore, PlaylistManager};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<AudioCatalog>,
    pub playlists: Arc<PlaylistManager>,
    pub media: Arc<MediaStore>,
}

impl AppState {
    pub fn new(catalog: AudioCatalog, playlists: PlaylistManager, media: MediaStore) -> Self {
        Self {
            catalog: Arc::new(catalog),
            playlists: Arc::new(playlists),
            media: Arc::new(media),
        }
    }

    /// Open the stores for `backend` under `layout` and load their contents
    pub async fn open(layout: &RootLayout, backend: StorageBackend) -> tunebox_common::Result<Self> {
        let (audio_store, playlist_store) = open_stores(layout, backend).await?;

        let state = Self::new(
            AudioCatalog::new(audio_store),
            PlaylistManager::new(playlist_store),
            MediaStore::new(layout.uploads_dir()),
        );
        state.catalog.initialize().await?;
        state.playlists.initialize().await?;
        state.prune_dangling_members().await?;

        Ok(state)
    }

    /// Drop playlist entries that point at audio no longer in the catalog
    pub async fn prune_dangling_members(&self) -> tunebox_common::Result<usize> {
        let mut pruned = 0;
        for playlist in self.playlists.list_all().await {
            for audio_id in playlist.audio_ids {
                if self.catalog.retrieve_by_id(audio_id).await.is_none() {
                    warn!(
                        "Playlist '{}' referenced missing audio {}, removing",
                        playlist.name, audio_id
                    );
                    self.playlists.remove_member(&playlist.name, audio_id).await?;
                    pruned += 1;
                }
            }
        }
        Ok(pruned)
    }
}

/// Construct the storage adapter pair for the configured backend
pub async fn open_stores(
    layout: &RootLayout,
    backend: StorageBackend,
) -> tunebox_common::Result<(Arc<dyn AudioStore>, Arc<dyn PlaylistStore>)> {
    match backend {
        StorageBackend::Json => {
            info!("Using JSON storage in {}", layout.root().display());
            let audio: Arc<dyn AudioStore> =
                Arc::new(JsonAudioStore::open(layout.audio_metadata_path()).await?);
            let playlists: Arc<dyn PlaylistStore> =
                Arc::new(JsonPlaylistStore::open(layout.playlists_path()).await?);
            Ok((audio, playlists))
        }
        StorageBackend::Sqlite => {
            let db_path = layout.database_path();
            info!("Using SQLite storage at {}", db_path.display());
            let pool = init_database(&db_path).await?;
            let audio: Arc<dyn AudioStore> = Arc::new(SqliteAudioStore::new(pool.clone()));
            let playlists: Arc<dyn PlaylistStore> = Arc::new(SqlitePlaylistStore::new(pool));
            Ok((audio, playlists))
        }
    }
}

/// Router settings independent of the handlers' state
#[derive(Debug, Clone)]
pub struct RouterOptions {
    pub max_upload_bytes: usize,
    /// Built front end; unmatched GETs fall back to its `index.html`
    pub static_dir: Option<PathBuf>,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            static_dir: None,
        }
    }
}

/// Build application router with default options
pub fn build_router(state: AppState) -> Router {
    build_router_with(state, &RouterOptions::default())
}

/// Build application router
pub fn build_router_with(state: AppState, options: &RouterOptions) -> Router {
    let audio_routes = Router::new()
        .route("/audios", get(api::list_audios).post(api::upload_audio))
        .route(
            "/audios/:id",
            get(api::get_audio_file)
                .put(api::update_audio)
                .delete(api::delete_audio),
        )
        .route("/audios/:id/file", get(api::get_audio_file))
        .route("/api/User/audios", post(api::upload_audio))
        .route(
            "/api/User/audios/:id",
            put(api::update_audio).delete(api::delete_audio),
        )
        .route("/favorites", get(api::list_favorites));

    let playlist_routes = Router::new()
        .route("/playlists", get(api::list_playlists))
        .route(
            "/playlists/:name",
            get(api::get_playlist)
                .post(api::create_playlist)
                .delete(api::delete_playlist),
        )
        .route("/playlists/:name/audios", post(api::add_playlist_member))
        .route(
            "/playlists/:name/audios/:id",
            delete(api::remove_playlist_member),
        );

    let mut app = Router::new()
        .merge(audio_routes)
        .merge(playlist_routes)
        .merge(api::health_routes())
        .with_state(state);

    if let Some(dir) = &options.static_dir {
        info!("Serving front end from {}", dir.display());
        let index = ServeFile::new(dir.join("index.html"));
        app = app.fallback_service(ServeDir::new(dir).fallback(index));
    }

    app.layer(DefaultBodyLimit::max(options.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
