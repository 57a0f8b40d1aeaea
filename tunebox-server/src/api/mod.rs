//! HTTP API handlers for tunebox-server

pub mod audios;
pub mod health;
pub mod playlists;

pub use audios::{delete_audio, get_audio_file, list_audios, list_favorites, update_audio, upload_audio};
pub use health::health_routes;
pub use playlists::{
    add_playlist_member, create_playlist, delete_playlist, get_playlist, list_playlists,
    remove_playlist_member,
};
