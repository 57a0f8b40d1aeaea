//! Domain services shared by the HTTP handlers

pub mod catalog;
pub mod media;
pub mod playlists;

pub use catalog::AudioCatalog;
pub use media::MediaStore;
pub use playlists::PlaylistManager;
