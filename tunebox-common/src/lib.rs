//! # Tunebox Common Library
//!
//! Shared code for the Tunebox service crates including:
//! - Audio and playlist models
//! - Storage adapters (JSON documents, SQLite tables)
//! - Database initialization
//! - Configuration and root folder resolution

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod storage;

pub use error::{Error, Result};
pub use models::{AudioFormat, AudioPatch, AudioRecord, NewAudio, Playlist};
