//! Audio and playlist models

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::Error;

/// Container format of an uploaded payload, serialized as its file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AudioFormat {
    #[serde(rename = ".mp3")]
    Mp3,
    #[serde(rename = ".wav")]
    Wav,
}

impl AudioFormat {
    /// File extension including the leading dot
    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => ".mp3",
            AudioFormat::Wav => ".wav",
        }
    }

    /// Detect the format from an uploaded file name
    ///
    /// Extension matching ignores ASCII case; names without an extension or
    /// with any other extension are rejected.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let ext = Path::new(file_name).extension()?.to_str()?;
        match ext.to_ascii_lowercase().as_str() {
            "mp3" => Some(AudioFormat::Mp3),
            "wav" => Some(AudioFormat::Wav),
            _ => None,
        }
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for AudioFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ".mp3" => Ok(AudioFormat::Mp3),
            ".wav" => Ok(AudioFormat::Wav),
            other => Err(Error::InvalidInput(format!("Unsupported audio format: {}", other))),
        }
    }
}

/// Persisted audio metadata
///
/// Two records are the same record when their ids match. Whether two
/// uploads describe the same song is a separate question answered by
/// [`AudioRecord::same_song`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioRecord {
    pub id: i64,
    pub title: String,
    pub artist: String,
    #[serde(rename = "type")]
    pub format: AudioFormat,
    pub size: i64,
    #[serde(default)]
    pub is_favorite: bool,
}

impl AudioRecord {
    /// Attach a store-assigned id to a new record
    pub fn from_new(id: i64, new: NewAudio) -> Self {
        Self {
            id,
            title: new.title,
            artist: new.artist,
            format: new.format,
            size: new.size,
            is_favorite: new.is_favorite,
        }
    }

    /// Title and artist both match
    pub fn same_song(&self, title: &str, artist: &str) -> bool {
        self.title == title && self.artist == artist
    }

    /// Name of the payload file for this record (`<id><ext>`)
    pub fn payload_file_name(&self) -> String {
        format!("{}{}", self.id, self.format.extension())
    }
}

impl PartialEq for AudioRecord {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for AudioRecord {}

/// Audio metadata that has not been assigned an id yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAudio {
    pub title: String,
    pub artist: String,
    pub format: AudioFormat,
    pub size: i64,
    pub is_favorite: bool,
}

impl NewAudio {
    pub fn new(title: impl Into<String>, artist: impl Into<String>, format: AudioFormat, size: i64) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            format,
            size,
            is_favorite: false,
        }
    }
}

/// Partial update of the mutable audio fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub is_favorite: Option<bool>,
}

impl AudioPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.artist.is_none() && self.is_favorite.is_none()
    }

    /// Apply the supplied fields to `record`
    pub fn apply_to(&self, record: &mut AudioRecord) {
        if let Some(title) = &self.title {
            record.title = title.clone();
        }
        if let Some(artist) = &self.artist {
            record.artist = artist.clone();
        }
        if let Some(fav) = self.is_favorite {
            record.is_favorite = fav;
        }
    }
}

/// Named, ordered collection of audio ids
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub audio_ids: Vec<i64>,
}

impl Playlist {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            audio_ids: Vec::new(),
        }
    }

    pub fn contains(&self, audio_id: i64) -> bool {
        self.audio_ids.contains(&audio_id)
    }
}

impl PartialEq for Playlist {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Playlist {}
