//! Audio endpoints: upload, list, payload download, update, delete

use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use tracing::{error, info, warn};
use tunebox_common::{AudioFormat, AudioPatch, AudioRecord, NewAudio};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Content type sent for every payload regardless of its extension
pub const PAYLOAD_CONTENT_TYPE: &str = "audio/mpeg";

/// Fields collected from an upload form
#[derive(Debug, Default)]
struct UploadForm {
    file_name: Option<String>,
    bytes: Option<Vec<u8>>,
    title: Option<String>,
    artist: Option<String>,
}

impl UploadForm {
    async fn read(mut multipart: Multipart) -> ApiResult<Self> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or("").to_string();
            match name.as_str() {
                "audioFile" => {
                    form.file_name = field.file_name().map(str::to_string);
                    let data = field.bytes().await?;
                    form.bytes = Some(data.to_vec());
                }
                "title" | "artist" => {
                    let value = field.text().await?.trim().to_string();
                    if name == "title" {
                        form.title = Some(value);
                    } else {
                        form.artist = Some(value);
                    }
                }
                _ => {}
            }
        }

        Ok(form)
    }

    /// Check the form and split it into the record to mint and its payload
    fn validate(self) -> ApiResult<(NewAudio, Vec<u8>)> {
        let bytes = match self.bytes {
            Some(bytes) if !bytes.is_empty() => bytes,
            Some(_) => return Err(ApiError::BadRequest("Uploaded file is empty".to_string())),
            None => return Err(ApiError::BadRequest("No file uploaded".to_string())),
        };

        let title = self
            .title
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::BadRequest("Title is required".to_string()))?;
        let artist = self
            .artist
            .filter(|a| !a.is_empty())
            .ok_or_else(|| ApiError::BadRequest("Artist is required".to_string()))?;

        let file_name = self.file_name.unwrap_or_default();
        let format = AudioFormat::from_file_name(&file_name).ok_or_else(|| {
            ApiError::BadRequest(format!(
                "Unsupported file type '{}': only .mp3 and .wav are accepted",
                file_name
            ))
        })?;

        let size = bytes.len() as i64;
        Ok((NewAudio::new(title, artist, format, size), bytes))
    }
}

/// GET /audios
pub async fn list_audios(State(state): State<AppState>) -> Json<Vec<AudioRecord>> {
    Json(state.catalog.list().await)
}

/// GET /favorites
pub async fn list_favorites(State(state): State<AppState>) -> Json<Vec<AudioRecord>> {
    Json(state.catalog.favorites().await)
}

/// GET /audios/:id (and /audios/:id/file)
///
/// Streams the stored payload. A record whose payload is missing or empty
/// is reported as not found.
pub async fn get_audio_file(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let record = state
        .catalog
        .retrieve_by_id(id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Audio with id {} not found", id)))?;

    let bytes = state
        .media
        .read(record.id, record.format)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("File for audio {} not found", id)))?;

    Ok((
        [
            (header::CONTENT_TYPE, PAYLOAD_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"{}\"", record.payload_file_name()),
            ),
        ],
        bytes,
    ))
}

/// POST /api/User/audios (and /audios)
///
/// Multipart form with `audioFile`, `title` and `artist`.
pub async fn upload_audio(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let (new_audio, bytes) = UploadForm::read(multipart).await?.validate().map_err(|e| {
        warn!("Upload rejected: {}", e);
        e
    })?;

    let title = new_audio.title.clone();
    let artist = new_audio.artist.clone();
    let record = state.catalog.add(new_audio).await?.ok_or_else(|| {
        ApiError::Conflict(format!("'{}' by '{}' already exists", title, artist))
    })?;

    if let Err(e) = state.media.write(record.id, record.format, &bytes).await {
        error!("Failed to store payload for audio {}: {}", record.id, e);
        state.catalog.remove(record.id).await?;
        return Err(e.into());
    }

    info!("Uploaded {} ({} bytes)", record.payload_file_name(), record.size);

    let location = format!("/audios/{}", record.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(record)))
}

/// PUT /audios/:id (and /api/User/audios/:id)
pub async fn update_audio(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<AudioPatch>,
) -> ApiResult<Json<AudioRecord>> {
    let record = state.catalog.update(id, &patch).await?;
    Ok(Json(record))
}

/// DELETE /audios/:id (and /api/User/audios/:id)
///
/// Also drops the payload and every playlist membership of the record.
pub async fn delete_audio(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let record = state
        .catalog
        .remove(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Audio with id {} not found", id)))?;

    for name in state.playlists.containing(id).await {
        state.playlists.remove_member(&name, id).await?;
    }

    if let Err(e) = state.media.remove(record.id, record.format).await {
        warn!("Audio {} deleted but its payload could not be removed: {}", id, e);
    }

    Ok(StatusCode::NO_CONTENT)
}
