//! Playlist endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tunebox_common::{AudioRecord, Playlist};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberRequest {
    pub audio_id: i64,
}

/// GET /playlists
pub async fn list_playlists(State(state): State<AppState>) -> Json<Vec<Playlist>> {
    Json(state.playlists.list_all().await)
}

/// GET /playlists/:name
///
/// Member records in playlist order.
pub async fn get_playlist(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<Vec<AudioRecord>>> {
    let ids = state.playlists.members_of(&name).await?;

    let mut records = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(record) = state.catalog.retrieve_by_id(id).await {
            records.push(record);
        }
    }

    Ok(Json(records))
}

/// POST /playlists/:name
pub async fn create_playlist(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<(StatusCode, Json<Playlist>)> {
    let playlist = state.playlists.create(&name).await?;
    Ok((StatusCode::CREATED, Json(playlist)))
}

/// DELETE /playlists/:name
pub async fn delete_playlist(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<StatusCode> {
    state.playlists.delete(&name).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /playlists/:name/audios
///
/// Body `{"audioId": n}`. Adding a current member leaves the playlist as is.
///
/// The audio record stays pinned until the member is stored, so a
/// concurrent delete either runs first (404 here) or sees the new member
/// and cascades it.
pub async fn add_playlist_member(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(request): Json<AddMemberRequest>,
) -> ApiResult<Json<Playlist>> {
    if state.playlists.get_by_name(&name).await.is_none() {
        return Err(ApiError::NotFound(format!("Playlist '{}' not found", name)));
    }

    let pinned = state.catalog.pin(request.audio_id).await.ok_or_else(|| {
        ApiError::NotFound(format!("Audio with id {} not found", request.audio_id))
    })?;
    state.playlists.add_member(&name, pinned.record().id).await?;
    drop(pinned);

    state
        .playlists
        .get_by_name(&name)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Playlist '{}' not found", name)))
}

/// DELETE /playlists/:name/audios/:id
pub async fn remove_playlist_member(
    State(state): State<AppState>,
    Path((name, audio_id)): Path<(String, i64)>,
) -> ApiResult<StatusCode> {
    state.playlists.remove_member(&name, audio_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
