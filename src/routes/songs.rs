use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;

use super::extract::ApiJson;

use crate::{
    auth::AuthUser,
    db::models::Song,
    error::AppResult,
    ranking::{RankedSong, SortMode},
    validate::{SongDraft, GENRE_OPTIONS},
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct ListSongsQuery {
    pub genre: Option<String>,
    pub sort: Option<String>,
}

pub async fn create_song(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(draft): ApiJson<SongDraft>,
) -> AppResult<(StatusCode, Json<Song>)> {
    let user = AuthUser::from_headers(&state.store, &headers).await?;
    let new_song = draft.validate()?;

    let song = state.store.create_song(user.id, &new_song).await?;

    Ok((StatusCode::CREATED, Json(song)))
}

/// Songs with like counts, optionally filtered by genre, newest or most liked first
pub async fn list_songs(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListSongsQuery>,
) -> AppResult<Json<Vec<RankedSong>>> {
    AuthUser::from_headers(&state.store, &headers).await?;

    let sort = SortMode::from_query(query.sort.as_deref());
    let catalog = state.store.catalog().await?;

    Ok(Json(catalog.list(query.genre.as_deref(), sort)))
}

/// Genres that appear on at least one stored song
pub async fn list_genres(State(state): State<AppState>) -> AppResult<Json<Vec<String>>> {
    let catalog = state.store.catalog().await?;
    Ok(Json(catalog.genres()))
}

/// Genres a new song may be filed under
pub async fn genre_options() -> Json<Vec<&'static str>> {
    Json(GENRE_OPTIONS.to_vec())
}
