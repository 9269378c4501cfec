use axum::{
    extract::State,
    http::HeaderMap,
    Json,
};
use serde::Serialize;

use super::extract::SongId;

use crate::{
    auth::AuthUser,
    db::models::LikeToggle,
    error::{AppError, AppResult},
    ranking::RankedSong,
    AppState,
};

#[derive(Debug, Serialize)]
pub struct LikeStatus {
    pub liked: bool,
}

pub async fn toggle_like(
    State(state): State<AppState>,
    headers: HeaderMap,
    SongId(song_id): SongId,
) -> AppResult<Json<LikeToggle>> {
    let user = AuthUser::from_headers(&state.store, &headers).await?;
    let toggle = state.store.toggle_like(user.id, song_id).await?;
    Ok(Json(toggle))
}

/// Whether the current user likes the song. Unknown songs are simply not liked.
pub async fn like_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    song_id: Result<SongId, AppError>,
) -> AppResult<Json<LikeStatus>> {
    let user = AuthUser::from_headers(&state.store, &headers).await?;
    let liked = match song_id {
        Ok(SongId(song_id)) => state.store.is_liked(user.id, song_id).await?,
        Err(_) => false,
    };
    Ok(Json(LikeStatus { liked }))
}

pub async fn my_likes(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<Vec<RankedSong>>> {
    let user = AuthUser::from_headers(&state.store, &headers).await?;
    let catalog = state.store.catalog().await?;
    Ok(Json(catalog.liked_by(user.id)))
}
