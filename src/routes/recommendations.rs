use axum::{extract::State, http::HeaderMap, Json};
use chrono::Utc;

use crate::{auth::AuthUser, error::AppResult, ranking::RankedSong, AppState};

/// Handler for recommendations endpoint
pub async fn recommendations(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<Vec<RankedSong>>> {
    let user = AuthUser::from_headers(&state.store, &headers).await?;
    let catalog = state.store.catalog().await?;

    let songs = catalog.recommend(user.id, Utc::now());
    tracing::info!(user_id = user.id, count = songs.len(), "Built recommendations");

    Ok(Json(songs))
}
