use async_graphql::*;
use chrono::Utc;

use crate::{
  auth::AuthUser,
  db::Store,
  error::AppError,
  validate::GENRE_OPTIONS,
};
use super::context::GraphQLContext;
use super::types::{Song, SongSort, User};

pub(super) fn parse_song_id(id: &ID) -> Result<i64> {
  id.parse()
    .map_err(|_| AppError::validation("Invalid song ID").extend())
}

pub struct QueryRoot;

#[Object]
impl QueryRoot {
  /// Get the currently authenticated user, or null without a valid session
  async fn me(&self, ctx: &Context<'_>) -> Result<Option<User>> {
    let gql_ctx = ctx.data::<GraphQLContext>()?;
    let store = ctx.data::<Store>()?;

    match AuthUser::from_token(store, gql_ctx.token.as_deref()).await {
      Ok(user) => Ok(Some(user.into())),
      Err(AppError::Auth(_)) => Ok(None),
      Err(e) => Err(e.extend()),
    }
  }

  /// List songs, optionally for one genre
  async fn songs(
    &self,
    ctx: &Context<'_>,
    genre: Option<String>,
    #[graphql(default)] sort: SongSort,
  ) -> Result<Vec<Song>> {
    let gql_ctx = ctx.data::<GraphQLContext>()?;
    let store = ctx.data::<Store>()?;
    gql_ctx.require_user(store).await?;

    let catalog = store.catalog().await.map_err(|e| e.extend())?;
    Ok(catalog
      .list(genre.as_deref(), sort.into())
      .into_iter()
      .map(Song::from)
      .collect())
  }

  /// Personalized recommendations for the authenticated user
  async fn recommendations(&self, ctx: &Context<'_>) -> Result<Vec<Song>> {
    let gql_ctx = ctx.data::<GraphQLContext>()?;
    let store = ctx.data::<Store>()?;
    let user = gql_ctx.require_user(store).await?;

    let catalog = store.catalog().await.map_err(|e| e.extend())?;
    Ok(catalog
      .recommend(user.id, Utc::now())
      .into_iter()
      .map(Song::from)
      .collect())
  }

  /// Songs the authenticated user likes, most recently liked first
  async fn my_likes(&self, ctx: &Context<'_>) -> Result<Vec<Song>> {
    let gql_ctx = ctx.data::<GraphQLContext>()?;
    let store = ctx.data::<Store>()?;
    let user = gql_ctx.require_user(store).await?;

    let catalog = store.catalog().await.map_err(|e| e.extend())?;
    Ok(catalog.liked_by(user.id).into_iter().map(Song::from).collect())
  }

  /// Whether the authenticated user likes a song
  async fn like_status(&self, ctx: &Context<'_>, song_id: ID) -> Result<bool> {
    let gql_ctx = ctx.data::<GraphQLContext>()?;
    let store = ctx.data::<Store>()?;
    let user = gql_ctx.require_user(store).await?;
    let song_id = parse_song_id(&song_id)?;

    store.is_liked(user.id, song_id).await.map_err(|e| e.extend())
  }

  /// Genres used by stored songs
  async fn genres(&self, ctx: &Context<'_>) -> Result<Vec<String>> {
    let store = ctx.data::<Store>()?;
    let catalog = store.catalog().await.map_err(|e| e.extend())?;
    Ok(catalog.genres())
  }

  /// Genres accepted for new songs
  async fn genre_options(&self) -> Vec<String> {
    GENRE_OPTIONS.iter().map(|g| g.to_string()).collect()
  }
}
