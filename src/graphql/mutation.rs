use async_graphql::*;
use axum::http::header;

use crate::{
  auth::CookieSettings,
  db::Store,
  validate::{self, SongDraft},
};
use super::context::GraphQLContext;
use super::query::parse_song_id;
use super::types::{AuthPayload, LikeToggle, Song, SongInput};

pub struct MutationRoot;

#[Object]
impl MutationRoot {
  /// Login with a nickname, returns a token for the UI to use
  async fn login(&self, ctx: &Context<'_>, nickname: String) -> Result<AuthPayload> {
    let store = ctx.data::<Store>()?;
    let cookies = ctx.data::<CookieSettings>()?;

    let nickname = validate::nickname(&nickname).map_err(|e| e.extend())?;
    let (user, session) = store.login(&nickname).await.map_err(|e| e.extend())?;

    ctx.append_http_header(header::SET_COOKIE, cookies.session(&session.token));

    Ok(AuthPayload {
      token: session.token,
      user: user.into(),
    })
  }

  /// End the current session
  async fn logout(&self, ctx: &Context<'_>) -> Result<bool> {
    let gql_ctx = ctx.data::<GraphQLContext>()?;
    let store = ctx.data::<Store>()?;
    let cookies = ctx.data::<CookieSettings>()?;

    let removed = match gql_ctx.token.as_deref() {
      Some(token) => store.logout(token).await.map_err(|e| e.extend())?,
      None => false,
    };

    ctx.append_http_header(header::SET_COOKIE, cookies.cleared());
    Ok(removed)
  }

  /// Submit a song
  async fn create_song(&self, ctx: &Context<'_>, input: SongInput) -> Result<Song> {
    let gql_ctx = ctx.data::<GraphQLContext>()?;
    let store = ctx.data::<Store>()?;
    let user = gql_ctx.require_user(store).await?;

    let new_song = SongDraft::from(input).validate().map_err(|e| e.extend())?;
    let song = store
      .create_song(user.id, &new_song)
      .await
      .map_err(|e| e.extend())?;

    Ok(song.into())
  }

  /// Like a song, or unlike it if already liked
  async fn toggle_like(&self, ctx: &Context<'_>, song_id: ID) -> Result<LikeToggle> {
    let gql_ctx = ctx.data::<GraphQLContext>()?;
    let store = ctx.data::<Store>()?;
    let user = gql_ctx.require_user(store).await?;
    let song_id = parse_song_id(&song_id)?;

    let toggle = store
      .toggle_like(user.id, song_id)
      .await
      .map_err(|e| e.extend())?;

    Ok(toggle.into())
  }
}
