use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::IntoResponse,
    Json,
};

use super::extract::ApiJson;
use serde::{Deserialize, Serialize};

use crate::{
    auth::{token_from_headers, AuthUser},
    error::AppResult,
    validate, AppState,
};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub nickname: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub id: i64,
    pub nickname: String,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub nickname: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Log in by nickname, creating the user on first use
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    let nickname = validate::nickname(req.nickname.as_deref().unwrap_or_default())?;
    let (user, session) = state.store.login(&nickname).await?;

    let cookie = state.cookies.session(&session.token);
    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(LoginResponse {
            id: user.id,
            nickname: user.nickname,
            token: session.token,
        }),
    ))
}

/// End the current session. Succeeds even without one.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    if let Some(token) = token_from_headers(&headers) {
        state.store.logout(&token).await?;
    }

    Ok((
        [(header::SET_COOKIE, state.cookies.cleared())],
        Json(MessageResponse {
            message: "Logged out".to_string(),
        }),
    ))
}

pub async fn me(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<UserResponse>> {
    let user = AuthUser::from_headers(&state.store, &headers).await?;

    Ok(Json(UserResponse {
        id: user.id,
        nickname: user.nickname,
    }))
}
