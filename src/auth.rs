use axum::http::{header, HeaderMap};

use crate::db::Store;
use crate::error::{AppResult, AuthError};

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE: &str = "session";

/// Extract token from Authorization: Bearer <token> header
pub fn extract_token_from_header(auth_header: &str) -> Option<String> {
  auth_header
    .strip_prefix("Bearer ")
    .map(|t| t.trim().to_string())
    .filter(|t| !t.is_empty())
}

/// Extract the session token from a Cookie header
pub fn extract_token_from_cookies(cookie_header: &str) -> Option<String> {
  cookie_header
    .split(';')
    .filter_map(|pair| pair.trim().split_once('='))
    .find(|(name, _)| *name == SESSION_COOKIE)
    .map(|(_, value)| value.trim().to_string())
    .filter(|t| !t.is_empty())
}

/// Session token from the request, preferring an explicit bearer token over the cookie
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
  let bearer = headers
    .get(header::AUTHORIZATION)
    .and_then(|h| h.to_str().ok())
    .and_then(extract_token_from_header);

  bearer.or_else(|| {
    headers
      .get_all(header::COOKIE)
      .iter()
      .filter_map(|h| h.to_str().ok())
      .find_map(extract_token_from_cookies)
  })
}

/// Generate a random session token
pub fn generate_token() -> String {
  let random_bytes: [u8; 32] = rand::random();
  hex::encode(random_bytes)
}

/// How the session cookie is written
#[derive(Debug, Clone, Copy, Default)]
pub struct CookieSettings {
  pub secure: bool,
}

impl CookieSettings {
  fn attributes(&self) -> &'static str {
    if self.secure {
      "Path=/; HttpOnly; SameSite=Lax; Secure"
    } else {
      "Path=/; HttpOnly; SameSite=Lax"
    }
  }

  /// Set-Cookie value that stores `token`
  pub fn session(&self, token: &str) -> String {
    format!("{}={}; {}", SESSION_COOKIE, token, self.attributes())
  }

  /// Set-Cookie value that removes the session cookie
  pub fn cleared(&self) -> String {
    format!("{}=; {}; Max-Age=0", SESSION_COOKIE, self.attributes())
  }
}

/// The logged-in user behind a request
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
  pub id: i64,
  pub nickname: String,
}

impl AuthUser {
  /// Resolve a session token to its user.
  ///
  /// A missing token, a token with no session, and a session whose user is
  /// gone are reported as distinct [`AuthError`]s.
  pub async fn from_token(store: &Store, token: Option<&str>) -> AppResult<Self> {
    let token = token.ok_or(AuthError::MissingToken)?;

    let session = store
      .session_by_token(token)
      .await?
      .ok_or(AuthError::InvalidSession)?;

    let user = store
      .user_by_id(session.user_id)
      .await?
      .ok_or(AuthError::UnknownUser)?;

    Ok(Self {
      id: user.id,
      nickname: user.nickname,
    })
  }

  pub async fn from_headers(store: &Store, headers: &HeaderMap) -> AppResult<Self> {
    let token = token_from_headers(headers);
    Self::from_token(store, token.as_deref()).await
  }
}
