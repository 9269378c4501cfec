use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct User {
  pub id: i64,
  pub nickname: String,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Session {
  pub id: i64,
  pub user_id: i64,
  pub token: String,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Song {
  pub id: i64,
  pub title: String,
  pub artist: String,
  pub genre: String,
  pub youtube_url: String,
  pub owner_id: i64,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Like {
  pub id: i64,
  pub user_id: i64,
  pub song_id: i64,
  pub created_at: DateTime<Utc>,
}

/// Song fields that passed validation, ready to insert
#[derive(Debug, Clone, PartialEq)]
pub struct NewSong {
  pub title: String,
  pub artist: String,
  pub genre: String,
  pub youtube_url: String,
}

/// Result of flipping a like
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LikeToggle {
  pub liked: bool,
  pub like_count: i64,
}
