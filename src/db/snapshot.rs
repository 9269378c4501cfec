use std::path::Path;

use serde::{Deserialize, Serialize};

use super::models::{Like, Session, Song, User};
use super::Store;
use crate::error::{AppError, AppResult};

/// The whole board as one JSON document with four named collections.
///
/// This is the layout the board used before it moved to SQLite. Timestamps
/// are RFC 3339 strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
  #[serde(default)]
  pub users: Vec<User>,
  #[serde(default)]
  pub sessions: Vec<Session>,
  #[serde(default)]
  pub songs: Vec<Song>,
  #[serde(default)]
  pub likes: Vec<Like>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
  pub users: usize,
  pub sessions: usize,
  pub songs: usize,
  pub likes: usize,
}

impl Snapshot {
  pub fn from_json(raw: &str) -> AppResult<Self> {
    serde_json::from_str(raw).map_err(|e| AppError::Import(format!("invalid document: {}", e)))
  }

  pub async fn load(path: &Path) -> AppResult<Self> {
    let raw = tokio::fs::read_to_string(path)
      .await
      .map_err(|e| AppError::Import(format!("cannot read {}: {}", path.display(), e)))?;
    Self::from_json(&raw)
  }
}

impl Store {
  /// Copies a snapshot into the database, keeping its ids.
  ///
  /// Only runs against a database without users; returns `None` otherwise.
  /// Everything is written in one transaction, so a bad record leaves the
  /// database untouched.
  pub async fn import_snapshot(&self, snapshot: &Snapshot) -> AppResult<Option<ImportSummary>> {
    let _guard = self.writer.lock().await;

    // the writer lock keeps the count valid until the transaction commits
    let existing = self.user_count().await?;
    if existing > 0 {
      tracing::warn!(existing, "Database already has users, skipping import");
      return Ok(None);
    }

    let mut tx = self.pool.begin().await?;

    for user in &snapshot.users {
      sqlx::query("INSERT INTO users (id, nickname, created_at) VALUES (?, ?, ?)")
        .bind(user.id)
        .bind(user.nickname.trim())
        .bind(user.created_at)
        .execute(&mut *tx)
        .await?;
    }

    for session in &snapshot.sessions {
      sqlx::query("INSERT INTO sessions (id, user_id, token, created_at) VALUES (?, ?, ?, ?)")
        .bind(session.id)
        .bind(session.user_id)
        .bind(&session.token)
        .bind(session.created_at)
        .execute(&mut *tx)
        .await?;
    }

    for song in &snapshot.songs {
      sqlx::query(
        r#"
        INSERT INTO songs (id, title, artist, genre, youtube_url, owner_id, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
      )
      .bind(song.id)
      .bind(&song.title)
      .bind(&song.artist)
      .bind(&song.genre)
      .bind(&song.youtube_url)
      .bind(song.owner_id)
      .bind(song.created_at)
      .execute(&mut *tx)
      .await?;
    }

    for like in &snapshot.likes {
      sqlx::query("INSERT INTO likes (id, user_id, song_id, created_at) VALUES (?, ?, ?, ?)")
        .bind(like.id)
        .bind(like.user_id)
        .bind(like.song_id)
        .bind(like.created_at)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    let summary = ImportSummary {
      users: snapshot.users.len(),
      sessions: snapshot.sessions.len(),
      songs: snapshot.songs.len(),
      likes: snapshot.likes.len(),
    };
    tracing::info!(
      users = summary.users,
      sessions = summary.sessions,
      songs = summary.songs,
      likes = summary.likes,
      "Imported snapshot"
    );
    Ok(Some(summary))
  }

  pub async fn import_file(&self, path: &Path) -> AppResult<Option<ImportSummary>> {
    let snapshot = Snapshot::load(path).await?;
    self.import_snapshot(&snapshot).await
  }
}
