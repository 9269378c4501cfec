pub mod models;
pub mod snapshot;

use std::sync::Arc;

use chrono::Utc;
use sqlx::{
  migrate::MigrateDatabase,
  sqlite::{SqlitePool, SqlitePoolOptions},
  Sqlite,
};
use tokio::sync::Mutex;

use crate::auth::generate_token;
use crate::error::{AppError, AppResult};
use crate::ranking::Catalog;
use models::{Like, LikeToggle, NewSong, Session, Song, User};

pub type DbPool = SqlitePool;

fn is_in_memory(database_url: &str) -> bool {
  database_url.contains(":memory:") || database_url.contains("mode=memory")
}

pub async fn create_pool(database_url: &str) -> AppResult<DbPool> {
  let pool = if is_in_memory(database_url) {
    // every connection to :memory: is its own database, so keep exactly one alive
    SqlitePoolOptions::new()
      .max_connections(1)
      .idle_timeout(None)
      .max_lifetime(None)
      .connect(database_url)
      .await?
  } else {
    if !Sqlite::database_exists(database_url).await.unwrap_or(false) {
      tracing::info!("Creating database: {}", database_url);
      Sqlite::create_database(database_url).await?;
    }
    SqlitePool::connect(database_url).await?
  };

  tracing::info!("Running migrations...");
  sqlx::migrate!("./migrations")
    .run(&pool)
    .await?;

  tracing::info!("Database ready");
  Ok(pool)
}

/// Shared handle to the board's data.
///
/// Reads go straight to the pool. Writes are serialized through one async
/// mutex and each runs in a single transaction, so id assignment and the
/// one-like-per-pair rule hold under concurrent requests. A write has been
/// committed by the time its method returns.
#[derive(Clone)]
pub struct Store {
  pool: DbPool,
  writer: Arc<Mutex<()>>,
}

impl Store {
  pub fn new(pool: DbPool) -> Self {
    Self {
      pool,
      writer: Arc::new(Mutex::new(())),
    }
  }

  pub async fn connect(database_url: &str) -> AppResult<Self> {
    Ok(Self::new(create_pool(database_url).await?))
  }

  pub async fn in_memory() -> AppResult<Self> {
    Self::connect("sqlite::memory:").await
  }

  /// Finds or creates the user with this nickname and opens a new session.
  ///
  /// `nickname` must already be trimmed and non-empty.
  pub async fn login(&self, nickname: &str) -> AppResult<(User, Session)> {
    let _guard = self.writer.lock().await;
    let mut tx = self.pool.begin().await?;
    let now = Utc::now();

    let existing = sqlx::query_as::<_, User>(
      "SELECT id, nickname, created_at FROM users WHERE nickname = ?",
    )
    .bind(nickname)
    .fetch_optional(&mut *tx)
    .await?;

    let user = match existing {
      Some(user) => user,
      None => {
        let user = sqlx::query_as::<_, User>(
          r#"
          INSERT INTO users (nickname, created_at)
          VALUES (?, ?)
          RETURNING id, nickname, created_at
          "#,
        )
        .bind(nickname)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;
        tracing::info!(user_id = user.id, nickname = %user.nickname, "Created user");
        user
      }
    };

    let session = sqlx::query_as::<_, Session>(
      r#"
      INSERT INTO sessions (user_id, token, created_at)
      VALUES (?, ?, ?)
      RETURNING id, user_id, token, created_at
      "#,
    )
    .bind(user.id)
    .bind(generate_token())
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    tracing::info!(user_id = user.id, session_id = session.id, "Opened session");

    Ok((user, session))
  }

  /// Drops the session with this token. Returns whether one existed.
  pub async fn logout(&self, token: &str) -> AppResult<bool> {
    let _guard = self.writer.lock().await;
    let result = sqlx::query("DELETE FROM sessions WHERE token = ?")
      .bind(token)
      .execute(&self.pool)
      .await?;

    let removed = result.rows_affected() > 0;
    if removed {
      tracing::info!("Closed session");
    }
    Ok(removed)
  }

  pub async fn session_by_token(&self, token: &str) -> AppResult<Option<Session>> {
    let session = sqlx::query_as::<_, Session>(
      "SELECT id, user_id, token, created_at FROM sessions WHERE token = ?",
    )
    .bind(token)
    .fetch_optional(&self.pool)
    .await?;
    Ok(session)
  }

  pub async fn user_by_id(&self, user_id: i64) -> AppResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(
      "SELECT id, nickname, created_at FROM users WHERE id = ?",
    )
    .bind(user_id)
    .fetch_optional(&self.pool)
    .await?;
    Ok(user)
  }

  pub async fn user_count(&self) -> AppResult<i64> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
      .fetch_one(&self.pool)
      .await?;
    Ok(count)
  }

  pub async fn create_song(&self, owner_id: i64, song: &NewSong) -> AppResult<Song> {
    let _guard = self.writer.lock().await;
    let song = sqlx::query_as::<_, Song>(
      r#"
      INSERT INTO songs (title, artist, genre, youtube_url, owner_id, created_at)
      VALUES (?, ?, ?, ?, ?, ?)
      RETURNING id, title, artist, genre, youtube_url, owner_id, created_at
      "#,
    )
    .bind(&song.title)
    .bind(&song.artist)
    .bind(&song.genre)
    .bind(&song.youtube_url)
    .bind(owner_id)
    .bind(Utc::now())
    .fetch_one(&self.pool)
    .await?;

    tracing::info!(song_id = song.id, owner_id, genre = %song.genre, "Created song");
    Ok(song)
  }

  pub async fn song_by_id(&self, song_id: i64) -> AppResult<Option<Song>> {
    let song = sqlx::query_as::<_, Song>(
      r#"
      SELECT id, title, artist, genre, youtube_url, owner_id, created_at
      FROM songs
      WHERE id = ?
      "#,
    )
    .bind(song_id)
    .fetch_optional(&self.pool)
    .await?;
    Ok(song)
  }

  /// Likes the song if `user_id` has not liked it yet, unlikes it otherwise.
  pub async fn toggle_like(&self, user_id: i64, song_id: i64) -> AppResult<LikeToggle> {
    let _guard = self.writer.lock().await;
    let mut tx = self.pool.begin().await?;

    let song_exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM songs WHERE id = ?")
      .bind(song_id)
      .fetch_optional(&mut *tx)
      .await?;
    if song_exists.is_none() {
      return Err(AppError::song_not_found(song_id));
    }

    let removed = sqlx::query("DELETE FROM likes WHERE user_id = ? AND song_id = ?")
      .bind(user_id)
      .bind(song_id)
      .execute(&mut *tx)
      .await?
      .rows_affected();

    let liked = if removed == 0 {
      sqlx::query("INSERT INTO likes (user_id, song_id, created_at) VALUES (?, ?, ?)")
        .bind(user_id)
        .bind(song_id)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;
      true
    } else {
      false
    };

    let (like_count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM likes WHERE song_id = ?")
      .bind(song_id)
      .fetch_one(&mut *tx)
      .await?;

    tx.commit().await?;
    tracing::info!(user_id, song_id, liked, like_count, "Toggled like");

    Ok(LikeToggle { liked, like_count })
  }

  pub async fn is_liked(&self, user_id: i64, song_id: i64) -> AppResult<bool> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM likes WHERE user_id = ? AND song_id = ?")
      .bind(user_id)
      .bind(song_id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(row.is_some())
  }

  /// Every song and like, in id order, ready for ranking.
  pub async fn catalog(&self) -> AppResult<Catalog> {
    let songs = sqlx::query_as::<_, Song>(
      r#"
      SELECT id, title, artist, genre, youtube_url, owner_id, created_at
      FROM songs
      ORDER BY id
      "#,
    )
    .fetch_all(&self.pool)
    .await?;

    let likes = sqlx::query_as::<_, Like>(
      "SELECT id, user_id, song_id, created_at FROM likes ORDER BY id",
    )
    .fetch_all(&self.pool)
    .await?;

    Ok(Catalog::new(songs, likes))
  }
}
