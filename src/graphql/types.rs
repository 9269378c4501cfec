use async_graphql::*;
use chrono::{DateTime, Utc};

use crate::ranking::{RankedSong, SortMode};
use crate::validate::SongDraft;

/// GraphQL DateTime scalar
pub type DateTimeScalar = DateTime<Utc>;

/// User type
#[derive(Debug, Clone, SimpleObject)]
pub struct User {
  pub id: ID,
  pub nickname: String,
}

impl From<crate::auth::AuthUser> for User {
  fn from(u: crate::auth::AuthUser) -> Self {
    Self {
      id: ID(u.id.to_string()),
      nickname: u.nickname,
    }
  }
}

impl From<crate::db::models::User> for User {
  fn from(u: crate::db::models::User) -> Self {
    Self {
      id: ID(u.id.to_string()),
      nickname: u.nickname,
    }
  }
}

/// Song with its like count; `score` only on personalized recommendations
#[derive(Debug, Clone, SimpleObject)]
pub struct Song {
  pub id: ID,
  pub title: String,
  pub artist: String,
  pub genre: String,
  pub youtube_url: String,
  pub owner_id: ID,
  pub created_at: DateTimeScalar,
  pub like_count: i64,
  pub score: Option<i64>,
  pub liked_at: Option<DateTimeScalar>,
}

impl From<RankedSong> for Song {
  fn from(s: RankedSong) -> Self {
    Self {
      id: ID(s.id.to_string()),
      title: s.title,
      artist: s.artist,
      genre: s.genre,
      youtube_url: s.youtube_url,
      owner_id: ID(s.owner_id.to_string()),
      created_at: s.created_at,
      like_count: s.like_count,
      score: s.score,
      liked_at: s.liked_at,
    }
  }
}

impl From<crate::db::models::Song> for Song {
  fn from(s: crate::db::models::Song) -> Self {
    RankedSong::new(&s, 0).into()
  }
}

/// Outcome of toggling a like
#[derive(Debug, Clone, SimpleObject)]
pub struct LikeToggle {
  pub liked: bool,
  pub like_count: i64,
}

impl From<crate::db::models::LikeToggle> for LikeToggle {
  fn from(t: crate::db::models::LikeToggle) -> Self {
    Self {
      liked: t.liked,
      like_count: t.like_count,
    }
  }
}

/// Song ordering for listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Enum)]
pub enum SongSort {
  #[default]
  Recent,
  Popular,
}

impl From<SongSort> for SortMode {
  fn from(s: SongSort) -> Self {
    match s {
      SongSort::Recent => SortMode::Recent,
      SongSort::Popular => SortMode::Popular,
    }
  }
}

/// Song submission
#[derive(Debug, Clone, InputObject)]
pub struct SongInput {
  pub title: String,
  pub artist: String,
  pub genre: String,
  pub youtube_url: String,
}

impl From<SongInput> for SongDraft {
  fn from(i: SongInput) -> Self {
    Self {
      title: Some(i.title),
      artist: Some(i.artist),
      genre: Some(i.genre),
      youtube_url: Some(i.youtube_url),
    }
  }
}

/// Auth payload returned from login
#[derive(Debug, Clone, SimpleObject)]
pub struct AuthPayload {
  pub token: String,
  pub user: User,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_large_counts_are_not_truncated() {
    let stored = crate::db::models::Song {
      id: 7,
      title: "Hype Boy".to_string(),
      artist: "NewJeans".to_string(),
      genre: "댄스".to_string(),
      youtube_url: "https://www.youtube.com/watch?v=11cta61wi0g".to_string(),
      owner_id: 1,
      created_at: Utc::now(),
    };
    let big = i64::from(i32::MAX) + 10;
    let ranked = RankedSong {
      score: Some(big + 3),
      ..RankedSong::new(&stored, big)
    };

    let song = Song::from(ranked);
    assert_eq!(song.like_count, big);
    assert_eq!(song.score, Some(big + 3));

    let toggle = LikeToggle::from(crate::db::models::LikeToggle { liked: true, like_count: big });
    assert_eq!(toggle.like_count, big);
  }
}
