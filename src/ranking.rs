//! Ordering and scoring of songs.
//!
//! Everything here is pure: a [`Catalog`] is a snapshot of songs and likes
//! taken from the store, and every listing is computed from it on read.
//! Like counts are never persisted.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::models::{Like, Song};

/// Maximum number of songs in a recommendation list
pub const RECOMMENDATION_LIMIT: usize = 20;
/// How many of the user's favourite genres earn the genre bonus
pub const TOP_GENRE_COUNT: usize = 2;
pub const GENRE_MATCH_BONUS: i64 = 3;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    #[default]
    Recent,
    Popular,
}

impl SortMode {
    /// Anything other than `popular` falls back to newest-first.
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some("popular") => SortMode::Popular,
            _ => SortMode::Recent,
        }
    }
}

/// A song as handed to clients, with its computed like count.
///
/// `score` is only present on personalized recommendations and `liked_at`
/// only on a user's own like list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedSong {
    pub id: i64,
    pub title: String,
    pub artist: String,
    pub genre: String,
    pub youtube_url: String,
    pub owner_id: i64,
    pub created_at: DateTime<Utc>,
    pub like_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub liked_at: Option<DateTime<Utc>>,
}

impl RankedSong {
    pub fn new(song: &Song, like_count: i64) -> Self {
        Self {
            id: song.id,
            title: song.title.clone(),
            artist: song.artist.clone(),
            genre: song.genre.clone(),
            youtube_url: song.youtube_url.clone(),
            owner_id: song.owner_id,
            created_at: song.created_at,
            like_count,
            score: None,
            liked_at: None,
        }
    }
}

/// Most likes first, newer songs first among equals.
pub fn popular_order(a: &RankedSong, b: &RankedSong) -> Ordering {
    b.like_count
        .cmp(&a.like_count)
        .then_with(|| b.created_at.cmp(&a.created_at))
}

/// Newest first.
pub fn recent_order(a: &RankedSong, b: &RankedSong) -> Ordering {
    b.created_at.cmp(&a.created_at)
}

/// Bonus for fresh songs: 2 under three days old, 1 under a week, else 0.
pub fn recency_bonus(created_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let age_days = (now - created_at).num_milliseconds() as f64 / MILLIS_PER_DAY;
    if age_days < 3.0 {
        2
    } else if age_days < 7.0 {
        1
    } else {
        0
    }
}

/// Genres ordered by how often they occur, most frequent first.
///
/// Genres with equal counts keep the order in which they were first seen.
pub fn top_genres<'a>(songs: impl IntoIterator<Item = &'a Song>, limit: usize) -> Vec<&'a str> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for song in songs {
        match counts.iter_mut().find(|(genre, _)| *genre == song.genre) {
            Some((_, count)) => *count += 1,
            None => counts.push((song.genre.as_str(), 1)),
        }
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.into_iter().take(limit).map(|(genre, _)| genre).collect()
}

/// Snapshot of every song and like, indexed for ranking
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    songs: Vec<Song>,
    likes: Vec<Like>,
    like_counts: HashMap<i64, i64>,
}

impl Catalog {
    /// `songs` and `likes` are expected in insertion (id) order; that order
    /// settles ties wherever the ranking leaves them open.
    pub fn new(songs: Vec<Song>, likes: Vec<Like>) -> Self {
        let mut like_counts = HashMap::new();
        for like in &likes {
            *like_counts.entry(like.song_id).or_insert(0) += 1;
        }

        Self {
            songs,
            likes,
            like_counts,
        }
    }

    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    pub fn like_count(&self, song_id: i64) -> i64 {
        self.like_counts.get(&song_id).copied().unwrap_or(0)
    }

    fn ranked(&self, song: &Song) -> RankedSong {
        RankedSong::new(song, self.like_count(song.id))
    }

    fn song(&self, song_id: i64) -> Option<&Song> {
        self.songs.iter().find(|s| s.id == song_id)
    }

    fn likes_of(&self, user_id: i64) -> impl Iterator<Item = &Like> {
        self.likes.iter().filter(move |l| l.user_id == user_id)
    }

    /// All songs, optionally restricted to one genre, in the requested order.
    ///
    /// A genre of `all` means no filter.
    pub fn list(&self, genre: Option<&str>, sort: SortMode) -> Vec<RankedSong> {
        let genre = genre.filter(|g| *g != "all");

        let mut list: Vec<RankedSong> = self
            .songs
            .iter()
            .filter(|s| genre.is_none_or(|g| s.genre == g))
            .map(|s| self.ranked(s))
            .collect();

        match sort {
            SortMode::Popular => list.sort_by(popular_order),
            SortMode::Recent => list.sort_by(recent_order),
        }
        list
    }

    /// Whole catalog by popularity, capped at [`RECOMMENDATION_LIMIT`].
    pub fn popular(&self) -> Vec<RankedSong> {
        let mut list = self.list(None, SortMode::Popular);
        list.truncate(RECOMMENDATION_LIMIT);
        list
    }

    /// Recommendations for `user_id` as of `now`.
    ///
    /// With no like history this is [`Catalog::popular`] and carries no
    /// score. Otherwise every song the user has not liked is scored as
    /// `3 * in_top_genre + like_count + recency_bonus` and the best
    /// [`RECOMMENDATION_LIMIT`] are returned. Equal scores keep catalog order.
    pub fn recommend(&self, user_id: i64, now: DateTime<Utc>) -> Vec<RankedSong> {
        let liked_ids: HashSet<i64> = self.likes_of(user_id).map(|l| l.song_id).collect();
        let liked_songs: Vec<&Song> = self
            .likes_of(user_id)
            .filter_map(|l| self.song(l.song_id))
            .collect();

        if liked_songs.is_empty() {
            tracing::debug!(user_id, "No like history, recommending popular songs");
            return self.popular();
        }

        let favourite = top_genres(liked_songs.iter().copied(), TOP_GENRE_COUNT);
        tracing::debug!(user_id, genres = ?favourite, "Scoring candidates");

        let mut scored: Vec<RankedSong> = self
            .songs
            .iter()
            .filter(|s| !liked_ids.contains(&s.id))
            .map(|s| {
                let mut ranked = self.ranked(s);
                let genre_bonus = if favourite.contains(&s.genre.as_str()) {
                    GENRE_MATCH_BONUS
                } else {
                    0
                };
                ranked.score =
                    Some(genre_bonus + ranked.like_count + recency_bonus(s.created_at, now));
                ranked
            })
            .collect();

        scored.sort_by(|a, b| b.score.cmp(&a.score));
        scored.truncate(RECOMMENDATION_LIMIT);
        scored
    }

    /// Songs liked by `user_id`, most recently liked first.
    pub fn liked_by(&self, user_id: i64) -> Vec<RankedSong> {
        let mut list: Vec<RankedSong> = self
            .likes_of(user_id)
            .filter_map(|like| {
                self.song(like.song_id).map(|song| {
                    let mut ranked = self.ranked(song);
                    ranked.liked_at = Some(like.created_at);
                    ranked
                })
            })
            .collect();

        list.sort_by(|a, b| b.liked_at.cmp(&a.liked_at));
        list
    }

    /// Distinct genres of stored songs, sorted.
    pub fn genres(&self) -> Vec<String> {
        self.songs
            .iter()
            .map(|s| s.genre.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
