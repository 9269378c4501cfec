use serde::Deserialize;
use url::Url;

use crate::db::models::NewSong;
use crate::error::{AppError, AppResult};

pub const TITLE_MAX_LEN: usize = 100;
pub const ARTIST_MAX_LEN: usize = 80;
pub const GENRE_MAX_LEN: usize = 40;

/// Genres offered by the submission form
pub const GENRE_OPTIONS: [&str; 9] = [
    "발라드",
    "댄스",
    "힙합",
    "R&B / Soul",
    "록 / 메탈",
    "인디",
    "POP",
    "J-POP",
    "기타",
];

const ALLOWED_HOSTS: [&str; 4] = ["www.youtube.com", "youtube.com", "m.youtube.com", "youtu.be"];
const SHORT_LINK_HOST: &str = "youtu.be";
const VIDEO_ID_LEN: std::ops::RangeInclusive<usize> = 5..=20;

/// Trims `input` and cuts it to `max_len` characters. `None` when nothing is left.
pub fn sanitize_text(input: &str, max_len: usize) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(max_len).collect())
}

fn is_valid_video_id(id: &str) -> bool {
    VIDEO_ID_LEN.contains(&id.len())
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Rewrites a YouTube link to `https://www.youtube.com/watch?v=<id>`.
///
/// Only the video id survives; playlist, timestamp and tracking parameters
/// are dropped. Returns `None` for anything that is not a recognisable
/// YouTube video link.
pub fn normalize_youtube_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let url = Url::parse(trimmed).ok()?;
    // stricter than host matching alone: ftp://youtu.be/... is not a video link
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }

    let host = url.host_str()?.to_ascii_lowercase();
    if !ALLOWED_HOSTS.contains(&host.as_str()) {
        return None;
    }

    let video_id = if host == SHORT_LINK_HOST {
        url.path().strip_prefix('/').map(str::to_string)
    } else {
        url.query_pairs()
            .find(|(key, _)| key == "v")
            .map(|(_, value)| value.into_owned())
    }?;

    if !is_valid_video_id(&video_id) {
        return None;
    }

    Some(format!("https://www.youtube.com/watch?v={}", video_id))
}

/// Trims a login nickname. Nicknames are identities, so they are never truncated.
pub fn nickname(raw: &str) -> AppResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("Nickname is required"));
    }
    Ok(trimmed.to_string())
}

/// Raw song submission as it arrives from a client
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SongDraft {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub genre: Option<String>,
    #[serde(rename = "youtubeUrl", alias = "youtube_url")]
    pub youtube_url: Option<String>,
}

impl SongDraft {
    pub fn validate(&self) -> AppResult<NewSong> {
        let field = |value: &Option<String>, max_len: usize, name: &str| {
            value
                .as_deref()
                .and_then(|v| sanitize_text(v, max_len))
                .ok_or_else(|| AppError::validation(format!("{} is required", name)))
        };

        let title = field(&self.title, TITLE_MAX_LEN, "title")?;
        let artist = field(&self.artist, ARTIST_MAX_LEN, "artist")?;
        let genre = field(&self.genre, GENRE_MAX_LEN, "genre")?;

        if !GENRE_OPTIONS.contains(&genre.as_str()) {
            return Err(AppError::validation(format!(
                "genre must be one of: {}",
                GENRE_OPTIONS.join(", ")
            )));
        }

        let youtube_url = self
            .youtube_url
            .as_deref()
            .and_then(normalize_youtube_url)
            .ok_or_else(|| AppError::validation("youtubeUrl must be a YouTube video link"))?;

        Ok(NewSong {
            title,
            artist,
            genre,
            youtube_url,
        })
    }
}
