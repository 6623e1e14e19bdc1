//! Playback URL helpers.
//!
//! Nothing here touches the network; the caller supplies the active mirror
//! origin and the primary site.

use std::sync::LazyLock;

use regex::Regex;

use crate::model::{FormatStream, SourceKind};

static PRIMARY_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?:youtube\.com/(?:[^/]+/.+/|(?:v|e(?:mbed)?|shorts)/|.*[?&]v=)|youtu\.be/)([^"&?/\s]{11})"#,
    )
    .unwrap()
});

static MIRROR_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?:invidio\.us|invidious\.[a-z]+\.[a-z]+|yewtu\.be|inv\.[a-z0-9.-]+|yt\.artemislena\.eu|vid\.puffyan\.us)/(?:watch\?v=|v/|embed/)([^"&?/\s]{11})"#,
    )
    .unwrap()
});

static BARE_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").unwrap());

/// Where a playback URL should point.
#[derive(Debug, Clone, Copy)]
pub struct PlaybackTarget<'a> {
    pub source: SourceKind,
    /// Active mirror origin, used when `source` is the mirror.
    pub mirror_origin: &'a str,
    /// Primary site origin, e.g. `https://www.youtube.com`.
    pub primary_site: &'a str,
}

impl PlaybackTarget<'_> {
    fn origin(&self) -> &str {
        match self.source {
            SourceKind::Mirror => self.mirror_origin.trim_end_matches('/'),
            SourceKind::Primary => self.primary_site.trim_end_matches('/'),
        }
    }

    pub fn embed_url(&self, video_id: &str) -> String {
        format!("{}/embed/{video_id}", self.origin())
    }

    pub fn watch_url(&self, video_id: &str) -> String {
        format!("{}/watch?v={video_id}", self.origin())
    }
}

pub fn mirror_watch_url(origin: &str, video_id: &str) -> String {
    format!("{}/watch?v={video_id}", origin.trim_end_matches('/'))
}

/// Pulls an 11-character video id out of a primary-site URL, a known mirror
/// URL, or a bare id.
pub fn extract_video_id(input: &str) -> Option<String> {
    let input = input.trim();
    PRIMARY_URL_REGEX
        .captures(input)
        .or_else(|| MIRROR_URL_REGEX.captures(input))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .or_else(|| BARE_ID_REGEX.is_match(input).then(|| input.to_string()))
}

/// Highest-resolution progressive stream. Ties keep the first listed.
pub fn best_format_stream(streams: &[FormatStream]) -> Option<&FormatStream> {
    streams
        .iter()
        .enumerate()
        .max_by_key(|(index, stream)| (stream.height(), std::cmp::Reverse(*index)))
        .map(|(_, stream)| stream)
}
