//! Mapping from backend-native records to [`CanonicalVideo`].
//!
//! Both sources go through the same count, duration and timestamp rules, so a
//! record looks the same whichever backend answered. A record without a video
//! id is an error, never an empty-string id.

use tracing::warn;

use crate::error::{Result, SourceError};
use crate::format::{self, PublishedAt};
use crate::model::{
    CanonicalVideo, ChannelInfo, Count, FormatStream, RecommendedVideo, SourceKind, VideoDetails,
};
use crate::sources::mirror::models::{
    MirrorChannel, MirrorFormatStream, MirrorThumbnail, MirrorVideo, MirrorVideoDetails,
};
use crate::sources::primary::models::{SearchItem, Snippet, VideoItem};

/// Mirror thumbnail qualities, best first.
const MIRROR_QUALITY_ORDER: &[&str] = &[
    "maxres",
    "maxresdefault",
    "sddefault",
    "high",
    "medium",
    "default",
];

fn non_empty_id(id: Option<&str>, origin: SourceKind) -> Result<String> {
    match id.map(str::trim) {
        Some(id) if !id.is_empty() => Ok(id.to_string()),
        _ => Err(SourceError::MissingVideoId { origin }),
    }
}

fn primary_published(snippet: &Snippet) -> Result<chrono::DateTime<chrono::Utc>> {
    PublishedAt::Iso(&snippet.published_at)
        .to_datetime()
        .ok_or_else(|| {
            SourceError::malformed(format!(
                "unparsable publish time `{}`",
                snippet.published_at
            ))
        })
}

fn primary_from_parts(
    id: String,
    snippet: &Snippet,
    details: Option<&VideoItem>,
) -> Result<CanonicalVideo> {
    let statistics = details.and_then(|d| d.statistics.as_ref());
    let duration = details
        .and_then(|d| d.content_details.as_ref())
        .and_then(|c| c.duration.as_deref())
        .and_then(format::parse_iso8601_duration)
        .map(format::format_duration);

    Ok(CanonicalVideo {
        id,
        title: snippet.title.clone(),
        description: snippet.description.clone(),
        channel_title: snippet.channel_title.clone(),
        channel_id: snippet.channel_id.clone(),
        published_at: primary_published(snippet)?,
        view_count: Count::Textual(
            statistics
                .and_then(|s| s.view_count.clone())
                .unwrap_or_else(|| "0".to_string()),
        ),
        like_count: statistics.and_then(|s| s.like_count.clone()).map(Count::Textual),
        thumbnail_url: snippet
            .thumbnails
            .best()
            .map(|t| t.url.clone())
            .unwrap_or_default(),
        duration,
        source: SourceKind::Primary,
    })
}

/// A search hit joined with its (optional) statistics record.
pub fn primary_search_item(item: &SearchItem, details: Option<&VideoItem>) -> Result<CanonicalVideo> {
    let id = non_empty_id(item.id.video_id.as_deref(), SourceKind::Primary)?;
    primary_from_parts(id, &item.snippet, details)
}

/// A `videos` endpoint record (trending and detail lookups).
pub fn primary_video(item: &VideoItem) -> Result<CanonicalVideo> {
    let id = non_empty_id(item.id.as_deref(), SourceKind::Primary)?;
    let snippet = item
        .snippet
        .as_ref()
        .ok_or_else(|| SourceError::malformed(format!("video {id} has no snippet")))?;
    primary_from_parts(id, snippet, Some(item))
}

pub fn primary_details(item: &VideoItem) -> Result<VideoDetails> {
    let video = primary_video(item)?;
    let mut details = VideoDetails::new(video);
    details.keywords = item
        .snippet
        .as_ref()
        .map(|s| s.tags.clone())
        .unwrap_or_default();
    Ok(details)
}

fn absolutize(url: &str, origin: &str) -> String {
    if url.starts_with("//") {
        format!("https:{url}")
    } else if url.starts_with('/') {
        format!("{}{url}", origin.trim_end_matches('/'))
    } else {
        url.to_string()
    }
}

/// Picks the best thumbnail: known quality names first, then the widest.
fn best_mirror_thumbnail(thumbnails: &[MirrorThumbnail], origin: &str) -> Option<String> {
    MIRROR_QUALITY_ORDER
        .iter()
        .find_map(|quality| thumbnails.iter().find(|t| t.quality == *quality))
        .or_else(|| thumbnails.iter().max_by_key(|t| t.width))
        .map(|t| absolutize(&t.url, origin))
}

fn mirror_published(published: i64) -> Result<chrono::DateTime<chrono::Utc>> {
    PublishedAt::EpochSeconds(published)
        .to_datetime()
        .ok_or_else(|| SourceError::malformed(format!("publish time {published} out of range")))
}

/// `origin` is the instance that served the record; relative URLs resolve against it.
pub fn mirror_video(video: &MirrorVideo, origin: &str) -> Result<CanonicalVideo> {
    let id = non_empty_id(video.video_id.as_deref(), SourceKind::Mirror)?;
    let published = video
        .published
        .ok_or_else(|| SourceError::malformed(format!("video {id} has no publish time")))?;
    let published_at = mirror_published(published)?;

    Ok(CanonicalVideo {
        id,
        title: video.title.clone(),
        description: video.description.clone(),
        channel_title: video.author.clone(),
        channel_id: video.author_id.clone(),
        published_at,
        view_count: Count::Numeric(video.view_count),
        like_count: None,
        thumbnail_url: best_mirror_thumbnail(&video.video_thumbnails, origin).unwrap_or_default(),
        duration: Some(format::format_duration(video.length_seconds)),
        source: SourceKind::Mirror,
    })
}

/// A recommended entry. A missing publish time stays missing.
pub fn mirror_recommended(video: &MirrorVideo, origin: &str) -> Result<RecommendedVideo> {
    let id = non_empty_id(video.video_id.as_deref(), SourceKind::Mirror)?;
    let published_at = video.published.map(mirror_published).transpose()?;

    Ok(RecommendedVideo {
        id,
        title: video.title.clone(),
        channel_title: video.author.clone(),
        channel_id: video.author_id.clone(),
        published_at,
        view_count: Count::Numeric(video.view_count),
        thumbnail_url: best_mirror_thumbnail(&video.video_thumbnails, origin).unwrap_or_default(),
        duration: Some(format::format_duration(video.length_seconds)),
        source: SourceKind::Mirror,
    })
}

fn mirror_format_stream(stream: &MirrorFormatStream) -> FormatStream {
    FormatStream {
        url: stream.url.clone(),
        itag: stream.itag.clone(),
        mime_type: stream.mime_type.clone(),
        quality: stream.quality.clone(),
        container: stream.container.clone(),
        resolution: stream.resolution.clone(),
    }
}

pub fn mirror_details(details: &MirrorVideoDetails, origin: &str) -> Result<VideoDetails> {
    let mut video = mirror_video(&details.video, origin)?;
    video.like_count = details.like_count.map(Count::Numeric);

    Ok(VideoDetails {
        video,
        keywords: details.keywords.clone(),
        format_streams: details
            .format_streams
            .iter()
            .map(mirror_format_stream)
            .collect(),
        recommended: collect_records(
            details
                .recommended_videos
                .iter()
                .map(|v| mirror_recommended(v, origin)),
            SourceKind::Mirror,
        ),
    })
}

pub fn mirror_channel(channel: &MirrorChannel, origin: &str) -> Result<ChannelInfo> {
    let id = channel
        .author_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| SourceError::malformed("channel record has no authorId"))?;

    Ok(ChannelInfo {
        id: id.to_string(),
        name: channel.author.clone(),
        description: channel.description.clone(),
        subscriber_count: Count::Numeric(channel.sub_count),
        video_count: channel.video_count.map(Count::Numeric),
        avatar_url: channel
            .author_thumbnails
            .iter()
            .max_by_key(|t| t.width)
            .map(|t| absolutize(&t.url, origin)),
    })
}

/// Keeps the records that normalized, logging the ones that did not.
pub fn collect_videos<I>(results: I, source: SourceKind) -> Vec<CanonicalVideo>
where
    I: IntoIterator<Item = Result<CanonicalVideo>>,
{
    collect_records(results, source)
}

fn collect_records<T, I>(results: I, source: SourceKind) -> Vec<T>
where
    I: IntoIterator<Item = Result<T>>,
{
    results
        .into_iter()
        .filter_map(|result| match result {
            Ok(video) => Some(video),
            Err(e) => {
                warn!(%source, error = %e, "Dropping record that failed normalization");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::primary::models::{SearchItemId, Statistics, Thumbnail, Thumbnails};
    use serde_json::json;

    fn snippet() -> Snippet {
        Snippet {
            published_at: "2024-01-02T03:04:05Z".to_string(),
            channel_id: "UC123".to_string(),
            title: "Title".to_string(),
            description: "Desc".to_string(),
            thumbnails: Thumbnails {
                default: Some(Thumbnail {
                    url: "https://i.ytimg.com/default.jpg".to_string(),
                    width: Some(120),
                    height: Some(90),
                }),
                high: Some(Thumbnail {
                    url: "https://i.ytimg.com/high.jpg".to_string(),
                    width: Some(480),
                    height: Some(360),
                }),
                ..Default::default()
            },
            channel_title: "Channel".to_string(),
            tags: vec!["tag".to_string()],
        }
    }

    fn primary_stats(views: &str) -> VideoItem {
        VideoItem {
            id: Some("abc".to_string()),
            snippet: Some(snippet()),
            statistics: Some(Statistics {
                view_count: Some(views.to_string()),
                like_count: Some("42".to_string()),
                comment_count: None,
            }),
            content_details: Some(crate::sources::primary::models::ContentDetails {
                duration: Some("PT1H2M5S".to_string()),
            }),
        }
    }

    fn mirror(views: u64) -> MirrorVideo {
        serde_json::from_value(json!({
            "type": "video",
            "title": "Title",
            "videoId": "abc",
            "author": "Channel",
            "authorId": "UC123",
            "videoThumbnails": [
                {"quality": "default", "url": "/vi/abc/default.jpg", "width": 120, "height": 90},
                {"quality": "maxresdefault", "url": "/vi/abc/maxresdefault.jpg", "width": 1280, "height": 720}
            ],
            "description": "Desc",
            "viewCount": views,
            "published": 1704164645,
            "lengthSeconds": 3725
        }))
        .unwrap()
    }

    #[test]
    fn equivalent_counts_format_identically() {
        let from_primary = primary_video(&primary_stats("1500000")).unwrap();
        let from_mirror = mirror_video(&mirror(1_500_000), "https://yewtu.be").unwrap();

        assert_eq!(from_primary.views_label(), "1.5M views");
        assert_eq!(from_primary.views_label(), from_mirror.views_label());
        assert_eq!(from_primary.published_at, from_mirror.published_at);
        assert_eq!(from_primary.duration, from_mirror.duration);
        assert_eq!(from_primary.duration.as_deref(), Some("1:02:05"));
    }

    #[test]
    fn primary_search_item_without_stats() {
        let item = SearchItem {
            id: SearchItemId {
                kind: Some("youtube#video".to_string()),
                video_id: Some("abc".to_string()),
            },
            snippet: snippet(),
        };
        let video = primary_search_item(&item, None).unwrap();
        assert_eq!(video.id, "abc");
        assert_eq!(video.view_count, Count::Textual("0".to_string()));
        assert!(video.like_count.is_none());
        assert!(video.duration.is_none());
        assert_eq!(video.thumbnail_url, "https://i.ytimg.com/high.jpg");
        assert_eq!(video.source, SourceKind::Primary);
    }

    #[test]
    fn missing_id_is_an_error() {
        let item = SearchItem {
            id: SearchItemId {
                kind: Some("youtube#channel".to_string()),
                video_id: None,
            },
            snippet: snippet(),
        };
        assert!(matches!(
            primary_search_item(&item, None),
            Err(SourceError::MissingVideoId {
                origin: SourceKind::Primary
            })
        ));

        let mut video = mirror(1);
        video.video_id = Some("  ".to_string());
        assert!(matches!(
            mirror_video(&video, "https://yewtu.be"),
            Err(SourceError::MissingVideoId {
                origin: SourceKind::Mirror
            })
        ));
    }

    #[test]
    fn mirror_thumbnail_prefers_quality_and_resolves_relative() {
        let video = mirror_video(&mirror(10), "https://yewtu.be/").unwrap();
        assert_eq!(
            video.thumbnail_url,
            "https://yewtu.be/vi/abc/maxresdefault.jpg"
        );
        assert_eq!(video.source, SourceKind::Mirror);
        assert_eq!(video.view_count, Count::Numeric(10));
    }

    #[test]
    fn bad_primary_timestamp_is_malformed() {
        let mut item = primary_stats("1");
        if let Some(s) = item.snippet.as_mut() {
            s.published_at = "soon".to_string();
        }
        assert!(matches!(
            primary_video(&item),
            Err(SourceError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn collect_skips_failures() {
        let good = mirror_video(&mirror(1), "https://yewtu.be");
        let bad = Err(SourceError::MissingVideoId {
            origin: SourceKind::Mirror,
        });
        let videos = collect_videos(vec![good, bad], SourceKind::Mirror);
        assert_eq!(videos.len(), 1);
    }

    #[test]
    fn mirror_details_carry_extras() {
        let details: MirrorVideoDetails = serde_json::from_value(json!({
            "title": "Title",
            "videoId": "abc",
            "author": "Channel",
            "authorId": "UC123",
            "videoThumbnails": [],
            "published": 1704164645,
            "lengthSeconds": 65,
            "viewCount": 999,
            "likeCount": 12,
            "keywords": ["a", "b"],
            "formatStreams": [
                {"url": "https://cdn/360", "itag": "18", "type": "video/mp4", "quality": "medium", "resolution": "360p"}
            ],
            "recommendedVideos": [
                {"videoId": "rec1", "title": "R", "author": "A", "authorId": "UC9", "lengthSeconds": 10, "viewCount": 5},
                {"title": "no id"}
            ]
        }))
        .unwrap();

        let normalized = mirror_details(&details, "https://yewtu.be").unwrap();
        assert_eq!(normalized.video.like_count, Some(Count::Numeric(12)));
        assert_eq!(normalized.video.duration.as_deref(), Some("1:05"));
        assert_eq!(normalized.keywords, vec!["a", "b"]);
        assert_eq!(normalized.format_streams[0].height(), 360);
        assert_eq!(normalized.recommended.len(), 1);
        assert_eq!(normalized.recommended[0].id, "rec1");
    }

    #[test]
    fn recommended_without_publish_time_has_no_date() {
        let details: MirrorVideoDetails = serde_json::from_value(json!({
            "title": "Title",
            "videoId": "abc",
            "published": 1704164645,
            "recommendedVideos": [
                {"videoId": "rec1", "title": "R", "lengthSeconds": 10, "viewCount": 5},
                {"videoId": "rec2", "title": "S", "published": 1704164645}
            ]
        }))
        .unwrap();

        let normalized = mirror_details(&details, "https://yewtu.be").unwrap();
        assert_eq!(normalized.recommended.len(), 2);
        assert!(
            normalized
                .recommended
                .iter()
                .all(|r| r.published_at.is_none_or(|t| t.timestamp() != 0))
        );
        assert!(normalized.recommended[0].published_at.is_none());
        let now = chrono::Utc::now();
        assert_eq!(normalized.recommended[0].published_label(now), "");
        assert_eq!(
            normalized.recommended[1].published_at.map(|t| t.timestamp()),
            Some(1704164645)
        );
    }

    #[test]
    fn list_record_without_publish_time_is_malformed() {
        let mut video = mirror(1);
        video.published = None;
        assert!(matches!(
            mirror_video(&video, "https://yewtu.be"),
            Err(SourceError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn channel_requires_id() {
        let channel: MirrorChannel = serde_json::from_value(json!({
            "author": "Chan",
            "authorId": "UC1",
            "authorThumbnails": [
                {"url": "//yt3.ggpht.com/small", "width": 32, "height": 32},
                {"url": "//yt3.ggpht.com/large", "width": 512, "height": 512}
            ],
            "subCount": 1200,
            "description": "about"
        }))
        .unwrap();
        let info = mirror_channel(&channel, "https://yewtu.be").unwrap();
        assert_eq!(info.avatar_url.as_deref(), Some("https://yt3.ggpht.com/large"));
        assert_eq!(info.subscriber_count.display_with("subscribers"), "1.2K subscribers");
        assert!(info.video_count.is_none());

        let anonymous: MirrorChannel = serde_json::from_value(json!({"author": "x"})).unwrap();
        assert!(mirror_channel(&anonymous, "https://yewtu.be").is_err());
    }
}
