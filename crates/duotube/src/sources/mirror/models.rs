use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MirrorVideo {
    #[serde(default)]
    pub title: String,
    pub video_id: Option<String>,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub author_id: String,
    #[serde(default)]
    pub video_thumbnails: Vec<MirrorThumbnail>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub view_count: u64,
    /// Epoch seconds. Recommended-video entries omit it.
    pub published: Option<i64>,
    #[serde(default)]
    pub length_seconds: u64,
    #[serde(default)]
    pub live_now: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MirrorThumbnail {
    #[serde(default)]
    pub quality: String,
    pub url: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MirrorVideoDetails {
    #[serde(flatten)]
    pub video: MirrorVideo,
    pub like_count: Option<u64>,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub genre: Option<String>,
    #[serde(default)]
    pub format_streams: Vec<MirrorFormatStream>,
    #[serde(default)]
    pub recommended_videos: Vec<MirrorVideo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MirrorFormatStream {
    pub url: String,
    #[serde(default)]
    pub itag: String,
    #[serde(rename = "type", default)]
    pub mime_type: String,
    #[serde(default)]
    pub quality: String,
    pub container: Option<String>,
    pub resolution: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MirrorChannel {
    #[serde(default)]
    pub author: String,
    pub author_id: Option<String>,
    #[serde(default)]
    pub author_thumbnails: Vec<MirrorThumbnail>,
    #[serde(default)]
    pub sub_count: u64,
    pub video_count: Option<u64>,
    #[serde(default)]
    pub description: String,
}
