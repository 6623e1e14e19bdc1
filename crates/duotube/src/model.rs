use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::filters::SearchFilters;
use crate::format;

/// Which backend a record came from, also used as the persisted source preference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// The credentialed, metered API.
    Primary,
    /// Any member of the keyless mirror pool.
    #[default]
    Mirror,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Mirror => "mirror",
        }
    }

    /// The other source, used as the fallback target.
    pub fn other(self) -> Self {
        match self {
            Self::Primary => Self::Mirror,
            Self::Mirror => Self::Primary,
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "primary" | "youtube" => Ok(Self::Primary),
            "mirror" | "invidious" => Ok(Self::Mirror),
            other => Err(format!("unknown source `{other}`")),
        }
    }
}

/// A count as reported upstream.
///
/// The primary backend sends counts as decimal strings, mirrors send numbers.
/// Both are kept as received; [`Count::value`] gives the numeric view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Count {
    Numeric(u64),
    Textual(String),
}

impl Count {
    pub fn value(&self) -> Option<u64> {
        match self {
            Self::Numeric(n) => Some(*n),
            Self::Textual(s) => s.trim().parse().ok(),
        }
    }

    /// Display form, e.g. `1.5M views`.
    pub fn display_views(&self) -> String {
        self.display_with("views")
    }

    pub fn display_with(&self, unit: &str) -> String {
        match self.value() {
            Some(n) => format::format_count(n, unit),
            None => match self {
                Self::Textual(s) if !s.trim().is_empty() => format!("{} {unit}", s.trim()),
                _ => format::format_count(0, unit),
            },
        }
    }
}

impl Default for Count {
    fn default() -> Self {
        Self::Numeric(0)
    }
}

impl From<u64> for Count {
    fn from(value: u64) -> Self {
        Self::Numeric(value)
    }
}

impl From<String> for Count {
    fn from(value: String) -> Self {
        Self::Textual(value)
    }
}

/// The source-agnostic video record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalVideo {
    pub id: String,
    pub title: String,
    pub description: String,
    pub channel_title: String,
    pub channel_id: String,
    pub published_at: DateTime<Utc>,
    pub view_count: Count,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub like_count: Option<Count>,
    pub thumbnail_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    pub source: SourceKind,
}

impl CanonicalVideo {
    pub fn views_label(&self) -> String {
        self.view_count.display_views()
    }

    pub fn published_label(&self, now: DateTime<Utc>) -> String {
        format::format_relative_date(self.published_at, now)
    }
}

/// A progressive (audio + video) stream offered by a mirror.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatStream {
    pub url: String,
    pub itag: String,
    pub mime_type: String,
    pub quality: String,
    pub container: Option<String>,
    pub resolution: Option<String>,
}

impl FormatStream {
    /// Vertical resolution parsed from labels like `720p`, 0 when unknown.
    pub fn height(&self) -> u32 {
        self.resolution
            .as_deref()
            .and_then(|r| r.split('p').next())
            .and_then(|h| h.trim().parse().ok())
            .unwrap_or(0)
    }
}

/// A single video with everything the detail lookup returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoDetails {
    pub video: CanonicalVideo,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub format_streams: Vec<FormatStream>,
    #[serde(default)]
    pub recommended: Vec<RecommendedVideo>,
}

impl VideoDetails {
    pub fn new(video: CanonicalVideo) -> Self {
        Self {
            video,
            keywords: Vec::new(),
            format_streams: Vec::new(),
            recommended: Vec::new(),
        }
    }
}

/// A related-video entry on a detail page.
///
/// Mirrors list these without a publish time, so unlike [`CanonicalVideo`]
/// the timestamp is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedVideo {
    pub id: String,
    pub title: String,
    pub channel_title: String,
    pub channel_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    pub view_count: Count,
    pub thumbnail_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    pub source: SourceKind,
}

impl RecommendedVideo {
    pub fn views_label(&self) -> String {
        self.view_count.display_views()
    }

    /// Empty when the upstream entry carried no publish time.
    pub fn published_label(&self, now: DateTime<Utc>) -> String {
        self.published_at
            .map(|published| format::format_relative_date(published, now))
            .unwrap_or_default()
    }
}

/// Channel summary, mirror-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub subscriber_count: Count,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_count: Option<Count>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    /// 1-based page index.
    pub page: u32,
    pub filters: SearchFilters,
    pub region: String,
    pub max_results: u32,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            page: 1,
            filters: SearchFilters::default(),
            region: crate::store::DEFAULT_REGION.to_string(),
            max_results: crate::store::DEFAULT_MAX_RESULTS,
        }
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    pub fn filters(mut self, filters: SearchFilters) -> Self {
        self.filters = filters;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrendingRequest {
    pub region: String,
    pub max_results: u32,
    /// Mirror-only trending category (`music`, `gaming`, ...).
    pub category: Option<String>,
}

impl TrendingRequest {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            max_results: crate::store::DEFAULT_MAX_RESULTS,
            category: None,
        }
    }
}
