use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;
use tracing::{debug, warn};

use super::models::{SearchListResponse, VideoItem, VideoListResponse};
use crate::error::{Result, SourceError};
use crate::http::HttpFetcher;
use crate::model::{CanonicalVideo, SearchRequest, SourceKind, TrendingRequest, VideoDetails};
use crate::normalize;
use crate::sources::VideoSource;
use crate::store::Preferences;

static API_KEY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^AIza[0-9A-Za-z_-]{35}$").unwrap());

const VIDEO_PARTS: &str = "snippet,statistics,contentDetails";
const MAX_PAGE_SIZE: u32 = 50;

/// Shape check only; the backend is the authority on whether a key works.
pub fn is_valid_api_key(key: &str) -> bool {
    API_KEY_REGEX.is_match(key.trim())
}

/// Adapter for the metered API.
///
/// The key is read from [`Preferences`] on every call so a key set or cleared
/// elsewhere takes effect immediately. Paging and search filters are not
/// supported by this backend and are ignored.
pub struct PrimaryAdapter {
    fetcher: Arc<dyn HttpFetcher>,
    prefs: Preferences,
    api_base: String,
}

impl PrimaryAdapter {
    pub fn new(fetcher: Arc<dyn HttpFetcher>, prefs: Preferences, api_base: impl Into<String>) -> Self {
        Self {
            fetcher,
            prefs,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    /// The stored key, checked before anything touches the network.
    fn credential(&self) -> Result<String> {
        let key = self.prefs.api_key().ok_or(SourceError::CredentialMissing)?;
        let key = key.trim();
        if key.is_empty() {
            return Err(SourceError::CredentialMissing);
        }
        if !is_valid_api_key(key) {
            return Err(SourceError::CredentialInvalid);
        }
        Ok(key.to_string())
    }

    fn endpoint(&self, resource: &str) -> String {
        format!("{}/{resource}", self.api_base)
    }

    async fn list_videos(&self, key: &str, mut params: Vec<(String, String)>) -> Result<Vec<VideoItem>> {
        params.push(("part".to_string(), VIDEO_PARTS.to_string()));
        params.push(("key".to_string(), key.to_string()));
        let value = self
            .fetcher
            .get_json(&self.endpoint("videos"), &params)
            .await?;
        let response: VideoListResponse = serde_json::from_value(value)?;
        Ok(response.items)
    }

    /// Statistics for a batch of search hits. Failure here degrades the
    /// results instead of failing the search.
    async fn statistics_for(&self, key: &str, ids: &[&str]) -> HashMap<String, VideoItem> {
        if ids.is_empty() {
            return HashMap::new();
        }
        let params = vec![("id".to_string(), ids.join(","))];
        match self.list_videos(key, params).await {
            Ok(items) => items
                .into_iter()
                .filter_map(|item| item.id.clone().map(|id| (id, item)))
                .collect(),
            Err(e) => {
                warn!(error = %e, count = ids.len(), "Statistics lookup failed, returning results without counts");
                HashMap::new()
            }
        }
    }
}

fn page_size(max_results: u32) -> String {
    max_results.clamp(1, MAX_PAGE_SIZE).to_string()
}

#[async_trait]
impl VideoSource for PrimaryAdapter {
    fn kind(&self) -> SourceKind {
        SourceKind::Primary
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<CanonicalVideo>> {
        let key = self.credential()?;
        if request.page > 1 || !request.filters.is_empty() {
            debug!(page = request.page, "Primary search ignores paging and filters");
        }

        let params = vec![
            ("part".to_string(), "snippet".to_string()),
            ("q".to_string(), request.query.clone()),
            ("type".to_string(), "video".to_string()),
            ("regionCode".to_string(), request.region.clone()),
            ("maxResults".to_string(), page_size(request.max_results)),
            ("key".to_string(), key.clone()),
        ];
        let value = self
            .fetcher
            .get_json(&self.endpoint("search"), &params)
            .await?;
        let response: SearchListResponse = serde_json::from_value(value)?;

        let ids: Vec<&str> = response
            .items
            .iter()
            .filter_map(|item| item.id.video_id.as_deref())
            .collect();
        let stats = self.statistics_for(&key, &ids).await;

        Ok(normalize::collect_videos(
            response.items.iter().map(|item| {
                let details = item.id.video_id.as_deref().and_then(|id| stats.get(id));
                normalize::primary_search_item(item, details)
            }),
            SourceKind::Primary,
        ))
    }

    async fn trending(&self, request: &TrendingRequest) -> Result<Vec<CanonicalVideo>> {
        let key = self.credential()?;
        let params = vec![
            ("chart".to_string(), "mostPopular".to_string()),
            ("regionCode".to_string(), request.region.clone()),
            ("maxResults".to_string(), page_size(request.max_results)),
        ];
        let items = self.list_videos(&key, params).await?;
        Ok(normalize::collect_videos(
            items.iter().map(normalize::primary_video),
            SourceKind::Primary,
        ))
    }

    async fn details(&self, video_id: &str) -> Result<VideoDetails> {
        let key = self.credential()?;
        let items = self
            .list_videos(&key, vec![("id".to_string(), video_id.to_string())])
            .await?;
        let item = items
            .first()
            .ok_or_else(|| SourceError::malformed(format!("no video found for id `{video_id}`")))?;
        normalize::primary_details(item)
    }
}
