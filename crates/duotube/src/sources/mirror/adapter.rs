use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use super::models::{MirrorChannel, MirrorVideo, MirrorVideoDetails};
use super::pool::MirrorPool;
use crate::config::ClientConfig;
use crate::error::{Result, SourceError};
use crate::http::HttpFetcher;
use crate::model::{
    CanonicalVideo, ChannelInfo, SearchRequest, SourceKind, TrendingRequest, VideoDetails,
};
use crate::normalize;
use crate::retry::{RetryAction, RetryPolicy, retry_with_backoff};
use crate::sources::VideoSource;

/// Adapter for the mirror pool.
///
/// Every request goes to the pool's current instance. A failure moves the
/// pool to another instance and tries again, up to `max_attempts` times.
pub struct MirrorAdapter {
    pool: Arc<MirrorPool>,
    fetcher: Arc<dyn HttpFetcher>,
    retry_policy: RetryPolicy,
    max_attempts: usize,
}

impl MirrorAdapter {
    pub fn new(
        pool: Arc<MirrorPool>,
        fetcher: Arc<dyn HttpFetcher>,
        retry_policy: RetryPolicy,
        max_attempts: usize,
    ) -> Self {
        Self {
            pool,
            fetcher,
            retry_policy,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn from_config(
        config: &ClientConfig,
        pool: Arc<MirrorPool>,
        fetcher: Arc<dyn HttpFetcher>,
    ) -> Self {
        Self::new(
            pool,
            fetcher,
            config.retry_policy.clone(),
            config.max_mirror_attempts(),
        )
    }

    pub fn pool(&self) -> &Arc<MirrorPool> {
        &self.pool
    }

    /// GETs `path` from the current instance and decodes it as `T`.
    ///
    /// Decoding happens inside the attempt, so an instance answering with an
    /// error page counts as a failed attempt. Returns the instance that
    /// served the response alongside the body.
    async fn fetch<T>(&self, path: &str, query: Vec<(String, String)>) -> Result<(T, String)>
    where
        T: DeserializeOwned + Send,
    {
        let query = query.as_slice();
        let max_attempts = self.max_attempts;

        let outcome = retry_with_backoff(&self.retry_policy, max_attempts, move |attempt| async move {
            let instance = self.pool.current();
            let url = format!("{instance}{path}");
            debug!(instance = %instance, attempt, path, "Mirror request");

            let result = self
                .fetcher
                .get_json(&url, query)
                .await
                .and_then(|body| serde_json::from_value::<T>(body).map_err(SourceError::from));

            match result {
                Ok(body) => RetryAction::Success((body, instance)),
                Err(e) if e.is_retryable() => {
                    if (attempt as usize) + 1 < max_attempts {
                        let next = self.pool.reassign();
                        warn!(instance = %instance, next = %next, error = %e, "Switching mirror instance");
                    }
                    RetryAction::Retry(e)
                }
                Err(e) => RetryAction::Fail(e),
            }
        })
        .await;

        outcome.map_err(|e| {
            if e.is_retryable() {
                SourceError::ExhaustedMirrors {
                    attempts: max_attempts,
                    last: Box::new(e),
                }
            } else {
                e
            }
        })
    }
}

fn videos_from_list(items: Vec<Value>, origin: &str) -> Vec<CanonicalVideo> {
    let videos = items.into_iter().filter_map(|item| {
        // search mixes channels and playlists in; trending has no `type` at all
        match item.get("type").and_then(Value::as_str) {
            Some("video") | None => {}
            Some(_) => return None,
        }
        Some(
            serde_json::from_value::<MirrorVideo>(item)
                .map_err(SourceError::from)
                .and_then(|video| normalize::mirror_video(&video, origin)),
        )
    });
    normalize::collect_videos(videos, SourceKind::Mirror)
}

#[async_trait]
impl VideoSource for MirrorAdapter {
    fn kind(&self) -> SourceKind {
        SourceKind::Mirror
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<CanonicalVideo>> {
        let mut query = vec![
            ("q".to_string(), request.query.clone()),
            ("page".to_string(), request.page.max(1).to_string()),
        ];
        query.extend(request.filters.to_mirror_query());

        let (items, origin): (Vec<Value>, String) = self.fetch("/api/v1/search", query).await?;
        Ok(videos_from_list(items, &origin))
    }

    async fn trending(&self, request: &TrendingRequest) -> Result<Vec<CanonicalVideo>> {
        let mut query = vec![("region".to_string(), request.region.clone())];
        if let Some(category) = request.category.as_deref().filter(|c| !c.trim().is_empty()) {
            query.push(("type".to_string(), category.trim().to_string()));
        }

        let (items, origin): (Vec<Value>, String) = self.fetch("/api/v1/trending", query).await?;
        Ok(videos_from_list(items, &origin))
    }

    async fn details(&self, video_id: &str) -> Result<VideoDetails> {
        let path = format!("/api/v1/videos/{}", urlencoding::encode(video_id));
        let (details, origin): (MirrorVideoDetails, String) = self.fetch(&path, Vec::new()).await?;
        normalize::mirror_details(&details, &origin)
    }

    async fn channel(&self, channel_id: &str) -> Result<ChannelInfo> {
        let path = format!("/api/v1/channels/{}", urlencoding::encode(channel_id));
        let (channel, origin): (MirrorChannel, String) = self.fetch(&path, Vec::new()).await?;
        normalize::mirror_channel(&channel, &origin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{Facet, SearchFilters};
    use crate::store::{MemoryStore, Preferences};
    use crate::test_support::ScriptedFetcher;
    use serde_json::json;

    fn video(id: &str) -> Value {
        json!({
            "type": "video",
            "title": format!("video {id}"),
            "videoId": id,
            "author": "Chan",
            "authorId": "UC1",
            "videoThumbnails": [{"quality": "medium", "url": "/vi/x/mq.jpg", "width": 320, "height": 180}],
            "viewCount": 1200,
            "published": 1714557600,
            "lengthSeconds": 61
        })
    }

    fn adapter(n: usize, fetcher: Arc<ScriptedFetcher>) -> (MirrorAdapter, Preferences) {
        let prefs = Preferences::new(Arc::new(MemoryStore::new()));
        let instances = (0..n).map(|i| format!("https://m{i}.test")).collect();
        let pool = Arc::new(MirrorPool::new(instances, prefs.clone(), fetcher.clone(), "probe").unwrap());
        let attempts = n.min(crate::config::MAX_MIRROR_ATTEMPTS);
        (
            MirrorAdapter::new(pool, fetcher, RetryPolicy::immediate(), attempts),
            prefs,
        )
    }

    #[tokio::test]
    async fn search_keeps_only_videos() {
        let fetcher = Arc::new(ScriptedFetcher::new().on_json(
            "/api/v1/search",
            json!([
                video("a"),
                {"type": "channel", "author": "Chan", "authorId": "UC1"},
                {"type": "video", "title": "broken"},
                video("b")
            ]),
        ));
        let (source, _) = adapter(1, fetcher.clone());
        let filters = SearchFilters::new()
            .with(Facet::SortOrder, "views")
            .with(Facet::Duration, "any");
        let videos = source
            .search(&SearchRequest::new("rust").page(2).filters(filters))
            .await
            .unwrap();

        let ids: Vec<&str> = videos.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
        assert_eq!(videos[0].thumbnail_url, "https://m0.test/vi/x/mq.jpg");

        let call = &fetcher.calls()[0];
        assert_eq!(call.url, "https://m0.test/api/v1/search");
        assert_eq!(call.param("q"), Some("rust"));
        assert_eq!(call.param("page"), Some("2"));
        assert_eq!(call.param("sort_by"), Some("view_count"));
        assert_eq!(call.param("duration"), None);
    }

    #[tokio::test]
    async fn sentinel_filters_send_identical_requests() {
        let fetcher = Arc::new(ScriptedFetcher::new().on_json("/api/v1/search", json!([])));
        let (source, _) = adapter(1, fetcher.clone());

        let with_sentinels = SearchFilters::new()
            .with(Facet::UploadDate, "any")
            .with(Facet::ResultType, "all");
        source
            .search(&SearchRequest::new("q").filters(with_sentinels))
            .await
            .unwrap();
        source.search(&SearchRequest::new("q")).await.unwrap();

        let calls = fetcher.calls();
        assert_eq!(calls[0], calls[1]);
    }

    #[tokio::test]
    async fn fails_over_to_next_instance() {
        let fetcher = Arc::new(
            ScriptedFetcher::new()
                .on_status("https://m0.test", 503)
                .on_json("https://m1.test/api/v1/trending", json!([video("t")])),
        );
        let (source, prefs) = adapter(2, fetcher.clone());
        source.pool().set_instance("https://m0.test").unwrap();

        let videos = source.trending(&TrendingRequest::new("DE")).await.unwrap();
        assert_eq!(videos.len(), 1);
        assert_eq!(videos[0].source, SourceKind::Mirror);
        assert_eq!(prefs.mirror_instance().as_deref(), Some("https://m1.test"));
        assert_eq!(fetcher.call_count(), 2);
        assert_eq!(fetcher.calls()[1].param("region"), Some("DE"));
    }

    #[tokio::test]
    async fn html_error_page_is_retried() {
        let fetcher = Arc::new(
            ScriptedFetcher::new()
                .on_json("https://m0.test", json!({"error": "rate limited"}))
                .on_json("https://m1.test", json!([])),
        );
        let (source, _) = adapter(2, fetcher.clone());
        source.pool().set_instance("https://m0.test").unwrap();

        assert!(source.search(&SearchRequest::new("q")).await.unwrap().is_empty());
        assert_eq!(fetcher.call_count(), 2);
    }

    #[tokio::test]
    async fn attempts_are_bounded() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        let (source, _) = adapter(10, fetcher.clone());

        let err = source.details("abc").await.unwrap_err();
        match err {
            SourceError::ExhaustedMirrors { attempts, last } => {
                assert_eq!(attempts, 5);
                assert!(last.is_transport());
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(fetcher.call_count(), 5);
    }

    #[tokio::test]
    async fn trending_category() {
        let fetcher = Arc::new(ScriptedFetcher::new().on_json("/api/v1/trending", json!([])));
        let (source, _) = adapter(1, fetcher.clone());
        let mut request = TrendingRequest::new("US");
        request.category = Some("music".to_string());
        source.trending(&request).await.unwrap();
        assert_eq!(fetcher.calls()[0].param("type"), Some("music"));
    }

    #[tokio::test]
    async fn channel_lookup() {
        let fetcher = Arc::new(ScriptedFetcher::new().on_json(
            "/api/v1/channels/UC1",
            json!({"author": "Chan", "authorId": "UC1", "subCount": 5, "description": "d"}),
        ));
        let (source, _) = adapter(1, fetcher);
        let channel = source.channel("UC1").await.unwrap();
        assert_eq!(channel.name, "Chan");
        assert!(channel.avatar_url.is_none());
    }
}
