use std::sync::Arc;

use rand::RngExt;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::{Result, SourceError};
use crate::http::HttpFetcher;
use crate::store::Preferences;

/// A fixed allow-list of interchangeable mirror instances.
///
/// The active instance lives in [`Preferences`] so it survives restarts; a
/// persisted value that is no longer on the list is ignored and replaced.
pub struct MirrorPool {
    instances: Vec<String>,
    prefs: Preferences,
    fetcher: Arc<dyn HttpFetcher>,
    probe_video_id: String,
}

impl std::fmt::Debug for MirrorPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MirrorPool")
            .field("instances", &self.instances)
            .field("probe_video_id", &self.probe_video_id)
            .finish_non_exhaustive()
    }
}

impl MirrorPool {
    pub fn new(
        instances: Vec<String>,
        prefs: Preferences,
        fetcher: Arc<dyn HttpFetcher>,
        probe_video_id: impl Into<String>,
    ) -> Result<Self> {
        if instances.is_empty() {
            return Err(SourceError::malformed(
                "mirror allow-list must contain at least one instance",
            ));
        }
        Ok(Self {
            instances,
            prefs,
            fetcher,
            probe_video_id: probe_video_id.into(),
        })
    }

    pub fn from_config(
        config: &ClientConfig,
        prefs: Preferences,
        fetcher: Arc<dyn HttpFetcher>,
    ) -> Result<Self> {
        config.validate()?;
        Self::new(
            config.instances.clone(),
            prefs,
            fetcher,
            config.probe_video_id.clone(),
        )
    }

    pub fn instances(&self) -> &[String] {
        &self.instances
    }

    pub fn contains(&self, instance: &str) -> bool {
        self.instances.iter().any(|i| i == instance)
    }

    /// The active instance, choosing and persisting one when none is set.
    pub fn current(&self) -> String {
        match self.prefs.mirror_instance() {
            Some(instance) if self.contains(&instance) => instance,
            stale => {
                if let Some(stale) = stale {
                    debug!(instance = %stale, "Persisted mirror is not on the allow-list");
                }
                let chosen = self.select_random();
                self.prefs.set_mirror_instance(&chosen);
                chosen
            }
        }
    }

    /// Uniform pick from the allow-list. Does not persist.
    pub fn select_random(&self) -> String {
        let index = rand::rng().random_range(0..self.instances.len());
        self.instances[index].clone()
    }

    /// Moves to a different instance and persists it.
    ///
    /// With a single-entry list the same instance is returned.
    pub fn reassign(&self) -> String {
        let current = self.current();
        let candidates: Vec<&String> = self
            .instances
            .iter()
            .filter(|i| **i != current)
            .collect();
        let next = if candidates.is_empty() {
            current.clone()
        } else {
            candidates[rand::rng().random_range(0..candidates.len())].clone()
        };
        debug!(from = %current, to = %next, "Reassigning mirror instance");
        self.prefs.set_mirror_instance(&next);
        next
    }

    /// Pins a specific instance; it must be on the allow-list.
    pub fn set_instance(&self, instance: &str) -> Result<()> {
        let instance = instance.trim().trim_end_matches('/');
        if !self.contains(instance) {
            return Err(SourceError::UnknownInstance(instance.to_string()));
        }
        self.prefs.set_mirror_instance(instance);
        Ok(())
    }

    /// Probes `endpoint` with a known video. Never fails; any error is `false`.
    pub async fn health_check(&self, endpoint: &str, probe_video_id: &str) -> bool {
        let url = format!(
            "{}/api/v1/videos/{}",
            endpoint.trim_end_matches('/'),
            urlencoding::encode(probe_video_id)
        );
        let query = [("fields".to_string(), "videoId".to_string())];
        match self.fetcher.get_json(&url, &query).await {
            Ok(body) => body
                .get("videoId")
                .and_then(|v| v.as_str())
                .is_some_and(|id| !id.is_empty()),
            Err(e) => {
                debug!(endpoint, error = %e, "Health check failed");
                false
            }
        }
    }

    /// Makes sure the active instance answers: keeps the current one if it
    /// does, otherwise persists the first healthy one in list order.
    ///
    /// Returns false only when every instance failed; the selection is then
    /// left unchanged.
    pub async fn ensure_healthy(&self) -> bool {
        let current = self.current();
        if self.health_check(&current, &self.probe_video_id).await {
            return true;
        }
        warn!(instance = %current, "Current mirror failed its health check");

        for candidate in self.instances.iter().filter(|i| **i != current) {
            if self.health_check(candidate, &self.probe_video_id).await {
                info!(instance = %candidate, "Switched to healthy mirror");
                self.prefs.set_mirror_instance(candidate);
                return true;
            }
        }

        warn!("No mirror instance passed its health check");
        false
    }
}
