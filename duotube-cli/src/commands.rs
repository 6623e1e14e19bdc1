use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use duotube::playback::extract_video_id;
use duotube::sources::is_valid_api_key;
use duotube::store::{FileStore, Settings};
use duotube::{Aggregator, Facet, Fetched, SearchFilters, SourceKind};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use tracing::{debug, warn};

use crate::cli::{InstanceAction, KeyAction, OutputFormat};
use crate::config::AppConfig;
use crate::error::{AppError, Result};
use crate::output::OutputManager;

pub struct CommandExecutor {
    aggregator: Aggregator,
    output: OutputManager,
    format: OutputFormat,
}

pub struct SearchArgs {
    pub query: String,
    pub page: u32,
    pub sort: Option<String>,
    pub date: Option<String>,
    pub duration: Option<String>,
    pub result_type: Option<String>,
}

impl SearchArgs {
    fn filters(&self) -> SearchFilters {
        let mut filters = SearchFilters::new();
        let facets = [
            (Facet::SortOrder, &self.sort),
            (Facet::UploadDate, &self.date),
            (Facet::Duration, &self.duration),
            (Facet::ResultType, &self.result_type),
        ];
        for (facet, value) in facets {
            if let Some(value) = value {
                filters.set(facet, value.trim().to_ascii_lowercase());
            }
        }
        filters
    }
}

impl CommandExecutor {
    pub fn new(config: &AppConfig, format: OutputFormat) -> Result<Self> {
        let state_path = config.state_path()?;
        debug!(path = %state_path.display(), "Using state file");
        let store = Arc::new(FileStore::open(state_path));
        let aggregator = Aggregator::new(store, &config.client_config())?;
        Ok(Self {
            aggregator,
            output: OutputManager::new(config.colored, format),
            format,
        })
    }

    fn print(&self, text: &str) {
        if text.ends_with('\n') {
            print!("{text}");
        } else {
            println!("{text}");
        }
    }

    /// Shows a spinner while `future` runs, pretty output only.
    async fn with_spinner<T>(&self, message: &str, future: impl Future<Output = T>) -> T {
        if self.format.is_json() {
            return future.await;
        }
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
            pb.set_style(style);
        }
        pb.enable_steady_tick(Duration::from_millis(120));
        pb.set_message(message.to_string());
        let result = future.await;
        pb.finish_and_clear();
        result
    }

    fn print_fetched<T, F>(&self, fetched: &Fetched<T>, pretty: F) -> Result<()>
    where
        T: serde::Serialize,
        F: FnOnce(&OutputManager, &T) -> String,
    {
        let text = self.output.render(fetched, |out| {
            let mut text = out.advisories(&fetched.advisories);
            text.push_str(&pretty(out, &fetched.data));
            text
        })?;
        self.print(&text);
        Ok(())
    }

    fn video_id(input: &str) -> Result<String> {
        extract_video_id(input)
            .ok_or_else(|| AppError::InvalidInput(format!("`{input}` is not a video id or URL")))
    }

    pub async fn search(&self, args: SearchArgs) -> Result<()> {
        let filters = args.filters();
        let fetched = self
            .with_spinner(
                "Searching...",
                self.aggregator.search(&args.query, args.page, &filters),
            )
            .await?;
        let now = Utc::now();
        self.print_fetched(&fetched, |out, videos| out.video_list(videos, now))
    }

    pub async fn trending(&self, region: Option<&str>, category: Option<&str>) -> Result<()> {
        let fetched = self
            .with_spinner(
                "Fetching trending videos...",
                self.aggregator.trending(region, category),
            )
            .await?;
        let now = Utc::now();
        self.print_fetched(&fetched, |out, videos| out.video_list(videos, now))
    }

    pub async fn video(&self, input: &str) -> Result<()> {
        let id = Self::video_id(input)?;
        let fetched = self
            .with_spinner("Fetching video...", self.aggregator.video_details(&id))
            .await?;
        let now = Utc::now();
        self.print_fetched(&fetched, |out, details| out.video_details(details, now))
    }

    pub async fn channel(&self, id: &str) -> Result<()> {
        let fetched = self
            .with_spinner("Fetching channel...", self.aggregator.channel(id))
            .await?;
        self.print_fetched(&fetched, |out, channel| out.channel(channel))
    }

    pub async fn stream(&self, input: &str) -> Result<()> {
        let id = Self::video_id(input)?;
        let fetched = self
            .with_spinner("Resolving stream...", self.aggregator.stream_url(&id))
            .await?;
        self.print_fetched(&fetched, |_, url| url.clone())
    }

    pub fn embed(&self, input: &str) -> Result<()> {
        let id = Self::video_id(input)?;
        let value = json!({
            "id": id,
            "source": self.aggregator.prefs().source_preference(),
            "embed_url": self.aggregator.embed_url(&id),
            "watch_url": self.aggregator.watch_url(&id),
        });
        let text = self.output.render(&value, |out| {
            out.pairs(&[
                ("Embed", self.aggregator.embed_url(&id)),
                ("Watch", self.aggregator.watch_url(&id)),
            ])
        })?;
        self.print(&text);
        Ok(())
    }

    pub async fn instances(&self, action: InstanceAction) -> Result<()> {
        let pool = self.aggregator.pool();
        match action {
            InstanceAction::List => {
                let current = pool.current();
                let value = json!({ "current": current, "instances": pool.instances() });
                let text = self
                    .output
                    .render(&value, |out| out.instance_list(pool.instances(), &current))?;
                self.print(&text);
            }
            InstanceAction::Check => {
                let status = self
                    .with_spinner("Checking mirror health...", self.aggregator.check_mirror_status())
                    .await;
                if !status.healthy {
                    warn!(instance = %status.instance, "No healthy mirror instance found");
                }
                let text = self.output.render(&status, |out| {
                    out.pairs(&[
                        ("Instance", status.instance.clone()),
                        ("Healthy", status.healthy.to_string()),
                    ])
                })?;
                self.print(&text);
            }
            InstanceAction::Refresh => {
                let previous = pool.current();
                let next = pool.reassign();
                let value = json!({ "previous": previous, "current": next });
                let text = self.output.render(&value, |out| {
                    out.success(&format!("Switched from {previous} to {next}"))
                })?;
                self.print(&text);
            }
            InstanceAction::Select { url } => {
                pool.set_instance(&url)?;
                let current = pool.current();
                let value = json!({ "current": current });
                let text = self
                    .output
                    .render(&value, |out| out.success(&format!("Using {current}")))?;
                self.print(&text);
            }
        }
        Ok(())
    }

    pub fn history(&self, clear: bool) -> Result<()> {
        let prefs = self.aggregator.prefs();
        if clear {
            prefs.clear_search_history();
        }
        let history = prefs.search_history();
        let text = self
            .output
            .render(&history, |out| out.numbered(&history, "No search history."))?;
        self.print(&text);
        Ok(())
    }

    pub fn cache(&self) -> Result<()> {
        let cached = self.aggregator.prefs().cached_videos().unwrap_or_default();
        let now = Utc::now();
        let text = self
            .output
            .render(&cached, |out| out.video_list(&cached, now))?;
        self.print(&text);
        Ok(())
    }

    pub fn key(&self, action: KeyAction) -> Result<()> {
        let prefs = self.aggregator.prefs();
        let message = match action {
            KeyAction::Set { key } => {
                let key = key.trim();
                if !is_valid_api_key(key) {
                    return Err(AppError::InvalidInput(
                        "API key should start with `AIza` followed by 35 characters".into(),
                    ));
                }
                prefs.set_api_key(key);
                "API key saved"
            }
            KeyAction::Clear => {
                prefs.clear_api_key();
                "API key removed"
            }
            KeyAction::Status => {
                if prefs.api_key().is_some() {
                    "API key is stored"
                } else {
                    "No API key stored"
                }
            }
        };
        let value = json!({ "has_key": prefs.api_key().is_some(), "message": message });
        let text = self.output.render(&value, |out| out.success(message))?;
        self.print(&text);
        Ok(())
    }

    pub fn source(&self, source: Option<SourceKind>) -> Result<()> {
        let prefs = self.aggregator.prefs();
        if let Some(source) = source {
            if source == SourceKind::Primary && prefs.api_key().is_none() {
                warn!("No API key stored; requests will fall back to the mirror pool");
            }
            prefs.set_source_preference(source);
        }
        let current = prefs.source_preference();
        let text = self
            .output
            .render(&json!({ "source": current }), |out| {
                out.pairs(&[("Source", current.to_string())])
            })?;
        self.print(&text);
        Ok(())
    }

    pub fn settings(
        &self,
        region: Option<String>,
        max_results: Option<u32>,
        theme: Option<String>,
    ) -> Result<()> {
        let prefs = self.aggregator.prefs();
        let mut settings = prefs.settings();
        let changed = region.is_some() || max_results.is_some() || theme.is_some();
        if let Some(region) = region {
            settings.region_code = region.trim().to_ascii_uppercase();
        }
        if let Some(max_results) = max_results {
            settings.max_results = max_results;
        }
        if let Some(theme) = theme {
            settings.theme = theme;
        }
        if changed {
            prefs.set_settings(&settings);
        }
        let text = self.output.render(&settings, |out| settings_pairs(out, &settings))?;
        self.print(&text);
        Ok(())
    }

    pub fn reset(&self, videos_only: bool) -> Result<()> {
        let prefs = self.aggregator.prefs();
        let message = if videos_only {
            prefs.clear_video_data();
            "Cleared cached results and search history"
        } else {
            prefs.clear_all();
            "Cleared all stored data"
        };
        let text = self
            .output
            .render(&json!({ "message": message }), |out| out.success(message))?;
        self.print(&text);
        Ok(())
    }
}

fn settings_pairs(out: &OutputManager, settings: &Settings) -> String {
    out.pairs(&[
        ("Region", settings.region_code.clone()),
        ("Max results", settings.max_results.to_string()),
        ("Theme", settings.theme.clone()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_flags_add_no_filters() {
        let args = SearchArgs {
            query: "q".into(),
            page: 1,
            sort: Some("Views".into()),
            date: Some("any".into()),
            duration: None,
            result_type: Some("all".into()),
        };
        let filters = args.filters();
        assert_eq!(filters.get(Facet::SortOrder), Some("views"));
        assert_eq!(filters.iter().count(), 1);
    }
}
