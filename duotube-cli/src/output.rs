#[cfg(feature = "colored-output")]
use colored::*;
use chrono::{DateTime, Utc};
use duotube::aggregator::Advisory;
use duotube::{CanonicalVideo, ChannelInfo, RecommendedVideo, VideoDetails};
use serde::Serialize;

use crate::{cli::OutputFormat, error::Result};

pub struct OutputManager {
    colored: bool,
    format: OutputFormat,
}

impl OutputManager {
    pub fn new(colored: bool, format: OutputFormat) -> Self {
        Self { colored, format }
    }

    /// JSON formats serialize `value`; pretty output is produced by `pretty`.
    pub fn render<T, F>(&self, value: &T, pretty: F) -> Result<String>
    where
        T: Serialize + ?Sized,
        F: FnOnce(&Self) -> String,
    {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::JsonCompact => Ok(serde_json::to_string(value)?),
            OutputFormat::Pretty => Ok(pretty(self)),
        }
    }

    pub fn advisories(&self, advisories: &[Advisory]) -> String {
        advisories
            .iter()
            .map(|a| format!("{} {a}\n", self.colorize("Note:", &Color::Yellow, true)))
            .collect()
    }

    pub fn video_list(&self, videos: &[CanonicalVideo], now: DateTime<Utc>) -> String {
        if videos.is_empty() {
            return "No videos found.\n".to_string();
        }
        videos
            .iter()
            .enumerate()
            .map(|(index, video)| {
                self.video_row(
                    index,
                    &video.title,
                    &video.id,
                    &[
                        video.views_label(),
                        video.published_label(now),
                        video.duration.clone().unwrap_or_else(|| "-".to_string()),
                    ],
                    &video.channel_title,
                )
            })
            .collect()
    }

    fn recommended_list(&self, videos: &[RecommendedVideo], now: DateTime<Utc>) -> String {
        videos
            .iter()
            .enumerate()
            .map(|(index, video)| {
                let mut meta = vec![video.views_label()];
                let published = video.published_label(now);
                if !published.is_empty() {
                    meta.push(published);
                }
                meta.push(video.duration.clone().unwrap_or_else(|| "-".to_string()));
                self.video_row(index, &video.title, &video.id, &meta, &video.channel_title)
            })
            .collect()
    }

    fn video_row(
        &self,
        index: usize,
        title: &str,
        id: &str,
        meta: &[String],
        channel: &str,
    ) -> String {
        format!(
            "{:>3}. {}\n     {} | {}\n     {}\n",
            index + 1,
            self.colorize(title, &Color::Green, true),
            self.colorize(channel, &Color::Cyan, false),
            meta.join(" | "),
            self.colorize(id, &Color::Blue, false)
        )
    }

    pub fn video_details(&self, details: &VideoDetails, now: DateTime<Utc>) -> String {
        let video = &details.video;
        let mut output = String::new();
        output.push_str(&self.colorize(&video.title, &Color::Green, true));
        output.push('\n');

        let mut field = |name: &str, value: &str| {
            output.push_str(&format!(
                "  {}: {}\n",
                self.colorize(name, &Color::Yellow, false),
                self.colorize(value, &Color::Cyan, false)
            ));
        };
        field("Id", &video.id);
        field("Channel", &format!("{} ({})", video.channel_title, video.channel_id));
        field("Views", &video.views_label());
        if let Some(likes) = &video.like_count {
            field("Likes", &likes.display_with("likes"));
        }
        field("Published", &video.published_label(now));
        field("Duration", video.duration.as_deref().unwrap_or("-"));
        field("Source", video.source.as_str());
        if !details.keywords.is_empty() {
            field("Keywords", &details.keywords.join(", "));
        }
        if !details.format_streams.is_empty() {
            let streams: Vec<&str> = details
                .format_streams
                .iter()
                .map(|s| s.resolution.as_deref().unwrap_or(s.quality.as_str()))
                .collect();
            field("Streams", &streams.join(", "));
        }

        if !video.description.trim().is_empty() {
            output.push('\n');
            output.push_str(video.description.trim());
            output.push('\n');
        }

        if !details.recommended.is_empty() {
            output.push('\n');
            output.push_str(&self.colorize("Recommended:", &Color::Green, true));
            output.push('\n');
            output.push_str(&self.recommended_list(&details.recommended, now));
        }
        output
    }

    pub fn channel(&self, channel: &ChannelInfo) -> String {
        let mut output = String::new();
        output.push_str(&self.colorize(&channel.name, &Color::Green, true));
        output.push('\n');
        output.push_str(&format!(
            "  {}: {}\n",
            self.colorize("Id", &Color::Yellow, false),
            channel.id
        ));
        output.push_str(&format!(
            "  {}: {}\n",
            self.colorize("Subscribers", &Color::Yellow, false),
            channel.subscriber_count.display_with("subscribers")
        ));
        if let Some(count) = &channel.video_count {
            output.push_str(&format!(
                "  {}: {}\n",
                self.colorize("Videos", &Color::Yellow, false),
                count.display_with("videos")
            ));
        }
        if let Some(avatar) = &channel.avatar_url {
            output.push_str(&format!(
                "  {}: {}\n",
                self.colorize("Avatar", &Color::Yellow, false),
                self.colorize(avatar, &Color::Blue, false)
            ));
        }
        if !channel.description.trim().is_empty() {
            output.push('\n');
            output.push_str(channel.description.trim());
            output.push('\n');
        }
        output
    }

    /// `label: value` lines.
    pub fn pairs(&self, pairs: &[(&str, String)]) -> String {
        pairs
            .iter()
            .map(|(label, value)| {
                format!(
                    "{}: {}\n",
                    self.colorize(label, &Color::Yellow, false),
                    self.colorize(value, &Color::Cyan, false)
                )
            })
            .collect()
    }

    pub fn instance_list(&self, instances: &[String], current: &str) -> String {
        instances
            .iter()
            .map(|instance| {
                if instance == current {
                    format!("* {}\n", self.colorize(instance, &Color::Green, true))
                } else {
                    format!("  {instance}\n")
                }
            })
            .collect()
    }

    pub fn numbered(&self, items: &[String], empty: &str) -> String {
        if items.is_empty() {
            return format!("{empty}\n");
        }
        items
            .iter()
            .enumerate()
            .map(|(i, item)| format!("{:>3}. {item}\n", i + 1))
            .collect()
    }

    pub fn success(&self, message: &str) -> String {
        format!("{} {message}", self.colorize("✓", &Color::Green, true))
    }

    fn colorize(&self, text: &str, color: &Color, bold: bool) -> String {
        #[cfg(feature = "colored-output")]
        {
            if self.colored {
                let colored_text = match color {
                    Color::Green => text.green(),
                    Color::Yellow => text.yellow(),
                    Color::Blue => text.blue(),
                    Color::Cyan => text.cyan(),
                };
                if bold {
                    colored_text.bold().to_string()
                } else {
                    colored_text.to_string()
                }
            } else {
                text.to_string()
            }
        }

        #[cfg(not(feature = "colored-output"))]
        {
            let _ = (color, bold, self.colored);
            text.to_string()
        }
    }
}

enum Color {
    Green,
    Yellow,
    Blue,
    Cyan,
}
