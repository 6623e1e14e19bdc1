use std::path::{Path, PathBuf};
use std::time::Duration;

use duotube::ClientConfig;
use duotube::config::{DEFAULT_INSTANCES, DEFAULT_PROBE_VIDEO_ID};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AppError, Result};

const APP_DIR: &str = "duotube";
const CONFIG_FILE: &str = "config.toml";
const STATE_FILE: &str = "state.json";

/// On-disk CLI configuration. User state (API key, preferences, history)
/// lives in the separate state file, not here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Mirror allow-list
    pub instances: Vec<String>,

    /// Video id used for mirror health checks
    pub probe_video_id: String,

    /// State file; defaults to the platform data directory
    pub state_file: Option<PathBuf>,

    /// Colored terminal output
    pub colored: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            instances: DEFAULT_INSTANCES.iter().map(|s| s.to_string()).collect(),
            probe_video_id: DEFAULT_PROBE_VIDEO_ID.to_string(),
            state_file: None,
            colored: true,
        }
    }
}

impl AppConfig {
    pub fn default_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
            .ok_or_else(|| AppError::Config("no configuration directory on this platform".into()))
    }

    fn resolve(path: Option<&Path>) -> Result<PathBuf> {
        match path {
            Some(path) => Ok(path.to_path_buf()),
            None => Self::default_path(),
        }
    }

    /// Loads the configuration, writing defaults first when the file does not exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = Self::resolve(path)?;
        if !path.exists() {
            debug!(path = %path.display(), "Creating default configuration");
            let config = Self::default();
            config.save(&path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(&path)?;
        let config: Self = toml::from_str(&content)?;
        if config.instances.is_empty() {
            return Err(AppError::Config(format!(
                "{}: `instances` must list at least one mirror",
                path.display()
            )));
        }
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.show()?)?;
        Ok(())
    }

    pub fn reset(path: Option<&Path>) -> Result<()> {
        let path = Self::resolve(path)?;
        Self::default().save(&path)
    }

    pub fn show(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn state_path(&self) -> Result<PathBuf> {
        match &self.state_file {
            Some(path) => Ok(path.clone()),
            None => dirs::data_dir()
                .map(|dir| dir.join(APP_DIR).join(STATE_FILE))
                .ok_or_else(|| AppError::Config("no data directory on this platform".into())),
        }
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::default()
            .with_instances(self.instances.iter().cloned())
            .with_timeout(Duration::from_secs(self.timeout_secs))
            .with_probe_video_id(self.probe_video_id.clone())
    }
}
