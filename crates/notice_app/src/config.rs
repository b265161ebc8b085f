use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use log::LevelFilter;
use notice_core::{builtin_cfr_set, CanonicalCfrSet};
use notice_engine::{EngineConfig, FetchSettings, DEFAULT_USER_AGENT};
use notice_logging::{notice_info, LogDestination};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILE: &str = "notice_harvester.ron";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
pub enum LogTarget {
    File,
    #[default]
    Terminal,
    Both,
}

impl From<LogTarget> for LogDestination {
    fn from(target: LogTarget) -> Self {
        match target {
            LogTarget::File => LogDestination::File,
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::Both => LogDestination::Both,
        }
    }
}

/// Settings read from the RON config file. Every field has a default, so a
/// partial file (or none at all) is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub redirect_limit: usize,
    pub max_bytes: u64,
    pub allowed_content_types: Vec<String>,
    pub user_agent: String,
    pub package_fetch_concurrency: usize,
    pub max_jobs: usize,
    pub output_dir: PathBuf,
    /// Newline-separated canonical CFR list replacing the built-in one.
    pub cfr_list: Option<PathBuf>,
    pub log_target: LogTarget,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let fetch = FetchSettings::default();
        Self {
            connect_timeout_secs: fetch.connect_timeout.as_secs(),
            request_timeout_secs: fetch.request_timeout.as_secs(),
            redirect_limit: fetch.redirect_limit,
            max_bytes: fetch.max_bytes,
            allowed_content_types: fetch.allowed_content_types,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            package_fetch_concurrency: fetch.max_concurrent_fetches,
            max_jobs: 4,
            output_dir: PathBuf::from("output"),
            cfr_list: None,
            log_target: LogTarget::Terminal,
            log_level: "info".to_string(),
            log_file: None,
        }
    }
}

impl AppConfig {
    /// Missing file means defaults; a malformed one is an error.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(err).with_context(|| format!("reading config {}", path.display()))
            }
        };
        ron::from_str(&content).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let pretty = ron::ser::PrettyConfig::new();
        let content = ron::ser::to_string_pretty(self, pretty).context("serializing config")?;
        fs::write(path, content).with_context(|| format!("writing config {}", path.display()))
    }

    /// Runs before the logger exists, so a bad level is an error, not a warning.
    pub fn level_filter(&self) -> anyhow::Result<LevelFilter> {
        self.log_level
            .parse()
            .with_context(|| format!("unknown log level {:?}", self.log_level))
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            redirect_limit: self.redirect_limit,
            max_bytes: self.max_bytes,
            allowed_content_types: self.allowed_content_types.clone(),
            user_agent: self.user_agent.clone(),
            max_concurrent_fetches: self.package_fetch_concurrency,
        }
    }

    pub fn cfr_set(&self) -> anyhow::Result<Arc<CanonicalCfrSet>> {
        match &self.cfr_list {
            None => Ok(builtin_cfr_set()),
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("reading CFR list {}", path.display()))?;
                let set = CanonicalCfrSet::from_list(&text);
                anyhow::ensure!(!set.is_empty(), "CFR list {} is empty", path.display());
                notice_info!("Loaded {} canonical CFR codes from {}", set.len(), path.display());
                Ok(Arc::new(set))
            }
        }
    }

    pub fn engine_config(&self) -> anyhow::Result<EngineConfig> {
        Ok(EngineConfig {
            fetch: self.fetch_settings(),
            max_jobs: self.max_jobs,
            cfr_set: self.cfr_set()?,
        })
    }
}
