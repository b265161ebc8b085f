use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{AppConfig, LogTarget, DEFAULT_CONFIG_FILE};

#[derive(Debug, Parser)]
#[command(
    name = "notice_harvester",
    about = "Fetch event notification reports and turn them into structured records"
)]
pub struct Cli {
    /// RON config file; missing file means defaults
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Directory receiving exported JSON
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Newline-separated canonical CFR list replacing the built-in one
    #[arg(long)]
    pub cfr_list: Option<PathBuf>,

    /// Jobs allowed to run at once
    #[arg(long)]
    pub max_jobs: Option<usize>,

    #[arg(long, value_enum)]
    pub log_target: Option<LogTarget>,

    /// trace, debug, info, warn, error or off
    #[arg(long)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Resolve locators (HTML, PDF, package or digest anchor) to plain text
    Resolve {
        #[arg(required = true)]
        locators: Vec<String>,
        /// Print the text instead of exporting it
        #[arg(long)]
        print: bool,
    },
    /// Parse every record of one or more digest pages and export them
    Digest {
        #[arg(required = true)]
        pages: Vec<String>,
        /// Label used for the export file name
        #[arg(long)]
        label: Option<String>,
    },
    /// Parse a single record addressed as `<digest page>#enNNNNN` and print it as JSON
    Record { locator: String },
    /// List a yearly Part 21 page, optionally resolving every linked report
    Part21 {
        listing: String,
        #[arg(long)]
        resolve: bool,
    },
    /// Parse a document search result file or URL and print its rows as JSON
    Search { locator: String },
    /// Write the effective configuration to the config path
    WriteConfig,
}

impl Cli {
    /// Flags take precedence over the file.
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(path) = &self.cfr_list {
            config.cfr_list = Some(path.clone());
        }
        if let Some(max_jobs) = self.max_jobs {
            config.max_jobs = max_jobs;
        }
        if let Some(target) = self.log_target {
            config.log_target = target;
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
    }
}
