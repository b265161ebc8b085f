mod cli;
mod commands;
mod config;

use clap::Parser;
use notice_logging::notice_info;

use crate::cli::Cli;
use crate::config::AppConfig;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = AppConfig::load(&cli.config)?;
    cli.apply_overrides(&mut config);

    notice_logging::initialize(
        config.log_target.into(),
        config.level_filter()?,
        config.log_file.as_deref(),
    );
    notice_info!("Using config {}", cli.config.display());

    commands::run(cli.command, &config, &cli.config)
}
