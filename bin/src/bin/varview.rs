use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use varview::Config;
use varview_bin::{
    cli::{Cli, Command},
    commands,
};
use varview_log::LogConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = varview_log::init(LogConfig {
        log_file_path: cli.log_file.clone(),
    })
    .map_err(|err| anyhow::anyhow!(err))
    .context("Failed to initialize logging")?;

    let discovered = discover_config();
    let config = Config::load_with_overrides(cli.config.as_deref(), discovered.as_deref())?;

    let output = match &cli.command {
        Command::Css { tree } => commands::css::run(&config, tree)?,
        Command::Tree { tree } => commands::tree::run(&config, tree)?,
        Command::Predicates { tree } => commands::predicates::run(&config, tree)?,
    };
    print!("{output}");
    Ok(())
}

/// `<config_dir>/varview/config.toml`, if present.
fn discover_config() -> Option<PathBuf> {
    let path = dirs::config_dir()?.join("varview").join("config.toml");
    path.is_file().then_some(path)
}
