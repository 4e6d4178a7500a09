//! iconsplit - split SVG sprite sheets into standalone icons.

mod batch;
mod cli;
mod config;
mod core;
mod icon;
mod logger;
mod svg;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::Config;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.is_verbose());

    let config = Config::load(&cli)?;
    if let Some(path) = &config.config_path {
        debug!("config"; "loaded {}", path.display());
    }

    match &cli.command {
        Commands::Extract { args } => cli::extract::extract_icons(args, &config).map(|_| ()),
        Commands::List => cli::store::list_icons(&config),
        Commands::Remove { ids } => cli::store::remove_icons(ids, &config),
    }
}
