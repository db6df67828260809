mod client;
mod commands;
mod config;
mod error;
mod models;
mod notifier;
mod scheduler;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tracing::error;

/// Nibblefibble: book tomorrow's desk on Nibol for every configured user.
///
/// Reads `conf.json` and one authorization file per user from the
/// configuration directory, books each user's desk for 09:00-18:00 and posts
/// to the configured webhook when a booking fails.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Configuration directory [default: ~/.config/nibblefibble]
    #[arg(short = 'c', long)]
    config_dir: Option<PathBuf>,

    /// Reservation endpoint
    #[arg(long, default_value = client::RESERVATION_ENDPOINT)]
    endpoint: String,

    /// How many days ahead to book (at most a year)
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(0..=366))]
    offset_days: u64,

    /// Dry run: prepare the bookings but do not send them
    #[arg(short = 'd', long)]
    debug: bool,

    /// Print API responses and rendered notifications
    #[arg(short = 'v', long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    // a missing config dir is fatal for the run but still exits with 0
    let config_dir = match resolve_config_dir(cli.config_dir) {
        Ok(dir) => dir,
        Err(e) => {
            error!("{:#}", e);
            return Ok(());
        }
    };

    let today = Local::now().date_naive();
    commands::run_bookings(
        &config_dir,
        &cli.endpoint,
        today,
        cli.offset_days,
        cli.debug,
    )
    .await;

    Ok(())
}

fn resolve_config_dir(flag: Option<PathBuf>) -> Result<PathBuf> {
    match flag {
        Some(dir) => Ok(dir),
        None => config::default_config_dir()
            .context("Could not determine home directory, use --config-dir"),
    }
}
