use anyhow::Result;
use clap::{Parser, Subcommand};
use pishkhan_core::config;
use std::path::PathBuf;

mod commands;


/// Top-level CLI for the pishkhan archive crawler.
#[derive(Debug, Parser)]
#[command(name = "pishkhan")]
#[command(about = "Resumable downloader for pishkhan.com newspaper PDF editions", long_about = None)]
pub struct Cli {
    /// Explicit config file (defaults to the XDG location).
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Crawl the configured date range and publications.
    Run {
        /// Override the configured start date (8-digit Jalali, e.g. 14040101).
        #[arg(long)]
        start: Option<String>,

        /// Override the configured end date (inclusive).
        #[arg(long)]
        end: Option<String>,
    },

    /// Summarize the status ledger.
    Status,

    /// Flip failed ledger entries back to pending so the next run retries them.
    ResetFailed,
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        let cfg = match &cli.config {
            Some(path) => config::load_from_path(path)?,
            None => config::load_or_init()?,
        };
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Run { start, end } => commands::run_crawl(cfg, start, end),
            CliCommand::Status => commands::run_status(&cfg),
            CliCommand::ResetFailed => commands::run_reset_failed(&cfg),
        }
    }
}
