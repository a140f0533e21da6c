//! Tracing setup for the CLI.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn open_log_file() -> Option<(PathBuf, fs::File)> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("pishkhan").ok()?;
    let dir = xdg_dirs.get_state_home();
    fs::create_dir_all(&dir).ok()?;
    let path = dir.join("pishkhan.log");
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .ok()?;
    Some((path, file))
}

/// Install the global subscriber. Events go to
/// `~/.local/state/pishkhan/pishkhan.log`; when the state dir cannot be
/// opened the subscriber writes to stderr instead, so the CLI always comes
/// up. Filter from `RUST_LOG`, defaulting to info with crate-level debug.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,pishkhan=debug"));
    let (path, file) = match open_log_file() {
        Some((path, file)) => (Some(path), Some(file)),
        None => (None, None),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(move || -> Box<dyn Write + Send> {
            match file.as_ref().and_then(|f| f.try_clone().ok()) {
                Some(clone) => Box::new(clone),
                None => Box::new(io::stderr()),
            }
        })
        .with_ansi(false)
        .init();

    match path {
        Some(path) => tracing::info!("logging to {}", path.display()),
        None => tracing::warn!("state dir unavailable, logging to stderr"),
    }
}
