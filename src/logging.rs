use std::fs::OpenOptions;
use std::path::Path;

use anyhow::{Context, Result};
use env_logger::{Env, Target};

/// Sends log output to `path` so it does not draw over the terminal UI.
/// Filtering follows `RUST_LOG`, defaulting to `info`.
pub fn init_file(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))?;
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .format_timestamp_secs()
        .try_init()
        .context("install logger")?;
    Ok(())
}

pub fn init_stderr() {
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or("warn")).try_init();
}
