use std::fs::{self, OpenOptions};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::paths::log_file_path;

const LOG_ENV: &str = "ANIME_SEDAI_LOG";

/// Logs go to a file because the TUI owns the terminal. Failing to set up
/// the log file leaves logging disabled.
pub fn init() {
    let Ok(path) = log_file_path() else {
        return;
    };
    if let Some(parent) = path.parent()
        && fs::create_dir_all(parent).is_err()
    {
        return;
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init();
}
