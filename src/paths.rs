use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

const APP_DIR: &str = "anime-sedai";

pub fn data_dir() -> Result<PathBuf> {
    let base = dirs::data_dir().context("unable to resolve data directory")?;
    Ok(base.join(APP_DIR))
}

pub fn database_file_path() -> Result<PathBuf> {
    Ok(data_dir()?.join("state.db"))
}

pub fn log_file_path() -> Result<PathBuf> {
    Ok(data_dir()?.join("anime-sedai.log"))
}

pub fn config_file_path() -> PathBuf {
    if let Ok(path) = env::var("ANIME_SEDAI_CONFIG") {
        return PathBuf::from(path);
    }

    match dirs::config_dir() {
        Some(base) => base.join(APP_DIR).join("config.toml"),
        None => Path::new("anime-sedai.toml").to_path_buf(),
    }
}

/// Where exported images land unless the config names a directory.
pub fn default_download_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(|| env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}
