use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const SETTINGS_FILE: &str = "user_settings.json";

pub fn cardwise_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".cardwise"))
}

pub fn ensure_cardwise_home() -> Result<PathBuf> {
    let dir = cardwise_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

/// User settings for the summary: `--settings` when given, else
/// `./user_settings.json` when present, else `~/.cardwise/user_settings.json`.
pub fn settings_path(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path);
    }
    Ok(pick_settings_path(Path::new(SETTINGS_FILE), &cardwise_home()?))
}

fn pick_settings_path(local: &Path, home: &Path) -> PathBuf {
    if local.exists() {
        local.to_path_buf()
    } else {
        home.join(SETTINGS_FILE)
    }
}
