//! Persisted-state layout: one directory, OS-resolved via `dirs`,
//! holding `config.json`, `credentials.enc`, and `audit.log`.

use std::path::PathBuf;

use anyhow::Context;

const APP_NAME: &str = "cmdforge";

pub fn config_dir() -> anyhow::Result<PathBuf> {
    let base = dirs::config_dir().context("could not resolve an OS config directory")?;
    Ok(base.join(APP_NAME))
}

pub fn config_file(dir: &std::path::Path) -> PathBuf {
    dir.join("config.json")
}

pub fn credentials_file(dir: &std::path::Path) -> PathBuf {
    dir.join("credentials.enc")
}

pub fn audit_file(dir: &std::path::Path) -> PathBuf {
    dir.join("audit.log")
}
