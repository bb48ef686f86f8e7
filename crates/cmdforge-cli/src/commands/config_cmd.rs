//! `config show|reset|setup`: `setup` stays a stub, `show`/`reset` are real
//! so `config.json` persistence has something exercising it.

use std::path::Path;

use crate::config;
use crate::config::AppConfig;

pub fn show(config_path: &Path) -> anyhow::Result<()> {
    let loaded = config::load(config_path)?;
    let pretty = serde_json::to_string_pretty(&loaded)?;
    println!("{pretty}");
    Ok(())
}

pub fn reset(config_path: &Path) -> anyhow::Result<()> {
    config::save(config_path, &AppConfig::default())?;
    println!("wrote defaults to {}", config_path.display());
    Ok(())
}

pub fn setup() -> anyhow::Result<()> {
    eprintln!("interactive setup is not implemented in this build");
    std::process::exit(1);
}
