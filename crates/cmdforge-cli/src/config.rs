//! `config.json`: `default_provider`, `providers`, `user_preferences`,
//! `update_settings`. Unknown fields in an on-disk document are tolerated on
//! read; a missing file loads the default document.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use anyhow::Context as _;
use cmdforge_core::model::ProviderConfig;
use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct UserPreferences {
    #[serde(default)]
    pub skip_confirmation: bool,
    #[serde(default)]
    pub validate_results: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpdateSettings {
    #[serde(default)]
    pub auto_check: bool,
    #[serde(default = "default_channel")]
    pub channel: String,
}

fn default_channel() -> String {
    "stable".to_string()
}

impl Default for UpdateSettings {
    fn default() -> Self {
        Self {
            auto_check: false,
            channel: default_channel(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    pub default_provider: String,
    #[serde(default)]
    pub providers: BTreeMap<String, ProviderConfig>,
    #[serde(default)]
    pub user_preferences: UserPreferences,
    #[serde(default)]
    pub update_settings: UpdateSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        let mut providers = BTreeMap::new();
        providers.insert(
            "openai".to_string(),
            ProviderConfig {
                base_url: "https://api.openai.com/v1".to_string(),
                default_model: "gpt-4o-mini".to_string(),
                api_key: None,
                request_timeout: Duration::from_secs(30),
                retry_overrides: None,
            },
        );
        Self {
            default_provider: "openai".to_string(),
            providers,
            user_preferences: UserPreferences::default(),
            update_settings: UpdateSettings::default(),
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path, mode: u32) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path, _mode: u32) -> std::io::Result<()> {
    Ok(())
}

/// Loads `config.json`, merging with defaults when the file is absent.
/// Never fails on unrecognized extra keys (`serde`'s default behavior with
/// no `deny_unknown_fields`).
pub fn load(path: &Path) -> anyhow::Result<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let config: AppConfig = serde_json::from_slice(&bytes).with_context(|| format!("parsing {}", path.display()))?;
    Ok(config)
}

/// Writes `config.json` at mode 0600, creating the parent directory if
/// needed.
pub fn save(path: &Path, config: &AppConfig) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    let json = serde_json::to_vec_pretty(config).context("serializing config")?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    restrict_permissions(path, 0o600).with_context(|| format!("restricting permissions on {}", path.display()))?;
    Ok(())
}
