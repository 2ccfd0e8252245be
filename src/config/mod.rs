mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    apply_env_overrides(&mut config);
    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./importforged.toml",
        "./config.toml",
        "~/.config/importforged/config.toml",
        "/etc/importforged/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    let mut config = Config::default();
    apply_env_overrides(&mut config);
    validate_config(&config)?;
    Ok(config)
}

/// Overlay credentials and endpoints from the process environment
pub fn apply_env_overrides(config: &mut Config) {
    apply_overrides_from(config, |key| std::env::var(key).ok());
}

fn apply_overrides_from<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let targets: [(&str, &mut String); 5] = [
        ("IMPORTFORGED_JELLYFIN_URL", &mut config.jellyfin.url),
        ("IMPORTFORGED_JELLYFIN_API_KEY", &mut config.jellyfin.api_key),
        ("IMPORTFORGED_JELLYFIN_USER_ID", &mut config.jellyfin.user_id),
        ("IMPORTFORGED_BAZARR_URL", &mut config.bazarr.url),
        ("IMPORTFORGED_BAZARR_API_KEY", &mut config.bazarr.api_key),
    ];

    for (key, slot) in targets {
        if let Some(value) = lookup(key).filter(|v| !v.trim().is_empty()) {
            tracing::debug!("Config value overridden from {}", key);
            *slot = value;
        }
    }
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.http.max_attempts == 0 {
        anyhow::bail!("http.max_attempts must be at least 1");
    }

    if config.sync.max_attempts == 0 {
        anyhow::bail!("sync.max_attempts must be at least 1");
    }

    let subs = &config.subtitles;
    if subs.target_language.trim().is_empty() {
        anyhow::bail!("subtitles.target_language cannot be empty");
    }
    if subs.language_tag.trim().is_empty() {
        anyhow::bail!("subtitles.language_tag cannot be empty");
    }
    if subs.archive_suffix.is_empty() || subs.archive_suffix.contains(['/', '\\']) {
        anyhow::bail!(
            "subtitles.archive_suffix must be a plain file suffix, got {:?}",
            subs.archive_suffix
        );
    }
    for ext in &subs.extensions {
        if ext.parse::<importforged_common::SubtitleExtension>().is_err() {
            anyhow::bail!("Unsupported subtitle extension in config: {}", ext);
        }
    }

    // Missing credentials only turn the integration off.
    if !config.jellyfin.is_configured() {
        tracing::warn!("Jellyfin URL/API key not configured, library tasks will be skipped");
    } else if config.jellyfin.user_id.trim().is_empty() {
        tracing::warn!("Jellyfin user_id not configured, sync polling will be skipped");
    }

    Ok(())
}
