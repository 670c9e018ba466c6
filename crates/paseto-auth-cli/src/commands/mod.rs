//! CLI command implementations.

pub mod keys;
pub mod token;

use anyhow::Context;
use paseto_auth_core::PasetoConfig;
use paseto_auth_token::Settings;
use std::fs;
use std::path::{Path, PathBuf};

/// Build settings from a config file, or from a bare secret.
///
/// The secret string can be:
/// - A path to a file containing the secret
/// - The secret itself (e.g., from the PASETO_SECRET_KEY env var)
pub(crate) fn load_settings(
    config: Option<&Path>,
    secret: Option<String>,
) -> anyhow::Result<Settings> {
    if let Some(path) = config {
        let config = PasetoConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?;
        return Settings::from_config(&config).context("Invalid token configuration");
    }

    let secret = secret.context(
        "Secret not provided. Either pass --secret, --config <path>, or set PASETO_SECRET_KEY",
    )?;
    let secret = read_if_file(secret)?;
    Settings::new(&secret).context("Invalid secret. Expected exactly 32 bytes")
}

/// If `value` names an existing file, return its contents without the trailing newline.
pub(crate) fn read_if_file(value: String) -> anyhow::Result<String> {
    let path = PathBuf::from(&value);
    if path.is_file() {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        return Ok(content.trim_end_matches(['\r', '\n']).to_string());
    }
    Ok(value)
}
