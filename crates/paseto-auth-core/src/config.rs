//! Token configuration.
//!
//! Loaded from a YAML file such as:
//!
//! ```yaml
//! secret_key_env: PASETO_SECRET_KEY
//! issuer: svc-a
//! audience: svc-b
//! default_lifetime: 15m
//! clock_skew: 30s
//! refresh_tokens: true
//! ```
//!
//! Durations use humantime syntax (`"90s"`, `"15m"`, `"1h 30m"`).

use crate::defaults::{BEARER_SCHEME, SECRET_KEY_ENV};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for issuing and verifying tokens.
#[derive(Clone, Serialize, Deserialize)]
pub struct PasetoConfig {
    /// Environment variable containing the secret.
    #[serde(default = "default_secret_key_env")]
    pub secret_key_env: Option<String>,

    /// Path to a file containing the secret.
    #[serde(default)]
    pub secret_key_file: Option<PathBuf>,

    /// Inline secret. Prefer the environment variable or file outside of tests.
    #[serde(default)]
    pub secret_key: Option<String>,

    /// Default issuer for issued tokens, and the expected issuer on verification.
    #[serde(default)]
    pub issuer: Option<String>,

    /// Default audience for issued tokens, and the expected audience on verification.
    #[serde(default)]
    pub audience: Option<String>,

    /// Lifetime used when an issuance request has no expiry (e.g., "1h").
    #[serde(default = "default_lifetime")]
    pub default_lifetime: String,

    /// Tolerance applied to `exp`/`nbf` comparisons (e.g., "30s").
    #[serde(default = "default_clock_skew")]
    pub clock_skew: String,

    /// Reject tokens whose `iss` differs from the configured issuer.
    #[serde(default = "default_true")]
    pub validate_issuer: bool,

    /// Reject tokens whose `aud` differs from the configured audience.
    #[serde(default = "default_true")]
    pub validate_audience: bool,

    /// Whether issuance should also produce refresh tokens.
    #[serde(default)]
    pub refresh_tokens: bool,

    /// Scheme name attached to authenticated identities.
    #[serde(default = "default_scheme")]
    pub scheme: String,
}

impl Default for PasetoConfig {
    fn default() -> Self {
        Self {
            secret_key_env: default_secret_key_env(),
            secret_key_file: None,
            secret_key: None,
            issuer: None,
            audience: None,
            default_lifetime: default_lifetime(),
            clock_skew: default_clock_skew(),
            validate_issuer: true,
            validate_audience: true,
            refresh_tokens: false,
            scheme: default_scheme(),
        }
    }
}

impl fmt::Debug for PasetoConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasetoConfig")
            .field("secret_key_env", &self.secret_key_env)
            .field("secret_key_file", &self.secret_key_file)
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<redacted>"))
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("default_lifetime", &self.default_lifetime)
            .field("clock_skew", &self.clock_skew)
            .field("validate_issuer", &self.validate_issuer)
            .field("validate_audience", &self.validate_audience)
            .field("refresh_tokens", &self.refresh_tokens)
            .field("scheme", &self.scheme)
            .finish()
    }
}

fn default_secret_key_env() -> Option<String> {
    Some(SECRET_KEY_ENV.to_string())
}

fn default_lifetime() -> String {
    "1h".to_string()
}

fn default_clock_skew() -> String {
    "0s".to_string()
}

fn default_scheme() -> String {
    BEARER_SCHEME.to_string()
}

fn default_true() -> bool {
    true
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid duration for {field}: {reason}")]
    InvalidDuration { field: &'static str, reason: String },

    #[error("no secret key configured (checked environment, file and inline value)")]
    MissingSecret,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl PasetoConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(ConfigError::from)
    }

    /// Resolve the secret from environment, file, or inline value, in that order.
    pub fn resolve_secret(&self) -> Result<String, ConfigError> {
        if let Some(env_var) = &self.secret_key_env {
            if let Ok(key) = std::env::var(env_var) {
                return Ok(key);
            }
        }

        if let Some(path) = &self.secret_key_file {
            if path.exists() {
                let key = fs::read_to_string(path)?;
                // Only the trailing newline editors add; the secret itself may contain spaces.
                return Ok(key.trim_end_matches(['\r', '\n']).to_string());
            }
        }

        self.secret_key.clone().ok_or(ConfigError::MissingSecret)
    }

    /// Parsed default token lifetime.
    pub fn default_lifetime(&self) -> Result<Duration, ConfigError> {
        parse_duration("default_lifetime", &self.default_lifetime)
    }

    /// Parsed clock-skew tolerance.
    pub fn clock_skew(&self) -> Result<Duration, ConfigError> {
        parse_duration("clock_skew", &self.clock_skew)
    }
}

fn parse_duration(field: &'static str, value: &str) -> Result<Duration, ConfigError> {
    humantime::parse_duration(value.trim()).map_err(|e| ConfigError::InvalidDuration {
        field,
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = PasetoConfig::default();
        assert_eq!(config.default_lifetime().unwrap(), Duration::from_secs(3600));
        assert_eq!(config.clock_skew().unwrap(), Duration::ZERO);
        assert!(config.validate_issuer);
        assert!(config.validate_audience);
        assert!(!config.refresh_tokens);
        assert_eq!(config.scheme, "Bearer");
    }

    #[test]
    fn test_from_yaml() {
        let config = PasetoConfig::from_yaml(
            r#"
secret_key: "0123456789abcdef0123456789abcdef"
issuer: svc-a
audience: svc-b
default_lifetime: 15m
clock_skew: 30s
validate_audience: false
refresh_tokens: true
"#,
        )
        .unwrap();

        assert_eq!(config.issuer.as_deref(), Some("svc-a"));
        assert_eq!(config.audience.as_deref(), Some("svc-b"));
        assert_eq!(config.default_lifetime().unwrap(), Duration::from_secs(900));
        assert_eq!(config.clock_skew().unwrap(), Duration::from_secs(30));
        assert!(config.validate_issuer);
        assert!(!config.validate_audience);
        assert!(config.refresh_tokens);
    }

    #[test]
    fn test_invalid_duration() {
        let config = PasetoConfig {
            clock_skew: "soon".to_string(),
            ..PasetoConfig::default()
        };
        assert!(matches!(
            config.clock_skew(),
            Err(ConfigError::InvalidDuration { field: "clock_skew", .. })
        ));
    }

    #[test]
    fn test_resolve_secret_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "0123456789abcdef0123456789abcdef").unwrap();

        let config = PasetoConfig {
            secret_key_env: None,
            secret_key_file: Some(file.path().to_path_buf()),
            ..PasetoConfig::default()
        };
        assert_eq!(
            config.resolve_secret().unwrap(),
            "0123456789abcdef0123456789abcdef"
        );
    }

    #[test]
    fn test_resolve_secret_missing() {
        let config = PasetoConfig {
            secret_key_env: None,
            ..PasetoConfig::default()
        };
        assert!(matches!(
            config.resolve_secret(),
            Err(ConfigError::MissingSecret)
        ));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = PasetoConfig {
            secret_key: Some("super-secret-value".to_string()),
            ..PasetoConfig::default()
        };
        let printed = format!("{config:?}");
        assert!(!printed.contains("super-secret-value"));
        assert!(printed.contains("<redacted>"));
    }
}
