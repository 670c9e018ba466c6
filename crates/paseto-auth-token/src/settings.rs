//! Validated, immutable token settings.
//!
//! Built once at startup from [`PasetoConfig`] and shared behind an `Arc`.
//! The keypair is derived here, so a bad seed fails before any token is
//! issued or verified.

use crate::error::TokenError;
use crate::keys::{KeyPair, PublicKey, SecretSeed};
use chrono::TimeDelta;
use paseto_auth_core::defaults::{BEARER_SCHEME, DEFAULT_TOKEN_LIFETIME};
use paseto_auth_core::{ConfigError, PasetoConfig};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Settings {
    seed: SecretSeed,
    keypair: KeyPair,
    pub issuer: Option<String>,
    pub audience: Option<String>,
    pub default_lifetime: TimeDelta,
    pub clock_skew: TimeDelta,
    pub validate_issuer: bool,
    pub validate_audience: bool,
    pub refresh_tokens: bool,
    pub scheme: String,
}

impl Settings {
    /// Settings with the given secret and library defaults for everything else.
    pub fn new(secret: &str) -> Result<Self, TokenError> {
        Ok(Self::from_seed(SecretSeed::from_secret(secret)?))
    }

    /// Settings around an already validated seed.
    pub fn from_seed(seed: SecretSeed) -> Self {
        let keypair = KeyPair::from_seed(&seed);
        Self {
            seed,
            keypair,
            issuer: None,
            audience: None,
            default_lifetime: TimeDelta::seconds(DEFAULT_TOKEN_LIFETIME.as_secs() as i64),
            clock_skew: TimeDelta::zero(),
            validate_issuer: true,
            validate_audience: true,
            refresh_tokens: false,
            scheme: BEARER_SCHEME.to_string(),
        }
    }

    /// Validate a loaded configuration.
    pub fn from_config(config: &PasetoConfig) -> Result<Self, TokenError> {
        let secret = config.resolve_secret()?;
        let mut settings = Self::new(&secret)?;
        settings.issuer = config.issuer.clone().filter(|s| !s.is_empty());
        settings.audience = config.audience.clone().filter(|s| !s.is_empty());
        settings.default_lifetime = to_delta("default_lifetime", config.default_lifetime()?)?;
        settings.clock_skew = to_delta("clock_skew", config.clock_skew()?)?;
        settings.validate_issuer = config.validate_issuer;
        settings.validate_audience = config.validate_audience;
        settings.refresh_tokens = config.refresh_tokens;
        settings.scheme = config.scheme.clone();

        tracing::debug!(
            issuer = ?settings.issuer,
            audience = ?settings.audience,
            default_lifetime = %settings.default_lifetime,
            clock_skew = %settings.clock_skew,
            refresh_tokens = settings.refresh_tokens,
            "Token settings loaded"
        );
        Ok(settings)
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    pub fn with_default_lifetime(mut self, lifetime: TimeDelta) -> Self {
        self.default_lifetime = lifetime;
        self
    }

    pub fn with_clock_skew(mut self, skew: TimeDelta) -> Self {
        self.clock_skew = skew;
        self
    }

    pub fn with_refresh_tokens(mut self, enabled: bool) -> Self {
        self.refresh_tokens = enabled;
        self
    }

    pub fn seed(&self) -> &SecretSeed {
        &self.seed
    }

    pub fn keypair(&self) -> &KeyPair {
        &self.keypair
    }

    pub fn public_key(&self) -> PublicKey {
        self.keypair.public_key()
    }
}

fn to_delta(field: &'static str, duration: Duration) -> Result<TimeDelta, TokenError> {
    TimeDelta::from_std(duration).map_err(|e| {
        TokenError::Config(ConfigError::InvalidDuration {
            field,
            reason: e.to_string(),
        })
    })
}
