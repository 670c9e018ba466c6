//! Issuance requests.

use crate::claims::ClaimSet;
use crate::error::{DescriptorField, TokenError};
use crate::keys::SecretSeed;
use crate::settings::Settings;
use chrono::{DateTime, SubsecRound, Utc};
use serde_json::Value;
use std::fmt;
use zeroize::Zeroizing;

/// What to put in a token. Consumed by [`TokenIssuer`](crate::TokenIssuer).
///
/// Issuer, audience, expiry and seed are optional here and fall back to the
/// configured [`Settings`] when absent. An explicitly empty issuer or audience
/// is rejected rather than replaced.
#[derive(Clone, Default)]
pub struct TokenDescriptor {
    pub issuer: Option<String>,
    pub audience: Option<String>,
    pub subject: ClaimSet,
    pub not_before: Option<DateTime<Utc>>,
    pub expires: Option<DateTime<Utc>>,
    pub secret_key: Option<Zeroizing<Vec<u8>>>,
    pub footer: Option<Vec<u8>>,
}

impl fmt::Debug for TokenDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenDescriptor")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("subject", &self.subject)
            .field("not_before", &self.not_before)
            .field("expires", &self.expires)
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<redacted>"))
            .field("footer", &self.footer)
            .finish()
    }
}

impl TokenDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    pub fn audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    /// Add one subject claim.
    pub fn claim(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.subject.insert(name, value);
        self
    }

    /// Replace all subject claims.
    pub fn subject(mut self, subject: ClaimSet) -> Self {
        self.subject = subject;
        self
    }

    pub fn not_before(mut self, not_before: DateTime<Utc>) -> Self {
        self.not_before = Some(not_before);
        self
    }

    pub fn expires(mut self, expires: DateTime<Utc>) -> Self {
        self.expires = Some(expires);
        self
    }

    /// Sign with this seed instead of the configured one.
    pub fn secret_key(mut self, secret_key: impl Into<Vec<u8>>) -> Self {
        self.secret_key = Some(Zeroizing::new(secret_key.into()));
        self
    }

    pub fn footer(mut self, footer: impl Into<Vec<u8>>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    /// Apply configured fallbacks and validate.
    ///
    /// Fields are checked in a fixed order (audience, issuer, expires,
    /// subject, secret key) and the first failure is reported.
    pub(crate) fn resolve(
        self,
        settings: &Settings,
        now: DateTime<Utc>,
    ) -> Result<ResolvedDescriptor, TokenError> {
        let audience = self.audience.or_else(|| settings.audience.clone());
        let audience = non_empty(audience, DescriptorField::Audience)?;

        let issuer = self.issuer.or_else(|| settings.issuer.clone());
        let issuer = non_empty(issuer, DescriptorField::Issuer)?;

        let expires = self
            .expires
            .or_else(|| now.checked_add_signed(settings.default_lifetime))
            .ok_or(TokenError::InvalidDescriptor {
                field: DescriptorField::Expires,
            })?;

        if self.subject.is_empty() {
            return Err(TokenError::InvalidDescriptor {
                field: DescriptorField::Subject,
            });
        }

        let seed = match &self.secret_key {
            Some(bytes) => SecretSeed::from_bytes(bytes.as_slice()).map_err(|_| {
                TokenError::InvalidDescriptor {
                    field: DescriptorField::SecretKey,
                }
            })?,
            None => settings.seed().clone(),
        };

        Ok(ResolvedDescriptor {
            issuer,
            audience,
            subject: self.subject,
            not_before: self.not_before.map(|t| t.trunc_subsecs(0)),
            expires: expires.trunc_subsecs(0),
            seed,
            footer: self.footer,
        })
    }
}

fn non_empty(value: Option<String>, field: DescriptorField) -> Result<String, TokenError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(TokenError::InvalidDescriptor { field }),
    }
}

/// A descriptor with every fallback applied and every field validated.
#[derive(Debug)]
pub(crate) struct ResolvedDescriptor {
    pub issuer: String,
    pub audience: String,
    pub subject: ClaimSet,
    pub not_before: Option<DateTime<Utc>>,
    pub expires: DateTime<Utc>,
    pub seed: SecretSeed,
    pub footer: Option<Vec<u8>>,
}
