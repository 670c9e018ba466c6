//! Token verification.
//!
//! Order matters: the header is checked while decoding, then the signature,
//! and only then are claims parsed and compared against the clock. Nothing
//! derived from the payload influences control flow before the signature has
//! been accepted.

use crate::claims::{ClaimSet, format_timestamp};
use crate::codec;
use crate::error::TokenError;
use crate::identity::Identity;
use crate::keys::PublicKey;
use crate::settings::Settings;
use crate::signer::SignatureVerifier;
use chrono::{DateTime, TimeDelta, Utc};
use paseto_auth_core::defaults::claim_names;
use std::sync::Arc;

/// Verify `token` against `settings` at the current time.
pub fn verify(token: &str, settings: &Settings) -> Result<ClaimSet, TokenError> {
    verify_at(token, settings, Utc::now())
}

/// [`verify`] with an explicit clock reading.
pub fn verify_at(
    token: &str,
    settings: &Settings,
    now: DateTime<Utc>,
) -> Result<ClaimSet, TokenError> {
    let result = verify_inner(token, settings.public_key(), settings, now);
    if let Err(e) = &result {
        tracing::warn!(reason = %e.kind(), error = %e, "Token verification failed");
    }
    result
}

fn verify_inner(
    token: &str,
    public_key: PublicKey,
    settings: &Settings,
    now: DateTime<Utc>,
) -> Result<ClaimSet, TokenError> {
    let decoded = codec::decode(token)?;
    SignatureVerifier::new(public_key).verify(&decoded)?;

    let claims = ClaimSet::from_json_bytes(&decoded.message)?;
    claims.validate_registered()?;

    check_temporal(&claims, now, settings.clock_skew)?;
    check_issuer_and_audience(&claims, settings)?;

    Ok(claims)
}

fn check_temporal(
    claims: &ClaimSet,
    now: DateTime<Utc>,
    skew: TimeDelta,
) -> Result<(), TokenError> {
    let expires = claims
        .expiration()?
        .ok_or_else(|| TokenError::MissingClaim {
            claim: claim_names::EXPIRATION_TIME.to_string(),
        })?;
    // A skew that overflows the calendar puts the bound beyond any clock reading.
    if expires
        .checked_add_signed(skew)
        .is_some_and(|deadline| now >= deadline)
    {
        return Err(TokenError::TokenExpired {
            expired_at: format_timestamp(&expires),
        });
    }

    if let Some(not_before) = claims.not_before()? {
        if now
            .checked_add_signed(skew)
            .is_some_and(|latest| latest < not_before)
        {
            return Err(TokenError::TokenNotYetValid {
                not_before: format_timestamp(&not_before),
            });
        }
    }

    Ok(())
}

fn check_issuer_and_audience(claims: &ClaimSet, settings: &Settings) -> Result<(), TokenError> {
    if settings.validate_issuer {
        if let Some(expected) = &settings.issuer {
            if claims.issuer() != Some(expected.as_str()) {
                return Err(TokenError::IssuerMismatch);
            }
        }
    }

    if settings.validate_audience {
        if let Some(expected) = &settings.audience {
            if claims.audience() != Some(expected.as_str()) {
                return Err(TokenError::AudienceMismatch);
            }
        }
    }

    Ok(())
}

/// Verifies tokens and projects them into identities.
///
/// Holds only immutable settings; clone freely and share across tasks.
#[derive(Debug, Clone)]
pub struct TokenVerifier {
    settings: Arc<Settings>,
    public_key: PublicKey,
}

impl TokenVerifier {
    /// Verify with the public half of the configured seed.
    pub fn new(settings: Arc<Settings>) -> Self {
        let public_key = settings.public_key();
        Self {
            settings,
            public_key,
        }
    }

    /// Verify with an explicit public key instead of the configured seed.
    pub fn with_public_key(settings: Arc<Settings>, public_key: PublicKey) -> Self {
        Self {
            settings,
            public_key,
        }
    }

    pub fn public_key(&self) -> PublicKey {
        self.public_key
    }

    /// Verify a token and return its claims.
    pub fn verify(&self, token: &str) -> Result<ClaimSet, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// [`verify`](Self::verify) with an explicit clock reading.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<ClaimSet, TokenError> {
        let result = verify_inner(token, self.public_key, &self.settings, now);
        if let Err(e) = &result {
            tracing::warn!(reason = %e.kind(), error = %e, "Token verification failed");
        }
        result
    }

    /// Verify a token and project it into an [`Identity`].
    pub fn authenticate(&self, token: &str) -> Result<Identity, TokenError> {
        let claims = self.verify(token)?;
        let identity = Identity::from_claims(&self.settings.scheme, &claims);
        tracing::debug!(
            scheme = %identity.scheme,
            subject = ?identity.subject(),
            "Token authenticated"
        );
        Ok(identity)
    }
}
