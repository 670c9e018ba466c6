//! Error types for token operations.

use crate::refresh::RefreshError;
use paseto_auth_core::ConfigError;
use std::fmt;
use thiserror::Error;

/// Field of a [`TokenDescriptor`](crate::TokenDescriptor) that failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorField {
    Audience,
    Issuer,
    Expires,
    Subject,
    SecretKey,
}

impl DescriptorField {
    pub fn as_str(&self) -> &'static str {
        match self {
            DescriptorField::Audience => "audience",
            DescriptorField::Issuer => "issuer",
            DescriptorField::Expires => "expires",
            DescriptorField::Subject => "subject",
            DescriptorField::SecretKey => "secret_key",
        }
    }
}

impl fmt::Display for DescriptorField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur during token operations.
///
/// Messages never carry secret material or raw token bytes.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Seed has the wrong length or cannot be used as a signing key.
    #[error("invalid key material: expected {expected} bytes, got {actual}")]
    InvalidKeyMaterial { expected: usize, actual: usize },

    /// Public key could not be parsed.
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    /// Issuance request failed validation.
    #[error("invalid token descriptor: {field} is missing or invalid")]
    InvalidDescriptor { field: DescriptorField },

    /// Token is structurally broken.
    #[error("malformed token: {0}")]
    MalformedToken(String),

    /// Token header is not `v2.public`.
    #[error("unsupported token format: {found}")]
    UnsupportedTokenFormat { found: String },

    /// Signature does not match the payload.
    #[error("invalid token signature")]
    InvalidSignature,

    /// Token is past its `exp`.
    #[error("token has expired at {expired_at}")]
    TokenExpired { expired_at: String },

    /// Token is before its `nbf`.
    #[error("token is not valid before {not_before}")]
    TokenNotYetValid { not_before: String },

    /// Token is missing a required claim.
    #[error("token missing required claim: {claim}")]
    MissingClaim { claim: String },

    /// A registered claim carries a value of the wrong type.
    #[error("invalid claim {claim}: {reason}")]
    InvalidClaim { claim: String, reason: String },

    /// `iss` differs from the configured issuer.
    #[error("token issuer does not match")]
    IssuerMismatch,

    /// `aud` differs from the configured audience.
    #[error("token audience does not match")]
    AudienceMismatch,

    /// The refresh-token provider failed.
    #[error("refresh token provider failed: {0}")]
    RefreshProviderFailure(#[from] RefreshError),

    /// Refresh tokens are not configured.
    #[error("refresh tokens are not enabled")]
    RefreshDisabled,

    /// Claims could not be serialized.
    #[error("claim serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration could not be turned into settings.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Stable classification of a [`TokenError`], suitable for audit logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    InvalidKeyMaterial,
    InvalidDescriptor,
    MalformedToken,
    UnsupportedTokenFormat,
    InvalidSignature,
    TokenExpired,
    TokenNotYetValid,
    InvalidClaims,
    IssuerMismatch,
    AudienceMismatch,
    RefreshProviderFailure,
    RefreshDisabled,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Configuration => "configuration",
            ErrorKind::InvalidKeyMaterial => "invalid_key_material",
            ErrorKind::InvalidDescriptor => "invalid_descriptor",
            ErrorKind::MalformedToken => "malformed_token",
            ErrorKind::UnsupportedTokenFormat => "unsupported_token_format",
            ErrorKind::InvalidSignature => "invalid_signature",
            ErrorKind::TokenExpired => "token_expired",
            ErrorKind::TokenNotYetValid => "token_not_yet_valid",
            ErrorKind::InvalidClaims => "invalid_claims",
            ErrorKind::IssuerMismatch => "issuer_mismatch",
            ErrorKind::AudienceMismatch => "audience_mismatch",
            ErrorKind::RefreshProviderFailure => "refresh_provider_failure",
            ErrorKind::RefreshDisabled => "refresh_disabled",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TokenError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TokenError::InvalidKeyMaterial { .. } | TokenError::InvalidPublicKey(_) => {
                ErrorKind::InvalidKeyMaterial
            }
            TokenError::InvalidDescriptor { .. } => ErrorKind::InvalidDescriptor,
            TokenError::MalformedToken(_) => ErrorKind::MalformedToken,
            TokenError::UnsupportedTokenFormat { .. } => ErrorKind::UnsupportedTokenFormat,
            TokenError::InvalidSignature => ErrorKind::InvalidSignature,
            TokenError::TokenExpired { .. } => ErrorKind::TokenExpired,
            TokenError::TokenNotYetValid { .. } => ErrorKind::TokenNotYetValid,
            TokenError::MissingClaim { .. }
            | TokenError::InvalidClaim { .. }
            | TokenError::Serialization(_) => ErrorKind::InvalidClaims,
            TokenError::IssuerMismatch => ErrorKind::IssuerMismatch,
            TokenError::AudienceMismatch => ErrorKind::AudienceMismatch,
            TokenError::RefreshProviderFailure(_) => ErrorKind::RefreshProviderFailure,
            TokenError::RefreshDisabled => ErrorKind::RefreshDisabled,
            TokenError::Config(_) => ErrorKind::Configuration,
        }
    }

    /// Whether the error means "the presented token does not authenticate".
    ///
    /// An HTTP layer may map all of these to a single 401.
    pub fn is_authentication_failure(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::MalformedToken
                | ErrorKind::UnsupportedTokenFormat
                | ErrorKind::InvalidSignature
                | ErrorKind::TokenExpired
                | ErrorKind::TokenNotYetValid
                | ErrorKind::InvalidClaims
                | ErrorKind::IssuerMismatch
                | ErrorKind::AudienceMismatch
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_and_expiry_are_distinct_kinds() {
        let sig = TokenError::InvalidSignature;
        let exp = TokenError::TokenExpired {
            expired_at: "2020-01-01T00:00:00+00:00".to_string(),
        };
        assert_ne!(sig.kind(), exp.kind());
        assert!(sig.is_authentication_failure());
        assert!(exp.is_authentication_failure());
    }

    #[test]
    fn test_descriptor_error_names_field() {
        let err = TokenError::InvalidDescriptor {
            field: DescriptorField::Audience,
        };
        assert!(err.to_string().contains("audience"));
        assert!(!err.is_authentication_failure());
    }
}
