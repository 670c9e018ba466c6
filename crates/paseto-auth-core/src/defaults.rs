//! Process-wide constants.

use std::time::Duration;

/// Authentication scheme name attached to projected identities.
pub const BEARER_SCHEME: &str = "Bearer";

/// Required length of the secret seed, in bytes.
pub const SEED_LENGTH: usize = 32;

/// Length of an Ed25519 signature, in bytes.
pub const SIGNATURE_LENGTH: usize = 64;

/// Protocol version emitted and accepted.
pub const TOKEN_VERSION: &str = "v2";

/// Token purpose emitted and accepted.
pub const TOKEN_PURPOSE: &str = "public";

/// Full header prefix, including the trailing separator.
pub const TOKEN_HEADER: &str = "v2.public.";

/// Lifetime applied when an issuance request does not carry an expiry.
pub const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(60 * 60);

/// Environment variable the CLI reads the secret from.
pub const SECRET_KEY_ENV: &str = "PASETO_SECRET_KEY";

/// Registered claim names.
pub mod claim_names {
    pub const ISSUER: &str = "iss";
    pub const SUBJECT: &str = "sub";
    pub const AUDIENCE: &str = "aud";
    pub const EXPIRATION_TIME: &str = "exp";
    pub const NOT_BEFORE: &str = "nbf";
    pub const ISSUED_AT: &str = "iat";
    pub const TOKEN_IDENTIFIER: &str = "jti";

    /// All registered names, in the order they are conventionally listed.
    pub const ALL: [&str; 7] = [
        ISSUER,
        SUBJECT,
        AUDIENCE,
        EXPIRATION_TIME,
        NOT_BEFORE,
        ISSUED_AT,
        TOKEN_IDENTIFIER,
    ];

    /// Whether `name` is one of the registered claim names.
    pub fn is_registered(name: &str) -> bool {
        ALL.contains(&name)
    }
}
