//! Projection of verified claims into an authenticated identity.

use crate::claims::ClaimSet;
use paseto_auth_core::defaults::claim_names;
use serde_json::Value;
use std::fmt;

/// A claim name with a standardized meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegisteredClaim {
    Issuer,
    Subject,
    Audience,
    ExpirationTime,
    NotBefore,
    IssuedAt,
    TokenIdentifier,
}

impl RegisteredClaim {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegisteredClaim::Issuer => claim_names::ISSUER,
            RegisteredClaim::Subject => claim_names::SUBJECT,
            RegisteredClaim::Audience => claim_names::AUDIENCE,
            RegisteredClaim::ExpirationTime => claim_names::EXPIRATION_TIME,
            RegisteredClaim::NotBefore => claim_names::NOT_BEFORE,
            RegisteredClaim::IssuedAt => claim_names::ISSUED_AT,
            RegisteredClaim::TokenIdentifier => claim_names::TOKEN_IDENTIFIER,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            claim_names::ISSUER => Some(RegisteredClaim::Issuer),
            claim_names::SUBJECT => Some(RegisteredClaim::Subject),
            claim_names::AUDIENCE => Some(RegisteredClaim::Audience),
            claim_names::EXPIRATION_TIME => Some(RegisteredClaim::ExpirationTime),
            claim_names::NOT_BEFORE => Some(RegisteredClaim::NotBefore),
            claim_names::ISSUED_AT => Some(RegisteredClaim::IssuedAt),
            claim_names::TOKEN_IDENTIFIER => Some(RegisteredClaim::TokenIdentifier),
            _ => None,
        }
    }
}

/// Either a registered claim or a caller-defined name kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ClaimKind {
    Registered(RegisteredClaim),
    Custom(String),
}

impl ClaimKind {
    pub fn from_name(name: &str) -> Self {
        match RegisteredClaim::from_name(name) {
            Some(registered) => ClaimKind::Registered(registered),
            None => ClaimKind::Custom(name.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ClaimKind::Registered(registered) => registered.as_str(),
            ClaimKind::Custom(name) => name,
        }
    }
}

impl fmt::Display for ClaimKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One stringified claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim {
    pub kind: ClaimKind,
    pub value: String,
}

/// An authenticated identity: the scheme that produced it and its claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub scheme: String,
    pub claims: Vec<Claim>,
}

impl Identity {
    /// Project a verified claim set. Values are stringified: strings as-is,
    /// everything else as compact JSON.
    pub fn from_claims(scheme: &str, claims: &ClaimSet) -> Self {
        let claims = claims
            .iter()
            .map(|(name, value)| Claim {
                kind: ClaimKind::from_name(name),
                value: stringify(value),
            })
            .collect();
        Self {
            scheme: scheme.to_string(),
            claims,
        }
    }

    /// First value for a registered claim.
    pub fn registered(&self, claim: RegisteredClaim) -> Option<&str> {
        self.claims
            .iter()
            .find(|c| c.kind == ClaimKind::Registered(claim))
            .map(|c| c.value.as_str())
    }

    /// First value for any claim name.
    pub fn find(&self, name: &str) -> Option<&str> {
        self.claims
            .iter()
            .find(|c| c.kind.name() == name)
            .map(|c| c.value.as_str())
    }

    pub fn issuer(&self) -> Option<&str> {
        self.registered(RegisteredClaim::Issuer)
    }

    pub fn subject(&self) -> Option<&str> {
        self.registered(RegisteredClaim::Subject)
    }

    pub fn audience(&self) -> Option<&str> {
        self.registered(RegisteredClaim::Audience)
    }

    pub fn expiration(&self) -> Option<&str> {
        self.registered(RegisteredClaim::ExpirationTime)
    }

    pub fn not_before(&self) -> Option<&str> {
        self.registered(RegisteredClaim::NotBefore)
    }

    pub fn issued_at(&self) -> Option<&str> {
        self.registered(RegisteredClaim::IssuedAt)
    }

    pub fn token_id(&self) -> Option<&str> {
        self.registered(RegisteredClaim::TokenIdentifier)
    }

    /// Claims that are not registered, in token order.
    pub fn custom_claims(&self) -> impl Iterator<Item = &Claim> {
        self.claims
            .iter()
            .filter(|c| matches!(c.kind, ClaimKind::Custom(_)))
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
