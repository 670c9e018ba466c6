//! Claim sets carried in token payloads.

use crate::error::TokenError;
use chrono::{DateTime, SecondsFormat, Utc};
use paseto_auth_core::defaults::claim_names;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Ordered mapping of claim name to value.
///
/// Insertion order is preserved so encoding is stable for a given build
/// sequence. Inserting an existing name replaces its value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimSet {
    claims: Map<String, Value>,
}

/// Render a timestamp the way registered time claims are stored.
pub fn format_timestamp(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, false)
}

impl ClaimSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a claim, returning the previous value if the name was taken.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.claims.insert(name.into(), value.into())
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert a timestamp claim in RFC 3339 form.
    pub fn insert_time(&mut self, name: impl Into<String>, time: &DateTime<Utc>) {
        self.insert(name, format_timestamp(time));
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }

    /// Get a claim whose value is a string.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.claims.get(name).and_then(Value::as_str)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.claims.shift_remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.claims.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.claims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.claims.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Copy every claim of `other` into `self`, later values winning.
    pub fn extend_from(&mut self, other: &ClaimSet) {
        for (name, value) in other.iter() {
            self.insert(name, value.clone());
        }
    }

    pub fn issuer(&self) -> Option<&str> {
        self.get_str(claim_names::ISSUER)
    }

    pub fn subject(&self) -> Option<&str> {
        self.get_str(claim_names::SUBJECT)
    }

    pub fn audience(&self) -> Option<&str> {
        self.get_str(claim_names::AUDIENCE)
    }

    pub fn token_id(&self) -> Option<&str> {
        self.get_str(claim_names::TOKEN_IDENTIFIER)
    }

    pub fn expiration(&self) -> Result<Option<DateTime<Utc>>, TokenError> {
        self.time(claim_names::EXPIRATION_TIME)
    }

    pub fn not_before(&self) -> Result<Option<DateTime<Utc>>, TokenError> {
        self.time(claim_names::NOT_BEFORE)
    }

    pub fn issued_at(&self) -> Result<Option<DateTime<Utc>>, TokenError> {
        self.time(claim_names::ISSUED_AT)
    }

    /// Read a timestamp claim. Absent is `Ok(None)`; present but unparsable is an error.
    pub fn time(&self, name: &str) -> Result<Option<DateTime<Utc>>, TokenError> {
        let Some(value) = self.claims.get(name) else {
            return Ok(None);
        };
        let raw = value.as_str().ok_or_else(|| TokenError::InvalidClaim {
            claim: name.to_string(),
            reason: "expected an RFC 3339 timestamp string".to_string(),
        })?;
        DateTime::parse_from_rfc3339(raw)
            .map(|t| Some(t.with_timezone(&Utc)))
            .map_err(|e| TokenError::InvalidClaim {
                claim: name.to_string(),
                reason: e.to_string(),
            })
    }

    /// Check that registered claims carry their documented types.
    pub fn validate_registered(&self) -> Result<(), TokenError> {
        for name in [
            claim_names::ISSUER,
            claim_names::SUBJECT,
            claim_names::AUDIENCE,
            claim_names::TOKEN_IDENTIFIER,
        ] {
            if let Some(value) = self.claims.get(name) {
                if !value.is_string() {
                    return Err(TokenError::InvalidClaim {
                        claim: name.to_string(),
                        reason: "expected a string".to_string(),
                    });
                }
            }
        }

        for name in [
            claim_names::EXPIRATION_TIME,
            claim_names::NOT_BEFORE,
            claim_names::ISSUED_AT,
        ] {
            self.time(name)?;
        }

        Ok(())
    }

    /// Serialize as a flat JSON object.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, TokenError> {
        Ok(serde_json::to_vec(&self.claims)?)
    }

    /// Parse a JSON object. Anything else is a malformed payload.
    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self, TokenError> {
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|e| TokenError::MalformedToken(format!("payload is not JSON: {e}")))?;
        match value {
            Value::Object(claims) => Ok(Self { claims }),
            _ => Err(TokenError::MalformedToken(
                "payload is not a JSON object".to_string(),
            )),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ClaimSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = ClaimSet::new();
        for (name, value) in iter {
            set.insert(name, value);
        }
        set
    }
}

impl IntoIterator for ClaimSet {
    type Item = (String, Value);
    type IntoIter = serde_json::map::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.claims.into_iter()
    }
}
