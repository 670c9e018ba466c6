//! Refresh-token provider seam.
//!
//! The issuer only needs two capabilities: turn subject claims into an opaque
//! refresh token, and turn a presented refresh token back into subject claims.
//! Storage lives behind the trait; [`InMemoryRefreshTokenProvider`] is the
//! reference backend.

use crate::claims::ClaimSet;
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, TimeDelta, Utc};
use rand::RngCore;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors reported by a refresh-token provider.
#[derive(Debug, Error)]
pub enum RefreshError {
    /// The presented refresh token is unknown or was already used.
    #[error("unknown refresh token")]
    NotFound,

    /// The presented refresh token is past its lifetime.
    #[error("refresh token has expired")]
    Expired,

    /// Backend failure (store unavailable, timeout, ...).
    #[error("refresh token backend error: {0}")]
    Backend(String),
}

/// Creates and redeems refresh tokens.
#[async_trait]
pub trait RefreshTokenProvider: Send + Sync {
    /// Create a refresh token bound to `subject`.
    async fn create(&self, subject: &ClaimSet) -> Result<String, RefreshError>;

    /// Redeem a refresh token, returning the subject claims it was created for.
    async fn receive(&self, refresh_token: &str) -> Result<ClaimSet, RefreshError>;
}

struct StoredRefresh {
    subject: ClaimSet,
    expires_at: Option<DateTime<Utc>>,
}

/// Process-local refresh tokens. Handles are single use.
#[derive(Default)]
pub struct InMemoryRefreshTokenProvider {
    lifetime: Option<TimeDelta>,
    entries: RwLock<HashMap<String, StoredRefresh>>,
}

impl InMemoryRefreshTokenProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refresh tokens expire `lifetime` after creation.
    pub fn with_lifetime(lifetime: TimeDelta) -> Self {
        Self {
            lifetime: Some(lifetime),
            entries: RwLock::default(),
        }
    }

    /// Number of outstanding refresh tokens.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    fn new_handle() -> String {
        let mut bytes = [0u8; 32];
        rand::rng().fill_bytes(&mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }
}

#[async_trait]
impl RefreshTokenProvider for InMemoryRefreshTokenProvider {
    async fn create(&self, subject: &ClaimSet) -> Result<String, RefreshError> {
        let handle = Self::new_handle();
        let stored = StoredRefresh {
            subject: subject.clone(),
            expires_at: self.lifetime.map(|lifetime| Utc::now() + lifetime),
        };
        self.entries.write().await.insert(handle.clone(), stored);
        Ok(handle)
    }

    async fn receive(&self, refresh_token: &str) -> Result<ClaimSet, RefreshError> {
        let stored = self
            .entries
            .write()
            .await
            .remove(refresh_token)
            .ok_or(RefreshError::NotFound)?;

        if let Some(expires_at) = stored.expires_at {
            if Utc::now() >= expires_at {
                return Err(RefreshError::Expired);
            }
        }
        Ok(stored.subject)
    }
}
