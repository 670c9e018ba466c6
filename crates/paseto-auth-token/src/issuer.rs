//! Token issuance.

use crate::claims::ClaimSet;
use crate::descriptor::TokenDescriptor;
use crate::error::TokenError;
use crate::keys::KeyPair;
use crate::refresh::RefreshTokenProvider;
use crate::settings::Settings;
use crate::signer::Signer;
use chrono::{DateTime, SubsecRound, Utc};
use paseto_auth_core::defaults::claim_names;
use std::sync::Arc;

/// A freshly issued token and its metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    /// The `v2.public` token string.
    pub token: String,
    /// Value of the `iat` claim.
    pub issued_at: DateTime<Utc>,
    /// Value of the `exp` claim.
    pub expires_at: DateTime<Utc>,
    /// Refresh token, when a provider is configured and refresh tokens are enabled.
    pub refresh_token: Option<String>,
}

/// Builds, signs and encodes tokens from [`TokenDescriptor`]s.
#[derive(Clone)]
pub struct TokenIssuer {
    settings: Arc<Settings>,
    refresh: Option<Arc<dyn RefreshTokenProvider>>,
}

impl TokenIssuer {
    pub fn new(settings: Arc<Settings>) -> Self {
        Self {
            settings,
            refresh: None,
        }
    }

    /// Attach a refresh-token provider. Only used when refresh tokens are enabled.
    pub fn with_refresh_provider(mut self, provider: Arc<dyn RefreshTokenProvider>) -> Self {
        self.refresh = Some(provider);
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    fn refresh_provider(&self) -> Option<&Arc<dyn RefreshTokenProvider>> {
        self.refresh
            .as_ref()
            .filter(|_| self.settings.refresh_tokens)
    }

    /// Issue a token, creating a refresh token when configured.
    pub async fn issue(&self, descriptor: TokenDescriptor) -> Result<IssuedToken, TokenError> {
        let subject = descriptor.subject.clone();
        let mut issued = self.mint(descriptor)?;

        if let Some(provider) = self.refresh_provider() {
            let refresh_token = provider.create(&subject).await.map_err(|e| {
                tracing::warn!(error = %e, "Refresh token provider failed during issuance");
                TokenError::RefreshProviderFailure(e)
            })?;
            issued.refresh_token = Some(refresh_token);
        }

        Ok(issued)
    }

    /// Redeem a refresh token and issue a new token for the same subject.
    ///
    /// Issuer, audience and lifetime come from the configured defaults.
    pub async fn refresh(&self, refresh_token: &str) -> Result<IssuedToken, TokenError> {
        let provider = self.refresh_provider().ok_or(TokenError::RefreshDisabled)?;
        let subject = provider.receive(refresh_token).await.map_err(|e| {
            tracing::warn!(error = %e, "Refresh token could not be redeemed");
            TokenError::RefreshProviderFailure(e)
        })?;

        self.issue(TokenDescriptor::new().subject(subject)).await
    }

    /// Issue a token without touching the refresh-token provider.
    pub fn mint(&self, descriptor: TokenDescriptor) -> Result<IssuedToken, TokenError> {
        self.mint_at(descriptor, Utc::now())
    }

    /// [`mint`](Self::mint) with an explicit clock reading.
    pub fn mint_at(
        &self,
        descriptor: TokenDescriptor,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenError> {
        let now = now.trunc_subsecs(0);
        let resolved = descriptor.resolve(&self.settings, now)?;

        let mut claims = ClaimSet::new();
        claims.insert(claim_names::AUDIENCE, resolved.audience.as_str());
        claims.insert(claim_names::ISSUER, resolved.issuer.as_str());
        claims.insert_time(claim_names::ISSUED_AT, &now);
        claims.insert_time(claim_names::EXPIRATION_TIME, &resolved.expires);
        if let Some(not_before) = &resolved.not_before {
            claims.insert_time(claim_names::NOT_BEFORE, not_before);
        }
        claims.extend_from(&resolved.subject);
        // Subject claims may replace registered ones; never sign what verify would reject.
        claims.validate_registered()?;

        let signer = Signer::new(KeyPair::from_seed(&resolved.seed));
        let token = signer.sign(&claims, resolved.footer.as_deref())?;

        tracing::debug!(
            issuer = %resolved.issuer,
            audience = %resolved.audience,
            expires_at = %resolved.expires,
            claims = claims.len(),
            "Token issued"
        );

        Ok(IssuedToken {
            token,
            issued_at: now,
            expires_at: resolved.expires,
            refresh_token: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec;
    use crate::refresh::{InMemoryRefreshTokenProvider, RefreshError};
    use async_trait::async_trait;
    use chrono::TimeDelta;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(Arc::new(Settings::new(SECRET).unwrap()))
    }

    fn descriptor() -> TokenDescriptor {
        TokenDescriptor::new()
            .issuer("svc-a")
            .audience("svc-b")
            .claim("sub", "user-42")
    }

    fn claims_of(token: &str) -> ClaimSet {
        ClaimSet::from_json_bytes(&codec::decode(token).unwrap().message).unwrap()
    }

    #[test]
    fn test_claim_layout() {
        let now = Utc::now();
        let issued = issuer()
            .mint_at(
                descriptor()
                    .not_before(now)
                    .expires(now + TimeDelta::minutes(5)),
                now,
            )
            .unwrap();

        let claims = claims_of(&issued.token);
        let names: Vec<&str> = claims.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["aud", "iss", "iat", "exp", "nbf", "sub"]);
        assert_eq!(claims.issued_at().unwrap(), Some(issued.issued_at));
        assert_eq!(claims.expiration().unwrap(), Some(issued.expires_at));
        assert!(issued.refresh_token.is_none());
    }

    #[test]
    fn test_subject_claims_override_registered_claims() {
        let issued = issuer()
            .mint(descriptor().claim("iss", "overridden"))
            .unwrap();
        assert_eq!(claims_of(&issued.token).issuer(), Some("overridden"));
    }

    #[test]
    fn test_mistyped_registered_claim_is_not_signed() {
        assert!(matches!(
            issuer().mint(descriptor().claim("iat", 1_700_000_000)),
            Err(TokenError::InvalidClaim { claim, .. }) if claim == "iat"
        ));
        assert!(matches!(
            issuer().mint(descriptor().claim("exp", "tomorrow")),
            Err(TokenError::InvalidClaim { claim, .. }) if claim == "exp"
        ));
        assert!(matches!(
            issuer().mint(descriptor().claim("iss", serde_json::json!(["a", "b"]))),
            Err(TokenError::InvalidClaim { claim, .. }) if claim == "iss"
        ));
    }

    #[test]
    fn test_descriptor_seed_overrides_settings() {
        let other = "fedcba9876543210fedcba9876543210";
        let a = issuer().mint(descriptor()).unwrap();
        let b = issuer().mint(descriptor().secret_key(other)).unwrap();
        assert_ne!(
            codec::decode(&a.token).unwrap().signature,
            codec::decode(&b.token).unwrap().signature
        );
    }

    #[tokio::test]
    async fn test_refresh_token_attached_when_enabled() {
        let provider = Arc::new(InMemoryRefreshTokenProvider::new());
        let settings = Settings::new(SECRET).unwrap().with_refresh_tokens(true);
        let issuer = TokenIssuer::new(Arc::new(settings)).with_refresh_provider(provider.clone());

        let issued = issuer.issue(descriptor()).await.unwrap();
        assert!(issued.refresh_token.is_some());
        assert_eq!(provider.len().await, 1);
    }

    #[tokio::test]
    async fn test_refresh_disabled_skips_provider() {
        let provider = Arc::new(InMemoryRefreshTokenProvider::new());
        let issuer = issuer().with_refresh_provider(provider.clone());

        let issued = issuer.issue(descriptor()).await.unwrap();
        assert!(issued.refresh_token.is_none());
        assert!(provider.is_empty().await);
        assert!(matches!(
            issuer.refresh("anything").await,
            Err(TokenError::RefreshDisabled)
        ));
    }

    struct FailingProvider;

    #[async_trait]
    impl RefreshTokenProvider for FailingProvider {
        async fn create(&self, _subject: &ClaimSet) -> Result<String, RefreshError> {
            Err(RefreshError::Backend("store unavailable".to_string()))
        }

        async fn receive(&self, _refresh_token: &str) -> Result<ClaimSet, RefreshError> {
            Err(RefreshError::Backend("store unavailable".to_string()))
        }
    }

    #[tokio::test]
    async fn test_provider_failure_is_surfaced() {
        let settings = Settings::new(SECRET).unwrap().with_refresh_tokens(true);
        let issuer =
            TokenIssuer::new(Arc::new(settings)).with_refresh_provider(Arc::new(FailingProvider));

        assert!(matches!(
            issuer.issue(descriptor()).await,
            Err(TokenError::RefreshProviderFailure(RefreshError::Backend(_)))
        ));
    }
}
