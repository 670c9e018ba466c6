//! Signing and signature checking for `v2.public` tokens.

use crate::claims::ClaimSet;
use crate::codec::{self, DecodedToken};
use crate::error::TokenError;
use crate::keys::{KeyPair, PublicKey};
use paseto_auth_core::defaults::TOKEN_HEADER;

/// Signs claim sets into token strings.
#[derive(Debug, Clone)]
pub struct Signer {
    keypair: KeyPair,
}

impl Signer {
    pub fn new(keypair: KeyPair) -> Self {
        Self { keypair }
    }

    pub fn public_key(&self) -> PublicKey {
        self.keypair.public_key()
    }

    /// Sign `claims` and encode the token, with an optional footer.
    pub fn sign(&self, claims: &ClaimSet, footer: Option<&[u8]>) -> Result<String, TokenError> {
        let message = claims.to_json_bytes()?;
        let signature = self
            .keypair
            .sign(&codec::signed_bytes(TOKEN_HEADER, &message, footer));
        Ok(codec::encode(&message, &signature, footer))
    }
}

/// Checks token signatures against a public key.
#[derive(Debug, Clone)]
pub struct SignatureVerifier {
    public_key: PublicKey,
}

impl SignatureVerifier {
    pub fn new(public_key: PublicKey) -> Self {
        Self { public_key }
    }

    /// Check the signature of a decoded token. Claims are not looked at.
    pub fn verify(&self, token: &DecodedToken) -> Result<(), TokenError> {
        self.public_key
            .verify(&token.signed_bytes(), &token.signature)
    }
}
