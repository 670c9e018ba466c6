//! Keypair derivation for token signing.
//!
//! Keys are never generated at random: the 32-byte secret seed is the Ed25519
//! secret key, so every process configured with the same seed derives the
//! same keypair.

use crate::error::TokenError;
use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};
use paseto_auth_core::defaults::{SEED_LENGTH, SIGNATURE_LENGTH};
use rand::Rng;
use rand::distr::Alphanumeric;
use std::fmt;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// The 32-byte root of trust. Zeroized on drop, never printed.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretSeed([u8; SEED_LENGTH]);

impl SecretSeed {
    /// Wrap raw seed bytes. Fails unless exactly [`SEED_LENGTH`] bytes are given.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TokenError> {
        if bytes.len() != SEED_LENGTH {
            return Err(TokenError::InvalidKeyMaterial {
                expected: SEED_LENGTH,
                actual: bytes.len(),
            });
        }
        let mut seed = [0u8; SEED_LENGTH];
        seed.copy_from_slice(bytes);
        Ok(Self(seed))
    }

    /// Use the UTF-8 bytes of a configured secret string as the seed.
    pub fn from_secret(secret: &str) -> Result<Self, TokenError> {
        Self::from_bytes(secret.as_bytes())
    }

    pub fn as_bytes(&self) -> &[u8; SEED_LENGTH] {
        &self.0
    }
}

impl fmt::Debug for SecretSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretSeed(<redacted>)")
    }
}

/// Generate a random 32-character alphanumeric secret suitable as a seed.
pub fn generate_secret() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(SEED_LENGTH)
        .map(char::from)
        .collect()
}

/// Derive the signing keypair from raw seed bytes.
pub fn derive_keypair(seed: &[u8]) -> Result<KeyPair, TokenError> {
    let seed = SecretSeed::from_bytes(seed)?;
    Ok(KeyPair::from_seed(&seed))
}

/// An Ed25519 keypair for signing and verifying tokens.
#[derive(Clone)]
pub struct KeyPair {
    signing: SigningKey,
}

impl KeyPair {
    pub fn from_seed(seed: &SecretSeed) -> Self {
        Self {
            signing: SigningKey::from_bytes(seed.as_bytes()),
        }
    }

    /// Get the public half.
    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.signing.verifying_key())
    }

    /// Get the public key as hex string.
    pub fn public_key_hex(&self) -> String {
        self.public_key().to_hex()
    }

    pub(crate) fn sign(&self, message: &[u8]) -> [u8; SIGNATURE_LENGTH] {
        self.signing.sign(message).to_bytes()
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key())
            .finish_non_exhaustive()
    }
}

/// The verification half of a [`KeyPair`].
#[derive(Clone, Copy)]
pub struct PublicKey(VerifyingKey);

impl PublicKey {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TokenError> {
        let bytes: [u8; 32] = bytes.try_into().map_err(|_| {
            TokenError::InvalidPublicKey(format!("expected 32 bytes, got {}", bytes.len()))
        })?;
        VerifyingKey::from_bytes(&bytes)
            .map(Self)
            .map_err(|e| TokenError::InvalidPublicKey(e.to_string()))
    }

    /// Load a public key from hex string (for verification-only scenarios).
    pub fn from_hex(hex_str: &str) -> Result<Self, TokenError> {
        let bytes =
            hex::decode(hex_str.trim()).map_err(|e| TokenError::InvalidPublicKey(e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0.as_bytes())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        self.0.as_bytes()
    }

    /// Check `signature` over `message` using strict Ed25519 verification.
    pub(crate) fn verify(
        &self,
        message: &[u8],
        signature: &[u8; SIGNATURE_LENGTH],
    ) -> Result<(), TokenError> {
        let signature = Signature::from_bytes(signature);
        self.0
            .verify_strict(message, &signature)
            .map_err(|_| TokenError::InvalidSignature)
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes().ct_eq(other.as_bytes()).into()
    }
}

impl Eq for PublicKey {}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_hex())
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derivation_is_deterministic() {
        let seed = [0x01u8; 32];
        let a = derive_keypair(&seed).unwrap();
        let b = derive_keypair(&seed).unwrap();
        assert_eq!(a.public_key(), b.public_key());
        assert_eq!(a.sign(b"message"), b.sign(b"message"));
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = derive_keypair(&[0x01u8; 32]).unwrap();
        let b = derive_keypair(&[0x02u8; 32]).unwrap();
        assert_ne!(a.public_key(), b.public_key());
    }

    #[test]
    fn test_wrong_seed_length_rejected() {
        for len in [0usize, 1, 16, 31, 33, 64] {
            let seed = vec![0xAAu8; len];
            match derive_keypair(&seed) {
                Err(TokenError::InvalidKeyMaterial { expected, actual }) => {
                    assert_eq!(expected, 32);
                    assert_eq!(actual, len);
                }
                other => panic!("expected InvalidKeyMaterial for {len} bytes, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_public_key_hex_roundtrip() {
        let keypair = derive_keypair(&[0x07u8; 32]).unwrap();
        let hex = keypair.public_key_hex();
        assert_eq!(hex.len(), 64);

        let parsed = PublicKey::from_hex(&hex).unwrap();
        assert_eq!(parsed, keypair.public_key());
    }

    #[test]
    fn test_sign_and_verify() {
        let keypair = derive_keypair(&[0x03u8; 32]).unwrap();
        let signature = keypair.sign(b"payload");
        assert!(keypair.public_key().verify(b"payload", &signature).is_ok());
        assert!(matches!(
            keypair.public_key().verify(b"payload!", &signature),
            Err(TokenError::InvalidSignature)
        ));
    }

    #[test]
    fn test_generated_secret_is_a_valid_seed() {
        let secret = generate_secret();
        assert_eq!(secret.len(), 32);
        assert!(SecretSeed::from_secret(&secret).is_ok());
    }

    #[test]
    fn test_debug_does_not_leak_seed() {
        let seed = SecretSeed::from_secret("0123456789abcdef0123456789abcdef").unwrap();
        assert_eq!(format!("{seed:?}"), "SecretSeed(<redacted>)");
    }
}
