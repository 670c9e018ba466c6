//! # paseto-auth-token
//!
//! Issuing and verifying PASETO `v2.public` identity tokens.
//!
//! This crate provides functionality for:
//! - Deriving an Ed25519 keypair from a 32-byte secret seed
//! - Building claim sets and signing them into tokens
//! - Decoding, verifying and time-checking presented tokens
//! - Projecting verified claims into an [`Identity`]
//! - Optional refresh tokens through a [`RefreshTokenProvider`]
//!
//! ## Token Format
//!
//! ```text
//! v2.public.<base64url(claims-json || ed25519-signature)>[.<base64url(footer)>]
//! ```
//!
//! The signature covers the pre-authentication encoding of header, claims and
//! footer. Tokens issued here verify under any conforming `v2.public`
//! implementation holding the same public key, and vice versa.
//!
//! ## Example
//!
//! ```
//! use paseto_auth_token::{Settings, TokenDescriptor, TokenIssuer, TokenVerifier};
//! use std::sync::Arc;
//!
//! let settings = Arc::new(
//!     Settings::new("0123456789abcdef0123456789abcdef")
//!         .unwrap()
//!         .with_issuer("svc-a")
//!         .with_audience("svc-b"),
//! );
//!
//! let issued = TokenIssuer::new(settings.clone())
//!     .mint(TokenDescriptor::new().claim("sub", "user-42"))
//!     .unwrap();
//!
//! let claims = TokenVerifier::new(settings).verify(&issued.token).unwrap();
//! assert_eq!(claims.subject(), Some("user-42"));
//! ```

pub mod claims;
pub mod codec;
pub mod descriptor;
pub mod error;
pub mod identity;
pub mod inspect;
pub mod issuer;
pub mod keys;
pub mod refresh;
pub mod settings;
pub mod signer;
pub mod verifier;

pub use claims::ClaimSet;
pub use descriptor::TokenDescriptor;
pub use error::{DescriptorField, ErrorKind, TokenError};
pub use identity::{Claim, ClaimKind, Identity, RegisteredClaim};
pub use inspect::{TokenInfo, inspect_unverified};
pub use issuer::{IssuedToken, TokenIssuer};
pub use keys::{KeyPair, PublicKey, SecretSeed, derive_keypair, generate_secret};
pub use refresh::{InMemoryRefreshTokenProvider, RefreshError, RefreshTokenProvider};
pub use settings::Settings;
pub use signer::{SignatureVerifier, Signer};
pub use verifier::{TokenVerifier, verify, verify_at};
