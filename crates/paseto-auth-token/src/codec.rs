//! Wire format for `v2.public` tokens.
//!
//! ```text
//! v2.public.<base64url(message || signature)>[.<base64url(footer)>]
//! ```
//!
//! Base64 is URL-safe without padding. The signature covers the
//! pre-authentication encoding of header, message and footer, so none of the
//! three can be swapped without invalidating it.

use crate::error::TokenError;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use paseto_auth_core::defaults::{SIGNATURE_LENGTH, TOKEN_HEADER};

/// A token split into its parts. Nothing in here has been verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedToken {
    pub header: &'static str,
    pub message: Vec<u8>,
    pub signature: [u8; SIGNATURE_LENGTH],
    pub footer: Option<Vec<u8>>,
}

impl DecodedToken {
    /// Bytes covered by the signature.
    pub fn signed_bytes(&self) -> Vec<u8> {
        signed_bytes(self.header, &self.message, self.footer.as_deref())
    }
}

/// Pre-authentication encoding.
///
/// Little-endian u64 piece count, then each piece prefixed by its
/// little-endian u64 length. The most significant bit of every length is
/// cleared.
pub fn pre_auth_encode(pieces: &[&[u8]]) -> Vec<u8> {
    let total: usize = pieces.iter().map(|p| p.len() + 8).sum();
    let mut out = Vec::with_capacity(8 + total);
    out.extend_from_slice(&le64(pieces.len() as u64));
    for piece in pieces {
        out.extend_from_slice(&le64(piece.len() as u64));
        out.extend_from_slice(piece);
    }
    out
}

fn le64(n: u64) -> [u8; 8] {
    (n & (u64::MAX >> 1)).to_le_bytes()
}

pub(crate) fn signed_bytes(header: &str, message: &[u8], footer: Option<&[u8]>) -> Vec<u8> {
    pre_auth_encode(&[header.as_bytes(), message, footer.unwrap_or_default()])
}

/// Assemble a token string.
pub fn encode(
    message: &[u8],
    signature: &[u8; SIGNATURE_LENGTH],
    footer: Option<&[u8]>,
) -> String {
    let mut body = Vec::with_capacity(message.len() + SIGNATURE_LENGTH);
    body.extend_from_slice(message);
    body.extend_from_slice(signature);

    let mut token = String::from(TOKEN_HEADER);
    token.push_str(&URL_SAFE_NO_PAD.encode(body));
    if let Some(footer) = footer.filter(|f| !f.is_empty()) {
        token.push('.');
        token.push_str(&URL_SAFE_NO_PAD.encode(footer));
    }
    token
}

/// Split a token string into its parts.
///
/// The header is checked before anything is base64-decoded, so tokens of
/// another version or purpose never reach the signature check.
pub fn decode(token: &str) -> Result<DecodedToken, TokenError> {
    let token = token.trim();
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() < 3 {
        return Err(TokenError::MalformedToken(format!(
            "expected at least 3 segments, got {}",
            parts.len()
        )));
    }

    let header = format!("{}.{}.", parts[0], parts[1]);
    if header != TOKEN_HEADER {
        return Err(TokenError::UnsupportedTokenFormat {
            found: format!("{}.{}", truncate(parts[0]), truncate(parts[1])),
        });
    }

    if parts.len() > 4 {
        return Err(TokenError::MalformedToken(format!(
            "expected at most 4 segments, got {}",
            parts.len()
        )));
    }

    let body = URL_SAFE_NO_PAD
        .decode(parts[2])
        .map_err(|e| TokenError::MalformedToken(format!("payload segment: {e}")))?;
    if body.len() < SIGNATURE_LENGTH {
        return Err(TokenError::MalformedToken(
            "payload segment is shorter than a signature".to_string(),
        ));
    }

    let footer = match parts.get(3) {
        Some(segment) => Some(
            URL_SAFE_NO_PAD
                .decode(segment)
                .map_err(|e| TokenError::MalformedToken(format!("footer segment: {e}")))?,
        ),
        None => None,
    };

    let split = body.len() - SIGNATURE_LENGTH;
    let mut signature = [0u8; SIGNATURE_LENGTH];
    signature.copy_from_slice(&body[split..]);
    let mut message = body;
    message.truncate(split);

    Ok(DecodedToken {
        header: TOKEN_HEADER,
        message,
        signature,
        footer,
    })
}

// Header segments end up in error messages; keep attacker-controlled text short.
fn truncate(segment: &str) -> &str {
    match segment.char_indices().nth(16) {
        Some((idx, _)) => &segment[..idx],
        None => segment,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pae_vectors() {
        assert_eq!(pre_auth_encode(&[]), vec![0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(
            pre_auth_encode(&[b"".as_slice()]),
            vec![1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]
        );
        assert_eq!(
            pre_auth_encode(&[b"test".as_slice()]),
            vec![
                1, 0, 0, 0, 0, 0, 0, 0, 4, 0, 0, 0, 0, 0, 0, 0, b't', b'e', b's', b't'
            ]
        );
    }

    #[test]
    fn test_encode_decode() {
        let signature = [7u8; SIGNATURE_LENGTH];
        let token = encode(br#"{"sub":"user-42"}"#, &signature, None);
        assert!(token.starts_with("v2.public."));
        assert_eq!(token.split('.').count(), 3);

        let decoded = decode(&token).unwrap();
        assert_eq!(decoded.message, br#"{"sub":"user-42"}"#);
        assert_eq!(decoded.signature, signature);
        assert_eq!(decoded.footer, None);
    }

    #[test]
    fn test_footer_segment() {
        let signature = [1u8; SIGNATURE_LENGTH];
        let token = encode(b"{}", &signature, Some(br#"{"kid":"main"}"#.as_slice()));
        assert_eq!(token.split('.').count(), 4);

        let decoded = decode(&token).unwrap();
        assert_eq!(decoded.footer.as_deref(), Some(&br#"{"kid":"main"}"#[..]));
    }

    #[test]
    fn test_empty_footer_is_omitted() {
        let token = encode(b"{}", &[0u8; SIGNATURE_LENGTH], Some(b"".as_slice()));
        assert_eq!(token.split('.').count(), 3);
    }

    #[test]
    fn test_unsupported_headers() {
        for token in [
            "v2.local.AAAA",
            "v4.public.AAAA",
            "v1.public.AAAA",
            "V2.PUBLIC.AAAA",
        ] {
            assert!(
                matches!(decode(token), Err(TokenError::UnsupportedTokenFormat { .. })),
                "{token} should be rejected as unsupported"
            );
        }
    }

    #[test]
    fn test_malformed_tokens() {
        assert!(matches!(decode(""), Err(TokenError::MalformedToken(_))));
        assert!(matches!(decode("v2.public"), Err(TokenError::MalformedToken(_))));
        assert!(matches!(
            decode("v2.public.!!!not-base64!!!"),
            Err(TokenError::MalformedToken(_))
        ));
        // Decodes, but too short to hold a signature.
        assert!(matches!(
            decode("v2.public.AAAA"),
            Err(TokenError::MalformedToken(_))
        ));
        assert!(matches!(
            decode("v2.public.AAAA.BBBB.CCCC"),
            Err(TokenError::MalformedToken(_))
        ));
    }
}
