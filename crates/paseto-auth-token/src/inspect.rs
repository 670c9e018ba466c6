//! Unverified token inspection, for debugging tools.

use crate::claims::ClaimSet;
use crate::codec;
use crate::error::TokenError;

/// Information about a token (for inspection).
#[derive(Debug, Clone)]
pub struct TokenInfo {
    /// Header, e.g. `v2.public.`.
    pub header: &'static str,
    /// Claims as found in the payload. Not verified.
    pub claims: ClaimSet,
    /// Footer, lossily decoded as UTF-8.
    pub footer: Option<String>,
}

/// Inspect a token without verification.
///
/// Nothing returned here may be trusted; use a verifier for authentication.
pub fn inspect_unverified(token: &str) -> Result<TokenInfo, TokenError> {
    let decoded = codec::decode(token)?;
    let claims = ClaimSet::from_json_bytes(&decoded.message)?;
    let footer = decoded
        .footer
        .as_deref()
        .map(|f| String::from_utf8_lossy(f).into_owned());

    Ok(TokenInfo {
        header: decoded.header,
        claims,
        footer,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::derive_keypair;
    use crate::signer::Signer;

    #[test]
    fn test_inspect_reads_claims_and_footer() {
        let signer = Signer::new(derive_keypair(&[0x05u8; 32]).unwrap());
        let token = signer
            .sign(
                &ClaimSet::new().with("sub", "user-42"),
                Some(b"kid-1".as_slice()),
            )
            .unwrap();

        let info = inspect_unverified(&token).unwrap();
        assert_eq!(info.header, "v2.public.");
        assert_eq!(info.claims.subject(), Some("user-42"));
        assert_eq!(info.footer.as_deref(), Some("kid-1"));
    }
}
