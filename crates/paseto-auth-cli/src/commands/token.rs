//! Token commands.
//!
//! `paseto-auth token issue` - Issue a signed token.
//! `paseto-auth token verify` - Verify a token and print its claims.
//! `paseto-auth token inspect` - Print a token's contents without verifying.

use super::load_settings;
use anyhow::Context;
use chrono::{TimeDelta, Utc};
use paseto_auth_token::{TokenDescriptor, TokenIssuer, TokenVerifier, inspect_unverified};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where to find the signing secret.
#[derive(Debug, Clone, Default)]
pub struct KeySource {
    pub config: Option<PathBuf>,
    pub secret: Option<String>,
}

/// Options for `token issue`.
#[derive(Debug, Clone, Default)]
pub struct IssueArgs {
    pub issuer: Option<String>,
    pub audience: Option<String>,
    pub subject: Option<String>,
    pub claims: Vec<String>,
    pub expires: Option<String>,
    pub not_before: Option<String>,
    pub footer: Option<String>,
    pub output: Option<PathBuf>,
}

/// Parse a duration string like "15m", "1h 30m", "7days".
fn parse_duration(s: &str) -> anyhow::Result<TimeDelta> {
    let duration = humantime::parse_duration(s.trim())
        .with_context(|| format!("Invalid duration '{s}'"))?;
    TimeDelta::from_std(duration).with_context(|| format!("Duration '{s}' is out of range"))
}

/// Parse `name=value`. Values that parse as JSON keep their type, anything else is a string.
fn parse_claim(arg: &str) -> anyhow::Result<(String, Value)> {
    let (name, raw) = arg
        .split_once('=')
        .with_context(|| format!("Invalid claim '{arg}'. Expected name=value"))?;
    let name = name.trim();
    if name.is_empty() {
        anyhow::bail!("Invalid claim '{arg}'. Claim name is empty");
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((name.to_string(), value))
}

fn read_token(token: String) -> anyhow::Result<String> {
    if Path::new(&token).is_file() {
        return Ok(fs::read_to_string(&token)?.trim().to_string());
    }
    Ok(token)
}

/// Issue a token.
pub async fn issue(keys: KeySource, args: IssueArgs) -> anyhow::Result<()> {
    let settings = Arc::new(load_settings(keys.config.as_deref(), keys.secret)?);
    let now = Utc::now();

    let mut descriptor = TokenDescriptor::new();
    if let Some(issuer) = &args.issuer {
        descriptor = descriptor.issuer(issuer);
    }
    if let Some(audience) = &args.audience {
        descriptor = descriptor.audience(audience);
    }
    if let Some(subject) = &args.subject {
        descriptor = descriptor.claim("sub", subject.as_str());
    }
    for arg in &args.claims {
        let (name, value) = parse_claim(arg)?;
        descriptor = descriptor.claim(name, value);
    }
    if let Some(expires) = &args.expires {
        descriptor = descriptor.expires(now + parse_duration(expires)?);
    }
    if let Some(not_before) = &args.not_before {
        descriptor = descriptor.not_before(now + parse_duration(not_before)?);
    }
    if let Some(footer) = &args.footer {
        descriptor = descriptor.footer(footer.as_bytes());
    }

    let issued = TokenIssuer::new(settings)
        .issue(descriptor)
        .await
        .context("Failed to issue token")?;

    if let Some(output_path) = args.output {
        fs::write(&output_path, &issued.token)?;
        println!("✔ Token written to: {}", output_path.display());
        println!("  Issued at: {}", issued.issued_at.to_rfc3339());
        println!("  Expires: {}", issued.expires_at.to_rfc3339());
    } else {
        println!("{}", issued.token);
    }

    Ok(())
}

/// Verify a token is valid.
pub fn verify(keys: KeySource, token: String) -> anyhow::Result<()> {
    let settings = Arc::new(load_settings(keys.config.as_deref(), keys.secret)?);
    let verifier = TokenVerifier::new(settings);
    let token_str = read_token(token)?;

    let identity = verifier
        .authenticate(&token_str)
        .map_err(|e| anyhow::anyhow!("✖ Token verification failed ({}): {e}", e.kind()))?;

    println!("✔ Token is valid");
    println!();
    println!("Claims:");
    for claim in &identity.claims {
        println!("  {}: {}", claim.kind.name(), claim.value);
    }

    Ok(())
}

/// Inspect a token without verification.
pub fn inspect(token: String) -> anyhow::Result<()> {
    let token_str = read_token(token)?;
    let info = inspect_unverified(&token_str)?;

    println!("Token Information (NOT verified):");
    println!("  Header: {}", info.header);
    if let Some(footer) = &info.footer {
        println!("  Footer: {footer}");
    }
    println!();
    println!("{}", serde_json::to_string_pretty(&info.claims)?);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn secret() -> KeySource {
        KeySource {
            config: None,
            secret: Some(SECRET.to_string()),
        }
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("24h").unwrap(), TimeDelta::hours(24));
        assert_eq!(parse_duration("7days").unwrap(), TimeDelta::days(7));
        assert_eq!(parse_duration("30m").unwrap(), TimeDelta::minutes(30));
        assert_eq!(parse_duration("1h 30m").unwrap(), TimeDelta::minutes(90));
        assert!(parse_duration("soon").is_err());
    }

    #[test]
    fn test_parse_claim() {
        assert_eq!(
            parse_claim("role=admin").unwrap(),
            ("role".to_string(), Value::String("admin".to_string()))
        );
        assert_eq!(
            parse_claim("level=3").unwrap(),
            ("level".to_string(), serde_json::json!(3))
        );
        assert_eq!(
            parse_claim("tags=[\"a\",\"b\"]").unwrap(),
            ("tags".to_string(), serde_json::json!(["a", "b"]))
        );
        assert!(parse_claim("no-equals").is_err());
        assert!(parse_claim("=value").is_err());
    }

    #[tokio::test]
    async fn test_issue_then_verify_from_file() {
        let dir = tempdir().unwrap();
        let token_path = dir.path().join("token.paseto");

        issue(
            secret(),
            IssueArgs {
                issuer: Some("svc-a".to_string()),
                audience: Some("svc-b".to_string()),
                subject: Some("user-42".to_string()),
                claims: vec!["role=admin".to_string()],
                expires: Some("5m".to_string()),
                footer: Some("kid-1".to_string()),
                output: Some(token_path.clone()),
                ..IssueArgs::default()
            },
        )
        .await
        .unwrap();

        let token = fs::read_to_string(&token_path).unwrap();
        assert!(token.starts_with("v2.public."));

        verify(secret(), token_path.to_string_lossy().to_string()).unwrap();
        inspect(token).unwrap();
    }

    #[tokio::test]
    async fn test_issue_with_config_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("paseto.yaml");
        let token_path = dir.path().join("token.paseto");
        fs::write(
            &config_path,
            format!(
                "secret_key_env: null\nsecret_key: \"{SECRET}\"\nissuer: svc-a\naudience: svc-b\n"
            ),
        )
        .unwrap();

        let keys = KeySource {
            config: Some(config_path),
            secret: None,
        };
        issue(
            keys.clone(),
            IssueArgs {
                subject: Some("user-42".to_string()),
                output: Some(token_path.clone()),
                ..IssueArgs::default()
            },
        )
        .await
        .unwrap();

        let token = fs::read_to_string(&token_path).unwrap();
        verify(keys, token).unwrap();
    }

    #[tokio::test]
    async fn test_issue_without_issuer_fails() {
        let result = issue(
            secret(),
            IssueArgs {
                audience: Some("svc-b".to_string()),
                subject: Some("user-42".to_string()),
                ..IssueArgs::default()
            },
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_verify_rejects_other_secret() {
        let dir = tempdir().unwrap();
        let token_path = dir.path().join("token.paseto");
        issue(
            secret(),
            IssueArgs {
                issuer: Some("svc-a".to_string()),
                audience: Some("svc-b".to_string()),
                subject: Some("user-42".to_string()),
                output: Some(token_path.clone()),
                ..IssueArgs::default()
            },
        )
        .await
        .unwrap();

        let other = KeySource {
            config: None,
            secret: Some("fedcba9876543210fedcba9876543210".to_string()),
        };
        let token = fs::read_to_string(&token_path).unwrap();
        assert!(verify(other, token).is_err());
    }
}
