//! Key management commands.
//!
//! `paseto-auth keys generate` - Generate a new 32-byte secret.
//! `paseto-auth keys public` - Print the public key derived from a secret.

use super::load_settings;
use paseto_auth_token::generate_secret;
use std::fs;
use std::path::{Path, PathBuf};

/// Generate a new secret.
pub fn generate(output: Option<PathBuf>) -> anyhow::Result<()> {
    let secret = generate_secret();

    if let Some(output_path) = output {
        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&output_path, &secret)?;

        let settings = load_settings(None, Some(secret))?;
        println!("✔ Generated secret: {}", output_path.display());
        println!("  Public key: {}", settings.public_key());
        println!();
        println!("⚠️  Keep the secret safe! Anyone holding it can issue tokens.");
        println!();
        println!("Set as environment variable:");
        println!("  export PASETO_SECRET_KEY=$(cat {})", output_path.display());
    } else {
        println!("{secret}");
    }

    Ok(())
}

/// Print the public key for a secret, for verification-only deployments.
pub fn public(config: Option<&Path>, secret: Option<String>) -> anyhow::Result<()> {
    let settings = load_settings(config, secret)?;
    println!("{}", settings.public_key());
    Ok(())
}
