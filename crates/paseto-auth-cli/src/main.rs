use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

use commands::token::{IssueArgs, KeySource};

#[derive(Parser, Debug)]
#[command(name = "paseto-auth", version, about = "Issue and verify PASETO identity tokens")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Secret and public key management
    Keys {
        #[command(subcommand)]
        cmd: KeysCommand,
    },

    /// Issue, verify and inspect tokens
    Token {
        #[command(subcommand)]
        cmd: TokenCommand,
    },
}

#[derive(Subcommand, Debug)]
enum KeysCommand {
    /// Generate a new 32-character secret
    Generate {
        /// Write the secret to this file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Print the hex public key derived from a secret
    Public {
        #[command(flatten)]
        keys: KeyArgs,
    },
}

#[derive(clap::Args, Debug)]
struct KeyArgs {
    /// Secret, or a path to a file containing it
    #[arg(long, env = "PASETO_SECRET_KEY", hide_env_values = true)]
    secret: Option<String>,

    /// YAML configuration file; takes precedence over --secret
    #[arg(long)]
    config: Option<PathBuf>,
}

impl From<KeyArgs> for KeySource {
    fn from(args: KeyArgs) -> Self {
        KeySource {
            config: args.config,
            secret: args.secret,
        }
    }
}

#[derive(Subcommand, Debug)]
enum TokenCommand {
    /// Issue a signed token
    Issue {
        #[command(flatten)]
        keys: KeyArgs,

        /// Issuer claim (defaults to the configured issuer)
        #[arg(long)]
        issuer: Option<String>,

        /// Audience claim (defaults to the configured audience)
        #[arg(long)]
        audience: Option<String>,

        /// Subject claim
        #[arg(long)]
        subject: Option<String>,

        /// Extra claim as name=value; may be repeated
        #[arg(long = "claim", value_name = "NAME=VALUE")]
        claims: Vec<String>,

        /// Lifetime from now, e.g. "15m" (defaults to the configured lifetime)
        #[arg(long)]
        expires: Option<String>,

        /// Delay before the token becomes valid, e.g. "30s"
        #[arg(long)]
        not_before: Option<String>,

        /// Footer carried in clear text and covered by the signature
        #[arg(long)]
        footer: Option<String>,

        /// Write the token to this file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Verify a token and print its claims
    Verify {
        #[command(flatten)]
        keys: KeyArgs,

        /// Token, or a path to a file containing it
        token: String,
    },

    /// Print a token's contents without verifying it
    Inspect {
        /// Token, or a path to a file containing it
        token: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.cmd {
        Command::Keys { cmd } => match cmd {
            KeysCommand::Generate { output } => commands::keys::generate(output)?,
            KeysCommand::Public { keys } => {
                commands::keys::public(keys.config.as_deref(), keys.secret)?
            }
        },

        Command::Token { cmd } => match cmd {
            TokenCommand::Issue {
                keys,
                issuer,
                audience,
                subject,
                claims,
                expires,
                not_before,
                footer,
                output,
            } => {
                let args = IssueArgs {
                    issuer,
                    audience,
                    subject,
                    claims,
                    expires,
                    not_before,
                    footer,
                    output,
                };
                commands::token::issue(keys.into(), args).await?
            }
            TokenCommand::Verify { keys, token } => commands::token::verify(keys.into(), token)?,
            TokenCommand::Inspect { token } => commands::token::inspect(token)?,
        },
    }

    Ok(())
}
