//! # paseto-auth-core
//!
//! Shared configuration types and constants for paseto-auth.
//!
//! The token crate consumes a [`PasetoConfig`] once at startup and turns it
//! into immutable settings; nothing in here is mutated at runtime.

pub mod config;
pub mod defaults;

pub use config::{ConfigError, PasetoConfig};
