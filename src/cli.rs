//! CLI argument definitions for cookie-lens.
//!
//! Uses `clap` derive macros to define the command-line interface.
//! Each subcommand has its own argument struct for type-safe parsing.
//!
//! # Security
//!
//! Argument structs that can hold a token or a key implement a custom
//! `Debug` that redacts those fields, preventing accidental leakage
//! through debug formatting, error chains, or logging.

use std::fmt;
use std::path::PathBuf;

use clap::builder::RangedU64ValueParser;
use clap::{ArgAction, Parser, Subcommand};
use zeroize::Zeroizing;

use crate::core::key::KeyMode;

/// Inspect, decode and decrypt the JWT and JWE tokens stored in cookies.
#[derive(Debug, Parser)]
#[command(name = "cookie-lens")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the config file.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug). Logs go to stderr.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Inspect a token: decode a signed JWT or decrypt a JWE.
    Inspect(InspectArgs),

    /// Decode a signed JWT's header and claims without verifying it.
    Decode(DecodeArgs),

    /// List, show, inspect or delete cookies in a Netscape cookie jar.
    Cookies(CookiesArgs),
}

/// Token source shared by `inspect` and `decode`.
#[derive(clap::Args)]
pub struct TokenArgs {
    /// The token. If omitted, reads from stdin.
    pub token: Option<String>,

    /// Read the token from the specified environment variable.
    #[arg(long, value_name = "VAR_NAME", conflicts_with = "token")]
    pub token_env: Option<String>,
}

impl fmt::Debug for TokenArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenArgs")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("token_env", &self.token_env)
            .finish()
    }
}

/// Decryption key options.
#[derive(clap::Args)]
pub struct KeyArgs {
    /// Secret key used to decrypt JWE tokens.
    ///
    /// WARNING: Passing secrets via CLI arguments may expose them in shell
    /// history. Prefer using --key-env instead.
    #[arg(long, value_name = "KEY", value_parser = parse_zeroizing_string)]
    pub key: Option<Zeroizing<String>>,

    /// Read the secret key from the specified environment variable.
    #[arg(long, value_name = "VAR_NAME", conflicts_with = "key")]
    pub key_env: Option<String>,

    /// Treat the key as Base64 or Base64URL encoded bytes.
    #[arg(long, conflicts_with = "text")]
    pub base64: bool,

    /// Treat the key as UTF-8 text, used byte-for-byte.
    #[arg(long)]
    pub text: bool,

    /// Zero-pad or truncate Base64 keys to exactly this many bytes.
    #[arg(long, value_name = "BYTES", value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    pub fixed_key_length: Option<usize>,
}

impl KeyArgs {
    /// The key mode chosen on the command line, if any.
    pub fn mode(&self) -> Option<KeyMode> {
        if self.base64 {
            Some(KeyMode::Base64)
        } else if self.text {
            Some(KeyMode::Text)
        } else {
            None
        }
    }
}

impl fmt::Debug for KeyArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyArgs")
            .field("key", &self.key.as_ref().map(|_| "[REDACTED]"))
            .field("key_env", &self.key_env)
            .field("base64", &self.base64)
            .field("text", &self.text)
            .field("fixed_key_length", &self.fixed_key_length)
            .finish()
    }
}

/// Arguments for the `inspect` subcommand.
#[derive(Debug, clap::Args)]
pub struct InspectArgs {
    #[command(flatten)]
    pub token: TokenArgs,

    #[command(flatten)]
    pub key: KeyArgs,

    /// Output the inspection report as JSON (machine-readable).
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `decode` subcommand.
#[derive(Debug, clap::Args)]
pub struct DecodeArgs {
    #[command(flatten)]
    pub token: TokenArgs,

    /// Output raw JSON without colors (machine-readable).
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `cookies` subcommand group.
#[derive(Debug, clap::Args)]
pub struct CookiesArgs {
    /// Path to a Netscape `cookies.txt` jar. Overrides `[storage] jar`.
    #[arg(long, global = true, value_name = "FILE")]
    pub jar: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CookiesCommand,
}

#[derive(Debug, Subcommand)]
pub enum CookiesCommand {
    /// List cookies, sorted by domain.
    List(ListArgs),

    /// Delete a cookie and forget its saved key.
    Delete(CookieRef),

    /// Inspect a cookie's value.
    Inspect(CookieInspectArgs),

    /// Print a cookie's raw value, e.g. to pipe it elsewhere.
    Show(ShowArgs),
}

/// Arguments for `cookies list`.
#[derive(Debug, clap::Args)]
pub struct ListArgs {
    /// Filter by name or domain, ignoring case. Remembered for next time.
    #[arg(long, short, value_name = "TERM", conflicts_with = "clear_search")]
    pub search: Option<String>,

    /// Forget the remembered search term.
    #[arg(long)]
    pub clear_search: bool,

    /// Only show cookies whose value looks like a token.
    #[arg(long)]
    pub tokens_only: bool,

    /// Output the listing as JSON (machine-readable). Values are omitted.
    #[arg(long)]
    pub json: bool,
}

/// Identifies one cookie in the jar.
#[derive(Debug, clap::Args)]
pub struct CookieRef {
    /// Cookie domain exactly as stored, including any leading dot.
    #[arg(long)]
    pub domain: String,

    /// Cookie name.
    #[arg(long)]
    pub name: String,
}

/// Arguments for `cookies inspect`.
#[derive(Debug, clap::Args)]
pub struct CookieInspectArgs {
    #[command(flatten)]
    pub cookie: CookieRef,

    #[command(flatten)]
    pub key: KeyArgs,

    /// Output the inspection report as JSON (machine-readable).
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `cookies show`.
#[derive(Debug, clap::Args)]
pub struct ShowArgs {
    #[command(flatten)]
    pub cookie: CookieRef,

    /// Output the cookie, value included, as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Parse a string into a `Zeroizing<String>` for secure CLI arguments.
fn parse_zeroizing_string(s: &str) -> Result<Zeroizing<String>, std::convert::Infallible> {
    Ok(Zeroizing::new(s.to_string()))
}
