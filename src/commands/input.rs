//! Token and key acquisition from arguments, environment and stdin.
//!
//! Values read here are secrets and are kept in [`Zeroizing`] buffers.

use std::env;
use std::io::{self, IsTerminal, Read};

use tracing::debug;
use zeroize::Zeroizing;

use crate::cli::{KeyArgs, TokenArgs};
use crate::error::CookieLensError;

/// Resolve the token from the argument, `--token-env`, or stdin, in that
/// order. Surrounding whitespace is trimmed.
///
/// # Errors
///
/// [`CookieLensError::NoTokenProvided`] if the selected source is empty or
/// no source is available; environment variable errors from `--token-env`.
pub fn resolve_token(args: &TokenArgs) -> Result<Zeroizing<String>, CookieLensError> {
    let raw = if let Some(token) = &args.token {
        debug!("token from argument");
        Zeroizing::new(token.clone())
    } else if let Some(name) = &args.token_env {
        debug!(var = %name, "token from environment");
        read_env_var(name)?
    } else {
        debug!("token from stdin");
        read_stdin()?
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CookieLensError::NoTokenProvided);
    }
    Ok(Zeroizing::new(trimmed.to_string()))
}

/// Resolve the key from `--key` or `--key-env`. `None` when neither was
/// given.
pub fn resolve_key(args: &KeyArgs) -> Result<Option<Zeroizing<String>>, CookieLensError> {
    if let Some(key) = &args.key {
        return Ok(Some(key.clone()));
    }
    match &args.key_env {
        Some(name) => read_env_var(name).map(Some),
        None => Ok(None),
    }
}

/// Read an environment variable after validating its name.
fn read_env_var(name: &str) -> Result<Zeroizing<String>, CookieLensError> {
    validate_env_var_name(name)?;
    env::var(name)
        .map(Zeroizing::new)
        .map_err(|_| CookieLensError::EnvVarNotFound {
            name: name.to_string(),
        })
}

/// Names `std::env::var` would panic on or silently misread.
fn validate_env_var_name(name: &str) -> Result<(), CookieLensError> {
    if name.is_empty() || name.contains('=') || name.contains('\0') {
        return Err(CookieLensError::InvalidEnvVarName {
            name: name.to_string(),
        });
    }
    Ok(())
}

fn read_stdin() -> Result<Zeroizing<String>, CookieLensError> {
    let mut stdin = io::stdin();
    if stdin.is_terminal() {
        return Err(CookieLensError::NoTokenProvided);
    }
    let mut buffer = Zeroizing::new(String::new());
    stdin
        .read_to_string(&mut buffer)
        .map_err(|_| CookieLensError::NoTokenProvided)?;
    Ok(buffer)
}
