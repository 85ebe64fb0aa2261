//! Domain error types for cookie-lens.
//!
//! Two families live here, both defined with `thiserror`:
//!
//! - [`InspectError`] is raised inside the token inspection core and is
//!   always folded into an [`InspectionResult`](crate::core::report::InspectionResult)
//!   by the inspector. It never reaches the CLI as an `Err`.
//! - [`CookieLensError`] covers the shell around the core (input
//!   acquisition, cookie jar, state and config files). These are converted
//!   to user-facing messages at the CLI boundary.

use serde::Serialize;
use thiserror::Error;

/// Errors produced while deriving keys, decoding or decrypting tokens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InspectError {
    /// The key input was empty or whitespace only.
    #[error("No secret key provided.")]
    NoKeyProvided,

    /// Base64 key mode was selected but the input is not valid Base64.
    #[error("Invalid Base64 key string. Details: {reason}")]
    InvalidKeyEncoding {
        /// Decoder diagnostic.
        reason: String,
    },

    /// Segment count, Base64URL or JSON structure could not be parsed.
    #[error("malformed token: {reason}")]
    MalformedToken {
        /// Which part of the token was rejected and why.
        reason: String,
    },

    /// Authenticated decryption rejected the integrity tag.
    #[error("decryption operation failed: authentication tag mismatch")]
    TagMismatch,

    /// The key length is incompatible with the token's algorithm.
    #[error("Key length {actual} bytes is invalid for {algorithm} (expected {expected} bytes)")]
    KeyLengthMismatch {
        /// The `alg` or `enc` identifier that constrains the key.
        algorithm: String,
        /// Required key length in bytes.
        expected: usize,
        /// Supplied key length in bytes.
        actual: usize,
    },

    /// Any other failure reported by a cryptographic primitive.
    #[error("decryption failed: {reason}")]
    DecryptionFailed {
        /// Description of the failure.
        reason: String,
    },

    /// Neither a 3- nor a 5-segment token, and the claims did not decode.
    #[error("Not a recognized JWT/JWE format.")]
    UnrecognizedFormat,

    /// The header names an algorithm outside the supported symmetric set.
    #[error("unsupported algorithm: {algorithm}")]
    UnsupportedAlgorithm {
        /// The offending header value.
        algorithm: String,
    },
}

/// Structural tag for an [`InspectError`], stable across message changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    NoKeyProvided,
    InvalidKeyEncoding,
    MalformedToken,
    TagMismatch,
    KeyLengthMismatch,
    DecryptionFailed,
    UnrecognizedFormat,
    UnsupportedAlgorithm,
}

impl InspectError {
    /// The structural kind of this error.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::NoKeyProvided => FailureKind::NoKeyProvided,
            Self::InvalidKeyEncoding { .. } => FailureKind::InvalidKeyEncoding,
            Self::MalformedToken { .. } => FailureKind::MalformedToken,
            Self::TagMismatch => FailureKind::TagMismatch,
            Self::KeyLengthMismatch { .. } => FailureKind::KeyLengthMismatch,
            Self::DecryptionFailed { .. } => FailureKind::DecryptionFailed,
            Self::UnrecognizedFormat => FailureKind::UnrecognizedFormat,
            Self::UnsupportedAlgorithm { .. } => FailureKind::UnsupportedAlgorithm,
        }
    }

    /// Probable-cause annotation shown under a failed decryption.
    pub fn cause_hint(&self) -> Option<&'static str> {
        match self {
            Self::TagMismatch => Some("Key mismatch or invalid tag"),
            Self::KeyLengthMismatch { .. } => {
                Some("The key length does not match the algorithm requirements")
            }
            Self::UnsupportedAlgorithm { .. } => {
                Some("Only symmetric key management and content encryption are supported")
            }
            _ => None,
        }
    }

    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedToken {
            reason: reason.into(),
        }
    }
}

/// Errors raised by the CLI shell around the inspection core.
#[derive(Debug, Error)]
pub enum CookieLensError {
    /// No token was provided via any input method.
    #[error("no token provided: pass a token as an argument, via --token-env, or through stdin")]
    NoTokenProvided,

    /// The specified environment variable is not set.
    #[error("environment variable '{name}' is not set")]
    EnvVarNotFound {
        /// Name of the missing environment variable.
        name: String,
    },

    /// The environment variable name cannot be looked up.
    #[error("invalid environment variable name '{name}'")]
    InvalidEnvVarName {
        /// The rejected name.
        name: String,
    },

    /// No cookie in the jar matches the requested domain and name.
    #[error("no cookie named '{name}' for domain '{domain}'")]
    CookieNotFound {
        /// Cookie domain as written in the jar.
        domain: String,
        /// Cookie name.
        name: String,
    },

    /// The cookie jar file could not be read, parsed or written.
    #[error("cookie jar '{path}': {reason}")]
    JarError {
        /// Path to the jar file.
        path: String,
        /// Description of the failure.
        reason: String,
    },

    /// The state file could not be read, parsed or written.
    #[error("state file '{path}': {reason}")]
    StateError {
        /// Path to the state file.
        path: String,
        /// Description of the failure.
        reason: String,
    },

    /// The configuration file is unreadable or invalid.
    #[error("config file '{path}': {reason}")]
    ConfigError {
        /// Path to the config file.
        path: String,
        /// Description of the failure.
        reason: String,
    },

    /// No cookie jar was given on the command line or in the config file.
    #[error("no cookie jar configured: pass --jar or set [storage] jar in the config file")]
    NoJarConfigured,
}
