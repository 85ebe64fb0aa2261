//! The inspection report handed to the presentation layer.

use std::fmt;

use serde::Serialize;

use crate::error::{FailureKind, InspectError};

/// How the content of a report was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InspectionMethod {
    /// Claims of a signed token, decoded without verification.
    JwtDecode,
    /// Plaintext of an encrypted token.
    JweDecryption,
    /// Nothing could be shown; `content` explains why.
    Error,
}

impl InspectionMethod {
    pub fn label(self) -> &'static str {
        match self {
            Self::JwtDecode => "Decoded JWT",
            Self::JweDecryption => "Decrypted JWE",
            Self::Error => "Error",
        }
    }
}

impl fmt::Display for InspectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of one inspection. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InspectionResult {
    pub method: InspectionMethod,
    /// Compact JSON of the token header, when it could be decoded.
    pub header_summary: Option<String>,
    /// Ordered notes on key derivation and algorithms.
    pub debug_trail: Vec<String>,
    /// Pretty-printed claims or plaintext, or the error message.
    pub content: String,
    pub is_error: bool,
    /// Structural kind of the failure when `is_error` is set.
    pub failure: Option<FailureKind>,
}

impl InspectionResult {
    pub(crate) fn decoded(header_summary: Option<String>, claims: String) -> Self {
        Self {
            method: InspectionMethod::JwtDecode,
            header_summary,
            debug_trail: Vec::new(),
            content: claims,
            is_error: false,
            failure: None,
        }
    }

    pub(crate) fn decrypted(
        header_summary: Option<String>,
        debug_trail: Vec<String>,
        plaintext: String,
    ) -> Self {
        Self {
            method: InspectionMethod::JweDecryption,
            header_summary,
            debug_trail,
            content: plaintext,
            is_error: false,
            failure: None,
        }
    }

    pub(crate) fn failed(
        header_summary: Option<String>,
        debug_trail: Vec<String>,
        error: &InspectError,
        content: String,
    ) -> Self {
        Self {
            method: InspectionMethod::Error,
            header_summary,
            debug_trail,
            content,
            is_error: true,
            failure: Some(error.kind()),
        }
    }
}

/// `Error: <message>` with a probable-cause line when one is known.
pub(crate) fn describe_failure(error: &InspectError) -> String {
    match error.cause_hint() {
        Some(hint) => format!("Error: {error}\n(Cause: {hint})"),
        None => format!("Error: {error}"),
    }
}
