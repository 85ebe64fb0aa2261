//! Token classification and header extraction.
//!
//! Compact serialization is a list of Base64URL segments joined by `.`:
//! three segments for a signed token (`header.payload.signature`), five
//! for an encrypted one (`header.encryptedKey.iv.ciphertext.tag`).
//! Classification looks only at the segment count; the header is decoded
//! on a best-effort basis and never fails the classification.

use serde_json::{Map, Value};
use tracing::debug;

use super::base64url;
use crate::error::InspectError;

/// Maximum token length accepted for decoding (64 KiB).
pub(crate) const MAX_TOKEN_LENGTH: usize = 64 * 1024;

/// Structural kind of a compact-serialized token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Three segments: a JWS (signed or unsecured JWT).
    Signed,
    /// Five segments: a JWE.
    Encrypted,
    /// Any other segment count.
    Unrecognized,
}

impl TokenKind {
    /// Classify by segment count alone.
    pub fn from_segment_count(count: usize) -> Self {
        match count {
            3 => Self::Signed,
            5 => Self::Encrypted,
            _ => Self::Unrecognized,
        }
    }
}

/// The decoded JSON object of a token's first segment.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenHeader(Map<String, Value>);

impl TokenHeader {
    /// Decode a header segment, requiring a JSON object.
    pub fn decode(segment: &str) -> Result<Self, InspectError> {
        match base64url::decode_json(segment, "header")? {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(InspectError::malformed("header is not a JSON object")),
        }
    }

    /// Algorithm identifier (`alg`).
    pub fn alg(&self) -> Option<&str> {
        self.get_str("alg")
    }

    /// Content encryption identifier (`enc`), present on encrypted tokens.
    pub fn enc(&self) -> Option<&str> {
        self.get_str("enc")
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Compact JSON rendering, in the header's own member order.
    pub fn to_compact_json(&self) -> String {
        Value::Object(self.0.clone()).to_string()
    }
}

/// Result of [`classify`].
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub kind: TokenKind,
    pub header: Option<TokenHeader>,
}

/// Split a token into its `.`-separated segments.
pub(crate) fn segments(token: &str) -> Vec<&str> {
    token.split('.').collect()
}

/// Classify `token` and recover its header if possible.
///
/// Accepts any string: oversized or malformed input yields
/// [`TokenKind::Unrecognized`] or a missing header, never an error.
pub fn classify(token: &str) -> Classification {
    let parts = segments(token);
    let kind = TokenKind::from_segment_count(parts.len());
    let header = if token.len() > MAX_TOKEN_LENGTH {
        None
    } else {
        TokenHeader::decode(parts[0]).ok()
    };

    debug!(
        ?kind,
        segments = parts.len(),
        header = header.is_some(),
        "classified token"
    );
    Classification { kind, header }
}

/// Reject tokens beyond [`MAX_TOKEN_LENGTH`].
pub(crate) fn check_length(token: &str) -> Result<(), InspectError> {
    if token.len() > MAX_TOKEN_LENGTH {
        return Err(InspectError::malformed(format!(
            "token exceeds maximum length of {MAX_TOKEN_LENGTH} bytes"
        )));
    }
    Ok(())
}
