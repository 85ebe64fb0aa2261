//! Display-only decoding of signed tokens.
//!
//! Splits a JWS into header, payload and signature, base64url-decodes the
//! first two and parses them as JSON. The signature is never checked:
//! claims decoded here are for display, not for authorization.

use std::fmt;

use serde_json::Value;

use super::base64url;
use super::token::{TokenHeader, check_length, segments};
use crate::error::InspectError;

/// The decoded parts of a signed token.
///
/// Implements a custom `Debug` that redacts `payload` and `signature`
/// to prevent accidental leakage of claim data.
pub struct DecodedToken {
    /// The parsed header (typically `alg` and `typ`).
    pub header: TokenHeader,
    /// The parsed claims object.
    pub payload: Value,
    /// The raw base64url-encoded signature segment.
    pub signature: String,
}

impl fmt::Debug for DecodedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodedToken")
            .field("header", &self.header)
            .field("payload", &"[REDACTED]")
            .field("signature", &"[REDACTED]")
            .finish()
    }
}

/// Decode a signed token into its constituent parts.
///
/// # Errors
///
/// [`InspectError::MalformedToken`] if the token doesn't have exactly
/// three parts, a segment is not base64url, or the header or payload is
/// not a JSON object.
pub fn decode_token(token: &str) -> Result<DecodedToken, InspectError> {
    check_length(token)?;
    let parts = segments(token);
    if parts.len() != 3 {
        return Err(InspectError::malformed(
            "expected 'header.payload.signature' structure",
        ));
    }

    let header = TokenHeader::decode(parts[0])?;
    let payload = decode_claims_value(parts[1])?;

    Ok(DecodedToken {
        header,
        payload,
        signature: parts[2].to_string(),
    })
}

/// Decode and pretty-print the claims of a signed token.
///
/// Returns `None` on a segment-count mismatch or an undecodable payload.
/// The header segment is not required to decode.
pub fn decode_claims(token: &str) -> Option<String> {
    if check_length(token).is_err() {
        return None;
    }
    let parts = segments(token);
    if parts.len() != 3 {
        return None;
    }
    let claims = decode_claims_value(parts[1]).ok()?;
    serde_json::to_string_pretty(&claims).ok()
}

/// The claims set must be a top-level JSON object.
fn decode_claims_value(segment: &str) -> Result<Value, InspectError> {
    let payload = base64url::decode_json(segment, "payload")?;
    if !payload.is_object() {
        return Err(InspectError::malformed("payload is not a JSON object"));
    }
    Ok(payload)
}
