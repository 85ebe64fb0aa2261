//! Base64URL segment decoding.
//!
//! Token segments are unpadded Base64URL, but cookie values occasionally
//! carry trailing `=` padding. The engine here accepts both.

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

use crate::error::InspectError;

/// URL-safe engine that tolerates optional padding on decode.
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decode a Base64URL segment, naming the segment in the error.
pub(crate) fn decode_segment(input: &str, segment: &str) -> Result<Vec<u8>, InspectError> {
    URL_SAFE_LENIENT
        .decode(input)
        .map_err(|_| InspectError::malformed(format!("{segment} is not valid base64url")))
}

/// Decode a Base64URL segment and parse it as a JSON value.
pub(crate) fn decode_json(input: &str, segment: &str) -> Result<serde_json::Value, InspectError> {
    let bytes = decode_segment(input, segment)?;
    serde_json::from_slice(&bytes)
        .map_err(|e| InspectError::malformed(format!("{segment} is not valid JSON: {e}")))
}

#[cfg(test)]
pub(crate) fn encode(bytes: &[u8]) -> String {
    URL_SAFE_LENIENT.encode(bytes)
}
