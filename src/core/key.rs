//! Key derivation from user-supplied secrets.
//!
//! A key arrives either as plain text, used byte-for-byte, or as a Base64
//! string. Base64 input is accepted in both the standard and the URL-safe
//! alphabet, with or without padding, the way browsers' `atob` is usually
//! fed from cookie-adjacent config.
//!
//! # Security
//!
//! [`KeyMaterial`] holds its bytes in a [`Zeroizing`] buffer and redacts
//! them from `Debug` output.

use std::fmt;

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use serde::Deserialize;
use tracing::debug;
use zeroize::Zeroizing;

use crate::error::InspectError;

/// Key length the legacy panel forced Base64 keys to.
#[cfg(test)]
pub(crate) const LEGACY_FIXED_KEY_LEN: usize = 64;

/// Standard alphabet, padding required after normalization, lenient about
/// non-zero trailing bits like `atob`.
const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_allow_trailing_bits(true)
        .with_decode_padding_mode(DecodePaddingMode::RequireCanonical),
);

/// How the user's key input is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyMode {
    /// UTF-8 text, used verbatim.
    #[default]
    Text,
    /// Base64 or Base64URL, decoded to raw bytes.
    Base64,
}

impl KeyMode {
    /// Lowercase name, as written in config and state files.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Base64 => "base64",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "text" => Some(Self::Text),
            "base64" => Some(Self::Base64),
            _ => None,
        }
    }
}

/// What to do with the length of a Base64-decoded key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyLengthPolicy {
    /// Use the decoded bytes at their natural length.
    #[default]
    AsDecoded,
    /// Zero-pad or truncate the decoded bytes to exactly this many bytes.
    Fixed(usize),
}

/// Raw, non-empty key bytes ready for a decryption attempt.
pub struct KeyMaterial {
    bytes: Zeroizing<Vec<u8>>,
    mode: KeyMode,
    decoded_len: usize,
}

impl KeyMaterial {
    /// Wrap raw key bytes, rejecting an empty key.
    pub fn from_bytes(bytes: Vec<u8>, mode: KeyMode) -> Result<Self, InspectError> {
        if bytes.is_empty() {
            return Err(InspectError::NoKeyProvided);
        }
        let decoded_len = bytes.len();
        Ok(Self {
            bytes: Zeroizing::new(bytes),
            mode,
            decoded_len,
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn mode(&self) -> KeyMode {
        self.mode
    }

    /// Human-readable lines describing how the key was derived.
    pub fn debug_lines(&self) -> Vec<String> {
        let mut lines = vec![match self.mode {
            KeyMode::Text => format!("Key Mode: UTF-8 String (Length: {} bytes)", self.len()),
            KeyMode::Base64 => format!("Key Mode: Base64 (Length: {} bytes)", self.len()),
        }];
        if self.decoded_len != self.len() {
            lines.push(format!(
                "Key resized from {} to {} bytes",
                self.decoded_len,
                self.len()
            ));
        }
        lines
    }

    fn resize(mut self, len: usize) -> Result<Self, InspectError> {
        if len == 0 {
            return Err(InspectError::NoKeyProvided);
        }
        self.bytes.resize(len, 0);
        Ok(self)
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("bytes", &"[REDACTED]")
            .field("len", &self.len())
            .field("mode", &self.mode)
            .finish()
    }
}

/// Turns key input plus a [`KeyMode`] into [`KeyMaterial`].
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyDeriver {
    policy: KeyLengthPolicy,
}

impl KeyDeriver {
    pub fn new(policy: KeyLengthPolicy) -> Self {
        Self { policy }
    }

    /// Derive key bytes from `input`.
    ///
    /// # Errors
    ///
    /// [`InspectError::NoKeyProvided`] for blank input or a Base64 string
    /// that decodes to nothing, [`InspectError::InvalidKeyEncoding`] when
    /// Base64 decoding fails.
    pub fn derive(&self, input: &str, mode: KeyMode) -> Result<KeyMaterial, InspectError> {
        if input.trim().is_empty() {
            return Err(InspectError::NoKeyProvided);
        }

        let material = match mode {
            KeyMode::Text => KeyMaterial::from_bytes(input.as_bytes().to_vec(), mode)?,
            KeyMode::Base64 => {
                let bytes = decode_base64_key(input)?;
                let material = KeyMaterial::from_bytes(bytes, mode)?;
                match self.policy {
                    KeyLengthPolicy::AsDecoded => material,
                    KeyLengthPolicy::Fixed(len) => material.resize(len)?,
                }
            }
        };

        debug!(mode = ?material.mode(), len = material.len(), "derived key material");
        Ok(material)
    }
}

/// Normalize URL-safe characters and padding, then decode.
fn decode_base64_key(input: &str) -> Result<Vec<u8>, InspectError> {
    let mut normalized: String = input
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();
    while normalized.len() % 4 != 0 {
        normalized.push('=');
    }

    let normalized = Zeroizing::new(normalized);
    STANDARD_LENIENT
        .decode(normalized.as_bytes())
        .map_err(|e| InspectError::InvalidKeyEncoding {
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn natural() -> KeyDeriver {
        KeyDeriver::default()
    }

    #[test]
    fn test_text_mode_uses_bytes_verbatim() {
        let key = natural().derive(" secret ", KeyMode::Text).unwrap();
        assert_eq!(key.as_bytes(), b" secret ");
        assert_eq!(key.mode(), KeyMode::Text);
    }

    #[test]
    fn test_base64_mode_decodes_standard() {
        let key = natural().derive("YWJj", KeyMode::Base64).unwrap();
        assert_eq!(key.as_bytes(), &[0x61, 0x62, 0x63]);
    }

    #[test]
    fn test_base64_mode_restores_padding() {
        // "ab" is "YWI=" with padding
        let key = natural().derive("YWI", KeyMode::Base64).unwrap();
        assert_eq!(key.as_bytes(), b"ab");
    }

    #[test]
    fn test_base64_mode_accepts_url_safe_alphabet() {
        // 0xfb 0xff encodes to "+/8=" in the standard alphabet
        let key = natural().derive("-_8", KeyMode::Base64).unwrap();
        assert_eq!(key.as_bytes(), &[0xfb, 0xff]);
    }

    #[test]
    fn test_base64_mode_trims_surrounding_whitespace() {
        let key = natural().derive("  YWJj\n", KeyMode::Base64).unwrap();
        assert_eq!(key.as_bytes(), b"abc");
    }

    #[test]
    fn test_base64_mode_rejects_garbage() {
        let err = natural().derive("!!!", KeyMode::Base64).unwrap_err();
        assert!(matches!(err, InspectError::InvalidKeyEncoding { .. }));
    }

    #[test]
    fn test_base64_mode_rejects_impossible_length() {
        // a single trailing sextet cannot encode a byte
        let err = natural().derive("YWJjZ", KeyMode::Base64).unwrap_err();
        assert!(matches!(err, InspectError::InvalidKeyEncoding { .. }));
    }

    #[test]
    fn test_blank_input_is_no_key_in_both_modes() {
        for mode in [KeyMode::Text, KeyMode::Base64] {
            assert_eq!(
                natural().derive("   ", mode).unwrap_err(),
                InspectError::NoKeyProvided
            );
            assert_eq!(natural().derive("", mode).unwrap_err(), InspectError::NoKeyProvided);
        }
    }

    #[test]
    fn test_fixed_policy_pads_short_keys_with_zeros() {
        let deriver = KeyDeriver::new(KeyLengthPolicy::Fixed(LEGACY_FIXED_KEY_LEN));
        let key = deriver.derive("YWJj", KeyMode::Base64).unwrap();
        assert_eq!(key.len(), 64);
        assert_eq!(&key.as_bytes()[..3], b"abc");
        assert!(key.as_bytes()[3..].iter().all(|b| *b == 0));
        assert!(
            key.debug_lines()
                .iter()
                .any(|l| l == "Key resized from 3 to 64 bytes")
        );
    }

    #[test]
    fn test_fixed_policy_truncates_long_keys() {
        let deriver = KeyDeriver::new(KeyLengthPolicy::Fixed(2));
        let key = deriver.derive("YWJj", KeyMode::Base64).unwrap();
        assert_eq!(key.as_bytes(), b"ab");
    }

    #[test]
    fn test_fixed_policy_ignores_text_mode() {
        let deriver = KeyDeriver::new(KeyLengthPolicy::Fixed(64));
        let key = deriver.derive("abc", KeyMode::Text).unwrap();
        assert_eq!(key.len(), 3);
    }

    #[test]
    fn test_debug_lines_describe_mode_and_length() {
        let key = natural().derive("abc", KeyMode::Text).unwrap();
        assert_eq!(
            key.debug_lines(),
            vec!["Key Mode: UTF-8 String (Length: 3 bytes)".to_string()]
        );
        let key = natural().derive("YWJj", KeyMode::Base64).unwrap();
        assert_eq!(
            key.debug_lines(),
            vec!["Key Mode: Base64 (Length: 3 bytes)".to_string()]
        );
    }

    #[test]
    fn test_debug_redacts_key_bytes() {
        let key = natural().derive("hunter2", KeyMode::Text).unwrap();
        let debug_output = format!("{key:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("hunter2"));
    }

    #[test]
    fn test_from_bytes_rejects_empty() {
        assert_eq!(
            KeyMaterial::from_bytes(Vec::new(), KeyMode::Base64).unwrap_err(),
            InspectError::NoKeyProvided
        );
    }

    #[test]
    fn test_key_mode_names() {
        for mode in [KeyMode::Text, KeyMode::Base64] {
            assert_eq!(KeyMode::from_name(mode.as_str()), Some(mode));
        }
        assert_eq!(KeyMode::from_name("b64"), None);
    }
}
