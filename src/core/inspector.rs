//! Inspection orchestrator.
//!
//! Sequences classification, claims decoding and decryption into a single
//! [`InspectionResult`]. [`Inspector::inspect`] is total: every failure is
//! reported inside the result, never returned as an error or a panic.
//! The inspector holds no mutable state and can be shared across threads.

use tracing::debug;

use super::decoder::decode_claims;
use super::decryptor::{ContentCipher, Decryptor, RustCryptoCipher};
use super::key::{KeyDeriver, KeyLengthPolicy, KeyMode};
use super::report::{InspectionResult, describe_failure};
use super::token::{TokenHeader, TokenKind, classify};
use crate::error::InspectError;

const UNRECOGNIZED_MESSAGE: &str = "Not a recognized JWT/JWE format.";
const UNPARSEABLE_MESSAGE: &str = "Could not parse token.";

/// Inspects cookie values that look like tokens.
#[derive(Debug, Clone, Default)]
pub struct Inspector<C = RustCryptoCipher> {
    deriver: KeyDeriver,
    decryptor: Decryptor<C>,
}

impl Inspector {
    /// Inspector using the RustCrypto primitives.
    pub fn new(policy: KeyLengthPolicy) -> Self {
        Self::with_cipher(policy, RustCryptoCipher)
    }
}

impl<C: ContentCipher> Inspector<C> {
    pub fn with_cipher(policy: KeyLengthPolicy, cipher: C) -> Self {
        Self {
            deriver: KeyDeriver::new(policy),
            decryptor: Decryptor::new(cipher),
        }
    }

    /// Inspect `token`, decrypting with `key_input` if it is encrypted.
    ///
    /// The key is ignored for signed tokens.
    pub fn inspect(&self, token: &str, key_input: &str, key_mode: KeyMode) -> InspectionResult {
        let classification = classify(token);
        let header_summary = classification
            .header
            .as_ref()
            .map(TokenHeader::to_compact_json);

        let result = match classification.kind {
            TokenKind::Encrypted => self.decrypt(token, key_input, key_mode, header_summary),
            TokenKind::Signed => match decode_claims(token) {
                Some(claims) => InspectionResult::decoded(header_summary, claims),
                None => InspectionResult::failed(
                    header_summary,
                    Vec::new(),
                    &InspectError::malformed("claims could not be decoded"),
                    UNPARSEABLE_MESSAGE.to_string(),
                ),
            },
            TokenKind::Unrecognized => match decode_claims(token) {
                Some(claims) => InspectionResult::decoded(header_summary, claims),
                None => InspectionResult::failed(
                    header_summary,
                    Vec::new(),
                    &InspectError::UnrecognizedFormat,
                    UNRECOGNIZED_MESSAGE.to_string(),
                ),
            },
        };

        debug!(
            kind = ?classification.kind,
            method = %result.method,
            failure = ?result.failure,
            "inspection finished"
        );
        result
    }

    fn decrypt(
        &self,
        token: &str,
        key_input: &str,
        key_mode: KeyMode,
        header_summary: Option<String>,
    ) -> InspectionResult {
        let key = match self.deriver.derive(key_input, key_mode) {
            Ok(key) => key,
            Err(error) => {
                return InspectionResult::failed(
                    header_summary,
                    Vec::new(),
                    &error,
                    describe_failure(&error),
                );
            }
        };

        let mut trail = key.debug_lines();
        match self.decryptor.decrypt(token, &key) {
            Ok(decrypted) => {
                trail.extend(decrypted.debug_trail);
                InspectionResult::decrypted(header_summary, trail, decrypted.plaintext)
            }
            Err(failure) => {
                trail.extend(failure.debug_trail);
                InspectionResult::failed(
                    header_summary,
                    trail,
                    &failure.error,
                    describe_failure(&failure.error),
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;

    use super::*;
    use crate::core::base64url;
    use crate::core::decryptor::EncryptedToken;
    use crate::core::key::{KeyMaterial, LEGACY_FIXED_KEY_LEN};
    use crate::core::report::InspectionMethod;
    use crate::core::test_support::seal;
    use crate::error::FailureKind;

    /// Counts calls and never decrypts anything.
    #[derive(Default)]
    struct CountingCipher {
        calls: AtomicUsize,
    }

    impl ContentCipher for CountingCipher {
        fn open(&self, _token: &EncryptedToken<'_>, _key: &KeyMaterial) -> Result<Vec<u8>, InspectError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(b"stub".to_vec())
        }
    }

    fn inspector() -> Inspector {
        Inspector::default()
    }

    fn unsigned_token(claims: &str) -> String {
        format!(
            "{}.{}.",
            base64url::encode(br#"{"alg":"none"}"#),
            base64url::encode(claims.as_bytes())
        )
    }

    #[test]
    fn test_encrypted_token_with_base64_key() {
        let key = [0x5au8; 32];
        let token = seal("dir", "A256GCM", &key, br#"{"sub":"123"}"#);
        assert!(token.starts_with("eyJhbGciOiJkaXIiLCJlbmMiOiJBMjU2R0NNIn0."));

        let result = inspector().inspect(&token, &STANDARD.encode(key), KeyMode::Base64);

        assert_eq!(result.method, InspectionMethod::JweDecryption);
        assert!(!result.is_error);
        assert!(result.content.contains("\"sub\": \"123\""));
        assert_eq!(
            result.header_summary.as_deref(),
            Some(r#"{"alg":"dir","enc":"A256GCM"}"#)
        );
        assert_eq!(
            result.debug_trail,
            vec![
                "Key Mode: Base64 (Length: 32 bytes)",
                "Token Algorithm: dir",
                "Token Encryption: A256GCM",
            ]
        );
    }

    #[test]
    fn test_encrypted_token_with_text_key() {
        let key = b"0123456789abcdef";
        let token = seal("A128KW", "A128CBC-HS256", key, b"hello");
        let result = inspector().inspect(&token, "0123456789abcdef", KeyMode::Text);
        assert_eq!(result.method, InspectionMethod::JweDecryption);
        assert_eq!(result.content, "hello");
        assert_eq!(result.debug_trail[0], "Key Mode: UTF-8 String (Length: 16 bytes)");
    }

    #[test]
    fn test_signed_token_ignores_key() {
        let token = unsigned_token(r#"{"role":"admin"}"#);
        for (key, mode) in [("", KeyMode::Text), ("!!!", KeyMode::Base64), ("k", KeyMode::Text)] {
            let result = inspector().inspect(&token, key, mode);
            assert_eq!(result.method, InspectionMethod::JwtDecode);
            assert!(!result.is_error);
            assert!(result.content.contains("\"role\": \"admin\""));
            assert!(result.debug_trail.is_empty());
        }
    }

    #[test]
    fn test_not_a_token_is_unrecognized() {
        let result = inspector().inspect("not-a-token", "", KeyMode::Text);
        assert_eq!(result.method, InspectionMethod::Error);
        assert!(result.is_error);
        assert_eq!(result.failure, Some(FailureKind::UnrecognizedFormat));
        assert_eq!(result.content, "Not a recognized JWT/JWE format.");
        assert!(result.header_summary.is_none());
    }

    #[test]
    fn test_unparseable_signed_token() {
        let result = inspector().inspect("eyJhbGciOiJub25lIn0.!!!.sig", "", KeyMode::Text);
        assert_eq!(result.method, InspectionMethod::Error);
        assert_eq!(result.content, "Could not parse token.");
        assert_eq!(result.failure, Some(FailureKind::MalformedToken));
        assert_eq!(result.header_summary.as_deref(), Some(r#"{"alg":"none"}"#));
    }

    #[test]
    fn test_blank_key_never_reaches_cipher() {
        let token = seal("dir", "A128GCM", &[1u8; 16], b"x");
        let inspector = Inspector::with_cipher(KeyLengthPolicy::AsDecoded, CountingCipher::default());

        for key in ["", "   ", "\t\n"] {
            for mode in [KeyMode::Text, KeyMode::Base64] {
                let result = inspector.inspect(&token, key, mode);
                assert_eq!(result.failure, Some(FailureKind::NoKeyProvided));
                assert_eq!(result.content, "Error: No secret key provided.");
            }
        }
        assert_eq!(inspector.decryptor_calls(), 0);

        inspector.inspect(&token, "k", KeyMode::Text);
        assert_eq!(inspector.decryptor_calls(), 1);
    }

    #[test]
    fn test_invalid_base64_key() {
        let token = seal("dir", "A128GCM", &[1u8; 16], b"x");
        let result = inspector().inspect(&token, "!!!", KeyMode::Base64);
        assert_eq!(result.failure, Some(FailureKind::InvalidKeyEncoding));
        assert!(result.content.starts_with("Error: Invalid Base64 key string."));
    }

    #[test]
    fn test_wrong_key_reports_probable_cause() {
        let token = seal("dir", "A128GCM", &[1u8; 16], b"x");
        let result = inspector().inspect(&token, &STANDARD.encode([2u8; 16]), KeyMode::Base64);
        assert_eq!(result.failure, Some(FailureKind::TagMismatch));
        assert!(result.content.ends_with("(Cause: Key mismatch or invalid tag)"));
        assert_eq!(result.debug_trail.len(), 3);
    }

    #[test]
    fn test_short_key_reports_length_cause() {
        let token = seal("dir", "A256GCM", &[1u8; 32], b"x");
        let result = inspector().inspect(&token, "short", KeyMode::Text);
        assert_eq!(result.failure, Some(FailureKind::KeyLengthMismatch));
        assert!(
            result
                .content
                .contains("(Cause: The key length does not match the algorithm requirements)")
        );
    }

    #[test]
    fn test_fixed_policy_changes_outcome() {
        let mut padded = b"abc".to_vec();
        padded.resize(LEGACY_FIXED_KEY_LEN, 0);
        let token = seal("dir", "A256CBC-HS512", &padded, br#"{"n":1}"#);

        let natural = Inspector::new(KeyLengthPolicy::AsDecoded).inspect(&token, "YWJj", KeyMode::Base64);
        assert_eq!(natural.failure, Some(FailureKind::KeyLengthMismatch));

        let fixed = Inspector::new(KeyLengthPolicy::Fixed(LEGACY_FIXED_KEY_LEN))
            .inspect(&token, "YWJj", KeyMode::Base64);
        assert!(!fixed.is_error);
        assert!(fixed.debug_trail.contains(&"Key resized from 3 to 64 bytes".to_string()));
    }

    #[test]
    fn test_concurrent_inspections_do_not_interfere() {
        let inspector = inspector();
        let tokens: Vec<(Vec<u8>, String)> = (0u8..8)
            .map(|i| {
                let key = vec![i; 16];
                let token = seal("dir", "A128GCM", &key, format!("{{\"n\":{i}}}").as_bytes());
                (key, token)
            })
            .collect();

        std::thread::scope(|scope| {
            for (i, (key, token)) in tokens.iter().enumerate() {
                let inspector = &inspector;
                scope.spawn(move || {
                    let result = inspector.inspect(token, &STANDARD.encode(key), KeyMode::Base64);
                    assert!(result.content.contains(&format!("\"n\": {i}")));
                });
            }
        });
    }

    #[test]
    fn test_inspector_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Inspector>();
    }

    impl Inspector<CountingCipher> {
        fn decryptor_calls(&self) -> usize {
            self.decryptor.cipher().calls.load(Ordering::SeqCst)
        }
    }
}
