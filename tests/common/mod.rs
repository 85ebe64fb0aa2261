//! Shared test fixtures and helper utilities.
//!
//! Provides pre-built tokens with known claims, JWE sealing, and cookie
//! jar / config files in temporary directories for integration tests.
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};

/// A valid HS256-signed JWT for testing.
///
/// Header: `{"alg":"HS256","typ":"JWT"}`
/// Payload: `{"sub":"1234567890","name":"Test User","iat":1516239022}`
/// Secret: `"test-secret"`
pub const VALID_HS256_TOKEN: &str = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.\
     eyJzdWIiOiIxMjM0NTY3ODkwIiwibmFtZSI6IlRlc3QgVXNlciIsImlhdCI6MTUxNjIzOTAyMn0.\
     SflKxwRJSMeKKF2QT4fwpMeJf36POk6yJV_adQssw5c";

/// A malformed token with only two parts (missing signature).
pub const MALFORMED_TOKEN_TWO_PARTS: &str = "eyJhbGciOiJIUzI1NiJ9.eyJzdWIiOiIxMjM0NTY3ODkwIn0";

/// A completely invalid token string.
pub const INVALID_TOKEN: &str = "not-a-valid-jwt";

/// 32-byte key for `dir` + `A256GCM` fixtures.
pub const JWE_KEY: [u8; 32] = [0x5a; 32];

/// Create an HS256-signed token with the given claims.
pub fn create_hs256_token(secret: &str, claims: &serde_json::Value) -> String {
    use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());
    encode(&header, claims, &key).unwrap()
}

/// Standard test claims.
pub fn standard_claims() -> serde_json::Value {
    serde_json::json!({
        "sub": "1234567890",
        "name": "Test User",
        "iat": 1516239022
    })
}

/// Seal `plaintext` as a compact `dir` / `A256GCM` JWE.
pub fn seal_dir_a256gcm(key: &[u8], plaintext: &[u8]) -> String {
    let protected = URL_SAFE_NO_PAD.encode(br#"{"alg":"dir","enc":"A256GCM"}"#);
    let iv = [7u8; 12];
    let cipher = Aes256Gcm::new_from_slice(key).unwrap();
    let sealed = cipher
        .encrypt(
            Nonce::from_slice(&iv),
            Payload {
                msg: plaintext,
                aad: protected.as_bytes(),
            },
        )
        .unwrap();
    let (ciphertext, tag) = sealed.split_at(sealed.len() - 16);
    format!(
        "{protected}..{}.{}.{}",
        URL_SAFE_NO_PAD.encode(iv),
        URL_SAFE_NO_PAD.encode(ciphertext),
        URL_SAFE_NO_PAD.encode(tag)
    )
}

/// Standard Base64 of [`JWE_KEY`].
pub fn jwe_key_base64() -> String {
    STANDARD.encode(JWE_KEY)
}

/// Write a Netscape cookie jar holding a signed session cookie, an
/// encrypted cookie, and a plain preference cookie.
pub fn write_jar(dir: &Path) -> PathBuf {
    let encrypted = seal_dir_a256gcm(&JWE_KEY, br#"{"sub":"123"}"#);
    let contents = format!(
        "# Netscape HTTP Cookie File\n\
         \n\
         #HttpOnly_.example.com\tTRUE\t/\tTRUE\t0\tsession\t{VALID_HS256_TOKEN}\n\
         secure.example.org\tFALSE\t/app\tTRUE\t0\tvault\t{encrypted}\n\
         .example.com\tTRUE\t/\tFALSE\t0\ttheme\tdark\n"
    );
    let path = dir.join("cookies.txt");
    fs::write(&path, contents).unwrap();
    path
}

/// Write a config file pointing the state file into `dir`.
pub fn write_config(dir: &Path, extra: &str) -> PathBuf {
    let state = dir.join("state.json");
    let contents = format!(
        "[storage]\nstate = {:?}\n{extra}",
        state.display().to_string()
    );
    let path = dir.join("config.toml");
    fs::write(&path, contents).unwrap();
    path
}
