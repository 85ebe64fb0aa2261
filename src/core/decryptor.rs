//! Authenticated decryption of encrypted (5-segment) tokens.
//!
//! The algorithm is taken from the token's own protected header. Every
//! primitive failure is mapped to a typed [`InspectError`] so callers can
//! tell a wrong key ([`InspectError::TagMismatch`]) from an unusable one
//! ([`InspectError::KeyLengthMismatch`]) without inspecting messages.
//!
//! # Security
//!
//! - The integrity tag is verified before any plaintext is released.
//! - Content keys are held in [`Zeroizing`] buffers.
//! - Only symmetric algorithms are accepted; see [`super::algorithm`].

use aes::cipher::generic_array::GenericArray;
use aes::{Aes128, Aes192, Aes256};
use aes_gcm::aead::consts::U12;
use aes_gcm::aead::{Aead, KeyInit, Nonce, Payload};
use aes_gcm::{Aes128Gcm, Aes256Gcm, AesGcm};
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, KeyIvInit};
use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha384, Sha512};
use tracing::debug;
use zeroize::Zeroizing;

use super::algorithm::{AesSize, ContentEncryption, KeyManagement};
use super::base64url;
use super::key::KeyMaterial;
use super::token::{TokenHeader, check_length, segments};
use crate::error::InspectError;

type Aes192Gcm = AesGcm<Aes192, U12>;

/// A parsed 5-segment token with its algorithms resolved.
#[derive(Debug)]
pub struct EncryptedToken<'a> {
    /// Base64URL text of the protected header; the AAD of the ciphertext.
    pub protected: &'a str,
    pub header: TokenHeader,
    pub key_management: KeyManagement,
    pub content_encryption: ContentEncryption,
    pub encrypted_key: Vec<u8>,
    pub iv: Vec<u8>,
    pub ciphertext: Vec<u8>,
    pub tag: Vec<u8>,
}

impl<'a> EncryptedToken<'a> {
    /// Parse the five segments of `token` and resolve `alg`/`enc`.
    #[cfg(test)]
    pub(crate) fn parse(token: &'a str) -> Result<Self, InspectError> {
        let parts = split_compact(token)?;
        Self::from_parts(&parts, TokenHeader::decode(parts[0])?)
    }

    fn from_parts(parts: &[&'a str], header: TokenHeader) -> Result<Self, InspectError> {
        let alg = header
            .alg()
            .ok_or_else(|| InspectError::malformed("header has no 'alg'"))?;
        let enc = header
            .enc()
            .ok_or_else(|| InspectError::malformed("header has no 'enc'"))?;
        let key_management = KeyManagement::parse(alg)?;
        let content_encryption = ContentEncryption::parse(enc)?;
        if header.contains("zip") {
            return Err(InspectError::UnsupportedAlgorithm {
                algorithm: format!("zip={}", header.get_str("zip").unwrap_or("?")),
            });
        }

        let encrypted_key = base64url::decode_segment(parts[1], "encrypted key")?;
        let iv = base64url::decode_segment(parts[2], "iv")?;
        let ciphertext = base64url::decode_segment(parts[3], "ciphertext")?;
        let tag = base64url::decode_segment(parts[4], "tag")?;

        if iv.len() != content_encryption.iv_len() {
            return Err(InspectError::malformed(format!(
                "iv is {} bytes, {content_encryption} requires {}",
                iv.len(),
                content_encryption.iv_len()
            )));
        }
        if tag.len() != content_encryption.tag_len() {
            return Err(InspectError::malformed(format!(
                "tag is {} bytes, {content_encryption} requires {}",
                tag.len(),
                content_encryption.tag_len()
            )));
        }
        if key_management == KeyManagement::Direct && !encrypted_key.is_empty() {
            return Err(InspectError::malformed(
                "encrypted key must be empty for 'dir'",
            ));
        }

        Ok(Self {
            protected: parts[0],
            header,
            key_management,
            content_encryption,
            encrypted_key,
            iv,
            ciphertext,
            tag,
        })
    }
}

/// Split a compact JWE into its five segments.
fn split_compact(token: &str) -> Result<Vec<&str>, InspectError> {
    check_length(token)?;
    let parts = segments(token);
    if parts.len() != 5 {
        return Err(InspectError::malformed(
            "expected 'header.encryptedKey.iv.ciphertext.tag' structure",
        ));
    }
    Ok(parts)
}

/// The seam between the decryptor and the cryptographic primitives.
pub trait ContentCipher: Send + Sync {
    /// Recover the plaintext bytes of `token` with `key`.
    fn open(&self, token: &EncryptedToken<'_>, key: &KeyMaterial) -> Result<Vec<u8>, InspectError>;
}

/// [`ContentCipher`] backed by the RustCrypto AES, AES-GCM, AES-KW and
/// HMAC implementations.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustCryptoCipher;

impl ContentCipher for RustCryptoCipher {
    fn open(&self, token: &EncryptedToken<'_>, key: &KeyMaterial) -> Result<Vec<u8>, InspectError> {
        let enc = token.content_encryption;
        let cek = content_key(token, key.as_bytes())?;
        if cek.len() != enc.key_len() {
            return Err(InspectError::DecryptionFailed {
                reason: format!(
                    "unwrapped content key is {} bytes, {enc} requires {}",
                    cek.len(),
                    enc.key_len()
                ),
            });
        }

        let aad = token.protected.as_bytes();
        match enc {
            ContentEncryption::AesGcm(size) => {
                let open = match size {
                    AesSize::Aes128 => gcm_open::<Aes128Gcm>,
                    AesSize::Aes192 => gcm_open::<Aes192Gcm>,
                    AesSize::Aes256 => gcm_open::<Aes256Gcm>,
                };
                open(&cek, &token.iv, aad, &token.ciphertext, &token.tag)
            }
            ContentEncryption::AesCbcHmac(size) => {
                cbc_hmac_open(size, &cek, &token.iv, aad, &token.ciphertext, &token.tag)
            }
        }
    }
}

/// Resolve the content encryption key from the supplied key bytes.
fn content_key(token: &EncryptedToken<'_>, key: &[u8]) -> Result<Zeroizing<Vec<u8>>, InspectError> {
    match token.key_management {
        KeyManagement::Direct => {
            let enc = token.content_encryption;
            require_key_len(enc.name(), enc.key_len(), key)?;
            Ok(Zeroizing::new(key.to_vec()))
        }
        KeyManagement::AesKeyWrap(size) => {
            require_key_len(token.key_management.name(), size.key_len(), key)?;
            aes_key_unwrap(size, key, &token.encrypted_key).map(Zeroizing::new)
        }
        KeyManagement::AesGcmKeyWrap(size) => {
            require_key_len(token.key_management.name(), size.key_len(), key)?;
            let iv = header_bytes(&token.header, "iv", 12)?;
            let tag = header_bytes(&token.header, "tag", 16)?;
            let open = match size {
                AesSize::Aes128 => gcm_open::<Aes128Gcm>,
                AesSize::Aes192 => gcm_open::<Aes192Gcm>,
                AesSize::Aes256 => gcm_open::<Aes256Gcm>,
            };
            open(key, &iv, &[], &token.encrypted_key, &tag).map(Zeroizing::new)
        }
    }
}

fn require_key_len(algorithm: &str, expected: usize, key: &[u8]) -> Result<(), InspectError> {
    if key.len() != expected {
        return Err(InspectError::KeyLengthMismatch {
            algorithm: algorithm.to_string(),
            expected,
            actual: key.len(),
        });
    }
    Ok(())
}

/// Decode a Base64URL header parameter of a fixed byte length.
fn header_bytes(header: &TokenHeader, name: &str, len: usize) -> Result<Vec<u8>, InspectError> {
    let value = header
        .get_str(name)
        .ok_or_else(|| InspectError::malformed(format!("header has no '{name}'")))?;
    let bytes = base64url::decode_segment(value, name)?;
    if bytes.len() != len {
        return Err(InspectError::malformed(format!(
            "header '{name}' is {} bytes, expected {len}",
            bytes.len()
        )));
    }
    Ok(bytes)
}

fn aes_key_unwrap(size: AesSize, kek: &[u8], wrapped: &[u8]) -> Result<Vec<u8>, InspectError> {
    let result = match size {
        AesSize::Aes128 => aes_kw::Kek::<Aes128>::new(GenericArray::from_slice(kek)).unwrap_vec(wrapped),
        AesSize::Aes192 => aes_kw::Kek::<Aes192>::new(GenericArray::from_slice(kek)).unwrap_vec(wrapped),
        AesSize::Aes256 => aes_kw::Kek::<Aes256>::new(GenericArray::from_slice(kek)).unwrap_vec(wrapped),
    };
    result.map_err(|e| match e {
        aes_kw::Error::IntegrityCheckFailed => InspectError::TagMismatch,
        other => InspectError::DecryptionFailed {
            reason: format!("key unwrap failed: {other}"),
        },
    })
}

fn gcm_open<C>(key: &[u8], iv: &[u8], aad: &[u8], ciphertext: &[u8], tag: &[u8]) -> Result<Vec<u8>, InspectError>
where
    C: KeyInit + Aead,
{
    let cipher = C::new_from_slice(key).map_err(|_| InspectError::DecryptionFailed {
        reason: "invalid AES-GCM key".to_string(),
    })?;

    let mut sealed = Vec::with_capacity(ciphertext.len() + tag.len());
    sealed.extend_from_slice(ciphertext);
    sealed.extend_from_slice(tag);

    cipher
        .decrypt(Nonce::<C>::from_slice(iv), Payload { msg: &sealed, aad })
        .map_err(|_| InspectError::TagMismatch)
}

/// AES-CBC with HMAC-SHA2 per RFC 7518 §5.2.2.2.
fn cbc_hmac_open(
    size: AesSize,
    cek: &[u8],
    iv: &[u8],
    aad: &[u8],
    ciphertext: &[u8],
    tag: &[u8],
) -> Result<Vec<u8>, InspectError> {
    let (mac_key, enc_key) = cek.split_at(size.key_len());
    match size {
        AesSize::Aes128 => verify_cbc_tag::<Hmac<Sha256>>(mac_key, aad, iv, ciphertext, tag)?,
        AesSize::Aes192 => verify_cbc_tag::<Hmac<Sha384>>(mac_key, aad, iv, ciphertext, tag)?,
        AesSize::Aes256 => verify_cbc_tag::<Hmac<Sha512>>(mac_key, aad, iv, ciphertext, tag)?,
    }

    let invalid_key = |_| InspectError::DecryptionFailed {
        reason: "invalid AES-CBC key or iv".to_string(),
    };
    let plaintext = match size {
        AesSize::Aes128 => cbc::Decryptor::<Aes128>::new_from_slices(enc_key, iv)
            .map_err(invalid_key)?
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext),
        AesSize::Aes192 => cbc::Decryptor::<Aes192>::new_from_slices(enc_key, iv)
            .map_err(invalid_key)?
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext),
        AesSize::Aes256 => cbc::Decryptor::<Aes256>::new_from_slices(enc_key, iv)
            .map_err(invalid_key)?
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext),
    };
    plaintext.map_err(|_| InspectError::DecryptionFailed {
        reason: "invalid padding".to_string(),
    })
}

/// Constant-time check of the truncated HMAC over AAD, IV, ciphertext
/// and the 64-bit big-endian AAD bit length.
fn verify_cbc_tag<M>(mac_key: &[u8], aad: &[u8], iv: &[u8], ciphertext: &[u8], tag: &[u8]) -> Result<(), InspectError>
where
    M: Mac + KeyInit,
{
    let mut mac = <M as KeyInit>::new_from_slice(mac_key).map_err(|_| InspectError::DecryptionFailed {
        reason: "invalid HMAC key".to_string(),
    })?;
    let aad_bits = (aad.len() as u64 * 8).to_be_bytes();
    mac.update(aad);
    mac.update(iv);
    mac.update(ciphertext);
    mac.update(&aad_bits);
    mac.verify_truncated_left(tag)
        .map_err(|_| InspectError::TagMismatch)
}

/// Successful decryption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decrypted {
    /// Plaintext, pretty-printed when it is JSON.
    pub plaintext: String,
    pub debug_trail: Vec<String>,
}

/// Failed decryption, with the trail gathered up to the failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecryptFailure {
    pub error: InspectError,
    pub debug_trail: Vec<String>,
}

/// Decrypts 5-segment tokens through a [`ContentCipher`].
#[derive(Debug, Clone, Default)]
pub struct Decryptor<C = RustCryptoCipher> {
    cipher: C,
}

impl<C: ContentCipher> Decryptor<C> {
    pub fn new(cipher: C) -> Self {
        Self { cipher }
    }

    #[cfg(test)]
    pub(crate) fn cipher(&self) -> &C {
        &self.cipher
    }

    /// Decrypt `token` with `key`.
    ///
    /// The debug trail records the header's `alg` and `enc` whenever the
    /// header is readable, on success and on failure alike.
    pub fn decrypt(&self, token: &str, key: &KeyMaterial) -> Result<Decrypted, DecryptFailure> {
        let mut debug_trail = Vec::new();
        match self.open(token, key, &mut debug_trail) {
            Ok(plaintext) => Ok(Decrypted {
                plaintext,
                debug_trail,
            }),
            Err(error) => {
                debug!(kind = ?error.kind(), "decryption failed");
                Err(DecryptFailure { error, debug_trail })
            }
        }
    }

    fn open(&self, token: &str, key: &KeyMaterial, trail: &mut Vec<String>) -> Result<String, InspectError> {
        let parts = split_compact(token)?;
        let header = TokenHeader::decode(parts[0])?;
        trail.push(format!(
            "Token Algorithm: {}",
            header.alg().unwrap_or("<missing>")
        ));
        trail.push(format!(
            "Token Encryption: {}",
            header.enc().unwrap_or("<missing>")
        ));

        let parsed = EncryptedToken::from_parts(&parts, header)?;
        let bytes = Zeroizing::new(self.cipher.open(&parsed, key)?);
        debug!(
            alg = %parsed.key_management,
            enc = %parsed.content_encryption,
            len = bytes.len(),
            "decrypted token"
        );

        Ok(render_plaintext(&bytes))
    }
}

/// UTF-8 decode the plaintext and pretty-print it when it is JSON.
fn render_plaintext(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    serde_json::from_str::<serde_json::Value>(&text)
        .ok()
        .and_then(|value| serde_json::to_string_pretty(&value).ok())
        .unwrap_or_else(|| text.into_owned())
}
