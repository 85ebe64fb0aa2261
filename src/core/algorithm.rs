//! Supported JWE algorithm identifiers.
//!
//! Only the symmetric subset of RFC 7518 is recognized: direct use of a
//! shared key, AES key wrap, and AES-GCM key wrap for key management;
//! AES-GCM and AES-CBC with HMAC-SHA2 for content encryption.

use std::fmt;

use crate::error::InspectError;

/// AES key size, shared by the key-wrap and content algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AesSize {
    Aes128,
    Aes192,
    Aes256,
}

impl AesSize {
    /// Key length in bytes.
    pub fn key_len(self) -> usize {
        match self {
            Self::Aes128 => 16,
            Self::Aes192 => 24,
            Self::Aes256 => 32,
        }
    }
}

/// Key management algorithm (`alg` header).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyManagement {
    /// `dir`: the shared key is the content encryption key.
    Direct,
    /// `A128KW`, `A192KW`, `A256KW`: RFC 3394 key wrap.
    AesKeyWrap(AesSize),
    /// `A128GCMKW`, `A192GCMKW`, `A256GCMKW`: key wrapped with AES-GCM,
    /// IV and tag carried in the header.
    AesGcmKeyWrap(AesSize),
}

impl KeyManagement {
    pub fn parse(alg: &str) -> Result<Self, InspectError> {
        Ok(match alg {
            "dir" => Self::Direct,
            "A128KW" => Self::AesKeyWrap(AesSize::Aes128),
            "A192KW" => Self::AesKeyWrap(AesSize::Aes192),
            "A256KW" => Self::AesKeyWrap(AesSize::Aes256),
            "A128GCMKW" => Self::AesGcmKeyWrap(AesSize::Aes128),
            "A192GCMKW" => Self::AesGcmKeyWrap(AesSize::Aes192),
            "A256GCMKW" => Self::AesGcmKeyWrap(AesSize::Aes256),
            other => {
                return Err(InspectError::UnsupportedAlgorithm {
                    algorithm: other.to_string(),
                });
            }
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Direct => "dir",
            Self::AesKeyWrap(AesSize::Aes128) => "A128KW",
            Self::AesKeyWrap(AesSize::Aes192) => "A192KW",
            Self::AesKeyWrap(AesSize::Aes256) => "A256KW",
            Self::AesGcmKeyWrap(AesSize::Aes128) => "A128GCMKW",
            Self::AesGcmKeyWrap(AesSize::Aes192) => "A192GCMKW",
            Self::AesGcmKeyWrap(AesSize::Aes256) => "A256GCMKW",
        }
    }
}

impl fmt::Display for KeyManagement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Content encryption algorithm (`enc` header).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentEncryption {
    /// `A128GCM`, `A192GCM`, `A256GCM`.
    AesGcm(AesSize),
    /// `A128CBC-HS256`, `A192CBC-HS384`, `A256CBC-HS512`.
    AesCbcHmac(AesSize),
}

impl ContentEncryption {
    pub fn parse(enc: &str) -> Result<Self, InspectError> {
        Ok(match enc {
            "A128GCM" => Self::AesGcm(AesSize::Aes128),
            "A192GCM" => Self::AesGcm(AesSize::Aes192),
            "A256GCM" => Self::AesGcm(AesSize::Aes256),
            "A128CBC-HS256" => Self::AesCbcHmac(AesSize::Aes128),
            "A192CBC-HS384" => Self::AesCbcHmac(AesSize::Aes192),
            "A256CBC-HS512" => Self::AesCbcHmac(AesSize::Aes256),
            other => {
                return Err(InspectError::UnsupportedAlgorithm {
                    algorithm: other.to_string(),
                });
            }
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::AesGcm(AesSize::Aes128) => "A128GCM",
            Self::AesGcm(AesSize::Aes192) => "A192GCM",
            Self::AesGcm(AesSize::Aes256) => "A256GCM",
            Self::AesCbcHmac(AesSize::Aes128) => "A128CBC-HS256",
            Self::AesCbcHmac(AesSize::Aes192) => "A192CBC-HS384",
            Self::AesCbcHmac(AesSize::Aes256) => "A256CBC-HS512",
        }
    }

    /// Content encryption key length in bytes. The CBC-HMAC composites
    /// carry a MAC key and an encryption key of equal size.
    pub fn key_len(self) -> usize {
        match self {
            Self::AesGcm(size) => size.key_len(),
            Self::AesCbcHmac(size) => size.key_len() * 2,
        }
    }

    /// Initialization vector length in bytes.
    pub fn iv_len(self) -> usize {
        match self {
            Self::AesGcm(_) => 12,
            Self::AesCbcHmac(_) => 16,
        }
    }

    /// Authentication tag length in bytes.
    pub fn tag_len(self) -> usize {
        match self {
            Self::AesGcm(_) => 16,
            Self::AesCbcHmac(size) => size.key_len(),
        }
    }
}

impl fmt::Display for ContentEncryption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
