//! Token inspection core.
//!
//! Classification, claims decoding, key derivation and decryption of
//! cookie tokens, separated from CLI and storage concerns. Nothing in
//! here reads files, environment variables or persisted state.

pub mod algorithm;
mod base64url;
pub mod decoder;
pub mod decryptor;
pub mod inspector;
pub mod key;
pub mod report;
pub mod token;

#[cfg(test)]
mod test_support;
