//! Token sealing for unit tests.
//!
//! Produces compact JWE tokens with fixed IVs and a fixed content key so
//! decryption tests have something real to open.

use aes::cipher::generic_array::GenericArray;
use aes::{Aes128, Aes192, Aes256};
use aes_gcm::aead::consts::U12;
use aes_gcm::aead::{Aead, KeyInit, Nonce, Payload};
use aes_gcm::{Aes128Gcm, Aes256Gcm, AesGcm};
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockEncryptMut, KeyIvInit};
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::{Sha256, Sha384, Sha512};

use super::algorithm::{AesSize, ContentEncryption, KeyManagement};
use super::base64url;

pub(crate) const KEY_ALGORITHMS: [&str; 7] = [
    "dir",
    "A128KW",
    "A192KW",
    "A256KW",
    "A128GCMKW",
    "A192GCMKW",
    "A256GCMKW",
];

pub(crate) const CONTENT_ALGORITHMS: [&str; 6] = [
    "A128GCM",
    "A192GCM",
    "A256GCM",
    "A128CBC-HS256",
    "A192CBC-HS384",
    "A256CBC-HS512",
];

const WRAP_IV: [u8; 12] = [9; 12];

/// Seal `plaintext` under `alg`/`enc` with `key`.
pub(crate) fn seal(alg: &str, enc: &str, key: &[u8], plaintext: &[u8]) -> String {
    let key_management = KeyManagement::parse(alg).unwrap();
    let content = ContentEncryption::parse(enc).unwrap();

    let mut header = json!({ "alg": alg, "enc": enc });
    let (cek, encrypted_key) = match key_management {
        KeyManagement::Direct => (key.to_vec(), Vec::new()),
        KeyManagement::AesKeyWrap(size) => {
            let cek = content_key(content);
            let wrapped = aes_key_wrap(size, key, &cek);
            (cek, wrapped)
        }
        KeyManagement::AesGcmKeyWrap(size) => {
            let cek = content_key(content);
            let (wrapped, tag) = gcm_seal(size, key, &WRAP_IV, &[], &cek);
            header["iv"] = base64url::encode(&WRAP_IV).into();
            header["tag"] = base64url::encode(&tag).into();
            (cek, wrapped)
        }
    };

    let protected = base64url::encode(header.to_string().as_bytes());
    let aad = protected.as_bytes();
    let (iv, ciphertext, tag) = match content {
        ContentEncryption::AesGcm(size) => {
            let iv = vec![7u8; 12];
            let (ct, tag) = gcm_seal(size, &cek, &iv, aad, plaintext);
            (iv, ct, tag)
        }
        ContentEncryption::AesCbcHmac(size) => {
            let iv = vec![5u8; 16];
            let (ct, tag) = cbc_hmac_seal(size, &cek, &iv, aad, plaintext);
            (iv, ct, tag)
        }
    };

    [
        protected,
        base64url::encode(&encrypted_key),
        base64url::encode(&iv),
        base64url::encode(&ciphertext),
        base64url::encode(&tag),
    ]
    .join(".")
}

/// Flip one bit in the decoded bytes of segment `index`.
pub(crate) fn tamper_segment(token: &str, index: usize) -> String {
    let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
    let mut bytes = base64url::decode_segment(&parts[index], "segment").unwrap();
    bytes[0] ^= 0x01;
    parts[index] = base64url::encode(&bytes);
    parts.join(".")
}

fn content_key(content: ContentEncryption) -> Vec<u8> {
    (0..content.key_len()).map(|i| (i as u8).wrapping_mul(31)).collect()
}

fn aes_key_wrap(size: AesSize, kek: &[u8], cek: &[u8]) -> Vec<u8> {
    match size {
        AesSize::Aes128 => aes_kw::Kek::<Aes128>::new(GenericArray::from_slice(kek)).wrap_vec(cek),
        AesSize::Aes192 => aes_kw::Kek::<Aes192>::new(GenericArray::from_slice(kek)).wrap_vec(cek),
        AesSize::Aes256 => aes_kw::Kek::<Aes256>::new(GenericArray::from_slice(kek)).wrap_vec(cek),
    }
    .unwrap()
}

fn gcm_seal(size: AesSize, key: &[u8], iv: &[u8], aad: &[u8], msg: &[u8]) -> (Vec<u8>, Vec<u8>) {
    fn seal_with<C: KeyInit + Aead>(key: &[u8], iv: &[u8], aad: &[u8], msg: &[u8]) -> Vec<u8> {
        C::new_from_slice(key)
            .unwrap()
            .encrypt(Nonce::<C>::from_slice(iv), Payload { msg, aad })
            .unwrap()
    }
    let mut sealed = match size {
        AesSize::Aes128 => seal_with::<Aes128Gcm>(key, iv, aad, msg),
        AesSize::Aes192 => seal_with::<AesGcm<Aes192, U12>>(key, iv, aad, msg),
        AesSize::Aes256 => seal_with::<Aes256Gcm>(key, iv, aad, msg),
    };
    let tag = sealed.split_off(sealed.len() - 16);
    (sealed, tag)
}

fn cbc_hmac_seal(size: AesSize, cek: &[u8], iv: &[u8], aad: &[u8], msg: &[u8]) -> (Vec<u8>, Vec<u8>) {
    fn tag_with<M: Mac + KeyInit>(mac_key: &[u8], parts: &[&[u8]], tag_len: usize) -> Vec<u8> {
        let mut mac = <M as KeyInit>::new_from_slice(mac_key).unwrap();
        for part in parts {
            mac.update(part);
        }
        mac.finalize().into_bytes()[..tag_len].to_vec()
    }

    let half = size.key_len();
    let (mac_key, enc_key) = cek.split_at(half);
    let ciphertext = match size {
        AesSize::Aes128 => cbc::Encryptor::<Aes128>::new_from_slices(enc_key, iv)
            .unwrap()
            .encrypt_padded_vec_mut::<Pkcs7>(msg),
        AesSize::Aes192 => cbc::Encryptor::<Aes192>::new_from_slices(enc_key, iv)
            .unwrap()
            .encrypt_padded_vec_mut::<Pkcs7>(msg),
        AesSize::Aes256 => cbc::Encryptor::<Aes256>::new_from_slices(enc_key, iv)
            .unwrap()
            .encrypt_padded_vec_mut::<Pkcs7>(msg),
    };

    let aad_bits = (aad.len() as u64 * 8).to_be_bytes();
    let parts: [&[u8]; 4] = [aad, iv, &ciphertext, &aad_bits];
    let tag = match size {
        AesSize::Aes128 => tag_with::<Hmac<Sha256>>(mac_key, &parts, half),
        AesSize::Aes192 => tag_with::<Hmac<Sha384>>(mac_key, &parts, half),
        AesSize::Aes256 => tag_with::<Hmac<Sha512>>(mac_key, &parts, half),
    };
    (ciphertext, tag)
}
