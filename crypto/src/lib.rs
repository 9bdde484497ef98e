// Copyright 2025 Google LLC.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Uniform crypto adapter for the certifier.
//!
//! Narrow wrappers over the primitives the evaluator needs: RSA-PKCS#1
//! v1.5 signatures (SHA-256 and SHA-384 flavors), ECDSA-P384
//! verification from raw big-endian (r, s) components, SHA-256/384,
//! HMAC-SHA-256, and AES-256-CBC with the 0x80 padding scheme plus an
//! encrypt-then-MAC authenticated mode. All functions are reentrant;
//! no state is shared between calls.

use hmac::{Hmac, Mac};
use openssl::bn::BigNum;
use openssl::ec::{EcGroup, EcKey};
use openssl::ecdsa::EcdsaSig;
use openssl::hash::MessageDigest;
use openssl::memcmp;
use openssl::nid::Nid;
use openssl::pkey::{PKey, Private, Public};
use openssl::rsa::Rsa;
use openssl::sign::{Signer, Verifier};
use openssl::symm::{Cipher, Crypter, Mode};
use sha2::{Digest, Sha256, Sha384};
use thiserror::Error;

pub const AES_BLOCK_SIZE: usize = 16;
pub const SHA256_OUTPUT_LEN: usize = 32;
pub const SHA384_OUTPUT_LEN: usize = 48;

/// The length of a P-384 coordinate or scalar.
pub const P384_SCALAR_LEN: usize = 48;

/// Key length for `authenticated_encrypt`: 32 bytes of AES key followed
/// by 32 bytes of HMAC key.
pub const AUTHENTICATED_KEY_LEN: usize = 64;

#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("Key material is invalid")]
    InvalidKey,
    #[error("Key generation failed")]
    KeyGenerationFailed,
    #[error("Signing failed")]
    SigningFailed,
    #[error("Encryption failed")]
    EncryptionFailed,
    #[error("Decryption failed")]
    DecryptionFailed,
    #[error("Message authentication failed")]
    MacMismatch,
    #[error("Input is malformed")]
    MalformedInput,
}

pub type Result<T> = core::result::Result<T, CryptoError>;

type HmacSha256 = Hmac<Sha256>;

pub fn sha256(data: &[u8]) -> [u8; SHA256_OUTPUT_LEN] {
    Sha256::digest(data).into()
}

pub fn sha384(data: &[u8]) -> [u8; SHA384_OUTPUT_LEN] {
    Sha384::digest(data).into()
}

pub fn hmac_sha256(key: &[u8], data: &[u8]) -> [u8; SHA256_OUTPUT_LEN] {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(data);
    mac.finalize().into_bytes().into()
}

/// Generate a fresh RSA key of the given modulus size.
pub fn generate_rsa_key(bits: u32) -> Result<Rsa<Private>> {
    Rsa::generate(bits).map_err(|_| CryptoError::KeyGenerationFailed)
}

/// Generate a fresh P-384 key.
pub fn generate_p384_key() -> Result<EcKey<Private>> {
    let group =
        EcGroup::from_curve_name(Nid::SECP384R1).map_err(|_| CryptoError::KeyGenerationFailed)?;
    EcKey::generate(&group).map_err(|_| CryptoError::KeyGenerationFailed)
}

/// Sign `msg` with RSA PKCS#1 v1.5 over SHA-256.
pub fn rsa_sha256_sign(key: &PKey<Private>, msg: &[u8]) -> Result<Vec<u8>> {
    rsa_pkcs1_sign(key, msg, MessageDigest::sha256())
}

/// Sign `msg` with RSA PKCS#1 v1.5 over SHA-384.
pub fn rsa_sha384_sign(key: &PKey<Private>, msg: &[u8]) -> Result<Vec<u8>> {
    rsa_pkcs1_sign(key, msg, MessageDigest::sha384())
}

fn rsa_pkcs1_sign(key: &PKey<Private>, msg: &[u8], digest: MessageDigest) -> Result<Vec<u8>> {
    let mut signer = Signer::new(digest, key).map_err(|_| CryptoError::InvalidKey)?;
    signer
        .sign_oneshot_to_vec(msg)
        .map_err(|_| CryptoError::SigningFailed)
}

/// Verify an RSA PKCS#1 v1.5 SHA-256 signature. Internal failures count
/// as verification failures.
pub fn rsa_sha256_verify(key: &PKey<Public>, msg: &[u8], sig: &[u8]) -> bool {
    rsa_pkcs1_verify(key, msg, sig, MessageDigest::sha256())
}

/// Verify an RSA PKCS#1 v1.5 SHA-384 signature.
pub fn rsa_sha384_verify(key: &PKey<Public>, msg: &[u8], sig: &[u8]) -> bool {
    rsa_pkcs1_verify(key, msg, sig, MessageDigest::sha384())
}

fn rsa_pkcs1_verify(key: &PKey<Public>, msg: &[u8], sig: &[u8], digest: MessageDigest) -> bool {
    let Ok(mut verifier) = Verifier::new(digest, key) else {
        return false;
    };
    verifier.verify_oneshot(sig, msg).unwrap_or(false)
}

/// Verify an ECDSA-P384 signature over an already-computed digest.
/// `r` and `s` are big-endian byte strings.
pub fn ecdsa_p384_verify(key: &EcKey<Public>, digest: &[u8], r: &[u8], s: &[u8]) -> Result<bool> {
    let r = BigNum::from_slice(r).map_err(|_| CryptoError::MalformedInput)?;
    let s = BigNum::from_slice(s).map_err(|_| CryptoError::MalformedInput)?;
    let signature =
        EcdsaSig::from_private_components(r, s).map_err(|_| CryptoError::MalformedInput)?;
    signature.verify(digest, key).map_err(|_| CryptoError::InvalidKey)
}

/// Pad to the next AES block boundary: 0x80 then zeros. An already
/// aligned message gains a full extra block so padding is always present.
pub fn pad(msg: &[u8]) -> Vec<u8> {
    let out_len = if msg.len() % AES_BLOCK_SIZE != 0 {
        (msg.len() / AES_BLOCK_SIZE + 1) * AES_BLOCK_SIZE
    } else {
        msg.len() + AES_BLOCK_SIZE
    };
    let mut out = Vec::with_capacity(out_len);
    out.extend_from_slice(msg);
    out.push(0x80);
    out.resize(out_len, 0);
    out
}

/// Strip padding from the last 0x80 byte.
pub fn depad(msg: &[u8]) -> Result<Vec<u8>> {
    match msg.iter().rposition(|&b| b == 0x80) {
        Some(i) => Ok(msg[..i].to_vec()),
        None => Err(CryptoError::MalformedInput),
    }
}

/// AES-256-CBC encrypt the padded message; the IV is prepended to the
/// returned ciphertext.
pub fn encrypt(msg: &[u8], key: &[u8], iv: &[u8]) -> Result<Vec<u8>> {
    if key.len() != 32 || iv.len() != AES_BLOCK_SIZE {
        return Err(CryptoError::InvalidKey);
    }
    let padded = pad(msg);
    let body = run_cbc(Mode::Encrypt, &padded, key, iv)?;
    let mut out = Vec::with_capacity(AES_BLOCK_SIZE + body.len());
    out.extend_from_slice(iv);
    out.extend_from_slice(&body);
    Ok(out)
}

/// Invert `encrypt`: split off the IV, decrypt, strip padding.
pub fn decrypt(ciphertext: &[u8], key: &[u8]) -> Result<Vec<u8>> {
    if key.len() != 32 {
        return Err(CryptoError::InvalidKey);
    }
    if ciphertext.len() < 2 * AES_BLOCK_SIZE || ciphertext.len() % AES_BLOCK_SIZE != 0 {
        return Err(CryptoError::MalformedInput);
    }
    let (iv, body) = ciphertext.split_at(AES_BLOCK_SIZE);
    let padded = run_cbc(Mode::Decrypt, body, key, iv)?;
    depad(&padded)
}

// The 0x80 padding is applied by hand, so the cipher runs with its own
// padding disabled.
fn run_cbc(mode: Mode, data: &[u8], key: &[u8], iv: &[u8]) -> Result<Vec<u8>> {
    let cipher = Cipher::aes_256_cbc();
    let mut crypter = Crypter::new(cipher, mode, key, Some(iv)).map_err(|_| cbc_failure(mode))?;
    crypter.pad(false);
    let mut out = vec![0u8; data.len() + cipher.block_size()];
    let mut n = crypter.update(data, &mut out).map_err(|_| cbc_failure(mode))?;
    n += crypter
        .finalize(&mut out[n..])
        .map_err(|_| cbc_failure(mode))?;
    out.truncate(n);
    Ok(out)
}

fn cbc_failure(mode: Mode) -> CryptoError {
    match mode {
        Mode::Encrypt => CryptoError::EncryptionFailed,
        Mode::Decrypt => CryptoError::DecryptionFailed,
    }
}

/// Encrypt-then-MAC: AES-256-CBC under `key[0..32]`, then HMAC-SHA-256
/// over the ciphertext under `key[32..64]`, MAC appended.
pub fn authenticated_encrypt(msg: &[u8], key: &[u8], iv: &[u8]) -> Result<Vec<u8>> {
    if key.len() != AUTHENTICATED_KEY_LEN {
        return Err(CryptoError::InvalidKey);
    }
    let mut out = encrypt(msg, &key[..32], iv)?;
    let mac = hmac_sha256(&key[32..], &out);
    out.extend_from_slice(&mac);
    Ok(out)
}

/// Check the MAC, then decrypt. Any altered ciphertext or MAC byte fails.
pub fn authenticated_decrypt(data: &[u8], key: &[u8]) -> Result<Vec<u8>> {
    if key.len() != AUTHENTICATED_KEY_LEN {
        return Err(CryptoError::InvalidKey);
    }
    let body_len = data
        .len()
        .checked_sub(SHA256_OUTPUT_LEN)
        .ok_or(CryptoError::MalformedInput)?;
    let (body, mac) = data.split_at(body_len);
    let computed = hmac_sha256(&key[32..], body);
    if !memcmp::eq(mac, &computed) {
        return Err(CryptoError::MacMismatch);
    }
    decrypt(body, &key[..32])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pad_depad_round_trip() {
        for len in [0usize, 1, 15, 16, 17, 31, 32, 100] {
            let msg: Vec<u8> = (0..len as u8).collect();
            let padded = pad(&msg);
            assert_eq!(padded.len() % AES_BLOCK_SIZE, 0);
            assert!(padded.len() > msg.len());
            assert_eq!(depad(&padded).unwrap(), msg);
        }
    }

    #[test]
    fn pad_aligned_input_gains_full_block() {
        let msg = [0xaau8; 32];
        assert_eq!(pad(&msg).len(), 48);
    }

    #[test]
    fn depad_without_marker_fails() {
        assert!(depad(&[0u8; 16]).is_err());
    }

    #[test]
    fn encrypt_decrypt_round_trip() {
        let key = [0x11u8; 32];
        let iv = [0x22u8; 16];
        let msg = b"attestation payload";
        let ct = encrypt(msg, &key, &iv).unwrap();
        assert_eq!(&ct[..16], &iv);
        assert_eq!(decrypt(&ct, &key).unwrap(), msg);
    }

    #[test]
    fn authenticated_round_trip_and_tamper() {
        let key: Vec<u8> = (0..64).collect();
        let iv = [17u8; 16];
        let msg = b"seal me";
        let ct = authenticated_encrypt(msg, &key, &iv).unwrap();
        assert_eq!(authenticated_decrypt(&ct, &key).unwrap(), msg);

        for i in 0..ct.len() {
            let mut bad = ct.clone();
            bad[i] ^= 0x01;
            assert!(
                authenticated_decrypt(&bad, &key).is_err(),
                "tampered byte {i} was accepted"
            );
        }
    }

    #[test]
    fn authenticated_decrypt_short_input_fails() {
        let key: Vec<u8> = (0..64).collect();
        assert!(matches!(
            authenticated_decrypt(&[0u8; 16], &key),
            Err(CryptoError::MalformedInput)
        ));
    }

    #[test]
    fn rsa_sha256_sign_verify() {
        let key = PKey::from_rsa(generate_rsa_key(2048).unwrap()).unwrap();
        let public =
            PKey::public_key_from_der(&key.public_key_to_der().unwrap()).unwrap();
        let msg = b"the signed statement";
        let sig = rsa_sha256_sign(&key, msg).unwrap();
        assert!(rsa_sha256_verify(&public, msg, &sig));
        assert!(!rsa_sha256_verify(&public, b"another statement", &sig));

        let mut bad = sig.clone();
        bad[0] ^= 0x01;
        assert!(!rsa_sha256_verify(&public, msg, &bad));
    }

    #[test]
    fn rsa_sha384_sign_verify() {
        let key = PKey::from_rsa(generate_rsa_key(2048).unwrap()).unwrap();
        let public =
            PKey::public_key_from_der(&key.public_key_to_der().unwrap()).unwrap();
        let msg = b"sha384 flavored";
        let sig = rsa_sha384_sign(&key, msg).unwrap();
        assert!(rsa_sha384_verify(&public, msg, &sig));
        assert!(!rsa_sha256_verify(&public, msg, &sig));
    }

    #[test]
    fn ecdsa_p384_verify_raw_components() {
        let private = generate_p384_key().unwrap();
        let group = EcGroup::from_curve_name(Nid::SECP384R1).unwrap();
        let public = EcKey::from_public_key(&group, private.public_key()).unwrap();

        let digest = sha384(b"report header");
        let signature = EcdsaSig::sign(&digest, &private).unwrap();
        let r = signature.r().to_vec_padded(P384_SCALAR_LEN as i32).unwrap();
        let s = signature.s().to_vec_padded(P384_SCALAR_LEN as i32).unwrap();

        assert!(ecdsa_p384_verify(&public, &digest, &r, &s).unwrap());

        let mut bad_r = r.clone();
        bad_r[10] ^= 0x01;
        assert!(!ecdsa_p384_verify(&public, &digest, &bad_r, &s).unwrap());

        let other = sha384(b"different header");
        assert!(!ecdsa_p384_verify(&public, &other, &r, &s).unwrap());
    }

    #[test]
    fn hmac_sha256_is_keyed() {
        let a = hmac_sha256(b"key-one", b"data");
        let b = hmac_sha256(b"key-two", b"data");
        assert_ne!(a, b);
        assert_eq!(a, hmac_sha256(b"key-one", b"data"));
    }

    #[test]
    fn sha_lengths() {
        assert_eq!(sha256(b"x").len(), SHA256_OUTPUT_LEN);
        assert_eq!(sha384(b"x").len(), SHA384_OUTPUT_LEN);
        assert_eq!(
            hex::encode(sha256(b"")),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
