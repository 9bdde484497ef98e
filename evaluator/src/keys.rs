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

//! Conversions between wire `KeyMessage`s and usable key objects.

use crate::error::VerifyError;
use crate::statements::KEY_FORMAT_VSE;
use certifier_proto::{KeyMessage, RsaMessage};
use openssl::bn::BigNum;
use openssl::ec::{EcGroup, EcKey};
use openssl::nid::Nid;
use openssl::pkey::{PKey, Private, Public};
use openssl::rsa::{Rsa, RsaPrivateKeyBuilder};

fn missing(what: &str) -> VerifyError {
    VerifyError::MalformedEvidence(format!("key is missing {what}"))
}

/// Lift the public half of a key message into a verification key.
/// Private key types are accepted; only public parameters are read.
pub fn key_message_to_public_pkey(key: &KeyMessage) -> Result<PKey<Public>, VerifyError> {
    match key.key_type.as_deref() {
        Some(
            "rsa-1024-public" | "rsa-1024-private" | "rsa-2048-public" | "rsa-2048-private"
            | "rsa-4096-public" | "rsa-4096-private",
        ) => {
            let rsa = key.rsa_key.as_ref().ok_or_else(|| missing("RSA material"))?;
            let n = BigNum::from_slice(
                rsa.public_modulus
                    .as_deref()
                    .ok_or_else(|| missing("a public modulus"))?,
            )?;
            let e = BigNum::from_slice(
                rsa.public_exponent
                    .as_deref()
                    .ok_or_else(|| missing("a public exponent"))?,
            )?;
            Ok(PKey::from_rsa(Rsa::from_public_components(n, e)?)?)
        }
        Some("ecc-384-public" | "ecc-384-private") => {
            Ok(PKey::from_ec_key(key_message_to_ec_public(key)?)?)
        }
        Some(other) => Err(VerifyError::MalformedEvidence(format!(
            "unsupported key type {other}"
        ))),
        None => Err(missing("a key type")),
    }
}

/// Lift an ECC-384 key message into a P-384 verification key.
pub fn key_message_to_ec_public(key: &KeyMessage) -> Result<EcKey<Public>, VerifyError> {
    match key.key_type.as_deref() {
        Some("ecc-384-public" | "ecc-384-private") => {}
        _ => {
            return Err(VerifyError::MalformedEvidence(
                "key is not an ECC-384 key".to_string(),
            ))
        }
    }
    let ecc = key.ecc_key.as_ref().ok_or_else(|| missing("ECC material"))?;
    let point = ecc
        .public_point
        .as_ref()
        .ok_or_else(|| missing("a public point"))?;
    let x = BigNum::from_slice(point.x.as_deref().ok_or_else(|| missing("a point x"))?)?;
    let y = BigNum::from_slice(point.y.as_deref().ok_or_else(|| missing("a point y"))?)?;
    let group = EcGroup::from_curve_name(Nid::SECP384R1)?;
    Ok(EcKey::from_public_key_affine_coordinates(&group, &x, &y)?)
}

/// Rebuild a signing key from an RSA private key message.
pub fn key_message_to_rsa_private(key: &KeyMessage) -> Result<PKey<Private>, VerifyError> {
    match key.key_type.as_deref() {
        Some("rsa-1024-private" | "rsa-2048-private" | "rsa-4096-private") => {}
        _ => {
            return Err(VerifyError::MalformedEvidence(
                "key is not an RSA private key".to_string(),
            ))
        }
    }
    let rsa = key.rsa_key.as_ref().ok_or_else(|| missing("RSA material"))?;
    let n = BigNum::from_slice(
        rsa.public_modulus
            .as_deref()
            .ok_or_else(|| missing("a public modulus"))?,
    )?;
    let e = BigNum::from_slice(
        rsa.public_exponent
            .as_deref()
            .ok_or_else(|| missing("a public exponent"))?,
    )?;
    let d = BigNum::from_slice(
        rsa.private_exponent
            .as_deref()
            .ok_or_else(|| missing("a private exponent"))?,
    )?;
    let rsa = RsaPrivateKeyBuilder::new(n, e, d)?.build();
    Ok(PKey::from_rsa(rsa)?)
}

/// Record a generated RSA key as a private key message.
pub fn rsa_private_to_key_message(
    name: &str,
    rsa: &Rsa<Private>,
) -> Result<KeyMessage, VerifyError> {
    let key_type = match rsa.n().to_vec().len() {
        128 => "rsa-1024-private",
        256 => "rsa-2048-private",
        512 => "rsa-4096-private",
        _ => {
            return Err(VerifyError::MalformedEvidence(
                "unsupported RSA modulus size".to_string(),
            ))
        }
    };
    Ok(KeyMessage {
        key_name: Some(name.to_string()),
        key_type: Some(key_type.to_string()),
        key_format: Some(KEY_FORMAT_VSE.to_string()),
        rsa_key: Some(RsaMessage {
            public_modulus: Some(rsa.n().to_vec()),
            public_exponent: Some(rsa.e().to_vec()),
            private_exponent: Some(rsa.d().to_vec()),
            ..Default::default()
        }),
        ..Default::default()
    })
}

/// Mint a fresh RSA key message of the given size.
pub fn generate_rsa_key_message(name: &str, bits: u32) -> Result<KeyMessage, VerifyError> {
    if !matches!(bits, 1024 | 2048 | 4096) {
        return Err(VerifyError::MalformedEvidence(format!(
            "unsupported RSA key size {bits}"
        )));
    }
    let rsa = certifier_crypto::generate_rsa_key(bits)?;
    rsa_private_to_key_message(name, &rsa)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statements::{internal_public_from_private, same_key};

    #[test]
    fn generated_key_round_trips_through_pkey() {
        let key = generate_rsa_key_message("testKey", 2048).unwrap();
        assert_eq!(key.key_type.as_deref(), Some("rsa-2048-private"));

        let signer = key_message_to_rsa_private(&key).unwrap();
        let public = internal_public_from_private(&key).unwrap();
        let verifier = key_message_to_public_pkey(&public).unwrap();

        let msg = b"signed with the rebuilt key";
        let sig = certifier_crypto::rsa_sha256_sign(&signer, msg).unwrap();
        assert!(certifier_crypto::rsa_sha256_verify(&verifier, msg, &sig));
    }

    #[test]
    fn public_shadow_compares_equal_to_itself_only() {
        let key = generate_rsa_key_message("a", 2048).unwrap();
        let public = internal_public_from_private(&key).unwrap();
        assert!(same_key(&public, &public));
        assert!(!same_key(&public, &key));
    }

    #[test]
    fn rejects_wrong_key_kinds() {
        let key = generate_rsa_key_message("a", 2048).unwrap();
        assert!(key_message_to_ec_public(&key).is_err());
        let public = internal_public_from_private(&key).unwrap();
        assert!(key_message_to_rsa_private(&public).is_err());
        assert!(generate_rsa_key_message("a", 1536).is_err());
    }
}
