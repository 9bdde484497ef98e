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

//! X.509 surface: subject/issuer names, subject-key lifting, and
//! signature verification against a designated issuer or root.
//!
//! Chain edges are verified individually with the looked-up issuer key;
//! anchoring a whole chain to the policy key is the caller's job via
//! [`verify_against_root`].

use crate::error::VerifyError;
use crate::keys::key_message_to_public_pkey;
use crate::statements::KEY_FORMAT_VSE;
use certifier_proto::{EccMessage, KeyMessage, PointMessage, RsaMessage};
use openssl::bn::{BigNum, BigNumContext};
use openssl::ec::EcKey;
use openssl::nid::Nid;
use openssl::pkey::Public;
use openssl::rsa::Rsa;
use openssl::stack::Stack;
use openssl::x509::store::X509StoreBuilder;
use openssl::x509::{X509NameRef, X509StoreContext, X509};

pub const ECC_P384_CURVE_NAME: &str = "P-384";

const P384_COORDINATE_LEN: i32 = 48;

pub fn x509_from_der(der: &[u8]) -> Result<X509, VerifyError> {
    X509::from_der(der)
        .map_err(|_| VerifyError::MalformedEvidence("certificate is not valid DER".to_string()))
}

fn common_name(name: &X509NameRef) -> Option<String> {
    name.entries_by_nid(Nid::COMMONNAME)
        .next()
        .and_then(|entry| entry.data().as_utf8().ok())
        .map(|s| s.to_string())
}

pub fn subject_common_name(cert: &X509) -> Option<String> {
    common_name(cert.subject_name())
}

pub fn issuer_common_name(cert: &X509) -> Option<String> {
    common_name(cert.issuer_name())
}

/// Lift the certificate's subject public key into a key message, named
/// after the subject common name.
pub fn subject_key(cert: &X509) -> Result<KeyMessage, VerifyError> {
    let name = subject_common_name(cert).unwrap_or_default();
    let pkey = cert
        .public_key()
        .map_err(|_| VerifyError::MalformedEvidence("certificate has no subject key".to_string()))?;
    if let Ok(rsa) = pkey.rsa() {
        return rsa_public_to_key_message(&name, &rsa);
    }
    if let Ok(ec) = pkey.ec_key() {
        return ecc_public_to_key_message(&name, &ec);
    }
    Err(VerifyError::MalformedEvidence(
        "subject key algorithm is not supported".to_string(),
    ))
}

pub fn rsa_public_to_key_message(
    name: &str,
    rsa: &Rsa<Public>,
) -> Result<KeyMessage, VerifyError> {
    let modulus = rsa.n().to_vec();
    let key_type = match modulus.len() {
        128 => "rsa-1024-public",
        256 => "rsa-2048-public",
        512 => "rsa-4096-public",
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
            public_modulus: Some(modulus),
            public_exponent: Some(rsa.e().to_vec()),
            ..Default::default()
        }),
        ..Default::default()
    })
}

/// 48-byte left-padded coordinates; the base point comes from the group
/// generator so equal curves always yield equal base points.
pub fn ecc_public_to_key_message(
    name: &str,
    ec: &EcKey<Public>,
) -> Result<KeyMessage, VerifyError> {
    let group = ec.group();
    if group.curve_name() != Some(Nid::SECP384R1) {
        return Err(VerifyError::MalformedEvidence(
            "unsupported elliptic curve".to_string(),
        ));
    }
    let mut ctx = BigNumContext::new()?;

    let mut p = BigNum::new()?;
    let mut a = BigNum::new()?;
    let mut b = BigNum::new()?;
    group.components_gfp(&mut p, &mut a, &mut b, &mut ctx)?;

    let mut x = BigNum::new()?;
    let mut y = BigNum::new()?;
    ec.public_key().affine_coordinates(group, &mut x, &mut y, &mut ctx)?;

    let mut gx = BigNum::new()?;
    let mut gy = BigNum::new()?;
    group
        .generator()
        .affine_coordinates(group, &mut gx, &mut gy, &mut ctx)?;

    let padded = |bn: &BigNum| bn.to_vec_padded(P384_COORDINATE_LEN);
    Ok(KeyMessage {
        key_name: Some(name.to_string()),
        key_type: Some("ecc-384-public".to_string()),
        key_format: Some(KEY_FORMAT_VSE.to_string()),
        ecc_key: Some(EccMessage {
            curve_name: Some(ECC_P384_CURVE_NAME.to_string()),
            curve_p: Some(padded(&p)?),
            curve_a: Some(padded(&a)?),
            curve_b: Some(padded(&b)?),
            base_point: Some(PointMessage {
                x: Some(padded(&gx)?),
                y: Some(padded(&gy)?),
            }),
            public_point: Some(PointMessage {
                x: Some(padded(&x)?),
                y: Some(padded(&y)?),
            }),
            ..Default::default()
        }),
        ..Default::default()
    })
}

/// Verify one chain edge: the certificate's signature under the issuer
/// key. Returns the verification verdict, not an error, on mismatch.
pub fn verify_cert_signature(cert: &X509, issuer_key: &KeyMessage) -> Result<bool, VerifyError> {
    let pkey = key_message_to_public_pkey(issuer_key)?;
    Ok(cert.verify(&pkey)?)
}

/// Verify a candidate certificate against a one-certificate root pool.
pub fn verify_against_root(root: &X509, cert: &X509) -> Result<bool, VerifyError> {
    let mut builder = X509StoreBuilder::new()?;
    builder.add_cert(root.to_owned())?;
    let store = builder.build();
    let chain = Stack::new()?;
    let mut ctx = X509StoreContext::new()?;
    Ok(ctx.init(&store, cert, &chain, |c| c.verify_cert())?)
}

/// Extract the subject key of a PEM-encoded certificate (used for the
/// platform key accompanying an attestation report).
pub fn key_from_pem(pem: &[u8]) -> Result<KeyMessage, VerifyError> {
    let cert = X509::from_pem(pem)
        .map_err(|_| VerifyError::MalformedEvidence("bad PEM certificate".to_string()))?;
    subject_key(&cert)
}
