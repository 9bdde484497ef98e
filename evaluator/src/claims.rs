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

//! Claim construction: the producer side of signed claims.

use crate::error::VerifyError;
use crate::keys::key_message_to_rsa_private;
use crate::statements::internal_public_from_private;
use certifier_proto::{ClaimMessage, KeyMessage, SignedClaimMessage, VseClause};
use prost::Message;

pub const CLAIM_FORMAT_VSE_CLAUSE: &str = "vse-clause";
pub const CLAIM_FORMAT_VSE_ATTESTATION: &str = "vse-attestation";

pub const ALG_RSA_1024_SHA256_PKCS: &str = "rsa-1024-sha256-pkcs-sign";
pub const ALG_RSA_2048_SHA256_PKCS: &str = "rsa-2048-sha256-pkcs-sign";
pub const ALG_RSA_4096_SHA384_PKCS: &str = "rsa-4096-sha384-pkcs-sign";

pub fn make_claim(
    serialized: Vec<u8>,
    format: &str,
    descriptor: &str,
    not_before: &str,
    not_after: &str,
) -> ClaimMessage {
    ClaimMessage {
        claim_format: Some(format.to_string()),
        claim_descriptor: Some(descriptor.to_string()),
        not_before: Some(not_before.to_string()),
        not_after: Some(not_after.to_string()),
        serialized_claim: Some(serialized),
    }
}

/// Sign a claim with an RSA private key. The signing algorithm follows
/// the key type; the embedded signing key is the public shadow.
pub fn make_signed_claim(
    claim: &ClaimMessage,
    signing_key: &KeyMessage,
) -> Result<SignedClaimMessage, VerifyError> {
    let algorithm = match signing_key.key_type.as_deref() {
        Some("rsa-1024-private") => ALG_RSA_1024_SHA256_PKCS,
        Some("rsa-2048-private") => ALG_RSA_2048_SHA256_PKCS,
        Some("rsa-4096-private") => ALG_RSA_4096_SHA384_PKCS,
        _ => {
            return Err(VerifyError::MalformedEvidence(
                "claims can only be signed with RSA private keys".to_string(),
            ))
        }
    };
    let public_key = internal_public_from_private(signing_key).ok_or_else(|| {
        VerifyError::MalformedEvidence("signing key has no public parameters".to_string())
    })?;
    let signer = key_message_to_rsa_private(signing_key)?;
    let serialized = claim.encode_to_vec();
    let signature = if algorithm == ALG_RSA_4096_SHA384_PKCS {
        certifier_crypto::rsa_sha384_sign(&signer, &serialized)?
    } else {
        certifier_crypto::rsa_sha256_sign(&signer, &serialized)?
    };
    Ok(SignedClaimMessage {
        serialized_claim_message: Some(serialized),
        signing_key: Some(public_key),
        signing_algorithm: Some(algorithm.to_string()),
        signature: Some(signature),
    })
}

/// Extract the VSE clause embedded in a signed claim. Performs no
/// verification; callers that need one verified go through the evidence
/// pipeline.
pub fn vse_from_signed_claim(signed: &SignedClaimMessage) -> Result<VseClause, VerifyError> {
    let serialized = signed.serialized_claim_message.as_deref().ok_or_else(|| {
        VerifyError::MalformedEvidence("signed claim carries no claim".to_string())
    })?;
    let claim = ClaimMessage::decode(serialized)
        .map_err(|_| VerifyError::MalformedEvidence("cannot decode claim".to_string()))?;
    if claim.claim_format.as_deref() != Some(CLAIM_FORMAT_VSE_CLAUSE) {
        return Err(VerifyError::MalformedEvidence(
            "claim does not carry a vse-clause".to_string(),
        ));
    }
    let body = claim.serialized_claim.as_deref().ok_or_else(|| {
        VerifyError::MalformedEvidence("claim carries no statement".to_string())
    })?;
    VseClause::decode(body)
        .map_err(|_| VerifyError::MalformedEvidence("cannot decode vse clause".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::generate_rsa_key_message;
    use crate::statements::{key_entity, same_vse_clause, unary_clause, VERB_IS_TRUSTED};

    #[test]
    fn signed_claim_round_trips_its_clause() {
        let signer = generate_rsa_key_message("signer", 2048).unwrap();
        let public = internal_public_from_private(&signer).unwrap();
        let clause = unary_clause(key_entity(public), VERB_IS_TRUSTED);
        let claim = make_claim(
            clause.encode_to_vec(),
            CLAIM_FORMAT_VSE_CLAUSE,
            "test statement",
            "2025:01:01T00:00:00Z",
            "2030:01:01T00:00:00Z",
        );
        let signed = make_signed_claim(&claim, &signer).unwrap();
        assert_eq!(
            signed.signing_algorithm.as_deref(),
            Some(ALG_RSA_2048_SHA256_PKCS)
        );
        let recovered = vse_from_signed_claim(&signed).unwrap();
        assert!(same_vse_clause(&clause, &recovered));
    }

    #[test]
    fn signing_requires_a_private_rsa_key() {
        let signer = generate_rsa_key_message("signer", 2048).unwrap();
        let public = internal_public_from_private(&signer).unwrap();
        let claim = make_claim(
            Vec::new(),
            CLAIM_FORMAT_VSE_CLAUSE,
            "",
            "2025:01:01T00:00:00Z",
            "2030:01:01T00:00:00Z",
        );
        assert!(make_signed_claim(&claim, &public).is_err());
    }

    #[test]
    fn attestation_claims_do_not_lift_to_clauses() {
        let signer = generate_rsa_key_message("signer", 2048).unwrap();
        let claim = make_claim(
            vec![1, 2, 3],
            CLAIM_FORMAT_VSE_ATTESTATION,
            "",
            "2025:01:01T00:00:00Z",
            "2030:01:01T00:00:00Z",
        );
        let signed = make_signed_claim(&claim, &signer).unwrap();
        assert!(vse_from_signed_claim(&signed).is_err());
    }
}
