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

//! Evidence verification and lifting.
//!
//! Each evidence item is cryptographically verified and lifted into at
//! most one proved VSE clause. Items are processed strictly in list
//! order; several kinds reference an earlier peer (a certificate's
//! issuer must already be in the seen-keys table, an SEV attestation
//! reads the immediately preceding proved clause, a hardware report
//! reads the immediately preceding PEM chain), so order is part of the
//! contract. Any verification failure aborts initialization and no
//! partial proved set is returned.

use crate::certs;
use crate::claims::{
    ALG_RSA_1024_SHA256_PKCS, ALG_RSA_2048_SHA256_PKCS, ALG_RSA_4096_SHA384_PKCS,
    CLAIM_FORMAT_VSE_ATTESTATION, CLAIM_FORMAT_VSE_CLAUSE,
};
use crate::error::VerifyError;
use crate::keys::{key_message_to_ec_public, key_message_to_public_pkey};
use crate::statements::{
    indirect_clause, key_entity, measurement_entity, same_key, simple_clause, unary_clause,
    ENTITY_KEY, VERB_IS_TRUSTED, VERB_IS_TRUSTED_FOR_ATTESTATION, VERB_SAYS, VERB_SPEAKS_FOR,
};
use crate::timepoint::{compare_time, parse_time};
use crate::PlatformVerifier;
use certifier_proto::{
    AttestationUserData, ClaimMessage, Evidence, KeyMessage, SevAttestationMessage,
    SignedClaimMessage, SignedReport, TimePoint, VseAttestationReportInfo, VseClause,
};
use prost::Message;
use std::cmp::Ordering;
use std::ops::Range;

pub const EVIDENCE_SIGNED_CLAIM: &str = "signed-claim";
pub const EVIDENCE_PEM_CERT_CHAIN: &str = "pem-cert-chain";
pub const EVIDENCE_OE_ATTESTATION_REPORT: &str = "oe-attestation-report";
pub const EVIDENCE_SEV_ATTESTATION: &str = "sev-attestation";
pub const EVIDENCE_CERT: &str = "cert";
pub const EVIDENCE_SIGNED_VSE_REPORT: &str = "signed-vse-attestation-report";

pub const REPORT_FORMAT_VSE_ATTESTATION: &str = "vse-attestation-report";

// SEV-SNP report layout.
const SEV_USER_DATA_HASH: Range<usize> = 0x50..0x80;
const SEV_MEASUREMENT: Range<usize> = 0x90..0xc0;
const SEV_SIGNED_REGION_END: usize = 0x2a0;
const SEV_SIG_R: Range<usize> = 0x2a0..0x2d0;
const SEV_SIG_S: Range<usize> = 0x2e8..0x318;
const SEV_REPORT_MIN_LEN: usize = 0x318;

const SEEN_KEYS_CAPACITY: usize = 30;

fn malformed(what: &str) -> VerifyError {
    VerifyError::MalformedEvidence(what.to_string())
}

// Subject keys already extracted from certificates, looked up by the
// subject common name when a later certificate names them as issuer.
struct SeenKeys {
    entries: Vec<(String, KeyMessage)>,
}

impl SeenKeys {
    fn new() -> Self {
        SeenKeys {
            entries: Vec::new(),
        }
    }

    fn add(&mut self, key: &KeyMessage) -> Result<(), VerifyError> {
        if self.entries.len() >= SEEN_KEYS_CAPACITY {
            return Err(malformed("seen-keys table is full"));
        }
        let name = key.key_name.clone().unwrap_or_default();
        self.entries.push((name, key.clone()));
        Ok(())
    }

    fn find(&self, name: &str) -> Option<&KeyMessage> {
        self.entries
            .iter()
            .find(|(seen_name, _)| seen_name == name)
            .map(|(_, key)| key)
    }
}

/// Fail with `TimeOutOfRange` unless `not_before <= now <= not_after`.
pub fn check_time_range(
    not_before: &str,
    not_after: &str,
    now: &TimePoint,
) -> Result<(), VerifyError> {
    let begin = parse_time(not_before).ok_or_else(|| malformed("bad not_before time"))?;
    let end = parse_time(not_after).ok_or_else(|| malformed("bad not_after time"))?;
    if compare_time(&begin, now) == Ordering::Greater
        || compare_time(&end, now) == Ordering::Less
    {
        return Err(VerifyError::TimeOutOfRange);
    }
    Ok(())
}

/// Verify a signed claim: well-formed inner claim, validity window (when
/// bounds are present), and the signature under the given public key per
/// the claim's algorithm tag.
pub fn verify_signed_claim(
    signed: &SignedClaimMessage,
    key: &KeyMessage,
    now: &TimePoint,
) -> Result<(), VerifyError> {
    let serialized = signed
        .serialized_claim_message
        .as_deref()
        .ok_or_else(|| malformed("signed claim carries no claim"))?;
    let claim = ClaimMessage::decode(serialized)
        .map_err(|_| malformed("cannot decode claim message"))?;

    match claim.claim_format.as_deref() {
        Some(CLAIM_FORMAT_VSE_CLAUSE | CLAIM_FORMAT_VSE_ATTESTATION) => {}
        _ => return Err(malformed("unsupported claim format")),
    }

    if let (Some(not_before), Some(not_after)) =
        (claim.not_before.as_deref(), claim.not_after.as_deref())
    {
        check_time_range(not_before, not_after, now)?;
    }

    let signature = signed
        .signature
        .as_deref()
        .ok_or_else(|| malformed("signed claim carries no signature"))?;
    let verifier = key_message_to_public_pkey(key)?;
    let verified = match signed.signing_algorithm.as_deref() {
        Some(ALG_RSA_1024_SHA256_PKCS | ALG_RSA_2048_SHA256_PKCS) => {
            certifier_crypto::rsa_sha256_verify(&verifier, serialized, signature)
        }
        Some(ALG_RSA_4096_SHA384_PKCS) => {
            certifier_crypto::rsa_sha384_verify(&verifier, serialized, signature)
        }
        _ => return Err(malformed("unsupported signing algorithm")),
    };
    if !verified {
        return Err(VerifyError::SignatureInvalid("signed claim".to_string()));
    }
    Ok(())
}

/// Verify a signed claim and extract the embedded clause, which must be
/// in `vse-clause` format.
pub fn verify_signed_assertion(
    signed: &SignedClaimMessage,
    key: &KeyMessage,
    now: &TimePoint,
) -> Result<VseClause, VerifyError> {
    verify_signed_claim(signed, key, now)?;
    crate::claims::vse_from_signed_claim(signed)
}

/// Verify a signed attestation report under its own embedded signing
/// key (RSA-SHA256 over the report bytes).
pub fn verify_attestation_report(signed: &SignedReport) -> Result<(), VerifyError> {
    if let Some(format) = signed.report_format.as_deref() {
        if format != REPORT_FORMAT_VSE_ATTESTATION {
            return Err(malformed("unsupported report format"));
        }
    }
    let key = signed
        .signing_key
        .as_ref()
        .ok_or_else(|| malformed("report carries no signing key"))?;
    let report = signed
        .report
        .as_deref()
        .ok_or_else(|| malformed("report carries no body"))?;
    let signature = signed
        .signature
        .as_deref()
        .ok_or_else(|| malformed("report carries no signature"))?;
    let verifier = key_message_to_public_pkey(key)?;
    if !certifier_crypto::rsa_sha256_verify(&verifier, report, signature) {
        return Err(VerifyError::SignatureInvalid(
            "attestation report".to_string(),
        ));
    }
    Ok(())
}

fn reverse_bytes(bytes: &[u8]) -> Vec<u8> {
    let mut out = bytes.to_vec();
    out.reverse();
    out
}

/// Verify an SEV attestation against the VCEK key and return the
/// measurement. The report binds `sha384(what_was_said)` at 0x50 and is
/// signed with ECDSA-P384 over `sha384(report[0..0x2a0])`; (r, s) are
/// little-endian on the wire.
pub fn verify_sev_attestation(
    attestation: &SevAttestationMessage,
    vcek_key: &KeyMessage,
) -> Result<Vec<u8>, VerifyError> {
    let report = attestation
        .reported_attestation
        .as_deref()
        .ok_or_else(|| malformed("sev attestation carries no report"))?;
    if report.len() < SEV_REPORT_MIN_LEN {
        return Err(malformed("sev report is too short"));
    }
    let what_was_said = attestation
        .what_was_said
        .as_deref()
        .ok_or_else(|| malformed("sev attestation carries no user data"))?;

    let user_data_hash = certifier_crypto::sha384(what_was_said);
    if report[SEV_USER_DATA_HASH] != user_data_hash[..] {
        return Err(VerifyError::SignatureInvalid(
            "sev user data hash does not match the report".to_string(),
        ));
    }

    let verifier = key_message_to_ec_public(vcek_key)?;
    let digest = certifier_crypto::sha384(&report[..SEV_SIGNED_REGION_END]);
    let r = reverse_bytes(&report[SEV_SIG_R]);
    let s = reverse_bytes(&report[SEV_SIG_S]);
    if !certifier_crypto::ecdsa_p384_verify(&verifier, &digest, &r, &s)? {
        return Err(VerifyError::SignatureInvalid(
            "sev report signature".to_string(),
        ));
    }
    Ok(report[SEV_MEASUREMENT].to_vec())
}

// `signer says (enclave_key speaks-for measurement)`
fn says_speaks_for(signer: KeyMessage, enclave_key: KeyMessage, measurement: Vec<u8>) -> VseClause {
    let speaks = simple_clause(
        key_entity(enclave_key),
        VERB_SPEAKS_FOR,
        measurement_entity(measurement),
    );
    indirect_clause(key_entity(signer), VERB_SAYS, speaks)
}

// `signer says (subject is-trusted-for-attestation)`
fn cert_trust_statement(subject: KeyMessage, signer: KeyMessage) -> VseClause {
    let trusted = unary_clause(key_entity(subject), VERB_IS_TRUSTED_FOR_ATTESTATION);
    indirect_clause(key_entity(signer), VERB_SAYS, trusted)
}

/// Build the initial proved set: the `policy_key is-trusted` axiom
/// followed by one clause per successfully lifted evidence item, in
/// evidence order.
pub fn init_proved_statements(
    policy_key: &KeyMessage,
    evidence: &[Evidence],
    platform: &dyn PlatformVerifier,
    now: &TimePoint,
) -> Result<Vec<VseClause>, VerifyError> {
    let mut proved = vec![unary_clause(
        key_entity(policy_key.clone()),
        VERB_IS_TRUSTED,
    )];
    let mut seen_keys = SeenKeys::new();

    log::debug!("initializing proved statements from {} items", evidence.len());

    for (index, item) in evidence.iter().enumerate() {
        let payload = item
            .serialized_evidence
            .as_deref()
            .ok_or_else(|| malformed("evidence carries no payload"))?;
        match item.evidence_type.as_deref() {
            Some(EVIDENCE_SIGNED_CLAIM) => {
                let signed = SignedClaimMessage::decode(payload)
                    .map_err(|_| malformed("cannot decode signed claim"))?;
                let signing_key = signed
                    .signing_key
                    .clone()
                    .ok_or_else(|| malformed("signed claim carries no signing key"))?;
                let clause = verify_signed_assertion(&signed, &signing_key, now)?;
                // The speaker must authenticate itself: `K says ...` with
                // K equal to the signing key. Other shapes are dropped
                // without error.
                let speaker_is_signer = clause.verb.as_deref() == Some(VERB_SAYS)
                    && clause.subject.as_ref().is_some_and(|subject| {
                        subject.entity_type.as_deref() == Some(ENTITY_KEY)
                            && subject
                                .key
                                .as_ref()
                                .is_some_and(|key| same_key(&signing_key, key))
                    });
                if speaker_is_signer {
                    proved.push(clause);
                } else {
                    log::debug!(
                        "dropping signed claim {index}: clause does not authenticate its signer"
                    );
                }
            }
            Some(EVIDENCE_PEM_CERT_CHAIN) => {
                // Consumed by the attestation report that follows it.
            }
            Some(EVIDENCE_OE_ATTESTATION_REPORT) => {
                if index < 1
                    || evidence[index - 1].evidence_type.as_deref()
                        != Some(EVIDENCE_PEM_CERT_CHAIN)
                {
                    return Err(malformed(
                        "attestation report is not preceded by its cert chain",
                    ));
                }
                let endorsements = evidence[index - 1]
                    .serialized_evidence
                    .as_deref()
                    .ok_or_else(|| malformed("cert chain carries no payload"))?;
                let verdict = platform.verify(payload, endorsements)?;
                let user_data = AttestationUserData::decode(verdict.user_data.as_slice())
                    .map_err(|_| malformed("cannot decode attestation user data"))?;
                let enclave_key = user_data
                    .enclave_key
                    .ok_or_else(|| malformed("user data carries no enclave key"))?;
                let platform_key = certs::key_from_pem(endorsements)?;
                proved.push(says_speaks_for(
                    platform_key,
                    enclave_key,
                    verdict.measurement,
                ));
            }
            Some(EVIDENCE_SEV_ATTESTATION) => {
                // The VCEK key comes from the immediately preceding
                // proved clause, e.g. `K_ark says (K_vcek ...)`.
                let previous = proved
                    .last()
                    .ok_or_else(|| malformed("sev attestation has nothing preceding it"))?;
                let subject = previous
                    .clause
                    .as_ref()
                    .and_then(|inner| inner.subject.as_ref())
                    .ok_or_else(|| malformed("preceding statement does not name a speaker"))?;
                if subject.entity_type.as_deref() != Some(ENTITY_KEY) {
                    return Err(malformed("preceding statement's subject is not a key"));
                }
                let vcek_key = subject
                    .key
                    .clone()
                    .ok_or_else(|| malformed("preceding statement carries no key"))?;
                let attestation = SevAttestationMessage::decode(payload)
                    .map_err(|_| malformed("cannot decode sev attestation"))?;
                let measurement = verify_sev_attestation(&attestation, &vcek_key)?;
                log::debug!("sev measurement: {}", hex::encode(&measurement));
                let user_data = AttestationUserData::decode(
                    attestation
                        .what_was_said
                        .as_deref()
                        .unwrap_or_default(),
                )
                .map_err(|_| malformed("cannot decode sev user data"))?;
                let enclave_key = user_data
                    .enclave_key
                    .ok_or_else(|| malformed("sev user data carries no enclave key"))?;
                proved.push(says_speaks_for(vcek_key, enclave_key, measurement));
            }
            Some(EVIDENCE_CERT) => {
                let cert = certs::x509_from_der(payload)?;
                let subject = certs::subject_key(&cert)?;
                let subject_name = subject.key_name.clone().unwrap_or_default();
                if seen_keys.find(&subject_name).is_none() {
                    seen_keys.add(&subject)?;
                }
                let issuer_name = certs::issuer_common_name(&cert)
                    .ok_or_else(|| malformed("certificate has no issuer common name"))?;
                let signer = seen_keys
                    .find(&issuer_name)
                    .cloned()
                    .ok_or_else(|| malformed("certificate issuer has not been seen"))?;
                if !certs::verify_cert_signature(&cert, &signer)? {
                    return Err(VerifyError::SignatureInvalid(
                        "certificate signature".to_string(),
                    ));
                }
                proved.push(cert_trust_statement(subject, signer));
            }
            Some(EVIDENCE_SIGNED_VSE_REPORT) => {
                let signed = SignedReport::decode(payload)
                    .map_err(|_| malformed("cannot decode signed report"))?;
                verify_attestation_report(&signed)?;
                let signing_key = signed
                    .signing_key
                    .clone()
                    .ok_or_else(|| malformed("report carries no signing key"))?;
                let info = VseAttestationReportInfo::decode(
                    signed.report.as_deref().unwrap_or_default(),
                )
                .map_err(|_| malformed("cannot decode report info"))?;
                let not_before = info
                    .not_before
                    .as_deref()
                    .ok_or_else(|| malformed("report has no not_before"))?;
                let not_after = info
                    .not_after
                    .as_deref()
                    .ok_or_else(|| malformed("report has no not_after"))?;
                check_time_range(not_before, not_after, now)?;
                let user_data =
                    AttestationUserData::decode(info.user_data.as_deref().unwrap_or_default())
                        .map_err(|_| malformed("cannot decode report user data"))?;
                let enclave_key = user_data
                    .enclave_key
                    .ok_or_else(|| malformed("report user data carries no enclave key"))?;
                let measurement = info
                    .verified_measurement
                    .ok_or_else(|| malformed("report carries no measurement"))?;
                log::debug!("report measurement: {}", hex::encode(&measurement));
                proved.push(says_speaks_for(signing_key, enclave_key, measurement));
            }
            Some(other) => return Err(VerifyError::UnknownEvidenceType(other.to_string())),
            None => return Err(malformed("evidence carries no type")),
        }
    }
    Ok(proved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::certs::test_support::{make_cert, rsa_pkey};
    use crate::claims::{make_claim, make_signed_claim};
    use crate::keys::generate_rsa_key_message;
    use crate::platform::DenyAllPlatformVerifier;
    use crate::statements::{internal_public_from_private, same_vse_clause};
    use crate::timepoint::{format_time, now};
    use openssl::ec::{EcGroup, EcKey};
    use openssl::ecdsa::EcdsaSig;
    use openssl::nid::Nid;

    fn init_logger() {
        let _ = env_logger::builder()
            .is_test(true)
            .filter_level(log::LevelFilter::max())
            .try_init();
    }

    // Window bounds well clear of any clock the tests run under.
    const LONG_AGO: &str = "2020:01:01T00:00:00Z";
    const LONG_AGO_PLUS_DAY: &str = "2020:01:02T00:00:00Z";
    const FAR_FUTURE: &str = "2100:01:01T00:00:00Z";

    // `speaker says <statement>`, signed by the speaker, packaged as
    // evidence with a currently valid window.
    fn signed_claim_evidence(speaker: &KeyMessage, statement: VseClause) -> Evidence {
        signed_claim_evidence_with_window(speaker, statement, LONG_AGO, FAR_FUTURE)
    }

    fn signed_claim_evidence_with_window(
        speaker: &KeyMessage,
        statement: VseClause,
        not_before: &str,
        not_after: &str,
    ) -> Evidence {
        let speaker_public = internal_public_from_private(speaker).unwrap();
        let says = indirect_clause(key_entity(speaker_public), VERB_SAYS, statement);
        let claim = make_claim(
            says.encode_to_vec(),
            CLAIM_FORMAT_VSE_CLAUSE,
            "test statement",
            not_before,
            not_after,
        );
        let signed = make_signed_claim(&claim, speaker).unwrap();
        Evidence {
            evidence_type: Some(EVIDENCE_SIGNED_CLAIM.to_string()),
            serialized_evidence: Some(signed.encode_to_vec()),
        }
    }

    #[test]
    fn axiom_is_seeded_first() {
        init_logger();
        let policy = generate_rsa_key_message("policyKey", 2048).unwrap();
        let policy_public = internal_public_from_private(&policy).unwrap();
        let proved = init_proved_statements(
            &policy_public,
            &[],
            &DenyAllPlatformVerifier,
            &now(),
        )
        .unwrap();
        assert_eq!(proved.len(), 1);
        let axiom = unary_clause(key_entity(policy_public), VERB_IS_TRUSTED);
        assert!(same_vse_clause(&proved[0], &axiom));
    }

    #[test]
    fn signed_claim_lifts_to_its_clause() {
        init_logger();
        let policy = generate_rsa_key_message("policyKey", 2048).unwrap();
        let policy_public = internal_public_from_private(&policy).unwrap();
        let platform = generate_rsa_key_message("platformKey", 2048).unwrap();
        let platform_public = internal_public_from_private(&platform).unwrap();

        let statement = unary_clause(key_entity(platform_public.clone()), VERB_IS_TRUSTED);
        let evidence = [signed_claim_evidence(&policy, statement.clone())];

        let proved = init_proved_statements(
            &policy_public,
            &evidence,
            &DenyAllPlatformVerifier,
            &now(),
        )
        .unwrap();
        assert_eq!(proved.len(), 2);
        let expected = indirect_clause(key_entity(policy_public), VERB_SAYS, statement);
        assert!(same_vse_clause(&proved[1], &expected));
    }

    #[test]
    fn mismatched_speaker_is_dropped_silently() {
        init_logger();
        let policy = generate_rsa_key_message("policyKey", 2048).unwrap();
        let policy_public = internal_public_from_private(&policy).unwrap();
        let other = generate_rsa_key_message("otherKey", 2048).unwrap();
        let other_public = internal_public_from_private(&other).unwrap();

        // Claims to speak for `other` but is signed by `policy`.
        let says = indirect_clause(
            key_entity(other_public.clone()),
            VERB_SAYS,
            unary_clause(key_entity(other_public), VERB_IS_TRUSTED),
        );
        let claim = make_claim(
            says.encode_to_vec(),
            CLAIM_FORMAT_VSE_CLAUSE,
            "",
            LONG_AGO,
            FAR_FUTURE,
        );
        let signed = make_signed_claim(&claim, &policy).unwrap();
        let evidence = [Evidence {
            evidence_type: Some(EVIDENCE_SIGNED_CLAIM.to_string()),
            serialized_evidence: Some(signed.encode_to_vec()),
        }];

        let proved = init_proved_statements(
            &policy_public,
            &evidence,
            &DenyAllPlatformVerifier,
            &now(),
        )
        .unwrap();
        // Only the axiom: dropped, but not an error.
        assert_eq!(proved.len(), 1);
    }

    #[test]
    fn expired_claim_fails_with_time_out_of_range() {
        init_logger();
        let policy = generate_rsa_key_message("policyKey", 2048).unwrap();
        let policy_public = internal_public_from_private(&policy).unwrap();

        let statement = unary_clause(key_entity(policy_public.clone()), VERB_IS_TRUSTED);
        let evidence = [signed_claim_evidence_with_window(
            &policy,
            statement,
            LONG_AGO,
            LONG_AGO_PLUS_DAY,
        )];

        match init_proved_statements(
            &policy_public,
            &evidence,
            &DenyAllPlatformVerifier,
            &now(),
        ) {
            Ok(_) => panic!("initialization should fail"),
            Err(err) => assert!(matches!(err, VerifyError::TimeOutOfRange)),
        }
    }

    #[test]
    fn tampered_claim_signature_fails() {
        init_logger();
        let policy = generate_rsa_key_message("policyKey", 2048).unwrap();
        let policy_public = internal_public_from_private(&policy).unwrap();

        let statement = unary_clause(key_entity(policy_public.clone()), VERB_IS_TRUSTED);
        let evidence = signed_claim_evidence(&policy, statement);
        let mut signed =
            SignedClaimMessage::decode(evidence.serialized_evidence.as_deref().unwrap()).unwrap();
        if let Some(signature) = signed.signature.as_mut() {
            signature[0] ^= 0x01;
        }
        let tampered = [Evidence {
            evidence_type: Some(EVIDENCE_SIGNED_CLAIM.to_string()),
            serialized_evidence: Some(signed.encode_to_vec()),
        }];

        match init_proved_statements(
            &policy_public,
            &tampered,
            &DenyAllPlatformVerifier,
            &now(),
        ) {
            Ok(_) => panic!("initialization should fail"),
            Err(err) => assert!(matches!(err, VerifyError::SignatureInvalid(_))),
        }
    }

    #[test]
    fn unknown_evidence_type_fails() {
        init_logger();
        let policy = generate_rsa_key_message("policyKey", 2048).unwrap();
        let policy_public = internal_public_from_private(&policy).unwrap();
        let evidence = [Evidence {
            evidence_type: Some("mystery-blob".to_string()),
            serialized_evidence: Some(vec![1, 2, 3]),
        }];
        match init_proved_statements(
            &policy_public,
            &evidence,
            &DenyAllPlatformVerifier,
            &now(),
        ) {
            Ok(_) => panic!("initialization should fail"),
            Err(err) => assert!(matches!(err, VerifyError::UnknownEvidenceType(_))),
        }
    }

    #[test]
    fn cert_chain_lifts_trust_statements() {
        init_logger();
        let policy = generate_rsa_key_message("policyKey", 2048).unwrap();
        let policy_public = internal_public_from_private(&policy).unwrap();

        let root_key = rsa_pkey(2048);
        let leaf_key = rsa_pkey(2048);
        let root = make_cert("platformAuthority", &root_key, "platformAuthority", &root_key, 1);
        let leaf = make_cert("platformKey", &leaf_key, "platformAuthority", &root_key, 2);

        let evidence = [
            Evidence {
                evidence_type: Some(EVIDENCE_CERT.to_string()),
                serialized_evidence: Some(root.to_der().unwrap()),
            },
            Evidence {
                evidence_type: Some(EVIDENCE_CERT.to_string()),
                serialized_evidence: Some(leaf.to_der().unwrap()),
            },
        ];
        let proved = init_proved_statements(
            &policy_public,
            &evidence,
            &DenyAllPlatformVerifier,
            &now(),
        )
        .unwrap();
        assert_eq!(proved.len(), 3);

        let root_subject = certs::subject_key(&root).unwrap();
        let leaf_subject = certs::subject_key(&leaf).unwrap();
        let expected = cert_trust_statement(leaf_subject, root_subject);
        assert!(same_vse_clause(&proved[2], &expected));
    }

    #[test]
    fn cert_with_unseen_issuer_fails() {
        init_logger();
        let policy = generate_rsa_key_message("policyKey", 2048).unwrap();
        let policy_public = internal_public_from_private(&policy).unwrap();

        let root_key = rsa_pkey(2048);
        let leaf_key = rsa_pkey(2048);
        let leaf = make_cert("platformKey", &leaf_key, "absentAuthority", &root_key, 1);

        let evidence = [Evidence {
            evidence_type: Some(EVIDENCE_CERT.to_string()),
            serialized_evidence: Some(leaf.to_der().unwrap()),
        }];
        match init_proved_statements(
            &policy_public,
            &evidence,
            &DenyAllPlatformVerifier,
            &now(),
        ) {
            Ok(_) => panic!("initialization should fail"),
            Err(err) => assert!(matches!(err, VerifyError::MalformedEvidence(_))),
        }
    }

    // Build an SEV-style report binding `what_was_said`, with the given
    // measurement, signed by `signer`.
    fn sev_report(what_was_said: &[u8], measurement: &[u8; 48], signer: &EcKey<openssl::pkey::Private>) -> Vec<u8> {
        let mut report = vec![0u8; SEV_REPORT_MIN_LEN];
        report[SEV_USER_DATA_HASH]
            .copy_from_slice(&certifier_crypto::sha384(what_was_said));
        report[SEV_MEASUREMENT].copy_from_slice(measurement);

        let digest = certifier_crypto::sha384(&report[..SEV_SIGNED_REGION_END]);
        let signature = EcdsaSig::sign(&digest, signer).unwrap();
        let r = signature.r().to_vec_padded(48).unwrap();
        let s = signature.s().to_vec_padded(48).unwrap();
        report[SEV_SIG_R].copy_from_slice(&reverse_bytes(&r));
        report[SEV_SIG_S].copy_from_slice(&reverse_bytes(&s));
        report
    }

    fn sev_fixture() -> (KeyMessage, KeyMessage, [Evidence; 2], Vec<u8>, KeyMessage) {
        let policy = generate_rsa_key_message("policyKey", 2048).unwrap();
        let policy_public = internal_public_from_private(&policy).unwrap();

        let group = EcGroup::from_curve_name(Nid::SECP384R1).unwrap();
        let vcek_private = certifier_crypto::generate_p384_key().unwrap();
        let vcek_public = EcKey::from_public_key(&group, vcek_private.public_key()).unwrap();
        let vcek_key = certs::ecc_public_to_key_message("vcekKey", &vcek_public).unwrap();

        let enclave = generate_rsa_key_message("enclaveKey", 2048).unwrap();
        let enclave_public = internal_public_from_private(&enclave).unwrap();

        let measurement = [7u8; 48];
        let user_data = AttestationUserData {
            enclave_type: Some("sev-enclave".to_string()),
            time: Some(format_time(&now())),
            enclave_key: Some(enclave_public.clone()),
        };
        let what_was_said = user_data.encode_to_vec();
        let report = sev_report(&what_was_said, &measurement, &vcek_private);
        let attestation = SevAttestationMessage {
            what_was_said: Some(what_was_said),
            reported_attestation: Some(report),
        };

        // The preceding statement names the VCEK key as the inner
        // subject, the position the lifter reads it from.
        let admission = signed_claim_evidence(
            &policy,
            unary_clause(key_entity(vcek_key.clone()), VERB_IS_TRUSTED_FOR_ATTESTATION),
        );
        let evidence = [
            admission,
            Evidence {
                evidence_type: Some(EVIDENCE_SEV_ATTESTATION.to_string()),
                serialized_evidence: Some(attestation.encode_to_vec()),
            },
        ];
        (
            policy_public,
            vcek_key,
            evidence,
            measurement.to_vec(),
            enclave_public,
        )
    }

    #[test]
    fn sev_attestation_lifts_speaks_for() {
        init_logger();
        let (policy_public, vcek_key, evidence, measurement, enclave_public) = sev_fixture();
        let proved = init_proved_statements(
            &policy_public,
            &evidence,
            &DenyAllPlatformVerifier,
            &now(),
        )
        .unwrap();
        assert_eq!(proved.len(), 3);
        let expected = says_speaks_for(vcek_key, enclave_public, measurement);
        assert!(same_vse_clause(&proved[2], &expected));
    }

    #[test]
    fn sev_attestation_with_flipped_signature_fails() {
        init_logger();
        let (policy_public, _, mut evidence, _, _) = sev_fixture();
        let mut attestation = SevAttestationMessage::decode(
            evidence[1].serialized_evidence.as_deref().unwrap(),
        )
        .unwrap();
        if let Some(report) = attestation.reported_attestation.as_mut() {
            report[SEV_SIG_R.start] ^= 0x01;
        }
        evidence[1].serialized_evidence = Some(attestation.encode_to_vec());

        match init_proved_statements(
            &policy_public,
            &evidence,
            &DenyAllPlatformVerifier,
            &now(),
        ) {
            Ok(_) => panic!("initialization should fail"),
            Err(err) => assert!(matches!(err, VerifyError::SignatureInvalid(_))),
        }
    }

    #[test]
    fn sev_attestation_without_predecessor_fails() {
        init_logger();
        let (policy_public, _, evidence, _, _) = sev_fixture();
        let orphaned = [evidence[1].clone()];
        match init_proved_statements(
            &policy_public,
            &orphaned,
            &DenyAllPlatformVerifier,
            &now(),
        ) {
            Ok(_) => panic!("initialization should fail"),
            Err(err) => assert!(matches!(err, VerifyError::MalformedEvidence(_))),
        }
    }

    fn attestation_report_evidence(
        attest_key: &KeyMessage,
        enclave_key: &KeyMessage,
        measurement: &[u8],
        not_before: &str,
        not_after: &str,
    ) -> Evidence {
        let user_data = AttestationUserData {
            enclave_type: Some("simulated-enclave".to_string()),
            time: Some(not_before.to_string()),
            enclave_key: Some(enclave_key.clone()),
        };
        let info = VseAttestationReportInfo {
            enclave_type: Some("simulated-enclave".to_string()),
            verified_measurement: Some(measurement.to_vec()),
            not_before: Some(not_before.to_string()),
            not_after: Some(not_after.to_string()),
            user_data: Some(user_data.encode_to_vec()),
        };
        let report = info.encode_to_vec();
        let signer = crate::keys::key_message_to_rsa_private(attest_key).unwrap();
        let signature = certifier_crypto::rsa_sha256_sign(&signer, &report).unwrap();
        let signed = SignedReport {
            report_format: Some(REPORT_FORMAT_VSE_ATTESTATION.to_string()),
            report: Some(report),
            signing_key: internal_public_from_private(attest_key),
            signing_algorithm: Some(ALG_RSA_2048_SHA256_PKCS.to_string()),
            signature: Some(signature),
        };
        Evidence {
            evidence_type: Some(EVIDENCE_SIGNED_VSE_REPORT.to_string()),
            serialized_evidence: Some(signed.encode_to_vec()),
        }
    }

    #[test]
    fn signed_report_lifts_speaks_for() {
        init_logger();
        let policy = generate_rsa_key_message("policyKey", 2048).unwrap();
        let policy_public = internal_public_from_private(&policy).unwrap();
        let attest = generate_rsa_key_message("attestKey", 2048).unwrap();
        let attest_public = internal_public_from_private(&attest).unwrap();
        let enclave = generate_rsa_key_message("enclaveKey", 2048).unwrap();
        let enclave_public = internal_public_from_private(&enclave).unwrap();

        let measurement = vec![3u8; 32];
        let evidence = [attestation_report_evidence(
            &attest,
            &enclave_public,
            &measurement,
            LONG_AGO,
            FAR_FUTURE,
        )];
        let proved = init_proved_statements(
            &policy_public,
            &evidence,
            &DenyAllPlatformVerifier,
            &now(),
        )
        .unwrap();
        assert_eq!(proved.len(), 2);
        let expected = says_speaks_for(attest_public, enclave_public, measurement);
        assert!(same_vse_clause(&proved[1], &expected));
    }

    #[test]
    fn stale_report_fails_with_time_out_of_range() {
        init_logger();
        let policy = generate_rsa_key_message("policyKey", 2048).unwrap();
        let policy_public = internal_public_from_private(&policy).unwrap();
        let attest = generate_rsa_key_message("attestKey", 2048).unwrap();
        let enclave = generate_rsa_key_message("enclaveKey", 2048).unwrap();
        let enclave_public = internal_public_from_private(&enclave).unwrap();

        let evidence = [attestation_report_evidence(
            &attest,
            &enclave_public,
            &[3u8; 32],
            LONG_AGO,
            LONG_AGO_PLUS_DAY,
        )];
        match init_proved_statements(
            &policy_public,
            &evidence,
            &DenyAllPlatformVerifier,
            &now(),
        ) {
            Ok(_) => panic!("initialization should fail"),
            Err(err) => assert!(matches!(err, VerifyError::TimeOutOfRange)),
        }
    }

    #[test]
    fn seen_keys_table_is_bounded() {
        let mut seen = SeenKeys::new();
        for i in 0..SEEN_KEYS_CAPACITY {
            let key = KeyMessage {
                key_name: Some(format!("key-{i}")),
                ..Default::default()
            };
            seen.add(&key).unwrap();
        }
        let overflow = KeyMessage {
            key_name: Some("one-too-many".to_string()),
            ..Default::default()
        };
        assert!(seen.add(&overflow).is_err());
        assert!(seen.find("key-0").is_some());
        assert!(seen.find("one-too-many").is_none());
    }
}
