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

//! Wire messages exchanged with and inside the certifier.
//!
//! The structs are hand-maintained prost messages rather than generated
//! code so the crate builds without a protoc step. Field numbers are part
//! of the wire contract and must never be reassigned. All scalar fields
//! are optional (proto2 style); absence and presence are distinguished
//! throughout the evaluator.

/// A wall-clock instant, exchanged as discrete calendar fields.
/// Seconds are fractional.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TimePoint {
    #[prost(int32, optional, tag = "1")]
    pub year: Option<i32>,
    #[prost(int32, optional, tag = "2")]
    pub month: Option<i32>,
    #[prost(int32, optional, tag = "3")]
    pub day: Option<i32>,
    #[prost(int32, optional, tag = "4")]
    pub hour: Option<i32>,
    #[prost(int32, optional, tag = "5")]
    pub minute: Option<i32>,
    #[prost(double, optional, tag = "6")]
    pub seconds: Option<f64>,
}

/// An affine elliptic-curve point, coordinates big-endian.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PointMessage {
    #[prost(bytes = "vec", optional, tag = "1")]
    pub x: Option<Vec<u8>>,
    #[prost(bytes = "vec", optional, tag = "2")]
    pub y: Option<Vec<u8>>,
}

/// ECC key material. Only the named curve P-384 is used.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct EccMessage {
    #[prost(string, optional, tag = "1")]
    pub curve_name: Option<String>,
    #[prost(bytes = "vec", optional, tag = "2")]
    pub curve_p: Option<Vec<u8>>,
    #[prost(bytes = "vec", optional, tag = "3")]
    pub curve_a: Option<Vec<u8>>,
    #[prost(bytes = "vec", optional, tag = "4")]
    pub curve_b: Option<Vec<u8>>,
    #[prost(message, optional, tag = "5")]
    pub base_point: Option<PointMessage>,
    #[prost(message, optional, tag = "6")]
    pub public_point: Option<PointMessage>,
    #[prost(bytes = "vec", optional, tag = "7")]
    pub order_of_base_point: Option<Vec<u8>>,
    #[prost(bytes = "vec", optional, tag = "8")]
    pub private_multiplier: Option<Vec<u8>>,
}

/// RSA key material, big-endian byte strings.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RsaMessage {
    #[prost(bytes = "vec", optional, tag = "1")]
    pub public_modulus: Option<Vec<u8>>,
    #[prost(bytes = "vec", optional, tag = "2")]
    pub public_exponent: Option<Vec<u8>>,
    #[prost(bytes = "vec", optional, tag = "3")]
    pub private_exponent: Option<Vec<u8>>,
    #[prost(bytes = "vec", optional, tag = "4")]
    pub private_p: Option<Vec<u8>>,
    #[prost(bytes = "vec", optional, tag = "5")]
    pub private_q: Option<Vec<u8>>,
    #[prost(bytes = "vec", optional, tag = "6")]
    pub private_dp: Option<Vec<u8>>,
    #[prost(bytes = "vec", optional, tag = "7")]
    pub private_dq: Option<Vec<u8>>,
}

/// A typed key. `key_type` is one of the closed set
/// `rsa-{1024,2048,4096}-{public,private}` and `ecc-384-{public,private}`.
/// Key equality is defined over public parameters only; see the evaluator.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct KeyMessage {
    #[prost(string, optional, tag = "1")]
    pub key_name: Option<String>,
    #[prost(string, optional, tag = "2")]
    pub key_type: Option<String>,
    #[prost(string, optional, tag = "3")]
    pub key_format: Option<String>,
    #[prost(message, optional, tag = "4")]
    pub rsa_key: Option<RsaMessage>,
    #[prost(message, optional, tag = "5")]
    pub ecc_key: Option<EccMessage>,
    #[prost(bytes = "vec", optional, tag = "6")]
    pub secret_key_bits: Option<Vec<u8>>,
    #[prost(bytes = "vec", optional, tag = "7")]
    pub certificate: Option<Vec<u8>>,
    #[prost(string, optional, tag = "8")]
    pub not_before: Option<String>,
    #[prost(string, optional, tag = "9")]
    pub not_after: Option<String>,
}

/// Either a key or an opaque measurement; `entity_type` selects which.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct EntityMessage {
    #[prost(string, optional, tag = "1")]
    pub entity_type: Option<String>,
    #[prost(message, optional, tag = "2")]
    pub key: Option<KeyMessage>,
    #[prost(bytes = "vec", optional, tag = "3")]
    pub measurement: Option<Vec<u8>>,
}

/// A verifiable statement expression. Well-formed shapes are
/// `Subject verb`, `Subject verb Object`, and `Subject says Clause`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct VseClause {
    #[prost(message, optional, tag = "1")]
    pub subject: Option<EntityMessage>,
    #[prost(string, optional, tag = "2")]
    pub verb: Option<String>,
    #[prost(message, optional, tag = "3")]
    pub object: Option<EntityMessage>,
    #[prost(message, optional, boxed, tag = "4")]
    pub clause: Option<Box<VseClause>>,
}

/// A serialized statement with a validity window.
/// Time bounds use the `YYYY:MM:DDThh:mm:ss.sssZ` format.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ClaimMessage {
    #[prost(string, optional, tag = "1")]
    pub claim_format: Option<String>,
    #[prost(string, optional, tag = "2")]
    pub claim_descriptor: Option<String>,
    #[prost(string, optional, tag = "3")]
    pub not_before: Option<String>,
    #[prost(string, optional, tag = "4")]
    pub not_after: Option<String>,
    #[prost(bytes = "vec", optional, tag = "5")]
    pub serialized_claim: Option<Vec<u8>>,
}

/// A claim signed by its speaker. `signing_key` carries the public key.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SignedClaimMessage {
    #[prost(bytes = "vec", optional, tag = "1")]
    pub serialized_claim_message: Option<Vec<u8>>,
    #[prost(message, optional, tag = "2")]
    pub signing_key: Option<KeyMessage>,
    #[prost(string, optional, tag = "3")]
    pub signing_algorithm: Option<String>,
    #[prost(bytes = "vec", optional, tag = "4")]
    pub signature: Option<Vec<u8>>,
}

/// What an enclave asked its platform to attest to.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AttestationUserData {
    #[prost(string, optional, tag = "1")]
    pub enclave_type: Option<String>,
    #[prost(string, optional, tag = "2")]
    pub time: Option<String>,
    #[prost(message, optional, tag = "3")]
    pub enclave_key: Option<KeyMessage>,
}

/// The body of a signed attestation report.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct VseAttestationReportInfo {
    #[prost(string, optional, tag = "1")]
    pub enclave_type: Option<String>,
    #[prost(bytes = "vec", optional, tag = "2")]
    pub verified_measurement: Option<Vec<u8>>,
    #[prost(string, optional, tag = "3")]
    pub not_before: Option<String>,
    #[prost(string, optional, tag = "4")]
    pub not_after: Option<String>,
    #[prost(bytes = "vec", optional, tag = "5")]
    pub user_data: Option<Vec<u8>>,
}

/// An attestation report together with the key that signed it.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SignedReport {
    #[prost(string, optional, tag = "1")]
    pub report_format: Option<String>,
    #[prost(bytes = "vec", optional, tag = "2")]
    pub report: Option<Vec<u8>>,
    #[prost(message, optional, tag = "3")]
    pub signing_key: Option<KeyMessage>,
    #[prost(string, optional, tag = "4")]
    pub signing_algorithm: Option<String>,
    #[prost(bytes = "vec", optional, tag = "5")]
    pub signature: Option<Vec<u8>>,
}

/// An SEV-SNP attestation: the raw hardware report plus the serialized
/// user data whose hash the report binds.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SevAttestationMessage {
    #[prost(bytes = "vec", optional, tag = "1")]
    pub what_was_said: Option<Vec<u8>>,
    #[prost(bytes = "vec", optional, tag = "2")]
    pub reported_attestation: Option<Vec<u8>>,
}

/// One piece of evidence; `serialized_evidence` is interpreted per
/// `evidence_type`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Evidence {
    #[prost(string, optional, tag = "1")]
    pub evidence_type: Option<String>,
    #[prost(bytes = "vec", optional, tag = "2")]
    pub serialized_evidence: Option<Vec<u8>>,
}

/// The ordered evidence bundle supporting a trust request.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct EvidencePackage {
    #[prost(string, optional, tag = "1")]
    pub prover_type: Option<String>,
    #[prost(message, repeated, tag = "2")]
    pub fact_assertion: Vec<Evidence>,
}

/// One inference: `(s1, s2) |- conclusion` via `rule_applied` in 1..=7.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProofStep {
    #[prost(message, optional, tag = "1")]
    pub s1: Option<VseClause>,
    #[prost(message, optional, tag = "2")]
    pub s2: Option<VseClause>,
    #[prost(message, optional, tag = "3")]
    pub conclusion: Option<VseClause>,
    #[prost(int32, optional, tag = "4")]
    pub rule_applied: Option<i32>,
}

/// A proposed derivation of `to_prove`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Proof {
    #[prost(message, optional, tag = "1")]
    pub to_prove: Option<VseClause>,
    #[prost(message, repeated, tag = "2")]
    pub steps: Vec<ProofStep>,
}

/// The append-only set of statements established so far.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProvedStatements {
    #[prost(message, repeated, tag = "1")]
    pub proved: Vec<VseClause>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TrustRequestMessage {
    #[prost(string, optional, tag = "1")]
    pub requesting_enclave_tag: Option<String>,
    #[prost(string, optional, tag = "2")]
    pub providing_enclave_tag: Option<String>,
    #[prost(string, optional, tag = "3")]
    pub submitted_evidence_type: Option<String>,
    #[prost(string, optional, tag = "4")]
    pub purpose: Option<String>,
    #[prost(message, optional, tag = "5")]
    pub support: Option<EvidencePackage>,
    #[prost(message, optional, tag = "6")]
    pub proof: Option<Proof>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TrustResponseMessage {
    #[prost(string, optional, tag = "1")]
    pub status: Option<String>,
    #[prost(string, optional, tag = "2")]
    pub requesting_enclave_tag: Option<String>,
    #[prost(string, optional, tag = "3")]
    pub providing_enclave_tag: Option<String>,
    #[prost(bytes = "vec", optional, tag = "4")]
    pub artifact: Option<Vec<u8>>,
}
