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

//! Attestation evidence evaluator and proof checker.
//!
//! Given a policy key, an assertion to prove, a bundle of cryptographic
//! evidence, and a proposed inference proof, the evaluator decides
//! whether the assertion is derivable from the evidence under seven
//! fixed inference rules rooted at the `policy_key is-trusted` axiom.
//! One evaluation is a pure function of its inputs plus the supplied
//! clock; every evaluation uses only request-local state, so one
//! evaluator may serve many concurrent requests.

pub mod certs;
pub mod claims;
pub mod dominance;
pub mod error;
pub mod evidence;
pub mod keys;
pub mod platform;
pub mod proof;
pub mod rules;
pub mod statements;
pub mod timepoint;

pub use error::VerifyError;
pub use platform::{DenyAllPlatformVerifier, PlatformVerdict, PlatformVerifier};

use certifier_proto::{Evidence, KeyMessage, Proof, TimePoint, VseClause};

/// Evaluate one trust request: build the proved set from the evidence
/// (seeded with the policy axiom), then replay the proof. Success means
/// `to_prove` was established; any failure is terminal and carries the
/// kind tag of its cause.
pub fn evaluate_trust(
    policy_key: &KeyMessage,
    to_prove: &VseClause,
    evidence: &[Evidence],
    proof: &Proof,
    platform: &dyn PlatformVerifier,
    now: &TimePoint,
) -> Result<(), VerifyError> {
    let mut proved = evidence::init_proved_statements(policy_key, evidence, platform, now)?;
    proof::verify_proof(to_prove, proof, &mut proved)
}
