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

//! Trust-request handling: decode a request, run the evaluator, encode
//! the verdict.

use certifier_evaluator::{evaluate_trust, timepoint, PlatformVerifier, VerifyError};
use certifier_proto::{KeyMessage, TrustRequestMessage, TrustResponseMessage};
use prost::Message;
use std::sync::Arc;

pub const STATUS_SUCCEEDED: &str = "succeeded";
pub const STATUS_FAILED: &str = "failed";

/// One certifier instance: the policy key plus the platform verifier
/// collaborator. Stateless across requests; share one instance between
/// connections.
pub struct CertifierService {
    policy_key: KeyMessage,
    platform_verifier: Arc<dyn PlatformVerifier>,
}

impl CertifierService {
    pub fn new(policy_key: KeyMessage, platform_verifier: Arc<dyn PlatformVerifier>) -> Self {
        Self {
            policy_key,
            platform_verifier,
        }
    }

    /// Process one serialized `TrustRequestMessage` and return the
    /// serialized `TrustResponseMessage`. Evaluation failures become a
    /// failed response, not an error; only an undecodable request is an
    /// error.
    pub fn certify(&self, request: &[u8]) -> anyhow::Result<Vec<u8>> {
        let request = TrustRequestMessage::decode(request)
            .map_err(|_| anyhow::anyhow!("Failed to decode (serialize) TrustRequestMessage."))?;
        let response = self.certify_internal(&request);
        Ok(response.encode_to_vec())
    }

    fn certify_internal(&self, request: &TrustRequestMessage) -> TrustResponseMessage {
        let status = match self.evaluate(request) {
            Ok(()) => STATUS_SUCCEEDED.to_string(),
            Err(err) => {
                log::warn!(
                    "certification for {:?} failed: {} ({})",
                    request.requesting_enclave_tag.as_deref().unwrap_or(""),
                    err,
                    err.kind()
                );
                STATUS_FAILED.to_string()
            }
        };
        TrustResponseMessage {
            status: Some(status),
            requesting_enclave_tag: request.requesting_enclave_tag.clone(),
            providing_enclave_tag: request.providing_enclave_tag.clone(),
            // Admission-certificate issuance is out of scope; successful
            // responses carry no artifact.
            artifact: None,
        }
    }

    fn evaluate(&self, request: &TrustRequestMessage) -> Result<(), VerifyError> {
        let support = request.support.as_ref().ok_or_else(|| {
            VerifyError::MalformedEvidence("request carries no evidence package".to_string())
        })?;
        let proof = request.proof.as_ref().ok_or_else(|| {
            VerifyError::MalformedEvidence("request carries no proof".to_string())
        })?;
        let to_prove = proof.to_prove.as_ref().ok_or_else(|| {
            VerifyError::MalformedEvidence("proof names no goal".to_string())
        })?;
        let now = timepoint::now();
        evaluate_trust(
            &self.policy_key,
            to_prove,
            &support.fact_assertion,
            proof,
            self.platform_verifier.as_ref(),
            &now,
        )
    }
}
