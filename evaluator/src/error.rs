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

use thiserror::Error;

/// Terminal failures of one evaluation. Every kind aborts the evaluation;
/// there is no partial success.
#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("Malformed evidence: {0}")]
    MalformedEvidence(String),
    #[error("Signature verification failed: {0}")]
    SignatureInvalid(String),
    #[error("Current time is outside the validity window")]
    TimeOutOfRange,
    #[error("Unknown evidence type: {0}")]
    UnknownEvidenceType(String),
    #[error("Proof step does not follow from its premises")]
    InvalidProofStep,
    #[error("Proof completed without establishing the goal")]
    GoalNotProved,
    #[error("Crypto failure: {0}")]
    CryptoFailure(String),
}

impl VerifyError {
    /// Stable tag for logs and response tokens.
    pub fn kind(&self) -> &'static str {
        match self {
            VerifyError::MalformedEvidence(_) => "malformed-evidence",
            VerifyError::SignatureInvalid(_) => "signature-invalid",
            VerifyError::TimeOutOfRange => "time-out-of-range",
            VerifyError::UnknownEvidenceType(_) => "unknown-evidence-type",
            VerifyError::InvalidProofStep => "invalid-proof-step",
            VerifyError::GoalNotProved => "goal-not-proved",
            VerifyError::CryptoFailure(_) => "crypto-failure",
        }
    }
}

impl From<certifier_crypto::CryptoError> for VerifyError {
    fn from(err: certifier_crypto::CryptoError) -> Self {
        VerifyError::CryptoFailure(err.to_string())
    }
}

impl From<openssl::error::ErrorStack> for VerifyError {
    fn from(err: openssl::error::ErrorStack) -> Self {
        VerifyError::CryptoFailure(err.to_string())
    }
}
