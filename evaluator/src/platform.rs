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

use crate::error::VerifyError;

/// What a platform verification library vouches for after checking a
/// hardware attestation report.
pub struct PlatformVerdict {
    /// The serialized user data the enclave bound into the report.
    pub user_data: Vec<u8>,
    /// The verified enclave measurement.
    pub measurement: Vec<u8>,
}

/// Trait to verify hardware attestation reports that need an external
/// verification library (e.g. Open Enclave host verification).
/// `endorsements` is the PEM certificate chain that accompanied the
/// report in the evidence list. Implementations must be reentrant; one
/// instance may serve many concurrent evaluations.
pub trait PlatformVerifier: Sync + Send {
    fn verify(&self, evidence: &[u8], endorsements: &[u8])
        -> Result<PlatformVerdict, VerifyError>;
}

/// Stand-in used when no platform verification library is linked.
pub struct DenyAllPlatformVerifier;

impl PlatformVerifier for DenyAllPlatformVerifier {
    fn verify(
        &self,
        _evidence: &[u8],
        _endorsements: &[u8],
    ) -> Result<PlatformVerdict, VerifyError> {
        Err(VerifyError::SignatureInvalid(
            "no platform verification library is linked".to_string(),
        ))
    }
}
