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

//! The proof checker: replay a proposed derivation against the proved
//! set.

use crate::dominance::DominanceTree;
use crate::error::VerifyError;
use crate::rules::apply_rule;
use crate::statements::same_vse_clause;
use certifier_proto::{Proof, VseClause};

pub fn statement_already_proved(clause: &VseClause, proved: &[VseClause]) -> bool {
    proved.iter().any(|p| same_vse_clause(clause, p))
}

/// Walk the proof steps in order against the already-seeded proved set.
///
/// A step whose premises are not both proved yet is skipped, not
/// failed; partially redundant proof scripts are tolerated. A step
/// whose premises are proved but whose rule application does not hold
/// aborts the proof. Success is reaching `to_prove`, either because the
/// evidence pipeline already established it or because a validated step
/// concluded it.
pub fn verify_proof(
    to_prove: &VseClause,
    proof: &Proof,
    proved: &mut Vec<VseClause>,
) -> Result<(), VerifyError> {
    let tree = DominanceTree::new();

    if statement_already_proved(to_prove, proved) {
        return Ok(());
    }
    for (index, step) in proof.steps.iter().enumerate() {
        let (Some(s1), Some(s2), Some(conclusion), Some(rule)) =
            (&step.s1, &step.s2, &step.conclusion, step.rule_applied)
        else {
            return Err(VerifyError::InvalidProofStep);
        };
        if !statement_already_proved(s1, proved) {
            log::debug!("skipping step {index}: first premise is not proved");
            continue;
        }
        if !statement_already_proved(s2, proved) {
            log::debug!("skipping step {index}: second premise is not proved");
            continue;
        }
        if !apply_rule(&tree, rule, s1, s2, conclusion) {
            log::debug!("step {index} does not follow by rule {rule}");
            return Err(VerifyError::InvalidProofStep);
        }
        proved.push(conclusion.clone());
        if same_vse_clause(to_prove, conclusion) {
            return Ok(());
        }
    }
    Err(VerifyError::GoalNotProved)
}
