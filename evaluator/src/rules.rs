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

//! The seven inference rules.
//!
//! Each rule is a pure predicate over `(s1, s2, conclusion)` that
//! enforces the exact shape of its inputs (presence of subject, verb,
//! object, and nested clause, and the entity kinds) and rejects any
//! triple that does not match. Predicate dominance enters only where a
//! rule says so.
//!
//! R1: measurement is-trusted and K speaks-for measurement imply
//!     K is-trusted-for-authentication.
//! R2: K2 speaks-for K1 and K3 speaks-for K2 imply K3 speaks-for K1.
//! R3: K is-trusted and K says X imply X.
//! R4: K2 speaks-for K1 and K1 is-trusted imply K2 is-trusted.
//! R5: K1 is-trusted-X and K1 says (K2 is-trusted-Y) imply
//!     K2 is-trusted-Y, provided is-trusted dominates X and X
//!     dominates Y.
//! R6: K1 is-trusted-X and K1 says (K2 speaks-for M) imply
//!     K2 speaks-for M, provided is-trusted dominates X and X dominates
//!     is-trusted-for-attestation.
//! R7: measurement is-trusted and K speaks-for measurement imply
//!     K is-trusted-for-attestation.

use crate::dominance::DominanceTree;
use crate::statements::{
    same_entity, same_vse_clause, ENTITY_KEY, ENTITY_MEASUREMENT, VERB_IS_TRUSTED,
    VERB_IS_TRUSTED_FOR_ATTESTATION, VERB_IS_TRUSTED_FOR_AUTHENTICATION, VERB_SAYS,
    VERB_SPEAKS_FOR,
};
use certifier_proto::{EntityMessage, VseClause};

fn entity_is(entity: &Option<EntityMessage>, kind: &str) -> bool {
    entity
        .as_ref()
        .is_some_and(|e| e.entity_type.as_deref() == Some(kind))
}

// Measurement-to-trust rules R1 and R7 differ only in the concluded
// predicate.
fn measurement_lift(c1: &VseClause, c2: &VseClause, c: &VseClause, concluded_verb: &str) -> bool {
    // c1: M is-trusted
    if c1.subject.is_none() || c1.object.is_some() || c1.clause.is_some() {
        return false;
    }
    if c1.verb.as_deref() != Some(VERB_IS_TRUSTED) {
        return false;
    }
    if !entity_is(&c1.subject, ENTITY_MEASUREMENT) {
        return false;
    }

    // c2: K speaks-for M
    let (Some(subject), Some(object)) = (&c2.subject, &c2.object) else {
        return false;
    };
    if c2.clause.is_some() || c2.verb.as_deref() != Some(VERB_SPEAKS_FOR) {
        return false;
    }
    let Some(measurement) = &c1.subject else {
        return false;
    };
    if !same_entity(measurement, object) {
        return false;
    }

    // c: K <concluded_verb>
    let Some(concluded_subject) = &c.subject else {
        return false;
    };
    if c.object.is_some() || c.clause.is_some() {
        return false;
    }
    if c.verb.as_deref() != Some(concluded_verb) {
        return false;
    }
    same_entity(concluded_subject, subject)
}

pub fn verify_rule_1(
    _tree: &DominanceTree,
    c1: &VseClause,
    c2: &VseClause,
    c: &VseClause,
) -> bool {
    measurement_lift(c1, c2, c, VERB_IS_TRUSTED_FOR_AUTHENTICATION)
}

pub fn verify_rule_2(
    _tree: &DominanceTree,
    c1: &VseClause,
    c2: &VseClause,
    c: &VseClause,
) -> bool {
    // c1: K2 speaks-for K1
    let (Some(k2), Some(k1)) = (&c1.subject, &c1.object) else {
        return false;
    };
    if c1.clause.is_some() || c1.verb.as_deref() != Some(VERB_SPEAKS_FOR) {
        return false;
    }
    if !entity_is(&c1.subject, ENTITY_KEY) || !entity_is(&c1.object, ENTITY_KEY) {
        return false;
    }

    // c2: K3 speaks-for K2
    let (Some(k3), Some(k2_again)) = (&c2.subject, &c2.object) else {
        return false;
    };
    if c2.clause.is_some() || c2.verb.as_deref() != Some(VERB_SPEAKS_FOR) {
        return false;
    }
    if !entity_is(&c2.subject, ENTITY_KEY) || !same_entity(k2_again, k2) {
        return false;
    }

    // c: K3 speaks-for K1
    let (Some(concluded_subject), Some(concluded_object)) = (&c.subject, &c.object) else {
        return false;
    };
    if c.clause.is_some() || c.verb.as_deref() != Some(VERB_SPEAKS_FOR) {
        return false;
    }
    same_entity(concluded_subject, k3) && same_entity(concluded_object, k1)
}

pub fn verify_rule_3(
    _tree: &DominanceTree,
    c1: &VseClause,
    c2: &VseClause,
    c: &VseClause,
) -> bool {
    // c1: K is-trusted
    if c1.subject.is_none() || c1.object.is_some() || c1.clause.is_some() {
        return false;
    }
    if c1.verb.as_deref() != Some(VERB_IS_TRUSTED) {
        return false;
    }
    if !entity_is(&c1.subject, ENTITY_KEY) {
        return false;
    }

    // c2: K says X
    let (Some(speaker), Some(statement)) = (&c2.subject, &c2.clause) else {
        return false;
    };
    if c2.object.is_some() || c2.verb.as_deref() != Some(VERB_SAYS) {
        return false;
    }
    if !entity_is(&c2.subject, ENTITY_KEY) {
        return false;
    }
    let Some(trusted) = &c1.subject else {
        return false;
    };
    if !same_entity(trusted, speaker) {
        return false;
    }

    // c: X
    same_vse_clause(statement, c)
}

pub fn verify_rule_4(
    _tree: &DominanceTree,
    c1: &VseClause,
    c2: &VseClause,
    c: &VseClause,
) -> bool {
    // c1: K2 speaks-for K1
    let (Some(k2), Some(k1)) = (&c1.subject, &c1.object) else {
        return false;
    };
    if c1.clause.is_some() || c1.verb.as_deref() != Some(VERB_SPEAKS_FOR) {
        return false;
    }
    if !entity_is(&c1.subject, ENTITY_KEY) || !entity_is(&c1.object, ENTITY_KEY) {
        return false;
    }

    // c2: K1 is-trusted
    let Some(trusted) = &c2.subject else {
        return false;
    };
    if c2.object.is_some() || c2.clause.is_some() {
        return false;
    }
    if c2.verb.as_deref() != Some(VERB_IS_TRUSTED) {
        return false;
    }
    if !same_entity(trusted, k1) {
        return false;
    }

    // c: K2 is-trusted
    let Some(concluded_subject) = &c.subject else {
        return false;
    };
    if c.object.is_some() || c.clause.is_some() {
        return false;
    }
    if c.verb.as_deref() != Some(VERB_IS_TRUSTED) {
        return false;
    }
    same_entity(concluded_subject, k2)
}

pub fn verify_rule_5(
    tree: &DominanceTree,
    c1: &VseClause,
    c2: &VseClause,
    c: &VseClause,
) -> bool {
    // c1: K1 is-trusted-X
    let Some(c1_verb) = c1.verb.as_deref() else {
        return false;
    };
    if c1.subject.is_none() || c1.object.is_some() || c1.clause.is_some() {
        return false;
    }
    if !tree.dominates(VERB_IS_TRUSTED, c1_verb) {
        return false;
    }
    if !entity_is(&c1.subject, ENTITY_KEY) {
        return false;
    }

    // c2: K1 says (K2 is-trusted-Y)
    let (Some(speaker), Some(inner)) = (&c2.subject, &c2.clause) else {
        return false;
    };
    if c2.object.is_some() || c2.verb.as_deref() != Some(VERB_SAYS) {
        return false;
    }
    if !entity_is(&c2.subject, ENTITY_KEY) {
        return false;
    }

    let Some(inner_verb) = inner.verb.as_deref() else {
        return false;
    };
    if inner.subject.is_none() || inner.object.is_some() {
        return false;
    }
    if !tree.dominates(c1_verb, inner_verb) {
        return false;
    }
    if !entity_is(&inner.subject, ENTITY_KEY) {
        return false;
    }
    let Some(trusted) = &c1.subject else {
        return false;
    };
    if !same_entity(trusted, speaker) {
        return false;
    }

    // c: K2 is-trusted-Y
    same_vse_clause(inner, c)
}

pub fn verify_rule_6(
    tree: &DominanceTree,
    c1: &VseClause,
    c2: &VseClause,
    c: &VseClause,
) -> bool {
    // c1: K1 is-trusted-X
    let Some(c1_verb) = c1.verb.as_deref() else {
        return false;
    };
    if c1.subject.is_none() || c1.object.is_some() || c1.clause.is_some() {
        return false;
    }
    if !tree.dominates(VERB_IS_TRUSTED, c1_verb) {
        return false;
    }
    if !entity_is(&c1.subject, ENTITY_KEY) {
        return false;
    }

    // c2: K1 says (K2 speaks-for M)
    let (Some(speaker), Some(inner)) = (&c2.subject, &c2.clause) else {
        return false;
    };
    if c2.object.is_some() || c2.verb.as_deref() != Some(VERB_SAYS) {
        return false;
    }
    if !entity_is(&c2.subject, ENTITY_KEY) {
        return false;
    }
    let Some(trusted) = &c1.subject else {
        return false;
    };
    if !same_entity(trusted, speaker) {
        return false;
    }

    if inner.subject.is_none() || inner.object.is_none() || inner.clause.is_some() {
        return false;
    }
    if inner.verb.as_deref() != Some(VERB_SPEAKS_FOR) {
        return false;
    }
    if !entity_is(&inner.subject, ENTITY_KEY) || !entity_is(&inner.object, ENTITY_MEASUREMENT) {
        return false;
    }
    if !tree.dominates(c1_verb, VERB_IS_TRUSTED_FOR_ATTESTATION) {
        return false;
    }

    // c: K2 speaks-for M
    same_vse_clause(inner, c)
}

pub fn verify_rule_7(
    _tree: &DominanceTree,
    c1: &VseClause,
    c2: &VseClause,
    c: &VseClause,
) -> bool {
    measurement_lift(c1, c2, c, VERB_IS_TRUSTED_FOR_ATTESTATION)
}

/// Validate one proposed step `(s1, s2) |- conclusion` under the given
/// rule number. Unknown rule numbers validate nothing.
pub fn apply_rule(
    tree: &DominanceTree,
    rule: i32,
    s1: &VseClause,
    s2: &VseClause,
    conclusion: &VseClause,
) -> bool {
    match rule {
        1 => verify_rule_1(tree, s1, s2, conclusion),
        2 => verify_rule_2(tree, s1, s2, conclusion),
        3 => verify_rule_3(tree, s1, s2, conclusion),
        4 => verify_rule_4(tree, s1, s2, conclusion),
        5 => verify_rule_5(tree, s1, s2, conclusion),
        6 => verify_rule_6(tree, s1, s2, conclusion),
        7 => verify_rule_7(tree, s1, s2, conclusion),
        _ => false,
    }
}
