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

//! Construction and structural equality of entities and VSE clauses.
//!
//! Key equality is defined by public parameters only (modulus and
//! exponent for RSA; curve name, base point, and public point for ECC).
//! Names, formats, and private material never participate, so a private
//! key and its public shadow compare equal only when their types match.

use certifier_proto::{EntityMessage, KeyMessage, PointMessage, RsaMessage, VseClause};

pub const ENTITY_KEY: &str = "key";
pub const ENTITY_MEASUREMENT: &str = "measurement";

pub const VERB_IS_TRUSTED: &str = "is-trusted";
pub const VERB_IS_TRUSTED_FOR_ATTESTATION: &str = "is-trusted-for-attestation";
pub const VERB_IS_TRUSTED_FOR_AUTHENTICATION: &str = "is-trusted-for-authentication";
pub const VERB_SAYS: &str = "says";
pub const VERB_SPEAKS_FOR: &str = "speaks-for";

pub const KEY_FORMAT_VSE: &str = "vse-key";

fn same_point(p1: &PointMessage, p2: &PointMessage) -> bool {
    match (&p1.x, &p1.y, &p2.x, &p2.y) {
        (Some(x1), Some(y1), Some(x2), Some(y2)) => x1 == x2 && y1 == y2,
        _ => false,
    }
}

/// Compare two keys by their public parameters.
pub fn same_key(k1: &KeyMessage, k2: &KeyMessage) -> bool {
    if k1.key_type != k2.key_type {
        return false;
    }
    let Some(key_type) = k1.key_type.as_deref() else {
        return false;
    };
    match key_type {
        "rsa-1024-public" | "rsa-1024-private" | "rsa-2048-public" | "rsa-2048-private"
        | "rsa-4096-public" | "rsa-4096-private" => {
            let (Some(r1), Some(r2)) = (&k1.rsa_key, &k2.rsa_key) else {
                return false;
            };
            r1.public_modulus == r2.public_modulus && r1.public_exponent == r2.public_exponent
        }
        "ecc-384-public" | "ecc-384-private" => {
            let (Some(e1), Some(e2)) = (&k1.ecc_key, &k2.ecc_key) else {
                return false;
            };
            if e1.curve_name.is_none() || e1.curve_name != e2.curve_name {
                return false;
            }
            let (Some(b1), Some(b2)) = (&e1.base_point, &e2.base_point) else {
                return false;
            };
            let (Some(p1), Some(p2)) = (&e1.public_point, &e2.public_point) else {
                return false;
            };
            same_point(b1, b2) && same_point(p1, p2)
        }
        _ => false,
    }
}

/// Compare entities: measurements byte-wise, keys via [`same_key`].
pub fn same_entity(e1: &EntityMessage, e2: &EntityMessage) -> bool {
    if e1.entity_type != e2.entity_type {
        return false;
    }
    match e1.entity_type.as_deref() {
        Some(ENTITY_MEASUREMENT) => e1.measurement == e2.measurement,
        Some(ENTITY_KEY) => match (&e1.key, &e2.key) {
            (Some(k1), Some(k2)) => same_key(k1, k2),
            _ => false,
        },
        _ => false,
    }
}

/// Recursive structural clause equality. Absent object/clause fields are
/// distinguished from present ones; both sides must have the same shape.
pub fn same_vse_clause(c1: &VseClause, c2: &VseClause) -> bool {
    let (Some(s1), Some(s2)) = (&c1.subject, &c2.subject) else {
        return false;
    };
    if !same_entity(s1, s2) {
        return false;
    }
    if c1.verb != c2.verb {
        return false;
    }
    match (&c1.object, &c2.object) {
        (Some(o1), Some(o2)) => {
            if !same_entity(o1, o2) {
                return false;
            }
        }
        (None, None) => {}
        _ => return false,
    }
    match (&c1.clause, &c2.clause) {
        (Some(n1), Some(n2)) => same_vse_clause(n1, n2),
        (None, None) => true,
        _ => false,
    }
}

pub fn key_entity(key: KeyMessage) -> EntityMessage {
    EntityMessage {
        entity_type: Some(ENTITY_KEY.to_string()),
        key: Some(key),
        measurement: None,
    }
}

pub fn measurement_entity(measurement: Vec<u8>) -> EntityMessage {
    EntityMessage {
        entity_type: Some(ENTITY_MEASUREMENT.to_string()),
        key: None,
        measurement: Some(measurement),
    }
}

/// `Subject verb`, e.g. `K is-trusted`.
pub fn unary_clause(subject: EntityMessage, verb: &str) -> VseClause {
    VseClause {
        subject: Some(subject),
        verb: Some(verb.to_string()),
        object: None,
        clause: None,
    }
}

/// `Subject verb Object`, e.g. `K speaks-for M`.
pub fn simple_clause(subject: EntityMessage, verb: &str, object: EntityMessage) -> VseClause {
    VseClause {
        subject: Some(subject),
        verb: Some(verb.to_string()),
        object: Some(object),
        clause: None,
    }
}

/// `Subject says Clause`.
pub fn indirect_clause(subject: EntityMessage, verb: &str, clause: VseClause) -> VseClause {
    VseClause {
        subject: Some(subject),
        verb: Some(verb.to_string()),
        object: None,
        clause: Some(Box::new(clause)),
    }
}

/// Derive the public shadow of an RSA private key, preserving name,
/// format, certificate, and validity.
pub fn internal_public_from_private(private_key: &KeyMessage) -> Option<KeyMessage> {
    let public_type = match private_key.key_type.as_deref() {
        Some("rsa-1024-private") => "rsa-1024-public",
        Some("rsa-2048-private") => "rsa-2048-public",
        Some("rsa-4096-private") => "rsa-4096-public",
        _ => return None,
    };
    let rsa = private_key.rsa_key.as_ref()?;
    Some(KeyMessage {
        key_name: private_key.key_name.clone(),
        key_type: Some(public_type.to_string()),
        key_format: private_key.key_format.clone(),
        rsa_key: Some(RsaMessage {
            public_modulus: rsa.public_modulus.clone(),
            public_exponent: rsa.public_exponent.clone(),
            ..Default::default()
        }),
        ecc_key: None,
        secret_key_bits: None,
        certificate: private_key.certificate.clone(),
        not_before: private_key.not_before.clone(),
        not_after: private_key.not_after.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rsa_key(name: &str, key_type: &str, modulus: &[u8]) -> KeyMessage {
        KeyMessage {
            key_name: Some(name.to_string()),
            key_type: Some(key_type.to_string()),
            key_format: Some(KEY_FORMAT_VSE.to_string()),
            rsa_key: Some(RsaMessage {
                public_modulus: Some(modulus.to_vec()),
                public_exponent: Some(vec![0x01, 0x00, 0x01]),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn same_key_ignores_name_and_private_parts() {
        let mut k1 = rsa_key("alpha", "rsa-2048-public", &[1, 2, 3]);
        let k2 = rsa_key("beta", "rsa-2048-public", &[1, 2, 3]);
        assert!(same_key(&k1, &k2));

        if let Some(rsa) = k1.rsa_key.as_mut() {
            rsa.private_exponent = Some(vec![9, 9, 9]);
        }
        assert!(same_key(&k1, &k2));
    }

    #[test]
    fn same_key_distinguishes_type_and_modulus() {
        let k1 = rsa_key("a", "rsa-2048-public", &[1, 2, 3]);
        let k2 = rsa_key("a", "rsa-2048-private", &[1, 2, 3]);
        let k3 = rsa_key("a", "rsa-2048-public", &[1, 2, 4]);
        assert!(!same_key(&k1, &k2));
        assert!(!same_key(&k1, &k3));
    }

    #[test]
    fn same_entity_by_kind() {
        let m1 = measurement_entity(vec![0u8; 32]);
        let m2 = measurement_entity(vec![0u8; 32]);
        let m3 = measurement_entity(vec![1u8; 32]);
        assert!(same_entity(&m1, &m2));
        assert!(!same_entity(&m1, &m3));

        let k = key_entity(rsa_key("a", "rsa-2048-public", &[1, 2, 3]));
        assert!(!same_entity(&m1, &k));
    }

    #[test]
    fn clause_equality_is_structural_and_recursive() {
        let key = rsa_key("policy", "rsa-2048-public", &[5, 6, 7]);
        let inner = unary_clause(key_entity(key.clone()), VERB_IS_TRUSTED);
        let c1 = indirect_clause(key_entity(key.clone()), VERB_SAYS, inner.clone());
        let c2 = indirect_clause(key_entity(key.clone()), VERB_SAYS, inner.clone());
        assert!(same_vse_clause(&c1, &c2));
        assert!(same_vse_clause(&c2, &c1));
        assert!(same_vse_clause(&c1, &c1));

        // Differing shape: unary versus indirect.
        let c3 = unary_clause(key_entity(key.clone()), VERB_SAYS);
        assert!(!same_vse_clause(&c1, &c3));

        // Differing inner verb.
        let other_inner =
            unary_clause(key_entity(key.clone()), VERB_IS_TRUSTED_FOR_ATTESTATION);
        let c4 = indirect_clause(key_entity(key), VERB_SAYS, other_inner);
        assert!(!same_vse_clause(&c1, &c4));
    }

    #[test]
    fn empty_object_differs_from_present_object() {
        let key = rsa_key("k", "rsa-2048-public", &[8]);
        let unary = unary_clause(key_entity(key.clone()), VERB_SPEAKS_FOR);
        let simple = simple_clause(
            key_entity(key),
            VERB_SPEAKS_FOR,
            measurement_entity(vec![]),
        );
        assert!(!same_vse_clause(&unary, &simple));
        assert!(same_vse_clause(&simple, &simple));
    }

    #[test]
    fn public_shadow_of_private_key() {
        let mut private = rsa_key("signer", "rsa-2048-private", &[1, 2, 3]);
        if let Some(rsa) = private.rsa_key.as_mut() {
            rsa.private_exponent = Some(vec![7, 7, 7]);
        }
        let public = internal_public_from_private(&private).unwrap();
        assert_eq!(public.key_type.as_deref(), Some("rsa-2048-public"));
        assert_eq!(public.key_name.as_deref(), Some("signer"));
        assert!(public
            .rsa_key
            .as_ref()
            .unwrap()
            .private_exponent
            .is_none());

        let ecc = KeyMessage {
            key_type: Some("ecc-384-private".to_string()),
            ..Default::default()
        };
        assert!(internal_public_from_private(&ecc).is_none());
    }
}
