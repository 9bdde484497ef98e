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

//! Partial order over trust predicates.
//!
//! A rooted tree where an edge `p -> q` means anyone trusted under `p`
//! is at least as trusted as under `q`. Acyclic by construction: nodes
//! are only ever added as fresh leaves. The tree is read-only during
//! proof checking.

use crate::statements::{
    VERB_IS_TRUSTED, VERB_IS_TRUSTED_FOR_ATTESTATION, VERB_IS_TRUSTED_FOR_AUTHENTICATION,
};

struct Node {
    predicate: String,
    children: Vec<Node>,
}

impl Node {
    fn leaf(predicate: &str) -> Self {
        Node {
            predicate: predicate.to_string(),
            children: Vec::new(),
        }
    }
}

pub struct DominanceTree {
    root: Node,
}

impl DominanceTree {
    /// The default tree:
    /// `is-trusted -> {is-trusted-for-attestation, is-trusted-for-authentication}`.
    pub fn new() -> Self {
        DominanceTree {
            root: Node {
                predicate: VERB_IS_TRUSTED.to_string(),
                children: vec![
                    Node::leaf(VERB_IS_TRUSTED_FOR_ATTESTATION),
                    Node::leaf(VERB_IS_TRUSTED_FOR_AUTHENTICATION),
                ],
            },
        }
    }

    /// Add `descendant` as a child of `parent`. Returns false when
    /// `parent` is not in the tree.
    pub fn insert(&mut self, parent: &str, descendant: &str) -> bool {
        insert_under(&mut self.root, parent, descendant)
    }

    /// True iff `parent == descendant` or `descendant` lies in the
    /// subtree rooted at `parent`.
    pub fn dominates(&self, parent: &str, descendant: &str) -> bool {
        if parent == descendant {
            return true;
        }
        match find(&self.root, parent) {
            Some(node) => subtree_contains(node, descendant),
            None => false,
        }
    }
}

impl Default for DominanceTree {
    fn default() -> Self {
        Self::new()
    }
}

fn insert_under(node: &mut Node, parent: &str, descendant: &str) -> bool {
    if node.predicate == parent {
        node.children.push(Node::leaf(descendant));
        return true;
    }
    node.children
        .iter_mut()
        .any(|child| insert_under(child, parent, descendant))
}

fn find<'a>(node: &'a Node, predicate: &str) -> Option<&'a Node> {
    if node.predicate == predicate {
        return Some(node);
    }
    node.children.iter().find_map(|child| find(child, predicate))
}

fn subtree_contains(node: &Node, predicate: &str) -> bool {
    if node.predicate == predicate {
        return true;
    }
    node.children
        .iter()
        .any(|child| subtree_contains(child, predicate))
}
