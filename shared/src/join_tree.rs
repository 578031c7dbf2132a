/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Equi-join predicate `left.left_key = right.right_key`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JoinEdge {
    pub left: String,
    pub right: String,
    pub left_key: String,
    pub right_key: String,
}

impl JoinEdge {
    pub fn new(
        left: impl Into<String>,
        right: impl Into<String>,
        left_key: impl Into<String>,
        right_key: impl Into<String>,
    ) -> Self {
        JoinEdge {
            left: left.into(),
            right: right.into(),
            left_key: left_key.into(),
            right_key: right_key.into(),
        }
    }

    /// The same predicate with the operands swapped.
    pub fn reversed(&self) -> Self {
        JoinEdge {
            left: self.right.clone(),
            right: self.left.clone(),
            left_key: self.right_key.clone(),
            right_key: self.left_key.clone(),
        }
    }

    pub fn touches(&self, relation: &str) -> bool {
        self.left == relation || self.right == relation
    }

    pub fn shares_relation_with(&self, other: &JoinEdge) -> bool {
        self.touches(&other.left) || self.touches(&other.right)
    }
}

impl fmt::Display for JoinEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{} = {}.{}",
            self.left, self.left_key, self.right, self.right_key
        )
    }
}

/// Ordered sequence of join edges.
///
/// The graph it describes is expected to be a tree over the query's
/// relations; nothing here enforces that.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JoinTree {
    pub edges: Vec<JoinEdge>,
}

impl JoinTree {
    pub fn new(edges: Vec<JoinEdge>) -> Self {
        JoinTree { edges }
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, JoinEdge> {
        self.edges.iter()
    }

    /// Relations referenced by any edge, in name order.
    pub fn relations(&self) -> BTreeSet<&str> {
        self.edges
            .iter()
            .flat_map(|e| [e.left.as_str(), e.right.as_str()])
            .collect()
    }
}

impl From<Vec<JoinEdge>> for JoinTree {
    fn from(edges: Vec<JoinEdge>) -> Self {
        JoinTree::new(edges)
    }
}

impl<'a> IntoIterator for &'a JoinTree {
    type Item = &'a JoinEdge;
    type IntoIter = std::slice::Iter<'a, JoinEdge>;

    fn into_iter(self) -> Self::IntoIter {
        self.edges.iter()
    }
}

impl fmt::Display for JoinTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.edges.iter().map(|e| e.to_string()).collect();
        write!(f, "[{}]", parts.join(", "))
    }
}
