/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Traversal order of the join graph for the reduction and join phases.
//!
//! `RootedTree` roots the join graph at the left relation of the first edge
//! and walks it breadth-first, so the bottom-up pass really runs leaf to root
//! and the top-down pass root to leaf whatever order the edges were listed
//! in. `EdgeSequence` treats the edge list itself as the traversal, which is
//! only a genuine tree walk when the list happens to be in that order.

use crate::custom_error::{Result, YannakakisError};
use serde::{Deserialize, Serialize};
use shared::join_tree::{JoinEdge, JoinTree};
use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraversalMode {
    #[default]
    RootedTree,
    EdgeSequence,
}

impl FromStr for TraversalMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "rooted-tree" | "tree" => Ok(TraversalMode::RootedTree),
            "edge-sequence" | "sequence" => Ok(TraversalMode::EdgeSequence),
            other => Err(format!("unknown traversal mode '{}'", other)),
        }
    }
}

impl fmt::Display for TraversalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraversalMode::RootedTree => write!(f, "rooted-tree"),
            TraversalMode::EdgeSequence => write!(f, "edge-sequence"),
        }
    }
}

/// A join edge oriented from parent to child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEdge {
    pub parent: String,
    pub child: String,
    pub parent_key: String,
    pub child_key: String,
    /// The edge as it was written in the join tree.
    pub source: JoinEdge,
}

impl TreeEdge {
    fn oriented(edge: &JoinEdge, parent: &str) -> Self {
        let e = if edge.left == parent {
            edge.clone()
        } else {
            edge.reversed()
        };
        TreeEdge {
            parent: e.left,
            child: e.right,
            parent_key: e.left_key,
            child_key: e.right_key,
            source: edge.clone(),
        }
    }

    /// The edge with the parent as left operand.
    pub fn as_join_edge(&self) -> JoinEdge {
        JoinEdge::new(
            self.parent.clone(),
            self.child.clone(),
            self.parent_key.clone(),
            self.child_key.clone(),
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct JoinTraversal {
    pub mode: TraversalMode,
    pub root: Option<String>,
    /// Parent before child.
    pub tree_edges: Vec<TreeEdge>,
    /// Edges closing a cycle in the join graph.
    pub residual_edges: Vec<JoinEdge>,
}

impl JoinTraversal {
    pub fn for_mode(mode: TraversalMode, join_tree: &JoinTree) -> Result<Self> {
        match mode {
            TraversalMode::RootedTree => Self::rooted(join_tree),
            TraversalMode::EdgeSequence => Ok(Self::sequence(join_tree)),
        }
    }

    /// Breadth-first spanning tree rooted at the first edge's left relation.
    ///
    /// Neighbours are visited in edge-list order. Fails when some edge is
    /// not reachable from the root.
    pub fn rooted(join_tree: &JoinTree) -> Result<Self> {
        let edges = &join_tree.edges;
        let Some(first) = edges.first() else {
            return Ok(JoinTraversal::default());
        };

        let root = first.left.clone();
        let mut visited: HashSet<&str> = HashSet::from([root.as_str()]);
        let mut used = vec![false; edges.len()];
        let mut queue: VecDeque<&str> = VecDeque::from([root.as_str()]);
        let mut tree_edges = Vec::new();
        let mut residual_edges = Vec::new();

        while let Some(node) = queue.pop_front() {
            for (idx, edge) in edges.iter().enumerate() {
                if used[idx] || !edge.touches(node) {
                    continue;
                }
                used[idx] = true;
                let other = if edge.left == node {
                    edge.right.as_str()
                } else {
                    edge.left.as_str()
                };
                if visited.insert(other) {
                    tree_edges.push(TreeEdge::oriented(edge, node));
                    queue.push_back(other);
                } else {
                    residual_edges.push(edge.clone());
                }
            }
        }

        if let Some(idx) = used.iter().position(|u| !u) {
            return Err(YannakakisError::Configuration(format!(
                "join graph is disconnected: edge {} is not reachable from '{}'",
                edges[idx], root
            )));
        }

        Ok(JoinTraversal {
            mode: TraversalMode::RootedTree,
            root: Some(root),
            tree_edges,
            residual_edges,
        })
    }

    /// The edge list taken as the traversal: left is parent, right is child.
    pub fn sequence(join_tree: &JoinTree) -> Self {
        JoinTraversal {
            mode: TraversalMode::EdgeSequence,
            root: join_tree.edges.first().map(|e| e.left.clone()),
            tree_edges: join_tree
                .iter()
                .map(|e| TreeEdge::oriented(e, &e.left))
                .collect(),
            residual_edges: Vec::new(),
        }
    }

    /// Children before parents.
    pub fn bottom_up(&self) -> impl Iterator<Item = &TreeEdge> {
        self.tree_edges.iter().rev()
    }

    /// Parents before children.
    pub fn top_down(&self) -> impl Iterator<Item = &TreeEdge> {
        self.tree_edges.iter()
    }

    /// Join edges in the order the join phase consumes them.
    pub fn join_edges(&self) -> Vec<JoinEdge> {
        self.tree_edges.iter().map(TreeEdge::as_join_edge).collect()
    }
}
