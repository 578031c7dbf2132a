/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::custom_error::{require_attribute, Result, YannakakisError};
use crate::observer::{EngineEvent, EngineObserver};
use crate::traversal::JoinTraversal;
use shared::join_tree::JoinEdge;
use shared::relation::{Relation, RelationSet};
use shared::value::Value;
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pass {
    BottomUp,
    TopDown,
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pass::BottomUp => write!(f, "BOTTOM UP"),
            Pass::TopDown => write!(f, "TOP DOWN"),
        }
    }
}

/// One semi-join applied during a pass.
///
/// `edge.left` is the relation that was filtered, `edge.right` the one
/// it was filtered against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReductionStep {
    pub pass: Pass,
    pub edge: JoinEdge,
    pub before: usize,
    pub after: usize,
}

impl ReductionStep {
    /// Dangling tuples removed by this step
    pub fn removed(&self) -> usize {
        self.before - self.after
    }
}

/// Distinct non-missing values of `key` in `relation`.
pub fn key_set<'a>(relation: &'a Relation, key: &str) -> Result<HashSet<&'a Value>> {
    require_attribute(relation, key)?;
    let mut keys = HashSet::with_capacity(relation.len());
    for tuple in &relation.tuples {
        let value = tuple
            .get(key)
            .ok_or_else(|| YannakakisError::schema(&relation.name, key))?;
        if !value.is_missing() {
            keys.insert(value);
        }
    }
    Ok(keys)
}

/// Keeps the tuples of `left` whose `left_key` value occurs among the
/// `right_key` values of `right`. Columns of `left` are untouched.
///
/// Null keys never match.
pub fn semi_join(left: Relation, right: &Relation, left_key: &str, right_key: &str) -> Result<Relation> {
    require_attribute(&left, left_key)?;
    let valid_keys = key_set(right, right_key)?;

    let mut kept = Vec::new();
    for tuple in &left.tuples {
        let value = tuple
            .get(left_key)
            .ok_or_else(|| YannakakisError::schema(&left.name, left_key))?;
        if valid_keys.contains(value) {
            kept.push(tuple.clone());
        }
    }
    Ok(left.with_tuples(kept))
}

/// Two-pass dangling-tuple elimination over a join traversal.
pub struct SemiJoinReducer<'a> {
    observer: &'a dyn EngineObserver,
}

impl<'a> SemiJoinReducer<'a> {
    pub fn new(observer: &'a dyn EngineObserver) -> Self {
        Self { observer }
    }

    /// Leaf to root: every parent is reduced by its child, and each
    /// residual edge reduces its left relation by its right one.
    pub fn bottom_up_semi_join(
        &self,
        mut reduced: RelationSet,
        traversal: &JoinTraversal,
    ) -> Result<(RelationSet, Vec<ReductionStep>)> {
        let mut steps = Vec::with_capacity(traversal.tree_edges.len());
        for edge in &traversal.residual_edges {
            steps.push(self.reduce(&mut reduced, Pass::BottomUp, edge.clone())?);
        }
        for tree_edge in traversal.bottom_up() {
            steps.push(self.reduce(&mut reduced, Pass::BottomUp, tree_edge.as_join_edge())?);
        }
        Ok((reduced, steps))
    }

    /// Root to leaf: every child is reduced by its parent, then each
    /// residual edge reduces its right relation by its left one.
    pub fn top_down_semi_join(
        &self,
        mut reduced: RelationSet,
        traversal: &JoinTraversal,
    ) -> Result<(RelationSet, Vec<ReductionStep>)> {
        let mut steps = Vec::with_capacity(traversal.tree_edges.len());
        for tree_edge in traversal.top_down() {
            steps.push(self.reduce(&mut reduced, Pass::TopDown, tree_edge.as_join_edge().reversed())?);
        }
        for edge in &traversal.residual_edges {
            steps.push(self.reduce(&mut reduced, Pass::TopDown, edge.reversed())?);
        }
        Ok((reduced, steps))
    }

    /// Replaces `edge.left` with its semi-join against `edge.right`.
    fn reduce(&self, reduced: &mut RelationSet, pass: Pass, edge: JoinEdge) -> Result<ReductionStep> {
        if !reduced.contains_key(&edge.right) {
            return Err(YannakakisError::unknown_relation(&edge.right, "join edge"));
        }
        let target = reduced
            .remove(&edge.left)
            .ok_or_else(|| YannakakisError::unknown_relation(&edge.left, "join edge"))?;
        let filter = reduced.get(&edge.right).ok_or_else(|| {
            YannakakisError::Configuration(format!("edge {} joins a relation with itself", edge))
        })?;

        let before = target.len();
        let target = semi_join(target, filter, &edge.left_key, &edge.right_key)?;
        let after = target.len();
        reduced.insert(edge.left.clone(), target);

        let step = ReductionStep {
            pass,
            edge,
            before,
            after,
        };
        self.observer
            .on_event(&EngineEvent::DanglingTuplesRemoved(step.clone()));
        Ok(step)
    }
}
