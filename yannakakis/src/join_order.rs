/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::custom_error::{Result, YannakakisError};
use shared::join_tree::{JoinEdge, JoinTree};
use shared::relation::RelationSet;

/// A join edge annotated with the cardinalities of its two operands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EstimatedEdge {
    pub edge: JoinEdge,
    pub left_cardinality: u64,
    pub right_cardinality: u64,
}

impl EstimatedEdge {
    pub fn combined_cardinality(&self) -> u64 {
        self.left_cardinality + self.right_cardinality
    }
}

/// Cardinality estimator over materialized relations.
///
/// The estimate is the current row count; there is no histogram or
/// selectivity model behind it.
pub struct CardinalityEstimator<'a> {
    relations: &'a RelationSet,
}

impl<'a> CardinalityEstimator<'a> {
    pub fn new(relations: &'a RelationSet) -> Self {
        Self { relations }
    }

    /// Row count of the named relation
    pub fn estimate_cardinality(&self, relation: &str) -> Result<u64> {
        self.relations
            .get(relation)
            .map(|r| r.len() as u64)
            .ok_or_else(|| YannakakisError::unknown_relation(relation, "join edge"))
    }

    pub fn estimate_edge(&self, edge: &JoinEdge) -> Result<EstimatedEdge> {
        Ok(EstimatedEdge {
            edge: edge.clone(),
            left_cardinality: self.estimate_cardinality(&edge.left)?,
            right_cardinality: self.estimate_cardinality(&edge.right)?,
        })
    }

    /// Edges sorted ascending by the sum of their operand cardinalities.
    ///
    /// The sort is stable, so ties keep the input edge order.
    pub fn decide_join_order(&self, join_tree: &JoinTree) -> Result<Vec<EstimatedEdge>> {
        let mut join_order = join_tree
            .iter()
            .map(|edge| self.estimate_edge(edge))
            .collect::<Result<Vec<_>>>()?;
        join_order.sort_by_key(EstimatedEdge::combined_cardinality);
        Ok(join_order)
    }
}

/// Drops the annotations, keeping the decided order.
pub fn into_join_tree(order: Vec<EstimatedEdge>) -> JoinTree {
    JoinTree::new(order.into_iter().map(|e| e.edge).collect())
}
