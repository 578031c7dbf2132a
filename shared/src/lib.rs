/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Data model shared by the join engine and its drivers: scalar values,
//! tuples and relations, join edges and trees, and the static query
//! configuration (selection, projection, columns to fetch).

pub mod join_tree;
pub mod query;
pub mod relation;
pub mod value;

pub use join_tree::{JoinEdge, JoinTree};
pub use query::{
    Comparison, ProjectionCriteria, ProjectionItem, QueryDefinition, SelectionCriteria,
    SelectionPredicate,
};
pub use relation::{Relation, RelationSet, Tuple};
pub use value::Value;
