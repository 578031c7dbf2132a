/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Approximate heap footprint of materialized relations.
//!
//! The numbers are diagnostics only: they count tuple slots, map entries
//! and text payloads, not allocator overhead.

use shared::relation::{Relation, RelationSet, Tuple};
use shared::value::Value;
use std::mem::size_of;

// Per-entry bookkeeping of a BTreeMap node, amortized
const MAP_ENTRY_OVERHEAD: usize = 16;

pub fn value_bytes(value: &Value) -> usize {
    let payload = match value {
        Value::Text(s) => s.capacity(),
        _ => 0,
    };
    size_of::<Value>() + payload
}

pub fn tuple_bytes(tuple: &Tuple) -> usize {
    tuple
        .iter()
        .map(|(k, v)| size_of::<String>() + k.capacity() + value_bytes(v) + MAP_ENTRY_OVERHEAD)
        .sum::<usize>()
        + size_of::<Tuple>()
}

pub fn relation_bytes(relation: &Relation) -> usize {
    let schema: usize = relation
        .schema
        .iter()
        .map(|a| size_of::<String>() + a.capacity())
        .sum();
    size_of::<Relation>() + schema + relation.tuples.iter().map(tuple_bytes).sum::<usize>()
}

/// Total and per-relation footprint, in relation-name order.
pub fn relation_set_bytes(relations: &RelationSet) -> (usize, Vec<(String, usize)>) {
    let per_relation: Vec<(String, usize)> = relations
        .iter()
        .map(|(name, rel)| (name.clone(), relation_bytes(rel)))
        .collect();
    let total = per_relation.iter().map(|(_, b)| b).sum();
    (total, per_relation)
}
