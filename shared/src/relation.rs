/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A row: attribute name -> value.
pub type Tuple = BTreeMap<String, Value>;

/// Named collection of tuples sharing a schema.
///
/// The schema is kept next to the tuples so attribute checks never
/// depend on the relation having a first row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    pub name: String,
    pub schema: Vec<String>,
    pub tuples: Vec<Tuple>,
}

impl Relation {
    pub fn new(name: impl Into<String>, schema: Vec<String>, tuples: Vec<Tuple>) -> Self {
        Relation {
            name: name.into(),
            schema,
            tuples,
        }
    }

    pub fn empty(name: impl Into<String>, schema: Vec<String>) -> Self {
        Self::new(name, schema, Vec::new())
    }

    /// Builds a relation whose schema is taken from the first tuple.
    ///
    /// Returns `None` when there is no tuple to infer it from.
    pub fn infer_schema(name: impl Into<String>, tuples: Vec<Tuple>) -> Option<Self> {
        let schema: Vec<String> = tuples.first()?.keys().cloned().collect();
        Some(Self::new(name, schema, tuples))
    }

    pub fn has_attribute(&self, attribute: &str) -> bool {
        self.schema.iter().any(|a| a == attribute)
    }

    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }

    /// Same name and schema, different rows.
    pub fn with_tuples(&self, tuples: Vec<Tuple>) -> Self {
        Relation {
            name: self.name.clone(),
            schema: self.schema.clone(),
            tuples,
        }
    }
}

/// Owned set of relations addressed by name.
pub type RelationSet = BTreeMap<String, Relation>;

/// Convenience for building a tuple from `(attribute, value)` pairs.
pub fn tuple<K, V, I>(pairs: I) -> Tuple
where
    K: Into<String>,
    V: Into<Value>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Collects relations into a set keyed by their names.
pub fn relation_set<I: IntoIterator<Item = Relation>>(relations: I) -> RelationSet {
    relations.into_iter().map(|r| (r.name.clone(), r)).collect()
}
