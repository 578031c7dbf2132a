/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Where base relations come from.
//!
//! A source materializes named relations restricted to the requested
//! columns. The engine itself never touches a source; callers fetch a
//! [`RelationSet`] first and hand it over.

use crate::custom_error::{relation_from_tuples, Result, YannakakisError};
use shared::relation::{Relation, RelationSet, Tuple};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub trait RelationSource {
    /// Materializes `name` with exactly the given columns, or with all of
    /// them when `columns` is empty.
    fn fetch_relation(&self, name: &str, columns: &[String]) -> Result<Relation>;

    /// Fetches every relation named in `columns_by_relation`.
    fn fetch_all(&self, columns_by_relation: &BTreeMap<String, Vec<String>>) -> Result<RelationSet> {
        let mut relations = RelationSet::new();
        for (name, columns) in columns_by_relation {
            relations.insert(name.clone(), self.fetch_relation(name, columns)?);
        }
        Ok(relations)
    }
}

/// Keeps only `columns` of every tuple; a column missing from a tuple is a
/// schema error.
fn restrict(name: &str, tuples: Vec<Tuple>, columns: &[String]) -> Result<Relation> {
    let mut restricted = Vec::with_capacity(tuples.len());
    for mut tuple in tuples {
        let mut row = Tuple::new();
        for column in columns {
            let value = tuple
                .remove(column)
                .ok_or_else(|| YannakakisError::schema(name, column))?;
            row.insert(column.clone(), value);
        }
        restricted.push(row);
    }
    Ok(Relation::new(name, columns.to_vec(), restricted))
}

/// Reads `<dir>/<name>.json`, each file holding an array of JSON objects.
///
/// An empty column list fetches every attribute; the schema is then taken
/// from the first object.
#[derive(Debug, Clone)]
pub struct JsonRelationSource {
    dir: PathBuf,
}

impl JsonRelationSource {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        JsonRelationSource {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", name))
    }
}

impl RelationSource for JsonRelationSource {
    fn fetch_relation(&self, name: &str, columns: &[String]) -> Result<Relation> {
        let text = fs::read_to_string(self.path_for(name))?;
        let tuples: Vec<Tuple> = serde_json::from_str(&text).map_err(|err| {
            YannakakisError::Source(format!("relation '{}' is not an array of objects: {}", name, err))
        })?;
        if columns.is_empty() {
            return relation_from_tuples(name, tuples);
        }
        restrict(name, tuples, columns)
    }
}

/// Serves relations already held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    relations: RelationSet,
}

impl InMemorySource {
    pub fn new(relations: RelationSet) -> Self {
        InMemorySource { relations }
    }
}

impl RelationSource for InMemorySource {
    fn fetch_relation(&self, name: &str, columns: &[String]) -> Result<Relation> {
        let relation = self
            .relations
            .get(name)
            .ok_or_else(|| YannakakisError::Source(format!("no relation named '{}'", name)))?;
        if columns.is_empty() {
            return Ok(relation.clone());
        }
        for column in columns {
            if !relation.has_attribute(column) {
                return Err(YannakakisError::schema(name, column));
            }
        }
        restrict(name, relation.tuples.clone(), columns)
    }
}
