/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use shared::relation::{Relation, Tuple};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, YannakakisError>;

/// Errors raised by the join engine and its relation sources.
///
/// None of them is recovered from inside the engine: they propagate to the
/// caller as soon as they occur.
#[derive(Error, Debug)]
pub enum YannakakisError {
    #[error("Schema error: attribute '{attribute}' is absent from relation '{relation}'")]
    Schema { relation: String, attribute: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Empty relation: cannot infer a schema for '{0}' without any tuple")]
    EmptyRelation(String),

    #[error("Type error: '{column}' {operator} cannot compare {left} with {right}")]
    TypeMismatch {
        column: String,
        operator: String,
        left: String,
        right: String,
    },

    #[error("Source error: {0}")]
    Source(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl YannakakisError {
    pub fn schema(relation: &str, attribute: &str) -> Self {
        YannakakisError::Schema {
            relation: relation.to_string(),
            attribute: attribute.to_string(),
        }
    }

    pub fn unknown_relation(relation: &str, context: &str) -> Self {
        YannakakisError::Configuration(format!(
            "{} references unknown relation '{}'",
            context, relation
        ))
    }
}

/// Fails with a schema error unless `attribute` is part of the relation's schema.
pub fn require_attribute(relation: &Relation, attribute: &str) -> Result<()> {
    if relation.has_attribute(attribute) {
        Ok(())
    } else {
        Err(YannakakisError::schema(&relation.name, attribute))
    }
}

/// Builds a relation from tuples alone, taking the schema from the first one.
pub fn relation_from_tuples(name: &str, tuples: Vec<Tuple>) -> Result<Relation> {
    Relation::infer_schema(name, tuples)
        .ok_or_else(|| YannakakisError::EmptyRelation(name.to_string()))
}
