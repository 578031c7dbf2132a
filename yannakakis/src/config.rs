/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::custom_error::Result;
use crate::traversal::TraversalMode;
use serde::{Deserialize, Serialize};
use shared::query::QueryDefinition;
use std::fs;
use std::path::Path;

/// Engine switches. Every field has a default, so a partial JSON object
/// (or none at all) is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Reorder edges by operand cardinality after selection.
    pub apply_cardinality_ordering: bool,
    pub traversal: TraversalMode,
    /// Apply the query's projection criteria to the joined result.
    pub apply_projection: bool,
    /// Emit memory estimates at phase boundaries.
    pub measure_memory: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            apply_cardinality_ordering: true,
            traversal: TraversalMode::RootedTree,
            apply_projection: false,
            measure_memory: true,
        }
    }
}

impl EngineConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn with_cardinality_ordering(mut self, enabled: bool) -> Self {
        self.apply_cardinality_ordering = enabled;
        self
    }

    pub fn with_traversal(mut self, traversal: TraversalMode) -> Self {
        self.traversal = traversal;
        self
    }

    pub fn with_projection(mut self, enabled: bool) -> Self {
        self.apply_projection = enabled;
        self
    }

    pub fn with_memory_measurement(mut self, enabled: bool) -> Self {
        self.measure_memory = enabled;
        self
    }
}

pub fn load_query<P: AsRef<Path>>(path: P) -> Result<QueryDefinition> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}
