/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Runs one query under many edge orderings and compares the timings.

use crate::config::EngineConfig;
use crate::custom_error::Result;
use crate::engine::{ExecutionOutcome, YannakakisEngine};
use crate::observer::{EngineObserver, LogObserver};
use crate::permutations::connected_permutations;
use log::{info, warn};
use rayon::prelude::*;
use shared::join_tree::JoinTree;
use shared::query::QueryDefinition;
use shared::relation::RelationSet;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub join_tree: JoinTree,
    pub elapsed: Duration,
    pub result_len: usize,
}

#[derive(Debug, Clone)]
pub struct RunFailure {
    pub join_tree: JoinTree,
    pub error: String,
}

#[derive(Debug, Clone, Default)]
pub struct ExplorationReport {
    /// Successful runs, in permutation order.
    pub runs: Vec<RunSummary>,
    pub failures: Vec<RunFailure>,
}

impl ExplorationReport {
    pub fn best(&self) -> Option<&RunSummary> {
        self.runs.iter().min_by_key(|r| r.elapsed)
    }

    pub fn worst(&self) -> Option<&RunSummary> {
        self.runs.iter().max_by_key(|r| r.elapsed)
    }
}

/// Evaluates a query once per connected edge permutation.
///
/// Every run gets its own copy of the base relations, and cardinality
/// ordering is switched off so the permutation is what gets measured. A
/// failing permutation is recorded and the exploration moves on.
pub struct OrderingExplorer {
    engine: YannakakisEngine,
    parallel: bool,
    limit: Option<usize>,
}

impl OrderingExplorer {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_observer(config, Arc::new(LogObserver))
    }

    pub fn with_observer(config: EngineConfig, observer: Arc<dyn EngineObserver>) -> Self {
        OrderingExplorer {
            engine: YannakakisEngine::with_observer(config.with_cardinality_ordering(false), observer),
            parallel: false,
            limit: None,
        }
    }

    /// Run permutations on the rayon thread pool.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Stop after this many permutations.
    pub fn limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    pub fn explore(&self, relations: &RelationSet, query: &QueryDefinition) -> ExplorationReport {
        let permutations = connected_permutations(&query.join_tree, self.limit);
        info!(
            "Exploring {} edge orderings of {}",
            permutations.len(),
            query.name
        );

        let run = |join_tree: &JoinTree| -> (JoinTree, Result<ExecutionOutcome>) {
            let outcome = self.engine.execute(
                relations.clone(),
                join_tree,
                &query.selection_criteria,
                &query.projection_criteria,
            );
            (join_tree.clone(), outcome)
        };
        let outcomes: Vec<(JoinTree, Result<ExecutionOutcome>)> = if self.parallel {
            permutations.par_iter().map(run).collect()
        } else {
            permutations.iter().map(run).collect()
        };

        let mut report = ExplorationReport::default();
        for (join_tree, outcome) in outcomes {
            match outcome {
                Ok(outcome) => report.runs.push(RunSummary {
                    join_tree,
                    elapsed: outcome.elapsed,
                    result_len: outcome.result.len(),
                }),
                Err(err) => {
                    warn!("Ordering {} failed: {}", join_tree, err);
                    report.failures.push(RunFailure {
                        join_tree,
                        error: err.to_string(),
                    });
                }
            }
        }

        if let (Some(best), Some(worst)) = (report.best(), report.worst()) {
            info!(
                "Best ordering {} :- {:.6} seconds",
                best.join_tree,
                best.elapsed.as_secs_f64()
            );
            info!(
                "Worst ordering {} :- {:.6} seconds",
                worst.join_tree,
                worst.elapsed.as_secs_f64()
            );
        }
        report
    }
}
