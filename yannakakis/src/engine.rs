/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Yannakakis evaluation of one acyclic equi-join query.
//!
//! Phases run strictly in sequence: selection, optional cardinality
//! ordering, bottom-up semi-join reduction, top-down semi-join reduction,
//! join phase, optional projection. Each phase takes the relation set by
//! value and hands a new one to the next, so the caller's base relations
//! are never aliased.

use crate::config::EngineConfig;
use crate::custom_error::{require_attribute, Result, YannakakisError};
use crate::join_order::{into_join_tree, CardinalityEstimator};
use crate::join_phase::JoinExecutor;
use crate::memory::{relation_bytes, relation_set_bytes};
use crate::observer::{EngineEvent, EngineObserver, LogObserver, Phase};
use crate::projection::{apply_projection, projection_items};
use crate::selection::apply_selections;
use crate::semi_join::{ReductionStep, SemiJoinReducer};
use crate::traversal::JoinTraversal;
use shared::join_tree::JoinTree;
use shared::query::{ProjectionCriteria, QueryDefinition, SelectionCriteria};
use shared::relation::{Relation, RelationSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// What one run produced.
#[derive(Debug, Clone)]
pub struct ExecutionOutcome {
    pub result: Relation,
    pub elapsed: Duration,
    /// Edge order after cardinality ordering (if enabled).
    pub join_tree: JoinTree,
    pub reduction_steps: Vec<ReductionStep>,
    pub phase_timings: Vec<(Phase, Duration)>,
}

impl ExecutionOutcome {
    pub fn dangling_tuples_removed(&self) -> usize {
        self.reduction_steps.iter().map(ReductionStep::removed).sum()
    }
}

struct PhaseClock<'a> {
    observer: &'a dyn EngineObserver,
    last: Instant,
    timings: Vec<(Phase, Duration)>,
}

impl<'a> PhaseClock<'a> {
    fn start(observer: &'a dyn EngineObserver) -> Self {
        PhaseClock {
            observer,
            last: Instant::now(),
            timings: Vec::new(),
        }
    }

    fn lap(&mut self, phase: Phase) {
        let now = Instant::now();
        let elapsed = now - self.last;
        self.last = now;
        self.timings.push((phase, elapsed));
        self.observer
            .on_event(&EngineEvent::PhaseCompleted { phase, elapsed });
    }
}

pub struct YannakakisEngine {
    config: EngineConfig,
    observer: Arc<dyn EngineObserver>,
}

impl YannakakisEngine {
    /// Engine reporting through the `log` facade.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_observer(config, Arc::new(LogObserver))
    }

    pub fn with_observer(config: EngineConfig, observer: Arc<dyn EngineObserver>) -> Self {
        YannakakisEngine { config, observer }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Evaluates the query over `relations`, which it consumes.
    ///
    /// On failure the error is reported to the observer before being
    /// returned; no partial result is produced.
    pub fn execute(
        &self,
        relations: RelationSet,
        join_tree: &JoinTree,
        selection_criteria: &SelectionCriteria,
        projection_criteria: &ProjectionCriteria,
    ) -> Result<ExecutionOutcome> {
        self.run(relations, join_tree, selection_criteria, projection_criteria)
            .map_err(|err| {
                self.observer.on_event(&EngineEvent::RunFailed {
                    message: err.to_string(),
                });
                err
            })
    }

    /// Same as [`execute`](Self::execute) with the criteria of a query definition.
    pub fn execute_query(
        &self,
        relations: RelationSet,
        query: &QueryDefinition,
    ) -> Result<ExecutionOutcome> {
        self.execute(
            relations,
            &query.join_tree,
            &query.selection_criteria,
            &query.projection_criteria,
        )
    }

    fn run(
        &self,
        relations: RelationSet,
        join_tree: &JoinTree,
        selection_criteria: &SelectionCriteria,
        projection_criteria: &ProjectionCriteria,
    ) -> Result<ExecutionOutcome> {
        let observer = self.observer.as_ref();
        let start = Instant::now();
        observer.on_event(&EngineEvent::RunStarted {
            relations: relations.len(),
            join_tree: join_tree.clone(),
            traversal: self.config.traversal,
        });
        validate_join_tree(&relations, join_tree)?;
        let mut clock = PhaseClock::start(observer);

        let relations = apply_selections(relations, selection_criteria)?;
        clock.lap(Phase::Selection);
        self.report_memory(Phase::Selection, &relations);

        let join_tree = if self.config.apply_cardinality_ordering {
            into_join_tree(CardinalityEstimator::new(&relations).decide_join_order(join_tree)?)
        } else {
            join_tree.clone()
        };
        let traversal = JoinTraversal::for_mode(self.config.traversal, &join_tree)?;
        for edge in &traversal.residual_edges {
            observer.on_event(&EngineEvent::ResidualEdge { edge: edge.clone() });
        }
        clock.lap(Phase::Ordering);

        let mut reduction_steps = Vec::new();
        let result = if join_tree.is_empty() {
            single_relation(relations)?
        } else {
            let reducer = SemiJoinReducer::new(observer);

            let (reduced, steps) = reducer.bottom_up_semi_join(relations, &traversal)?;
            reduction_steps.extend(steps);
            clock.lap(Phase::BottomUp);
            self.report_memory(Phase::BottomUp, &reduced);

            let (reduced, steps) = reducer.top_down_semi_join(reduced, &traversal)?;
            reduction_steps.extend(steps);
            clock.lap(Phase::TopDown);
            self.report_memory(Phase::TopDown, &reduced);

            JoinExecutor::new(&reduced)
                .join_phase(&traversal.join_edges(), &traversal.residual_edges)?
        };
        clock.lap(Phase::Join);
        if self.config.measure_memory {
            let bytes = relation_bytes(&result);
            observer.on_event(&EngineEvent::MemoryUsage {
                phase: Phase::Join,
                total_bytes: bytes,
                per_relation: vec![(result.name.clone(), bytes)],
            });
        }

        let result = if self.config.apply_projection {
            let projected = apply_projection(result, &projection_items(projection_criteria))?;
            clock.lap(Phase::Projection);
            projected
        } else {
            result
        };

        let elapsed = start.elapsed();
        clock.timings.push((Phase::Overall, elapsed));
        observer.on_event(&EngineEvent::PhaseCompleted {
            phase: Phase::Overall,
            elapsed,
        });
        observer.on_event(&EngineEvent::RunCompleted {
            elapsed,
            result_len: result.len(),
        });

        Ok(ExecutionOutcome {
            result,
            elapsed,
            join_tree,
            reduction_steps,
            phase_timings: clock.timings,
        })
    }

    fn report_memory(&self, phase: Phase, relations: &RelationSet) {
        if !self.config.measure_memory {
            return;
        }
        let (total_bytes, per_relation) = relation_set_bytes(relations);
        self.observer.on_event(&EngineEvent::MemoryUsage {
            phase,
            total_bytes,
            per_relation,
        });
    }
}

/// Every edge must name known relations and attributes of their schemas.
pub fn validate_join_tree(relations: &RelationSet, join_tree: &JoinTree) -> Result<()> {
    for edge in join_tree {
        for (name, key) in [(&edge.left, &edge.left_key), (&edge.right, &edge.right_key)] {
            let relation = relations
                .get(name)
                .ok_or_else(|| YannakakisError::unknown_relation(name, "join edge"))?;
            require_attribute(relation, key)?;
        }
    }
    Ok(())
}

// A query without edges is only meaningful over a single relation
fn single_relation(mut relations: RelationSet) -> Result<Relation> {
    if relations.len() != 1 {
        return Err(YannakakisError::Configuration(format!(
            "join tree is empty but {} relations were supplied",
            relations.len()
        )));
    }
    relations
        .pop_first()
        .map(|(_, relation)| relation)
        .ok_or_else(|| YannakakisError::Configuration("no relation supplied".to_string()))
}
