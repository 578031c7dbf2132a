/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Structured events emitted while a query runs.
//!
//! The engine reports through an [`EngineObserver`] handed to it at
//! construction instead of a process-wide logger. Observers must not fail
//! and must not change what the engine computes.

use crate::semi_join::ReductionStep;
use crate::traversal::TraversalMode;
use log::{debug, error, info, warn};
use shared::join_tree::{JoinEdge, JoinTree};
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Selection,
    Ordering,
    BottomUp,
    TopDown,
    Join,
    Projection,
    Overall,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Selection => "selection",
            Phase::Ordering => "join ordering",
            Phase::BottomUp => "bottom-up semi-join",
            Phase::TopDown => "top-down semi-join",
            Phase::Join => "join phase",
            Phase::Projection => "projection",
            Phase::Overall => "overall",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    RunStarted {
        relations: usize,
        join_tree: JoinTree,
        traversal: TraversalMode,
    },
    PhaseCompleted {
        phase: Phase,
        elapsed: Duration,
    },
    MemoryUsage {
        phase: Phase,
        total_bytes: usize,
        per_relation: Vec<(String, usize)>,
    },
    DanglingTuplesRemoved(ReductionStep),
    ResidualEdge {
        edge: JoinEdge,
    },
    RunCompleted {
        elapsed: Duration,
        result_len: usize,
    },
    RunFailed {
        message: String,
    },
}

pub trait EngineObserver: Send + Sync {
    fn on_event(&self, event: &EngineEvent);
}

/// Forwards events to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl EngineObserver for LogObserver {
    fn on_event(&self, event: &EngineEvent) {
        match event {
            EngineEvent::RunStarted {
                relations,
                join_tree,
                traversal,
            } => info!(
                "Executing {} relations over join tree {} ({})",
                relations, join_tree, traversal
            ),
            EngineEvent::PhaseCompleted { phase, elapsed } => {
                info!("Time taken by {} :- {:.6} seconds", phase, elapsed.as_secs_f64())
            }
            EngineEvent::MemoryUsage {
                phase,
                total_bytes,
                per_relation,
            } => {
                info!(
                    "Memory usage after {} :- {:.2} KB",
                    phase,
                    *total_bytes as f64 / 1024.0
                );
                for (name, bytes) in per_relation {
                    debug!("Relation {}: {:.2} KB", name, *bytes as f64 / 1024.0);
                }
            }
            EngineEvent::DanglingTuplesRemoved(step) => debug!(
                "{} :- {}  Dangling tuples removed :- {}",
                step.pass,
                step.edge,
                step.removed()
            ),
            EngineEvent::ResidualEdge { edge } => warn!(
                "Edge {} closes a cycle in the join graph; used as a filter only",
                edge
            ),
            EngineEvent::RunCompleted {
                elapsed,
                result_len,
            } => info!(
                "Overall time taken :- {:.6} seconds, length of final join :- {}",
                elapsed.as_secs_f64(),
                result_len
            ),
            EngineEvent::RunFailed { message } => error!("Error occurred :- {}", message),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl EngineObserver for NoopObserver {
    fn on_event(&self, _event: &EngineEvent) {}
}

/// Keeps every event in memory, optionally forwarding to another observer.
#[derive(Default)]
pub struct CollectingObserver {
    events: Mutex<Vec<EngineEvent>>,
    forward: Option<Arc<dyn EngineObserver>>,
}

impl CollectingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn forwarding_to(observer: Arc<dyn EngineObserver>) -> Self {
        CollectingObserver {
            events: Mutex::new(Vec::new()),
            forward: Some(observer),
        }
    }

    pub fn events(&self) -> Vec<EngineEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn reduction_steps(&self) -> Vec<ReductionStep> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                EngineEvent::DanglingTuplesRemoved(step) => Some(step),
                _ => None,
            })
            .collect()
    }

    pub fn phase_elapsed(&self, phase: Phase) -> Option<Duration> {
        self.events().into_iter().find_map(|e| match e {
            EngineEvent::PhaseCompleted { phase: p, elapsed } if p == phase => Some(elapsed),
            _ => None,
        })
    }
}

impl EngineObserver for CollectingObserver {
    fn on_event(&self, event: &EngineEvent) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event.clone());
        if let Some(forward) = &self.forward {
            forward.on_event(event);
        }
    }
}
