/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

pub mod config;
pub mod custom_error;
pub mod driver;
pub mod engine;
pub mod join_order;
pub mod join_phase;
pub mod memory;
pub mod observer;
pub mod permutations;
pub mod projection;
pub mod selection;
pub mod semi_join;
pub mod source;
pub mod traversal;

pub use config::{load_query, EngineConfig};
pub use custom_error::{Result, YannakakisError};
pub use driver::{ExplorationReport, OrderingExplorer, RunFailure, RunSummary};
pub use engine::{ExecutionOutcome, YannakakisEngine};
pub use observer::{CollectingObserver, EngineEvent, EngineObserver, LogObserver, NoopObserver, Phase};
pub use source::{InMemorySource, JsonRelationSource, RelationSource};
pub use traversal::{JoinTraversal, TraversalMode};
