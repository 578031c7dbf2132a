/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

extern crate criterion;
extern crate shared;
extern crate yannakakis;

use criterion::*;
use shared::join_tree::{JoinEdge, JoinTree};
use shared::query::{Comparison, ProjectionCriteria, SelectionCriteria, SelectionPredicate};
use shared::relation::{relation_set, tuple, Relation, RelationSet};
use shared::value::Value;
use std::sync::Arc;
use yannakakis::join_phase::JoinExecutor;
use yannakakis::*;

fn synthetic(name: &str, key: &str, fk: &str, rows: i64, fk_range: i64) -> Relation {
    Relation::new(
        name,
        vec![key.to_string(), fk.to_string(), format!("{}_note", name)],
        (0..rows)
            .map(|i| {
                tuple([
                    (key.to_string(), Value::Int(i)),
                    (fk.to_string(), Value::Int((i * 7919) % fk_range)),
                    (format!("{}_note", name), Value::from(if i % 5 == 0 { "(co-production)" } else { "other" })),
                ])
            })
            .collect(),
    )
}

// movies <- companies <- infos, a three-relation chain with many dangling tuples
fn setup_chain() -> (RelationSet, JoinTree) {
    let relations = relation_set([
        synthetic("movies", "m_id", "m_kind", 20_000, 10),
        synthetic("companies", "c_id", "c_movie", 50_000, 40_000),
        synthetic("infos", "i_id", "i_company", 80_000, 100_000),
    ]);
    let tree = JoinTree::new(vec![
        JoinEdge::new("movies", "companies", "m_id", "c_movie"),
        JoinEdge::new("companies", "infos", "c_id", "i_company"),
    ]);
    (relations, tree)
}

fn co_production(relation: &str) -> SelectionCriteria {
    let mut criteria = SelectionCriteria::new();
    criteria.insert(
        relation.to_string(),
        vec![SelectionPredicate::new(
            format!("{}_note", relation),
            Comparison::Like("%(co-production)%".into()),
        )],
    );
    criteria
}

fn yannakakis_benchmark(c: &mut Criterion) {
    let (relations, tree) = setup_chain();
    let engine = YannakakisEngine::with_observer(EngineConfig::default(), Arc::new(NoopObserver));
    let selection = co_production("movies");

    c.bench_function("chain_full_pipeline", |b| {
        b.iter(|| {
            engine
                .execute(relations.clone(), &tree, &selection, &ProjectionCriteria::new())
                .map(|o| o.result.len())
        })
    });

    c.bench_function("chain_join_without_reduction", |b| {
        b.iter(|| {
            let traversal = JoinTraversal::rooted(&tree)?;
            JoinExecutor::new(&relations)
                .join_phase(&traversal.join_edges(), &[])
                .map(|r| r.len())
        })
    });

    let mut group = c.benchmark_group("traversal_mode");
    for mode in [TraversalMode::RootedTree, TraversalMode::EdgeSequence] {
        let engine = YannakakisEngine::with_observer(
            EngineConfig::default().with_traversal(mode),
            Arc::new(NoopObserver),
        );
        group.bench_with_input(BenchmarkId::from_parameter(mode), &mode, |b, _| {
            b.iter(|| engine.execute(relations.clone(), &tree, &selection, &ProjectionCriteria::new()))
        });
    }
    group.finish();
}

criterion_group!(benches, yannakakis_benchmark);
criterion_main!(benches);
