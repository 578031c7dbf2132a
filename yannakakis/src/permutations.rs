/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use shared::join_tree::{JoinEdge, JoinTree};

/// Orderings of the edges where every edge after the first shares a
/// relation with some edge before it.
///
/// Enumerated depth first, so results follow the input order
/// lexicographically by edge position. `limit` caps how many are produced.
pub fn connected_permutations(join_tree: &JoinTree, limit: Option<usize>) -> Vec<JoinTree> {
    let edges: Vec<&JoinEdge> = join_tree.iter().collect();
    let mut found = Vec::new();
    if edges.is_empty() || limit == Some(0) {
        return found;
    }
    let mut used = vec![false; edges.len()];
    let mut prefix: Vec<usize> = Vec::with_capacity(edges.len());
    extend(&edges, &mut used, &mut prefix, limit, &mut found);
    found
}

fn extend(
    edges: &[&JoinEdge],
    used: &mut [bool],
    prefix: &mut Vec<usize>,
    limit: Option<usize>,
    found: &mut Vec<JoinTree>,
) {
    if limit.map_or(false, |l| found.len() >= l) {
        return;
    }
    if prefix.len() == edges.len() {
        found.push(JoinTree::new(prefix.iter().map(|&i| edges[i].clone()).collect()));
        return;
    }
    for i in 0..edges.len() {
        if used[i] {
            continue;
        }
        let connected = prefix.is_empty()
            || prefix.iter().any(|&j| edges[j].shares_relation_with(edges[i]));
        if !connected {
            continue;
        }
        used[i] = true;
        prefix.push(i);
        extend(edges, used, prefix, limit, found);
        prefix.pop();
        used[i] = false;
    }
}
