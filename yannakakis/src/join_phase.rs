/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::custom_error::{require_attribute, Result, YannakakisError};
use shared::join_tree::JoinEdge;
use shared::relation::{Relation, RelationSet, Tuple};
use shared::value::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Positions of the tuples of `relation` by their non-missing `key` value.
fn build_index<'a>(relation: &'a Relation, key: &str) -> Result<HashMap<&'a Value, Vec<usize>>> {
    require_attribute(relation, key)?;
    let mut index: HashMap<&Value, Vec<usize>> = HashMap::with_capacity(relation.len());
    for (pos, tuple) in relation.tuples.iter().enumerate() {
        let value = tuple
            .get(key)
            .ok_or_else(|| YannakakisError::schema(&relation.name, key))?;
        if !value.is_missing() {
            index.entry(value).or_default().push(pos);
        }
    }
    Ok(index)
}

fn merge(left: &Tuple, right: &Tuple) -> Tuple {
    let mut merged_row = left.clone();
    merged_row.extend(right.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged_row
}

/// Equi-join of two relations on `left.left_key = right.right_key`.
///
/// Builds a multi-map over the right relation's keys and probes it with
/// every left tuple, emitting one merged tuple per match. Duplicate keys
/// give duplicate rows. On attribute name collisions the right value wins.
pub fn join(left: &Relation, right: &Relation, left_key: &str, right_key: &str) -> Result<Relation> {
    require_attribute(left, left_key)?;
    let right_index = build_index(right, right_key)?;

    let mut result = Vec::new();
    for l in &left.tuples {
        let key = l
            .get(left_key)
            .ok_or_else(|| YannakakisError::schema(&left.name, left_key))?;
        if let Some(matching_rows) = right_index.get(key) {
            for &pos in matching_rows {
                result.push(merge(l, &right.tuples[pos]));
            }
        }
    }

    Ok(Relation::new(
        format!("{} ⋈ {}", left.name, right.name),
        merge_schema(&left.schema, &right.schema),
        result,
    ))
}

fn merge_schema(left: &[String], right: &[String]) -> Vec<String> {
    let mut schema = left.to_vec();
    for attribute in right {
        if !schema.contains(attribute) {
            schema.push(attribute.clone());
        }
    }
    schema
}

/// A joined row and, for every base relation folded into it, the position
/// of the base tuple it was built from.
struct JoinedRow<'a> {
    merged: Tuple,
    origin: BTreeMap<&'a str, usize>,
}

/// A joined set together with the base relations folded into it.
struct Intermediate<'a> {
    name: String,
    schema: Vec<String>,
    members: BTreeSet<String>,
    rows: Vec<JoinedRow<'a>>,
}

/// Final join phase over semi-join reduced relations.
///
/// Edges are consumed in order. The left operand is the latest joined set
/// containing `left` if there is one, otherwise the reduced base relation;
/// the right operand is always the reduced base relation. After a join,
/// every relation folded into the new set maps to it.
///
/// Join keys are read from the base tuple of the relation that owns them,
/// so attribute name collisions in merged tuples never redirect a join.
pub struct JoinExecutor<'a> {
    reduced: &'a RelationSet,
    intermediates: Vec<Intermediate<'a>>,
    latest: HashMap<String, usize>,
}

impl<'a> JoinExecutor<'a> {
    pub fn new(reduced: &'a RelationSet) -> Self {
        JoinExecutor {
            reduced,
            intermediates: Vec::new(),
            latest: HashMap::new(),
        }
    }

    fn base(&self, name: &str) -> Result<(&'a str, &'a Relation)> {
        self.reduced
            .get_key_value(name)
            .map(|(k, v)| (k.as_str(), v))
            .ok_or_else(|| YannakakisError::unknown_relation(name, "join edge"))
    }

    /// Value of `relation.key` in the base tuple behind `row`.
    fn resolve(&self, row: &JoinedRow<'a>, relation: &str, key: &str) -> Result<&'a Value> {
        let (_, base) = self.base(relation)?;
        let pos = row.origin.get(relation).ok_or_else(|| {
            YannakakisError::Configuration(format!(
                "relation '{}' is not part of the joined set",
                relation
            ))
        })?;
        base.tuples[*pos]
            .get(key)
            .ok_or_else(|| YannakakisError::schema(relation, key))
    }

    /// Joins one edge into the accumulated state and returns the index of
    /// the new joined set.
    fn join_edge(&mut self, edge: &JoinEdge) -> Result<usize> {
        let (right_name, right_data) = self.base(&edge.right)?;
        let (left_name, left_data) = self.base(&edge.left)?;
        require_attribute(left_data, &edge.left_key)?;
        let right_index = build_index(right_data, &edge.right_key)?;

        let (left_rows, left_label, left_schema, mut members) = match self.latest.get(&edge.left) {
            // Every member is remapped below, so the old set is never read again
            Some(&idx) => {
                let i = &mut self.intermediates[idx];
                (
                    std::mem::take(&mut i.rows),
                    i.name.clone(),
                    i.schema.clone(),
                    i.members.clone(),
                )
            }
            None => (
                left_data
                    .tuples
                    .iter()
                    .enumerate()
                    .map(|(pos, t)| JoinedRow {
                        merged: t.clone(),
                        origin: BTreeMap::from([(left_name, pos)]),
                    })
                    .collect(),
                left_data.name.clone(),
                left_data.schema.clone(),
                BTreeSet::from([edge.left.clone()]),
            ),
        };

        let mut rows = Vec::new();
        for row in &left_rows {
            let key = self.resolve(row, left_name, &edge.left_key)?;
            if let Some(matching_rows) = right_index.get(key) {
                for &pos in matching_rows {
                    let mut origin = row.origin.clone();
                    origin.insert(right_name, pos);
                    rows.push(JoinedRow {
                        merged: merge(&row.merged, &right_data.tuples[pos]),
                        origin,
                    });
                }
            }
        }
        members.insert(edge.right.clone());

        let idx = self.intermediates.len();
        for member in &members {
            self.latest.insert(member.clone(), idx);
        }
        self.intermediates.push(Intermediate {
            name: format!("{} ⋈ {}", left_label, right_data.name),
            schema: merge_schema(&left_schema, &right_data.schema),
            members,
            rows,
        });
        Ok(idx)
    }

    /// Runs the join phase and returns the last joined set.
    ///
    /// `residual` edges filter that set: a row survives when the two base
    /// tuples it joined for the edge agree on their keys.
    pub fn join_phase(mut self, edges: &[JoinEdge], residual: &[JoinEdge]) -> Result<Relation> {
        let mut last = None;
        for edge in edges {
            last = Some(self.join_edge(edge)?);
        }
        let Some(idx) = last else {
            return Err(YannakakisError::Configuration(
                "join phase needs at least one edge".to_string(),
            ));
        };
        let mut result = self.intermediates.swap_remove(idx);

        for edge in residual {
            require_attribute(self.base(&edge.left)?.1, &edge.left_key)?;
            require_attribute(self.base(&edge.right)?.1, &edge.right_key)?;
            let mut kept = Vec::with_capacity(result.rows.len());
            for row in result.rows {
                let l = self.resolve(&row, &edge.left, &edge.left_key)?;
                let r = self.resolve(&row, &edge.right, &edge.right_key)?;
                if !l.is_missing() && l == r {
                    kept.push(row);
                }
            }
            result.rows = kept;
        }

        Ok(Relation::new(
            result.name,
            result.schema,
            result.rows.into_iter().map(|row| row.merged).collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::relation::{relation_set, tuple};

    fn rel(name: &str, schema: &[&str], rows: Vec<Vec<i64>>) -> Relation {
        Relation::new(
            name,
            schema.iter().map(|s| s.to_string()).collect(),
            rows.into_iter()
                .map(|row| tuple(schema.iter().copied().zip(row)))
                .collect(),
        )
    }

    #[test]
    fn test_duplicate_keys_produce_duplicate_rows() {
        let l = rel("L", &["k", "a"], vec![vec![1, 10], vec![1, 11]]);
        let r = rel("R", &["k2", "b"], vec![vec![1, 20], vec![1, 21], vec![2, 22]]);
        let joined = join(&l, &r, "k", "k2").unwrap();
        assert_eq!(joined.len(), 4);
        assert_eq!(joined.schema, vec!["k", "a", "k2", "b"]);
    }

    #[test]
    fn test_right_value_wins_on_collision() {
        let l = rel("L", &["id", "x"], vec![vec![1, 5]]);
        let r = rel("R", &["id", "x"], vec![vec![1, 9]]);
        let joined = join(&l, &r, "id", "id").unwrap();
        assert_eq!(joined.tuples[0].get("x"), Some(&Value::Int(9)));
    }

    #[test]
    fn test_join_with_empty_relation_is_empty_not_error() {
        let l = rel("L", &["k"], vec![vec![1]]);
        let r = Relation::empty("R", vec!["k".into()]);
        assert!(join(&l, &r, "k", "k").unwrap().is_empty());
        assert!(join(&r, &l, "k", "k").unwrap().is_empty());
    }

    #[test]
    fn test_missing_key_is_schema_error_even_when_empty() {
        let l = Relation::empty("L", vec!["k".into()]);
        let r = rel("R", &["k"], vec![vec![1]]);
        assert!(matches!(
            join(&l, &r, "missing", "k"),
            Err(YannakakisError::Schema { .. })
        ));
    }

    #[test]
    fn test_branching_tree_keeps_every_subtree() {
        // r -> a -> c, r -> b, listed parent first.
        let relations = relation_set([
            rel("r", &["id"], vec![vec![1], vec![2]]),
            rel("a", &["rid", "aid"], vec![vec![1, 100], vec![2, 200]]),
            rel("c", &["caid", "cv"], vec![vec![100, 7]]),
            rel("b", &["brid"], vec![vec![1], vec![2]]),
        ]);
        let edges = vec![
            JoinEdge::new("r", "a", "id", "rid"),
            JoinEdge::new("a", "c", "aid", "caid"),
            JoinEdge::new("r", "b", "id", "brid"),
        ];
        let result = JoinExecutor::new(&relations).join_phase(&edges, &[]).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result.tuples[0].get("cv"), Some(&Value::Int(7)));
        assert_eq!(result.tuples[0].get("brid"), Some(&Value::Int(1)));
    }

    #[test]
    fn test_residual_edge_filters_result() {
        let relations = relation_set([
            rel("a", &["id", "x"], vec![vec![1, 5], vec![2, 6]]),
            rel("b", &["aid", "y"], vec![vec![1, 5], vec![2, 9]]),
        ]);
        let edges = vec![JoinEdge::new("a", "b", "id", "aid")];
        let residual = vec![JoinEdge::new("a", "b", "x", "y")];
        let result = JoinExecutor::new(&relations).join_phase(&edges, &residual).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result.tuples[0].get("id"), Some(&Value::Int(1)));
    }

    #[test]
    fn test_keys_resolve_against_owning_relation() {
        // After title ⋈ movie_info the merged "id" is movie_info's; the
        // second edge must still join on title.id.
        let relations = relation_set([
            rel("title", &["id"], vec![vec![1]]),
            rel("movie_info", &["id", "movie_id"], vec![vec![7, 1]]),
            rel("movie_companies", &["id", "movie_id"], vec![vec![8, 1]]),
        ]);
        let edges = vec![
            JoinEdge::new("title", "movie_info", "id", "movie_id"),
            JoinEdge::new("title", "movie_companies", "id", "movie_id"),
        ];
        let result = JoinExecutor::new(&relations).join_phase(&edges, &[]).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result.tuples[0].get("id"), Some(&Value::Int(8)));
    }
}
