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
use shared::query::{like_needle, Comparison, SelectionCriteria, SelectionPredicate};
use shared::relation::{Relation, RelationSet};
use shared::value::Value;
use std::cmp::Ordering;
use std::collections::HashSet;

/// Filters a relation by a conjunction of predicates, applied in order.
///
/// Tuples holding `Null` or NaN in a predicate's column never survive that
/// predicate. A column missing from the schema or from any tuple is a
/// schema error.
pub fn apply_selection(relation: Relation, predicates: &[SelectionPredicate]) -> Result<Relation> {
    let mut relation = relation;
    for predicate in predicates {
        relation = apply_predicate(relation, predicate)?;
    }
    Ok(relation)
}

/// Applies every relation's criteria to the set, consuming it.
pub fn apply_selections(
    mut relations: RelationSet,
    criteria: &SelectionCriteria,
) -> Result<RelationSet> {
    for (name, predicates) in criteria {
        let relation = relations
            .remove(name)
            .ok_or_else(|| YannakakisError::unknown_relation(name, "selection criteria"))?;
        let filtered = apply_selection(relation, predicates)?;
        relations.insert(name.clone(), filtered);
    }
    Ok(relations)
}

fn apply_predicate(relation: Relation, predicate: &SelectionPredicate) -> Result<Relation> {
    require_attribute(&relation, &predicate.column)?;
    let matcher = Matcher::prepare(predicate);

    let mut kept = Vec::with_capacity(relation.tuples.len());
    for tuple in &relation.tuples {
        let value = tuple
            .get(&predicate.column)
            .ok_or_else(|| YannakakisError::schema(&relation.name, &predicate.column))?;
        if value.is_missing() {
            continue;
        }
        if matcher.matches(value)? {
            kept.push(tuple.clone());
        }
    }
    Ok(relation.with_tuples(kept))
}

/// A predicate with its pattern and membership set precomputed.
struct Matcher<'a> {
    predicate: &'a SelectionPredicate,
    needle: Option<String>,
    members: Option<HashSet<&'a Value>>,
}

impl<'a> Matcher<'a> {
    fn prepare(predicate: &'a SelectionPredicate) -> Self {
        let needle = match &predicate.comparison {
            Comparison::Like(p) | Comparison::NotLike(p) => Some(like_needle(p)),
            _ => None,
        };
        let members = match &predicate.comparison {
            Comparison::In(set) | Comparison::NotIn(set) => Some(set.iter().collect()),
            _ => None,
        };
        Matcher {
            predicate,
            needle,
            members,
        }
    }

    fn matches(&self, value: &Value) -> Result<bool> {
        match &self.predicate.comparison {
            Comparison::Equal(v) => Ok(value == v),
            Comparison::NotEqual(v) => Ok(value != v),
            Comparison::GreaterThan(v) => Ok(self.order(value, v)? == Ordering::Greater),
            Comparison::LessThan(v) => Ok(self.order(value, v)? == Ordering::Less),
            Comparison::GreaterOrEqual(v) => Ok(self.order(value, v)? != Ordering::Less),
            Comparison::LessOrEqual(v) => Ok(self.order(value, v)? != Ordering::Greater),
            Comparison::Between(low, high) => Ok(self.order(value, low)? != Ordering::Less
                && self.order(value, high)? != Ordering::Greater),
            Comparison::Like(_) => self.contains_needle(value),
            Comparison::NotLike(_) => self.contains_needle(value).map(|found| !found),
            Comparison::In(_) => Ok(self.is_member(value)),
            Comparison::NotIn(_) => Ok(!self.is_member(value)),
        }
    }

    fn order(&self, value: &Value, operand: &Value) -> Result<Ordering> {
        value
            .compare(operand)
            .ok_or_else(|| self.mismatch(value, operand.kind()))
    }

    fn contains_needle(&self, value: &Value) -> Result<bool> {
        let text = value.as_text().ok_or_else(|| self.mismatch(value, "text"))?;
        Ok(text.contains(self.needle.as_deref().unwrap_or_default()))
    }

    fn is_member(&self, value: &Value) -> bool {
        self.members
            .as_ref()
            .map_or(false, |members| members.contains(value))
    }

    fn mismatch(&self, value: &Value, expected: &str) -> YannakakisError {
        YannakakisError::TypeMismatch {
            column: self.predicate.column.clone(),
            operator: self.predicate.comparison.operator().to_string(),
            left: value.kind().to_string(),
            right: expected.to_string(),
        }
    }
}
