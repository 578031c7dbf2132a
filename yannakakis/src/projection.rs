/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::custom_error::{Result, YannakakisError};
use shared::query::{ProjectionCriteria, ProjectionItem};
use shared::relation::{Relation, Tuple};
use shared::value::Value;
use std::cmp::Ordering;

/// Requested items across every relation, first occurrence wins.
pub fn projection_items(criteria: &ProjectionCriteria) -> Vec<ProjectionItem> {
    let mut items: Vec<ProjectionItem> = Vec::new();
    for columns in criteria.values() {
        for column in columns {
            let item = ProjectionItem::parse(column);
            if !items.contains(&item) {
                items.push(item);
            }
        }
    }
    items
}

/// Keeps the requested columns, or collapses to one row of aggregates.
///
/// When any `MIN`/`MAX` item is requested the result is a single row
/// holding only the aggregates; nulls and rows lacking the field are
/// skipped and an aggregate over no value is `Null`.
pub fn apply_projection(relation: Relation, items: &[ProjectionItem]) -> Result<Relation> {
    if items.is_empty() {
        return Ok(relation);
    }

    if items.iter().any(ProjectionItem::is_aggregate) {
        let mut row = Tuple::new();
        for item in items.iter().filter(|i| i.is_aggregate()) {
            let value = match item {
                ProjectionItem::Min(field) => extreme(&relation, field, Ordering::Less)?,
                ProjectionItem::Max(field) => extreme(&relation, field, Ordering::Greater)?,
                ProjectionItem::Column(_) => continue,
            };
            row.insert(item.to_string(), value);
        }
        let schema = row.keys().cloned().collect();
        return Ok(Relation::new(relation.name, schema, vec![row]));
    }

    let columns: Vec<&str> = items
        .iter()
        .filter_map(|i| match i {
            ProjectionItem::Column(c) => Some(c.as_str()),
            _ => None,
        })
        .collect();
    let schema = relation
        .schema
        .iter()
        .filter(|a| columns.contains(&a.as_str()))
        .cloned()
        .collect();
    let tuples = relation
        .tuples
        .into_iter()
        .map(|t| {
            t.into_iter()
                .filter(|(k, _)| columns.contains(&k.as_str()))
                .collect()
        })
        .collect();
    Ok(Relation::new(relation.name, schema, tuples))
}

fn extreme(relation: &Relation, field: &str, wanted: Ordering) -> Result<Value> {
    let mut best: Option<&Value> = None;
    for value in relation.tuples.iter().filter_map(|t| t.get(field)) {
        if value.is_missing() {
            continue;
        }
        best = match best {
            None => Some(value),
            Some(current) => {
                let ord = value.compare(current).ok_or_else(|| YannakakisError::TypeMismatch {
                    column: field.to_string(),
                    operator: "aggregate".to_string(),
                    left: value.kind().to_string(),
                    right: current.kind().to_string(),
                })?;
                if ord == wanted {
                    Some(value)
                } else {
                    Some(current)
                }
            }
        };
    }
    Ok(best.cloned().unwrap_or(Value::Null))
}
