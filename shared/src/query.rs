/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::join_tree::JoinTree;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Comparison applied to one column of a relation.
#[derive(Debug, Clone, PartialEq)]
pub enum Comparison {
    Equal(Value),
    NotEqual(Value),
    GreaterThan(Value),
    LessThan(Value),
    GreaterOrEqual(Value),
    LessOrEqual(Value),
    /// Inclusive on both ends.
    Between(Value, Value),
    /// SQL-style pattern; only substring containment is honored.
    Like(String),
    NotLike(String),
    In(Vec<Value>),
    NotIn(Vec<Value>),
}

impl Comparison {
    pub fn operator(&self) -> &'static str {
        match self {
            Comparison::Equal(_) => "==",
            Comparison::NotEqual(_) => "!=",
            Comparison::GreaterThan(_) => ">",
            Comparison::LessThan(_) => "<",
            Comparison::GreaterOrEqual(_) => ">=",
            Comparison::LessOrEqual(_) => "<=",
            Comparison::Between(..) => "between",
            Comparison::Like(_) => "like",
            Comparison::NotLike(_) => "not like",
            Comparison::In(_) => "IN",
            Comparison::NotIn(_) => "not in",
        }
    }
}

/// The `LIKE` pattern with every `%` wildcard removed.
pub fn like_needle(pattern: &str) -> String {
    pattern.replace('%', "")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPredicate", into = "RawPredicate")]
pub struct SelectionPredicate {
    pub column: String,
    pub comparison: Comparison,
}

impl SelectionPredicate {
    pub fn new(column: impl Into<String>, comparison: Comparison) -> Self {
        SelectionPredicate {
            column: column.into(),
            comparison,
        }
    }
}

impl fmt::Display for SelectionPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ", self.column, self.comparison.operator())?;
        match &self.comparison {
            Comparison::Between(low, high) => write!(f, "{} and {}", low, high),
            Comparison::Like(p) | Comparison::NotLike(p) => write!(f, "'{}'", p),
            Comparison::In(set) | Comparison::NotIn(set) => {
                let items: Vec<String> = set.iter().map(|v| v.to_string()).collect();
                write!(f, "({})", items.join(", "))
            }
            Comparison::Equal(v)
            | Comparison::NotEqual(v)
            | Comparison::GreaterThan(v)
            | Comparison::LessThan(v)
            | Comparison::GreaterOrEqual(v)
            | Comparison::LessOrEqual(v) => write!(f, "{}", v),
        }
    }
}

// Wire shape: {"column": .., "operator": .., "value": ..}
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawPredicate {
    column: String,
    operator: String,
    value: RawOperand,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawOperand {
    List(Vec<Value>),
    Scalar(Value),
}

impl TryFrom<RawPredicate> for SelectionPredicate {
    type Error = String;

    fn try_from(raw: RawPredicate) -> Result<Self, Self::Error> {
        let RawPredicate {
            column,
            operator,
            value,
        } = raw;
        let mismatch = |expected: &str| {
            format!(
                "operator '{}' on column '{}' expects {}",
                operator, column, expected
            )
        };
        let comparison = match (operator.as_str(), value) {
            ("==", RawOperand::Scalar(v)) => Comparison::Equal(v),
            ("!=", RawOperand::Scalar(v)) => Comparison::NotEqual(v),
            (">", RawOperand::Scalar(v)) => Comparison::GreaterThan(v),
            ("<", RawOperand::Scalar(v)) => Comparison::LessThan(v),
            (">=", RawOperand::Scalar(v)) => Comparison::GreaterOrEqual(v),
            ("<=", RawOperand::Scalar(v)) => Comparison::LessOrEqual(v),
            ("between", RawOperand::List(mut bounds)) if bounds.len() == 2 => {
                let high = bounds.pop().unwrap_or(Value::Null);
                let low = bounds.pop().unwrap_or(Value::Null);
                Comparison::Between(low, high)
            }
            ("like", RawOperand::Scalar(Value::Text(p))) => Comparison::Like(p),
            ("not like", RawOperand::Scalar(Value::Text(p))) => Comparison::NotLike(p),
            ("IN" | "in", RawOperand::List(set)) => Comparison::In(set),
            ("not in" | "NOT IN", RawOperand::List(set)) => Comparison::NotIn(set),
            ("==" | "!=" | ">" | "<" | ">=" | "<=", _) => return Err(mismatch("a scalar")),
            ("between", _) => return Err(mismatch("a [low, high] pair")),
            ("like" | "not like", _) => return Err(mismatch("a text pattern")),
            ("IN" | "in" | "not in" | "NOT IN", _) => return Err(mismatch("a list of values")),
            (other, _) => return Err(format!("unknown selection operator '{}'", other)),
        };
        Ok(SelectionPredicate { column, comparison })
    }
}

impl From<SelectionPredicate> for RawPredicate {
    fn from(p: SelectionPredicate) -> Self {
        let operator = p.comparison.operator().to_string();
        let value = match p.comparison {
            Comparison::Equal(v)
            | Comparison::NotEqual(v)
            | Comparison::GreaterThan(v)
            | Comparison::LessThan(v)
            | Comparison::GreaterOrEqual(v)
            | Comparison::LessOrEqual(v) => RawOperand::Scalar(v),
            Comparison::Between(low, high) => RawOperand::List(vec![low, high]),
            Comparison::Like(p) | Comparison::NotLike(p) => RawOperand::Scalar(Value::Text(p)),
            Comparison::In(set) | Comparison::NotIn(set) => RawOperand::List(set),
        };
        RawPredicate {
            column: p.column,
            operator,
            value,
        }
    }
}

/// Relation name -> predicates applied in order (conjunction).
pub type SelectionCriteria = BTreeMap<String, Vec<SelectionPredicate>>;

/// Relation name -> requested output columns, possibly `MIN(col)` / `MAX(col)`.
pub type ProjectionCriteria = BTreeMap<String, Vec<String>>;

/// One requested output column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectionItem {
    Column(String),
    Min(String),
    Max(String),
}

impl ProjectionItem {
    pub fn parse(item: &str) -> Self {
        let trimmed = item.trim();
        let inner = |prefix: &str| {
            trimmed
                .strip_prefix(prefix)
                .and_then(|rest| rest.strip_suffix(')'))
                .map(|field| field.trim().to_string())
        };
        if let Some(field) = inner("MIN(") {
            ProjectionItem::Min(field)
        } else if let Some(field) = inner("MAX(") {
            ProjectionItem::Max(field)
        } else {
            ProjectionItem::Column(trimmed.to_string())
        }
    }

    pub fn is_aggregate(&self) -> bool {
        !matches!(self, ProjectionItem::Column(_))
    }
}

impl fmt::Display for ProjectionItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectionItem::Column(c) => write!(f, "{}", c),
            ProjectionItem::Min(c) => write!(f, "MIN({})", c),
            ProjectionItem::Max(c) => write!(f, "MAX({})", c),
        }
    }
}

/// Static description of one benchmark query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryDefinition {
    pub name: String,
    #[serde(default)]
    pub sql: Option<String>,
    /// Relation name -> columns to fetch from the relation source.
    pub columns: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub selection_criteria: SelectionCriteria,
    #[serde(default)]
    pub projection_criteria: ProjectionCriteria,
    pub join_tree: JoinTree,
}
