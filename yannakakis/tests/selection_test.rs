/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

extern crate shared;
extern crate yannakakis;

use shared::query::{Comparison, SelectionCriteria, SelectionPredicate};
use shared::relation::{relation_set, tuple, Relation};
use shared::value::Value;
use yannakakis::selection::{apply_selection, apply_selections};
use yannakakis::YannakakisError;

#[cfg(test)]
mod tests {
    use super::*;

    fn movie_companies() -> Relation {
        let notes = [
            Some("(co-production)"),
            Some("other"),
            Some("(as Metro-Goldwyn-Mayer Pictures) (co-production)"),
            None,
            Some("(presents) (co-production)"),
            Some("(USA) (theatrical)"),
        ];
        let tuples = notes
            .iter()
            .enumerate()
            .map(|(i, note)| {
                tuple([
                    ("id", Value::Int(i as i64 + 1)),
                    ("company_type_id", Value::Int(i as i64 % 3)),
                    ("note", Value::from(note.map(str::to_string))),
                ])
            })
            .collect();
        Relation::new(
            "movie_companies",
            vec!["id".into(), "company_type_id".into(), "note".into()],
            tuples,
        )
    }

    fn notes(relation: &Relation) -> Vec<String> {
        relation
            .tuples
            .iter()
            .filter_map(|t| t.get("note").and_then(|v| v.as_text()).map(str::to_string))
            .collect()
    }

    #[test]
    fn test_like_keeps_matching_note() {
        let like = SelectionPredicate::new("note", Comparison::Like("%(co-production)%".into()));
        let relation = Relation::new(
            "mc",
            vec!["note".into()],
            vec![
                tuple([("note", "(co-production)")]),
                tuple([("note", "other")]),
            ],
        );
        let filtered = apply_selection(relation, &[like]).unwrap();
        assert_eq!(notes(&filtered), vec!["(co-production)".to_string()]);
    }

    #[test]
    fn test_conjunction_equals_sequential_application() {
        let predicates = vec![
            SelectionPredicate::new(
                "note",
                Comparison::NotLike("%(as Metro-Goldwyn-Mayer Pictures)%".into()),
            ),
            SelectionPredicate::new("note", Comparison::Like("%(co-production)%".into())),
            SelectionPredicate::new("company_type_id", Comparison::NotEqual(Value::Int(1))),
        ];

        let at_once = apply_selection(movie_companies(), &predicates).unwrap();
        let mut stepwise = movie_companies();
        for predicate in &predicates {
            stepwise = apply_selection(stepwise, std::slice::from_ref(predicate)).unwrap();
        }
        assert_eq!(at_once, stepwise);
        assert_eq!(notes(&at_once), vec!["(co-production)".to_string()]);
    }

    #[test]
    fn test_null_note_is_dropped_by_every_operator() {
        let ops = vec![
            Comparison::NotLike("%x%".into()),
            Comparison::NotEqual(Value::from("x")),
            Comparison::NotIn(vec![Value::from("x")]),
        ];
        for comparison in ops {
            let filtered =
                apply_selection(movie_companies(), &[SelectionPredicate::new("note", comparison)]).unwrap();
            assert_eq!(filtered.len(), 5);
        }
    }

    #[test]
    fn test_numeric_operators() {
        let relation = Relation::new(
            "title",
            vec!["production_year".into()],
            [1994, 2008, 2010, 2012, 2015]
                .into_iter()
                .map(|y| tuple([("production_year", y)]))
                .collect(),
        );
        let count = |comparison: Comparison| {
            apply_selection(
                relation.clone(),
                &[SelectionPredicate::new("production_year", comparison)],
            )
            .unwrap()
            .len()
        };
        assert_eq!(count(Comparison::GreaterThan(Value::Int(2010))), 2);
        assert_eq!(count(Comparison::GreaterOrEqual(Value::Int(2010))), 3);
        assert_eq!(count(Comparison::LessThan(Value::Float(2008.5))), 2);
        assert_eq!(count(Comparison::LessOrEqual(Value::Int(1994))), 1);
        assert_eq!(count(Comparison::Between(Value::Int(2008), Value::Int(2012))), 3);
        assert_eq!(count(Comparison::In(vec![Value::Int(1994), Value::Float(2015.0)])), 2);
        assert_eq!(count(Comparison::Equal(Value::from("2010"))), 0);
    }

    #[test]
    fn test_ordering_text_against_number_is_type_error() {
        let relation = Relation::new("t", vec!["v".into()], vec![tuple([("v", "abc")])]);
        let result = apply_selection(
            relation,
            &[SelectionPredicate::new("v", Comparison::GreaterThan(Value::Int(3)))],
        );
        assert!(matches!(result, Err(YannakakisError::TypeMismatch { .. })));
    }

    #[test]
    fn test_criteria_for_unknown_relation() {
        let mut criteria = SelectionCriteria::new();
        criteria.insert(
            "missing".to_string(),
            vec![SelectionPredicate::new("id", Comparison::Equal(Value::Int(1)))],
        );
        let result = apply_selections(relation_set([movie_companies()]), &criteria);
        assert!(matches!(result, Err(YannakakisError::Configuration(_))));
    }

    #[test]
    fn test_criteria_from_json() {
        let criteria: SelectionCriteria = serde_json::from_str(
            r#"{"movie_companies": [
                {"column": "note", "operator": "like", "value": "%(co-production)%"},
                {"column": "company_type_id", "operator": "IN", "value": [0, 1]}
            ]}"#,
        )
        .unwrap();
        let filtered = apply_selections(relation_set([movie_companies()]), &criteria).unwrap();
        // co-production notes sit on ids 1, 3 and 5; id 3 has company type 2
        assert_eq!(filtered["movie_companies"].len(), 2);
    }
}
