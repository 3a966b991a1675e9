//! Property tests for rule consolidation.
//!
//! Rules are generated from small alphabets so that collisions between
//! `(api group, resource)` pairs are frequent.

use proptest::prelude::*;
use rbac_model::{consolidate, PermissionRule, VerbSet};
use std::collections::{BTreeMap, BTreeSet};

fn api_group() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("CORE".to_string()),
        Just("apps".to_string()),
        Just("batch".to_string()),
        Just("*".to_string()),
    ]
}

fn resource() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("pods".to_string()),
        Just("secrets".to_string()),
        Just("deployments".to_string()),
        Just("jobs".to_string()),
    ]
}

fn verb() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("get".to_string()),
        Just("list".to_string()),
        Just("watch".to_string()),
        Just("create".to_string()),
        Just("delete".to_string()),
        Just("deletecollection".to_string()),
        Just("patch".to_string()),
        Just("update".to_string()),
        Just("bind".to_string()),
    ]
}

fn rule() -> impl Strategy<Value = PermissionRule> {
    (
        prop::collection::vec(api_group(), 0..3),
        prop::collection::vec(resource(), 1..3),
        prop::collection::vec("[a-c]", 0..2),
        prop::collection::vec(verb(), 1..6),
    )
        .prop_map(|(groups, resources, names, verbs)| {
            PermissionRule::new(groups, resources, verbs).with_resource_names(names)
        })
}

fn triples(rules: &[PermissionRule]) -> BTreeSet<(String, String, Vec<String>)> {
    rules
        .iter()
        .map(|r| (r.api_groups[0].clone(), r.resources[0].clone(), r.verbs.clone()))
        .collect()
}

proptest! {
    #[test]
    fn consolidation_is_a_fixed_point(rules in prop::collection::vec(rule(), 0..8)) {
        let once = consolidate(&rules);
        let twice = consolidate(&once);
        prop_assert_eq!(triples(&once), triples(&twice));
    }

    #[test]
    fn consolidated_rules_are_single_valued_and_unique(rules in prop::collection::vec(rule(), 0..8)) {
        let merged = consolidate(&rules);
        let mut seen = BTreeSet::new();
        for rule in &merged {
            prop_assert_eq!(rule.api_groups.len(), 1);
            prop_assert_eq!(rule.resources.len(), 1);
            prop_assert!(!rule.verbs.is_empty());
            prop_assert!(rule.resource_names.is_empty());
            prop_assert!(!rule.api_groups[0].is_empty());
            prop_assert!(seen.insert((rule.api_groups[0].clone(), rule.resources[0].clone())));
        }
    }

    #[test]
    fn full_vocabulary_collapses_to_wildcard(rules in prop::collection::vec(rule(), 0..8)) {
        // Recompute the accumulated verbs independently of the consolidator.
        let mut expected: BTreeMap<(String, String), VerbSet> = BTreeMap::new();
        for rule in &rules {
            let groups = rule.normalized_api_groups();
            for group in groups {
                for res in &rule.resources {
                    let res = match rule.resource_names.first() {
                        Some(name) => format!("{}.{}", res, name),
                        None => res.clone(),
                    };
                    expected.entry((group.clone(), res)).or_default().extend(rule.verbs.iter().cloned());
                }
            }
        }

        let merged = consolidate(&rules);
        prop_assert_eq!(merged.len(), expected.len());
        for rule in &merged {
            let key = (rule.api_groups[0].clone(), rule.resources[0].clone());
            let verbs = &expected[&key];
            if verbs.covers_all() {
                prop_assert_eq!(&rule.verbs, &vec!["*".to_string()]);
            } else {
                let mut sorted = rule.verbs.clone();
                sorted.sort();
                prop_assert_eq!(&rule.verbs, &sorted);
            }
        }
    }
}
