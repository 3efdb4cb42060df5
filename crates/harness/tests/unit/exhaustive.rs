//! # Exhaustive Enumeration Tests
//!
//! Order, repetition, counts and depth modes of the product-with-repetition generator.

use crate::common::fixtures::{configuration, trace_names, traces};
use pagediff_core::common::ArgumentTuple;
use pagediff_core::config::DepthMode;
use pagediff_core::enumerate::ExhaustivePlan;
use pretty_assertions::assert_eq;
use rstest::rstest;

fn collect(names: &[&str], k: usize, depth: DepthMode) -> Vec<ArgumentTuple> {
    let files = traces(names);
    let plan = ExhaustivePlan::new(configuration(8, 20), &files, k, depth);
    plan.iter().collect()
}

#[test]
fn test_single_trace_depth_yields_each_trace() {
    let tuples = collect(&["t1", "t2"], 1, DepthMode::Exact);
    assert_eq!(trace_names(&tuples), vec![vec!["t1"], vec!["t2"]]);
}

#[test]
fn test_cumulative_includes_empty_tuple_first() {
    let tuples = collect(&["t1", "t2"], 1, DepthMode::Cumulative);
    assert_eq!(
        trace_names(&tuples),
        vec![vec![], vec!["t1".to_string()], vec!["t2".to_string()]]
    );
}

#[test]
fn test_order_matches_depth_first_descent() {
    let tuples = collect(&["a", "b", "c"], 2, DepthMode::Exact);
    assert_eq!(
        trace_names(&tuples),
        vec![
            vec!["a", "a"],
            vec!["a", "b"],
            vec!["a", "c"],
            vec!["b", "a"],
            vec!["b", "b"],
            vec!["b", "c"],
            vec!["c", "a"],
            vec!["c", "b"],
            vec!["c", "c"],
        ]
    );
}

#[test]
fn test_every_tuple_carries_configuration() {
    let tuples = collect(&["a", "b"], 3, DepthMode::Exact);
    assert!(tuples.iter().all(|t| t.configuration() == configuration(8, 20)));
}

#[rstest]
#[case(1, 0, 1)]
#[case(3, 1, 3)]
#[case(3, 2, 9)]
#[case(2, 4, 16)]
#[case(5, 3, 125)]
fn test_exact_count_is_t_pow_k(#[case] t: usize, #[case] k: usize, #[case] expected: u64) {
    let names: Vec<String> = (0..t).map(|i| format!("trace{i}")).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let files = traces(&refs);
    let plan = ExhaustivePlan::new(configuration(8, 20), &files, k, DepthMode::Exact);

    assert_eq!(plan.case_count(), Some(expected));
    assert_eq!(plan.iter().count() as u64, expected);
}

#[rstest]
#[case(2, 0, 1)]
#[case(2, 1, 3)]
#[case(3, 2, 13)]
#[case(2, 3, 15)]
fn test_cumulative_count_is_geometric_sum(
    #[case] t: usize,
    #[case] k: usize,
    #[case] expected: u64,
) {
    let names: Vec<String> = (0..t).map(|i| format!("trace{i}")).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let files = traces(&refs);
    let plan = ExhaustivePlan::new(configuration(8, 20), &files, k, DepthMode::Cumulative);

    assert_eq!(plan.case_count(), Some(expected));
    assert_eq!(plan.iter().count() as u64, expected);
}

#[test]
fn test_cumulative_lengths_are_non_decreasing() {
    let tuples = collect(&["a", "b"], 3, DepthMode::Cumulative);
    let lengths: Vec<usize> = tuples.iter().map(|t| t.traces().len()).collect();
    assert!(lengths.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(lengths.first(), Some(&0));
    assert_eq!(lengths.last(), Some(&3));
}

#[test]
fn test_zero_depth_yields_bare_configuration() {
    let tuples = collect(&["a", "b"], 0, DepthMode::Exact);
    assert_eq!(tuples.len(), 1);
    assert!(tuples[0].traces().is_empty());
}

#[test]
fn test_empty_trace_set_yields_bare_configuration_once() {
    for depth in [DepthMode::Exact, DepthMode::Cumulative] {
        let plan = ExhaustivePlan::new(configuration(8, 20), &[], 3, depth);
        let tuples: Vec<_> = plan.iter().collect();
        assert_eq!(tuples.len(), 1);
        assert!(tuples[0].traces().is_empty());
        assert_eq!(plan.case_count(), Some(1));
    }
}

#[test]
fn test_plan_is_restartable() {
    let files = traces(&["a", "b", "c"]);
    let plan = ExhaustivePlan::new(configuration(8, 20), &files, 2, DepthMode::Exact);
    let first: Vec<_> = plan.iter().collect();
    let second: Vec<_> = (&plan).into_iter().collect();
    assert_eq!(first, second);
}

#[test]
fn test_iterator_is_fused_after_exhaustion() {
    let files = traces(&["a"]);
    let plan = ExhaustivePlan::new(configuration(8, 20), &files, 2, DepthMode::Exact);
    let mut cases = plan.iter();
    assert!(cases.next().is_some());
    assert!(cases.next().is_none());
    assert!(cases.next().is_none());
}

#[test]
fn test_case_count_overflow_is_none() {
    let names: Vec<String> = (0..1000).map(|i| format!("t{i}")).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let files = traces(&refs);
    let plan = ExhaustivePlan::new(configuration(8, 20), &files, 10, DepthMode::Exact);
    assert_eq!(plan.case_count(), None);
}
