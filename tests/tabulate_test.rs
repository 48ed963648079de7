//! Integration tests for flattening a result tree into a matrix, covering
//! spec Scenario F and invariant 11.

use aggro::{tabulate, AggroError, ResultBucket, Resultset};
use indexmap::IndexMap;
use serde_json::json;

fn leaf(value: &str, max: f64) -> ResultBucket {
    let mut metrics = IndexMap::new();
    metrics.insert("salary:max".to_string(), json!(max));
    ResultBucket {
        value: value.to_string(),
        metrics: Some(metrics),
        children: Vec::new(),
    }
}

fn node(value: &str, children: Vec<ResultBucket>) -> ResultBucket {
    ResultBucket {
        value: value.to_string(),
        metrics: None,
        children,
    }
}

fn scenario_f_tree() -> Resultset {
    let a1 = node(
        "A1",
        vec![
            node("B1", vec![node("C1", vec![leaf("D1", 100.0)]), node("C2", vec![leaf("D1", 110.0)])]),
            node("B2", vec![node("C1", vec![leaf("D1", 120.0), leaf("D2", 130.0)])]),
        ],
    );
    let a2 = node("A2", vec![node("B3", vec![node("C2", vec![leaf("D1", 140.0)])])]);
    Resultset {
        buckets: vec![a1, a2],
    }
}

#[test]
fn scenario_f_deep_tree_tabulates_to_a_dense_3x3_matrix() {
    let resultset = scenario_f_tree();
    let table = tabulate(&resultset, 2).unwrap();

    assert_eq!(
        table.row_titles,
        vec![
            vec!["A1".to_string(), "B1".to_string()],
            vec!["A1".to_string(), "B2".to_string()],
            vec!["A2".to_string(), "B3".to_string()],
        ]
    );
    assert_eq!(
        table.column_titles,
        vec![
            vec!["C1".to_string(), "D1".to_string()],
            vec!["C2".to_string(), "D1".to_string()],
            vec!["C1".to_string(), "D2".to_string()],
        ]
    );

    assert_eq!(table.rows[0][0].as_ref().unwrap()["salary:max"], json!(100.0));
    assert_eq!(table.rows[0][1].as_ref().unwrap()["salary:max"], json!(110.0));
    assert!(table.rows[0][2].is_none());

    assert_eq!(table.rows[1][0].as_ref().unwrap()["salary:max"], json!(120.0));
    assert!(table.rows[1][1].is_none());
    assert_eq!(table.rows[1][2].as_ref().unwrap()["salary:max"], json!(130.0));

    assert!(table.rows[2][0].is_none());
    assert_eq!(table.rows[2][1].as_ref().unwrap()["salary:max"], json!(140.0));
    assert!(table.rows[2][2].is_none());
}

#[test]
fn target_depth_zero_is_rejected() {
    let resultset = scenario_f_tree();
    let err = tabulate(&resultset, 0).unwrap_err();
    assert!(matches!(err, AggroError::TargetDepthTooLow(0)));
}

#[test]
fn target_depth_deeper_than_the_tree_is_rejected() {
    let resultset = scenario_f_tree();
    let err = tabulate(&resultset, 10).unwrap_err();
    assert!(matches!(err, AggroError::TargetDepthNotReached));
}
