//! Integration tests for sort ordering through the public API, covering
//! invariant 5.

use aggro::{SortKind, SortOptions};
use aggro::sort::sort_by_value;

#[test]
fn alphabetical_ascending_is_lexicographic() {
    let mut values = vec!["Wellington".to_string(), "Auckland".to_string(), "Hamilton".to_string()];
    let options = SortOptions::new(SortKind::Alphabetical, false);
    sort_by_value(&mut values, Some(&options), |s| s.as_str());
    assert_eq!(values, vec!["Auckland", "Hamilton", "Wellington"]);
    let sorted = values.windows(2).all(|w| w[0] <= w[1]);
    assert!(sorted);
}

#[test]
fn numerical_descending_reverses_order() {
    let mut values = vec!["50000".to_string(), "200000".to_string(), "100000".to_string()];
    let options = SortOptions::new(SortKind::Numerical, true);
    sort_by_value(&mut values, Some(&options), |s| s.as_str());
    assert_eq!(values, vec!["200000", "100000", "50000"]);
}
