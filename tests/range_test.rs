//! Integration tests for numeric range banding through the public API.

use aggro::range::band;
use rust_decimal_macros::dec;

fn thresholds() -> Vec<rust_decimal::Decimal> {
    vec![dec!(20000), dec!(50000), dec!(100000), dec!(150000), dec!(200000), dec!(300000)]
}

#[test]
fn bands_to_the_largest_threshold_at_or_below_value() {
    assert_eq!(band(dec!(120000), &thresholds()), Some(dec!(100000)));
}

#[test]
fn value_below_every_threshold_has_no_band() {
    assert_eq!(band(dec!(10000), &thresholds()), None);
}

#[test]
fn value_exactly_on_the_top_threshold_wins() {
    assert_eq!(band(dec!(300000), &thresholds()), Some(dec!(300000)));
}
