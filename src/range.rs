//! Numeric range banding.
//!
//! The upstream Go source's range-truncation loop had an off-by-one
//! (`len(period) < i` is never true, so the lookahead to the next
//! threshold never fires) whose net effect was "return the current band
//! once it's >= value", which only coincidentally matches "largest
//! threshold <= value" for well-formed ascending lists. This is
//! reimplemented directly from the cleaner definition in `SPEC_FULL.md`
//! §4.2 rather than ported bug-for-bug.

use rust_decimal::Decimal;

/// Return the largest threshold `<= value`, or `None` if `value` is below
/// every threshold (the row is dropped from that bucket).
pub fn band(value: Decimal, thresholds: &[Decimal]) -> Option<Decimal> {
    thresholds.iter().copied().filter(|t| *t <= value).max()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn thresholds() -> Vec<Decimal> {
        vec![dec!(20000), dec!(50000), dec!(100000), dec!(150000), dec!(200000), dec!(300000)]
    }

    #[test]
    fn bands_to_largest_threshold_at_or_below() {
        assert_eq!(band(dec!(120000), &thresholds()), Some(dec!(100000)));
        assert_eq!(band(dec!(160000), &thresholds()), Some(dec!(150000)));
    }

    #[test]
    fn value_exactly_on_threshold_wins() {
        assert_eq!(band(dec!(100000), &thresholds()), Some(dec!(100000)));
    }

    #[test]
    fn value_below_all_thresholds_has_no_band() {
        assert_eq!(band(dec!(10000), &thresholds()), None);
    }
}
