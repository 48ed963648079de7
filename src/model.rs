//! Query-side data model: the recursive bucket specification, metrics,
//! and the table schema rows are validated against.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::cell::Field;
use crate::datetime::DatetimePeriod;
use crate::error::{AggroError, AggroResult};
use crate::metrics::MetricKind;
use crate::sort::SortOptions;

/// A dataset's fixed column schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub fields: Vec<Field>,
}

impl Table {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Configuration for a datetime bucket level. `location` fixes the
/// timezone truncation and enumeration both happen in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatetimeOptions {
    pub period: DatetimePeriod,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub location: Tz,
}

impl DatetimeOptions {
    pub fn new(period: DatetimePeriod, location: Tz) -> Self {
        Self {
            period,
            start: None,
            end: None,
            location,
        }
    }

    pub fn with_start(mut self, start: DateTime<Utc>) -> Self {
        self.start = Some(start);
        self
    }

    pub fn with_end(mut self, end: DateTime<Utc>) -> Self {
        self.end = Some(end);
        self
    }
}

/// Configuration for a numeric range bucket level: an ascending list of
/// band thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeOptions {
    pub thresholds: Vec<Decimal>,
}

impl RangeOptions {
    /// Validates thresholds are non-empty and strictly ascending.
    pub fn new(thresholds: Vec<Decimal>) -> AggroResult<Self> {
        if thresholds.is_empty() {
            return Err(AggroError::InvalidRange("thresholds must not be empty".into()));
        }
        if thresholds.windows(2).any(|w| w[0] >= w[1]) {
            return Err(AggroError::InvalidRange(
                "thresholds must be strictly ascending".into(),
            ));
        }
        Ok(Self { thresholds })
    }
}

/// One level of a recursive bucket specification.
///
/// Invariants (enforced by the query processor at bucketize time, not at
/// construction, matching the source's runtime-checked behavior): if
/// `field.field_type` is `Datetime`, `datetime_options` must be set; if it
/// is `Number` and this level groups rows (rather than just measuring),
/// `range_options` must be set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bucket {
    pub field: Field,
    pub nested: Option<Box<Bucket>>,
    pub datetime_options: Option<DatetimeOptions>,
    pub range_options: Option<RangeOptions>,
    pub sort: Option<SortOptions>,
}

impl Bucket {
    pub fn new(field: Field) -> Self {
        Self {
            field,
            nested: None,
            datetime_options: None,
            range_options: None,
            sort: None,
        }
    }

    pub fn nested(mut self, bucket: Bucket) -> Self {
        self.nested = Some(Box::new(bucket));
        self
    }

    pub fn with_datetime_options(mut self, options: DatetimeOptions) -> Self {
        self.datetime_options = Some(options);
        self
    }

    pub fn with_range_options(mut self, options: RangeOptions) -> Self {
        self.range_options = Some(options);
        self
    }

    pub fn with_sort(mut self, sort: SortOptions) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.nested.is_none()
    }
}

/// `{type, field}` — identifies a measurer and the numeric column it
/// consumes. `field` is ignored by `count`, which only counts rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    /// The metric type string as given by the caller (e.g. `"avg"`),
    /// preserved verbatim for the `"<field>:<type>"` result key.
    pub raw_type: String,
    pub kind: MetricKind,
    pub field: String,
}

impl Metric {
    /// Parse a metric type string (`"mean"`, `"avg"`, `"median"`, ...)
    /// against a field name.
    pub fn new(metric_type: impl Into<String>, field: impl Into<String>) -> AggroResult<Self> {
        let raw_type = metric_type.into();
        let kind = MetricKind::from_str(&raw_type)?;
        Ok(Self {
            raw_type,
            kind,
            field: field.into(),
        })
    }

    pub fn result_key(&self) -> String {
        format!("{}:{}", self.field, self.raw_type)
    }
}

/// A query: a recursive bucket tree plus the metrics computed at its
/// leaves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Query {
    pub root: Bucket,
    pub metrics: Vec<Metric>,
}

impl Query {
    /// `root` must be `Some` — a query with no root bucket is a hard error,
    /// matching `AggroError::MissingBucket` from the original taxonomy.
    pub fn new(root: Option<Bucket>, metrics: Vec<Metric>) -> AggroResult<Self> {
        let root = root.ok_or(AggroError::MissingBucket)?;
        Ok(Self { root, metrics })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::FieldType;
    use rust_decimal_macros::dec;

    #[test]
    fn range_options_rejects_empty() {
        assert!(RangeOptions::new(vec![]).is_err());
    }

    #[test]
    fn range_options_rejects_non_ascending() {
        assert!(RangeOptions::new(vec![dec!(10), dec!(5)]).is_err());
        assert!(RangeOptions::new(vec![dec!(10), dec!(10)]).is_err());
    }

    #[test]
    fn range_options_accepts_ascending() {
        assert!(RangeOptions::new(vec![dec!(10), dec!(20)]).is_ok());
    }

    #[test]
    fn query_requires_root_bucket() {
        let err = Query::new(None, vec![]).unwrap_err();
        assert!(matches!(err, AggroError::MissingBucket));
    }

    #[test]
    fn query_with_root_succeeds() {
        let root = Bucket::new(Field::new("location", FieldType::String));
        let query = Query::new(Some(root), vec![]).unwrap();
        assert_eq!(query.root.field.name, "location");
    }

    #[test]
    fn metric_result_key_preserves_raw_type() {
        let m = Metric::new("avg", "salary").unwrap();
        assert_eq!(m.result_key(), "salary:avg");
        assert_eq!(m.kind, MetricKind::Mean);
    }

    #[test]
    fn metric_rejects_unknown_type() {
        assert!(Metric::new("bogus", "salary").is_err());
    }
}
