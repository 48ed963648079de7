//! Crate-wide error type.
//!
//! Mirrors the teacher crate's per-subsystem error enums (see
//! `worker::WorkerError` in the retrieval pack this crate grew out of): one
//! `thiserror`-derived enum, one variant per failure mode, each carrying
//! whatever context makes the message actionable.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type AggroResult<T> = Result<T, AggroError>;

/// Everything that can go wrong building a [`crate::Dataset`], running a
/// [`crate::Query`], or tabulating a [`crate::Resultset`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AggroError {
    /// A raw value's runtime type does not match its field's declared type.
    #[error("row {row}, field {field}: expected {expected}, got {got}")]
    SchemaMismatch {
        row: usize,
        field: String,
        expected: &'static str,
        got: String,
    },

    /// A datetime field received a string that isn't valid RFC3339.
    #[error("row {row}, field {field}: invalid RFC3339 datetime string: {value}")]
    InvalidDatetimeString {
        row: usize,
        field: String,
        value: String,
    },

    /// A declared field was absent from a raw row at add-time.
    #[error("row {row}: missing data for field {field}")]
    MissingField { row: usize, field: String },

    /// A query was constructed with no root bucket.
    #[error("query has no root bucket")]
    MissingBucket,

    /// A datetime bucket has no `datetime_options`.
    #[error("bucket on field {field} has no datetime options")]
    MissingDatetimeOptions { field: String },

    /// A cell was used as a grouping key but cannot be grouped on: either a
    /// number without `range_options`, or a type that never groups
    /// (booleans), or a datetime bucket missing its timezone/period.
    #[error("non-aggregatable cell at field {field}")]
    NonAggregatableCell { field: String },

    /// A metric was applied to a cell type that doesn't support it.
    #[error("metric {metric} cannot consume field {field}")]
    NonMetricableCell { field: String, metric: String },

    /// An unrecognized datetime period string.
    #[error("unknown period: {0}")]
    UnknownPeriod(String),

    /// An unrecognized metric type string.
    #[error("unknown metric: {0}")]
    UnknownMetric(String),

    /// An unrecognized sort type string.
    #[error("unknown sort type: {0}")]
    UnknownSort(String),

    /// `RangeOptions::new` was given an empty or non-ascending threshold
    /// list. Not part of the original source's taxonomy, but the
    /// specification calls out ascending-and-nonempty as an invariant;
    /// this surfaces it at construction instead of mid-query.
    #[error("range thresholds must be non-empty and ascending: {0}")]
    InvalidRange(String),

    /// `tabulate` was called with `target_depth < 1`.
    #[error("target depth must be at least 1, got {0}")]
    TargetDepthTooLow(usize),

    /// `tabulate` hit a leaf shallower than the requested `target_depth`.
    #[error("result tree is shallower than the requested target depth")]
    TargetDepthNotReached,
}
