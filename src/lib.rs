//! # aggro
//!
//! An in-memory tabular aggregation engine: nested bucket queries over
//! typed rows, with decimal-precision statistical metrics and a
//! cross-tab flattening stage.
//!
//! ## Pipeline
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │              Dataset (Table schema + typed Rows)         │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [Dataset::run(Query)]
//! ┌─────────────────────────────────────────────────────────┐
//! │   QueryProcessor: bucketize → gap-fill → sort & measure   │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │                      Resultset                            │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [tabulate(depth)]
//! ┌─────────────────────────────────────────────────────────┐
//! │                     ResultTable                           │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! A query is a recursive [`Bucket`] tree plus a list of [`Metric`]s
//! computed at its leaves. Buckets group rows by a string value, a
//! datetime truncated to a period (`DatetimeOptions`), or a numeric range
//! band (`RangeOptions`). Running a query against a [`Dataset`] produces a
//! [`Resultset`]; flattening that tree at a chosen depth with
//! [`tabulate`] produces a dense [`ResultTable`].

pub mod cell;
pub mod dataset;
pub mod datetime;
pub mod error;
pub mod metrics;
pub mod model;
pub mod processor;
pub mod range;
pub mod resultset;
pub mod sort;
pub mod tabulate;

pub use cell::{Cell, Field, FieldType};
pub use dataset::{Dataset, Row};
pub use datetime::DatetimePeriod;
pub use error::{AggroError, AggroResult};
pub use metrics::MetricKind;
pub use model::{Bucket, DatetimeOptions, Metric, Query, RangeOptions, Table};
pub use processor::QueryProcessor;
pub use resultset::{ResultBucket, Resultset};
pub use sort::{SortKind, SortOptions};
pub use tabulate::{tabulate, ResultTable};

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::cell::{Cell, Field, FieldType};
    pub use crate::dataset::{Dataset, Row};
    pub use crate::datetime::DatetimePeriod;
    pub use crate::error::{AggroError, AggroResult};
    pub use crate::metrics::MetricKind;
    pub use crate::model::{Bucket, DatetimeOptions, Metric, Query, RangeOptions, Table};
    pub use crate::resultset::{ResultBucket, Resultset};
    pub use crate::sort::{SortKind, SortOptions};
    pub use crate::tabulate::{tabulate, ResultTable};
}
