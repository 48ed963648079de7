//! Result-side tree produced by running a [`crate::Query`] against a
//! [`crate::Dataset`].

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One node in the result tree. Leaf ("tip") buckets carry a `metrics` map;
/// intermediate buckets carry `children` instead. `value` is the canonical
/// formatted key — the raw string for string buckets, an RFC3339 timestamp
/// for date buckets, or a decimal string for range bands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultBucket {
    pub value: String,
    pub metrics: Option<IndexMap<String, Value>>,
    pub children: Vec<ResultBucket>,
}

impl ResultBucket {
    pub fn is_tip(&self) -> bool {
        self.metrics.is_some()
    }
}

/// The output of [`crate::Dataset::run`]: the top-level buckets of the
/// result tree, already sorted and measured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resultset {
    pub buckets: Vec<ResultBucket>,
}
