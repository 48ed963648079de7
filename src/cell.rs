//! Typed cell values and the field schema they're bound to.
//!
//! A [`Cell`] is the typed runtime value behind one field of one row. Cells
//! expose two capability predicates rather than dynamic type checks —
//! [`Cell::is_groupable`] ("can a bucket key me?") and
//! [`Cell::is_metricable`] ("can this metric consume me?") — so the query
//! processor never needs to downcast.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AggroError, AggroResult};
use crate::metrics::MetricKind;

/// The declared type of a [`Field`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Datetime,
    Boolean,
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Datetime => "datetime",
            FieldType::Boolean => "boolean",
        };
        write!(f, "{s}")
    }
}

/// A named, typed column in a [`crate::Table`]. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

impl Field {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }
}

/// A typed value bound to a [`Field`]. Invariant: a cell's variant always
/// matches the field type that produced it — enforced by [`Cell::from_json`]
/// being the only constructor `Dataset::add_rows` uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    String(String),
    Number(Decimal),
    Datetime(DateTime<Utc>),
    Boolean(bool),
}

impl Cell {
    /// Parse a raw JSON value into a cell of the given field's declared
    /// type. `row` is only used to annotate errors.
    pub fn from_json(row: usize, field: &Field, value: &Value) -> AggroResult<Cell> {
        match field.field_type {
            FieldType::String => match value {
                Value::String(s) => Ok(Cell::String(s.clone())),
                other => Err(schema_mismatch(row, field, "string", other)),
            },
            FieldType::Boolean => match value {
                Value::Bool(b) => Ok(Cell::Boolean(*b)),
                other => Err(schema_mismatch(row, field, "boolean", other)),
            },
            FieldType::Number => match value {
                Value::Number(n) => {
                    let f = n.as_f64().ok_or_else(|| {
                        schema_mismatch(row, field, "number", &Value::Number(n.clone()))
                    })?;
                    Ok(Cell::Number(
                        Decimal::from_f64_retain(f).unwrap_or(Decimal::ZERO),
                    ))
                }
                other => Err(schema_mismatch(row, field, "number", other)),
            },
            FieldType::Datetime => match value {
                Value::String(s) => {
                    let dt = DateTime::parse_from_rfc3339(s).map_err(|_| {
                        AggroError::InvalidDatetimeString {
                            row,
                            field: field.name.clone(),
                            value: s.clone(),
                        }
                    })?;
                    Ok(Cell::Datetime(dt.with_timezone(&Utc)))
                }
                Value::Number(n) => {
                    let secs = n.as_f64().ok_or_else(|| {
                        schema_mismatch(row, field, "datetime", &Value::Number(n.clone()))
                    })?;
                    let dt = DateTime::from_timestamp(secs.trunc() as i64, 0)
                        .ok_or_else(|| AggroError::InvalidDatetimeString {
                            row,
                            field: field.name.clone(),
                            value: n.to_string(),
                        })?;
                    Ok(Cell::Datetime(dt))
                }
                other => Err(schema_mismatch(row, field, "datetime (RFC3339 string or epoch seconds)", other)),
            },
        }
    }

    /// Whether a bucket may group rows by this cell's value on its own
    /// (without further context such as `range_options`).
    pub fn is_groupable(&self) -> bool {
        !matches!(self, Cell::Boolean(_))
    }

    /// Whether the given metric kind may consume this cell.
    pub fn is_metricable(&self, kind: MetricKind) -> bool {
        match self {
            Cell::Number(_) => true,
            Cell::String(_) => matches!(kind, MetricKind::Cardinality | MetricKind::Count),
            Cell::Boolean(_) => matches!(kind, MetricKind::Count),
            Cell::Datetime(_) => false,
        }
    }

    pub fn field_type(&self) -> FieldType {
        match self {
            Cell::String(_) => FieldType::String,
            Cell::Number(_) => FieldType::Number,
            Cell::Datetime(_) => FieldType::Datetime,
            Cell::Boolean(_) => FieldType::Boolean,
        }
    }
}

fn schema_mismatch(row: usize, field: &Field, expected: &'static str, got: &Value) -> AggroError {
    AggroError::SchemaMismatch {
        row,
        field: field.name.clone(),
        expected,
        got: describe(got),
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(_) => "boolean".to_string(),
        Value::Number(_) => "number".to_string(),
        Value::String(_) => "string".to_string(),
        Value::Array(_) => "array".to_string(),
        Value::Object(_) => "object".to_string(),
    }
}

/// Convert a `Decimal` to an `f64`-backed JSON number, falling back to
/// `null` on the (practically unreachable) conversion failure.
pub(crate) fn decimal_to_json(d: Decimal) -> Value {
    d.to_f64()
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}
