//! The row store a [`crate::Query`] runs against.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::cell::Cell;
use crate::error::{AggroError, AggroResult};
use crate::model::{Query, Table};
use crate::processor::QueryProcessor;
use crate::resultset::Resultset;

/// One parsed row: field name to typed cell. A field the table declares but
/// a given row omits (explicit JSON `null`) has no entry here — buckets
/// that group on it skip the row rather than erroring.
pub type Row = HashMap<String, Cell>;

/// A fixed-schema, append-only row store.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub table: Table,
    pub rows: Vec<Row>,
}

impl Dataset {
    pub fn new(table: Table) -> Self {
        Self {
            table,
            rows: Vec::new(),
        }
    }

    /// Parse and append raw JSON rows against the dataset's schema.
    ///
    /// A field entirely missing from a raw row is a hard
    /// [`AggroError::MissingField`]; an explicit `null` is accepted and
    /// simply produces no cell for that row. Appending is all-or-nothing —
    /// on the first row/field error, no rows from this call are added.
    pub fn add_rows(&mut self, raw_rows: &[Map<String, Value>]) -> AggroResult<()> {
        let mut parsed = Vec::with_capacity(raw_rows.len());
        for (offset, raw) in raw_rows.iter().enumerate() {
            let row_index = self.rows.len() + offset;
            let mut row = Row::new();
            for field in &self.table.fields {
                match raw.get(&field.name) {
                    None => {
                        return Err(AggroError::MissingField {
                            row: row_index,
                            field: field.name.clone(),
                        })
                    }
                    Some(Value::Null) => {}
                    Some(value) => {
                        row.insert(field.name.clone(), Cell::from_json(row_index, field, value)?);
                    }
                }
            }
            parsed.push(row);
        }
        self.rows.extend(parsed);
        Ok(())
    }

    /// Run a query against this dataset's current rows.
    pub fn run(&self, query: &Query) -> AggroResult<Resultset> {
        QueryProcessor::run(self, query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{Field, FieldType};

    fn table() -> Table {
        Table::new(vec![
            Field::new("location", FieldType::String),
            Field::new("salary", FieldType::Number),
        ])
    }

    fn row(location: &str, salary: i64) -> Map<String, Value> {
        let mut m = Map::new();
        m.insert("location".into(), Value::String(location.into()));
        m.insert("salary".into(), Value::from(salary));
        m
    }

    #[test]
    fn add_rows_parses_and_appends() {
        let mut dataset = Dataset::new(table());
        dataset.add_rows(&[row("Auckland", 120000)]).unwrap();
        assert_eq!(dataset.rows.len(), 1);
        assert_eq!(
            dataset.rows[0].get("location"),
            Some(&Cell::String("Auckland".into()))
        );
    }

    #[test]
    fn add_rows_rejects_missing_field() {
        let mut dataset = Dataset::new(table());
        let mut raw = Map::new();
        raw.insert("location".into(), Value::String("Auckland".into()));
        let err = dataset.add_rows(&[raw]).unwrap_err();
        assert!(matches!(err, AggroError::MissingField { .. }));
    }

    #[test]
    fn add_rows_accepts_explicit_null() {
        let mut dataset = Dataset::new(table());
        let mut raw = row("Auckland", 0);
        raw.insert("salary".into(), Value::Null);
        dataset.add_rows(&[raw]).unwrap();
        assert!(dataset.rows[0].get("salary").is_none());
    }

    #[test]
    fn row_index_is_absolute_across_calls() {
        let mut dataset = Dataset::new(table());
        dataset.add_rows(&[row("Auckland", 1)]).unwrap();
        let mut raw = Map::new();
        raw.insert("location".into(), Value::String("Auckland".into()));
        let err = dataset.add_rows(&[raw]).unwrap_err();
        assert!(matches!(
            err,
            AggroError::MissingField { row: 1, .. }
        ));
    }
}
