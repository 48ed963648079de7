//! Flattens a [`Resultset`] tree into a dense two-dimensional matrix by
//! splitting each leaf's ancestor path at a chosen depth.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AggroError, AggroResult};
use crate::resultset::{ResultBucket, Resultset};

/// A dense row/column matrix produced by [`tabulate`]. `rows[r][c]` holds
/// the metrics of the leaf at `row_titles[r] ++ column_titles[c]`, or
/// `None` if that combination was never observed in the source tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultTable {
    pub rows: Vec<Vec<Option<IndexMap<String, Value>>>>,
    pub row_titles: Vec<Vec<String>>,
    pub column_titles: Vec<Vec<String>>,
}

/// Split every leaf path in `resultset` at `target_depth`: the first
/// `target_depth` values become the row coordinate, the rest the column
/// coordinate. Row and column coordinates are collected in first-seen
/// (depth-first) order.
pub fn tabulate(resultset: &Resultset, target_depth: usize) -> AggroResult<ResultTable> {
    if target_depth < 1 {
        return Err(AggroError::TargetDepthTooLow(target_depth));
    }

    let mut row_order: IndexMap<Vec<String>, ()> = IndexMap::new();
    let mut column_order: IndexMap<Vec<String>, ()> = IndexMap::new();
    let mut cells: HashMap<(Vec<String>, Vec<String>), IndexMap<String, Value>> = HashMap::new();
    let mut path = Vec::new();

    walk(
        &resultset.buckets,
        &mut path,
        target_depth,
        &mut row_order,
        &mut column_order,
        &mut cells,
    )?;

    let row_titles: Vec<Vec<String>> = row_order.into_keys().collect();
    let column_titles: Vec<Vec<String>> = column_order.into_keys().collect();
    let rows = row_titles
        .iter()
        .map(|row_coord| {
            column_titles
                .iter()
                .map(|col_coord| cells.get(&(row_coord.clone(), col_coord.clone())).cloned())
                .collect()
        })
        .collect();

    Ok(ResultTable {
        rows,
        row_titles,
        column_titles,
    })
}

fn walk(
    buckets: &[ResultBucket],
    path: &mut Vec<String>,
    target_depth: usize,
    row_order: &mut IndexMap<Vec<String>, ()>,
    column_order: &mut IndexMap<Vec<String>, ()>,
    cells: &mut HashMap<(Vec<String>, Vec<String>), IndexMap<String, Value>>,
) -> AggroResult<()> {
    for bucket in buckets {
        path.push(bucket.value.clone());
        if bucket.children.is_empty() {
            if path.len() < target_depth {
                return Err(AggroError::TargetDepthNotReached);
            }
            let row_coord = path[..target_depth].to_vec();
            let column_coord = path[target_depth..].to_vec();
            row_order.entry(row_coord.clone()).or_insert(());
            column_order.entry(column_coord.clone()).or_insert(());
            if let Some(metrics) = &bucket.metrics {
                cells.insert((row_coord, column_coord), metrics.clone());
            }
        } else {
            walk(&bucket.children, path, target_depth, row_order, column_order, cells)?;
        }
        path.pop();
    }
    Ok(())
}
