//! The query processor: the three-phase pipeline that turns a
//! [`crate::Dataset`] and a [`crate::Query`] into a [`Resultset`].
//!
//! Phases run strictly in order — bucketize, gap-fill, sort-and-measure —
//! with the first hard error aborting the whole run. Intermediate state
//! lives in [`WorkingBucket`], keyed by an [`IndexMap`] for O(1) lookup
//! during bucketize while still remembering first-insertion order for
//! levels that never get an explicit `sort_options`.

use chrono::DateTime;
use chrono_tz::Tz;
use indexmap::IndexMap;
use serde_json::Value;

use crate::cell::FieldType;
use crate::dataset::Dataset;
use crate::datetime;
use crate::error::{AggroError, AggroResult};
use crate::model::{Bucket, DatetimeOptions, Query, RangeOptions};
use crate::range;
use crate::resultset::{ResultBucket, Resultset};
use crate::sort;

/// Scratch per-level group, discarded once [`QueryProcessor::run`] returns.
struct WorkingBucket {
    value: String,
    children: IndexMap<String, WorkingBucket>,
    row_indices: Vec<usize>,
    is_tip: bool,
}

impl WorkingBucket {
    fn new(value: String) -> Self {
        Self {
            value,
            children: IndexMap::new(),
            row_indices: Vec::new(),
            is_tip: false,
        }
    }
}

/// The core aggregation pipeline. Stateless — all mutable state lives in
/// the [`WorkingBucket`] tree built and torn down within a single
/// [`QueryProcessor::run`] call.
pub struct QueryProcessor;

impl QueryProcessor {
    pub fn run(dataset: &Dataset, query: &Query) -> AggroResult<Resultset> {
        let all_rows: Vec<usize> = (0..dataset.rows.len()).collect();
        let mut top: IndexMap<String, WorkingBucket> = IndexMap::new();
        bucketize_level(&all_rows, dataset, &query.root, &mut top)?;
        gap_fill_level(&query.root, &mut top);
        let buckets = sort_and_measure(dataset, query, &query.root, &mut top)?;
        Ok(Resultset { buckets })
    }
}

/// Resolve a row's grouping key for one bucket level. `Ok(None)` means
/// "skip this row for this subtree" (missing cell, or a numeric value
/// below every range threshold) — not an error.
fn resolve_key(cell: &crate::cell::Cell, bucket_spec: &Bucket) -> AggroResult<Option<String>> {
    use crate::cell::Cell;
    if !cell.is_groupable() {
        return Err(AggroError::NonAggregatableCell {
            field: bucket_spec.field.name.clone(),
        });
    }
    match cell {
        Cell::String(s) => Ok(Some(s.clone())),
        Cell::Boolean(_) => unreachable!("is_groupable rejects Cell::Boolean above"),
        Cell::Datetime(instant) => {
            let options = bucket_spec
                .datetime_options
                .as_ref()
                .ok_or_else(|| AggroError::MissingDatetimeOptions {
                    field: bucket_spec.field.name.clone(),
                })?;
            Ok(Some(datetime::truncate_rfc3339(
                *instant,
                options.period,
                options.location,
            )))
        }
        Cell::Number(value) => match &bucket_spec.range_options {
            Some(options) => Ok(range::band(*value, &options.thresholds).map(|b| b.to_string())),
            None => Err(AggroError::NonAggregatableCell {
                field: bucket_spec.field.name.clone(),
            }),
        },
    }
}

fn bucketize_level(
    rows: &[usize],
    dataset: &Dataset,
    bucket_spec: &Bucket,
    out: &mut IndexMap<String, WorkingBucket>,
) -> AggroResult<()> {
    for &row_index in rows {
        let Some(cell) = dataset.rows[row_index].get(&bucket_spec.field.name) else {
            continue;
        };
        let Some(key) = resolve_key(cell, bucket_spec)? else {
            continue;
        };
        let entry = out
            .entry(key.clone())
            .or_insert_with(|| WorkingBucket::new(key));
        entry.row_indices.push(row_index);
        if bucket_spec.is_leaf() {
            entry.is_tip = true;
        }
    }
    if let Some(nested) = &bucket_spec.nested {
        for child in out.values_mut() {
            bucketize_level(&child.row_indices, dataset, nested, &mut child.children)?;
        }
    }
    Ok(())
}

fn gap_fill_level(bucket_spec: &Bucket, children: &mut IndexMap<String, WorkingBucket>) {
    match bucket_spec.field.field_type {
        FieldType::Datetime => {
            if let Some(options) = &bucket_spec.datetime_options {
                date_gap_fill(bucket_spec, options, children);
            }
        }
        FieldType::Number => {
            if let Some(options) = &bucket_spec.range_options {
                range_gap_fill(options, children);
            }
        }
        FieldType::String | FieldType::Boolean => {}
    }
    if let Some(nested) = &bucket_spec.nested {
        for child in children.values_mut() {
            gap_fill_level(nested, &mut child.children);
        }
    }
}

fn parse_truncated_key(key: &str, location: Tz) -> DateTime<Tz> {
    DateTime::parse_from_rfc3339(key)
        .expect("gap-fill keys are produced by truncate_rfc3339 and are always valid RFC3339")
        .with_timezone(&location)
}

fn date_gap_fill(
    bucket_spec: &Bucket,
    options: &DatetimeOptions,
    children: &mut IndexMap<String, WorkingBucket>,
) {
    let mut instants: Vec<DateTime<Tz>> = children
        .keys()
        .map(|key| parse_truncated_key(key, options.location))
        .collect();
    if let Some(start) = options.start {
        instants.push(datetime::truncate(start, options.period, options.location));
    }
    if let Some(end) = options.end {
        instants.push(datetime::truncate(end, options.period, options.location));
    }
    let (Some(&lower), Some(&upper)) = (instants.iter().min(), instants.iter().max()) else {
        return;
    };
    let is_leaf = bucket_spec.is_leaf();
    let mut cursor = lower;
    while cursor <= upper {
        let key = cursor.to_rfc3339();
        children.entry(key.clone()).or_insert_with(|| {
            let mut bucket = WorkingBucket::new(key);
            bucket.is_tip = is_leaf;
            bucket
        });
        cursor = datetime::advance(cursor, options.period);
    }
}

fn range_gap_fill(options: &RangeOptions, children: &mut IndexMap<String, WorkingBucket>) {
    for threshold in &options.thresholds {
        let key = threshold.to_string();
        children
            .entry(key.clone())
            .or_insert_with(|| WorkingBucket::new(key));
    }
}

fn sort_and_measure(
    dataset: &Dataset,
    query: &Query,
    bucket_spec: &Bucket,
    children: &mut IndexMap<String, WorkingBucket>,
) -> AggroResult<Vec<ResultBucket>> {
    let mut entries: Vec<WorkingBucket> = children.drain(..).map(|(_, bucket)| bucket).collect();
    sort::sort_by_value(&mut entries, bucket_spec.sort.as_ref(), |wb| wb.value.as_str());

    let mut results = Vec::with_capacity(entries.len());
    for mut working in entries {
        let nested_results = match &bucket_spec.nested {
            Some(nested) => sort_and_measure(dataset, query, nested, &mut working.children)?,
            None => Vec::new(),
        };
        let metrics = if working.is_tip {
            Some(measure_tip(dataset, query, &working)?)
        } else {
            None
        };
        results.push(ResultBucket {
            value: working.value,
            metrics,
            children: nested_results,
        });
    }
    Ok(results)
}

fn measure_tip(
    dataset: &Dataset,
    query: &Query,
    working: &WorkingBucket,
) -> AggroResult<IndexMap<String, Value>> {
    let mut out = IndexMap::new();
    for metric in &query.metrics {
        let mut measurer = crate::metrics::measurer_for(metric.kind);
        for &row_index in &working.row_indices {
            if let Some(cell) = dataset.rows[row_index].get(&metric.field) {
                if !cell.is_metricable(metric.kind) {
                    return Err(AggroError::NonMetricableCell {
                        field: metric.field.clone(),
                        metric: metric.raw_type.clone(),
                    });
                }
                measurer.add(cell);
            }
        }
        out.insert(metric.result_key(), measurer.result());
    }
    Ok(out)
}
