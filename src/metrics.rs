//! Metric kinds and the stateful per-metric accumulators ("measurers") that
//! compute them.
//!
//! Every measurer follows the same contract: `add` once per qualifying
//! source row, `result` once at the end. All summation accumulates in
//! [`Decimal`] and only coerces to `f64` at `result()` time, matching the
//! original implementation's use of arbitrary-precision decimals for
//! currency-safe aggregation.

use std::collections::HashMap;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cell::{decimal_to_json, Cell};
use crate::error::AggroError;

/// Which statistic a [`crate::Metric`] computes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricKind {
    Mean,
    Median,
    Mode,
    Min,
    Max,
    Sum,
    Stdev,
    Cardinality,
    Count,
}

impl FromStr for MetricKind {
    type Err = AggroError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mean" | "avg" => Ok(MetricKind::Mean),
            "median" => Ok(MetricKind::Median),
            "mode" => Ok(MetricKind::Mode),
            "min" => Ok(MetricKind::Min),
            "max" => Ok(MetricKind::Max),
            "sum" => Ok(MetricKind::Sum),
            "stdev" => Ok(MetricKind::Stdev),
            "cardinality" => Ok(MetricKind::Cardinality),
            "count" | "valueCount" => Ok(MetricKind::Count),
            other => Err(AggroError::UnknownMetric(other.to_string())),
        }
    }
}

/// A stateful, single-pass statistical accumulator.
pub trait Measurer {
    /// Feed one qualifying source row's cell into the accumulator.
    fn add(&mut self, cell: &Cell);
    /// Publish the final value. `null` for metrics with no well-defined
    /// result on zero input (mean/median/min/max/stdev); `0` for sum/count/
    /// cardinality on empty input; `[]` for mode on empty input.
    fn result(&self) -> Value;
}

/// Construct a fresh measurer for the given metric kind.
pub fn measurer_for(kind: MetricKind) -> Box<dyn Measurer> {
    match kind {
        MetricKind::Mean => Box::new(MeanMeasurer::default()),
        MetricKind::Median => Box::new(MedianMeasurer::default()),
        MetricKind::Mode => Box::new(ModeMeasurer::default()),
        MetricKind::Min => Box::new(ExtremeMeasurer::min()),
        MetricKind::Max => Box::new(ExtremeMeasurer::max()),
        MetricKind::Sum => Box::new(SumMeasurer::default()),
        MetricKind::Stdev => Box::new(StdevMeasurer::default()),
        MetricKind::Cardinality => Box::new(CardinalityMeasurer::default()),
        MetricKind::Count => Box::new(CountMeasurer::default()),
    }
}

fn numeric(cell: &Cell) -> Option<Decimal> {
    match cell {
        Cell::Number(d) => Some(*d),
        _ => None,
    }
}

#[derive(Default)]
struct MeanMeasurer {
    sum: Decimal,
    count: u64,
}

impl Measurer for MeanMeasurer {
    fn add(&mut self, cell: &Cell) {
        if let Some(v) = numeric(cell) {
            self.sum += v;
            self.count += 1;
        }
    }

    fn result(&self) -> Value {
        if self.count == 0 {
            return Value::Null;
        }
        decimal_to_json(self.sum / Decimal::from(self.count))
    }
}

#[derive(Default)]
struct MedianMeasurer {
    values: Vec<Decimal>,
}

impl Measurer for MedianMeasurer {
    fn add(&mut self, cell: &Cell) {
        if let Some(v) = numeric(cell) {
            self.values.push(v);
        }
    }

    fn result(&self) -> Value {
        if self.values.is_empty() {
            return Value::Null;
        }
        let mut sorted = self.values.clone();
        sorted.sort();
        let mid = sorted.len() / 2;
        let median = if sorted.len() % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / Decimal::from(2)
        } else {
            sorted[mid]
        };
        decimal_to_json(median)
    }
}

/// Preserves the source's stricter multimodality rule: mode is empty
/// whenever the count of values tied at the maximum frequency equals the
/// total number of distinct values (this subsumes "all frequencies are 1",
/// since then every distinct value is trivially tied at the max).
#[derive(Default)]
struct ModeMeasurer {
    values: Vec<Decimal>,
}

impl Measurer for ModeMeasurer {
    fn add(&mut self, cell: &Cell) {
        if let Some(v) = numeric(cell) {
            self.values.push(v);
        }
    }

    fn result(&self) -> Value {
        let mut freq: HashMap<Decimal, u64> = HashMap::new();
        for v in &self.values {
            *freq.entry(*v).or_insert(0) += 1;
        }
        if freq.is_empty() {
            return Value::Array(vec![]);
        }
        let max_freq = *freq.values().max().unwrap();
        let tied = freq.values().filter(|&&c| c == max_freq).count();
        if tied == freq.len() {
            return Value::Array(vec![]);
        }
        let mut modes: Vec<Decimal> = freq
            .into_iter()
            .filter(|(_, c)| *c == max_freq)
            .map(|(v, _)| v)
            .collect();
        modes.sort();
        Value::Array(modes.into_iter().map(decimal_to_json).collect())
    }
}

struct ExtremeMeasurer {
    value: Option<Decimal>,
    keep_smaller: bool,
}

impl ExtremeMeasurer {
    fn min() -> Self {
        Self {
            value: None,
            keep_smaller: true,
        }
    }

    fn max() -> Self {
        Self {
            value: None,
            keep_smaller: false,
        }
    }
}

impl Measurer for ExtremeMeasurer {
    fn add(&mut self, cell: &Cell) {
        let Some(v) = numeric(cell) else { return };
        self.value = Some(match self.value {
            None => v,
            Some(current) => {
                let replace = if self.keep_smaller { v < current } else { v > current };
                if replace {
                    v
                } else {
                    current
                }
            }
        });
    }

    fn result(&self) -> Value {
        match self.value {
            Some(v) => decimal_to_json(v),
            None => Value::Null,
        }
    }
}

#[derive(Default)]
struct SumMeasurer {
    sum: Decimal,
}

impl Measurer for SumMeasurer {
    fn add(&mut self, cell: &Cell) {
        if let Some(v) = numeric(cell) {
            self.sum += v;
        }
    }

    fn result(&self) -> Value {
        decimal_to_json(self.sum)
    }
}

/// Sample standard deviation (Bessel's correction, divides by `n-1`).
#[derive(Default)]
struct StdevMeasurer {
    values: Vec<Decimal>,
}

impl Measurer for StdevMeasurer {
    fn add(&mut self, cell: &Cell) {
        if let Some(v) = numeric(cell) {
            self.values.push(v);
        }
    }

    fn result(&self) -> Value {
        let n = self.values.len();
        if n < 2 {
            return Value::Null;
        }
        let sum: Decimal = self.values.iter().copied().sum();
        let mean = sum.to_f64().unwrap_or(0.0) / n as f64;
        let variance = self
            .values
            .iter()
            .map(|v| {
                let x = v.to_f64().unwrap_or(0.0);
                (x - mean) * (x - mean)
            })
            .sum::<f64>()
            / (n - 1) as f64;
        serde_json::Number::from_f64(variance.sqrt())
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

/// Distinct-value count. Numbers are compared as `f64`, strings by their
/// textual value; booleans never reach a cardinality measurer
/// ([`Cell::is_metricable`] forbids it).
#[derive(Default)]
struct CardinalityMeasurer {
    numbers: std::collections::HashSet<u64>,
    strings: std::collections::HashSet<String>,
}

impl Measurer for CardinalityMeasurer {
    fn add(&mut self, cell: &Cell) {
        match cell {
            Cell::Number(d) => {
                self.numbers.insert(d.to_f64().unwrap_or(0.0).to_bits());
            }
            Cell::String(s) => {
                self.strings.insert(s.clone());
            }
            _ => {}
        }
    }

    fn result(&self) -> Value {
        Value::from(self.numbers.len() + self.strings.len())
    }
}

#[derive(Default)]
struct CountMeasurer {
    count: u64,
}

impl Measurer for CountMeasurer {
    fn add(&mut self, _cell: &Cell) {
        self.count += 1;
    }

    fn result(&self) -> Value {
        Value::from(self.count)
    }
}
