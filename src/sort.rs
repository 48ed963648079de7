//! Deterministic orderings over result-bucket levels.
//!
//! A level without `sort_options` is left in whatever order the bucketize
//! phase first saw its keys in (see `processor::WorkingBucket`, backed by an
//! `IndexMap`) — callers who care about ordering must set it explicitly.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::AggroError;

/// Which comparator a bucket level uses to order its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortKind {
    Alphabetical,
    Numerical,
}

impl std::str::FromStr for SortKind {
    type Err = AggroError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "alphabetical" => Ok(SortKind::Alphabetical),
            "numerical" => Ok(SortKind::Numerical),
            other => Err(AggroError::UnknownSort(other.to_string())),
        }
    }
}

/// How a [`crate::Bucket`] level wants its children ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOptions {
    pub kind: SortKind,
    pub desc: bool,
}

impl SortOptions {
    pub fn new(kind: SortKind, desc: bool) -> Self {
        Self { kind, desc }
    }
}

/// Orders two bucket keys. Implemented per `sort_options.kind`, with `desc`
/// inverting the natural order.
pub trait Sortable {
    fn compare(&self, a: &str, b: &str) -> Ordering;
}

struct Alphabetical {
    desc: bool,
}

impl Sortable for Alphabetical {
    fn compare(&self, a: &str, b: &str) -> Ordering {
        let ord = a.cmp(b);
        if self.desc {
            ord.reverse()
        } else {
            ord
        }
    }
}

struct Numerical {
    desc: bool,
}

impl Sortable for Numerical {
    fn compare(&self, a: &str, b: &str) -> Ordering {
        let fa: f64 = a.parse().unwrap_or(f64::NAN);
        let fb: f64 = b.parse().unwrap_or(f64::NAN);
        let ord = fa.partial_cmp(&fb).unwrap_or(Ordering::Equal);
        if self.desc {
            ord.reverse()
        } else {
            ord
        }
    }
}

/// Build the comparator for a level's `sort_options`, or `None` if the
/// level leaves order unspecified.
pub fn sortable_for(options: Option<&SortOptions>) -> Option<Box<dyn Sortable>> {
    options.map(|o| -> Box<dyn Sortable> {
        match o.kind {
            SortKind::Alphabetical => Box::new(Alphabetical { desc: o.desc }),
            SortKind::Numerical => Box::new(Numerical { desc: o.desc }),
        }
    })
}

/// Sort `keys` in place by an optional comparator, leaving order untouched
/// when `options` is `None`.
pub fn sort_by_value<T>(items: &mut [T], options: Option<&SortOptions>, value_of: impl Fn(&T) -> &str) {
    if let Some(sortable) = sortable_for(options) {
        items.sort_by(|a, b| sortable.compare(value_of(a), value_of(b)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alphabetical_ascending() {
        let mut values = vec!["Wellington".to_string(), "Auckland".to_string()];
        let opts = SortOptions::new(SortKind::Alphabetical, false);
        sort_by_value(&mut values, Some(&opts), |s| s.as_str());
        assert_eq!(values, vec!["Auckland", "Wellington"]);
    }

    #[test]
    fn alphabetical_descending() {
        let mut values = vec!["Auckland".to_string(), "Wellington".to_string()];
        let opts = SortOptions::new(SortKind::Alphabetical, true);
        sort_by_value(&mut values, Some(&opts), |s| s.as_str());
        assert_eq!(values, vec!["Wellington", "Auckland"]);
    }

    #[test]
    fn numerical_ascending_parses_as_f64() {
        let mut values = vec!["150000".to_string(), "20000".to_string(), "100000".to_string()];
        let opts = SortOptions::new(SortKind::Numerical, false);
        sort_by_value(&mut values, Some(&opts), |s| s.as_str());
        assert_eq!(values, vec!["20000", "100000", "150000"]);
    }

    #[test]
    fn no_sort_options_leaves_order_untouched() {
        let mut values = vec!["b".to_string(), "a".to_string()];
        sort_by_value(&mut values, None, |s| s.as_str());
        assert_eq!(values, vec!["b", "a"]);
    }
}
