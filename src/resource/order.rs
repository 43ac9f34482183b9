//! Result ordering
//!
//! Resolved collections are sorted by one attribute. When a pair cannot be
//! compared (the attribute is missing on either side, a representation is not
//! loaded, or the values have different types) the pair counts as equal and
//! keeps its relative order. One odd record therefore never aborts a listing.

use super::Resource;
use chrono::DateTime;
use serde_json::Value;
use std::cmp::Ordering;

/// Compare two resources on `attribute`, `Equal` when they can't be compared
pub fn compare_by(a: &Resource, b: &Resource, attribute: &str) -> Ordering {
    match (a.attribute(attribute), b.attribute(attribute)) {
        (Ok(Some(left)), Ok(Some(right))) => compare_values(left, right),
        _ => Ordering::Equal,
    }
}

fn compare_values(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::String(l), Value::String(r)) => {
            match (DateTime::parse_from_rfc3339(l), DateTime::parse_from_rfc3339(r)) {
                (Ok(lt), Ok(rt)) => lt.cmp(&rt),
                _ => l.cmp(r),
            }
        }
        (Value::Number(l), Value::Number(r)) => match (l.as_f64(), r.as_f64()) {
            (Some(l), Some(r)) => l.partial_cmp(&r).unwrap_or(Ordering::Equal),
            _ => Ordering::Equal,
        },
        (Value::Bool(l), Value::Bool(r)) => l.cmp(r),
        _ => Ordering::Equal,
    }
}

/// Stable in-place sort by `attribute`.
///
/// `compare_by` is not a total order once incomparable pairs show up, so this
/// uses insertion sort, which stays stable and cannot panic on an inconsistent
/// comparator. Listings are small.
pub fn sort_by_attribute(resources: &mut [Resource], attribute: &str) {
    for i in 1..resources.len() {
        let mut j = i;
        while j > 0 && compare_by(&resources[j - 1], &resources[j], attribute) == Ordering::Greater
        {
            resources.swap(j - 1, j);
            j -= 1;
        }
    }
}
