/**
 * Store Queries
 *
 * Declarative query description shared by every adapter: equality filters,
 * one optional order-by, and an optional result limit. This mirrors the
 * query surface the services actually need (the hosted database is treated
 * as a black box, so nothing richer is modeled).
 *
 * JSON values are given a total order so that epoch-millisecond timestamps
 * and names sort correctly: values of the same type compare naturally
 * (numbers by magnitude, strings lexicographically), values of different
 * types compare by a fixed type rank.
 */

use std::cmp::Ordering;

use serde_json::Value;

/// Sort direction for the optional `order_by` clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// An equality-filtered, optionally ordered and limited collection scan.
#[derive(Debug, Clone, Default)]
pub struct Query {
    filters: Vec<(String, Value)>,
    order: Option<(String, Direction)>,
    limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field == value`.
    pub fn filter(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push((field.into(), value.into()));
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order = Some((field.into(), direction));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub(crate) fn filters(&self) -> &[(String, Value)] {
        &self.filters
    }

    pub(crate) fn order(&self) -> Option<(&str, Direction)> {
        self.order.as_ref().map(|(f, d)| (f.as_str(), *d))
    }

    pub(crate) fn limit_value(&self) -> Option<usize> {
        self.limit
    }

    /// Whether a document passes every filter.
    pub(crate) fn matches(&self, doc: &Value) -> bool {
        self.filters
            .iter()
            .all(|(field, value)| doc.get(field) == Some(value))
    }

    /// Evaluate the query against an already-loaded document set.
    /// Used by the in-memory adapter.
    pub(crate) fn evaluate(&self, docs: impl IntoIterator<Item = Value>) -> Vec<Value> {
        let mut results: Vec<Value> = docs.into_iter().filter(|d| self.matches(d)).collect();

        if let Some((field, direction)) = self.order() {
            results.sort_by(|a, b| {
                let ordering = compare_values(
                    a.get(field).unwrap_or(&Value::Null),
                    b.get(field).unwrap_or(&Value::Null),
                );
                match direction {
                    Direction::Asc => ordering,
                    Direction::Desc => ordering.reverse(),
                }
            });
        }

        if let Some(limit) = self.limit {
            results.truncate(limit);
        }

        results
    }
}

/// Total order over JSON values.
pub(crate) fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}
