//! Upstream payload shape normalization.
//!
//! The API returns either a bare JSON array of records or a paginated
//! mapping with a `total` count and the records nested under `data` or
//! `results`. The count extracted here feeds diagnostic log lines only;
//! it never drives control flow or pagination, and payloads are always
//! returned to callers unmodified.

use serde_json::Value;

/// The two payload shapes the upstream API produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape<'a> {
    /// A bare ordered sequence of records.
    Sequence(&'a [Value]),
    /// A paginated mapping: `total` plus records under `data`/`results`.
    Page {
        items: Option<&'a [Value]>,
        total: u64,
    },
}

impl<'a> ResponseShape<'a> {
    /// Classify a payload. Anything that is not an array is treated as a
    /// mapping with a `total` field defaulting to 0.
    #[must_use]
    pub fn of(value: &'a Value) -> Self {
        match value {
            Value::Array(items) => Self::Sequence(items),
            other => {
                let items = other
                    .get("data")
                    .or_else(|| other.get("results"))
                    .and_then(Value::as_array)
                    .map(Vec::as_slice);
                let total = other.get("total").and_then(Value::as_u64).unwrap_or(0);
                Self::Page { items, total }
            }
        }
    }

    #[must_use]
    pub fn count(&self) -> u64 {
        match self {
            Self::Sequence(items) => items.len() as u64,
            Self::Page { total, .. } => *total,
        }
    }
}

/// Result count of an ambiguous upstream payload, for log lines.
#[must_use]
pub fn result_count(value: &Value) -> u64 {
    ResponseShape::of(value).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bare_sequence_counts_its_length() {
        let v = json!([{"id": "c_1"}, {"id": "c_2"}, {"id": "c_3"}]);
        assert!(matches!(ResponseShape::of(&v), ResponseShape::Sequence(_)));
        assert_eq!(result_count(&v), 3);
    }

    #[test]
    fn page_reads_total_and_finds_items_under_data() {
        let v = json!({"data": [{"id": "t_1"}], "total": 41});
        match ResponseShape::of(&v) {
            ResponseShape::Page { items, total } => {
                assert_eq!(total, 41);
                assert_eq!(items.map(<[Value]>::len), Some(1));
            }
            other => panic!("expected page, got {other:?}"),
        }
    }

    #[test]
    fn page_finds_items_under_results() {
        let v = json!({"results": [{"id": "m_1"}, {"id": "m_2"}], "total": 2});
        match ResponseShape::of(&v) {
            ResponseShape::Page { items, total } => {
                assert_eq!(total, 2);
                assert_eq!(items.map(<[Value]>::len), Some(2));
            }
            other => panic!("expected page, got {other:?}"),
        }
    }

    #[test]
    fn missing_total_defaults_to_zero() {
        assert_eq!(result_count(&json!({"data": [{"id": "x"}]})), 0);
        assert_eq!(result_count(&json!({})), 0);
        assert_eq!(result_count(&Value::Null), 0);
    }
}
