//! Reduce the page shapes returned by the various backend resources to one
//! [`Page`].
//!
//! Supported shapes, in order of precedence:
//!
//! 1. a bare JSON array of rows;
//! 2. an object with the rows under `content`, then `items`, then `data`.
//!
//! The total is taken from the `X-Total-Count` header, then the body's
//! `totalElements`, then `total`, and finally the number of rows. A body with
//! no recognizable rows yields an empty page with a total of zero.

use payloads::RawPage;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::model::Page;

/// Coerces one raw row into the type displayed by the grid. Rows for which
/// the mapper returns `None` are dropped.
pub type RowMapper<T> = Arc<dyn Fn(Value) -> Option<T> + Send + Sync>;

/// Keep rows as raw JSON.
pub fn identity_rows() -> RowMapper<Value> {
    Arc::new(Some)
}

/// Deserialize rows into `T`, logging and skipping rows that do not fit.
pub fn deserialize_rows<T: DeserializeOwned + 'static>() -> RowMapper<T> {
    Arc::new(|value: Value| match serde_json::from_value::<T>(value) {
        Ok(row) => Some(row),
        Err(e) => {
            tracing::warn!("Skipping row that does not match the grid: {e}");
            None
        }
    })
}

/// Where the rows of a response body were found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowsSource {
    Array,
    Content,
    Items,
    Data,
    Missing,
}

/// A response body split into rows and whatever totals it declares.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedPage {
    pub source: RowsSource,
    pub items: Vec<Value>,
    pub total_elements: Option<u64>,
    pub total: Option<u64>,
}

impl DecodedPage {
    fn missing() -> Self {
        Self {
            source: RowsSource::Missing,
            items: Vec::new(),
            total_elements: None,
            total: None,
        }
    }
}

const ROW_KEYS: [(&str, RowsSource); 3] = [
    ("content", RowsSource::Content),
    ("items", RowsSource::Items),
    ("data", RowsSource::Data),
];

pub fn decode_body(body: Value) -> DecodedPage {
    match body {
        Value::Array(items) => DecodedPage {
            source: RowsSource::Array,
            items,
            total_elements: None,
            total: None,
        },
        Value::Object(mut object) => {
            let total_elements = object.get("totalElements").and_then(as_count);
            let total = object.get("total").and_then(as_count);
            let (source, items) = take_rows(&mut object)
                .unwrap_or((RowsSource::Missing, Vec::new()));
            DecodedPage {
                source,
                items,
                total_elements,
                total,
            }
        }
        _ => DecodedPage::missing(),
    }
}

fn take_rows(object: &mut Map<String, Value>) -> Option<(RowsSource, Vec<Value>)> {
    let (key, source) = ROW_KEYS
        .into_iter()
        .find(|(key, _)| matches!(object.get(*key), Some(Value::Array(_))))?;
    match object.remove(key) {
        Some(Value::Array(items)) => Some((source, items)),
        _ => None,
    }
}

/// A non-negative, finite JSON number.
fn as_count(value: &Value) -> Option<u64> {
    let Value::Number(n) = value else {
        return None;
    };
    if let Some(count) = n.as_u64() {
        return Some(count);
    }
    let float = n.as_f64()?;
    (float.is_finite() && float >= 0.0).then_some(float as u64)
}

/// Parse a total-count header value.
pub fn parse_total_header(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    raw.parse::<u64>().ok().or_else(|| {
        let float = raw.parse::<f64>().ok()?;
        (float.is_finite() && float >= 0.0).then_some(float as u64)
    })
}

pub fn normalize<T>(raw: RawPage, map_row: &RowMapper<T>) -> Page<T> {
    let header_total = raw.total_header.as_deref().and_then(parse_total_header);
    let decoded = decode_body(raw.body);
    if decoded.source == RowsSource::Missing {
        tracing::debug!("Response body has no recognizable rows");
        return Page::default();
    }
    let DecodedPage {
        items,
        total_elements,
        total,
        ..
    } = decoded;
    let rows: Vec<T> = items.into_iter().filter_map(|item| map_row(item)).collect();
    let total = header_total
        .or(total_elements)
        .or(total)
        .unwrap_or(rows.len() as u64);
    Page { rows, total }
}
