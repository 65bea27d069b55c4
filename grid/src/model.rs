//! Value types shared by the grid state machine, the parameter mapper and the
//! views.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Zero-based page index plus page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
}

impl Pagination {
    /// First page with the given size. A size of zero is bumped to one.
    pub fn new(page_size: u32) -> Self {
        Self {
            page: 0,
            page_size: page_size.max(1),
        }
    }

    pub fn with_page(self, page: u32) -> Self {
        Self { page, ..self }
    }

    /// Same size, back on the first page.
    pub fn first_page(self) -> Self {
        self.with_page(0)
    }

    /// Switching page size always returns to the first page.
    pub fn with_page_size(self, page_size: u32) -> Self {
        Self::new(page_size)
    }

    /// Index of the first row of this page within the full collection.
    pub fn offset(&self) -> usize {
        self.page as usize * self.page_size as usize
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_PAGE_SIZE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid sort direction {0:?}, expected \"asc\" or \"desc\"")]
pub struct ParseSortDirectionError(pub String);

impl FromStr for SortDirection {
    type Err = ParseSortDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(ParseSortDirectionError(other.to_owned())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortItem {
    pub field: String,
    #[serde(rename = "sort")]
    pub direction: SortDirection,
}

impl SortItem {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }

    /// Build an entry from loosely typed input, e.g. a widget callback.
    /// Entries without a field or with an unknown direction yield `None`.
    pub fn parse(field: Option<&str>, direction: Option<&str>) -> Option<Self> {
        let field = field.filter(|field| !field.trim().is_empty())?;
        let direction = direction?.parse().ok()?;
        Some(Self {
            field: field.to_owned(),
            direction,
        })
    }
}

/// Ordered sort entries. Only the first one is sent by the default mapper.
pub type SortModel = Vec<SortItem>;

/// Drop entries that cannot be sent to the backend.
pub fn normalize_sort(model: SortModel) -> SortModel {
    model
        .into_iter()
        .filter(|item| !item.field.trim().is_empty())
        .collect()
}

/// One normalized page of results.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub rows: Vec<T>,
    pub total: u64,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            total: 0,
        }
    }
}

/// Reconciliation key of a row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RowKey {
    Int(i64),
    Str(String),
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(id) => write!(f, "{id}"),
            Self::Str(id) => f.write_str(id),
        }
    }
}

/// A displayable cell value, as seen by client-side sorting.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn from_option<V: Into<Cell>>(value: Option<V>) -> Self {
        value.map_or(Self::Empty, Into::into)
    }

    /// Empty cells first, then numbers ordered numerically, then text
    /// ignoring case. Numbers and text never interleave.
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Text(a), Self::Text(b)) => a
                .to_lowercase()
                .cmp(&b.to_lowercase())
                .then_with(|| a.cmp(b)),
            (a, b) => a.rank().cmp(&b.rank()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Empty => 0,
            Self::Number(_) => 1,
            Self::Text(_) => 2,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<u64> for Cell {
    fn from(value: u64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<&serde_json::Value> for Cell {
    fn from(value: &serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Self::Empty,
            Value::Number(n) => n.as_f64().map_or(Self::Empty, Self::Number),
            Value::String(s) => Self::Text(s.clone()),
            other => Self::Text(other.to_string()),
        }
    }
}

/// A row that can be keyed and displayed by the grid views.
pub trait GridRow {
    fn row_key(&self) -> RowKey;

    /// Value of the named column.
    fn cell(&self, field: &str) -> Cell;
}

impl GridRow for serde_json::Value {
    fn row_key(&self) -> RowKey {
        match self.get("id") {
            Some(serde_json::Value::Number(n)) => match n.as_i64() {
                Some(id) => RowKey::Int(id),
                None => RowKey::Str(n.to_string()),
            },
            Some(serde_json::Value::String(s)) => RowKey::Str(s.clone()),
            _ => RowKey::Str(self.to_string()),
        }
    }

    fn cell(&self, field: &str) -> Cell {
        self.get(field).map_or(Cell::Empty, Cell::from)
    }
}
