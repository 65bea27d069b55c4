//! Translation of grid state into backend query parameters.
//!
//! Backend resources do not agree on parameter names (`date` vs
//! `dateFrom`/`dateTo`, numeric vs string ids), so the translation is a
//! per-endpoint seam. [`DefaultParamMapper`] covers the common Spring-style
//! convention: `page`, `size`, `sort=<field>,<direction>`, `search`, and the
//! filter's fields spread in.

use serde::Serialize;
use serde_json::Value;

use crate::model::{Pagination, SortItem, SortModel};

/// Ordered query string pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl ToString) {
        self.0.push((key.into(), value.to_string()));
    }

    /// Builder form of [`QueryParams::push`].
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.push(key, value);
        self
    }

    pub fn push_opt<V: ToString>(
        &mut self,
        key: impl Into<String>,
        value: Option<V>,
    ) {
        if let Some(value) = value {
            self.push(key, value);
        }
    }

    /// First value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> {
        self.0
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn as_slice(&self) -> &[(String, String)] {
        &self.0
    }
}

/// Everything a mapper may use to build one request.
#[derive(Debug, Clone, PartialEq)]
pub struct PageQuery<F> {
    pub pagination: Pagination,
    pub sort: SortModel,
    /// Trimmed, debounced search; `None` when empty.
    pub search: Option<String>,
    pub filter: Option<F>,
}

impl<F> PageQuery<F> {
    pub fn first_sort(&self) -> Option<&SortItem> {
        self.sort.first()
    }

    /// `page` and `size`, which every known endpoint accepts.
    pub fn base_params(&self) -> QueryParams {
        QueryParams::new()
            .with("page", self.pagination.page)
            .with("size", self.pagination.page_size)
    }
}

/// `<field>,<direction>` for the first sort entry.
pub fn sort_param(sort: &[SortItem]) -> Option<String> {
    sort.first()
        .map(|item| format!("{},{}", item.field, item.direction))
}

pub trait ParamMapper<F>: Send + Sync {
    fn map_params(&self, query: &PageQuery<F>) -> QueryParams;
}

impl<F, M> ParamMapper<F> for M
where
    M: Fn(&PageQuery<F>) -> QueryParams + Send + Sync,
{
    fn map_params(&self, query: &PageQuery<F>) -> QueryParams {
        self(query)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultParamMapper;

impl<F: Serialize> ParamMapper<F> for DefaultParamMapper {
    fn map_params(&self, query: &PageQuery<F>) -> QueryParams {
        let mut params = query.base_params();
        params.push_opt("sort", sort_param(&query.sort));
        params.push_opt(
            "search",
            query.search.as_deref().filter(|search| !search.is_empty()),
        );
        if let Some(filter) = &query.filter {
            spread_filter(&mut params, filter);
        }
        params
    }
}

/// Append the filter's fields, skipping null and empty values.
pub fn spread_filter<F: Serialize>(params: &mut QueryParams, filter: &F) {
    let value = match serde_json::to_value(filter) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("Ignoring filter that cannot be serialized: {e}");
            return;
        }
    };
    let Value::Object(entries) = value else {
        if !value.is_null() {
            tracing::warn!("Ignoring filter that is not a record: {value}");
        }
        return;
    };
    for (key, value) in entries {
        match value {
            Value::Array(items) => {
                for item in items {
                    if let Some(item) = scalar_param(item) {
                        params.push(key.clone(), item);
                    }
                }
            }
            other => params.push_opt(key, scalar_param(other)),
        }
    }
}

fn scalar_param(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        nested => Some(nested.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn query<F>(
        page: u32,
        sort: SortModel,
        search: Option<&str>,
        filter: Option<F>,
    ) -> PageQuery<F> {
        PageQuery {
            pagination: Pagination::new(10).with_page(page),
            sort,
            search: search.map(Into::into),
            filter,
        }
    }

    #[test]
    fn default_mapper_sends_page_and_size_only_when_idle() {
        let params = DefaultParamMapper
            .map_params(&query::<Value>(0, vec![], None, None));
        assert_eq!(
            params.as_slice(),
            &[
                ("page".to_string(), "0".to_string()),
                ("size".to_string(), "10".to_string())
            ]
        );
    }

    #[test]
    fn default_mapper_uses_first_sort_entry() {
        let sort = vec![SortItem::desc("date"), SortItem::asc("id")];
        let params =
            DefaultParamMapper.map_params(&query::<Value>(2, sort, None, None));
        assert_eq!(params.get("page"), Some("2"));
        assert_eq!(params.get("sort"), Some("date,desc"));
        assert_eq!(params.get_all("sort").count(), 1);
    }

    #[test]
    fn empty_search_is_omitted() {
        let params = DefaultParamMapper
            .map_params(&query::<Value>(0, vec![], Some(""), None));
        assert!(!params.contains_key("search"));

        let params = DefaultParamMapper
            .map_params(&query::<Value>(0, vec![], Some("smith"), None));
        assert_eq!(params.get("search"), Some("smith"));
    }

    #[test]
    fn filter_entries_are_spread_without_blank_values() {
        let filter = json!({
            "status": "PENDING",
            "providerId": 12,
            "clientId": null,
            "date": "",
            "active": false,
            "tags": ["a", "", "b"],
        });
        let params = DefaultParamMapper
            .map_params(&query(0, vec![], None, Some(filter)));
        assert_eq!(params.get("status"), Some("PENDING"));
        assert_eq!(params.get("providerId"), Some("12"));
        assert_eq!(params.get("active"), Some("false"));
        assert!(!params.contains_key("clientId"));
        assert!(!params.contains_key("date"));
        assert_eq!(params.get_all("tags").collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn typed_filters_skip_none_fields() {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Filter {
            provider_id: Option<i64>,
            status: Option<&'static str>,
        }

        let filter = Filter {
            provider_id: None,
            status: Some("COMPLETED"),
        };
        let params = DefaultParamMapper
            .map_params(&query(0, vec![], None, Some(filter)));
        assert_eq!(params.get("status"), Some("COMPLETED"));
        assert!(!params.contains_key("providerId"));
    }

    #[test]
    fn closures_are_mappers() {
        let mapper = |query: &PageQuery<Value>| {
            let mut params = query.base_params();
            params.push_opt("dateFrom", query.search.clone());
            params
        };
        let params = mapper.map_params(&query(1, vec![], Some("2025"), None));
        assert_eq!(params.get("dateFrom"), Some("2025"));
        assert_eq!(params.get("page"), Some("1"));
    }
}
