use std::time::Duration;

use crate::model::{Pagination, SortModel, normalize_sort};

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Quiet period before a typed search is sent to the backend.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

pub const PAGE_SIZE_OPTIONS: [u32; 4] = [5, 10, 20, 50];

/// Initial state and tuning of one grid instance.
#[derive(Debug, Clone)]
pub struct GridOptions<F> {
    pub page_size: u32,
    pub sort: SortModel,
    pub filter: Option<F>,
    pub search: Option<String>,
    pub debounce: Duration,
}

impl<F> Default for GridOptions<F> {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            sort: Vec::new(),
            filter: None,
            search: None,
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

impl<F> GridOptions<F> {
    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn sort(mut self, sort: SortModel) -> Self {
        self.sort = sort;
        self
    }

    pub fn filter(mut self, filter: F) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub(crate) fn initial_pagination(&self) -> Pagination {
        Pagination::new(self.page_size)
    }

    pub(crate) fn initial_sort(&self) -> SortModel {
        normalize_sort(self.sort.clone())
    }
}
