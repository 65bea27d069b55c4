//! Renderer-independent table behaviour: column definitions, the header sort
//! toggle, client-side sorting and paging, and the pagination footer maths.
//!
//! In [`ViewMode::Server`] a renderer only forwards gestures to the grid's
//! setters and displays the grid's state. In [`ViewMode::Client`] it keeps a
//! [`LocalView`] over the rows it was given.

use std::cmp::Ordering;

use crate::model::{GridRow, Pagination, SortDirection, SortItem, SortModel};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    Server,
    #[default]
    Client,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

impl Align {
    pub fn as_css(&self) -> &'static str {
        match self {
            Self::Left => "text-left",
            Self::Center => "text-center",
            Self::Right => "text-right",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub field: String,
    pub header: String,
    pub sortable: bool,
    pub width: Option<u32>,
    pub align: Align,
}

impl Column {
    pub fn new(field: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            header: header.into(),
            sortable: true,
            width: None,
            align: Align::Left,
        }
    }

    pub fn unsortable(mut self) -> Self {
        self.sortable = false;
        self
    }

    pub fn width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }
}

/// Sort model after activating the header of `field`.
///
/// The same column cycles ascending, descending, unsorted. Another column
/// replaces the whole model with a single ascending entry.
pub fn next_sort(current: &[SortItem], field: &str) -> SortModel {
    match current.first() {
        Some(item) if item.field == field => match item.direction {
            SortDirection::Asc => vec![SortItem::desc(field)],
            SortDirection::Desc => Vec::new(),
        },
        _ => vec![SortItem::asc(field)],
    }
}

/// Direction shown in the header of `field`.
pub fn sort_indicator(sort: &[SortItem], field: &str) -> Option<SortDirection> {
    sort.first()
        .filter(|item| item.field == field)
        .map(|item| item.direction)
}

pub fn compare_rows<T: GridRow>(a: &T, b: &T, field: &str) -> Ordering {
    a.cell(field).compare(&b.cell(field))
}

/// Number of pages for `total` rows, never less than one.
pub fn page_count(total: u64, page_size: u32) -> u64 {
    let page_size = u64::from(page_size.max(1));
    total.div_ceil(page_size).max(1)
}

/// Whether the pagination footer is worth showing.
pub fn needs_pagination(total: u64, page_size: u32) -> bool {
    total > u64::from(page_size)
}

/// `"11-20 sur 42"`.
pub fn range_label(pagination: Pagination, total: u64) -> String {
    let size = u64::from(pagination.page_size);
    let page = u64::from(pagination.page);
    let start = (page * size + 1).min(total);
    let end = ((page + 1) * size).min(total);
    format!("{start}-{end} sur {total}")
}

/// Pagination and sort a client-mode table keeps for itself.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LocalView {
    pub pagination: Pagination,
    pub sort: SortModel,
}

impl LocalView {
    pub fn new(page_size: u32) -> Self {
        Self {
            pagination: Pagination::new(page_size),
            sort: Vec::new(),
        }
    }

    /// Toggle the sort of a column and go back to the first page.
    pub fn click_header(&mut self, column: &Column) {
        if !column.sortable {
            return;
        }
        self.sort = next_sort(&self.sort, &column.field);
        self.pagination = self.pagination.first_page();
    }

    pub fn set_page(&mut self, page: u32) {
        self.pagination = self.pagination.with_page(page);
    }

    pub fn set_page_size(&mut self, page_size: u32) {
        self.pagination = self.pagination.with_page_size(page_size);
    }

    /// Rows of the current page, sorted. A sort on a field that is not one
    /// of `columns` is ignored.
    pub fn apply<'a, T: GridRow>(
        &self,
        rows: &'a [T],
        columns: &[Column],
    ) -> Vec<&'a T> {
        let mut sorted: Vec<&T> = rows.iter().collect();
        let active = self
            .sort
            .first()
            .filter(|item| columns.iter().any(|c| c.field == item.field));
        if let Some(item) = active {
            sorted.sort_by(|a, b| {
                let ordering = compare_rows(*a, *b, &item.field);
                match item.direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            });
        }
        sorted
            .into_iter()
            .skip(self.pagination.offset())
            .take(self.pagination.page_size as usize)
            .collect()
    }
}
