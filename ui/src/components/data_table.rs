use grid::view::{Column, LocalView, ViewMode, next_sort, sort_indicator};
use grid::{GridRow, Pagination, SortDirection, SortItem, SortModel};
use std::rc::Rc;
use yew::prelude::*;

use super::PaginationControls;

/// Full is the web data grid; Compact is the dense table used in cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableVariant {
    #[default]
    Full,
    Compact,
}

#[derive(Properties, PartialEq)]
pub struct DataTableProps<T: PartialEq> {
    pub columns: Rc<Vec<Column>>,
    pub rows: Rc<Vec<T>>,
    #[prop_or_default]
    pub variant: TableVariant,
    #[prop_or_default]
    pub mode: ViewMode,
    #[prop_or(false)]
    pub loading: bool,
    /// Server mode: total row count reported by the backend.
    #[prop_or_default]
    pub total: u64,
    /// Server mode: the grid's pagination.
    #[prop_or_default]
    pub pagination: Pagination,
    /// Server mode: the grid's sort model.
    #[prop_or_default]
    pub sort: SortModel,
    #[prop_or_default]
    pub on_pagination: Callback<Pagination>,
    #[prop_or_default]
    pub on_sort: Callback<SortModel>,
    /// Extra trailing cell per row, e.g. action buttons.
    #[prop_or_default]
    pub row_actions: Option<Callback<T, Html>>,
    #[prop_or(AttrValue::from("Aucune donnée"))]
    pub empty_message: AttrValue,
}

#[function_component]
pub fn DataTable<T>(props: &DataTableProps<T>) -> Html
where
    T: GridRow + Clone + PartialEq + 'static,
{
    let local = use_state(|| LocalView::new(props.pagination.page_size));
    let compact = props.variant == TableVariant::Compact;

    // In client mode the table pages and sorts the rows it was given.
    let (visible, total, pagination, sort): (Vec<&T>, u64, Pagination, &[SortItem]) =
        match props.mode {
            ViewMode::Server => (
                props.rows.iter().collect(),
                props.total,
                props.pagination,
                props.sort.as_slice(),
            ),
            ViewMode::Client => (
                local.apply(&props.rows, &props.columns),
                props.rows.len() as u64,
                local.pagination,
                local.sort.as_slice(),
            ),
        };

    let on_header = {
        let local = local.clone();
        let on_sort = props.on_sort.clone();
        let mode = props.mode;
        let sort = props.sort.clone();
        Callback::from(move |column: Column| match mode {
            ViewMode::Server if column.sortable => {
                on_sort.emit(next_sort(&sort, &column.field));
            }
            ViewMode::Server => {}
            ViewMode::Client => {
                let mut view = (*local).clone();
                view.click_header(&column);
                local.set(view);
            }
        })
    };

    let on_page = {
        let local = local.clone();
        let on_pagination = props.on_pagination.clone();
        let mode = props.mode;
        Callback::from(move |next: Pagination| match mode {
            ViewMode::Server => on_pagination.emit(next),
            ViewMode::Client => {
                let mut view = (*local).clone();
                if next.page_size != view.pagination.page_size {
                    view.set_page_size(next.page_size);
                } else {
                    view.set_page(next.page);
                }
                local.set(view);
            }
        })
    };

    let cell_padding = if compact { "px-2 py-1" } else { "px-4 py-3" };
    let span = props.columns.len() + usize::from(props.row_actions.is_some());

    let header = props.columns.iter().map(|column| {
        let indicator = match sort_indicator(sort, &column.field) {
            Some(SortDirection::Asc) => " ▲",
            Some(SortDirection::Desc) => " ▼",
            None => "",
        };
        let onclick = {
            let on_header = on_header.clone();
            let column = column.clone();
            Callback::from(move |_: MouseEvent| on_header.emit(column.clone()))
        };
        let style = column.width.map(|width| format!("width: {width}px"));
        let cursor = if column.sortable { "cursor-pointer select-none" } else { "" };
        html! {
            <th
                scope="col"
                {style}
                {onclick}
                class={format!(
                    "{cell_padding} {} {cursor} text-xs font-semibold uppercase \
                     tracking-wide text-neutral-600 dark:text-neutral-300",
                    column.align.as_css()
                )}
            >
                {&column.header}{indicator}
            </th>
        }
    });

    let body = if visible.is_empty() {
        let message = if props.loading {
            AttrValue::from("Chargement...")
        } else {
            props.empty_message.clone()
        };
        html! {
            <tr>
                <td colspan={span.to_string()} class="px-4 py-8 text-center text-neutral-500">
                    {message}
                </td>
            </tr>
        }
    } else {
        visible
            .into_iter()
            .map(|row| {
                html! {
                    <tr
                        key={row.row_key().to_string()}
                        class="border-t border-neutral-100 dark:border-neutral-800"
                    >
                        {for props.columns.iter().map(|column| html! {
                            <td class={format!("{cell_padding} text-sm {}", column.align.as_css())}>
                                {row.cell(&column.field).to_string()}
                            </td>
                        })}
                        if let Some(actions) = &props.row_actions {
                            <td class={format!("{cell_padding} text-right")}>
                                {actions.emit(row.clone())}
                            </td>
                        }
                    </tr>
                }
            })
            .collect::<Html>()
    };

    html! {
        <div class={classes!(
            "bg-white", "dark:bg-neutral-800", "rounded-lg",
            (!compact).then_some("shadow"),
            props.loading.then_some("opacity-60"),
        )}>
            <div class="overflow-x-auto">
                <table class="min-w-full">
                    <thead class="bg-neutral-50 dark:bg-neutral-900">
                        <tr>
                            {for header}
                            if props.row_actions.is_some() {
                                <th />
                            }
                        </tr>
                    </thead>
                    <tbody>{body}</tbody>
                </table>
            </div>
            <PaginationControls
                {pagination}
                {total}
                on_change={on_page}
                is_loading={props.loading}
                show_page_size={!compact}
            />
        </div>
    }
}
