use grid::Pagination;
use grid::config::PAGE_SIZE_OPTIONS;
use grid::view::{needs_pagination, page_count, range_label};
use web_sys::HtmlSelectElement;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct Props {
    pub pagination: Pagination,
    /// Rows in the whole collection, not just this page
    pub total: u64,
    pub on_change: Callback<Pagination>,
    /// Whether currently loading (to disable buttons)
    #[prop_or(false)]
    pub is_loading: bool,
    #[prop_or(true)]
    pub show_page_size: bool,
}

#[function_component]
pub fn PaginationControls(props: &Props) -> Html {
    let Props {
        pagination,
        total,
        is_loading,
        show_page_size,
        ..
    } = *props;

    if total == 0 {
        return html! {};
    }

    let last_page = page_count(total, pagination.page_size) - 1;
    let is_first_page = pagination.page == 0;
    let is_last_page = u64::from(pagination.page) >= last_page;
    // Page buttons stay reachable when a shrinking total strands a later page.
    let show_page_buttons =
        needs_pagination(total, pagination.page_size) || !is_first_page;

    let on_previous = {
        let on_change = props.on_change.clone();
        Callback::from(move |_: MouseEvent| {
            on_change.emit(pagination.with_page(pagination.page.saturating_sub(1)));
        })
    };

    let on_next = {
        let on_change = props.on_change.clone();
        Callback::from(move |_: MouseEvent| {
            on_change.emit(pagination.with_page(pagination.page + 1));
        })
    };

    let on_page_size = {
        let on_change = props.on_change.clone();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            if let Ok(size) = select.value().parse::<u32>() {
                on_change.emit(pagination.with_page_size(size));
            }
        })
    };

    let prev_disabled = is_first_page || is_loading;
    let next_disabled = is_last_page || is_loading;

    let button_class = |disabled: bool| {
        if disabled {
            "px-3 py-1 border border-neutral-300 dark:border-neutral-600 \
             rounded-md text-sm text-neutral-400 dark:text-neutral-500 \
             bg-neutral-100 dark:bg-neutral-800 cursor-not-allowed"
        } else {
            "px-3 py-1 border border-neutral-300 dark:border-neutral-600 \
             rounded-md text-sm text-neutral-700 dark:text-neutral-300 \
             bg-white dark:bg-neutral-700 hover:bg-neutral-50 \
             dark:hover:bg-neutral-600 transition-colors duration-200"
        }
    };

    html! {
        <div class="flex items-center justify-end gap-4 px-4 py-3 \
                    border-t border-neutral-200 dark:border-neutral-700">
            if show_page_size {
                <label class="flex items-center gap-2 text-sm text-neutral-600 dark:text-neutral-400">
                    {"Lignes par page"}
                    <select
                        onchange={on_page_size}
                        disabled={is_loading}
                        class="border border-neutral-300 dark:border-neutral-600 rounded-md \
                               bg-white dark:bg-neutral-700 px-2 py-1"
                    >
                        {for PAGE_SIZE_OPTIONS.iter().map(|size| html! {
                            <option
                                value={size.to_string()}
                                selected={*size == pagination.page_size}
                            >
                                {size}
                            </option>
                        })}
                    </select>
                </label>
            }

            <span class="text-sm text-neutral-600 dark:text-neutral-400">
                {range_label(pagination, total)}
            </span>

            if show_page_buttons {
                <button
                    onclick={on_previous}
                    disabled={prev_disabled}
                    class={button_class(prev_disabled)}
                    title="Page précédente"
                >
                    {"‹"}
                </button>
                <button
                    onclick={on_next}
                    disabled={next_disabled}
                    class={button_class(next_disabled)}
                    title="Page suivante"
                >
                    {"›"}
                </button>
            }
        </div>
    }
}
