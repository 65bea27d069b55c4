use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::prelude::*;

/// One select box of the toolbar. An empty value means "all".
#[derive(Clone, PartialEq)]
pub struct SelectFilter {
    pub label: AttrValue,
    pub options: Vec<(AttrValue, AttrValue)>,
    pub value: AttrValue,
    pub on_change: Callback<String>,
}

#[derive(Properties, PartialEq)]
pub struct ServerToolbarProps {
    /// Search as currently typed.
    #[prop_or_default]
    pub search: Option<String>,
    pub on_search: Callback<String>,
    #[prop_or(AttrValue::from("Rechercher..."))]
    pub placeholder: AttrValue,
    #[prop_or_default]
    pub filters: Vec<SelectFilter>,
    #[prop_or_default]
    pub on_reset: Option<Callback<()>>,
    /// Extra controls rendered after the select boxes.
    #[prop_or_default]
    pub children: Html,
}

/// Search box and filter selects above a server grid. Typing is forwarded
/// on every keystroke; the grid debounces it.
#[function_component]
pub fn ServerToolbar(props: &ServerToolbarProps) -> Html {
    // The raw text stays local; the grid only sees it trimmed.
    let text = use_state(|| props.search.clone().unwrap_or_default());

    let on_input = {
        let text = text.clone();
        let on_search = props.on_search.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            text.set(input.value());
            on_search.emit(input.value());
        })
    };

    let on_reset = props.on_reset.clone().map(|on_reset| {
        let text = text.clone();
        Callback::from(move |_: MouseEvent| {
            text.set(String::new());
            on_reset.emit(());
        })
    });

    let selects = props.filters.iter().map(|filter| {
        let onchange = {
            let on_change = filter.on_change.clone();
            Callback::from(move |e: Event| {
                let select: HtmlSelectElement = e.target_unchecked_into();
                on_change.emit(select.value());
            })
        };
        html! {
            <label class="flex items-center gap-2 text-sm">
                <span class="text-neutral-600 dark:text-neutral-400">{&filter.label}</span>
                <select
                    {onchange}
                    class="border border-neutral-300 dark:border-neutral-600 rounded-md \
                           bg-white dark:bg-neutral-700 px-2 py-1"
                >
                    <option value="" selected={filter.value.is_empty()}>{"Tous"}</option>
                    {for filter.options.iter().map(|(value, label)| html! {
                        <option value={value.clone()} selected={*value == filter.value}>
                            {label}
                        </option>
                    })}
                </select>
            </label>
        }
    });

    html! {
        <div class="flex flex-wrap items-center gap-3 mb-4">
            <input
                type="search"
                class="flex-1 min-w-48 border border-neutral-300 dark:border-neutral-600 \
                       rounded-md bg-white dark:bg-neutral-700 px-3 py-2 text-sm"
                placeholder={props.placeholder.clone()}
                value={(*text).clone()}
                oninput={on_input}
            />
            {for selects}
            {props.children.clone()}
            if let Some(on_reset) = on_reset {
                <button
                    class="px-3 py-2 text-sm text-neutral-600 hover:text-neutral-900 \
                           dark:text-neutral-400 dark:hover:text-white"
                    onclick={on_reset}
                >
                    {"Réinitialiser"}
                </button>
            }
        </div>
    }
}
