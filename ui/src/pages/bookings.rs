use grid::admin::{BOOKINGS_ENDPOINT, BookingsFilter, bookings_params};
use grid::view::{Align, Column, ViewMode};
use grid::{GridOptions, SortItem, deserialize_rows};
use jiff::civil::Date;
use payloads::requests::UpdateBookingStatus;
use payloads::responses::BookingItem;
use payloads::{BookingId, BookingStatus};
use std::rc::Rc;
use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::prelude::*;

use super::{confirm, report_mutation_error};
use crate::components::{DataTable, SelectFilter, ServerToolbar};
use crate::contexts::toast::use_toast;
use crate::get_api_client;
use crate::hooks::{ServerGridConfig, use_server_grid};

fn columns() -> Vec<Column> {
    vec![
        Column::new("id", "#").width(64),
        Column::new("clientEmail", "Client"),
        Column::new("providerEmail", "Prestataire"),
        Column::new("serviceName", "Service"),
        Column::new("price", "Prix (€)").align(Align::Right),
        Column::new("date", "Date"),
        Column::new("status", "Statut"),
    ]
}

/// `None` once every criterion has been cleared.
fn non_empty(filter: BookingsFilter) -> Option<BookingsFilter> {
    (!filter.is_empty()).then_some(filter)
}

#[function_component]
pub fn BookingsPage() -> Html {
    let toasts = use_toast();
    let columns = use_memo((), |_| columns());
    let grid = use_server_grid(ServerGridConfig {
        endpoint: BOOKINGS_ENDPOINT,
        options: GridOptions::default().sort(vec![SortItem::desc("date")]),
        mapper: Rc::new(bookings_params),
        map_row: deserialize_rows::<BookingItem>(),
    });
    let snapshot = &grid.snapshot;
    let filter = snapshot.filter.clone().unwrap_or_default();

    // Every filter control rewrites one field of the current filter.
    let update_filter = {
        let set_filter = grid.set_filter.clone();
        let filter = filter.clone();
        move |apply: fn(&mut BookingsFilter, &str)| {
            let set_filter = set_filter.clone();
            let filter = filter.clone();
            Callback::from(move |value: String| {
                let mut next = filter.clone();
                apply(&mut next, value.trim());
                set_filter.emit(non_empty(next));
            })
        }
    };

    let status_filter = SelectFilter {
        label: "Statut".into(),
        options: BookingStatus::ALL
            .iter()
            .map(|status| (status.to_string().into(), status.label().into()))
            .collect(),
        value: filter
            .status
            .map(|status| status.to_string())
            .unwrap_or_default()
            .into(),
        on_change: update_filter(|f, value| f.status = BookingStatus::parse(value)),
    };

    let on_provider = update_filter(|f, value| f.provider_id = value.parse().ok());
    let on_client = update_filter(|f, value| f.client_id = value.parse().ok());
    let on_date = update_filter(|f, value| f.date = value.parse::<Date>().ok());
    let input_value = |on_change: Callback<String>| {
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            on_change.emit(input.value());
        })
    };

    let on_reset = {
        let set_filter = grid.set_filter.clone();
        let set_search = grid.set_search.clone();
        Callback::from(move |()| {
            set_filter.emit(None);
            set_search.emit(String::new());
        })
    };

    let row_actions = {
        let toasts = toasts.clone();
        let refresh = grid.refresh.clone();
        Callback::from(move |booking: BookingItem| {
            let id = booking.id;
            let on_status = {
                let toasts = toasts.clone();
                let refresh = refresh.clone();
                Callback::from(move |e: Event| {
                    let select: HtmlSelectElement = e.target_unchecked_into();
                    if let Some(status) = BookingStatus::parse(&select.value()) {
                        change_status(id, status, toasts.clone(), refresh.clone());
                    }
                })
            };
            let on_delete = {
                let toasts = toasts.clone();
                let refresh = refresh.clone();
                Callback::from(move |_: MouseEvent| {
                    if confirm(&format!("Supprimer la réservation #{id} ?")) {
                        delete(id, toasts.clone(), refresh.clone());
                    }
                })
            };
            html! {
                <div class="flex items-center justify-end gap-2">
                    <select onchange={on_status} class="text-sm border rounded px-1 py-0.5">
                        {for BookingStatus::ALL.iter().map(|status| html! {
                            <option
                                value={status.to_string()}
                                selected={*status == booking.status}
                            >
                                {status.label()}
                            </option>
                        })}
                    </select>
                    <button onclick={on_delete} class="text-sm text-red-600 hover:text-red-800">
                        {"Supprimer"}
                    </button>
                </div>
            }
        })
    };

    let number_class = "w-28 border border-neutral-300 dark:border-neutral-600 \
                        rounded-md bg-white dark:bg-neutral-700 px-2 py-1 text-sm";

    html! {
        <section>
            <h2 class="text-2xl font-semibold mb-4">{"Réservations"}</h2>
            <ServerToolbar
                search={snapshot.search.clone()}
                on_search={grid.set_search.clone()}
                placeholder="Client, prestataire ou service"
                filters={vec![status_filter]}
                {on_reset}
            >
                <input
                    type="number"
                    placeholder="Prestataire #"
                    class={number_class}
                    value={filter.provider_id.map(|id| id.to_string()).unwrap_or_default()}
                    onchange={input_value(on_provider)}
                />
                <input
                    type="number"
                    placeholder="Client #"
                    class={number_class}
                    value={filter.client_id.map(|id| id.to_string()).unwrap_or_default()}
                    onchange={input_value(on_client)}
                />
                <input
                    type="date"
                    class={number_class}
                    value={filter.date.map(|date| date.to_string()).unwrap_or_default()}
                    onchange={input_value(on_date)}
                />
            </ServerToolbar>
            {for snapshot.field_errors.iter().map(|(field, message)| html! {
                <p class="mb-2 text-sm text-amber-700 dark:text-amber-400">
                    {format!("{field} : {message}")}
                </p>
            })}
            <DataTable<BookingItem>
                columns={columns}
                rows={Rc::new(snapshot.rows.clone())}
                mode={ViewMode::Server}
                loading={snapshot.loading}
                total={snapshot.total}
                pagination={snapshot.pagination}
                sort={snapshot.sort.clone()}
                on_pagination={grid.set_pagination.clone()}
                on_sort={grid.set_sort.clone()}
                {row_actions}
                empty_message="Aucune réservation"
            />
        </section>
    }
}

fn change_status(
    id: BookingId,
    status: BookingStatus,
    toasts: crate::contexts::toast::ToastHandle,
    refresh: Callback<()>,
) {
    yew::platform::spawn_local(async move {
        let details = UpdateBookingStatus { status };
        match get_api_client().update_booking_status(id, &details).await {
            Ok(_) => toasts.success(format!("Réservation #{id} : {}", status.label())),
            Err(e) => report_mutation_error(&toasts, &e),
        }
        // a rejected change also needs the select reset to the stored status
        refresh.emit(());
    });
}

fn delete(
    id: BookingId,
    toasts: crate::contexts::toast::ToastHandle,
    refresh: Callback<()>,
) {
    yew::platform::spawn_local(async move {
        match get_api_client().delete_booking(id).await {
            Ok(()) => {
                toasts.success(format!("Réservation #{id} supprimée"));
                refresh.emit(());
            }
            Err(e) => report_mutation_error(&toasts, &e),
        }
    });
}
