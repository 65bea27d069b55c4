use grid::admin::NOTIFICATIONS_ENDPOINT;
use grid::view::{Column, ViewMode};
use grid::{DefaultParamMapper, GridOptions, deserialize_rows};
use payloads::responses::NotificationItem;
use std::rc::Rc;
use yew::prelude::*;

use super::report_mutation_error;
use crate::components::DataTable;
use crate::contexts::toast::use_toast;
use crate::get_api_client;
use crate::hooks::{ServerGridConfig, use_server_grid};

// The endpoint returns its items newest first and ignores sort parameters.
fn columns() -> Vec<Column> {
    vec![
        Column::new("receivedAt", "Reçue le").unsortable().width(200),
        Column::new("title", "Titre").unsortable(),
        Column::new("body", "Message").unsortable(),
        Column::new("read", "État").unsortable().width(96),
    ]
}

#[function_component]
pub fn NotificationsPage() -> Html {
    let toasts = use_toast();
    let columns = use_memo((), |_| columns());
    let grid = use_server_grid::<NotificationItem, ()>(ServerGridConfig {
        endpoint: NOTIFICATIONS_ENDPOINT,
        options: GridOptions::default(),
        mapper: Rc::new(DefaultParamMapper),
        map_row: deserialize_rows(),
    });
    let snapshot = &grid.snapshot;

    let row_actions = {
        let refresh = grid.refresh.clone();
        Callback::from(move |item: NotificationItem| {
            if item.read {
                return html! {};
            }
            let on_read = {
                let id = item.id.clone();
                let toasts = toasts.clone();
                let refresh = refresh.clone();
                Callback::from(move |_: MouseEvent| {
                    let id = id.clone();
                    let toasts = toasts.clone();
                    let refresh = refresh.clone();
                    yew::platform::spawn_local(async move {
                        match get_api_client().mark_notification_read(&id).await {
                            Ok(()) => refresh.emit(()),
                            Err(e) => report_mutation_error(&toasts, &e),
                        }
                    });
                })
            };
            html! {
                <div class="flex justify-end text-sm">
                    <button onclick={on_read} class="text-neutral-600 hover:text-neutral-900">
                        {"Marquer comme lue"}
                    </button>
                </div>
            }
        })
    };

    html! {
        <section>
            <h2 class="text-2xl font-semibold mb-4">{"Notifications"}</h2>
            <DataTable<NotificationItem>
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
                empty_message="Aucune notification"
            />
        </section>
    }
}
