use grid::admin::{USERS_ENDPOINT, UsersFilter};
use grid::view::{Column, ViewMode};
use grid::{DefaultParamMapper, GridOptions, deserialize_rows};
use payloads::UserRole;
use payloads::requests::AdminUserRequest;
use payloads::responses::AdminUser;
use std::rc::Rc;
use yew::prelude::*;

use super::user_form::UserForm;
use super::{confirm, report_mutation_error};
use crate::components::{DataTable, SelectFilter, ServerToolbar};
use crate::contexts::toast::{ToastHandle, use_toast};
use crate::get_api_client;
use crate::hooks::{ServerGridConfig, use_server_grid};

fn columns() -> Vec<Column> {
    vec![
        Column::new("id", "#").width(64),
        Column::new("email", "E-mail"),
        Column::new("phone", "Téléphone").unsortable(),
        Column::new("role", "Rôle"),
        Column::new("createdAt", "Inscription"),
        Column::new("active", "État"),
    ]
}

/// What the form above the table is doing, if open.
#[derive(Debug, Clone, PartialEq)]
enum Editing {
    New,
    User(AdminUser),
}

#[function_component]
pub fn UsersPage() -> Html {
    let toasts = use_toast();
    let editing = use_state(|| None::<Editing>);
    let columns = use_memo((), |_| columns());
    let grid = use_server_grid(ServerGridConfig {
        endpoint: USERS_ENDPOINT,
        options: GridOptions::default(),
        mapper: Rc::new(DefaultParamMapper),
        map_row: deserialize_rows::<AdminUser>(),
    });
    let snapshot = &grid.snapshot;
    let filter: UsersFilter = snapshot.filter.clone().unwrap_or_default();

    let role_filter = {
        let set_filter = grid.set_filter.clone();
        let filter = filter.clone();
        SelectFilter {
            label: "Rôle".into(),
            options: UserRole::ALL
                .iter()
                .map(|role| (role.to_string().into(), role.label().into()))
                .collect(),
            value: filter.role.map(|r| r.to_string()).unwrap_or_default().into(),
            on_change: Callback::from(move |value: String| {
                let next = UsersFilter {
                    role: UserRole::parse(&value),
                    ..filter.clone()
                };
                set_filter.emit((next != UsersFilter::default()).then_some(next));
            }),
        }
    };
    let active_filter = {
        let set_filter = grid.set_filter.clone();
        let filter = filter.clone();
        SelectFilter {
            label: "État".into(),
            options: vec![
                ("true".into(), "Actif".into()),
                ("false".into(), "Inactif".into()),
            ],
            value: filter.active.map(|a| a.to_string()).unwrap_or_default().into(),
            on_change: Callback::from(move |value: String| {
                let next = UsersFilter {
                    active: value.parse().ok(),
                    ..filter.clone()
                };
                set_filter.emit((next != UsersFilter::default()).then_some(next));
            }),
        }
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
        let refresh = grid.refresh.clone();
        let editing = editing.clone();
        Callback::from(move |user: AdminUser| {
            let active = user.active.unwrap_or(true);
            let on_edit = {
                let user = user.clone();
                let editing = editing.clone();
                Callback::from(move |_: MouseEvent| {
                    editing.set(Some(Editing::User(user.clone())));
                })
            };
            let on_toggle = {
                let user = user.clone();
                let toasts = toasts.clone();
                let refresh = refresh.clone();
                Callback::from(move |_: MouseEvent| {
                    set_active(user.clone(), !active, toasts.clone(), refresh.clone());
                })
            };
            let on_delete = {
                let id = user.id;
                let email = user.email.clone();
                let toasts = toasts.clone();
                let refresh = refresh.clone();
                Callback::from(move |_: MouseEvent| {
                    if !confirm(&format!("Supprimer {email} ?")) {
                        return;
                    }
                    let toasts = toasts.clone();
                    let refresh = refresh.clone();
                    yew::platform::spawn_local(async move {
                        match get_api_client().delete_user(id).await {
                            Ok(()) => {
                                toasts.success("Utilisateur supprimé");
                                refresh.emit(());
                            }
                            Err(e) => report_mutation_error(&toasts, &e),
                        }
                    });
                })
            };
            html! {
                <div class="flex items-center justify-end gap-3 text-sm">
                    <button onclick={on_edit} class="text-neutral-600 hover:text-neutral-900">
                        {"Modifier"}
                    </button>
                    <button onclick={on_toggle} class="text-neutral-600 hover:text-neutral-900">
                        {if active { "Désactiver" } else { "Activer" }}
                    </button>
                    <button onclick={on_delete} class="text-red-600 hover:text-red-800">
                        {"Supprimer"}
                    </button>
                </div>
            }
        })
    };

    let on_new = {
        let editing = editing.clone();
        Callback::from(move |_: MouseEvent| editing.set(Some(Editing::New)))
    };
    let on_saved = {
        let editing = editing.clone();
        let refresh = grid.refresh.clone();
        Callback::from(move |()| {
            editing.set(None);
            refresh.emit(());
        })
    };
    let on_cancel = {
        let editing = editing.clone();
        Callback::from(move |()| editing.set(None))
    };
    // keyed so that switching target remounts the form with fresh fields
    let form = match &*editing {
        Some(Editing::New) => html! {
            <UserForm key="new" {on_saved} {on_cancel} />
        },
        Some(Editing::User(user)) => html! {
            <UserForm
                key={user.id.to_string()}
                user={Some(user.clone())}
                {on_saved}
                {on_cancel}
            />
        },
        None => html! {},
    };

    html! {
        <section>
            <div class="flex items-center justify-between mb-4">
                <h2 class="text-2xl font-semibold">{"Utilisateurs"}</h2>
                <button
                    onclick={on_new}
                    class="px-4 py-2 rounded-md text-sm bg-neutral-900 text-white"
                >
                    {"Nouvel utilisateur"}
                </button>
            </div>
            {form}
            <ServerToolbar
                search={snapshot.search.clone()}
                on_search={grid.set_search.clone()}
                placeholder="E-mail ou téléphone"
                filters={vec![role_filter, active_filter]}
                {on_reset}
            />
            <DataTable<AdminUser>
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
                empty_message="Aucun utilisateur"
            />
        </section>
    }
}

fn set_active(user: AdminUser, active: bool, toasts: ToastHandle, refresh: Callback<()>) {
    let id = user.id;
    let request = AdminUserRequest {
        email: user.email,
        phone: user.phone,
        role: user.role,
        active: Some(active),
    };
    if let Some((_, message)) = request.validate().first() {
        toasts.warning(*message);
        return;
    }
    yew::platform::spawn_local(async move {
        match get_api_client().update_user(id, &request).await {
            Ok(updated) => {
                let state = if active { "activé" } else { "désactivé" };
                toasts.success(format!("{} {state}", updated.email));
                refresh.emit(());
            }
            Err(e) => report_mutation_error(&toasts, &e),
        }
    });
}
