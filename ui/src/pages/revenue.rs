use grid::admin::{REVENUE_ENDPOINT, revenue_rows};
use grid::view::{Align, Column, ViewMode};
use grid::{DefaultParamMapper, GridOptions, Pagination, SortItem};
use payloads::responses::{AdminStatsResponse, RevenuePoint, TopProvider};
use std::rc::Rc;
use yew::prelude::*;

use crate::components::{DataTable, TableVariant};
use crate::contexts::toast::use_toast;
use crate::get_api_client;
use crate::hooks::{ServerGridConfig, use_server_grid};

#[derive(Properties, PartialEq)]
struct StatCardProps {
    label: AttrValue,
    value: u64,
}

#[function_component]
fn StatCard(props: &StatCardProps) -> Html {
    html! {
        <div class="bg-white dark:bg-neutral-800 rounded-lg shadow p-4">
            <p class="text-sm text-neutral-500">{&props.label}</p>
            <p class="text-2xl font-semibold">{props.value}</p>
        </div>
    }
}

#[function_component]
pub fn RevenuePage() -> Html {
    let toasts = use_toast();
    let stats = use_state(|| None::<AdminStatsResponse>);
    let revenue_columns = use_memo((), |_| {
        vec![
            Column::new("month", "Mois"),
            Column::new("value", "Montant (€)").align(Align::Right),
        ]
    });
    let provider_columns = use_memo((), |_| {
        vec![
            Column::new("name", "Prestataire"),
            Column::new("completed", "Prestations terminées").align(Align::Right),
        ]
    });
    let grid = use_server_grid::<RevenuePoint, ()>(ServerGridConfig {
        endpoint: REVENUE_ENDPOINT,
        options: GridOptions::default()
            .page_size(12)
            .sort(vec![SortItem::asc("month")]),
        mapper: Rc::new(DefaultParamMapper),
        map_row: revenue_rows(),
    });

    {
        let stats = stats.clone();
        use_effect_with((), move |_| {
            yew::platform::spawn_local(async move {
                match get_api_client().global_stats().await {
                    Ok(response) => stats.set(Some(response)),
                    Err(e) => {
                        tracing::warn!("Failed to load global stats: {e}");
                        toasts.error(e.to_string());
                    }
                }
            });
        });
    }

    let snapshot = &grid.snapshot;
    let top_providers: Rc<Vec<TopProvider>> = Rc::new(
        (*stats)
            .as_ref()
            .map(|stats| stats.top_providers.clone())
            .unwrap_or_default(),
    );

    html! {
        <section class="space-y-6">
            <h2 class="text-2xl font-semibold">{"Revenus"}</h2>
            if let Some(stats) = &*stats {
                <div class="grid grid-cols-2 md:grid-cols-4 gap-4">
                    <StatCard label="Utilisateurs" value={stats.total_users} />
                    <StatCard label="Prestataires actifs" value={stats.active_providers} />
                    <StatCard label="Réservations" value={stats.total_bookings} />
                    <StatCard label="Terminées" value={stats.completed_bookings} />
                </div>
            }
            <div class="grid md:grid-cols-3 gap-6">
                <div class="md:col-span-2">
                    <DataTable<RevenuePoint>
                        columns={revenue_columns}
                        rows={Rc::new(snapshot.rows.clone())}
                        mode={ViewMode::Server}
                        loading={snapshot.loading}
                        total={snapshot.total}
                        pagination={snapshot.pagination}
                        sort={snapshot.sort.clone()}
                        on_pagination={grid.set_pagination.clone()}
                        on_sort={grid.set_sort.clone()}
                        empty_message="Aucun revenu enregistré"
                    />
                </div>
                <div>
                    <h3 class="text-lg font-medium mb-2">{"Meilleurs prestataires"}</h3>
                    <DataTable<TopProvider>
                        columns={provider_columns}
                        rows={top_providers}
                        variant={TableVariant::Compact}
                        mode={ViewMode::Client}
                        pagination={Pagination::new(5)}
                        loading={stats.is_none()}
                    />
                </div>
            </div>
        </section>
    }
}
