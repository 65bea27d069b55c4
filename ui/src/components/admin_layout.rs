use yew::prelude::*;
use yew_router::prelude::*;
use yewdux::prelude::*;

use crate::hooks::use_authentication;
use crate::{AuthState, Route, State, get_api_client, session};

#[derive(Properties, PartialEq)]
pub struct AdminLayoutProps {
    pub children: Html,
}

/// Navigation shell of the admin screens. Visitors without a session are
/// sent to the login page.
#[function_component]
pub fn AdminLayout(props: &AdminLayoutProps) -> Html {
    use_authentication();
    let (state, dispatch) = use_store::<State>();
    let route = use_route::<Route>();

    let on_logout = Callback::from(move |_: MouseEvent| {
        get_api_client().logout();
        session::clear_token();
        dispatch.reduce_mut(|state| state.auth_state = AuthState::LoggedOut);
    });

    let email = match &state.auth_state {
        AuthState::Unknown => {
            return html! {
                <p class="p-8 text-center text-neutral-500">{"Chargement..."}</p>
            };
        }
        AuthState::LoggedOut => return html! { <Redirect<Route> to={Route::Login} /> },
        AuthState::LoggedIn(profile) => profile.email.clone(),
    };

    let link = |to: Route, label: &'static str| {
        let active = route.as_ref() == Some(&to);
        let class = if active {
            "px-3 py-2 rounded-md text-sm font-medium bg-neutral-900 text-white"
        } else {
            "px-3 py-2 rounded-md text-sm font-medium text-neutral-600 \
             dark:text-neutral-300 hover:bg-neutral-100 dark:hover:bg-neutral-700"
        };
        html! { <Link<Route> {to} classes={class}>{label}</Link<Route>> }
    };

    html! {
        <>
            <header class="bg-white dark:bg-neutral-800 border-b border-neutral-200 dark:border-neutral-700">
                <div class="max-w-7xl mx-auto px-4 sm:px-6 lg:px-8 flex items-center justify-between h-16">
                    <div class="flex items-center gap-6">
                        <h1 class="text-xl font-semibold">{"Almawash Admin"}</h1>
                        <nav class="flex gap-2">
                            {link(Route::Bookings, "Réservations")}
                            {link(Route::Users, "Utilisateurs")}
                            {link(Route::Revenue, "Revenus")}
                            {link(Route::Notifications, "Notifications")}
                        </nav>
                    </div>
                    <div class="flex items-center gap-4 text-sm">
                        <span class="text-neutral-500">{email}</span>
                        <button onclick={on_logout} class="text-neutral-600 hover:text-neutral-900 dark:text-neutral-300">
                            {"Déconnexion"}
                        </button>
                    </div>
                </div>
            </header>
            <main class="max-w-7xl mx-auto px-4 sm:px-6 lg:px-8 py-8">
                {props.children.clone()}
            </main>
        </>
    }
}
