use payloads::{APIClient, responses};
use std::sync::Arc;
use yew::prelude::*;
use yew_router::prelude::*;
use yewdux::prelude::*;

mod components;
mod contexts;
mod hooks;
mod logs;
mod pages;
mod session;

use components::{AdminLayout, ToastContainer};
use contexts::toast::ToastProvider;

#[derive(Clone, PartialEq, Default)]
pub enum AuthState {
    #[default]
    Unknown,
    LoggedOut,
    LoggedIn(responses::UserProfile),
}

#[derive(Default, Clone, PartialEq, Store)]
pub struct State {
    pub auth_state: AuthState,
}

impl State {
    pub fn is_authenticated(&self) -> bool {
        matches!(self.auth_state, AuthState::LoggedIn(_))
    }
}

// Global API client - configurable via environment or same-origin fallback
pub fn get_api_client() -> APIClient {
    // Try environment variable first (set at build time)
    let address = option_env!("BACKEND_URL")
        .map(|url| url.to_string())
        .or_else(|| {
            web_sys::window().and_then(|window| window.location().origin().ok())
        })
        .unwrap_or_default();

    let client = APIClient::new(address).on_unauthorized(Arc::new(|| {
        session::clear_token();
        Dispatch::<State>::global().reduce_mut(|state| {
            state.auth_state = AuthState::LoggedOut;
        });
    }));
    match session::load_token() {
        Some(token) => client.with_token(token),
        None => client,
    }
}

#[function_component]
pub fn App() -> Html {
    logs::init_logging();
    html! {
        <BrowserRouter>
            <ToastProvider>
                <div class="min-h-screen bg-neutral-50 dark:bg-neutral-900 text-neutral-900 dark:text-neutral-100">
                    <Switch<Route> render={switch} />
                </div>
                <ToastContainer />
            </ToastProvider>
        </BrowserRouter>
    }
}

#[derive(Clone, Routable, PartialEq)]
pub enum Route {
    #[at("/")]
    Home,
    #[at("/login")]
    Login,
    #[at("/bookings")]
    Bookings,
    #[at("/users")]
    Users,
    #[at("/revenue")]
    Revenue,
    #[at("/notifications")]
    Notifications,
    #[not_found]
    #[at("/404")]
    NotFound,
}

fn switch(routes: Route) -> Html {
    match routes {
        Route::Home => html! { <Redirect<Route> to={Route::Bookings} /> },
        Route::Login => html! { <pages::LoginPage /> },
        Route::Bookings => html! {
            <AdminLayout><pages::BookingsPage /></AdminLayout>
        },
        Route::Users => html! {
            <AdminLayout><pages::UsersPage /></AdminLayout>
        },
        Route::Revenue => html! {
            <AdminLayout><pages::RevenuePage /></AdminLayout>
        },
        Route::Notifications => html! {
            <AdminLayout><pages::NotificationsPage /></AdminLayout>
        },
        Route::NotFound => html! {
            <main class="max-w-7xl mx-auto px-4 sm:px-6 lg:px-8 py-8">
                <div class="text-center">
                    <h1 class="text-4xl font-bold">{"404"}</h1>
                    <p class="text-neutral-600 dark:text-neutral-300">{"Page introuvable"}</p>
                </div>
            </main>
        },
    }
}
