use payloads::requests::LoginCredentials;
use web_sys::HtmlInputElement;
use yew::prelude::*;
use yew_router::prelude::*;
use yewdux::prelude::*;

use crate::{AuthState, Route, State, get_api_client, session};

#[function_component]
pub fn LoginPage() -> Html {
    let (state, dispatch) = use_store::<State>();
    let navigator = use_navigator();
    let email_ref = use_node_ref();
    let password_ref = use_node_ref();
    let error_message = use_state(|| None::<String>);
    let is_loading = use_state(|| false);

    if state.is_authenticated() {
        return html! { <Redirect<Route> to={Route::Bookings} /> };
    }

    let on_submit = {
        let email_ref = email_ref.clone();
        let password_ref = password_ref.clone();
        let error_message = error_message.clone();
        let is_loading = is_loading.clone();

        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let (Some(email), Some(password)) = (
                email_ref.cast::<HtmlInputElement>(),
                password_ref.cast::<HtmlInputElement>(),
            ) else {
                return;
            };
            let credentials = LoginCredentials {
                email: email.value().trim().to_owned(),
                password: password.value(),
            };
            if credentials.email.is_empty() || credentials.password.is_empty() {
                error_message.set(Some(
                    "Veuillez saisir votre e-mail et votre mot de passe".into(),
                ));
                return;
            }

            let error_message = error_message.clone();
            let is_loading = is_loading.clone();
            let dispatch = dispatch.clone();
            let navigator = navigator.clone();
            yew::platform::spawn_local(async move {
                is_loading.set(true);
                error_message.set(None);

                let api_client = get_api_client();
                let result = match api_client.login(&credentials).await {
                    Ok(tokens) => {
                        session::store_token(&tokens.access_token);
                        api_client.current_user().await
                    }
                    Err(e) => Err(e),
                };
                match result {
                    Ok(profile) => {
                        dispatch.reduce_mut(|state| {
                            state.auth_state = AuthState::LoggedIn(profile);
                        });
                        if let Some(navigator) = navigator {
                            navigator.push(&Route::Bookings);
                        }
                    }
                    Err(e) => error_message.set(Some(e.to_string())),
                }

                is_loading.set(false);
            });
        })
    };

    let input_class = "w-full border border-neutral-300 dark:border-neutral-600 \
                       rounded-md bg-white dark:bg-neutral-700 px-3 py-2";

    html! {
        <main class="max-w-sm mx-auto py-24">
            <h1 class="text-2xl font-semibold mb-6">{"Connexion administrateur"}</h1>
            <form onsubmit={on_submit} class="space-y-4">
                <input ref={email_ref} type="email" placeholder="E-mail" class={input_class} />
                <input ref={password_ref} type="password" placeholder="Mot de passe" class={input_class} />
                if let Some(message) = &*error_message {
                    <p class="text-sm text-red-600 dark:text-red-400">{message}</p>
                }
                <button
                    type="submit"
                    disabled={*is_loading}
                    class="w-full py-2 rounded-md bg-neutral-900 text-white disabled:opacity-50"
                >
                    {if *is_loading { "Connexion..." } else { "Se connecter" }}
                </button>
            </form>
        </main>
    }
}
