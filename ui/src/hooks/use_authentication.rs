use yew::prelude::*;
use yewdux::prelude::*;

use crate::{AuthState, State, get_api_client, session};

/// Resolve the stored session once on startup.
#[hook]
pub fn use_authentication() {
    let (state, dispatch) = use_store::<State>();
    let unresolved = state.auth_state == AuthState::Unknown;

    use_effect_with((), move |_| {
        if !unresolved {
            return;
        }
        if session::load_token().is_none() {
            dispatch.reduce_mut(|state| state.auth_state = AuthState::LoggedOut);
            return;
        }
        yew::platform::spawn_local(async move {
            // A rejected token is cleared by the unauthorized hook.
            match get_api_client().current_user().await {
                Ok(profile) => dispatch.reduce_mut(|state| {
                    state.auth_state = AuthState::LoggedIn(profile);
                }),
                Err(e) => {
                    tracing::warn!("Could not restore session: {e}");
                    dispatch.reduce_mut(|state| {
                        state.auth_state = AuthState::LoggedOut;
                    });
                }
            }
        });
    });
}
