//! Bearer token persistence in `localStorage`.

use web_sys::Storage;

const TOKEN_KEY: &str = "almawash-token";

fn storage() -> Option<Storage> {
    web_sys::window()?.local_storage().ok()?
}

pub fn load_token() -> Option<String> {
    storage()?
        .get_item(TOKEN_KEY)
        .ok()?
        .filter(|token| !token.is_empty())
}

pub fn store_token(token: &str) {
    if let Some(storage) = storage()
        && storage.set_item(TOKEN_KEY, token).is_err()
    {
        tracing::warn!("Could not persist the session token");
    }
}

pub fn clear_token() {
    if let Some(storage) = storage()
        && storage.remove_item(TOKEN_KEY).is_err()
    {
        tracing::warn!("Could not clear the session token");
    }
}
