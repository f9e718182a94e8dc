use crate::models::User;
use serde::{Deserialize, Serialize};

pub(crate) const TOKEN_KEY: &str = "craftspace_token";
pub(crate) const USER_KEY: &str = "craftspace_user";
pub(crate) const CURRENT_WORKSPACE_KEY: &str = "craftspace_current_workspace_id";

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok().flatten())
}

pub(crate) fn load_token() -> Option<String> {
    local_storage()
        .and_then(|s| s.get_item(TOKEN_KEY).ok().flatten())
        .filter(|t| !t.trim().is_empty())
}

pub(crate) fn save_token(token: &str) {
    if let Some(storage) = local_storage() {
        let _ = storage.set_item(TOKEN_KEY, token);
    }
}

/// Clears token and cached user. Called on logout and on a global 401.
pub(crate) fn clear_auth() {
    if let Some(storage) = local_storage() {
        let _ = storage.remove_item(TOKEN_KEY);
        let _ = storage.remove_item(USER_KEY);
    }
}

pub(crate) fn save_user(user: &User) {
    save_json(USER_KEY, user);
}

/// Malformed persisted JSON is treated as absence of data, never an error.
pub(crate) fn load_user() -> Option<User> {
    load_json::<User>(USER_KEY)
}

pub(crate) fn load_current_workspace_id() -> Option<String> {
    local_storage()
        .and_then(|s| s.get_item(CURRENT_WORKSPACE_KEY).ok().flatten())
        .filter(|id| !id.trim().is_empty())
}

/// `None` removes the key; the selection must never persist a stale id.
pub(crate) fn save_current_workspace_id(id: Option<&str>) {
    if let Some(storage) = local_storage() {
        match id {
            Some(id) if !id.trim().is_empty() => {
                let _ = storage.set_item(CURRENT_WORKSPACE_KEY, id);
            }
            _ => {
                let _ = storage.remove_item(CURRENT_WORKSPACE_KEY);
            }
        }
    }
}

pub(crate) fn load_json<T: for<'de> Deserialize<'de>>(key: &str) -> Option<T> {
    let json = local_storage()?.get_item(key).ok().flatten()?;
    serde_json::from_str(&json).ok()
}

pub(crate) fn save_json<T: Serialize>(key: &str, value: &T) {
    if let Ok(json) = serde_json::to_string(value) {
        if let Some(storage) = local_storage() {
            let _ = storage.set_item(key, &json);
        }
    }
}

// WASM-only tests (run with `cargo test --target wasm32-unknown-unknown` + wasm-bindgen-test-runner)
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn token_roundtrip_and_clear() {
        clear_auth();
        assert!(load_token().is_none());

        save_token("t1");
        assert_eq!(load_token().as_deref(), Some("t1"));

        clear_auth();
        assert!(load_token().is_none());
    }

    #[wasm_bindgen_test]
    fn user_roundtrip() {
        let user = crate::models::User {
            id: "u-1".to_string(),
            email: "u@example.com".to_string(),
            name: "U".to_string(),
            profile_picture: None,
            is_email_verified: false,
        };
        save_user(&user);
        let loaded = load_user().expect("should load user from localStorage");
        assert_eq!(loaded, user);
    }

    #[wasm_bindgen_test]
    fn workspace_id_roundtrip() {
        save_current_workspace_id(Some("w-9"));
        assert_eq!(load_current_workspace_id().as_deref(), Some("w-9"));

        save_current_workspace_id(None);
        assert!(load_current_workspace_id().is_none());
    }
}
