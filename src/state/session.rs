use crate::api::{ApiClient, ApiErrorKind, ApiResult};
use crate::models::User;
use crate::storage;
use leptos::prelude::*;
use leptos::task::spawn_local;

/// Authenticated-user state for the running client.
///
/// `is_loading` starts true and flips false once `initialize` has read
/// the persisted session; route guards must not decide before that.
#[derive(Clone, Copy)]
pub(crate) struct SessionState {
    api: RwSignal<ApiClient>,
    user: RwSignal<Option<User>>,
    is_loading: RwSignal<bool>,
    show_workspace_modal: RwSignal<bool>,

    /// Injected at construction; clears the workspace context on logout.
    on_clear_workspace: Callback<()>,
}

impl SessionState {
    pub fn new(api: RwSignal<ApiClient>, on_clear_workspace: Callback<()>) -> Self {
        Self {
            api,
            user: RwSignal::new(None),
            is_loading: RwSignal::new(true),
            show_workspace_modal: RwSignal::new(false),
            on_clear_workspace,
        }
    }

    pub fn user(&self) -> RwSignal<Option<User>> {
        self.user
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading.get()
    }

    /// Token presence is the authentication criterion; the cached user
    /// object is a convenience that re-validation may replace.
    pub fn is_authenticated(&self) -> bool {
        self.api.with(|c| c.is_authenticated())
    }

    pub fn show_workspace_modal(&self) -> RwSignal<bool> {
        self.show_workspace_modal
    }

    /// Replaces the cached user after a profile update.
    pub fn apply_user(&self, user: User) {
        storage::save_user(&user);
        self.user.set(Some(user));
    }

    /// Restores the session from the persistent store, then re-validates
    /// it against `GET /users/me` in the background. A 401 from the
    /// re-validation logs the user out; any other failure is logged and
    /// the cached session is kept (transient backend trouble must not
    /// boot the user).
    pub fn initialize(&self) {
        if storage::load_token().is_none() {
            self.is_loading.set(false);
            return;
        }

        if let Some(cached) = storage::load_user() {
            self.user.set(Some(cached));
        }
        self.is_loading.set(false);

        let s = *self;
        spawn_local(async move {
            match s.api.get_untracked().fetch_current_user().await {
                Ok(fresh) => {
                    storage::save_user(&fresh);
                    s.user.set(Some(fresh));
                }
                Err(e) if e.kind == ApiErrorKind::Unauthorized => {
                    s.logout();
                }
                Err(e) => {
                    web_sys::console::warn_1(
                        &format!("session re-validation failed: {e}").into(),
                    );
                }
            }
        });
    }

    /// On success the workspace chooser is shown instead of navigating;
    /// on failure partial auth state is cleared and the error rethrown
    /// for the form to display.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<()> {
        let res = self.api.get_untracked().login(email, password).await;
        self.finish_auth(res)
    }

    pub async fn register(&self, email: &str, password: &str, name: &str) -> ApiResult<()> {
        let res = self.api.get_untracked().signup(email, password, name).await;
        self.finish_auth(res)
    }

    fn finish_auth(&self, res: ApiResult<crate::api::AuthResponse>) -> ApiResult<()> {
        match res {
            Ok(auth) => {
                self.api.update(|c| c.set_token(auth.token.clone()));
                storage::save_user(&auth.user);
                self.user.set(Some(auth.user));
                self.show_workspace_modal.set(true);
                Ok(())
            }
            Err(e) => {
                self.api.update(|c| c.clear_token());
                self.user.set(None);
                Err(e)
            }
        }
    }

    /// Local state is cleared regardless of the remote call outcome, and
    /// a 401 from the logout endpoint means "already logged out".
    pub fn logout(&self) {
        let api = self.api.get_untracked();
        spawn_local(async move {
            if let Err(e) = api.logout_remote().await {
                if e.kind != ApiErrorKind::Unauthorized {
                    web_sys::console::warn_1(&format!("remote logout failed: {e}").into());
                }
            }
        });

        self.clear_local();

        if let Some(win) = web_sys::window() {
            let _ = win.location().set_href("/");
        }
    }

    fn clear_local(&self) {
        self.api.update(|c| c.clear_token());
        self.user.set(None);
        self.show_workspace_modal.set(false);
        self.on_clear_workspace.run(());
    }
}
