mod page_save;
mod session;
mod workspace;

pub(crate) use page_save::PageSaveController;
pub(crate) use session::SessionState;
pub(crate) use workspace::WorkspaceState;

use crate::api::ApiClient;
use crate::toast::Toasts;
use leptos::prelude::*;

/// Application state container. Constructed exactly once in `App` and
/// provided via context; everything it holds is signal-backed so the
/// whole struct is cheap to copy into closures.
#[derive(Clone, Copy)]
pub(crate) struct AppState {
    pub api_client: RwSignal<ApiClient>,
    pub toasts: Toasts,
    pub session: SessionState,
    pub workspace: WorkspaceState,
}

impl AppState {
    pub fn new() -> Self {
        let toasts = Toasts::new();
        let api_client = RwSignal::new(ApiClient::load_from_storage(toasts));

        let workspace = WorkspaceState::new(api_client, toasts);

        // Session clears workspace state on logout through this injected
        // capability instead of reaching across contexts.
        let clear_workspace = Callback::new(move |_| workspace.clear());
        let session = SessionState::new(api_client, clear_workspace);

        Self {
            api_client,
            toasts,
            session,
            workspace,
        }
    }

    /// Composite readiness: the session has resolved and the initial
    /// workspace load has finished. All navigation decisions that depend
    /// on both contexts gate on this single state, never on individual
    /// loading flags.
    pub fn ready(&self) -> bool {
        !self.session.is_loading() && self.workspace.loaded_once()
    }
}

#[derive(Clone, Copy)]
pub(crate) struct AppContext(pub AppState);
