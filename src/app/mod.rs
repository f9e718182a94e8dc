use crate::guards::{PublicOnly, RequireAuth, WorkspaceEntry};
use crate::pages::{
    AppLayout, LandingPage, LoginPage, PageView, RegistrationPage, SettingsPage, TrashPage,
    WorkspaceDashboard,
};
use crate::state::{AppContext, AppState};
use crate::toast::ToastHost;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::components::{Route, Router, Routes};
use leptos_router::path;

#[component]
pub fn App() -> impl IntoView {
    let app = AppState::new();
    provide_context(AppContext(app));
    provide_context(app.toasts);

    app.session.initialize();

    // Workspace bootstrap runs once per authenticated session; logging
    // in later re-triggers it via the token signal.
    Effect::new(move |_| {
        if !app.session.is_authenticated() {
            return;
        }
        if app.workspace.loaded_once() || app.workspace.is_loading() {
            return;
        }
        spawn_local(async move {
            let _ = app.workspace.load_workspaces().await;
        });
    });

    // IMPORTANT:
    // - Leptos CSR requires the `csr` feature on `leptos`.
    // - router hooks require a <Router> context.
    view! {
        <Router>
            <ToastHost />
            <Routes fallback=|| view! { <div class="px-4 py-8 text-xs text-muted-foreground">"Not found"</div> }>
                <Route path=path!("") view=move || view! {
                    <PublicOnly>
                        <LandingPage />
                    </PublicOnly>
                } />
                <Route path=path!("login") view=move || view! {
                    <PublicOnly>
                        <LoginPage />
                    </PublicOnly>
                } />
                <Route path=path!("signup") view=move || view! {
                    <PublicOnly>
                        <RegistrationPage />
                    </PublicOnly>
                } />
                <Route path=path!("workspace") view=move || view! {
                    <RequireAuth>
                        <WorkspaceEntry />
                    </RequireAuth>
                } />
                <Route path=path!("workspace/:workspace_id") view=move || view! {
                    <RequireAuth>
                        <AppLayout>
                            <WorkspaceDashboard />
                        </AppLayout>
                    </RequireAuth>
                } />
                <Route path=path!("workspace/:workspace_id/page/:page_id") view=move || view! {
                    <RequireAuth>
                        <AppLayout>
                            <PageView />
                        </AppLayout>
                    </RequireAuth>
                } />
                <Route path=path!("workspace/:workspace_id/trash") view=move || view! {
                    <RequireAuth>
                        <AppLayout>
                            <TrashPage />
                        </AppLayout>
                    </RequireAuth>
                } />
                <Route path=path!("settings") view=move || view! {
                    <RequireAuth>
                        <AppLayout>
                            <SettingsPage />
                        </AppLayout>
                    </RequireAuth>
                } />
            </Routes>
        </Router>
    }
}
