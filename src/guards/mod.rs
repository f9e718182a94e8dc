use crate::components::ui::Spinner;
use crate::state::AppContext;
use leptos::prelude::*;
use leptos_router::components::Redirect;

/// Shown while a guard is not yet allowed to decide. Deciding before
/// the session (or the initial workspace load) has resolved causes
/// redirect flicker, so guards hold here instead.
#[component]
pub fn LoadingPlaceholder() -> impl IntoView {
    view! {
        <div class="flex min-h-screen items-center justify-center bg-background">
            <Spinner class="size-6 text-muted-foreground" />
        </div>
    }
}

/// Renders its children only for unauthenticated visitors; an
/// authenticated user is sent to the workspace entry route.
#[component]
pub fn PublicOnly(children: ChildrenFn) -> impl IntoView {
    let app = expect_context::<AppContext>().0;
    let children = StoredValue::new(children);

    view! {
        <Show when=move || !app.session.is_loading() fallback=LoadingPlaceholder>
            <Show
                when=move || !app.session.is_authenticated()
                fallback=|| view! { <Redirect path="/workspace" /> }
            >
                {move || children.with_value(|c| c())}
            </Show>
        </Show>
    }
}

/// Renders its children only when authenticated; everyone else is sent
/// to the login route.
#[component]
pub fn RequireAuth(children: ChildrenFn) -> impl IntoView {
    let app = expect_context::<AppContext>().0;
    let children = StoredValue::new(children);

    view! {
        <Show when=move || !app.session.is_loading() fallback=LoadingPlaceholder>
            <Show
                when=move || app.session.is_authenticated()
                fallback=|| view! { <Redirect path="/login" /> }
            >
                {move || children.with_value(|c| c())}
            </Show>
        </Show>
    }
}

/// Workspace-level entry decision. Runs only once both contexts have
/// resolved (`AppState::ready`), then either forwards to the current
/// workspace's dashboard, to the first available workspace, or holds on
/// a "no workspace" placeholder that opens the selection prompt.
#[component]
pub fn WorkspaceEntry() -> impl IntoView {
    let app = expect_context::<AppContext>().0;

    // Empty-workspace policy: prompt for creation via the chooser.
    Effect::new(move |_| {
        if app.ready() && app.workspace.workspaces().get().is_empty() {
            app.session.show_workspace_modal().set(true);
        }
    });

    view! {
        <Show when=move || app.ready() fallback=LoadingPlaceholder>
            {move || {
                if let Some(w) = app.workspace.current().get() {
                    return view! { <Redirect path=format!("/workspace/{}", w.id) /> }
                        .into_any();
                }

                if let Some(w) = app.workspace.workspaces().get().first().cloned() {
                    return view! { <Redirect path=format!("/workspace/{}", w.id) /> }
                        .into_any();
                }

                view! {
                    <div class="flex min-h-screen flex-col items-center justify-center gap-2 bg-background">
                        <div class="text-sm font-medium">"No workspace yet"</div>
                        <div class="text-xs text-muted-foreground">
                            "Create a workspace to get started."
                        </div>
                    </div>
                }
                .into_any()
            }}
        </Show>
    }
}
