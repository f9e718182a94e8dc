use crate::api::UpdatePageRequest;
use crate::components::ui::{
    Alert, AlertDescription, Button, ButtonSize, ButtonVariant, Card, CardContent, CardDescription,
    CardHeader, CardTitle, Dialog, DialogDescription, DialogTitle, Input, Label, Spinner, Textarea,
};
use crate::models::{KnowledgeGraph, Page, Workspace};
use crate::state::{AppContext, PageSaveController};
use crate::util::next_untitled_page_title;
use leptos::ev;
use leptos::html;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_dom::helpers::window_event_listener;
use leptos_router::hooks::{use_location, use_navigate, use_query_map};
use leptos_router::params::Params;
use wasm_bindgen::JsCast;

#[component]
pub fn LandingPage() -> impl IntoView {
    view! {
        <div class="min-h-screen bg-background">
            <header class="mx-auto flex w-full max-w-4xl items-center justify-between px-4 py-4">
                <span class="text-sm font-semibold">"CraftSpace"</span>
                <nav class="flex items-center gap-2">
                    <Button variant=ButtonVariant::Ghost size=ButtonSize::Sm href="/login">
                        "Log in"
                    </Button>
                    <Button size=ButtonSize::Sm href="/signup">"Sign up"</Button>
                </nav>
            </header>

            <main class="mx-auto flex w-full max-w-4xl flex-col items-center px-4 py-24 text-center">
                <h1 class="max-w-xl text-3xl font-semibold tracking-tight">
                    "Your workspaces, pages and notes in one place"
                </h1>
                <p class="mt-3 max-w-md text-sm text-muted-foreground">
                    "Organize work into workspaces, write pages, and let the built-in assistant tag and answer from your own content."
                </p>
                <div class="mt-6 flex items-center gap-2">
                    <Button href="/signup">"Get started"</Button>
                    <Button variant=ButtonVariant::Outline href="/login">"I have an account"</Button>
                </div>
            </main>
        </div>
    }
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let email: RwSignal<String> = RwSignal::new(String::new());
    let password: RwSignal<String> = RwSignal::new(String::new());
    let error: RwSignal<Option<String>> = RwSignal::new(None);
    let loading: RwSignal<bool> = RwSignal::new(false);

    let app = expect_context::<AppContext>().0;
    let navigate = StoredValue::new(use_navigate());

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();

        if loading.get_untracked() {
            return;
        }

        let email_val = email.get_untracked();
        let password_val = password.get_untracked();

        loading.set(true);
        error.set(None);

        spawn_local(async move {
            match app.session.login(&email_val, &password_val).await {
                Ok(()) => {
                    navigate.with_value(|nav| nav("/workspace", Default::default()));
                }
                Err(e) => {
                    error.set(Some(e.message));
                }
            }
            loading.set(false);
        });
    };

    view! {
        <div class="min-h-screen bg-background">
            <div class="mx-auto flex min-h-screen w-full max-w-sm flex-col justify-center px-4 py-10">
                <div class="mb-6 flex items-center justify-center">
                    <a href="/" class="text-sm font-medium text-foreground">"CraftSpace"</a>
                </div>

                <Card>
                    <CardHeader>
                        <CardTitle class="text-lg">"Log in"</CardTitle>
                        <CardDescription class="text-xs">
                            "Use your email and password to continue."
                        </CardDescription>
                    </CardHeader>

                    <CardContent>
                        <form class="flex flex-col gap-3" on:submit=on_submit>
                            <div class="flex flex-col gap-1.5">
                                <Label html_for="email" class="text-xs">"Email"</Label>
                                <Input
                                    id="email"
                                    r#type="email"
                                    placeholder="you@example.com"
                                    bind_value=email
                                    required=true
                                    class="h-8 text-sm"
                                />
                            </div>

                            <div class="flex flex-col gap-1.5">
                                <Label html_for="password" class="text-xs">"Password"</Label>
                                <Input
                                    id="password"
                                    r#type="password"
                                    placeholder="••••••••"
                                    bind_value=password
                                    required=true
                                    class="h-8 text-sm"
                                />
                            </div>

                            <Show when=move || error.get().is_some() fallback=|| ().into_view()>
                                {move || {
                                    error.get().map(|e| {
                                        view! {
                                            <Alert class="border-destructive/30">
                                                <AlertDescription class="text-destructive text-xs">
                                                    {e}
                                                </AlertDescription>
                                            </Alert>
                                        }
                                    })
                                }}
                            </Show>

                            <Button
                                class="w-full"
                                size=ButtonSize::Sm
                                attr:disabled=move || loading.get()
                            >
                                <span class="inline-flex items-center gap-2">
                                    <Show when=move || loading.get() fallback=|| ().into_view()>
                                        <Spinner />
                                    </Show>
                                    {move || if loading.get() { "Signing in..." } else { "Continue" }}
                                </span>
                            </Button>

                            <div class="pt-1 text-xs text-muted-foreground">
                                "No account? "
                                <a class="text-primary underline underline-offset-4" href="/signup">
                                    "Sign up"
                                </a>
                            </div>
                        </form>
                    </CardContent>
                </Card>
            </div>
        </div>
    }
}

#[component]
pub fn RegistrationPage() -> impl IntoView {
    let name: RwSignal<String> = RwSignal::new(String::new());
    let email: RwSignal<String> = RwSignal::new(String::new());
    let password: RwSignal<String> = RwSignal::new(String::new());
    let password_confirm: RwSignal<String> = RwSignal::new(String::new());
    let error: RwSignal<Option<String>> = RwSignal::new(None);
    let loading: RwSignal<bool> = RwSignal::new(false);

    let app = expect_context::<AppContext>().0;
    let navigate = StoredValue::new(use_navigate());

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();

        if loading.get_untracked() {
            return;
        }

        let name_val = name.get_untracked();
        let email_val = email.get_untracked();
        let password_val = password.get_untracked();

        if password_val != password_confirm.get_untracked() {
            error.set(Some("Passwords do not match".to_string()));
            return;
        }
        if password_val.len() < 8 {
            error.set(Some("Password must be at least 8 characters".to_string()));
            return;
        }

        loading.set(true);
        error.set(None);

        spawn_local(async move {
            match app
                .session
                .register(&email_val, &password_val, &name_val)
                .await
            {
                Ok(()) => {
                    navigate.with_value(|nav| nav("/workspace", Default::default()));
                }
                Err(e) => {
                    error.set(Some(e.message));
                }
            }
            loading.set(false);
        });
    };

    view! {
        <div class="min-h-screen bg-background">
            <div class="mx-auto flex min-h-screen w-full max-w-sm flex-col justify-center px-4 py-10">
                <div class="mb-6 flex items-center justify-center">
                    <a href="/" class="text-sm font-medium text-foreground">"CraftSpace"</a>
                </div>

                <Card>
                    <CardHeader>
                        <CardTitle class="text-lg">"Create your account"</CardTitle>
                        <CardDescription class="text-xs">
                            "A verification email is sent after sign-up."
                        </CardDescription>
                    </CardHeader>

                    <CardContent>
                        <form class="flex flex-col gap-3" on:submit=on_submit>
                            <div class="flex flex-col gap-1.5">
                                <Label html_for="name" class="text-xs">"Name"</Label>
                                <Input
                                    id="name"
                                    placeholder="Ada Lovelace"
                                    bind_value=name
                                    required=true
                                    class="h-8 text-sm"
                                />
                            </div>

                            <div class="flex flex-col gap-1.5">
                                <Label html_for="email" class="text-xs">"Email"</Label>
                                <Input
                                    id="email"
                                    r#type="email"
                                    placeholder="you@example.com"
                                    bind_value=email
                                    required=true
                                    class="h-8 text-sm"
                                />
                            </div>

                            <div class="flex flex-col gap-1.5">
                                <Label html_for="password" class="text-xs">"Password"</Label>
                                <Input
                                    id="password"
                                    r#type="password"
                                    placeholder="At least 8 characters"
                                    bind_value=password
                                    required=true
                                    class="h-8 text-sm"
                                />
                            </div>

                            <div class="flex flex-col gap-1.5">
                                <Label html_for="password-confirm" class="text-xs">
                                    "Confirm password"
                                </Label>
                                <Input
                                    id="password-confirm"
                                    r#type="password"
                                    placeholder="Repeat your password"
                                    bind_value=password_confirm
                                    required=true
                                    class="h-8 text-sm"
                                />
                            </div>

                            <Show when=move || error.get().is_some() fallback=|| ().into_view()>
                                {move || {
                                    error.get().map(|e| {
                                        view! {
                                            <Alert class="border-destructive/30">
                                                <AlertDescription class="text-destructive text-xs">
                                                    {e}
                                                </AlertDescription>
                                            </Alert>
                                        }
                                    })
                                }}
                            </Show>

                            <Button
                                class="w-full"
                                size=ButtonSize::Sm
                                attr:disabled=move || loading.get()
                            >
                                <span class="inline-flex items-center gap-2">
                                    <Show when=move || loading.get() fallback=|| ().into_view()>
                                        <Spinner />
                                    </Show>
                                    {move || {
                                        if loading.get() { "Creating account..." } else { "Sign up" }
                                    }}
                                </span>
                            </Button>

                            <div class="pt-1 text-xs text-muted-foreground">
                                "Already registered? "
                                <a class="text-primary underline underline-offset-4" href="/login">
                                    "Log in"
                                </a>
                            </div>
                        </form>
                    </CardContent>
                </Card>
            </div>
        </div>
    }
}

#[derive(Params, PartialEq, Clone, Debug)]
pub struct WorkspaceRouteParams {
    pub workspace_id: Option<String>,
}

#[derive(Params, PartialEq, Clone, Debug)]
pub struct PageRouteParams {
    pub workspace_id: Option<String>,
    pub page_id: Option<String>,
}

/// Authenticated shell: sidebar (workspace switcher, page tree, search)
/// plus the top bar. Route content renders in the main column.
#[component]
pub fn AppLayout(children: ChildrenFn) -> impl IntoView {
    let app = expect_context::<AppContext>().0;
    let children = StoredValue::new(children);

    let navigate = StoredValue::new(use_navigate());
    let location = use_location();
    let pathname = move || location.pathname.get();

    let switcher_open: RwSignal<bool> = RwSignal::new(false);
    let search_value: RwSignal<String> = RwSignal::new(String::new());
    let ai_open: RwSignal<bool> = RwSignal::new(false);
    let create_page_loading: RwSignal<bool> = RwSignal::new(false);

    let current_workspace_name = move || {
        app.workspace
            .current()
            .get()
            .map(|w| w.name)
            .unwrap_or_else(|| "Select workspace".to_string())
    };

    let choose_workspace = move |w: Workspace| {
        switcher_open.set(false);
        let resolved = app.workspace.set_current_workspace(Some(w));
        if let Some(w) = resolved {
            navigate.with_value(|nav| nav(&format!("/workspace/{}", w.id), Default::default()));
        }
    };

    // Search is expressed in the URL so results survive reloads.
    let on_search_keydown = move |ev: web_sys::KeyboardEvent| {
        if ev.key() != "Enter" {
            return;
        }
        let Some(id) = app.workspace.current_id() else {
            return;
        };
        let q = search_value.get_untracked();
        let target = if q.trim().is_empty() {
            format!("/workspace/{id}")
        } else {
            format!("/workspace/{id}?q={}", urlencoding::encode(q.trim()))
        };
        navigate.with_value(|nav| nav(&target, Default::default()));
    };

    let on_create_page = move |_: web_sys::MouseEvent| {
        if create_page_loading.get_untracked() {
            return;
        }
        let Some(workspace_id) = app.workspace.current_id() else {
            return;
        };

        let title = next_untitled_page_title(&app.workspace.pages().get_untracked());
        create_page_loading.set(true);

        spawn_local(async move {
            if let Ok(page) = app.workspace.create_page(&workspace_id, &title).await {
                navigate.with_value(|nav| {
                    nav(
                        &format!("/workspace/{workspace_id}/page/{}", page.id),
                        Default::default(),
                    )
                });
            }
            create_page_loading.set(false);
        });
    };

    let sidebar_pages = move || {
        let path = pathname();
        app.workspace
            .pages()
            .get()
            .into_iter()
            .filter(|p| p.deleted_at.is_none())
            .map(|p| {
                let href = format!(
                    "/workspace/{}/page/{}",
                    p.workspace_id, p.id
                );
                let active = path == href;
                let icon = p.icon_url.clone();
                let bookmarked = p.bookmarked;
                let link_class = if active {
                    "flex items-center gap-2 truncate rounded-md bg-accent px-2 py-1 text-sm"
                } else {
                    "flex items-center gap-2 truncate rounded-md px-2 py-1 text-sm hover:bg-accent"
                };
                view! {
                    <a href=href class=link_class aria-current=active.then_some("page")>
                        {icon.map(|url| view! { <img src=url class="size-4 rounded-sm" alt="" /> })}
                        <span class="truncate">{p.title.clone()}</span>
                        <Show when=move || bookmarked fallback=|| ().into_view()>
                            <span class="ml-auto text-xs text-muted-foreground">"★"</span>
                        </Show>
                    </a>
                }
            })
            .collect_view()
    };

    let trash_href = move || {
        app.workspace
            .current_id()
            .map(|id| format!("/workspace/{id}/trash"))
            .unwrap_or_else(|| "/workspace".to_string())
    };

    view! {
        <div class="flex min-h-screen bg-background text-foreground">
            <aside class="flex w-64 shrink-0 flex-col border-r bg-muted/20">
                <div class="relative border-b p-2">
                    <button
                        class="flex w-full items-center justify-between rounded-md px-2 py-1.5 text-sm font-medium hover:bg-accent"
                        on:click=move |_| switcher_open.update(|v| *v = !*v)
                    >
                        <span class="truncate">{current_workspace_name}</span>
                        <span class="text-xs text-muted-foreground">"▾"</span>
                    </button>

                    <Show when=move || switcher_open.get() fallback=|| ().into_view()>
                        <div class="absolute inset-x-2 top-full z-30 mt-1 rounded-md border bg-background p-1 shadow-md">
                            {move || {
                                app.workspace
                                    .workspaces()
                                    .get()
                                    .into_iter()
                                    .map(|w| {
                                        let label = w.name.clone();
                                        let count = w.page_count;
                                        view! {
                                            <button
                                                class="flex w-full items-center justify-between rounded px-2 py-1 text-left text-sm hover:bg-accent"
                                                on:click=move |_| choose_workspace(w.clone())
                                            >
                                                <span class="truncate">{label.clone()}</span>
                                                <span class="text-xs text-muted-foreground">
                                                    {count}
                                                </span>
                                            </button>
                                        }
                                    })
                                    .collect_view()
                            }}
                            <button
                                class="mt-1 w-full rounded border-t px-2 py-1 text-left text-xs text-muted-foreground hover:bg-accent"
                                on:click=move |_| {
                                    switcher_open.set(false);
                                    app.session.show_workspace_modal().set(true);
                                }
                            >
                                "+ New workspace"
                            </button>
                        </div>
                    </Show>
                </div>

                <div class="p-2">
                    <Input
                        placeholder="Search pages..."
                        bind_value=search_value
                        class="h-8 text-sm"
                        on:keydown=on_search_keydown
                    />
                </div>

                <div class="flex items-center justify-between px-3 pt-1">
                    <span class="text-xs font-medium text-muted-foreground">"Pages"</span>
                    <Button
                        variant=ButtonVariant::Ghost
                        size=ButtonSize::Icon
                        class="size-6 text-xs"
                        attr:disabled=move || create_page_loading.get()
                        attr:aria-label="New page"
                        on:click=on_create_page
                    >
                        "+"
                    </Button>
                </div>

                <nav class="flex-1 overflow-y-auto px-2 py-1">
                    <Show
                        when=move || !app.workspace.pages_loading()
                        fallback=|| {
                            view! {
                                <div class="flex justify-center py-4">
                                    <Spinner class="text-muted-foreground" />
                                </div>
                            }
                        }
                    >
                        {sidebar_pages}
                    </Show>
                </nav>

                <div class="border-t p-2">
                    <a
                        href=trash_href
                        class="block rounded-md px-2 py-1 text-sm text-muted-foreground hover:bg-accent"
                    >
                        "Trash"
                    </a>
                    <a
                        href="/settings"
                        class="block rounded-md px-2 py-1 text-sm text-muted-foreground hover:bg-accent"
                    >
                        "Settings"
                    </a>
                </div>
            </aside>

            <div class="flex min-w-0 flex-1 flex-col">
                <header class="flex h-12 items-center justify-between border-b px-4">
                    <span class="truncate text-sm font-medium">{current_workspace_name}</span>
                    <div class="flex items-center gap-2">
                        <Button
                            variant=ButtonVariant::Outline
                            size=ButtonSize::Sm
                            on:click=move |_| ai_open.set(true)
                        >
                            "Ask AI"
                        </Button>
                        <span class="text-xs text-muted-foreground">
                            {move || {
                                app.session
                                    .user()
                                    .get()
                                    .map(|u| u.name)
                                    .unwrap_or_default()
                            }}
                        </span>
                        <Button
                            variant=ButtonVariant::Ghost
                            size=ButtonSize::Sm
                            on:click=move |_| app.session.logout()
                        >
                            "Log out"
                        </Button>
                    </div>
                </header>

                <main class="flex-1 overflow-y-auto">
                    {move || children.with_value(|c| c())}
                </main>
            </div>

            <WorkspaceChooser />
            <AiAssistantDialog open=ai_open />
        </div>
    }
}

/// Workspace selection / creation modal. Refuses to close while the
/// account has no workspace at all.
#[component]
pub fn WorkspaceChooser() -> impl IntoView {
    let app = expect_context::<AppContext>().0;
    let navigate = StoredValue::new(use_navigate());

    let open = app.session.show_workspace_modal();

    let create_name: RwSignal<String> = RwSignal::new(String::new());
    let create_desc: RwSignal<String> = RwSignal::new(String::new());
    let create_error: RwSignal<Option<String>> = RwSignal::new(None);
    let create_loading: RwSignal<bool> = RwSignal::new(false);

    let name_ref: NodeRef<html::Input> = NodeRef::new();

    // Focus the name input once the dialog is mounted.
    Effect::new(move |_| {
        if !open.get() {
            return;
        }
        let _ = window().set_timeout_with_callback_and_timeout_and_arguments_0(
            wasm_bindgen::closure::Closure::once_into_js(move || {
                if let Some(el) = name_ref.get_untracked() {
                    let _ = el.focus();
                }
            })
            .as_ref()
            .unchecked_ref(),
            0,
        );
    });

    let on_close = Callback::new(move |_: ()| {
        if app.workspace.workspaces().get_untracked().is_empty() {
            return;
        }
        open.set(false);
    });

    let choose = move |w: Workspace| {
        open.set(false);
        if let Some(w) = app.workspace.set_current_workspace(Some(w)) {
            navigate.with_value(|nav| nav(&format!("/workspace/{}", w.id), Default::default()));
        }
    };

    let on_create = move |_: web_sys::MouseEvent| {
        if create_loading.get_untracked() {
            return;
        }

        let name = create_name.get_untracked();
        if name.trim().is_empty() {
            create_error.set(Some("Name cannot be empty".to_string()));
            return;
        }
        let desc = create_desc.get_untracked();

        create_loading.set(true);
        create_error.set(None);

        spawn_local(async move {
            match app.workspace.create_workspace(name.trim(), desc.trim()).await {
                Ok(w) => {
                    create_name.set(String::new());
                    create_desc.set(String::new());
                    open.set(false);
                    app.workspace.set_current_workspace(Some(w.clone()));
                    navigate.with_value(|nav| {
                        nav(&format!("/workspace/{}", w.id), Default::default())
                    });
                }
                Err(e) => {
                    create_error.set(Some(e.message));
                }
            }
            create_loading.set(false);
        });
    };

    view! {
        <Dialog open=open on_close=on_close>
            <DialogTitle>"Choose a workspace"</DialogTitle>
            <DialogDescription>
                "Pick a workspace to open, or create a new one."
            </DialogDescription>

            <div class="mb-4 flex max-h-48 flex-col gap-1 overflow-y-auto">
                {move || {
                    let list = app.workspace.workspaces().get();
                    if list.is_empty() {
                        view! {
                            <div class="rounded-md border border-dashed px-3 py-4 text-center text-xs text-muted-foreground">
                                "No workspaces yet. Create your first one below."
                            </div>
                        }
                        .into_any()
                    } else {
                        list.into_iter()
                            .map(|w| {
                                let label = w.name.clone();
                                let desc = w.description.clone();
                                view! {
                                    <button
                                        class="flex w-full flex-col rounded-md border px-3 py-2 text-left hover:bg-accent"
                                        on:click=move |_| choose(w.clone())
                                    >
                                        <span class="text-sm font-medium">{label.clone()}</span>
                                        <Show when={
                                            let desc = desc.clone();
                                            move || !desc.is_empty()
                                        } fallback=|| ().into_view()>
                                            <span class="text-xs text-muted-foreground">
                                                {desc.clone()}
                                            </span>
                                        </Show>
                                    </button>
                                }
                            })
                            .collect_view()
                            .into_any()
                    }
                }}
            </div>

            <div class="flex flex-col gap-2 border-t pt-3">
                <Label html_for="new-workspace-name" class="text-xs">"New workspace"</Label>
                <Input
                    id="new-workspace-name"
                    placeholder="Workspace name"
                    bind_value=create_name
                    class="h-8 text-sm"
                    node_ref=name_ref
                />
                <Input
                    placeholder="Description (optional)"
                    bind_value=create_desc
                    class="h-8 text-sm"
                />

                <Show when=move || create_error.get().is_some() fallback=|| ().into_view()>
                    {move || {
                        create_error.get().map(|e| {
                            view! {
                                <Alert class="border-destructive/30">
                                    <AlertDescription class="text-destructive text-xs">
                                        {e}
                                    </AlertDescription>
                                </Alert>
                            }
                        })
                    }}
                </Show>

                <Button
                    size=ButtonSize::Sm
                    attr:disabled=move || create_loading.get()
                    on:click=on_create
                >
                    <span class="inline-flex items-center gap-2">
                        <Show when=move || create_loading.get() fallback=|| ().into_view()>
                            <Spinner />
                        </Show>
                        {move || if create_loading.get() { "Creating..." } else { "Create workspace" }}
                    </span>
                </Button>
            </div>
        </Dialog>
    }
}

/// Dashboard for one workspace: page cards, workspace management and the
/// knowledge-graph panel. The route parameter is the source of truth for
/// which workspace is current.
#[component]
pub fn WorkspaceDashboard() -> impl IntoView {
    let app = expect_context::<AppContext>().0;
    let params = leptos_router::hooks::use_params::<WorkspaceRouteParams>();
    let navigate = StoredValue::new(use_navigate());
    let query = use_query_map();

    let workspace_id = move || {
        params
            .get()
            .ok()
            .and_then(|p| p.workspace_id)
            .unwrap_or_default()
    };

    let rename_open: RwSignal<bool> = RwSignal::new(false);
    let rename_name: RwSignal<String> = RwSignal::new(String::new());
    let rename_desc: RwSignal<String> = RwSignal::new(String::new());
    let rename_loading: RwSignal<bool> = RwSignal::new(false);
    let rename_error: RwSignal<Option<String>> = RwSignal::new(None);

    let delete_open: RwSignal<bool> = RwSignal::new(false);
    let delete_loading: RwSignal<bool> = RwSignal::new(false);

    let graph_open: RwSignal<bool> = RwSignal::new(false);
    let graph: RwSignal<Option<KnowledgeGraph>> = RwSignal::new(None);
    let graph_loading: RwSignal<bool> = RwSignal::new(false);

    // Deep links: align the current workspace with the URL. An unknown
    // id falls back to the entry route.
    Effect::new(move |_| {
        let id = workspace_id();
        if id.is_empty() || !app.workspace.loaded_once() {
            return;
        }
        if app.workspace.current_id().as_deref() == Some(id.as_str()) {
            return;
        }

        let found = app
            .workspace
            .workspaces()
            .get()
            .into_iter()
            .find(|w| w.id == id);
        match found {
            Some(w) => {
                app.workspace.set_current_workspace(Some(w));
            }
            None => {
                navigate.with_value(|nav| nav("/workspace", Default::default()));
            }
        }
    });

    let search_query = move || query.get().get("q").unwrap_or_default();

    let visible_pages = move || {
        let q = search_query().to_lowercase();
        app.workspace
            .pages()
            .get()
            .into_iter()
            .filter(|p| p.deleted_at.is_none())
            .filter(|p| {
                q.is_empty()
                    || p.title.to_lowercase().contains(&q)
                    || p.tags.iter().any(|t| t.to_lowercase().contains(&q))
            })
            .collect::<Vec<_>>()
    };

    let open_rename = move |_: web_sys::MouseEvent| {
        if let Some(w) = app.workspace.current().get_untracked() {
            rename_name.set(w.name);
            rename_desc.set(w.description);
            rename_error.set(None);
            rename_open.set(true);
        }
    };

    let on_submit_rename = move |_: web_sys::MouseEvent| {
        if rename_loading.get_untracked() {
            return;
        }
        let id = workspace_id();
        let name = rename_name.get_untracked();
        if name.trim().is_empty() {
            rename_error.set(Some("Name cannot be empty".to_string()));
            return;
        }
        let desc = rename_desc.get_untracked();

        rename_loading.set(true);
        rename_error.set(None);

        spawn_local(async move {
            match app
                .workspace
                .update_workspace(&id, name.trim(), desc.trim())
                .await
            {
                Ok(_) => rename_open.set(false),
                Err(e) => rename_error.set(Some(e.message)),
            }
            rename_loading.set(false);
        });
    };

    let on_confirm_delete = move |_: web_sys::MouseEvent| {
        if delete_loading.get_untracked() {
            return;
        }
        let id = workspace_id();
        delete_loading.set(true);

        spawn_local(async move {
            if app.workspace.delete_workspace(&id).await.is_ok() {
                delete_open.set(false);
                navigate.with_value(|nav| nav("/workspace", Default::default()));
            }
            delete_loading.set(false);
        });
    };

    let toggle_graph = move |_: web_sys::MouseEvent| {
        let opening = !graph_open.get_untracked();
        graph_open.set(opening);
        if !opening || graph_loading.get_untracked() {
            return;
        }

        let id = workspace_id();
        graph_loading.set(true);
        spawn_local(async move {
            if let Ok(g) = app
                .api_client
                .get_untracked()
                .fetch_knowledge_graph(&id)
                .await
            {
                graph.set(Some(g));
            }
            graph_loading.set(false);
        });
    };

    let page_card = move |p: Page| {
        let href = format!("/workspace/{}/page/{}", p.workspace_id, p.id);
        let page_ws = p.workspace_id.clone();
        let page_id = p.id.clone();
        let bookmarked = p.bookmarked;

        let on_bookmark = {
            let page_ws = page_ws.clone();
            let page_id = page_id.clone();
            move |ev: web_sys::MouseEvent| {
                ev.prevent_default();
                ev.stop_propagation();
                let page_ws = page_ws.clone();
                let page_id = page_id.clone();
                spawn_local(async move {
                    let _ = app
                        .workspace
                        .set_page_bookmark(&page_ws, &page_id, !bookmarked)
                        .await;
                });
            }
        };

        let on_duplicate = {
            let page_ws = page_ws.clone();
            let page_id = page_id.clone();
            move |ev: web_sys::MouseEvent| {
                ev.prevent_default();
                ev.stop_propagation();
                let page_ws = page_ws.clone();
                let page_id = page_id.clone();
                spawn_local(async move {
                    let _ = app.workspace.duplicate_page(&page_ws, &page_id).await;
                });
            }
        };

        let on_trash = {
            let page_ws = page_ws.clone();
            let page_id = page_id.clone();
            move |ev: web_sys::MouseEvent| {
                ev.prevent_default();
                ev.stop_propagation();
                let page_ws = page_ws.clone();
                let page_id = page_id.clone();
                spawn_local(async move {
                    let _ = app.workspace.delete_page(&page_ws, &page_id).await;
                });
            }
        };

        view! {
            <a href=href class="block">
                <Card class="h-full transition-colors hover:bg-accent/40">
                    <CardHeader class="pb-2">
                        <div class="flex items-start justify-between gap-2">
                            <CardTitle class="truncate text-sm">
                                {p.icon_url.clone().map(|url| {
                                    view! {
                                        <img
                                            src=url
                                            class="mr-1 inline size-4 rounded-sm align-text-bottom"
                                            alt=""
                                        />
                                    }
                                })}
                                {p.title.clone()}
                            </CardTitle>
                            <button
                                class=if bookmarked {
                                    "text-sm text-amber-500"
                                } else {
                                    "text-sm text-muted-foreground"
                                }
                                aria-label=if bookmarked {
                                    "Remove bookmark"
                                } else {
                                    "Bookmark page"
                                }
                                on:click=on_bookmark
                            >
                                "★"
                            </button>
                        </div>
                    </CardHeader>
                    <CardContent class="pt-0">
                        <div class="flex flex-wrap gap-1">
                            {p.tags
                                .iter()
                                .map(|t| {
                                    view! {
                                        <span class="rounded-full bg-muted px-2 py-0.5 text-xs text-muted-foreground">
                                            {t.clone()}
                                        </span>
                                    }
                                })
                                .collect_view()}
                        </div>
                        <div class="mt-3 flex gap-1">
                            <Button
                                variant=ButtonVariant::Ghost
                                size=ButtonSize::Sm
                                class="h-6 px-2 text-xs"
                                on:click=on_duplicate
                            >
                                "Duplicate"
                            </Button>
                            <Button
                                variant=ButtonVariant::Ghost
                                size=ButtonSize::Sm
                                class="h-6 px-2 text-xs text-destructive"
                                on:click=on_trash
                            >
                                "Trash"
                            </Button>
                        </div>
                    </CardContent>
                </Card>
            </a>
        }
    };

    view! {
        <div class="mx-auto w-full max-w-4xl px-6 py-6">
            <div class="mb-4 flex items-center justify-between">
                <div>
                    <h1 class="text-xl font-semibold">
                        {move || {
                            app.workspace
                                .current()
                                .get()
                                .map(|w| w.name)
                                .unwrap_or_default()
                        }}
                    </h1>
                    <p class="text-xs text-muted-foreground">
                        {move || {
                            app.workspace
                                .current()
                                .get()
                                .map(|w| w.description)
                                .unwrap_or_default()
                        }}
                    </p>
                </div>
                <div class="flex items-center gap-1">
                    <Button
                        variant=ButtonVariant::Outline
                        size=ButtonSize::Sm
                        on:click=toggle_graph
                    >
                        {move || if graph_open.get() { "Hide graph" } else { "Knowledge graph" }}
                    </Button>
                    <Button variant=ButtonVariant::Ghost size=ButtonSize::Sm on:click=open_rename>
                        "Rename"
                    </Button>
                    <Button
                        variant=ButtonVariant::Ghost
                        size=ButtonSize::Sm
                        class="text-destructive"
                        on:click=move |_| delete_open.set(true)
                    >
                        "Delete"
                    </Button>
                </div>
            </div>

            <Show when=move || graph_open.get() fallback=|| ().into_view()>
                <KnowledgeGraphPanel graph=graph loading=graph_loading />
            </Show>

            <Show when=move || !search_query().is_empty() fallback=|| ().into_view()>
                <p class="mb-3 text-xs text-muted-foreground">
                    {move || format!("Filtering pages by \"{}\"", search_query())}
                </p>
            </Show>

            <Show
                when=move || !app.workspace.pages_loading()
                fallback=|| {
                    view! {
                        <div class="flex justify-center py-16">
                            <Spinner class="size-6 text-muted-foreground" />
                        </div>
                    }
                }
            >
                {move || {
                    let pages = visible_pages();
                    if pages.is_empty() {
                        view! {
                            <div class="rounded-lg border border-dashed px-6 py-16 text-center text-sm text-muted-foreground">
                                {if search_query().is_empty() {
                                    "No pages yet. Create one from the sidebar."
                                } else {
                                    "No pages match your search."
                                }}
                            </div>
                        }
                        .into_any()
                    } else {
                        view! {
                            <div class="grid grid-cols-1 gap-3 sm:grid-cols-2 lg:grid-cols-3">
                                {pages.into_iter().map(page_card).collect_view()}
                            </div>
                        }
                        .into_any()
                    }
                }}
            </Show>

            <Dialog open=rename_open on_close=Callback::new(move |_| rename_open.set(false))>
                <DialogTitle>"Rename workspace"</DialogTitle>
                <div class="flex flex-col gap-2">
                    <Input bind_value=rename_name placeholder="Name" class="h-8 text-sm" />
                    <Input
                        bind_value=rename_desc
                        placeholder="Description"
                        class="h-8 text-sm"
                    />

                    <Show when=move || rename_error.get().is_some() fallback=|| ().into_view()>
                        {move || {
                            rename_error.get().map(|e| {
                                view! {
                                    <Alert class="border-destructive/30">
                                        <AlertDescription class="text-destructive text-xs">
                                            {e}
                                        </AlertDescription>
                                    </Alert>
                                }
                            })
                        }}
                    </Show>

                    <div class="flex justify-end gap-2 pt-2">
                        <Button
                            variant=ButtonVariant::Ghost
                            size=ButtonSize::Sm
                            on:click=move |_| rename_open.set(false)
                        >
                            "Cancel"
                        </Button>
                        <Button
                            size=ButtonSize::Sm
                            attr:disabled=move || rename_loading.get()
                            on:click=on_submit_rename
                        >
                            {move || if rename_loading.get() { "Saving..." } else { "Save" }}
                        </Button>
                    </div>
                </div>
            </Dialog>

            <Dialog open=delete_open on_close=Callback::new(move |_| delete_open.set(false))>
                <DialogTitle>"Delete workspace"</DialogTitle>
                <DialogDescription>
                    "This deletes the workspace and all of its pages. This cannot be undone."
                </DialogDescription>
                <div class="flex justify-end gap-2">
                    <Button
                        variant=ButtonVariant::Ghost
                        size=ButtonSize::Sm
                        on:click=move |_| delete_open.set(false)
                    >
                        "Cancel"
                    </Button>
                    <Button
                        variant=ButtonVariant::Destructive
                        size=ButtonSize::Sm
                        attr:disabled=move || delete_loading.get()
                        on:click=on_confirm_delete
                    >
                        {move || if delete_loading.get() { "Deleting..." } else { "Delete" }}
                    </Button>
                </div>
            </Dialog>
        </div>
    }
}

/// Read-only rendering of the server-computed workspace graph.
#[component]
fn KnowledgeGraphPanel(
    graph: RwSignal<Option<KnowledgeGraph>>,
    loading: RwSignal<bool>,
) -> impl IntoView {
    view! {
        <Card class="mb-4">
            <CardHeader class="pb-2">
                <CardTitle class="text-sm">"Knowledge graph"</CardTitle>
                <CardDescription class="text-xs">
                    "Connections between pages and the concepts they mention."
                </CardDescription>
            </CardHeader>
            <CardContent>
                <Show
                    when=move || !loading.get()
                    fallback=|| {
                        view! {
                            <div class="flex justify-center py-6">
                                <Spinner class="text-muted-foreground" />
                            </div>
                        }
                    }
                >
                    {move || match graph.get() {
                        None => view! {
                            <p class="text-xs text-muted-foreground">"No graph available."</p>
                        }
                        .into_any(),
                        Some(g) if g.nodes.is_empty() => view! {
                            <p class="text-xs text-muted-foreground">
                                "Nothing to show yet. Add more content to your pages."
                            </p>
                        }
                        .into_any(),
                        Some(g) => {
                            let labels: std::collections::HashMap<String, String> = g
                                .nodes
                                .iter()
                                .map(|n| (n.id.clone(), n.label.clone()))
                                .collect();
                            view! {
                                <div class="flex flex-col gap-3">
                                    <div class="flex flex-wrap gap-1">
                                        {g.nodes
                                            .iter()
                                            .map(|n| {
                                                let chip_class = if n.kind == "page" {
                                                    "rounded-full border px-2 py-0.5 text-xs"
                                                } else {
                                                    "rounded-full border bg-muted px-2 py-0.5 text-xs"
                                                };
                                                view! {
                                                    <span class=chip_class>{n.label.clone()}</span>
                                                }
                                            })
                                            .collect_view()}
                                    </div>
                                    <ul class="flex flex-col gap-0.5 text-xs text-muted-foreground">
                                        {g.edges
                                            .iter()
                                            .map(|e| {
                                                let from = labels
                                                    .get(&e.source)
                                                    .cloned()
                                                    .unwrap_or_else(|| e.source.clone());
                                                let to = labels
                                                    .get(&e.target)
                                                    .cloned()
                                                    .unwrap_or_else(|| e.target.clone());
                                                view! {
                                                    <li>{format!("{from} \u{2192} {to}")}</li>
                                                }
                                            })
                                            .collect_view()}
                                    </ul>
                                </div>
                            }
                            .into_any()
                        }
                    }}
                </Show>
            </CardContent>
        </Card>
    }
}

/// Page editor. Edits are staged into the save controller and written
/// after a debounce; leaving the page (navigation or tab close) flushes
/// whatever is staged.
#[component]
pub fn PageView() -> impl IntoView {
    let app = expect_context::<AppContext>().0;
    let params = leptos_router::hooks::use_params::<PageRouteParams>();
    let navigate = StoredValue::new(use_navigate());

    let workspace_id = move || {
        params
            .get()
            .ok()
            .and_then(|p| p.workspace_id)
            .unwrap_or_default()
    };
    let page_id = move || params.get().ok().and_then(|p| p.page_id).unwrap_or_default();

    let controller = PageSaveController::new(app.workspace);

    let title: RwSignal<String> = RwSignal::new(String::new());
    let content: RwSignal<String> = RwSignal::new(String::new());
    let page: RwSignal<Option<Page>> = RwSignal::new(None);
    let page_loading: RwSignal<bool> = RwSignal::new(true);

    // Which page the title/content signals currently belong to. Edits
    // are only staged once the loaded document matches the route.
    let synced_page_id: RwSignal<String> = RwSignal::new(String::new());

    let tag_input: RwSignal<String> = RwSignal::new(String::new());
    let tags_busy: RwSignal<bool> = RwSignal::new(false);

    // Load the document whenever the route's page changes. Staged edits
    // for the previous page are flushed first.
    Effect::new(move |_| {
        let ws = workspace_id();
        let pid = page_id();
        if ws.is_empty() || pid.is_empty() {
            return;
        }
        if synced_page_id.get_untracked() == pid {
            return;
        }

        controller.flush();
        controller.set_target(ws.clone(), pid.clone());

        synced_page_id.set(String::new());
        page_loading.set(true);

        spawn_local(async move {
            match app.api_client.get_untracked().get_page(&ws, &pid).await {
                Ok(p) => {
                    title.set(p.title.clone());
                    content.set(p.content.clone());
                    page.set(Some(p));
                    synced_page_id.set(pid);
                }
                Err(_) => {
                    navigate.with_value(|nav| {
                        nav(&format!("/workspace/{ws}"), Default::default())
                    });
                }
            }
            page_loading.set(false);
        });
    });

    // Stage the full desired document on every edit; the controller
    // debounces and collapses bursts into the latest write.
    Effect::new(move |_| {
        let t = title.get();
        let c = content.get();

        let pid = synced_page_id.get_untracked();
        if pid.is_empty() || pid != page_id() {
            return;
        }
        let unchanged = page
            .with_untracked(|p| p.as_ref().map(|p| p.title == t && p.content == c))
            .unwrap_or(true);
        if unchanged {
            return;
        }

        controller.on_edit(UpdatePageRequest {
            title: Some(t),
            content: Some(c),
            icon_url: None,
        });
    });

    // The tab can die without unmounting us.
    let pagehide_handle = window_event_listener(ev::pagehide, move |_| {
        controller.flush();
    });
    on_cleanup(move || {
        controller.flush();
        pagehide_handle.remove();
    });

    let apply_tags = move |tags: Vec<String>| {
        let ws = workspace_id();
        let pid = page_id();
        tags_busy.set(true);
        spawn_local(async move {
            if let Ok(updated) = app.workspace.set_page_tags(&ws, &pid, &tags).await {
                page.set(Some(updated));
            }
            tags_busy.set(false);
        });
    };

    let on_tag_keydown = move |ev: web_sys::KeyboardEvent| {
        if ev.key() != "Enter" {
            return;
        }
        ev.prevent_default();

        let new_tag = tag_input.get_untracked().trim().to_string();
        if new_tag.is_empty() || tags_busy.get_untracked() {
            return;
        }

        let mut tags = page
            .with_untracked(|p| p.as_ref().map(|p| p.tags.clone()))
            .unwrap_or_default();
        if tags.iter().any(|t| t.eq_ignore_ascii_case(&new_tag)) {
            tag_input.set(String::new());
            return;
        }
        tags.push(new_tag);
        tag_input.set(String::new());
        apply_tags(tags);
    };

    let remove_tag = move |tag: String| {
        if tags_busy.get_untracked() {
            return;
        }
        let tags = page
            .with_untracked(|p| p.as_ref().map(|p| p.tags.clone()))
            .unwrap_or_default()
            .into_iter()
            .filter(|t| *t != tag)
            .collect::<Vec<_>>();
        apply_tags(tags);
    };

    let on_generate_tags = move |_: web_sys::MouseEvent| {
        if tags_busy.get_untracked() {
            return;
        }
        let pid = page_id();
        tags_busy.set(true);

        spawn_local(async move {
            if let Ok(suggested) = app
                .api_client
                .get_untracked()
                .generate_page_tags(&pid)
                .await
            {
                let mut tags = page
                    .with_untracked(|p| p.as_ref().map(|p| p.tags.clone()))
                    .unwrap_or_default();
                for tag in suggested {
                    if !tags.iter().any(|t| t.eq_ignore_ascii_case(&tag)) {
                        tags.push(tag);
                    }
                }
                let ws = workspace_id();
                if let Ok(updated) = app.workspace.set_page_tags(&ws, &pid, &tags).await {
                    page.set(Some(updated));
                }
            }
            tags_busy.set(false);
        });
    };

    let on_bookmark = move |_: web_sys::MouseEvent| {
        let ws = workspace_id();
        let pid = page_id();
        let bookmarked = page
            .with_untracked(|p| p.as_ref().map(|p| p.bookmarked))
            .unwrap_or(false);
        spawn_local(async move {
            if app
                .workspace
                .set_page_bookmark(&ws, &pid, !bookmarked)
                .await
                .is_ok()
            {
                page.update(|p| {
                    if let Some(p) = p.as_mut() {
                        p.bookmarked = !bookmarked;
                    }
                });
            }
        });
    };

    let on_duplicate = move |_: web_sys::MouseEvent| {
        let ws = workspace_id();
        let pid = page_id();
        controller.flush();
        spawn_local(async move {
            if let Ok(copy) = app.workspace.duplicate_page(&ws, &pid).await {
                navigate.with_value(|nav| {
                    nav(&format!("/workspace/{ws}/page/{}", copy.id), Default::default())
                });
            }
        });
    };

    let on_trash = move |_: web_sys::MouseEvent| {
        let ws = workspace_id();
        let pid = page_id();
        spawn_local(async move {
            if app.workspace.delete_page(&ws, &pid).await.is_ok() {
                navigate.with_value(|nav| nav(&format!("/workspace/{ws}"), Default::default()));
            }
        });
    };

    let save_state = move || {
        if controller.is_saving() {
            "Saving..."
        } else {
            "Saved"
        }
    };

    view! {
        <Show
            when=move || !page_loading.get()
            fallback=|| {
                view! {
                    <div class="flex justify-center py-16">
                        <Spinner class="size-6 text-muted-foreground" />
                    </div>
                }
            }
        >
            <div class="mx-auto w-full max-w-3xl px-6 py-6">
                <div class="mb-2 flex items-center justify-between">
                    <span class="text-xs text-muted-foreground">{save_state}</span>
                    <div class="flex items-center gap-1">
                        <Button
                            variant=ButtonVariant::Ghost
                            size=ButtonSize::Sm
                            on:click=on_bookmark
                        >
                            {move || {
                                let bookmarked = page
                                    .get()
                                    .map(|p| p.bookmarked)
                                    .unwrap_or(false);
                                if bookmarked { "★ Bookmarked" } else { "☆ Bookmark" }
                            }}
                        </Button>
                        <Button
                            variant=ButtonVariant::Ghost
                            size=ButtonSize::Sm
                            on:click=on_duplicate
                        >
                            "Duplicate"
                        </Button>
                        <Button
                            variant=ButtonVariant::Ghost
                            size=ButtonSize::Sm
                            class="text-destructive"
                            on:click=on_trash
                        >
                            "Move to trash"
                        </Button>
                    </div>
                </div>

                <Input
                    bind_value=title
                    placeholder="Untitled"
                    class="h-auto border-none px-0 text-2xl font-semibold shadow-none focus-visible:ring-0"
                />

                <div class="mt-2 flex flex-wrap items-center gap-1">
                    {move || {
                        page.get()
                            .map(|p| p.tags)
                            .unwrap_or_default()
                            .into_iter()
                            .map(|t| {
                                let tag = t.clone();
                                view! {
                                    <span class="inline-flex items-center gap-1 rounded-full bg-muted px-2 py-0.5 text-xs text-muted-foreground">
                                        {t.clone()}
                                        <button
                                            class="hover:text-foreground"
                                            aria-label=format!("Remove tag {t}")
                                            on:click=move |_| remove_tag(tag.clone())
                                        >
                                            "×"
                                        </button>
                                    </span>
                                }
                            })
                            .collect_view()
                    }}
                    <Input
                        bind_value=tag_input
                        placeholder="Add tag"
                        class="h-6 w-24 border-dashed text-xs"
                        on:keydown=on_tag_keydown
                    />
                    <Button
                        variant=ButtonVariant::Outline
                        size=ButtonSize::Sm
                        class="h-6 px-2 text-xs"
                        attr:disabled=move || tags_busy.get()
                        on:click=on_generate_tags
                    >
                        <Show when=move || tags_busy.get() fallback=|| ().into_view()>
                            <Spinner class="size-3" />
                        </Show>
                        "Suggest tags"
                    </Button>
                </div>

                <Textarea
                    bind_value=content
                    placeholder="Start writing..."
                    class="mt-4 min-h-[60vh] resize-none border-none px-0 shadow-none focus-visible:ring-0"
                />
            </div>
        </Show>
    }
}

/// Soft-deleted pages for the current workspace, with restore and
/// permanent delete.
#[component]
pub fn TrashPage() -> impl IntoView {
    let app = expect_context::<AppContext>().0;
    let params = leptos_router::hooks::use_params::<WorkspaceRouteParams>();

    let workspace_id = move || {
        params
            .get()
            .ok()
            .and_then(|p| p.workspace_id)
            .unwrap_or_default()
    };

    let items: RwSignal<Vec<Page>> = RwSignal::new(vec![]);
    let loading: RwSignal<bool> = RwSignal::new(true);
    let busy_id: RwSignal<Option<String>> = RwSignal::new(None);

    let purge_target: RwSignal<Option<Page>> = RwSignal::new(None);
    let purge_open: RwSignal<bool> = RwSignal::new(false);

    Effect::new(move |_| {
        let ws = workspace_id();
        if ws.is_empty() {
            return;
        }
        loading.set(true);
        spawn_local(async move {
            match app
                .api_client
                .get_untracked()
                .list_trashed_pages(&ws)
                .await
            {
                Ok(pages) => items.set(pages),
                Err(_) => items.set(vec![]),
            }
            loading.set(false);
        });
    });

    let on_restore = move |p: Page| {
        if busy_id.get_untracked().is_some() {
            return;
        }
        busy_id.set(Some(p.id.clone()));
        let ws = workspace_id();

        spawn_local(async move {
            if app.workspace.restore_page(&ws, &p.id).await.is_ok() {
                items.update(|list| list.retain(|x| x.id != p.id));
            }
            busy_id.set(None);
        });
    };

    let on_confirm_purge = move |_: web_sys::MouseEvent| {
        let Some(p) = purge_target.get_untracked() else {
            return;
        };
        if busy_id.get_untracked().is_some() {
            return;
        }
        busy_id.set(Some(p.id.clone()));
        let ws = workspace_id();

        spawn_local(async move {
            if app
                .api_client
                .get_untracked()
                .purge_page(&ws, &p.id)
                .await
                .is_ok()
            {
                items.update(|list| list.retain(|x| x.id != p.id));
            }
            purge_open.set(false);
            purge_target.set(None);
            busy_id.set(None);
        });
    };

    view! {
        <div class="mx-auto w-full max-w-3xl px-6 py-6">
            <h1 class="mb-1 text-xl font-semibold">"Trash"</h1>
            <p class="mb-4 text-xs text-muted-foreground">
                "Deleted pages stay here until restored or deleted forever."
            </p>

            <Show
                when=move || !loading.get()
                fallback=|| {
                    view! {
                        <div class="flex justify-center py-16">
                            <Spinner class="size-6 text-muted-foreground" />
                        </div>
                    }
                }
            >
                {move || {
                    let list = items.get();
                    if list.is_empty() {
                        view! {
                            <div class="rounded-lg border border-dashed px-6 py-16 text-center text-sm text-muted-foreground">
                                "Trash is empty."
                            </div>
                        }
                        .into_any()
                    } else {
                        list.into_iter()
                            .map(|p| {
                                let restore_page = p.clone();
                                let purge_page = p.clone();
                                let deleted_at = p.deleted_at.clone().unwrap_or_default();
                                let is_busy = {
                                    let id = p.id.clone();
                                    move || busy_id.get().as_deref() == Some(id.as_str())
                                };
                                view! {
                                    <div class="mb-2 flex items-center justify-between rounded-md border px-3 py-2">
                                        <div class="min-w-0">
                                            <div class="truncate text-sm font-medium">
                                                {p.title.clone()}
                                            </div>
                                            <div class="text-xs text-muted-foreground">
                                                {if deleted_at.is_empty() {
                                                    String::new()
                                                } else {
                                                    format!("Deleted {deleted_at}")
                                                }}
                                            </div>
                                        </div>
                                        <div class="flex shrink-0 items-center gap-1">
                                            <Button
                                                variant=ButtonVariant::Outline
                                                size=ButtonSize::Sm
                                                attr:disabled=is_busy.clone()
                                                on:click=move |_| on_restore(restore_page.clone())
                                            >
                                                "Restore"
                                            </Button>
                                            <Button
                                                variant=ButtonVariant::Ghost
                                                size=ButtonSize::Sm
                                                class="text-destructive"
                                                attr:disabled=is_busy
                                                on:click=move |_| {
                                                    purge_target.set(Some(purge_page.clone()));
                                                    purge_open.set(true);
                                                }
                                            >
                                                "Delete forever"
                                            </Button>
                                        </div>
                                    </div>
                                }
                            })
                            .collect_view()
                            .into_any()
                    }
                }}
            </Show>

            <Dialog
                open=purge_open
                on_close=Callback::new(move |_| {
                    purge_open.set(false);
                    purge_target.set(None);
                })
            >
                <DialogTitle>"Delete forever"</DialogTitle>
                <DialogDescription>
                    {move || {
                        let title = purge_target
                            .get()
                            .map(|p| p.title)
                            .unwrap_or_default();
                        format!("\"{title}\" will be permanently deleted. This cannot be undone.")
                    }}
                </DialogDescription>
                <div class="flex justify-end gap-2">
                    <Button
                        variant=ButtonVariant::Ghost
                        size=ButtonSize::Sm
                        on:click=move |_| {
                            purge_open.set(false);
                            purge_target.set(None);
                        }
                    >
                        "Cancel"
                    </Button>
                    <Button
                        variant=ButtonVariant::Destructive
                        size=ButtonSize::Sm
                        on:click=on_confirm_purge
                    >
                        "Delete forever"
                    </Button>
                </div>
            </Dialog>
        </div>
    }
}

#[component]
pub fn SettingsPage() -> impl IntoView {
    let app = expect_context::<AppContext>().0;

    let user = app.session.user();

    let name: RwSignal<String> = RwSignal::new(String::new());
    let picture: RwSignal<String> = RwSignal::new(String::new());
    let profile_loading: RwSignal<bool> = RwSignal::new(false);

    // Seed the form once per account; later signal updates (e.g. a
    // background profile refresh) must not clobber in-progress edits.
    let seeded_user_id: RwSignal<Option<String>> = RwSignal::new(None);
    Effect::new(move |_| {
        if let Some(u) = user.get() {
            if seeded_user_id.get_untracked().as_deref() != Some(u.id.as_str()) {
                seeded_user_id.set(Some(u.id.clone()));
                name.set(u.name.clone());
                picture.set(u.profile_picture.clone().unwrap_or_default());
            }
        }
    });

    let current_password: RwSignal<String> = RwSignal::new(String::new());
    let new_password: RwSignal<String> = RwSignal::new(String::new());
    let confirm_password: RwSignal<String> = RwSignal::new(String::new());
    let password_error: RwSignal<Option<String>> = RwSignal::new(None);
    let password_loading: RwSignal<bool> = RwSignal::new(false);

    let on_save_profile = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if profile_loading.get_untracked() {
            return;
        }

        let name_val = name.get_untracked();
        if name_val.trim().is_empty() {
            return;
        }
        let picture_val = picture.get_untracked();
        let picture_opt = if picture_val.trim().is_empty() {
            None
        } else {
            Some(picture_val.trim().to_string())
        };

        profile_loading.set(true);

        spawn_local(async move {
            let res = app
                .api_client
                .get_untracked()
                .update_profile(name_val.trim(), picture_opt.as_deref())
                .await;
            if let Ok(updated) = res {
                app.session.apply_user(updated);
                app.toasts.success("Profile updated");
            }
            profile_loading.set(false);
        });
    };

    let on_change_password = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if password_loading.get_untracked() {
            return;
        }

        let current = current_password.get_untracked();
        let new = new_password.get_untracked();

        if new.len() < 8 {
            password_error.set(Some("New password must be at least 8 characters".to_string()));
            return;
        }
        if new != confirm_password.get_untracked() {
            password_error.set(Some("Passwords do not match".to_string()));
            return;
        }

        password_loading.set(true);
        password_error.set(None);

        spawn_local(async move {
            if app
                .api_client
                .get_untracked()
                .change_password(&current, &new)
                .await
                .is_ok()
            {
                current_password.set(String::new());
                new_password.set(String::new());
                confirm_password.set(String::new());
                app.toasts.success("Password changed");
            }
            password_loading.set(false);
        });
    };

    view! {
        <div class="mx-auto w-full max-w-xl px-6 py-6">
            <h1 class="mb-4 text-xl font-semibold">"Settings"</h1>

            <Card class="mb-4">
                <CardHeader>
                    <CardTitle class="text-sm">"Profile"</CardTitle>
                    <CardDescription class="text-xs">
                        {move || {
                            user.get()
                                .map(|u| u.email)
                                .unwrap_or_default()
                        }}
                    </CardDescription>
                </CardHeader>
                <CardContent>
                    <form class="flex flex-col gap-3" on:submit=on_save_profile>
                        <div class="flex flex-col gap-1.5">
                            <Label html_for="profile-name" class="text-xs">"Name"</Label>
                            <Input
                                id="profile-name"
                                bind_value=name
                                required=true
                                class="h-8 text-sm"
                            />
                        </div>
                        <div class="flex flex-col gap-1.5">
                            <Label html_for="profile-picture" class="text-xs">
                                "Profile picture URL"
                            </Label>
                            <Input
                                id="profile-picture"
                                r#type="url"
                                placeholder="https://..."
                                bind_value=picture
                                class="h-8 text-sm"
                            />
                        </div>

                        <Show
                            when=move || {
                                user.get().map(|u| !u.is_email_verified).unwrap_or(false)
                            }
                            fallback=|| ().into_view()
                        >
                            <Alert>
                                <AlertDescription class="text-xs">
                                    "Your email address is not verified yet. Check your inbox."
                                </AlertDescription>
                            </Alert>
                        </Show>

                        <div>
                            <Button
                                size=ButtonSize::Sm
                                attr:disabled=move || profile_loading.get()
                            >
                                {move || if profile_loading.get() { "Saving..." } else { "Save profile" }}
                            </Button>
                        </div>
                    </form>
                </CardContent>
            </Card>

            <Card>
                <CardHeader>
                    <CardTitle class="text-sm">"Change password"</CardTitle>
                </CardHeader>
                <CardContent>
                    <form class="flex flex-col gap-3" on:submit=on_change_password>
                        <div class="flex flex-col gap-1.5">
                            <Label html_for="current-password" class="text-xs">
                                "Current password"
                            </Label>
                            <Input
                                id="current-password"
                                r#type="password"
                                bind_value=current_password
                                required=true
                                class="h-8 text-sm"
                            />
                        </div>
                        <div class="flex flex-col gap-1.5">
                            <Label html_for="new-password" class="text-xs">"New password"</Label>
                            <Input
                                id="new-password"
                                r#type="password"
                                bind_value=new_password
                                required=true
                                class="h-8 text-sm"
                            />
                        </div>
                        <div class="flex flex-col gap-1.5">
                            <Label html_for="confirm-new-password" class="text-xs">
                                "Confirm new password"
                            </Label>
                            <Input
                                id="confirm-new-password"
                                r#type="password"
                                bind_value=confirm_password
                                required=true
                                class="h-8 text-sm"
                            />
                        </div>

                        <Show when=move || password_error.get().is_some() fallback=|| ().into_view()>
                            {move || {
                                password_error.get().map(|e| {
                                    view! {
                                        <Alert class="border-destructive/30">
                                            <AlertDescription class="text-destructive text-xs">
                                                {e}
                                            </AlertDescription>
                                        </Alert>
                                    }
                                })
                            }}
                        </Show>

                        <div>
                            <Button
                                size=ButtonSize::Sm
                                attr:disabled=move || password_loading.get()
                            >
                                {move || {
                                    if password_loading.get() {
                                        "Changing..."
                                    } else {
                                        "Change password"
                                    }
                                }}
                            </Button>
                        </div>
                    </form>
                </CardContent>
            </Card>
        </div>
    }
}

/// Question box over the user's own content.
#[component]
fn AiAssistantDialog(open: RwSignal<bool>) -> impl IntoView {
    let app = expect_context::<AppContext>().0;

    let question: RwSignal<String> = RwSignal::new(String::new());
    let answer: RwSignal<Option<String>> = RwSignal::new(None);
    let loading: RwSignal<bool> = RwSignal::new(false);

    let on_ask = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if loading.get_untracked() {
            return;
        }
        let q = question.get_untracked();
        if q.trim().is_empty() {
            return;
        }

        loading.set(true);
        answer.set(None);

        spawn_local(async move {
            if let Ok(value) = app.api_client.get_untracked().ai_query(q.trim()).await {
                let text = value
                    .get("answer")
                    .and_then(|v| v.as_str())
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| value.to_string());
                answer.set(Some(text));
            }
            loading.set(false);
        });
    };

    view! {
        <Dialog open=open on_close=Callback::new(move |_| open.set(false)) class="max-w-lg">
            <DialogTitle>"Ask AI"</DialogTitle>
            <DialogDescription>
                "Answers are grounded in the pages of your workspaces."
            </DialogDescription>

            <form class="flex items-center gap-2" on:submit=on_ask>
                <Input
                    placeholder="What did I write about...?"
                    bind_value=question
                    class="h-8 text-sm"
                />
                <Button size=ButtonSize::Sm attr:disabled=move || loading.get()>
                    {move || if loading.get() { "Asking..." } else { "Ask" }}
                </Button>
            </form>

            <Show when=move || answer.get().is_some() fallback=|| ().into_view()>
                <div class="mt-3 rounded-md border bg-muted/30 p-3 text-sm whitespace-pre-wrap">
                    {move || answer.get().unwrap_or_default()}
                </div>
            </Show>
        </Dialog>
    }
}
