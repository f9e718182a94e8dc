use leptos::prelude::*;
use tw_merge::tw_merge;

/// Controlled modal dialog. `open` drives visibility; clicking the
/// backdrop runs `on_close` (callers decide whether closing is allowed,
/// e.g. the workspace chooser refuses to close while no workspace
/// exists).
#[component]
pub fn Dialog(
    #[prop(into)] open: RwSignal<bool>,
    #[prop(into, optional)] on_close: Option<Callback<()>>,
    #[prop(into, optional)] class: String,
    children: ChildrenFn,
) -> impl IntoView {
    let children = StoredValue::new(children);
    let panel_class = tw_merge!(
        "w-full max-w-md rounded-lg border bg-background p-5 shadow-lg",
        class
    );
    let panel_class = StoredValue::new(panel_class);

    view! {
        <Show when=move || open.get() fallback=|| ().into_view()>
            <div
                class="fixed inset-0 z-40 flex items-center justify-center bg-black/50 p-4"
                on:click=move |_| {
                    if let Some(cb) = on_close {
                        cb.run(());
                    }
                }
            >
                <div
                    class=panel_class.get_value()
                    on:click=move |ev: web_sys::MouseEvent| ev.stop_propagation()
                >
                    {move || children.with_value(|c| c())}
                </div>
            </div>
        </Show>
    }
}

#[component]
pub fn DialogTitle(#[prop(into, optional)] class: String, children: Children) -> impl IntoView {
    let class = tw_merge!("mb-1 text-base font-semibold", class);
    view! { <h2 class=class>{children()}</h2> }
}

#[component]
pub fn DialogDescription(
    #[prop(into, optional)] class: String,
    children: Children,
) -> impl IntoView {
    let class = tw_merge!("mb-3 text-sm text-muted-foreground", class);
    view! { <p class=class>{children()}</p> }
}
