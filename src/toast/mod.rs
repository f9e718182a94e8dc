use leptos::prelude::*;
use strum::Display;
use wasm_bindgen::JsCast;

const DISMISS_AFTER_MS: i32 = 4000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub(crate) enum ToastKind {
    Success,
    Error,
    Info,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Toast {
    pub id: u64,
    pub kind: ToastKind,
    pub message: String,
}

/// Transient notification store. One instance is created in `AppState`
/// and provided via context; tests can construct isolated instances.
#[derive(Clone, Copy)]
pub(crate) struct Toasts {
    items: RwSignal<Vec<Toast>>,
    next_id: RwSignal<u64>,
}

impl Toasts {
    pub fn new() -> Self {
        Self {
            items: RwSignal::new(vec![]),
            next_id: RwSignal::new(0),
        }
    }

    pub fn success(&self, message: impl Into<String>) {
        self.push(ToastKind::Success, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(ToastKind::Error, message.into());
    }

    #[allow(dead_code)]
    pub fn info(&self, message: impl Into<String>) {
        self.push(ToastKind::Info, message.into());
    }

    pub fn items(&self) -> RwSignal<Vec<Toast>> {
        self.items
    }

    fn push(&self, kind: ToastKind, message: String) {
        let id = self.next_id.get_untracked();
        self.next_id.set(id + 1);

        self.items.update(|items| {
            items.push(Toast { id, kind, message });
        });

        self.schedule_dismiss(id);
    }

    pub(crate) fn dismiss(&self, id: u64) {
        self.items.update(|items| items.retain(|t| t.id != id));
    }

    fn schedule_dismiss(&self, id: u64) {
        let Some(win) = web_sys::window() else {
            return;
        };

        let items = self.items;
        let cb = wasm_bindgen::closure::Closure::once_into_js(move || {
            items.update(|list| list.retain(|t| t.id != id));
        });

        let _ = win.set_timeout_with_callback_and_timeout_and_arguments_0(
            cb.as_ref().unchecked_ref(),
            DISMISS_AFTER_MS,
        );
    }
}

/// Fixed overlay rendering the toast stack. Mounted once in `App`.
#[component]
pub fn ToastHost() -> impl IntoView {
    let toasts = expect_context::<Toasts>();

    let kind_class = |kind: ToastKind| match kind {
        ToastKind::Success => "border-success/40 text-foreground",
        ToastKind::Error => "border-destructive/40 text-destructive",
        ToastKind::Info => "border-border text-muted-foreground",
    };

    view! {
        <div class="pointer-events-none fixed bottom-4 right-4 z-50 flex w-80 flex-col gap-2">
            <For
                each=move || toasts.items().get()
                key=|t| t.id
                children=move |t: Toast| {
                    let id = t.id;
                    view! {
                        <div
                            class=format!(
                                "pointer-events-auto flex items-start justify-between gap-2 rounded-md border bg-background px-3 py-2 text-sm shadow-md {}",
                                kind_class(t.kind)
                            )
                            data-toast-kind=t.kind.to_string()
                        >
                            <span class="whitespace-pre-line">{t.message.clone()}</span>
                            <button
                                class="text-xs text-muted-foreground hover:text-foreground"
                                on:click=move |_| toasts.dismiss(id)
                            >
                                "✕"
                            </button>
                        </div>
                    }
                }
            />
        </div>
    }
}
