use crate::api::UpdatePageRequest;
use crate::state::WorkspaceState;
use leptos::prelude::*;
use leptos::task::spawn_local;
use wasm_bindgen::JsCast;

const DEBOUNCE_MS: i32 = 1500;

/// Single-slot "latest write wins" queue: at most one save in flight,
/// at most one pending. A newer write while one is in flight overwrites
/// the pending slot; completion starts whatever is queued.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct SaveQueue<T> {
    in_flight: bool,
    pending: Option<T>,
}

impl<T> SaveQueue<T> {
    pub fn new() -> Self {
        Self {
            in_flight: false,
            pending: None,
        }
    }

    /// Stages a write; an earlier staged write is superseded.
    pub fn offer(&mut self, item: T) {
        self.pending = Some(item);
    }

    /// Takes the staged write and marks it in flight, unless a save is
    /// already running (the staged write then waits for `complete`).
    pub fn start(&mut self) -> Option<T> {
        if self.in_flight {
            return None;
        }
        let next = self.pending.take()?;
        self.in_flight = true;
        Some(next)
    }

    /// Marks the in-flight save done and immediately claims the next
    /// staged write, if any.
    pub fn complete(&mut self) -> Option<T> {
        self.in_flight = false;
        self.start()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// Debounced autosave for the page editing surface.
///
/// Edits stage the full desired document (title + content) into the
/// queue and re-arm a debounce timer; when it fires the staged write is
/// started. `flush` skips the debounce for pagehide/unmount so a
/// pending edit is never lost.
#[derive(Clone, Copy)]
pub(crate) struct PageSaveController {
    workspace: WorkspaceState,

    workspace_id: RwSignal<String>,
    page_id: RwSignal<String>,

    queue: RwSignal<SaveQueue<UpdatePageRequest>>,
    timer_id: RwSignal<Option<i32>>,
    saving: RwSignal<bool>,
}

impl PageSaveController {
    pub fn new(workspace: WorkspaceState) -> Self {
        Self {
            workspace,
            workspace_id: RwSignal::new(String::new()),
            page_id: RwSignal::new(String::new()),
            queue: RwSignal::new(SaveQueue::new()),
            timer_id: RwSignal::new(None),
            saving: RwSignal::new(false),
        }
    }

    /// Switching pages drops edits staged for the previous one; the
    /// caller flushes before switching.
    pub fn set_target(&self, workspace_id: String, page_id: String) {
        self.clear_timer();
        self.queue.set(SaveQueue::new());
        self.workspace_id.set(workspace_id);
        self.page_id.set(page_id);
    }

    pub fn is_saving(&self) -> bool {
        self.saving.get()
    }

    pub fn on_edit(&self, req: UpdatePageRequest) {
        self.queue.update(|q| q.offer(req));
        self.schedule();
    }

    /// Starts the staged write immediately (pagehide, unmount, explicit
    /// "save now").
    pub fn flush(&self) {
        self.clear_timer();
        self.kick();
    }

    fn schedule(&self) {
        let Some(win) = web_sys::window() else {
            return;
        };

        self.clear_timer();

        let s = *self;
        let cb = wasm_bindgen::closure::Closure::once_into_js(move || {
            s.timer_id.set(None);
            s.kick();
        });

        let tid = win
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                cb.as_ref().unchecked_ref(),
                DEBOUNCE_MS,
            )
            .unwrap_or(0);
        self.timer_id.set(Some(tid));
    }

    fn clear_timer(&self) {
        if let Some(tid) = self.timer_id.get_untracked() {
            if let Some(win) = web_sys::window() {
                win.clear_timeout_with_handle(tid);
            }
            self.timer_id.set(None);
        }
    }

    fn kick(&self) {
        let started = self
            .queue
            .try_update(|q| q.start())
            .flatten();
        if let Some(req) = started {
            self.send(req);
        }
    }

    fn send(&self, req: UpdatePageRequest) {
        let workspace_id = self.workspace_id.get_untracked();
        let page_id = self.page_id.get_untracked();
        if workspace_id.trim().is_empty() || page_id.trim().is_empty() {
            self.queue.update(|q| {
                let _ = q.complete();
            });
            return;
        }

        self.saving.set(true);
        let s = *self;
        spawn_local(async move {
            // Failures are surfaced by the API client; the staged slot
            // keeps newer edits either way.
            let _ = s.workspace.update_page(&workspace_id, &page_id, &req).await;

            let next = s.queue.try_update(|q| q.complete()).flatten();
            match next {
                Some(req) => s.send(req),
                None => s.saving.set(false),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_claims_staged_write_once() {
        let mut q: SaveQueue<&str> = SaveQueue::new();
        q.offer("a");

        assert_eq!(q.start(), Some("a"));
        assert!(q.is_in_flight());
        // Nothing staged and one already flying.
        assert_eq!(q.start(), None);
    }

    #[test]
    fn newer_write_supersedes_pending() {
        let mut q: SaveQueue<&str> = SaveQueue::new();
        q.offer("a");
        q.offer("b");
        assert_eq!(q.start(), Some("b"));
    }

    #[test]
    fn write_during_flight_starts_on_completion() {
        let mut q: SaveQueue<&str> = SaveQueue::new();
        q.offer("a");
        assert_eq!(q.start(), Some("a"));

        q.offer("b");
        assert_eq!(q.start(), None);
        assert!(q.has_pending());

        assert_eq!(q.complete(), Some("b"));
        assert!(q.is_in_flight());
        assert_eq!(q.complete(), None);
        assert!(!q.is_in_flight());
    }

    #[test]
    fn complete_without_pending_goes_idle() {
        let mut q: SaveQueue<&str> = SaveQueue::new();
        q.offer("a");
        let _ = q.start();
        assert_eq!(q.complete(), None);
        assert!(!q.is_in_flight());
        assert!(!q.has_pending());
    }
}
