use crate::api::{ApiClient, ApiResult, UpdatePageRequest, WorkspaceRequest};
use crate::models::{Page, Workspace};
use crate::storage;
use crate::toast::Toasts;
use leptos::prelude::*;
use leptos::task::spawn_local;

/// Owns the workspace list and the active workspace's page list. All
/// CRUD flows funnel through here so sidebar, dashboard and the
/// selection modal observe consistent state.
///
/// Mutations are remote-first: the in-memory lists change only after
/// the server confirmed, never optimistically. Failures are surfaced by
/// the API client and rethrown so callers can react (e.g. keep a modal
/// open).
#[derive(Clone, Copy)]
pub(crate) struct WorkspaceState {
    api: RwSignal<ApiClient>,
    toasts: Toasts,

    workspaces: RwSignal<Vec<Workspace>>,
    current: RwSignal<Option<Workspace>>,

    /// Pages of the current workspace; replaced wholesale on load.
    pages: RwSignal<Vec<Page>>,

    is_loading: RwSignal<bool>,
    loaded_once: RwSignal<bool>,

    /// Workspace id the in-flight page fetch belongs to. A repeat call
    /// for the same id collapses into the running fetch; a call for a
    /// different id supersedes it, and the superseded response is
    /// dropped on arrival.
    pages_loading_for: RwSignal<Option<String>>,
}

impl WorkspaceState {
    pub fn new(api: RwSignal<ApiClient>, toasts: Toasts) -> Self {
        Self {
            api,
            toasts,
            workspaces: RwSignal::new(vec![]),
            current: RwSignal::new(None),
            pages: RwSignal::new(vec![]),
            is_loading: RwSignal::new(false),
            loaded_once: RwSignal::new(false),
            pages_loading_for: RwSignal::new(None),
        }
    }

    pub fn workspaces(&self) -> RwSignal<Vec<Workspace>> {
        self.workspaces
    }

    pub fn current(&self) -> RwSignal<Option<Workspace>> {
        self.current
    }

    pub fn pages(&self) -> RwSignal<Vec<Page>> {
        self.pages
    }

    pub fn pages_loading(&self) -> bool {
        self.pages_loading_for.with(|id| id.is_some())
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading.get()
    }

    pub fn loaded_once(&self) -> bool {
        self.loaded_once.get()
    }

    /// Fetches the workspace list and resolves the current workspace:
    /// previously persisted id if it still exists, else the first entry,
    /// else none (upstream shows the selection prompt). The resolved id
    /// is persisted before the page list is requested, so a reload
    /// resumes the same workspace.
    pub async fn load_workspaces(&self) -> ApiResult<()> {
        if !self.api.with_untracked(|c| c.is_authenticated()) {
            return Ok(());
        }

        self.is_loading.set(true);
        let res = self.api.get_untracked().list_workspaces().await;
        self.is_loading.set(false);
        self.loaded_once.set(true);

        match res {
            Ok(list) => {
                let saved = storage::load_current_workspace_id();
                let current = resolve_current(&list, saved.as_deref());
                storage::save_current_workspace_id(current.as_ref().map(|w| w.id.as_str()));

                self.workspaces.set(list);
                self.current.set(current.clone());

                if let Some(w) = current {
                    let _ = self.load_pages(&w.id).await;
                }
                Ok(())
            }
            Err(e) => {
                // Read failure: leave the list empty rather than crash
                // the view; the API client already notified.
                self.workspaces.set(vec![]);
                self.current.set(None);
                Err(e)
            }
        }
    }

    /// Persists the id before returning so callers can navigate right
    /// after without racing the persistence write. `None` clears the
    /// selection. The page list refresh is kicked off in the background.
    pub fn set_current_workspace(&self, workspace: Option<Workspace>) -> Option<Workspace> {
        storage::save_current_workspace_id(workspace.as_ref().map(|w| w.id.as_str()));
        self.current.set(workspace.clone());

        match workspace {
            Some(w) => {
                let s = *self;
                let id = w.id.clone();
                spawn_local(async move {
                    let _ = s.load_pages(&id).await;
                });
                Some(w)
            }
            None => {
                self.pages.set(vec![]);
                None
            }
        }
    }

    /// Replaces the page list wholesale. The page list must only ever
    /// mirror the current workspace: a response whose fetch has been
    /// superseded, or whose workspace is no longer current, is dropped.
    pub async fn load_pages(&self, workspace_id: &str) -> ApiResult<()> {
        if self.pages_loading_for.get_untracked().as_deref() == Some(workspace_id) {
            return Ok(());
        }

        self.pages_loading_for.set(Some(workspace_id.to_string()));
        let res = self.api.get_untracked().list_pages(workspace_id).await;

        let adopt = should_adopt_pages(
            self.pages_loading_for.get_untracked().as_deref(),
            self.current_id().as_deref(),
            workspace_id,
        );

        // Only the owner of the in-flight slot clears it; a superseding
        // call settles the flag when its own response lands.
        if self.pages_loading_for.get_untracked().as_deref() == Some(workspace_id) {
            self.pages_loading_for.set(None);
        }

        if !adopt {
            return res.map(|_| ());
        }

        match res {
            Ok(pages) => {
                self.pages.set(pages);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    pub async fn create_workspace(&self, name: &str, description: &str) -> ApiResult<Workspace> {
        let req = WorkspaceRequest {
            name: name.to_string(),
            description: description.to_string(),
        };
        let created = self.api.get_untracked().create_workspace(&req).await?;

        self.workspaces.update(|list| list.push(created.clone()));
        self.set_current_workspace(Some(created.clone()));
        self.toasts.success("Workspace created");
        Ok(created)
    }

    pub async fn update_workspace(
        &self,
        workspace_id: &str,
        name: &str,
        description: &str,
    ) -> ApiResult<Workspace> {
        let req = WorkspaceRequest {
            name: name.to_string(),
            description: description.to_string(),
        };
        let updated = self
            .api
            .get_untracked()
            .update_workspace(workspace_id, &req)
            .await?;

        self.workspaces.update(|list| {
            replace_workspace(list, updated.clone());
        });
        if self.current_id().as_deref() == Some(workspace_id) {
            self.current.set(Some(updated.clone()));
        }
        self.toasts.success("Workspace updated");
        Ok(updated)
    }

    /// Deleting the active workspace falls the current pointer over to a
    /// survivor (whose pages are then loaded), or to the empty state.
    pub async fn delete_workspace(&self, workspace_id: &str) -> ApiResult<()> {
        self.api.get_untracked().delete_workspace(workspace_id).await?;

        let survivors: Vec<Workspace> = self
            .workspaces
            .get_untracked()
            .into_iter()
            .filter(|w| w.id != workspace_id)
            .collect();
        let next_current =
            next_current_after_delete(&survivors, self.current.get_untracked(), workspace_id);

        self.workspaces.set(survivors);
        self.set_current_workspace(next_current);
        self.toasts.success("Workspace deleted");
        Ok(())
    }

    pub async fn create_page(&self, workspace_id: &str, title: &str) -> ApiResult<Page> {
        let created = self
            .api
            .get_untracked()
            .create_page(workspace_id, title)
            .await?;

        self.sync_page_into_list(created.clone());
        self.bump_page_count(workspace_id, 1);
        self.toasts.success("Page created");
        Ok(created)
    }

    pub async fn update_page(
        &self,
        workspace_id: &str,
        page_id: &str,
        req: &UpdatePageRequest,
    ) -> ApiResult<Page> {
        let updated = self
            .api
            .get_untracked()
            .update_page(workspace_id, page_id, req)
            .await?;

        self.sync_page_into_list(updated.clone());
        Ok(updated)
    }

    /// Soft delete: the page moves to the trash.
    pub async fn delete_page(&self, workspace_id: &str, page_id: &str) -> ApiResult<()> {
        self.api
            .get_untracked()
            .delete_page(workspace_id, page_id)
            .await?;

        self.pages.update(|list| list.retain(|p| p.id != page_id));
        self.bump_page_count(workspace_id, -1);
        self.toasts.success("Page moved to trash");
        Ok(())
    }

    pub async fn duplicate_page(&self, workspace_id: &str, page_id: &str) -> ApiResult<Page> {
        let copy = self
            .api
            .get_untracked()
            .duplicate_page(workspace_id, page_id)
            .await?;

        self.sync_page_into_list(copy.clone());
        self.bump_page_count(workspace_id, 1);
        self.toasts.success("Page duplicated");
        Ok(copy)
    }

    pub async fn set_page_tags(
        &self,
        workspace_id: &str,
        page_id: &str,
        tags: &[String],
    ) -> ApiResult<Page> {
        let updated = self
            .api
            .get_untracked()
            .set_page_tags(workspace_id, page_id, tags)
            .await?;

        self.sync_page_into_list(updated.clone());
        Ok(updated)
    }

    /// The bookmark endpoint returns an empty body; the flag is flipped
    /// locally after the write succeeds.
    pub async fn set_page_bookmark(
        &self,
        workspace_id: &str,
        page_id: &str,
        bookmarked: bool,
    ) -> ApiResult<()> {
        self.api
            .get_untracked()
            .set_page_bookmark(workspace_id, page_id, bookmarked)
            .await?;

        self.pages
            .update(|list| set_bookmark_flag(list, page_id, bookmarked));
        Ok(())
    }

    /// Restoring from trash puts the page back into the active list.
    pub async fn restore_page(&self, workspace_id: &str, page_id: &str) -> ApiResult<Page> {
        let restored = self
            .api
            .get_untracked()
            .restore_page(workspace_id, page_id)
            .await?;

        self.sync_page_into_list(restored.clone());
        self.bump_page_count(workspace_id, 1);
        self.toasts.success("Page restored");
        Ok(restored)
    }

    /// Logout path: forget everything, including the persisted id.
    pub fn clear(&self) {
        self.workspaces.set(vec![]);
        self.current.set(None);
        self.pages.set(vec![]);
        self.is_loading.set(false);
        self.loaded_once.set(false);
        self.pages_loading_for.set(None);
        storage::save_current_workspace_id(None);
    }

    pub fn current_id(&self) -> Option<String> {
        self.current.get_untracked().map(|w| w.id)
    }

    /// The page list only mirrors the current workspace; pages of other
    /// workspaces never leak in.
    fn sync_page_into_list(&self, page: Page) {
        if self.current_id().as_deref() != Some(page.workspace_id.as_str()) {
            return;
        }
        self.pages.update(|list| upsert_page(list, page));
    }

    fn bump_page_count(&self, workspace_id: &str, delta: i64) {
        let apply = |w: &mut Workspace| {
            w.page_count = (w.page_count as i64 + delta).max(0) as u32;
        };
        self.workspaces.update(|list| {
            if let Some(w) = list.iter_mut().find(|w| w.id == workspace_id) {
                apply(w);
            }
        });
        self.current.update(|cur| {
            if let Some(w) = cur.as_mut() {
                if w.id == workspace_id {
                    apply(w);
                }
            }
        });
    }
}

/// Current-workspace resolution: persisted id wins if it still exists,
/// otherwise the first workspace, otherwise none.
pub(crate) fn resolve_current(list: &[Workspace], saved_id: Option<&str>) -> Option<Workspace> {
    if let Some(id) = saved_id {
        if let Some(w) = list.iter().find(|w| w.id == id) {
            return Some(w.clone());
        }
    }
    list.first().cloned()
}

pub(crate) fn replace_workspace(list: &mut [Workspace], updated: Workspace) {
    if let Some(w) = list.iter_mut().find(|w| w.id == updated.id) {
        *w = updated;
    }
}

pub(crate) fn upsert_page(list: &mut Vec<Page>, page: Page) {
    if let Some(p) = list.iter_mut().find(|p| p.id == page.id) {
        *p = page;
    } else {
        list.push(page);
    }
}

/// A finished page fetch is adopted only when it still owns the
/// in-flight slot (no later call superseded it) and its workspace is
/// still the current one.
pub(crate) fn should_adopt_pages(
    in_flight_for: Option<&str>,
    current_id: Option<&str>,
    fetched_for: &str,
) -> bool {
    in_flight_for == Some(fetched_for) && current_id == Some(fetched_for)
}

/// Selection after a workspace delete: deleting the active workspace
/// promotes the first survivor (none left means no selection); deleting
/// any other workspace keeps the selection as it is.
pub(crate) fn next_current_after_delete(
    survivors: &[Workspace],
    current: Option<Workspace>,
    deleted_id: &str,
) -> Option<Workspace> {
    match current {
        Some(w) if w.id == deleted_id => survivors.first().cloned(),
        other => other,
    }
}

pub(crate) fn set_bookmark_flag(list: &mut [Page], page_id: &str, bookmarked: bool) {
    if let Some(p) = list.iter_mut().find(|p| p.id == page_id) {
        p.bookmarked = bookmarked;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ws(id: &str) -> Workspace {
        Workspace {
            id: id.to_string(),
            name: format!("W {id}"),
            description: String::new(),
            page_count: 0,
        }
    }

    fn page(id: &str, workspace_id: &str) -> Page {
        Page {
            id: id.to_string(),
            workspace_id: workspace_id.to_string(),
            title: format!("P {id}"),
            content: String::new(),
            icon_url: None,
            bookmarked: false,
            tags: vec![],
            deleted_at: None,
        }
    }

    #[test]
    fn resolve_prefers_persisted_id() {
        let list = vec![ws("a"), ws("b")];
        let got = resolve_current(&list, Some("b")).expect("should resolve");
        assert_eq!(got.id, "b");
    }

    #[test]
    fn resolve_falls_back_to_first_without_persisted_id() {
        let list = vec![ws("a"), ws("b")];
        let got = resolve_current(&list, None).expect("should resolve");
        assert_eq!(got.id, "a");
    }

    #[test]
    fn resolve_falls_back_to_first_on_stale_persisted_id() {
        let list = vec![ws("a"), ws("b")];
        let got = resolve_current(&list, Some("gone")).expect("should resolve");
        assert_eq!(got.id, "a");
    }

    #[test]
    fn resolve_empty_list_yields_none() {
        assert!(resolve_current(&[], Some("a")).is_none());
        assert!(resolve_current(&[], None).is_none());
    }

    #[test]
    fn replace_workspace_swaps_by_id_only() {
        let mut list = vec![ws("a"), ws("b")];
        let mut updated = ws("b");
        updated.name = "Renamed".to_string();
        replace_workspace(&mut list, updated);

        assert_eq!(list[0].name, "W a");
        assert_eq!(list[1].name, "Renamed");
    }

    #[test]
    fn deleting_active_workspace_promotes_first_survivor() {
        let survivors = vec![ws("b"), ws("c")];
        let got = next_current_after_delete(&survivors, Some(ws("a")), "a").expect("should promote");
        assert_eq!(got.id, "b");
    }

    #[test]
    fn deleting_last_workspace_leaves_no_selection() {
        assert!(next_current_after_delete(&[], Some(ws("a")), "a").is_none());
    }

    #[test]
    fn deleting_inactive_workspace_keeps_selection() {
        let survivors = vec![ws("a")];
        let got = next_current_after_delete(&survivors, Some(ws("a")), "b").expect("should keep");
        assert_eq!(got.id, "a");
    }

    #[test]
    fn page_fetch_adopted_only_for_owning_current_workspace() {
        assert!(should_adopt_pages(Some("w1"), Some("w1"), "w1"));
    }

    #[test]
    fn stale_page_fetch_dropped_after_workspace_switch() {
        // w1's fetch still owns the slot, but the selection moved to w2.
        assert!(!should_adopt_pages(Some("w1"), Some("w2"), "w1"));
    }

    #[test]
    fn superseded_page_fetch_dropped() {
        // A fetch for w2 took over the slot while w1's was in flight.
        assert!(!should_adopt_pages(Some("w2"), Some("w2"), "w1"));
    }

    #[test]
    fn bookmark_flag_flips_only_target_page() {
        let mut list = vec![page("p1", "w"), page("p2", "w")];
        set_bookmark_flag(&mut list, "p2", true);
        assert!(!list[0].bookmarked);
        assert!(list[1].bookmarked);

        set_bookmark_flag(&mut list, "p2", false);
        assert!(!list[1].bookmarked);
    }

    #[test]
    fn upsert_page_appends_new_and_replaces_existing() {
        let mut list = vec![page("p1", "w")];

        upsert_page(&mut list, page("p2", "w"));
        assert_eq!(list.len(), 2);

        let mut renamed = page("p1", "w");
        renamed.title = "Renamed".to_string();
        upsert_page(&mut list, renamed);
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].title, "Renamed");
    }
}
