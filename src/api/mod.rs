use crate::models::{KnowledgeGraph, Page, User, Workspace};
use crate::storage;
use crate::toast::Toasts;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ApiErrorKind {
    Unauthorized,
    Network,
    Http,
    Parse,
}

#[derive(Clone, Debug)]
pub(crate) struct ApiError {
    pub kind: ApiErrorKind,
    pub status: Option<u16>,
    pub message: String,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl ApiError {
    fn network(e: reqwest::Error) -> Self {
        Self {
            kind: ApiErrorKind::Network,
            status: None,
            message: e.to_string(),
        }
    }

    fn parse(e: impl std::fmt::Display) -> Self {
        Self {
            kind: ApiErrorKind::Parse,
            status: None,
            message: e.to_string(),
        }
    }

    fn unauthorized() -> Self {
        Self {
            kind: ApiErrorKind::Unauthorized,
            status: Some(401),
            message: "Unauthorized".to_string(),
        }
    }

    fn http(status: reqwest::StatusCode, message: String) -> Self {
        Self {
            kind: ApiErrorKind::Http,
            status: Some(status.as_u16()),
            message,
        }
    }
}

pub(crate) type ApiResult<T> = Result<T, ApiError>;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct EnvConfig {
    pub api_url: String,
}

impl EnvConfig {
    pub fn new() -> Self {
        let default_api_url = "http://localhost:8080/api".to_string();

        // Deployment injects `window.ENV.API_URL`; fall back to the
        // local backend otherwise.
        if let Some(window) = web_sys::window() {
            if let Some(env) = window.get("ENV") {
                if !env.is_undefined() && env.is_object() {
                    if let Ok(api_url) = js_sys::Reflect::get(&env, &"API_URL".into()) {
                        if let Some(url_str) = api_url.as_string() {
                            return Self { api_url: url_str };
                        }
                    }
                }
            }
        }

        Self {
            api_url: default_api_url,
        }
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[derive(Serialize, Clone, Debug)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize, Clone, Debug)]
struct SignupRequest<'a> {
    email: &'a str,
    password: &'a str,
    name: &'a str,
}

#[derive(Serialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WorkspaceRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Partial page update; omitted fields are left untouched by the server.
#[derive(Serialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdatePageRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

/// Whether a failed call is surfaced to the user by the client itself.
///
/// `Quiet` is for flows that own their error display (login form,
/// background session verification). Everything else goes through
/// `Surface`, which also performs the global 401 handling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Notify {
    Surface,
    Quiet,
}

#[derive(Clone)]
pub(crate) struct ApiClient {
    pub(crate) base_url: String,
    pub(crate) token: Option<String>,
    toasts: Toasts,
}

impl ApiClient {
    pub fn new(base_url: String, toasts: Toasts) -> Self {
        Self {
            base_url,
            token: None,
            toasts,
        }
    }

    pub fn load_from_storage(toasts: Toasts) -> Self {
        let base_url = EnvConfig::new().api_url;
        let token = storage::load_token();

        Self {
            base_url,
            token,
            toasts,
        }
    }

    pub fn set_token(&mut self, token: String) {
        storage::save_token(&token);
        self.token = Some(token);
    }

    pub fn clear_token(&mut self) {
        self.token = None;
        storage::clear_auth();
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with("http") {
            path.to_string()
        } else {
            format!("{}{}", self.base_url, path)
        }
    }

    fn with_auth_headers(
        &self,
        mut req: reqwest::RequestBuilder,
        path: &str,
    ) -> reqwest::RequestBuilder {
        // Auth endpoints never carry a (possibly stale) bearer token.
        if path.starts_with("/auth/") {
            return req;
        }
        if let Some(token) = &self.token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }
        req
    }

    async fn send(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<&impl serde::Serialize>,
        notify: Notify,
    ) -> ApiResult<reqwest::Response> {
        let client = reqwest::Client::new();
        let mut req = client.request(method, self.url(path));
        req = self.with_auth_headers(req, path);

        if let Some(b) = body {
            req = req.json(b);
        }

        let res = match req.send().await {
            Ok(res) => res,
            Err(e) => {
                let err = ApiError::network(e);
                self.handle_error(&err, notify);
                return Err(err);
            }
        };

        if res.status().is_success() {
            return Ok(res);
        }

        let err = if res.status().as_u16() == 401 {
            ApiError::unauthorized()
        } else {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            ApiError::http(status, extract_error_message(status, &body))
        };

        self.handle_error(&err, notify);
        Err(err)
    }

    /// Each failed call reaches this exactly once, so a failure is never
    /// surfaced twice.
    fn handle_error(&self, err: &ApiError, notify: Notify) {
        if notify == Notify::Quiet {
            return;
        }

        match err.kind {
            ApiErrorKind::Unauthorized => {
                storage::clear_auth();
                self.toasts.error("Session expired. Please sign in again.");
                if let Some(win) = web_sys::window() {
                    let _ = win.location().set_href("/");
                }
            }
            ApiErrorKind::Network => {
                self.toasts.error("Network error. Check your connection.");
            }
            ApiErrorKind::Http | ApiErrorKind::Parse => {
                self.toasts.error(err.message.clone());
            }
        }
    }

    async fn request<T: serde::de::DeserializeOwned>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<&impl serde::Serialize>,
        notify: Notify,
    ) -> ApiResult<T> {
        let res = self.send(method, path, body, notify).await?;
        match res.json::<T>().await {
            Ok(v) => Ok(v),
            Err(e) => {
                let err = ApiError::parse(e);
                self.handle_error(&err, notify);
                Err(err)
            }
        }
    }

    /// For endpoints that return an empty (or irrelevant) body.
    async fn request_empty(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<&impl serde::Serialize>,
        notify: Notify,
    ) -> ApiResult<()> {
        self.send(method, path, body, notify).await.map(|_| ())
    }
}

const NO_BODY: Option<&()> = None;

// Auth endpoints. Quiet: the login/register forms display errors
// themselves, and session verification must never toast.
impl ApiClient {
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<AuthResponse> {
        self.request(
            reqwest::Method::POST,
            "/auth/login",
            Some(&LoginRequest { email, password }),
            Notify::Quiet,
        )
        .await
    }

    pub async fn signup(&self, email: &str, password: &str, name: &str) -> ApiResult<AuthResponse> {
        self.request(
            reqwest::Method::POST,
            "/auth/signup",
            Some(&SignupRequest {
                email,
                password,
                name,
            }),
            Notify::Quiet,
        )
        .await
    }

    /// Best-effort; local logout proceeds regardless of the outcome.
    pub async fn logout_remote(&self) -> ApiResult<()> {
        self.request_empty(reqwest::Method::POST, "/auth/logout", NO_BODY, Notify::Quiet)
            .await
    }

    pub async fn fetch_current_user(&self) -> ApiResult<User> {
        self.request(reqwest::Method::GET, "/users/me", NO_BODY, Notify::Quiet)
            .await
    }
}

// User settings.
impl ApiClient {
    pub async fn update_profile(
        &self,
        name: &str,
        profile_picture: Option<&str>,
    ) -> ApiResult<User> {
        self.request(
            reqwest::Method::PUT,
            "/users/profile",
            Some(&serde_json::json!({
                "name": name,
                "profilePicture": profile_picture,
            })),
            Notify::Surface,
        )
        .await
    }

    pub async fn change_password(&self, current: &str, new: &str) -> ApiResult<()> {
        self.request_empty(
            reqwest::Method::PUT,
            "/users/password",
            Some(&serde_json::json!({
                "currentPassword": current,
                "newPassword": new,
            })),
            Notify::Surface,
        )
        .await
    }
}

// Workspaces.
impl ApiClient {
    pub async fn list_workspaces(&self) -> ApiResult<Vec<Workspace>> {
        self.request(reqwest::Method::GET, "/workspaces", NO_BODY, Notify::Surface)
            .await
    }

    pub async fn create_workspace(&self, req: &WorkspaceRequest) -> ApiResult<Workspace> {
        self.request(
            reqwest::Method::POST,
            "/workspaces",
            Some(req),
            Notify::Surface,
        )
        .await
    }

    pub async fn update_workspace(
        &self,
        workspace_id: &str,
        req: &WorkspaceRequest,
    ) -> ApiResult<Workspace> {
        self.request(
            reqwest::Method::PUT,
            &format!("/workspaces/{workspace_id}"),
            Some(req),
            Notify::Surface,
        )
        .await
    }

    pub async fn delete_workspace(&self, workspace_id: &str) -> ApiResult<()> {
        self.request_empty(
            reqwest::Method::DELETE,
            &format!("/workspaces/{workspace_id}"),
            NO_BODY,
            Notify::Surface,
        )
        .await
    }
}

// Pages.
impl ApiClient {
    pub async fn list_pages(&self, workspace_id: &str) -> ApiResult<Vec<Page>> {
        self.request(
            reqwest::Method::GET,
            &format!("/workspaces/{workspace_id}/pages"),
            NO_BODY,
            Notify::Surface,
        )
        .await
    }

    pub async fn get_page(&self, workspace_id: &str, page_id: &str) -> ApiResult<Page> {
        self.request(
            reqwest::Method::GET,
            &format!("/workspaces/{workspace_id}/pages/{page_id}"),
            NO_BODY,
            Notify::Surface,
        )
        .await
    }

    pub async fn create_page(&self, workspace_id: &str, title: &str) -> ApiResult<Page> {
        self.request(
            reqwest::Method::POST,
            &format!("/workspaces/{workspace_id}/pages"),
            Some(&serde_json::json!({ "title": title })),
            Notify::Surface,
        )
        .await
    }

    pub async fn update_page(
        &self,
        workspace_id: &str,
        page_id: &str,
        req: &UpdatePageRequest,
    ) -> ApiResult<Page> {
        self.request(
            reqwest::Method::PUT,
            &format!("/workspaces/{workspace_id}/pages/{page_id}"),
            Some(req),
            Notify::Surface,
        )
        .await
    }

    pub async fn delete_page(&self, workspace_id: &str, page_id: &str) -> ApiResult<()> {
        self.request_empty(
            reqwest::Method::DELETE,
            &format!("/workspaces/{workspace_id}/pages/{page_id}"),
            NO_BODY,
            Notify::Surface,
        )
        .await
    }

    pub async fn duplicate_page(&self, workspace_id: &str, page_id: &str) -> ApiResult<Page> {
        self.request(
            reqwest::Method::POST,
            &format!("/workspaces/{workspace_id}/pages/{page_id}/duplicate"),
            NO_BODY,
            Notify::Surface,
        )
        .await
    }

    pub async fn set_page_tags(
        &self,
        workspace_id: &str,
        page_id: &str,
        tags: &[String],
    ) -> ApiResult<Page> {
        self.request(
            reqwest::Method::PUT,
            &format!("/workspaces/{workspace_id}/pages/{page_id}/tags"),
            Some(&serde_json::json!({ "tags": tags })),
            Notify::Surface,
        )
        .await
    }

    pub async fn set_page_bookmark(
        &self,
        workspace_id: &str,
        page_id: &str,
        bookmarked: bool,
    ) -> ApiResult<()> {
        self.request_empty(
            reqwest::Method::PUT,
            &format!("/workspaces/{workspace_id}/pages/{page_id}/bookmark?bookmarked={bookmarked}"),
            NO_BODY,
            Notify::Surface,
        )
        .await
    }
}

// Trash. Soft-deleted pages; restore puts them back, delete purges.
impl ApiClient {
    pub async fn list_trashed_pages(&self, workspace_id: &str) -> ApiResult<Vec<Page>> {
        self.request(
            reqwest::Method::GET,
            &format!("/workspaces/{workspace_id}/pages/trash"),
            NO_BODY,
            Notify::Surface,
        )
        .await
    }

    pub async fn restore_page(&self, workspace_id: &str, page_id: &str) -> ApiResult<Page> {
        self.request(
            reqwest::Method::POST,
            &format!("/workspaces/{workspace_id}/pages/trash/{page_id}/restore"),
            NO_BODY,
            Notify::Surface,
        )
        .await
    }

    pub async fn purge_page(&self, workspace_id: &str, page_id: &str) -> ApiResult<()> {
        self.request_empty(
            reqwest::Method::DELETE,
            &format!("/workspaces/{workspace_id}/pages/trash/{page_id}"),
            NO_BODY,
            Notify::Surface,
        )
        .await
    }
}

// Smart/AI features. All server-computed; these are plain fetches.
impl ApiClient {
    pub async fn fetch_knowledge_graph(&self, workspace_id: &str) -> ApiResult<KnowledgeGraph> {
        self.request(
            reqwest::Method::GET,
            &format!("/workspaces/{workspace_id}/smart/knowledge-graph"),
            NO_BODY,
            Notify::Surface,
        )
        .await
    }

    pub async fn generate_page_tags(&self, page_id: &str) -> ApiResult<Vec<String>> {
        self.request(
            reqwest::Method::GET,
            &format!("/ai/upload/{page_id}/tag"),
            NO_BODY,
            Notify::Surface,
        )
        .await
    }

    pub async fn ai_query(&self, question: &str) -> ApiResult<serde_json::Value> {
        self.request(
            reqwest::Method::POST,
            "/ai/query",
            Some(&serde_json::json!({ "question": question })),
            Notify::Surface,
        )
        .await
    }
}

/// Backend errors carry `{ "message": ... }`; anything else falls back
/// to the raw body or the status line.
fn extract_error_message(status: reqwest::StatusCode, body: &str) -> String {
    if let Ok(v) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(msg) = v.get("message").and_then(|m| m.as_str()) {
            if !msg.trim().is_empty() {
                return msg.to_string();
            }
        }
    }

    if !body.trim().is_empty() {
        return body.trim().to_string();
    }

    format!("Request failed ({status})")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_response_contract_deserialize() {
        // Contract based on the backend's AuthResponse DTO.
        let json = r#"{
            "token": "jwt-token",
            "user": {"id": "u-1", "email": "u@example.com", "name": "U"}
        }"#;
        let parsed: AuthResponse = serde_json::from_str(json).expect("auth response should parse");
        assert_eq!(parsed.token, "jwt-token");
        assert_eq!(parsed.user.email, "u@example.com");
    }

    #[test]
    fn update_page_request_skips_unset_fields() {
        let req = UpdatePageRequest {
            title: Some("T".to_string()),
            ..Default::default()
        };
        let v = serde_json::to_value(&req).expect("should serialize");
        assert_eq!(v["title"], "T");
        assert!(v.get("content").is_none());
        assert!(v.get("iconUrl").is_none());
    }

    #[test]
    fn error_message_prefers_backend_message_field() {
        let status = reqwest::StatusCode::BAD_REQUEST;
        let msg = extract_error_message(status, r#"{"message": "Name is required"}"#);
        assert_eq!(msg, "Name is required");
    }

    #[test]
    fn error_message_falls_back_to_body_then_status() {
        let status = reqwest::StatusCode::INTERNAL_SERVER_ERROR;
        assert_eq!(extract_error_message(status, "boom"), "boom");
        assert_eq!(
            extract_error_message(status, ""),
            "Request failed (500 Internal Server Error)"
        );
    }

    #[test]
    fn unauthorized_error_shape() {
        let e = ApiError::unauthorized();
        assert_eq!(e.kind, ApiErrorKind::Unauthorized);
        assert_eq!(e.status, Some(401));
    }
}
