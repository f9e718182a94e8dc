use serde::{Deserialize, Serialize};

/// Authenticated account as returned by `GET /users/me` and the auth
/// endpoints. The backend speaks camelCase JSON.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub is_email_verified: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Workspace {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub page_count: u32,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Page {
    pub id: String,
    pub workspace_id: String,
    pub title: String,

    /// Opaque rich-text document JSON. The editing engine owns its
    /// schema; we never interpret it.
    #[serde(default)]
    pub content: String,

    #[serde(default)]
    pub icon_url: Option<String>,
    #[serde(default)]
    pub bookmarked: bool,
    #[serde(default)]
    pub tags: Vec<String>,

    /// Set once the page is soft-deleted (lives in trash).
    #[serde(default)]
    pub deleted_at: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GraphNode {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub kind: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GraphEdge {
    pub source: String,
    pub target: String,
}

/// Pre-computed knowledge graph for a workspace. The server does all
/// graph construction; we only render what comes back.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct KnowledgeGraph {
    #[serde(default)]
    pub nodes: Vec<GraphNode>,
    #[serde(default)]
    pub edges: Vec<GraphEdge>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_contract_deserialize() {
        // Contract based on the backend's UserResponse DTO.
        let json = r#"{
            "id": "u-1",
            "email": "u@example.com",
            "name": "U",
            "profilePicture": null,
            "isEmailVerified": true
        }"#;
        let u: User = serde_json::from_str(json).expect("user should parse");
        assert_eq!(u.id, "u-1");
        assert!(u.is_email_verified);
        assert!(u.profile_picture.is_none());
    }

    #[test]
    fn workspace_contract_tolerates_missing_optionals() {
        let json = r#"{"id": "w-1", "name": "Notes"}"#;
        let w: Workspace = serde_json::from_str(json).expect("workspace should parse");
        assert_eq!(w.page_count, 0);
        assert_eq!(w.description, "");
    }

    #[test]
    fn page_contract_deserialize() {
        let json = r#"{
            "id": "p-1",
            "workspaceId": "w-1",
            "title": "Hello",
            "content": "{\"blocks\":[]}",
            "bookmarked": true,
            "tags": ["a", "b"],
            "deletedAt": "2026-01-01T00:00:00Z"
        }"#;
        let p: Page = serde_json::from_str(json).expect("page should parse");
        assert_eq!(p.workspace_id, "w-1");
        assert!(p.bookmarked);
        assert_eq!(p.tags.len(), 2);
        assert!(p.deleted_at.is_some());
    }

    #[test]
    fn knowledge_graph_defaults_to_empty() {
        let g: KnowledgeGraph = serde_json::from_str("{}").expect("graph should parse");
        assert!(g.nodes.is_empty());
        assert!(g.edges.is_empty());
    }
}
