//! Domain types for the workspace documents and the derived views.
//!
//! The on-disk documents and the wire format are camelCase JSON, so every
//! struct here carries `rename_all = "camelCase"`. Optional fields default
//! at the deserialization boundary, so downstream code never re-checks
//! for missing JSON keys.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ── Stored documents ──────────────────────────────────────────────────

/// A project entry from `state/projects.json`. Read-only for this
/// service; projects are created and retired externally.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
}

fn default_status() -> String {
    "active".to_string()
}

/// The board document at `projects/<id>/board.json`. Replaced as a whole
/// on every mutation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    #[serde(default)]
    pub project_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

/// A task on a board. `state` is a free-form string: the workflow that
/// drives transitions lives outside this service and evolves on its own
/// schedule, so no transition legality is enforced here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<Comment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_notes: Option<ReviewNotes>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum AuthorType {
    Human,
    Agent,
}

impl Default for AuthorType {
    fn default() -> Self {
        Self::Human
    }
}

impl AuthorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Human => "human",
            Self::Agent => "agent",
        }
    }
}

impl FromStr for AuthorType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "human" => Ok(Self::Human),
            "agent" => Ok(Self::Agent),
            _ => Err(format!("Invalid author type: {}", s)),
        }
    }
}

/// Append-only task comment. Never edited or deleted once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub author_type: AuthorType,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub timestamp: String,
}

/// Single-slot review notes on a task; overwritten, not versioned.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewNotes {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub updated_by: String,
    #[serde(default)]
    pub updated_at: String,
}

// ── Derived views (never persisted) ───────────────────────────────────

/// One commit from the project's git history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GitCommit {
    pub hash: String,
    pub author: String,
    pub timestamp: String,
    pub message: String,
    pub files_changed: usize,
}

/// Project summary for the dashboard landing view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectCard {
    pub id: String,
    pub name: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    pub task_count: usize,
    pub in_progress_count: usize,
    pub review_count: usize,
    pub last_updated: Option<String>,
}

/// One entry in the cross-project review queue.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewQueueItem {
    pub project_id: String,
    pub project_name: String,
    pub task: Task,
}

/// Parsed standup sections. Re-derived from the markdown on every read.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StandupSummary {
    pub completed: Vec<String>,
    pub in_progress: Vec<String>,
    pub needs_attention: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_defaults_apply_once_at_deserialization() {
        let task: Task = serde_json::from_str(r#"{"id": "t1"}"#).unwrap();
        assert_eq!(task.id, "t1");
        assert_eq!(task.title, "");
        assert_eq!(task.state, "");
        assert!(task.priority.is_none());
        assert!(task.labels.is_empty());
        assert!(task.comments.is_empty());
        assert!(task.review_notes.is_none());
    }

    #[test]
    fn board_round_trips_camel_case() {
        let board = Board {
            project_id: "proj-1".to_string(),
            last_updated: Some("2026-08-01T12:00:00Z".to_string()),
            tasks: vec![Task {
                id: "t1".to_string(),
                review_type: Some("sam-required".to_string()),
                ..Default::default()
            }],
        };
        let json = serde_json::to_string(&board).unwrap();
        assert!(json.contains("\"projectId\""));
        assert!(json.contains("\"lastUpdated\""));
        assert!(json.contains("\"reviewType\""));

        let back: Board = serde_json::from_str(&json).unwrap();
        assert_eq!(back.project_id, "proj-1");
        assert_eq!(back.tasks[0].review_type.as_deref(), Some("sam-required"));
    }

    #[test]
    fn project_status_defaults_to_active() {
        let project: Project =
            serde_json::from_str(r#"{"id": "proj-1", "name": "Demo"}"#).unwrap();
        assert_eq!(project.status, "active");
    }

    #[test]
    fn author_type_serializes_lowercase() {
        let comment = Comment {
            id: "c1".to_string(),
            author: "sam".to_string(),
            author_type: AuthorType::Agent,
            content: "looks good".to_string(),
            timestamp: "2026-08-01T12:00:00Z".to_string(),
        };
        let json = serde_json::to_string(&comment).unwrap();
        assert!(json.contains("\"authorType\":\"agent\""));

        let back: Comment = serde_json::from_str(&json).unwrap();
        assert_eq!(back.author_type, AuthorType::Agent);
    }

    #[test]
    fn author_type_from_str() {
        assert_eq!("human".parse::<AuthorType>().unwrap(), AuthorType::Human);
        assert_eq!("agent".parse::<AuthorType>().unwrap(), AuthorType::Agent);
        assert!("robot".parse::<AuthorType>().is_err());
    }
}
