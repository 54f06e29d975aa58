use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Todo,
    Progress,
    Done,
}

impl TaskStatus {
    /// Parse the wire value. Case-sensitive — "Todo" is not a status.
    pub fn parse(raw: &str) -> Option<TaskStatus> {
        match raw {
            "todo" => Some(TaskStatus::Todo),
            "progress" => Some(TaskStatus::Progress),
            "done" => Some(TaskStatus::Done),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::Progress => "progress",
            TaskStatus::Done => "done",
        }
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Todo
    }
}

/// A task document as persisted and as returned to clients.
///
/// `owner_id` is always the identity resolved from the bearer token —
/// never taken from a request body or path.
///
/// No serde skip attributes here: the same struct goes through postcard,
/// which is positional — every field must be present on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ── API request types ──────────────────────────────────────────
//
// Fields arrive as raw optional strings so the validator can collect
// field errors itself instead of letting serde reject the body.

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
}

// ── Normalized payloads (validator → store) ────────────────────

#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
}

#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
}

// ── API response types ─────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total_items: usize,
    pub total_pages: usize,
    pub current_page: usize,
    pub items_per_page: usize,
}

#[derive(Debug, Serialize)]
pub struct TaskListResponse {
    pub data: Vec<Task>,
    pub meta: PageMeta,
}

// ── Mock login (no credential verification — see auth.rs) ──────

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub token: String,
    pub user: MockUser,
}

#[derive(Debug, Serialize)]
pub struct MockUser {
    pub id: String,
    pub name: String,
    pub email: String,
}

// ── Tests ──────────────────────────────────────────────────────
