//! Request validation.
//!
//! Errors are collected, not short-circuited: a payload with a missing
//! title and a bad status reports both, in order of field declaration.
//! Text fields are trimmed and HTML-escaped before they reach the store.

use crate::models::{CreateTaskRequest, NewTask, TaskPatch, TaskStatus, UpdateTaskRequest};
use serde::Serialize;
use uuid::Uuid;

pub const TITLE_REQUIRED: &str = "Title is required";
pub const STATUS_INVALID: &str = "Status must be todo, progress or done";
pub const ID_INVALID: &str = "Invalid task ID";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

impl FieldError {
    fn new(field: &'static str, message: &'static str) -> Self {
        FieldError { field, message }
    }
}

/// Validate a creation payload. Status defaults to `todo` when absent.
pub fn validate_create(req: CreateTaskRequest) -> Result<NewTask, Vec<FieldError>> {
    let mut errors = Vec::new();

    let title = sanitize(req.title.as_deref().unwrap_or(""));
    if title.is_empty() {
        errors.push(FieldError::new("title", TITLE_REQUIRED));
    }

    let description = req.description.as_deref().map(sanitize);

    let status = match req.status.as_deref() {
        None => TaskStatus::default(),
        Some(raw) => TaskStatus::parse(raw).unwrap_or_else(|| {
            errors.push(FieldError::new("status", STATUS_INVALID));
            TaskStatus::default()
        }),
    };

    if errors.is_empty() {
        Ok(NewTask { title, description, status })
    } else {
        Err(errors)
    }
}

/// Validate an update payload. Every field is optional, but a title that
/// is present must still be non-empty after trimming.
pub fn validate_update(req: UpdateTaskRequest) -> Result<TaskPatch, Vec<FieldError>> {
    let mut errors = Vec::new();

    let title = match req.title.as_deref() {
        None => None,
        Some(raw) => {
            let title = sanitize(raw);
            if title.is_empty() {
                errors.push(FieldError::new("title", TITLE_REQUIRED));
                None
            } else {
                Some(title)
            }
        }
    };

    let description = req.description.as_deref().map(sanitize);

    let status = match req.status.as_deref() {
        None => None,
        Some(raw) => match TaskStatus::parse(raw) {
            Some(status) => Some(status),
            None => {
                errors.push(FieldError::new("status", STATUS_INVALID));
                None
            }
        },
    };

    if errors.is_empty() {
        Ok(TaskPatch { title, description, status })
    } else {
        Err(errors)
    }
}

/// Validate a path identifier against the store's native id format.
pub fn validate_task_id(raw: &str) -> Result<Uuid, FieldError> {
    Uuid::parse_str(raw).map_err(|_| FieldError::new("id", ID_INVALID))
}

fn sanitize(raw: &str) -> String {
    escape_html(raw.trim())
}

/// Escape the characters express-style sanitizers escape: & < > " ' ` /
fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '`' => out.push_str("&#96;"),
            '/' => out.push_str("&#x2F;"),
            _ => out.push(c),
        }
    }
    out
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn create_req(title: Option<&str>, description: Option<&str>, status: Option<&str>) -> CreateTaskRequest {
        CreateTaskRequest {
            title: title.map(String::from),
            description: description.map(String::from),
            status: status.map(String::from),
        }
    }

    #[test]
    fn create_normalizes_and_defaults_status() {
        let new = validate_create(create_req(Some("  Fix the thing  "), Some(" details "), None)).unwrap();
        assert_eq!(new.title, "Fix the thing");
        assert_eq!(new.description.as_deref(), Some("details"));
        assert_eq!(new.status, TaskStatus::Todo);
    }

    #[test]
    fn create_escapes_html() {
        let new = validate_create(create_req(Some("<b>bold</b> & 'quoted'"), None, Some("done"))).unwrap();
        assert_eq!(new.title, "&lt;b&gt;bold&lt;&#x2F;b&gt; &amp; &#x27;quoted&#x27;");
        assert_eq!(new.status, TaskStatus::Done);
    }

    #[test]
    fn create_requires_title() {
        let errors = validate_create(create_req(Some("   "), None, None)).unwrap_err();
        assert_eq!(errors, vec![FieldError::new("title", TITLE_REQUIRED)]);

        // absent title is the same failure as an empty one
        let errors = validate_create(create_req(None, None, None)).unwrap_err();
        assert_eq!(errors[0].message, TITLE_REQUIRED);
    }

    #[test]
    fn create_rejects_unknown_status() {
        let errors = validate_create(create_req(Some("ok"), None, Some("blocked"))).unwrap_err();
        assert_eq!(errors, vec![FieldError::new("status", STATUS_INVALID)]);
    }

    #[test]
    fn create_collects_all_errors_in_field_order() {
        let errors = validate_create(create_req(Some(""), None, Some("nope"))).unwrap_err();
        assert_eq!(
            errors,
            vec![
                FieldError::new("title", TITLE_REQUIRED),
                FieldError::new("status", STATUS_INVALID),
            ]
        );
    }

    #[test]
    fn update_with_no_fields_is_an_empty_patch() {
        let patch = validate_update(UpdateTaskRequest {
            title: None,
            description: None,
            status: None,
        })
        .unwrap();
        assert!(patch.title.is_none());
        assert!(patch.description.is_none());
        assert!(patch.status.is_none());
    }

    #[test]
    fn update_rejects_present_but_empty_title() {
        let errors = validate_update(UpdateTaskRequest {
            title: Some("  ".into()),
            description: None,
            status: None,
        })
        .unwrap_err();
        assert_eq!(errors, vec![FieldError::new("title", TITLE_REQUIRED)]);
    }

    #[test]
    fn update_normalizes_present_fields() {
        let patch = validate_update(UpdateTaskRequest {
            title: Some(" New title ".into()),
            description: Some("a/b".into()),
            status: Some("progress".into()),
        })
        .unwrap();
        assert_eq!(patch.title.as_deref(), Some("New title"));
        assert_eq!(patch.description.as_deref(), Some("a&#x2F;b"));
        assert_eq!(patch.status, Some(TaskStatus::Progress));
    }

    #[test]
    fn task_id_must_be_store_native_format() {
        assert!(validate_task_id("8c4df6b1-9d0a-4f6e-b0a3-1f2e3d4c5b6a").is_ok());

        let err = validate_task_id("123").unwrap_err();
        assert_eq!(err.field, "id");
        assert_eq!(err.message, ID_INVALID);
    }
}
