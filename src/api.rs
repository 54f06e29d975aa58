//! Task handlers: validation → ownership scoping → store call → envelope.
//!
//! Validation and authentication both run before any store access. The
//! owner scope comes from the `CallerId` extension the auth middleware
//! inserted; nothing in a request body or path can widen it.

use crate::auth::{CallerId, SharedState};
use crate::error::ApiError;
use crate::models::{
    CreateTaskRequest, PageMeta, Task, TaskListResponse, UpdateTaskRequest,
};
use crate::store::{ListQuery, SortField};
use crate::validate::{validate_create, validate_task_id, validate_update};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    /// `<field>:<order>` — order is ascending only for "asc".
    pub sort_by: Option<String>,
    pub status: Option<String>,
}

fn list_query(params: &ListParams) -> ListQuery {
    let (sort, ascending) = parse_sort(params.sort_by.as_deref());
    ListQuery {
        page: params.page.unwrap_or(1).max(1),
        limit: params.limit.unwrap_or(10).max(1),
        sort,
        ascending,
        // "all" is a sentinel for "no filter"
        status: params.status.clone().filter(|s| s != "all"),
    }
}

fn parse_sort(raw: Option<&str>) -> (SortField, bool) {
    let raw = raw.unwrap_or("");
    let (field, order) = raw.split_once(':').unwrap_or((raw, ""));
    (SortField::parse(field), order == "asc")
}

// GET /
pub async fn root() -> &'static str {
    "Hello World!"
}

// POST /tasks
pub async fn create_task(
    State(state): State<SharedState>,
    Extension(caller): Extension<CallerId>,
    Json(payload): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let new = validate_create(payload).map_err(ApiError::Validation)?;
    let task = state.store.create(&caller.0, new)?;
    Ok((StatusCode::CREATED, Json(task)))
}

// GET /tasks
pub async fn list_tasks(
    State(state): State<SharedState>,
    Extension(caller): Extension<CallerId>,
    Query(params): Query<ListParams>,
) -> Result<Json<TaskListResponse>, ApiError> {
    let query = list_query(&params);
    let (data, total_items) = state.store.list(&caller.0, &query)?;

    let total_pages = if total_items == 0 {
        0
    } else {
        (total_items + query.limit - 1) / query.limit
    };

    Ok(Json(TaskListResponse {
        data,
        meta: PageMeta {
            total_items,
            total_pages,
            current_page: query.page,
            items_per_page: query.limit,
        },
    }))
}

// GET /tasks/:id
pub async fn get_task(
    State(state): State<SharedState>,
    Extension(caller): Extension<CallerId>,
    Path(id): Path<String>,
) -> Result<Json<Task>, ApiError> {
    let id = validate_task_id(&id).map_err(|e| ApiError::Validation(vec![e]))?;
    let task = state.store.get(&caller.0, id)?.ok_or(ApiError::NotFound)?;
    Ok(Json(task))
}

// PUT /tasks/:id
//
// The id error and the payload errors are collected into one 400, id first.
pub async fn update_task(
    State(state): State<SharedState>,
    Extension(caller): Extension<CallerId>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateTaskRequest>,
) -> Result<Json<Task>, ApiError> {
    match (validate_task_id(&id), validate_update(payload)) {
        (Ok(id), Ok(patch)) => {
            let task = state
                .store
                .update(&caller.0, id, patch)?
                .ok_or(ApiError::NotFound)?;
            Ok(Json(task))
        }
        (id, patch) => {
            let mut errors = Vec::new();
            if let Err(e) = id {
                errors.push(e);
            }
            if let Err(mut field_errors) = patch {
                errors.append(&mut field_errors);
            }
            Err(ApiError::Validation(errors))
        }
    }
}

// DELETE /tasks/:id
pub async fn delete_task(
    State(state): State<SharedState>,
    Extension(caller): Extension<CallerId>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = validate_task_id(&id).map_err(|e| ApiError::Validation(vec![e]))?;
    if state.store.delete(&caller.0, id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}

// ── Tests ──────────────────────────────────────────────────────
