use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use std::sync::Arc;
use tracing::instrument;

use super::{
    service::TodoService,
    types::{Message, TodoFilter, TodoList, TodoPublic, TodoSchema, TodoUpdate},
};
use crate::{
    security::CurrentUser,
    shared::{AppError, AppState},
};

/// HTTP handler for adding a todo to the caller's list
///
/// POST /todos
#[instrument(name = "create_todo", skip(state, current_user, request))]
pub async fn create_todo(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(request): Json<TodoSchema>,
) -> Result<(StatusCode, Json<TodoPublic>), AppError> {
    let service = TodoService::new(Arc::clone(&state.todo_repository));
    let todo = service.create_todo(&current_user, request).await?;

    Ok((StatusCode::CREATED, Json(todo)))
}

/// HTTP handler for listing the caller's todos
///
/// GET /todos?title=&description=&state=&offset=&limit=
#[instrument(name = "list_todos", skip(state, current_user))]
pub async fn list_todos(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Query(filter): Query<TodoFilter>,
) -> Result<Json<TodoList>, AppError> {
    let service = TodoService::new(Arc::clone(&state.todo_repository));
    Ok(Json(service.list_todos(&current_user, &filter).await?))
}

/// PATCH /todos/{todo_id}
#[instrument(name = "patch_todo", skip(state, current_user, update))]
pub async fn patch_todo(
    State(state): State<AppState>,
    Path(todo_id): Path<i64>,
    Extension(current_user): Extension<CurrentUser>,
    Json(update): Json<TodoUpdate>,
) -> Result<Json<TodoPublic>, AppError> {
    let service = TodoService::new(Arc::clone(&state.todo_repository));
    Ok(Json(service.patch_todo(&current_user, todo_id, update).await?))
}

/// DELETE /todos/{todo_id}
#[instrument(name = "delete_todo", skip(state, current_user))]
pub async fn delete_todo(
    State(state): State<AppState>,
    Path(todo_id): Path<i64>,
    Extension(current_user): Extension<CurrentUser>,
) -> Result<Json<Message>, AppError> {
    let service = TodoService::new(Arc::clone(&state.todo_repository));
    Ok(Json(service.delete_todo(&current_user, todo_id).await?))
}
