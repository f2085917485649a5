use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    models::NewTodo,
    repository::TodoRepository,
    types::{Message, TodoFilter, TodoList, TodoPublic, TodoSchema, TodoUpdate},
};
use crate::{security::CurrentUser, shared::AppError};

/// Service for a user's own todo list
pub struct TodoService {
    repository: Arc<dyn TodoRepository + Send + Sync>,
}

impl TodoService {
    pub fn new(repository: Arc<dyn TodoRepository + Send + Sync>) -> Self {
        Self { repository }
    }

    #[instrument(skip(self, current_user, request), fields(user_id = current_user.id()))]
    pub async fn create_todo(
        &self,
        current_user: &CurrentUser,
        request: TodoSchema,
    ) -> Result<TodoPublic, AppError> {
        let todo = self
            .repository
            .create_todo(NewTodo {
                title: request.title,
                description: request.description,
                state: request.state,
                user_id: current_user.id(),
            })
            .await?;

        info!(todo_id = todo.id, "Todo created");
        Ok(todo.into())
    }

    #[instrument(skip(self, current_user), fields(user_id = current_user.id()))]
    pub async fn list_todos(
        &self,
        current_user: &CurrentUser,
        filter: &TodoFilter,
    ) -> Result<TodoList, AppError> {
        let todos = self.repository.list_todos(current_user.id(), filter).await?;
        Ok(TodoList {
            todos: todos.into_iter().map(TodoPublic::from).collect(),
        })
    }

    #[instrument(skip(self, current_user, update), fields(user_id = current_user.id()))]
    pub async fn patch_todo(
        &self,
        current_user: &CurrentUser,
        todo_id: i64,
        update: TodoUpdate,
    ) -> Result<TodoPublic, AppError> {
        let mut todo = self
            .repository
            .get_todo(current_user.id(), todo_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Task not found".to_string()))?;

        update.apply_to(&mut todo);
        todo.updated_at = Utc::now();

        let updated = self.repository.update_todo(&todo).await?;
        info!("Todo patched");
        Ok(updated.into())
    }

    #[instrument(skip(self, current_user), fields(user_id = current_user.id()))]
    pub async fn delete_todo(
        &self,
        current_user: &CurrentUser,
        todo_id: i64,
    ) -> Result<Message, AppError> {
        self.repository
            .delete_todo(current_user.id(), todo_id)
            .await?;

        info!("Todo deleted");
        Ok(Message {
            message: "Task has been deleted successfully".to_string(),
        })
    }
}
