use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Postgres, QueryBuilder, Row};
use std::collections::BTreeMap;
use std::str::FromStr;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::{
    models::{NewTodo, TodoModel, TodoState},
    types::TodoFilter,
};
use crate::shared::AppError;

/// Trait for todo repository operations; every lookup is scoped to an owner
#[async_trait]
pub trait TodoRepository {
    async fn create_todo(&self, todo: NewTodo) -> Result<TodoModel, AppError>;
    async fn list_todos(&self, user_id: i64, filter: &TodoFilter) -> Result<Vec<TodoModel>, AppError>;
    async fn get_todo(&self, user_id: i64, todo_id: i64) -> Result<Option<TodoModel>, AppError>;
    async fn update_todo(&self, todo: &TodoModel) -> Result<TodoModel, AppError>;
    async fn delete_todo(&self, user_id: i64, todo_id: i64) -> Result<(), AppError>;
    async fn delete_todos_for_user(&self, user_id: i64) -> Result<u64, AppError>;
}

struct TodoTable {
    next_id: i64,
    rows: BTreeMap<i64, TodoModel>,
}

/// In-memory implementation of TodoRepository for development and testing
pub struct InMemoryTodoRepository {
    table: RwLock<TodoTable>,
}

impl Default for InMemoryTodoRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryTodoRepository {
    pub fn new() -> Self {
        Self {
            table: RwLock::new(TodoTable {
                next_id: 1,
                rows: BTreeMap::new(),
            }),
        }
    }

    /// Returns the current number of todos across all users
    pub async fn todo_count(&self) -> usize {
        self.table.read().await.rows.len()
    }
}

#[async_trait]
impl TodoRepository for InMemoryTodoRepository {
    #[instrument(skip(self, todo), fields(user_id = todo.user_id))]
    async fn create_todo(&self, todo: NewTodo) -> Result<TodoModel, AppError> {
        let mut table = self.table.write().await;
        let id = table.next_id;
        table.next_id += 1;

        let model = TodoModel::from_new(id, todo);
        table.rows.insert(id, model.clone());

        debug!(todo_id = id, "Todo created in memory");
        Ok(model)
    }

    #[instrument(skip(self))]
    async fn list_todos(&self, user_id: i64, filter: &TodoFilter) -> Result<Vec<TodoModel>, AppError> {
        let table = self.table.read().await;
        let offset = filter.offset.unwrap_or(0) as usize;
        let limit = filter.limit.map_or(usize::MAX, |l| l as usize);

        let todos: Vec<TodoModel> = table
            .rows
            .values()
            .filter(|todo| todo.user_id == user_id && filter.matches(todo))
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();

        debug!(count = todos.len(), "Todos listed from memory");
        Ok(todos)
    }

    #[instrument(skip(self))]
    async fn get_todo(&self, user_id: i64, todo_id: i64) -> Result<Option<TodoModel>, AppError> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .get(&todo_id)
            .filter(|todo| todo.user_id == user_id)
            .cloned())
    }

    #[instrument(skip(self, todo), fields(todo_id = todo.id))]
    async fn update_todo(&self, todo: &TodoModel) -> Result<TodoModel, AppError> {
        let mut table = self.table.write().await;
        match table.rows.get_mut(&todo.id) {
            Some(existing) if existing.user_id == todo.user_id => {
                *existing = todo.clone();
                debug!("Todo updated in memory");
                Ok(todo.clone())
            }
            _ => {
                warn!("Todo not found for update in memory");
                Err(AppError::NotFound("Task not found".to_string()))
            }
        }
    }

    #[instrument(skip(self))]
    async fn delete_todo(&self, user_id: i64, todo_id: i64) -> Result<(), AppError> {
        let mut table = self.table.write().await;
        let owned = table
            .rows
            .get(&todo_id)
            .is_some_and(|todo| todo.user_id == user_id);

        if !owned {
            warn!("Todo not found for deletion in memory");
            return Err(AppError::NotFound("Task not found".to_string()));
        }

        table.rows.remove(&todo_id);
        debug!("Todo deleted from memory");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_todos_for_user(&self, user_id: i64) -> Result<u64, AppError> {
        let mut table = self.table.write().await;
        let before = table.rows.len();
        table.rows.retain(|_, todo| todo.user_id != user_id);

        let removed = (before - table.rows.len()) as u64;
        debug!(removed, "Todos removed for user from memory");
        Ok(removed)
    }
}

/// PostgreSQL implementation of todo repository
pub struct PostgresTodoRepository {
    pool: PgPool,
}

impl PostgresTodoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const TODO_COLUMNS: &str = "id, title, description, state, user_id, created_at, updated_at";

fn todo_from_row(row: &PgRow) -> Result<TodoModel, AppError> {
    let state: String = row.try_get("state")?;
    let state = TodoState::from_str(&state).map_err(|_| {
        warn!(state = %state, "Unknown todo state in database");
        AppError::DatabaseError(format!("unknown todo state: {}", state))
    })?;

    Ok(TodoModel {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        state,
        user_id: row.try_get("user_id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl TodoRepository for PostgresTodoRepository {
    #[instrument(skip(self, todo), fields(user_id = todo.user_id))]
    async fn create_todo(&self, todo: NewTodo) -> Result<TodoModel, AppError> {
        let row = sqlx::query(&format!(
            "INSERT INTO todos (title, description, state, user_id) VALUES ($1, $2, $3, $4) RETURNING {}",
            TODO_COLUMNS
        ))
        .bind(&todo.title)
        .bind(&todo.description)
        .bind(todo.state.to_string())
        .bind(todo.user_id)
        .fetch_one(&self.pool)
        .await?;

        let model = todo_from_row(&row)?;
        debug!(todo_id = model.id, "Todo created in database");
        Ok(model)
    }

    #[instrument(skip(self))]
    async fn list_todos(&self, user_id: i64, filter: &TodoFilter) -> Result<Vec<TodoModel>, AppError> {
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {} FROM todos WHERE user_id = ",
            TODO_COLUMNS
        ));
        query.push_bind(user_id);

        // strpos keeps user input literal, unlike LIKE patterns
        if let Some(title) = filter.title() {
            query.push(" AND strpos(title, ").push_bind(title.to_string()).push(") > 0");
        }
        if let Some(description) = filter.description() {
            query
                .push(" AND strpos(description, ")
                .push_bind(description.to_string())
                .push(") > 0");
        }
        if let Some(state) = filter.state {
            query.push(" AND state = ").push_bind(state.to_string());
        }

        query.push(" ORDER BY id");
        if let Some(limit) = filter.limit {
            query.push(" LIMIT ").push_bind(i64::from(limit));
        }
        if let Some(offset) = filter.offset {
            query.push(" OFFSET ").push_bind(i64::from(offset));
        }

        let rows = query.build().fetch_all(&self.pool).await?;
        let todos = rows.iter().map(todo_from_row).collect::<Result<Vec<_>, _>>()?;

        debug!(count = todos.len(), "Todos listed from database");
        Ok(todos)
    }

    #[instrument(skip(self))]
    async fn get_todo(&self, user_id: i64, todo_id: i64) -> Result<Option<TodoModel>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM todos WHERE id = $1 AND user_id = $2",
            TODO_COLUMNS
        ))
        .bind(todo_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(todo_from_row).transpose()
    }

    #[instrument(skip(self, todo), fields(todo_id = todo.id))]
    async fn update_todo(&self, todo: &TodoModel) -> Result<TodoModel, AppError> {
        let row = sqlx::query(&format!(
            "UPDATE todos SET title = $3, description = $4, state = $5, updated_at = $6 \
             WHERE id = $1 AND user_id = $2 RETURNING {}",
            TODO_COLUMNS
        ))
        .bind(todo.id)
        .bind(todo.user_id)
        .bind(&todo.title)
        .bind(&todo.description)
        .bind(todo.state.to_string())
        .bind(todo.updated_at)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => todo_from_row(&row),
            None => {
                warn!("Todo not found for update");
                Err(AppError::NotFound("Task not found".to_string()))
            }
        }
    }

    #[instrument(skip(self))]
    async fn delete_todo(&self, user_id: i64, todo_id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM todos WHERE id = $1 AND user_id = $2")
            .bind(todo_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            warn!("Todo not found for deletion");
            return Err(AppError::NotFound("Task not found".to_string()));
        }

        debug!("Todo deleted from database");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_todos_for_user(&self, user_id: i64) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM todos WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
