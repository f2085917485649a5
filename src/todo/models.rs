use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// Lifecycle stage of a todo, stored as lowercase text
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TodoState {
    Draft,
    Todo,
    Doing,
    Done,
    Trash,
}

/// Database model for the todos table
#[derive(Debug, Clone, PartialEq)]
pub struct TodoModel {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub state: TodoState,
    pub user_id: i64, // Owner; every query is scoped by it
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields needed to insert a todo; the store assigns id and timestamps
#[derive(Debug, Clone)]
pub struct NewTodo {
    pub title: String,
    pub description: String,
    pub state: TodoState,
    pub user_id: i64,
}

impl TodoModel {
    pub fn from_new(id: i64, new_todo: NewTodo) -> Self {
        let now = Utc::now();
        Self {
            id,
            title: new_todo.title,
            description: new_todo.description,
            state: new_todo.state,
            user_id: new_todo.user_id,
            created_at: now,
            updated_at: now,
        }
    }
}
