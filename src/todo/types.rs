use serde::{Deserialize, Serialize};

use super::models::{TodoModel, TodoState};

/// Request payload for creating a todo
#[derive(Debug, Deserialize)]
pub struct TodoSchema {
    pub title: String,
    pub description: String,
    pub state: TodoState,
}

/// Partial update; absent fields are left untouched
#[derive(Debug, Default, Deserialize)]
pub struct TodoUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub state: Option<TodoState>,
}

impl TodoUpdate {
    pub fn apply_to(self, todo: &mut TodoModel) {
        if let Some(title) = self.title {
            todo.title = title;
        }
        if let Some(description) = self.description {
            todo.description = description;
        }
        if let Some(state) = self.state {
            todo.state = state;
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct TodoPublic {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub state: TodoState,
}

impl From<TodoModel> for TodoPublic {
    fn from(todo: TodoModel) -> Self {
        Self {
            id: todo.id,
            title: todo.title,
            description: todo.description,
            state: todo.state,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct TodoList {
    pub todos: Vec<TodoPublic>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub message: String,
}

/// Query parameters for GET /todos. Empty strings do not filter.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct TodoFilter {
    pub title: Option<String>,
    pub description: Option<String>,
    pub state: Option<TodoState>,
    pub offset: Option<u32>,
    pub limit: Option<u32>,
}

impl TodoFilter {
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref().filter(|t| !t.is_empty())
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref().filter(|d| !d.is_empty())
    }

    /// True when `todo` passes every text and state filter
    pub fn matches(&self, todo: &TodoModel) -> bool {
        self.title().map_or(true, |t| todo.title.contains(t))
            && self.description().map_or(true, |d| todo.description.contains(d))
            && self.state.map_or(true, |s| todo.state == s)
    }
}
