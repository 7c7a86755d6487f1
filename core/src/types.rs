//! Domain types shared by the client and the controller.
//!
//! # Design
//! The wire DTOs mirror the mock-server's schema but are defined
//! independently; integration tests catch drift. Ids are newtypes over the
//! service's integer ids so a todo id can never be passed where a user id is
//! expected. An item the service has not confirmed yet is a `PendingTodo`
//! with a client-side UUID, never a `Todo` with a sentinel id.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Server-assigned identifier of a persisted todo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(pub u64);

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Owner of a todo collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A single todo item as returned by the service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: TodoId,
    pub user_id: UserId,
    pub title: String,
    pub completed: bool,
}

/// Request payload for creating a new todo.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodo {
    pub user_id: UserId,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

/// Partial update for an existing todo. Only the fields present in the JSON
/// are applied; omitted fields remain unchanged on the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTodo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl UpdateTodo {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            completed: None,
        }
    }

    pub fn completed(completed: bool) -> Self {
        Self {
            title: None,
            completed: Some(completed),
        }
    }
}

/// A todo shown optimistically while its create call is outstanding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTodo {
    pub temp_id: Uuid,
    pub user_id: UserId,
    pub title: String,
}

impl PendingTodo {
    pub fn new(user_id: UserId, title: impl Into<String>) -> Self {
        Self {
            temp_id: Uuid::new_v4(),
            user_id,
            title: title.into(),
        }
    }
}

/// One row of the presented list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListEntry {
    Persisted(Todo),
    Pending(PendingTodo),
}

impl ListEntry {
    pub fn title(&self) -> &str {
        match self {
            ListEntry::Persisted(todo) => &todo.title,
            ListEntry::Pending(pending) => &pending.title,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, ListEntry::Pending(_))
    }
}

/// View-level selection over the list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Filter {
    #[default]
    All,
    Active,
    Completed,
}

impl Filter {
    pub fn matches(self, todo: &Todo) -> bool {
        match self {
            Filter::All => true,
            Filter::Active => !todo.completed,
            Filter::Completed => todo.completed,
        }
    }
}
