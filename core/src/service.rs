//! The remote todo service as seen by the controller.
//!
//! `TodoService` is the four-call contract the synchronization controller is
//! written against. `RemoteTodos` implements it by pairing a `TodoClient`
//! with a `Transport`. No call is retried; each failure is returned once.

use std::future::Future;

use crate::client::TodoClient;
use crate::error::ApiError;
use crate::transport::Transport;
use crate::types::{Todo, TodoId, UpdateTodo, UserId};

/// Asynchronous CRUD contract over one user's todo collection.
pub trait TodoService {
    /// Owner of the collection every call addresses.
    fn user_id(&self) -> UserId;

    /// All todos of the configured user.
    fn list(&self) -> impl Future<Output = Result<Vec<Todo>, ApiError>> + Send;

    /// Persist a new, incomplete todo. `title` is expected to be trimmed and
    /// non-empty.
    fn create(&self, title: &str) -> impl Future<Output = Result<Todo, ApiError>> + Send;

    /// Apply a partial update and return the canonical item.
    fn update(&self, id: TodoId, patch: &UpdateTodo) -> impl Future<Output = Result<Todo, ApiError>> + Send;

    fn delete(&self, id: TodoId) -> impl Future<Output = Result<(), ApiError>> + Send;
}

/// `TodoService` over HTTP.
#[derive(Debug, Clone)]
pub struct RemoteTodos<T> {
    client: TodoClient,
    transport: T,
}

impl<T: Transport + Sync> RemoteTodos<T> {
    pub fn new(client: TodoClient, transport: T) -> Self {
        Self { client, transport }
    }
}

impl<T: Transport + Sync> TodoService for RemoteTodos<T> {
    fn user_id(&self) -> UserId {
        self.client.user_id()
    }

    async fn list(&self) -> Result<Vec<Todo>, ApiError> {
        let response = self.transport.execute(self.client.build_list_todos()).await?;
        self.client.parse_list_todos(response)
    }

    async fn create(&self, title: &str) -> Result<Todo, ApiError> {
        let request = self.client.build_create_todo(title)?;
        let response = self.transport.execute(request).await?;
        self.client.parse_create_todo(response)
    }

    async fn update(&self, id: TodoId, patch: &UpdateTodo) -> Result<Todo, ApiError> {
        let request = self.client.build_update_todo(id, patch)?;
        let response = self.transport.execute(request).await?;
        self.client.parse_update_todo(response)
    }

    async fn delete(&self, id: TodoId) -> Result<(), ApiError> {
        let response = self.transport.execute(self.client.build_delete_todo(id)).await?;
        self.client.parse_delete_todo(response)
    }
}
