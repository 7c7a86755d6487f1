//! Optimistic synchronization between the in-memory list and the service.
//!
//! # Design
//! `Controller` owns a `ListState` behind a mutex and a `NoticeBoard`. Each
//! entry point runs one protocol: validate, mark the target busy (or show a
//! placeholder), await the remote call, then reconcile in a single short
//! critical section. The lock is never held across an await, so protocols on
//! different ids interleave freely and list mutations are serialized at
//! completion-handler granularity.
//!
//! Fields are only changed after the service confirms them; a failed call
//! therefore leaves the item exactly as it was. The busy marker is advisory:
//! a second operation on a busy id is not rejected.
//!
//! Remote failures are logged, turned into one notice, and returned to the
//! caller as `SyncError::Remote` (or `SyncError::Partial` for batches).

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures_util::future::join_all;

use crate::client::TodoClient;
use crate::config::SyncConfig;
use crate::error::{ApiError, SyncError};
use crate::notice::{Notice, NoticeBoard, DEFAULT_NOTICE_TTL};
use crate::service::{RemoteTodos, TodoService};
use crate::state::ListState;
use crate::transport::ReqwestTransport;
use crate::types::{Filter, ListEntry, PendingTodo, Todo, TodoId, UpdateTodo};

/// Result of `Controller::rename_todo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameOutcome {
    /// The trimmed title equals the current one; nothing was sent.
    Unchanged,
    Renamed(Todo),
    /// The trimmed title was empty and the item was deleted instead.
    Deleted,
}

pub struct Controller<S> {
    service: Option<S>,
    state: Mutex<ListState>,
    notices: NoticeBoard,
}

impl Controller<RemoteTodos<ReqwestTransport>> {
    /// Build an HTTP-backed controller. Without a configured user the
    /// controller is created in its "configure a user" state.
    pub fn from_config(config: &SyncConfig) -> Result<Self, ApiError> {
        let service = match config.user_id {
            Some(user_id) => {
                let client = TodoClient::new(&config.base_url, user_id);
                Some(RemoteTodos::new(client, ReqwestTransport::new()?))
            }
            None => None,
        };
        Ok(Self::build(service, config.notice_ttl))
    }
}

impl<S: TodoService> Controller<S> {
    pub fn new(service: S) -> Self {
        Self::build(Some(service), DEFAULT_NOTICE_TTL)
    }

    /// A controller with no user; every entry point fails with
    /// `SyncError::UserNotConfigured` and no call is ever made.
    pub fn unconfigured() -> Self {
        Self::build(None, DEFAULT_NOTICE_TTL)
    }

    pub fn with_notice_ttl(mut self, ttl: Duration) -> Self {
        self.notices = NoticeBoard::new(ttl);
        self
    }

    fn build(service: Option<S>, ttl: Duration) -> Self {
        Self {
            service,
            state: Mutex::new(ListState::new()),
            notices: NoticeBoard::new(ttl),
        }
    }

    fn service(&self) -> Result<&S, SyncError> {
        self.service.as_ref().ok_or(SyncError::UserNotConfigured)
    }

    fn lock(&self) -> MutexGuard<'_, ListState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut ListState) -> R) -> R {
        f(&mut self.lock())
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// True when no user is configured.
    pub fn needs_user(&self) -> bool {
        self.service.is_none()
    }

    pub fn todos(&self) -> Vec<Todo> {
        self.lock().todos().to_vec()
    }

    /// The list through the current filter.
    pub fn visible(&self) -> Vec<Todo> {
        self.lock().visible().cloned().collect()
    }

    /// Visible items followed by the optimistic placeholder, if any. A
    /// pending entry is always busy.
    pub fn entries(&self) -> Vec<ListEntry> {
        self.lock().entries()
    }

    pub fn pending(&self) -> Option<PendingTodo> {
        self.lock().pending().cloned()
    }

    pub fn notice(&self) -> Option<Notice> {
        self.notices.current()
    }

    pub fn processing(&self) -> Vec<TodoId> {
        self.lock().processing()
    }

    pub fn is_processing(&self, id: TodoId) -> bool {
        self.lock().is_processing(id)
    }

    pub fn all_completed(&self) -> bool {
        self.lock().all_completed()
    }

    pub fn active_count(&self) -> usize {
        self.lock().active_count()
    }

    pub fn completed_count(&self) -> usize {
        self.lock().completed_count()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().is_loading()
    }

    pub fn filter(&self) -> Filter {
        self.lock().filter()
    }

    // ------------------------------------------------------------------
    // Entry points
    // ------------------------------------------------------------------

    pub fn set_filter(&self, filter: Filter) {
        self.with_state(|state| state.set_filter(filter));
    }

    pub fn dismiss_notice(&self) {
        self.notices.dismiss();
    }

    /// Fetch the user's todos, replacing the list.
    pub async fn load(&self) -> Result<(), SyncError> {
        let service = self.service()?;
        self.notices.dismiss();
        self.with_state(|state| state.set_loading(true));

        let result = service.list().await;

        let result = self.with_state(|state| {
            state.set_loading(false);
            result.map(|todos| {
                let count = todos.len();
                state.replace_all(todos);
                count
            })
        });
        match result {
            Ok(count) => {
                tracing::debug!(count, "loaded todos");
                Ok(())
            }
            Err(e) => Err(self.fail(Notice::UnableToLoad, "load", e)),
        }
    }

    /// Create protocol. Returns the persisted item; on failure the caller
    /// keeps its input for a retry.
    pub async fn add_todo(&self, title: &str) -> Result<Todo, SyncError> {
        let service = self.service()?;
        if self.lock().pending().is_some() {
            tracing::debug!("create already in flight, ignoring submission");
            return Err(SyncError::CreateInFlight);
        }
        let title = title.trim();
        if title.is_empty() {
            self.notices.show(Notice::EmptyTitle);
            return Err(SyncError::EmptyTitle);
        }

        let pending = PendingTodo::new(service.user_id(), title);
        let temp_id = pending.temp_id;
        if !self.with_state(|state| state.begin_create(pending)) {
            return Err(SyncError::CreateInFlight);
        }
        tracing::debug!(%temp_id, "creating todo");

        let result = service.create(title).await;

        self.with_state(|state| {
            state.finish_create();
            if let Ok(todo) = &result {
                state.append(todo.clone());
            }
        });
        result.map_err(|e| self.fail(Notice::UnableToAdd, "create", e))
    }

    /// Flip the completion flag of `id`.
    pub async fn toggle_completed(&self, id: TodoId) -> Result<Todo, SyncError> {
        let service = self.service()?;
        let completed = self
            .with_state(|state| state.get(id).map(|todo| todo.completed))
            .ok_or(SyncError::UnknownTodo(id))?;

        self.update_item(service, id, UpdateTodo::completed(!completed))
            .await
            .map_err(|e| self.fail(Notice::UnableToUpdate, "update", e))
    }

    /// Rename `id`. An empty trimmed title deletes the item; an unchanged one
    /// sends nothing.
    pub async fn rename_todo(&self, id: TodoId, title: &str) -> Result<RenameOutcome, SyncError> {
        let service = self.service()?;
        let current = self
            .with_state(|state| state.get(id).map(|todo| todo.title.clone()))
            .ok_or(SyncError::UnknownTodo(id))?;

        let title = title.trim();
        if title.is_empty() {
            self.delete_todo(id).await?;
            return Ok(RenameOutcome::Deleted);
        }
        if title == current {
            return Ok(RenameOutcome::Unchanged);
        }

        self.update_item(service, id, UpdateTodo::title(title))
            .await
            .map(RenameOutcome::Renamed)
            .map_err(|e| self.fail(Notice::UnableToUpdate, "update", e))
    }

    /// Delete protocol.
    pub async fn delete_todo(&self, id: TodoId) -> Result<(), SyncError> {
        let service = self.service()?;
        if self.lock().get(id).is_none() {
            return Err(SyncError::UnknownTodo(id));
        }
        self.delete_item(service, id)
            .await
            .map_err(|e| self.fail(Notice::UnableToDelete, "delete", e))
    }

    /// Move every item towards "all completed", or to "all active" when
    /// everything is already completed. Items already at the target are
    /// skipped.
    pub async fn toggle_all(&self) -> Result<(), SyncError> {
        let service = self.service()?;
        let (target, ids) = self.with_state(|state| {
            let target = !state.all_completed();
            let ids: Vec<TodoId> = state
                .todos()
                .iter()
                .filter(|todo| todo.completed != target)
                .map(|todo| todo.id)
                .collect();
            (target, ids)
        });
        tracing::debug!(completed = target, count = ids.len(), "toggling all");

        let failed = self
            .batch(&ids, move |id| async move {
                self.update_item(service, id, UpdateTodo::completed(target))
                    .await
                    .map(|_| ())
            })
            .await;
        self.finish_batch(failed, Notice::UnableToUpdate)
    }

    /// Delete every completed item.
    pub async fn clear_completed(&self) -> Result<(), SyncError> {
        let service = self.service()?;
        let ids: Vec<TodoId> = self.with_state(|state| {
            state
                .todos()
                .iter()
                .filter(|todo| todo.completed)
                .map(|todo| todo.id)
                .collect()
        });
        tracing::debug!(count = ids.len(), "clearing completed");

        let failed = self.batch(&ids, move |id| self.delete_item(service, id)).await;
        self.finish_batch(failed, Notice::UnableToDelete)
    }

    // ------------------------------------------------------------------
    // Protocol steps
    // ------------------------------------------------------------------

    async fn update_item(&self, service: &S, id: TodoId, patch: UpdateTodo) -> Result<Todo, ApiError> {
        self.with_state(|state| state.mark_processing(id));

        let result = service.update(id, &patch).await;

        self.with_state(|state| {
            if let Ok(todo) = &result {
                if !state.splice(todo.clone()) {
                    tracing::debug!(%id, "todo left the list while updating, dropping response");
                }
            }
            state.clear_processing(id);
        });
        result
    }

    async fn delete_item(&self, service: &S, id: TodoId) -> Result<(), ApiError> {
        self.with_state(|state| state.mark_processing(id));

        let result = service.delete(id).await;

        self.with_state(|state| {
            if result.is_ok() {
                state.remove(id);
            }
            state.clear_processing(id);
        });
        result
    }

    /// Run `op` for every id concurrently, keeping all of them busy until the
    /// whole batch has settled. Returns the ids whose call failed.
    async fn batch<F, Fut>(&self, ids: &[TodoId], op: F) -> Vec<TodoId>
    where
        F: Fn(TodoId) -> Fut,
        Fut: std::future::Future<Output = Result<(), ApiError>>,
    {
        self.with_state(|state| ids.iter().for_each(|&id| state.mark_processing(id)));

        let results = join_all(ids.iter().map(|&id| op(id))).await;

        self.with_state(|state| ids.iter().for_each(|&id| state.clear_processing(id)));
        ids.iter()
            .zip(results)
            .filter_map(|(&id, result)| match result {
                Ok(()) => None,
                Err(e) => {
                    tracing::warn!(%id, error = %e, "batched call failed");
                    Some(id)
                }
            })
            .collect()
    }

    fn finish_batch(&self, failed: Vec<TodoId>, notice: Notice) -> Result<(), SyncError> {
        if failed.is_empty() {
            return Ok(());
        }
        self.notices.show(notice);
        Err(SyncError::Partial { failed })
    }

    fn fail(&self, notice: Notice, call: &str, error: ApiError) -> SyncError {
        tracing::warn!(call, error = %error, "remote call failed");
        self.notices.show(notice);
        SyncError::Remote(error)
    }
}
