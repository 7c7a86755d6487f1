//! The controller's explicit state container.
//!
//! # Design
//! `ListState` holds the authoritative list plus everything derived for
//! presentation: the optimistic placeholder, the busy ids, the filter and the
//! initial-load flag. Mutators are called from protocol completion handlers;
//! queries are pure functions of the current contents.

use std::collections::HashMap;

use crate::types::{Filter, ListEntry, PendingTodo, Todo, TodoId};

#[derive(Debug, Default)]
pub struct ListState {
    todos: Vec<Todo>,
    pending: Option<PendingTodo>,
    /// Busy ids with the number of outstanding operations on each.
    processing: HashMap<TodoId, usize>,
    filter: Filter,
    loading: bool,
}

impl ListState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    pub fn get(&self, id: TodoId) -> Option<&Todo> {
        self.todos.iter().find(|todo| todo.id == id)
    }

    pub fn replace_all(&mut self, todos: Vec<Todo>) {
        self.todos.clear();
        for todo in todos {
            self.append(todo);
        }
    }

    /// Append a confirmed item. An id already present is replaced in place
    /// instead, keeping ids unique.
    pub fn append(&mut self, todo: Todo) {
        if !self.splice(todo.clone()) {
            self.todos.push(todo);
        }
    }

    /// Replace the item with the same id, keeping its position. Returns
    /// `false` when the id is no longer in the list.
    pub fn splice(&mut self, todo: Todo) -> bool {
        match self.todos.iter_mut().find(|existing| existing.id == todo.id) {
            Some(existing) => {
                *existing = todo;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: TodoId) -> Option<Todo> {
        let index = self.todos.iter().position(|todo| todo.id == id)?;
        Some(self.todos.remove(index))
    }

    /// Show `pending` as the outstanding create. Returns `false` and leaves
    /// the state alone if another create is still outstanding.
    pub fn begin_create(&mut self, pending: PendingTodo) -> bool {
        if self.pending.is_some() {
            return false;
        }
        self.pending = Some(pending);
        true
    }

    pub fn finish_create(&mut self) -> Option<PendingTodo> {
        self.pending.take()
    }

    pub fn pending(&self) -> Option<&PendingTodo> {
        self.pending.as_ref()
    }

    pub fn mark_processing(&mut self, id: TodoId) {
        *self.processing.entry(id).or_default() += 1;
    }

    pub fn clear_processing(&mut self, id: TodoId) {
        if let Some(count) = self.processing.get_mut(&id) {
            *count -= 1;
            if *count == 0 {
                self.processing.remove(&id);
            }
        }
    }

    pub fn is_processing(&self, id: TodoId) -> bool {
        self.processing.contains_key(&id)
    }

    /// Busy ids in ascending order.
    pub fn processing(&self) -> Vec<TodoId> {
        let mut ids: Vec<TodoId> = self.processing.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub fn visible(&self) -> impl Iterator<Item = &Todo> {
        let filter = self.filter;
        self.todos.iter().filter(move |todo| filter.matches(todo))
    }

    /// Visible items followed by the optimistic placeholder, if any.
    pub fn entries(&self) -> Vec<ListEntry> {
        self.visible()
            .cloned()
            .map(ListEntry::Persisted)
            .chain(self.pending.clone().map(ListEntry::Pending))
            .collect()
    }

    /// True iff every item is completed; vacuously true when empty.
    pub fn all_completed(&self) -> bool {
        self.todos.iter().all(|todo| todo.completed)
    }

    pub fn active_count(&self) -> usize {
        self.todos.iter().filter(|todo| !todo.completed).count()
    }

    pub fn completed_count(&self) -> usize {
        self.todos.len() - self.active_count()
    }
}
