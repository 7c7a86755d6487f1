//! Transient, self-clearing user notifications.
//!
//! At most one notice is current. Showing a new one replaces the old one and
//! starts a fresh display window. Every window carries the generation it was
//! opened for and only clears the slot if that generation is still current,
//! so an older timer never erases a newer notice.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

pub const DEFAULT_NOTICE_TTL: Duration = Duration::from_secs(3);

/// User-facing notification kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Notice {
    UnableToLoad,
    EmptyTitle,
    UnableToAdd,
    UnableToDelete,
    UnableToUpdate,
}

impl Notice {
    pub fn message(self) -> &'static str {
        match self {
            Notice::UnableToLoad => "Unable to load todos",
            Notice::EmptyTitle => "Title should not be empty",
            Notice::UnableToAdd => "Unable to add a todo",
            Notice::UnableToDelete => "Unable to delete a todo",
            Notice::UnableToUpdate => "Unable to update a todo",
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

#[derive(Debug, Default)]
struct Slot {
    current: Option<Notice>,
    generation: u64,
}

/// Shared notification slot. Clones observe the same slot.
#[derive(Debug, Clone)]
pub struct NoticeBoard {
    slot: Arc<Mutex<Slot>>,
    ttl: Duration,
}

impl Default for NoticeBoard {
    fn default() -> Self {
        Self::new(DEFAULT_NOTICE_TTL)
    }
}

impl NoticeBoard {
    pub fn new(ttl: Duration) -> Self {
        Self {
            slot: Arc::default(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn current(&self) -> Option<Notice> {
        lock(&self.slot).current
    }

    /// Replace the current notice and schedule it to clear after `ttl`.
    ///
    /// Outside a tokio runtime the notice stays until dismissed or replaced.
    pub fn show(&self, notice: Notice) {
        let generation = {
            let mut slot = lock(&self.slot);
            slot.generation += 1;
            slot.current = Some(notice);
            slot.generation
        };
        tracing::debug!(%notice, generation, "showing notice");

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let slot = Arc::clone(&self.slot);
                let ttl = self.ttl;
                handle.spawn(async move {
                    tokio::time::sleep(ttl).await;
                    clear_if_current(&slot, generation);
                });
            }
            Err(_) => tracing::debug!("no runtime, notice will not self-clear"),
        }
    }

    pub fn dismiss(&self) {
        let mut slot = lock(&self.slot);
        slot.current = None;
        slot.generation += 1;
    }
}

fn clear_if_current(slot: &Mutex<Slot>, generation: u64) {
    let mut slot = lock(slot);
    if slot.generation == generation {
        slot.current = None;
    }
}

fn lock(slot: &Mutex<Slot>) -> MutexGuard<'_, Slot> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}
