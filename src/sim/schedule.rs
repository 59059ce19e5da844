//! Virtual-time delayed tasks
//!
//! Tasks are plain data fired by advancing the scheduler's clock, so tests
//! can step time deterministically.

use std::collections::BTreeMap;

/// Cancellation token for a scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    now_ms: u64,
    next_id: u64,
    /// Keyed by (due time, id): fires in due order, ties in schedule order
    pending: BTreeMap<(u64, u64), T>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            now_ms: 0,
            next_id: 0,
            pending: BTreeMap::new(),
        }
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn now(&self) -> u64 {
        self.now_ms
    }

    /// Run `task` once, `delay_ms` after the current time
    pub fn schedule(&mut self, delay_ms: u64, task: T) -> TaskId {
        let id = self.next_id;
        self.next_id += 1;
        self.pending.insert((self.now_ms.saturating_add(delay_ms), id), task);
        TaskId(id)
    }

    /// Drop a pending task; false if it already fired or was cancelled
    pub fn cancel(&mut self, task: TaskId) -> bool {
        let key = self.pending.keys().find(|(_, id)| *id == task.0).copied();
        key.is_some_and(|key| self.pending.remove(&key).is_some())
    }

    /// Drop every pending task
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Move the clock forward and return every task now due, in order
    ///
    /// The clock never runs backwards.
    pub fn advance_to(&mut self, now_ms: u64) -> Vec<T> {
        self.now_ms = self.now_ms.max(now_ms);

        let mut due = Vec::new();
        while let Some(entry) = self.pending.first_entry() {
            if entry.key().0 > self.now_ms {
                break;
            }
            due.push(entry.remove());
        }
        due
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
