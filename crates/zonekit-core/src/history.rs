//! Linear undo/redo over full-state snapshots.

use std::time::Duration;

// Use web-time on WASM, std::time otherwise
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;
#[cfg(target_arch = "wasm32")]
use web_time::Instant;

/// Default maximum number of snapshots to keep.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Short cooldown that swallows repeated undo/redo from one held key.
///
/// The lock is a deadline rather than a timer, so nothing is left scheduled
/// once the owner is dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActionLock {
    duration: Duration,
    until: Option<Instant>,
}

impl ActionLock {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            until: None,
        }
    }

    pub fn is_engaged_at(&self, now: Instant) -> bool {
        self.until.is_some_and(|until| now < until)
    }

    pub fn engage_at(&mut self, now: Instant) {
        if !self.duration.is_zero() {
            self.until = Some(now + self.duration);
        }
    }

    pub fn release(&mut self) {
        self.until = None;
    }
}

/// Snapshot history with a movable cursor.
///
/// `entries[index]` always mirrors the owner's current committed state.
/// Saving after an undo discards the redo branch.
#[derive(Debug, Clone)]
pub struct History<T> {
    entries: Vec<T>,
    index: usize,
    limit: usize,
    lock: ActionLock,
}

impl<T: Clone> History<T> {
    /// Start a history whose first entry is `initial`.
    pub fn new(initial: T, limit: usize, lock: Duration) -> Self {
        Self {
            entries: vec![initial],
            index: 0,
            limit: limit.max(1),
            lock: ActionLock::new(lock),
        }
    }

    /// Record a completed action.
    pub fn save(&mut self, state: T) {
        self.entries.truncate(self.index + 1);
        self.entries.push(state);
        self.index += 1;
        while self.entries.len() > self.limit {
            self.entries.remove(0);
            self.index -= 1;
        }
    }

    /// Step back and return the state to restore.
    pub fn undo(&mut self) -> Option<&T> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        self.entries.get(self.index)
    }

    /// Step forward and return the state to restore.
    pub fn redo(&mut self) -> Option<&T> {
        if self.index + 1 >= self.entries.len() {
            return None;
        }
        self.index += 1;
        self.entries.get(self.index)
    }

    /// Undo unless the action lock is engaged; engages the lock on success.
    pub fn undo_throttled(&mut self, now: Instant) -> Option<&T> {
        if self.lock.is_engaged_at(now) || !self.can_undo() {
            return None;
        }
        self.lock.engage_at(now);
        self.undo()
    }

    /// Redo unless the action lock is engaged; engages the lock on success.
    pub fn redo_throttled(&mut self, now: Instant) -> Option<&T> {
        if self.lock.is_engaged_at(now) || !self.can_redo() {
            return None;
        }
        self.lock.engage_at(now);
        self.redo()
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    /// Number of retained snapshots.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Drop every snapshot and restart from `initial`.
    pub fn reset(&mut self, initial: T) {
        self.entries.clear();
        self.entries.push(initial);
        self.index = 0;
        self.lock.release();
    }
}
