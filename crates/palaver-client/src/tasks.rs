//! Registry of pending background operations.
//!
//! Each history fetch or assistant reply registers a [`PendingOp`] keyed by
//! room and kind.  Deleting a room cancels its entries; a task that finishes
//! afterwards finds its ticket gone and drops its result.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use palaver_shared::ChatroomId;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    History,
    Reply,
}

/// Ticket for one in-flight operation.
#[derive(Debug, Clone)]
pub struct PendingOp {
    pub room: ChatroomId,
    pub kind: TaskKind,
    ticket: u64,
    token: CancellationToken,
}

impl PendingOp {
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

#[derive(Debug, Default)]
struct Inner {
    next_ticket: u64,
    pending: HashMap<(ChatroomId, TaskKind), (u64, CancellationToken)>,
}

#[derive(Debug, Clone, Default)]
pub struct TaskRegistry {
    inner: Arc<Mutex<Inner>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a new operation, unless one of the same kind is already
    /// pending for the room.
    pub fn begin(&self, room: ChatroomId, kind: TaskKind) -> Option<PendingOp> {
        let mut inner = self.lock();
        if inner.pending.contains_key(&(room, kind)) {
            return None;
        }
        inner.next_ticket += 1;
        let ticket = inner.next_ticket;
        let token = CancellationToken::new();
        inner.pending.insert((room, kind), (ticket, token.clone()));
        Some(PendingOp {
            room,
            kind,
            ticket,
            token,
        })
    }

    /// Retire an operation.  Returns whether its result should still be
    /// applied, i.e. it was neither cancelled nor superseded.
    pub fn complete(&self, op: &PendingOp) -> bool {
        let mut inner = self.lock();
        let current = matches!(
            inner.pending.get(&(op.room, op.kind)),
            Some((ticket, _)) if *ticket == op.ticket
        );
        if current {
            inner.pending.remove(&(op.room, op.kind));
        }
        current && !op.is_cancelled()
    }

    pub fn is_pending(&self, room: ChatroomId, kind: TaskKind) -> bool {
        self.lock().pending.contains_key(&(room, kind))
    }

    /// Number of pending operations of `kind` across all rooms.
    pub fn pending_of(&self, kind: TaskKind) -> usize {
        self.lock().pending.keys().filter(|(_, k)| *k == kind).count()
    }

    /// Cancel everything pending for a room.  Returns how many were cancelled.
    pub fn cancel_room(&self, room: ChatroomId) -> usize {
        let mut inner = self.lock();
        let keys: Vec<_> = inner
            .pending
            .keys()
            .filter(|(r, _)| *r == room)
            .copied()
            .collect();
        for key in &keys {
            if let Some((_, token)) = inner.pending.remove(key) {
                token.cancel();
            }
        }
        keys.len()
    }

    pub fn cancel_all(&self) {
        let mut inner = self.lock();
        for (_, (_, token)) in inner.pending.drain() {
            token.cancel();
        }
    }
}
