//! Backward pagination ("load older messages").
//!
//! Per room the engine is either idle or fetching; a room whose cursor has
//! passed the page ceiling is exhausted.  At most one fetch is in flight per
//! room, so rapid scroll-to-top signals cannot produce duplicate or
//! out-of-order prepends.

use std::sync::Arc;

use chrono::Utc;
use palaver_shared::{ChatError, ChatroomId};
use tracing::{debug, info, warn};

use crate::events::{EventBus, StoreEvent};
use crate::history::{HistoryRequest, HistorySource};
use crate::state::{lock, SharedState};
use crate::tasks::{PendingOp, TaskKind, TaskRegistry};

/// What a load trigger did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A fetch for this page is now in flight.
    Started { page: u32 },
    AlreadyFetching,
    Exhausted,
    UnknownRoom,
}

#[derive(Clone)]
pub struct PaginationEngine {
    state: SharedState,
    events: EventBus,
    tasks: TaskRegistry,
    source: Arc<dyn HistorySource>,
    page_size: usize,
    page_ceiling: u32,
}

impl PaginationEngine {
    pub fn new(
        state: SharedState,
        events: EventBus,
        tasks: TaskRegistry,
        source: Arc<dyn HistorySource>,
        page_size: usize,
        page_ceiling: u32,
    ) -> Self {
        Self {
            state,
            events,
            tasks,
            source,
            page_size,
            page_ceiling,
        }
    }

    pub fn is_fetching(&self, room: ChatroomId) -> bool {
        self.tasks.is_pending(room, TaskKind::History)
    }

    /// The consumer scrolled to the head of the log.  Starts a background
    /// fetch if the room is idle and has more history.
    pub fn load_older(&self, room: ChatroomId) -> LoadOutcome {
        let (op, request) = match self.begin(room) {
            Ok(started) => started,
            Err(outcome) => return outcome,
        };
        let page = request.page;

        let engine = self.clone();
        tokio::spawn(async move {
            // Failures are reported through the event bus.
            let _ = engine.run(op, request).await;
        });

        LoadOutcome::Started { page }
    }

    /// Like [`load_older`](Self::load_older) but waits for the batch and
    /// returns the fetch error, if any, to the caller.
    pub async fn load_older_now(&self, room: ChatroomId) -> Result<LoadOutcome, ChatError> {
        let (op, request) = match self.begin(room) {
            Ok(started) => started,
            Err(outcome) => return Ok(outcome),
        };
        let page = request.page;
        self.run(op, request).await?;
        Ok(LoadOutcome::Started { page })
    }

    /// Idle → Fetching, or the reason it cannot happen.
    ///
    /// The ticket is taken under the state lock, the same lock the
    /// completion holds while it prepends and retires it, so the cursor read
    /// here always reflects the last applied batch.
    fn begin(&self, room: ChatroomId) -> Result<(PendingOp, HistoryRequest), LoadOutcome> {
        let state = lock(&self.state);
        let Some(page_state) = state.page_state(room) else {
            return Err(LoadOutcome::UnknownRoom);
        };
        if !page_state.has_more {
            return Err(LoadOutcome::Exhausted);
        }

        let op = self
            .tasks
            .begin(room, TaskKind::History)
            .ok_or(LoadOutcome::AlreadyFetching)?;

        let request = HistoryRequest {
            chatroom_id: room,
            page: page_state.page,
            page_size: self.page_size,
            before: state.oldest_timestamp(room).unwrap_or_else(Utc::now),
        };
        drop(state);

        debug!(room = %room, page = request.page, "fetching older messages");
        Ok((op, request))
    }

    /// Fetching → Idle.  The batch is applied and the ticket retired in one
    /// locked section; on error only the ticket is retired.
    async fn run(&self, op: PendingOp, request: HistoryRequest) -> Result<usize, ChatError> {
        let room = op.room;
        let fetched = tokio::select! {
            _ = op.token().cancelled() => {
                debug!(room = %room, "history fetch cancelled");
                return Ok(0);
            }
            result = self.source.fetch(request) => result,
        };

        let batch = match fetched {
            Ok(batch) => batch,
            Err(e) => {
                let still_valid = {
                    let _state = lock(&self.state);
                    self.tasks.complete(&op)
                };
                warn!(room = %room, error = %e, "history fetch failed");
                if still_valid {
                    self.events.emit(StoreEvent::HistoryLoadFailed {
                        chatroom_id: room,
                        error: e.to_string(),
                    });
                }
                return Err(e);
            }
        };

        let count = batch.len();
        let page_state = {
            let mut state = lock(&self.state);
            if !self.tasks.complete(&op) {
                debug!(room = %room, "dropping history for cancelled fetch");
                return Ok(0);
            }
            if !state.prepend_messages(room, batch) {
                debug!(room = %room, "chatroom gone before history arrived");
                return Ok(0);
            }
            state.advance_page(room, self.page_ceiling)
        };

        if let Some(page_state) = page_state {
            info!(
                room = %room,
                count,
                page = page_state.page,
                has_more = page_state.has_more,
                "older messages loaded"
            );
            self.events.emit(StoreEvent::HistoryLoaded {
                chatroom_id: room,
                count,
                page: page_state.page,
                has_more: page_state.has_more,
            });
        }
        Ok(count)
    }
}
