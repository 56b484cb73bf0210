//! Simulated assistant replies behind a minimum-interval gate.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use palaver_shared::constants::AI_RESPONSES;
use palaver_shared::{ChatError, ChatroomId, MessageKind};
use palaver_store::Message;
use rand::seq::SliceRandom;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::events::{EventBus, StoreEvent};
use crate::state::{lock, SharedState};
use crate::tasks::{PendingOp, TaskKind, TaskRegistry};
use crate::throttle::ReplyThrottle;

#[derive(Clone)]
pub struct ThrottledResponder {
    state: SharedState,
    events: EventBus,
    tasks: TaskRegistry,
    throttle: Arc<Mutex<ReplyThrottle>>,
    typing_delay: Duration,
}

impl ThrottledResponder {
    pub fn new(
        state: SharedState,
        events: EventBus,
        tasks: TaskRegistry,
        throttle: ReplyThrottle,
        typing_delay: Duration,
    ) -> Self {
        Self {
            state,
            events,
            tasks,
            throttle: Arc::new(Mutex::new(throttle)),
            typing_delay,
        }
    }

    fn throttle(&self) -> MutexGuard<'_, ReplyThrottle> {
        self.throttle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Ask the assistant to answer in `room`.
    ///
    /// Rejected triggers change nothing.  An accepted one sets the typing
    /// indicator right away and appends the reply after the typing delay.
    pub fn trigger(&self, room: ChatroomId) -> Result<(), ChatError> {
        let now = Instant::now();
        // Typing is raised in the same section that registers the cycle, so a
        // finishing cycle always sees this one as pending.
        let op = {
            let mut state = lock(&self.state);
            if !state.has_room(room) {
                return Err(ChatError::validation("Unknown chatroom"));
            }
            let mut throttle = self.throttle();
            if let Err(retry_after) = throttle.check(room, now) {
                return Err(self.reject(room, retry_after));
            }
            // One typing cycle at a time, whatever the scope.
            if self.tasks.pending_of(TaskKind::Reply) > 0 {
                return Err(self.reject(room, self.typing_delay));
            }
            let Some(op) = self.tasks.begin(room, TaskKind::Reply) else {
                return Err(self.reject(room, self.typing_delay));
            };
            throttle.accept(room, now);
            state.set_typing(true);
            op
        };

        self.events.emit(StoreEvent::TypingChanged {
            chatroom_id: room,
            typing: true,
        });
        debug!(room = %room, delay_ms = self.typing_delay.as_millis() as u64, "reply scheduled");

        let responder = self.clone();
        tokio::spawn(async move { responder.run(op).await });
        Ok(())
    }

    fn reject(&self, room: ChatroomId, retry_after: Duration) -> ChatError {
        warn!(
            room = %room,
            retry_after_ms = retry_after.as_millis() as u64,
            "reply trigger rate limited"
        );
        self.events.emit(StoreEvent::RateLimited { retry_after });
        ChatError::RateLimited { retry_after }
    }

    pub fn is_replying(&self, room: ChatroomId) -> bool {
        self.tasks.is_pending(room, TaskKind::Reply)
    }

    /// Forget a deleted room's window.  Only matters for the per-room scope.
    pub fn forget_room(&self, room: ChatroomId) {
        self.throttle().forget_room(room);
    }

    /// Drop throttle windows that have already elapsed.
    pub fn purge_stale(&self) {
        self.throttle().purge_stale(Instant::now());
    }

    async fn run(&self, op: PendingOp) {
        let room = op.room;
        let cancelled = tokio::select! {
            _ = op.token().cancelled() => true,
            _ = tokio::time::sleep(self.typing_delay) => false,
        };

        let (appended, typing) = {
            let mut state = lock(&self.state);
            let still_valid = !cancelled && self.tasks.complete(&op);
            let reply = still_valid.then(|| {
                let content = AI_RESPONSES
                    .choose(&mut rand::thread_rng())
                    .copied()
                    .unwrap_or_default();
                Message::ai(room, content, Utc::now())
            });
            let appended = reply.and_then(|reply| {
                let id = reply.id;
                state.append_message(room, reply).then_some(id)
            });
            // A cycle started after this one was cancelled owns the indicator.
            let typing = self.tasks.pending_of(TaskKind::Reply) > 0;
            state.set_typing(typing);
            (appended, typing)
        };

        if let Some(message_id) = appended {
            info!(room = %room, msg_id = %message_id, "assistant replied");
            self.events.emit(StoreEvent::MessageAppended {
                chatroom_id: room,
                message_id,
                kind: MessageKind::Ai,
            });
        } else {
            debug!(room = %room, "reply dropped");
        }
        if !typing {
            self.events.emit(StoreEvent::TypingChanged {
                chatroom_id: room,
                typing: false,
            });
        }
    }
}
