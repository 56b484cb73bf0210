use std::time::Duration;

use palaver_shared::{ChatroomId, MessageId, MessageKind};
use tokio::sync::broadcast;

/// Buffered events per subscriber before the slowest one starts lagging.
const EVENT_CAPACITY: usize = 256;

/// Notifications for whatever renders the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    RoomCreated {
        chatroom_id: ChatroomId,
    },
    RoomDeleted {
        chatroom_id: ChatroomId,
    },
    MessageAppended {
        chatroom_id: ChatroomId,
        message_id: MessageId,
        kind: MessageKind,
    },
    HistoryLoaded {
        chatroom_id: ChatroomId,
        count: usize,
        page: u32,
        has_more: bool,
    },
    HistoryLoadFailed {
        chatroom_id: ChatroomId,
        error: String,
    },
    TypingChanged {
        chatroom_id: ChatroomId,
        typing: bool,
    },
    RateLimited {
        retry_after: Duration,
    },
    SearchApplied {
        query: String,
    },
}

#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<StoreEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.tx.subscribe()
    }

    /// Publish an event.  Nobody listening is not an error.
    pub fn emit(&self, event: StoreEvent) {
        if let Err(e) = self.tx.send(event) {
            tracing::trace!(event = ?e.0, "no subscribers for event");
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_see_events_in_order() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        let id = ChatroomId::new();

        bus.emit(StoreEvent::RoomCreated { chatroom_id: id });
        bus.emit(StoreEvent::RoomDeleted { chatroom_id: id });

        assert_eq!(rx.recv().await.unwrap(), StoreEvent::RoomCreated { chatroom_id: id });
        assert_eq!(rx.recv().await.unwrap(), StoreEvent::RoomDeleted { chatroom_id: id });
    }

    #[test]
    fn emit_without_subscribers_is_fine() {
        let bus = EventBus::new();
        bus.emit(StoreEvent::SearchApplied { query: "x".into() });
    }
}
