use chrono::Utc;
use palaver_shared::validate::normalize_outgoing;
use palaver_shared::{ChatError, ChatroomId, ImageAttachment, MessageId, MessageStatus};
use palaver_store::Message;
use tracing::info;

use crate::events::StoreEvent;
use crate::pagination::LoadOutcome;
use crate::session::Session;
use crate::state::{lock, PageState};

/// Result of a user send.
#[derive(Debug, Clone)]
pub struct SendReceipt {
    /// The message as appended to the log.
    pub message: Message,
    /// Whether an assistant reply was scheduled.  A rate-limited trigger does
    /// not undo the send.
    pub reply: Result<(), ChatError>,
}

impl Session {
    /// Messages of a room, oldest first.
    pub fn messages(&self, id: ChatroomId) -> Vec<Message> {
        lock(&self.state).messages(id).to_vec()
    }

    /// Send a user message and ask the assistant to answer it.
    pub fn send_message(
        &self,
        id: ChatroomId,
        text: &str,
        image: Option<ImageAttachment>,
    ) -> Result<SendReceipt, ChatError> {
        let content = normalize_outgoing(text, image.is_some())?;

        let message = {
            let mut state = lock(&self.state);
            let message = Message::user(id, content, image, Utc::now());
            if !state.append_message(id, message.clone()) {
                return Err(ChatError::validation("Unknown chatroom"));
            }
            message
        };
        info!(room = %id, msg_id = %message.id, "message sent");
        self.events.emit(StoreEvent::MessageAppended {
            chatroom_id: id,
            message_id: message.id,
            kind: message.kind,
        });

        let reply = self.responder.trigger(id);
        Ok(SendReceipt { message, reply })
    }

    pub fn update_message_status(
        &self,
        id: ChatroomId,
        message_id: MessageId,
        status: MessageStatus,
    ) -> bool {
        lock(&self.state).update_message_status(id, message_id, status)
    }

    pub fn clear_messages(&self, id: ChatroomId) -> bool {
        lock(&self.state).clear_messages(id)
    }

    /// Scroll-to-top signal.  Returns at once; the batch arrives later as a
    /// `HistoryLoaded` event.
    pub fn load_older(&self, id: ChatroomId) -> LoadOutcome {
        self.pagination.load_older(id)
    }

    /// Load one older page and wait for it.
    pub async fn load_older_now(&self, id: ChatroomId) -> Result<LoadOutcome, ChatError> {
        self.pagination.load_older_now(id).await
    }

    pub fn page_state(&self, id: ChatroomId) -> Option<PageState> {
        lock(&self.state).page_state(id)
    }

    pub fn is_fetching_history(&self, id: ChatroomId) -> bool {
        self.pagination.is_fetching(id)
    }

    pub fn is_typing(&self) -> bool {
        lock(&self.state).is_typing()
    }
}
