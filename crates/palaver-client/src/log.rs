//! Message log: per-room ordered messages, oldest first.
//!
//! Live messages are appended at the tail; older history is prepended at the
//! head in whole batches.  Nothing is ever inserted in the middle.

use chrono::{DateTime, Utc};
use palaver_shared::{ChatroomId, MessageId, MessageStatus};
use palaver_store::Message;
use tracing::debug;

use crate::state::ChatState;

impl ChatState {
    /// Messages of a room, oldest first.  Unknown rooms have none.
    pub fn messages(&self, id: ChatroomId) -> &[Message] {
        self.messages.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Timestamp of the oldest loaded message.
    pub fn oldest_timestamp(&self, id: ChatroomId) -> Option<DateTime<Utc>> {
        self.messages(id).first().map(|m| m.timestamp)
    }

    /// Add a message at the tail and update the room's preview.
    ///
    /// Returns `false` without touching anything if the room is unknown.
    pub fn append_message(&mut self, id: ChatroomId, mut message: Message) -> bool {
        if !self.has_room(id) {
            debug!(room = %id, "append to unknown chatroom ignored");
            return false;
        }
        message.chatroom_id = id;

        let preview = message.preview_text().to_string();
        let at = message.timestamp;
        debug!(room = %id, msg_id = %message.id, kind = message.kind.as_str(), "message appended");

        self.messages.entry(id).or_default().push(message);
        self.persist_messages();
        self.touch_room(id, &preview, at);
        true
    }

    /// Insert an older batch at the head, keeping the batch's own order.
    ///
    /// The room preview is left alone.
    pub fn prepend_messages(&mut self, id: ChatroomId, batch: Vec<Message>) -> bool {
        if !self.has_room(id) {
            return false;
        }

        let count = batch.len();
        let log = self.messages.entry(id).or_default();
        let mut merged = Vec::with_capacity(batch.len() + log.len());
        merged.extend(batch.into_iter().map(|mut m| {
            m.chatroom_id = id;
            m
        }));
        merged.append(log);
        *log = merged;

        self.persist_messages();
        debug!(room = %id, count, "history prepended");
        true
    }

    /// Empty a room's log but keep the room.
    pub fn clear_messages(&mut self, id: ChatroomId) -> bool {
        let Some(log) = self.messages.get_mut(&id) else {
            return false;
        };
        log.clear();
        self.persist_messages();
        true
    }

    /// Change the delivery status of one message in place.
    pub fn update_message_status(
        &mut self,
        id: ChatroomId,
        message_id: MessageId,
        status: MessageStatus,
    ) -> bool {
        let Some(message) = self
            .messages
            .get_mut(&id)
            .and_then(|log| log.iter_mut().find(|m| m.id == message_id))
        else {
            return false;
        };
        message.status = status;
        self.persist_messages();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::tests::empty_state;
    use chrono::Duration;
    use palaver_shared::MessageKind;
    use palaver_store::DurableMirror;

    fn texts(state: &ChatState, id: ChatroomId) -> Vec<String> {
        state.messages(id).iter().map(|m| m.content.clone()).collect()
    }

    #[test]
    fn appends_keep_invocation_order() {
        let (mut state, _) = empty_state();
        let room = state.create_room(Some("Tech Talk"));
        let now = Utc::now();

        for (i, text) in ["one", "two", "three"].iter().enumerate() {
            // Timestamps deliberately out of order: the log follows call order.
            let ts = now - Duration::seconds(i as i64);
            assert!(state.append_message(room.id, Message::user(room.id, *text, None, ts)));
        }

        assert_eq!(texts(&state, room.id), vec!["one", "two", "three"]);
        assert_eq!(state.room(room.id).unwrap().last_message, "three");
    }

    #[test]
    fn prepend_puts_batch_before_existing() {
        let (mut state, _) = empty_state();
        let room = state.create_room(Some("Deep Dive"));
        let now = Utc::now();
        state.append_message(room.id, Message::user(room.id, "live", None, now));
        let preview_before = state.room(room.id).unwrap().clone();

        let batch = vec![
            Message::ai(room.id, "old-1", now - Duration::minutes(2)),
            Message::ai(room.id, "old-2", now - Duration::minutes(1)),
        ];
        assert!(state.prepend_messages(room.id, batch));

        assert_eq!(texts(&state, room.id), vec!["old-1", "old-2", "live"]);
        assert_eq!(state.room(room.id).unwrap(), &preview_before);
        assert_eq!(state.oldest_timestamp(room.id), Some(now - Duration::minutes(2)));
    }

    #[test]
    fn unknown_room_reads_empty_and_ignores_writes() {
        let (mut state, _) = empty_state();
        let ghost = ChatroomId::new();

        assert!(state.messages(ghost).is_empty());
        assert!(!state.append_message(ghost, Message::ai(ghost, "x", Utc::now())));
        assert!(!state.prepend_messages(ghost, vec![Message::ai(ghost, "x", Utc::now())]));
        assert!(!state.clear_messages(ghost));
        assert!(state.messages(ghost).is_empty());
    }

    #[test]
    fn clear_keeps_room() {
        let (mut state, _) = empty_state();
        let room = state.create_room(None);
        state.append_message(room.id, Message::ai(room.id, "x", Utc::now()));

        assert!(state.clear_messages(room.id));
        assert!(state.messages(room.id).is_empty());
        assert!(state.has_room(room.id));
    }

    #[test]
    fn status_update_in_place() {
        let (mut state, _) = empty_state();
        let room = state.create_room(None);
        let mut msg = Message::user(room.id, "pending", None, Utc::now());
        msg.status = MessageStatus::Sending;
        let msg_id = msg.id;
        state.append_message(room.id, msg);

        assert!(state.update_message_status(room.id, msg_id, MessageStatus::Failed));
        assert_eq!(state.messages(room.id)[0].status, MessageStatus::Failed);
        assert!(!state.update_message_status(room.id, MessageId::new(), MessageStatus::Sent));
    }

    #[test]
    fn mirror_round_trip_reproduces_rooms_and_logs() {
        let (mut state, backend) = empty_state();
        let a = state.create_room(Some("A"));
        let b = state.create_room(Some("B"));
        for i in 0..5 {
            state.append_message(a.id, Message::user(a.id, format!("a{i}"), None, Utc::now()));
        }
        state.append_message(b.id, Message::ai(b.id, "b0", Utc::now()));

        let reloaded = ChatState::load(DurableMirror::new(Box::new(backend)));
        assert_eq!(reloaded.rooms(), state.rooms());
        assert_eq!(reloaded.messages(a.id), state.messages(a.id));
        assert_eq!(reloaded.messages(b.id), state.messages(b.id));
        assert_eq!(reloaded.messages(b.id)[0].kind, MessageKind::Ai);
    }
}
