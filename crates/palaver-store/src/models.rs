//! Domain model structs mirrored into the key-value store.
//!
//! Every struct derives `Serialize` and `Deserialize` with camelCase field
//! names, which is the shape of the persisted JSON documents.

use chrono::{DateTime, Utc};
use palaver_shared::constants::IMAGE_PREVIEW_TEXT;
use palaver_shared::{ChatroomId, ImageAttachment, MessageId, MessageKind, MessageStatus};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Chatroom
// ---------------------------------------------------------------------------

/// Summary of a conversation, as shown in the room list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Chatroom {
    /// Unique, immutable identifier.
    pub id: ChatroomId,
    /// Display title.
    pub title: String,
    /// Preview of the most recent message, empty for a fresh room.
    pub last_message: String,
    /// When the most recent message was sent.
    pub last_message_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    /// Bumped by every appended message; never moves backwards.
    pub updated_at: DateTime<Utc>,
}

impl Chatroom {
    pub fn new(title: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: ChatroomId::new(),
            title: title.into(),
            last_message: String::new(),
            last_message_time: None,
            created_at: now,
            updated_at: now,
        }
    }
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// A single turn in a chatroom's log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub chatroom_id: ChatroomId,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageAttachment>,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub timestamp: DateTime<Utc>,
    pub status: MessageStatus,
}

impl Message {
    /// A message written by the local user.
    pub fn user(
        chatroom_id: ChatroomId,
        content: impl Into<String>,
        image: Option<ImageAttachment>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: MessageId::new(),
            chatroom_id,
            content: content.into(),
            image,
            kind: MessageKind::User,
            timestamp,
            status: MessageStatus::Sent,
        }
    }

    /// A reply from the assistant.
    pub fn ai(chatroom_id: ChatroomId, content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: MessageId::new(),
            chatroom_id,
            content: content.into(),
            image: None,
            kind: MessageKind::Ai,
            timestamp,
            status: MessageStatus::Sent,
        }
    }

    /// Text shown as the owning room's "last message".
    pub fn preview_text(&self) -> &str {
        if self.content.is_empty() && self.image.is_some() {
            IMAGE_PREVIEW_TEXT
        } else {
            &self.content
        }
    }
}

// ---------------------------------------------------------------------------
// UserProfile
// ---------------------------------------------------------------------------

/// The signed-in user, as handed over by the sign-in flow.  Display only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub phone: String,
    pub country_code: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_json_uses_type_field() {
        let msg = Message::ai(ChatroomId::new(), "hello", Utc::now());
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["type"], "ai");
        assert_eq!(json["status"], "sent");
        assert!(json.get("chatroomId").is_some());
        assert!(json.get("image").is_none());
    }

    #[test]
    fn preview_falls_back_for_image_only() {
        let img = ImageAttachment::from_data_url("data:image/gif;base64,R0lGOA==").unwrap();
        let msg = Message::user(ChatroomId::new(), "", Some(img), Utc::now());
        assert_eq!(msg.preview_text(), "Image");

        let msg = Message::user(ChatroomId::new(), "hi", None, Utc::now());
        assert_eq!(msg.preview_text(), "hi");
    }

    #[test]
    fn new_chatroom_starts_empty() {
        let now = Utc::now();
        let room = Chatroom::new("Tech Talk", now);
        assert!(room.last_message.is_empty());
        assert!(room.last_message_time.is_none());
        assert_eq!(room.created_at, room.updated_at);
    }
}
