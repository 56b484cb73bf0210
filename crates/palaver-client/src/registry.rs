//! Room registry: the ordered list of chatroom summaries.

use chrono::{DateTime, Utc};
use palaver_shared::constants::SAMPLE_CHATROOM_NAMES;
use palaver_shared::ChatroomId;
use palaver_store::Chatroom;
use rand::seq::SliceRandom;
use tracing::{debug, info};

use crate::state::{ChatState, PageState};

impl ChatState {
    /// All rooms, newest created first.
    pub fn rooms(&self) -> &[Chatroom] {
        &self.rooms
    }

    pub fn room(&self, id: ChatroomId) -> Option<&Chatroom> {
        self.rooms.iter().find(|r| r.id == id)
    }

    pub fn has_room(&self, id: ChatroomId) -> bool {
        self.room(id).is_some()
    }

    /// Create a room and put it at the head of the list.
    ///
    /// A blank or missing title is replaced by one of the sample names.
    pub fn create_room(&mut self, title: Option<&str>) -> Chatroom {
        let title = match title.map(str::trim) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => SAMPLE_CHATROOM_NAMES
                .choose(&mut rand::thread_rng())
                .copied()
                .unwrap_or("New Chat")
                .to_string(),
        };

        let room = Chatroom::new(title, Utc::now());
        self.rooms.insert(0, room.clone());
        self.messages.insert(room.id, Vec::new());
        self.pages.insert(room.id, PageState::new());

        self.persist_rooms();
        self.persist_messages();

        info!(room = %room.id, title = %room.title, "chatroom created");
        room
    }

    /// Remove a room together with its log and pagination cursor.
    ///
    /// Unknown ids are ignored.  Returns whether anything was removed.
    pub fn delete_room(&mut self, id: ChatroomId) -> bool {
        let before = self.rooms.len();
        self.rooms.retain(|r| r.id != id);
        let removed = self.rooms.len() != before;

        let had_log = self.messages.remove(&id).is_some();
        self.pages.remove(&id);
        if self.current == Some(id) {
            self.current = None;
        }

        if removed {
            self.persist_rooms();
        }
        if removed || had_log {
            self.persist_messages();
        }

        if removed {
            info!(room = %id, "chatroom deleted");
        }
        removed
    }

    /// Record the newest message of a room.  `updated_at` never moves back.
    pub fn touch_room(&mut self, id: ChatroomId, preview: &str, at: DateTime<Utc>) -> bool {
        let Some(room) = self.rooms.iter_mut().find(|r| r.id == id) else {
            return false;
        };

        room.last_message = preview.to_string();
        room.last_message_time = Some(at);
        if at > room.updated_at {
            room.updated_at = at;
        }

        self.persist_rooms();
        debug!(room = %id, "chatroom touched");
        true
    }

    /// Rooms ordered by most recent activity, at most `limit` of them.
    pub fn recent_rooms(&self, limit: usize) -> Vec<Chatroom> {
        let mut rooms = self.rooms.clone();
        rooms.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        rooms.truncate(limit);
        rooms
    }

    /// Select the room the user is looking at.
    pub fn open_room(&mut self, id: ChatroomId) -> bool {
        if !self.has_room(id) {
            return false;
        }
        self.current = Some(id);
        true
    }

    pub fn current_room(&self) -> Option<&Chatroom> {
        self.current.and_then(|id| self.room(id))
    }
}

/// Case-insensitive substring match on room titles.
///
/// An empty query returns every room, in list order.
pub fn filter_rooms(rooms: &[Chatroom], query: &str) -> Vec<Chatroom> {
    let needle = query.to_lowercase();
    if needle.is_empty() {
        return rooms.to_vec();
    }
    rooms
        .iter()
        .filter(|r| r.title.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}
